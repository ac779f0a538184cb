//! Integration tests for persistence across restarts.
//!
//! Uses an on-disk database in a temp dir, closes it and opens it again.

use flocus_core::storage::keys::Gateway;
use flocus_core::storage::Streak;
use flocus_core::{Controller, Database, DurationConfig, Phase};
use tempfile::TempDir;

fn reopen(dir: &TempDir) -> Controller<Database> {
    Controller::load(Database::open_at(&dir.path().join("flocus.db")).unwrap())
}

#[test]
fn test_progress_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut c = reopen(&dir);
        c.save_settings(DurationConfig::from_minutes(40, 10, 20));
        c.add_todo(1, "write report").unwrap();
        for _ in 0..3 {
            c.skip();
        }
        c.start();
        c.tick();
    }

    let c = reopen(&dir);
    let s = c.state();
    assert_eq!(s.phase(), Phase::ShortBreak);
    assert_eq!(s.session_index(), 2);
    assert_eq!(s.streak(), 0);
    // The countdown itself is not restored.
    assert_eq!(s.remaining_secs(), 600);
    assert!(!s.is_running());
    assert_eq!(c.durations(), &DurationConfig::from_minutes(40, 10, 20));
    assert_eq!(c.ledger().counts(1), (0, 1));
}

#[test]
fn test_long_break_index_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut c = reopen(&dir);
        for _ in 0..7 {
            c.skip();
        }
    }
    let c = reopen(&dir);
    assert_eq!(c.state().phase(), Phase::LongBreak);
    assert_eq!(c.state().session_index(), 4);
    assert_eq!(c.state().current_session(), 4);
}

#[test]
fn test_corrupt_keys_fall_back_independently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flocus.db");
    {
        let db = Database::open_at(&path).unwrap();
        db.kv_set("streak", "lots").unwrap();
        db.kv_set("sessions", "9").unwrap();
        db.kv_set("timer-type", "longBreak").unwrap();
        db.kv_set("session-data", "{not json").unwrap();
        db.kv_set(
            "timer-config",
            r#"{"focus":99999,"shortBreak":600,"longBreak":1}"#,
        )
        .unwrap();
    }

    let c = Controller::load(Database::open_at(&path).unwrap());
    assert_eq!(c.state().streak(), 0);
    assert_eq!(c.state().session_index(), 0);
    assert_eq!(c.state().phase(), Phase::LongBreak);
    assert!(c.ledger().is_empty());
    assert_eq!(c.durations().get(Phase::Focus), 7200);
    assert_eq!(c.durations().get(Phase::ShortBreak), 600);
    assert_eq!(c.durations().get(Phase::LongBreak), 300);
    assert_eq!(c.state().remaining_secs(), 300);
}

#[test]
fn test_reset_all_progress_keeps_durations_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut c = reopen(&dir);
        c.save_settings(DurationConfig::from_minutes(30, 5, 15));
        c.add_todo(2, "x").unwrap();
        c.skip();
        c.reset_all_progress();
    }

    let c = reopen(&dir);
    assert_eq!(c.state().phase(), Phase::Focus);
    assert_eq!(c.state().remaining_secs(), 1800);
    assert!(c.ledger().is_empty());

    let gateway = Gateway::new(Database::open_at(&dir.path().join("flocus.db")).unwrap());
    assert!(gateway.try_load::<Streak>().unwrap().is_none());
    assert!(gateway.try_load::<DurationConfig>().unwrap().is_some());
}
