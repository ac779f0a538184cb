//! Per-phase countdown lengths.
//!
//! Durations are always held in seconds; the settings surface works in
//! minutes. Every constructor clamps into the allowed range, so a
//! `DurationConfig` in hand is always valid.

use serde::{Deserialize, Serialize};

use super::phase::Phase;

/// Inclusive bounds for one phase, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBounds {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl DurationBounds {
    pub fn clamp(&self, secs: i64) -> u64 {
        if secs < self.min_secs as i64 {
            self.min_secs
        } else if secs > self.max_secs as i64 {
            self.max_secs
        } else {
            secs as u64
        }
    }
}

pub const FOCUS_BOUNDS: DurationBounds = DurationBounds {
    min_secs: 60,
    max_secs: 7200,
};
pub const SHORT_BREAK_BOUNDS: DurationBounds = DurationBounds {
    min_secs: 60,
    max_secs: 1800,
};
pub const LONG_BREAK_BOUNDS: DurationBounds = DurationBounds {
    min_secs: 300,
    max_secs: 3600,
};

pub fn bounds(phase: Phase) -> DurationBounds {
    match phase {
        Phase::Focus => FOCUS_BOUNDS,
        Phase::ShortBreak => SHORT_BREAK_BOUNDS,
        Phase::LongBreak => LONG_BREAK_BOUNDS,
    }
}

/// Countdown length per phase.
///
/// Stored as JSON under `timer-config` with the keys `focus`, `shortBreak`
/// and `longBreak`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationConfig {
    focus: u64,
    short_break: u64,
    long_break: u64,
}

impl DurationConfig {
    /// Build from raw seconds, clamping each field to its bounds.
    pub fn from_secs(focus: i64, short_break: i64, long_break: i64) -> Self {
        Self {
            focus: FOCUS_BOUNDS.clamp(focus),
            short_break: SHORT_BREAK_BOUNDS.clamp(short_break),
            long_break: LONG_BREAK_BOUNDS.clamp(long_break),
        }
    }

    /// Build from whole minutes.
    pub fn from_minutes(focus: i64, short_break: i64, long_break: i64) -> Self {
        Self::from_secs(
            focus.saturating_mul(60),
            short_break.saturating_mul(60),
            long_break.saturating_mul(60),
        )
    }

    /// Build from free-form minute strings as typed into a settings form.
    ///
    /// Each value is read up to its first non-digit, so `"45.5"` is 45 and
    /// `"10min"` is 10. Input with no leading digits clamps to the phase
    /// minimum; numbers too large to represent clamp to the maximum.
    pub fn from_minute_inputs(focus: &str, short_break: &str, long_break: &str) -> Self {
        Self::from_minutes(
            parse_minutes(focus),
            parse_minutes(short_break),
            parse_minutes(long_break),
        )
    }

    pub fn get(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Focus => self.focus,
            Phase::ShortBreak => self.short_break,
            Phase::LongBreak => self.long_break,
        }
    }

    pub fn minutes(&self, phase: Phase) -> u64 {
        self.get(phase) / 60
    }

    /// Re-apply bounds. Used after deserializing values that bypassed the
    /// constructors.
    pub fn clamped(self) -> Self {
        Self::from_secs(
            self.focus.min(i64::MAX as u64) as i64,
            self.short_break.min(i64::MAX as u64) as i64,
            self.long_break.min(i64::MAX as u64) as i64,
        )
    }
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            focus: 25 * 60,
            short_break: 5 * 60,
            long_break: 15 * 60,
        }
    }
}

/// Leading integer of `raw`, saturating on overflow. `i64::MIN` when there
/// are no digits to read.
fn parse_minutes(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: Vec<i64> = rest
        .bytes()
        .take_while(u8::is_ascii_digit)
        .map(|b| i64::from(b - b'0'))
        .collect();
    if digits.is_empty() {
        return i64::MIN;
    }

    digits.into_iter().fold(0i64, |acc, d| {
        if negative {
            acc.saturating_mul(10).saturating_sub(d)
        } else {
            acc.saturating_mul(10).saturating_add(d)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_classic_pomodoro() {
        let cfg = DurationConfig::default();
        assert_eq!(cfg.get(Phase::Focus), 1500);
        assert_eq!(cfg.get(Phase::ShortBreak), 300);
        assert_eq!(cfg.get(Phase::LongBreak), 900);
    }

    #[test]
    fn out_of_range_clamps_to_nearest_bound() {
        let cfg = DurationConfig::from_minutes(0, 90, 2);
        assert_eq!(cfg.get(Phase::Focus), 60);
        assert_eq!(cfg.get(Phase::ShortBreak), 1800);
        assert_eq!(cfg.get(Phase::LongBreak), 300);

        let cfg = DurationConfig::from_secs(-5, i64::MAX, 10_000);
        assert_eq!(cfg.get(Phase::Focus), 60);
        assert_eq!(cfg.get(Phase::ShortBreak), 1800);
        assert_eq!(cfg.get(Phase::LongBreak), 3600);
    }

    #[test]
    fn non_numeric_minutes_fall_to_minimum() {
        let cfg = DurationConfig::from_minute_inputs("abc", " 10 ", "");
        assert_eq!(cfg.get(Phase::Focus), 60);
        assert_eq!(cfg.get(Phase::ShortBreak), 600);
        assert_eq!(cfg.get(Phase::LongBreak), 300);
    }

    #[test]
    fn minutes_read_up_to_first_non_digit() {
        let cfg = DurationConfig::from_minute_inputs("45.5", "10min", "+20");
        assert_eq!(cfg.get(Phase::Focus), 2700);
        assert_eq!(cfg.get(Phase::ShortBreak), 600);
        assert_eq!(cfg.get(Phase::LongBreak), 1200);
    }

    #[test]
    fn huge_minutes_clamp_to_maximum() {
        let cfg = DurationConfig::from_minute_inputs(
            "99999999999999999999",
            "-99999999999999999999",
            "min10",
        );
        assert_eq!(cfg.get(Phase::Focus), 7200);
        assert_eq!(cfg.get(Phase::ShortBreak), 60);
        assert_eq!(cfg.get(Phase::LongBreak), 300);
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let json = serde_json::to_value(DurationConfig::default()).unwrap();
        assert_eq!(json["focus"], 1500);
        assert_eq!(json["shortBreak"], 300);
        assert_eq!(json["longBreak"], 900);
    }

    #[test]
    fn clamped_repairs_deserialized_values() {
        let raw: DurationConfig =
            serde_json::from_str(r#"{"focus":10,"shortBreak":300,"longBreak":99999}"#).unwrap();
        let cfg = raw.clamped();
        assert_eq!(cfg.get(Phase::Focus), 60);
        assert_eq!(cfg.get(Phase::LongBreak), 3600);
    }
}
