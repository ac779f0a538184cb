//! Motivational quote client.
//!
//! Asks the quote service for a `{ text, author }` pair. The caller always
//! gets a quote back from [`QuoteClient::fetch_or_fallback`]: any failure,
//! including a slow service, falls back to one of a few local quotes. The
//! "generating" state lasts at least `min_display_secs` either way.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::QuoteError;
use crate::storage::QuoteConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

const FALLBACK_QUOTES: [(&str, &str); 3] = [
    (
        "Keberhasilan hanya datang kepada mereka yang fokus. Jangan biarkan dirimu terpecah oleh banyak hal, tentukan tujuan dan kejarlah sampai berhasil.",
        "Mario Teguh",
    ),
    (
        "Ketekunan adalah kunci, dan fokus adalah bahan bakarnya.",
        "Andrie Wongso",
    ),
    (
        "Goal tanpa fokus hanyalah mimpi. Goal dengan fokus akan menjadi kenyataan.",
        "Tung Desem Waringin",
    ),
];

/// All local quotes, in a fixed order.
pub fn fallback_quotes() -> Vec<Quote> {
    FALLBACK_QUOTES
        .iter()
        .map(|(text, author)| Quote {
            text: (*text).to_string(),
            author: (*author).to_string(),
        })
        .collect()
}

/// One local quote, picked at random.
pub fn fallback_quote() -> Quote {
    let (text, author) = FALLBACK_QUOTES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_QUOTES[0]);
    Quote {
        text: text.to_string(),
        author: author.to_string(),
    }
}

/// Parse a service response body.
///
/// Accepts a bare JSON object, or text with one embedded in it.
pub fn parse_quote(body: &str) -> Result<Quote, QuoteError> {
    let quote: Quote = match serde_json::from_str(body) {
        Ok(q) => q,
        Err(first) => {
            let embedded = match (body.find('{'), body.rfind('}')) {
                (Some(start), Some(end)) if start < end => &body[start..=end],
                _ => return Err(QuoteError::Malformed(first.to_string())),
            };
            serde_json::from_str(embedded).map_err(|e| QuoteError::Malformed(e.to_string()))?
        }
    };

    if quote.text.trim().is_empty() || quote.author.trim().is_empty() {
        return Err(QuoteError::Malformed("empty text or author".into()));
    }
    Ok(quote)
}

pub struct QuoteClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
    min_display: Duration,
}

impl QuoteClient {
    pub fn new(config: &QuoteConfig) -> Self {
        Self::with_windows(
            &config.endpoint,
            Duration::from_secs(config.timeout_secs),
            Duration::from_secs(config.min_display_secs),
        )
    }

    pub fn with_windows(endpoint: &str, timeout: Duration, min_display: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            timeout,
            min_display,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One request to the service, bounded by the timeout.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::Timeout`] when the service is too slow, and the
    /// other variants for transport, status or body problems.
    pub async fn fetch(&self) -> Result<Quote, QuoteError> {
        let request = async {
            let resp = self.client.post(&self.endpoint).send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(QuoteError::Status(status.as_u16()));
            }
            let body = resp.text().await?;
            parse_quote(&body)
        };

        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| QuoteError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })?
    }

    /// Fetch a quote, never failing. Takes at least the minimum display time.
    pub async fn fetch_or_fallback(&self) -> Quote {
        let (result, ()) = tokio::join!(self.fetch(), tokio::time::sleep(self.min_display));
        match result {
            Ok(quote) => {
                debug!(author = %quote.author, "quote received");
                quote
            }
            Err(e) => {
                warn!(error = %e, endpoint = %self.endpoint, "quote service failed, using local quote");
                fallback_quote()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::Instant;

    const BODY: &str = r#"{"text":"Fokus adalah kunci.","author":"Seseorang"}"#;

    fn client_for(url: &str) -> QuoteClient {
        QuoteClient::with_windows(url, Duration::from_secs(5), Duration::ZERO)
    }

    #[test]
    fn parse_accepts_embedded_json() {
        let quote = parse_quote(&format!("Here you go:\n{BODY}\n")).unwrap();
        assert_eq!(quote.author, "Seseorang");
    }

    #[test]
    fn parse_rejects_blank_fields() {
        assert!(matches!(
            parse_quote(r#"{"text":"  ","author":"A"}"#),
            Err(QuoteError::Malformed(_))
        ));
        assert!(parse_quote("no json here").is_err());
    }

    #[test]
    fn fallback_comes_from_local_list() {
        let all = fallback_quotes();
        assert_eq!(all.len(), 3);
        for _ in 0..10 {
            assert!(all.contains(&fallback_quote()));
        }
    }

    #[tokio::test]
    async fn fetch_posts_and_parses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate-quote")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BODY)
            .create_async()
            .await;

        let client = client_for(&format!("{}/api/generate-quote", server.url()));
        let quote = client.fetch().await.unwrap();
        assert_eq!(quote.text, "Fokus adalah kunci.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/q")
            .with_status(500)
            .with_body(r#"{"error":"GEMINI_API_KEY is not configured"}"#)
            .create_async()
            .await;

        let client = client_for(&format!("{}/q", server.url()));
        assert!(matches!(client.fetch().await, Err(QuoteError::Status(500))));
        assert!(fallback_quotes().contains(&client.fetch_or_fallback().await));
    }

    #[tokio::test]
    async fn silent_service_times_out() {
        // Accepts connections into the backlog but never answers.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/q", listener.local_addr().unwrap());
        let client = QuoteClient::with_windows(&url, Duration::from_millis(200), Duration::ZERO);

        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, QuoteError::Timeout { .. }));
        drop(listener);
    }

    #[tokio::test]
    async fn fallback_still_waits_minimum_display() {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = QuoteClient::with_windows(
            &format!("http://127.0.0.1:{port}/q"),
            Duration::from_secs(2),
            Duration::from_millis(300),
        );

        let started = Instant::now();
        let quote = client.fetch_or_fallback().await;
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(fallback_quotes().contains(&quote));
    }
}
