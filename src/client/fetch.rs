// Retrieves the schedule page, retrying transient failures.
use crate::client::core::{WebClient, send, web_client};
use crate::config::Settings;
use crate::error::{PresaleError, Result};
use http::{Method, Request, Uri};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct DocumentFetcher {
    client: WebClient,
    timeout: Duration,
    attempts: u32,
    retry_delay: Duration,
}

impl DocumentFetcher {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: web_client(),
            timeout: Duration::from_secs(settings.fetch_timeout_secs),
            attempts: settings.fetch_attempts.max(1),
            retry_delay: Duration::from_secs(settings.retry_delay_secs),
        }
    }

    /// GETs `url`. Up to `attempts` tries with a fixed pause in between;
    /// the calling task blocks for the whole sequence.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let uri: Uri = url
            .parse()
            .map_err(|e| PresaleError::Config(format!("invalid source url {}: {}", url, e)))?;

        let mut attempt = 1;
        loop {
            match self.fetch_once(&uri).await {
                Ok(body) => return Ok(body),
                Err(reason) if attempt >= self.attempts => {
                    return Err(PresaleError::Fetch {
                        attempts: attempt,
                        reason,
                    });
                }
                Err(reason) => {
                    log::warn!(
                        "Attempt {} of {} failed ({}), retrying in {}s...",
                        attempt,
                        self.attempts,
                        reason,
                        self.retry_delay.as_secs()
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn fetch_once(&self, uri: &Uri) -> std::result::Result<String, String> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(uri.clone())
            .body(String::new())
            .map_err(|e| e.to_string())?;

        let (status, body) = tokio::time::timeout(self.timeout, send(self.client.clone(), req))
            .await
            .map_err(|_| format!("timed out after {}s", self.timeout.as_secs()))?
            .map_err(|e| e.to_string())?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(format!("HTTP {}", status))
        }
    }
}
