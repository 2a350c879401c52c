//! Service-account credential decoding.
//!
//! The credential arrives as base64 of the JSON key file Google hands out.
//! Parsing is strict: unknown shapes are rejected, nothing is evaluated.
use crate::error::{PresaleError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::fmt;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn from_base64(encoded: &str) -> Result<Self> {
        // Secrets pasted into CI variables often pick up line breaks.
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let raw = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| PresaleError::Credential(format!("not valid base64: {}", e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &[u8]) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_slice(raw)
            .map_err(|e| PresaleError::Credential(format!("not a service account key: {}", e)))?;
        key.validate()?;
        Ok(key)
    }

    fn validate(&self) -> Result<()> {
        if self.key_type != "service_account" {
            return Err(PresaleError::Credential(format!(
                "expected type 'service_account', got '{}'",
                self.key_type
            )));
        }
        if !self.private_key.contains("-----BEGIN") {
            return Err(PresaleError::Credential(
                "private_key is not a PEM block".to_string(),
            ));
        }
        if self.client_email.trim().is_empty() {
            return Err(PresaleError::Credential("client_email is empty".to_string()));
        }
        Ok(())
    }
}
