// Error taxonomy shared by the library.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PresaleError>;

/// Everything that can go wrong between fetching the schedule page and
/// inserting an event.
///
/// `Config`, `Credential`, `Auth`, `Fetch` and `NoMatchingTable` end a run.
/// The rest are caught at row or record scope by the pipeline.
#[derive(Debug, Error)]
pub enum PresaleError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid service account credential: {0}")]
    Credential(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("could not fetch the schedule page after {attempts} attempt(s): {reason}")]
    Fetch { attempts: u32, reason: String },
    #[error("no table whose summary contains '{marker}' was found")]
    NoMatchingTable { marker: String },
    #[error("invalid row: {0}")]
    InvalidRow(String),
    #[error("sale date '{input}' is not in YYYY/MM/DD form")]
    DateParse { input: String },
    #[error("calendar request failed with status {status}: {body}")]
    Calendar { status: u16, body: String },
    #[error("http error: {0}")]
    Http(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PresaleError {
    /// True for errors that must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PresaleError::Config(_)
                | PresaleError::Credential(_)
                | PresaleError::Auth(_)
                | PresaleError::Fetch { .. }
                | PresaleError::NoMatchingTable { .. }
        )
    }
}

impl From<http::Error> for PresaleError {
    fn from(e: http::Error) -> Self {
        PresaleError::Http(e.to_string())
    }
}

impl From<url::ParseError> for PresaleError {
    fn from(e: url::ParseError) -> Self {
        PresaleError::Config(format!("invalid url: {}", e))
    }
}
