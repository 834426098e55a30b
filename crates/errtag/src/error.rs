use std::path::PathBuf;
use std::sync::Arc;

/// Failures raised by the library itself.
///
/// Application failures are modelled with [`crate::Tagged`] variants; this enum only covers the
/// cases where errtag cannot do what it was asked to do.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// An exhaustive matcher reached its terminal call and no rule accepted the subject.
    ///
    /// The declared variant set and the value that actually arrived disagree; this is a
    /// programming error in the caller, not a runtime condition to recover from.
    #[error("Non-exhaustive match: no rule accepted {subject}")]
    NonExhaustive {
        tag: Option<String>,
        subject: String,
    },

    #[error("Invalid serialized error: {0}")]
    Json(Arc<serde_json::Error>),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O failure on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: Arc<std::io::Error>,
    },

    #[error("Configuration already installed")]
    ConfigAlreadyInstalled,
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(Arc::new(e))
    }
}

impl Error {
    pub fn is_non_exhaustive(&self) -> bool {
        matches!(self, Error::NonExhaustive { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
