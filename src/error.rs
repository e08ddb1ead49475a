use std::path::PathBuf;
use thiserror::Error;

/// Failures the entry point knows how to report. Anything else bubbles out of
/// `main` as a raw `anyhow` chain.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("Usage: mail_digest <email_server_uri>")]
    Usage,

    #[error(
        "Error: Could not find the API key file '{}'. Make sure it exists in the same directory as the program.",
        .path.display()
    )]
    MissingApiKey { path: PathBuf },

    #[error("Error: the API key file '{}' is empty.", .path.display())]
    EmptyApiKey { path: PathBuf },

    #[error("Error connecting to the email server: {0}")]
    Connect(String),

    #[error("completion API error ({status}): {body}")]
    Generation { status: u16, body: String },

    #[error("completion API returned no choices")]
    EmptyCompletion,
}

impl DigestError {
    /// Usage, configuration and connection failures get a curated message and exit 1.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            DigestError::Usage
                | DigestError::MissingApiKey { .. }
                | DigestError::EmptyApiKey { .. }
                | DigestError::Connect(_)
        )
    }
}
