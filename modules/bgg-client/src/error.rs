use thiserror::Error;

pub type Result<T> = std::result::Result<T, BggError>;

#[derive(Debug, Error)]
pub enum BggError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for BggError {
    fn from(err: reqwest::Error) -> Self {
        BggError::Network(err.to_string())
    }
}
