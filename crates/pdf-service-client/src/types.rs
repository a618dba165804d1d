use pdf_fields::ServiceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid page image encoding: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Unreadable page image {page}: {message}")]
    Image { page: usize, message: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl From<ClientError> for ServiceError {
    fn from(e: ClientError) -> Self {
        ServiceError::Unknown(e.to_string())
    }
}
