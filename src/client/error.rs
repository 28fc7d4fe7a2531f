use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Failures surfaced to the shopper by the storefront flows.
///
/// None of them leave the store partially mutated.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Sorry, product is out of stock (requested {requested}, {in_stock} available)")]
    StockConflict {
        product_id: Uuid,
        requested: u32,
        in_stock: u32,
    },

    #[error("Service error: {message}")]
    Service {
        status: Option<u16>,
        message: String,
    },

    #[error("Sign in required")]
    AuthRequired,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    pub fn service(status: Option<u16>, message: impl Into<String>) -> Self {
        ClientError::Service {
            status,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Service { status: Some(404), .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Service {
            status: err.status().map(|status| status.as_u16()),
            message: err.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
