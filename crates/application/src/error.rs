use domain::{DeliveryError, PersistenceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("delivery error: {0}")]
    Delivery(#[from] DeliveryError),
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}
