use thiserror::Error;

use crate::application::serializer::SerializerError;
use crate::core::ports::OutboxStoreError;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Serializer(#[from] SerializerError),

    #[error(transparent)]
    Outbox(#[from] OutboxStoreError),
}
