//! Voice Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("{0}")]
    InvalidName(String),

    #[error("Reference text must not be empty")]
    EmptyReferenceText,
}
