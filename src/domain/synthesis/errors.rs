//! Synthesis Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Text cannot be empty")]
    EmptyText,
}
