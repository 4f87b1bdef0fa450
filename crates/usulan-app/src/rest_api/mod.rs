pub mod paging;
pub mod storage;
pub mod usulan;

pub use paging::{Page, Paging};

use serde::Serialize;

/// Uniform response wrapper for non-validation outcomes.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Envelope {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Envelope {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}
