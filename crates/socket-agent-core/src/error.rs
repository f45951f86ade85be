//! Error types for descriptor construction

use thiserror::Error;

/// Errors raised while building or encoding a descriptor
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error(
        "Descriptor size ({}KB) exceeds {}KB limit. Reduce the number of endpoints or simplify schemas.",
        kb(.size),
        .limit / 1024
    )]
    TooLarge { size: usize, limit: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn kb(bytes: &usize) -> String {
    format!("{:.2}", *bytes as f64 / 1024.0)
}
