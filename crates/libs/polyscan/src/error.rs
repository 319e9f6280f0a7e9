use thiserror::Error;

/// Custom result type for scanline operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Represents all possible errors that can occur in the scanline engine
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Illegal input: {0}")]
    IllegalInput(String),

    #[error("Exact primitive failure: {0}")]
    ExactPrimitiveFailure(String),

    #[error("Path reconstruction failed")]
    PathReconstructionFailed,
}

/// Helper to build an IllegalInput error
pub fn illegal_input<T>(msg: &str) -> Result<T> {
    Err(ScanError::IllegalInput(msg.to_string()))
}
