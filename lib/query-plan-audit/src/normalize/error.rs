#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Failed to parse fetch operation: {message}")]
    InvalidOperation { message: String },
}
