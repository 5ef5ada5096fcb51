use thiserror::Error;

pub type Result<T> = std::result::Result<T, AriaTreeError>;

#[derive(Debug, Error)]
pub enum AriaTreeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Markup error at byte {offset}: {message}")]
    Markup { offset: usize, message: String },

    #[error("Invalid command: {0}")]
    Command(String),

    #[error("Script error on line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("Error: {0}")]
    Generic(String),
}

impl AriaTreeError {
    pub fn markup(offset: usize, message: impl Into<String>) -> Self {
        AriaTreeError::Markup {
            offset,
            message: message.into(),
        }
    }
}

impl From<String> for AriaTreeError {
    fn from(error: String) -> Self {
        AriaTreeError::Generic(error)
    }
}

impl From<&str> for AriaTreeError {
    fn from(error: &str) -> Self {
        AriaTreeError::Generic(error.to_string())
    }
}
