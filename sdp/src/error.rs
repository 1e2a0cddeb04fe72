use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdpError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("invalid: {0}")]
    Invalid(String),
    #[error("attribute not set: {0}")]
    MissingAttribute(&'static str),
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SdpError>;

impl SdpError {
    pub(crate) fn syntax(msg: impl Into<String>) -> Self {
        SdpError::Syntax(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SdpError::Invalid(msg.into())
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, SdpError::Syntax(_))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, SdpError::Invalid(_))
    }
}
