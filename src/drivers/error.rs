use thiserror::Error;
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("malformed sample line {line:?}: {reason}")]
    MalformedLine { line: String, reason: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid {field}: {reason}")]
    Configuration { field: &'static str, reason: String },
    #[error("channel index {index} out of range (have {channels})")]
    ChannelOutOfRange { index: usize, channels: usize },
}
impl ScopeError {
    pub(crate) fn malformed(line: &str, reason: impl Into<String>) -> Self {
        ScopeError::MalformedLine {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        ScopeError::Configuration {
            field,
            reason: reason.into(),
        }
    }
    #[cfg(test)]
    pub fn is_malformed(&self) -> bool {
        matches!(self, ScopeError::MalformedLine { .. })
    }
}
impl From<std::io::Error> for ScopeError {
    fn from(value: std::io::Error) -> Self {
        ScopeError::Transport(value.to_string())
    }
}
impl From<serialport::Error> for ScopeError {
    fn from(value: serialport::Error) -> Self {
        ScopeError::Transport(value.to_string())
    }
}
