use thiserror::Error;

/// Unified error type for Reqlog.
#[derive(Error, Debug)]
pub enum ReqlogError {
    #[error("Unknown log level({value}) in setting({setting})")]
    InvalidLogLevel { value: u8, setting: &'static str },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid route {pattern}: {reason}")]
    InvalidRoute { pattern: String, reason: String },
}

impl From<figment::Error> for ReqlogError {
    fn from(err: figment::Error) -> Self {
        ReqlogError::Config(err.to_string())
    }
}
