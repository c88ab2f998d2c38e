use std::result::Result as StdResult;
use thiserror::Error;
use teloxide::RequestError;
use std::io;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("API error: {0}")]
    ApiError(#[from] ApiError),
    #[error("Chart error: {0}")]
    ChartError(String),
    #[error("Server error: {0}")]
    ServerError(String),
    #[error("Telegram error: {0}")]
    TelegramError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        Error::TelegramError(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

pub type Result<T> = StdResult<T, Error>;
