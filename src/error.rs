use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeridianError {
    #[error("Data error: {0}")]
    Data(#[from] crate::data::DataError),
    #[cfg(feature = "backed")]
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Init logging error: {0}")]
    InitLogging(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MeridianError>;
