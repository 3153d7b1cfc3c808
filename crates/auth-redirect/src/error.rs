use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidVar { key: &'static str, value: String },

    #[error("Could not bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}
