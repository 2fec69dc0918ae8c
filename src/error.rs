//! Error type shared by the file collaborators and config loading.
//!
//! The in-memory filters never fail; they degrade to no-ops instead.

pub type BackgroundResult<T> = Result<T, BackgroundError>;

#[derive(thiserror::Error, Debug)]
pub enum BackgroundError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),
}

impl BackgroundError {
    pub fn invalid_buffer(msg: impl Into<String>) -> Self {
        Self::InvalidBuffer(msg.into())
    }
}
