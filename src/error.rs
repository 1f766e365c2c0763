use thiserror::Error;

/// Every way an analysis can fail. All of them are recoverable by the caller
/// (typically by supplying a corrected file or photo); none is retried here.
#[derive(Debug, Error)]
pub enum AssayError {
    /// Bytes are not valid text under any of the encodings that were tried.
    #[error("could not decode file as {tried}")]
    Decode { tried: String },

    /// The table is structurally unusable (too few columns, ragged rows, ...).
    #[error("invalid table format: {0}")]
    Format(String),

    /// Nothing usable left after cleaning, or a lookup on an empty series.
    #[error("no usable signal found: {0}")]
    EmptyResult(String),

    /// The centre crop of the photo collapsed to zero pixels.
    #[error("image too small/invalid to analyze: {width}x{height} with crop divisor {divisor}")]
    Dimension { width: u32, height: u32, divisor: u32 },

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AssayError>;
