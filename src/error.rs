use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaletteError>;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("No pixels to cluster")]
    EmptyInput,

    #[error("Color count must be at least 1")]
    InvalidColorCount,

    #[error("Requested {k} colors but only {pixels} pixels are available")]
    TooManyColors { k: usize, pixels: usize },

    #[error("RGBA buffer length {0} is not a multiple of 4")]
    InvalidRgbaLength(usize),

    #[error("Malformed hex color: {0:?}")]
    MalformedHex(String),

    #[error("Unable to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PaletteError {
    /// True for caller mistakes (bad counts, bad buffers, bad hex), as
    /// opposed to failures loading the image itself.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            PaletteError::EmptyInput
                | PaletteError::InvalidColorCount
                | PaletteError::TooManyColors { .. }
                | PaletteError::InvalidRgbaLength(_)
                | PaletteError::MalformedHex(_)
        )
    }
}
