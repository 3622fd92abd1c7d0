use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaletteError {
    /// Unreadable or corrupt image data. Fatal; surfaced to the caller.
    #[error("unable to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The input bytes are in a format outside the accepted set.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The pixel buffer does not match the stated dimensions.
    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        len: usize,
        width: u32,
        height: u32,
    },

    /// A design-palette entry could not be parsed as a 6-digit hex color.
    #[error("invalid hex color {0:?}")]
    InvalidHex(String),

    /// The centroid clusterer failed on degenerate input. Byte-level
    /// callers recover this as "no palette could be determined".
    #[error("clustering failed: {0}")]
    Clustering(String),
}
