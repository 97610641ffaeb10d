use thiserror::Error;

/// The error type returned by [`crate::decode`] and the pipeline stages it drives.
///
/// Every variant is fatal to the current call; the decoder never retries
/// internally except where individual stages document a relaxed-parameter
/// retry (binarizer brightness offset, finder variance, alignment search
/// window). Callers should treat [`QrError::InvalidArgument`] as a
/// programmer error and the rest as ordinary recognition failures that are
/// expected for low-quality input.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum QrError {
    /// Non-positive dimensions, an empty buffer, a buffer length that doesn't
    /// divide evenly into 1/3/4 bytes per pixel, or a GF(256) `log`/`inv` of 0.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Image smaller than 5 binarizer blocks per side (40x40).
    #[error("image too small: {width}x{height}, need at least 40x40")]
    ImageTooSmall { width: usize, height: usize },

    /// Fewer than three viable finder-pattern candidates were found.
    #[error("no finder pattern triple found")]
    FinderNotFound,

    /// Both copies of the 15-bit format field were more than 3 bits away
    /// from every one of the 32 valid format codes.
    #[error("could not recover format information")]
    InvalidFormat,

    /// The version field was unrecoverable, or the recovered version does
    /// not re-encode to the symbol size estimated from geometry.
    #[error("could not recover version information")]
    InvalidVersion,

    /// Catch-all for any other decoding failure: Reed-Solomon block
    /// uncorrectable, codeword count mismatch, segment length overflow, or
    /// an unsupported segment mode (Kanji/ECI).
    #[error("decode failed: {0}")]
    Decode(String),
}

pub type QrResult<T> = Result<T, QrError>;
