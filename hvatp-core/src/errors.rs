//! HVATP error types with granular per-subsystem categories.

use thiserror::Error;

/// Top-level error type for all HVATP operations.
#[derive(Debug, Error)]
pub enum HvatpError {
    #[error("visual encode error: {0}")]
    VisualEncode(#[from] VisualEncodeError),

    #[error("visual decode error: {0}")]
    VisualDecode(#[from] VisualDecodeError),

    #[error("audio decode error: {0}")]
    AudioDecode(#[from] AudioDecodeError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that can occur while encoding a visual frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VisualEncodeError {
    #[error("chunk of {data_len} bytes exceeds frame capacity of {capacity} bytes")]
    CapacityExceeded { data_len: usize, capacity: usize },
}

/// Errors that can occur while decoding a visual frame.
///
/// Every variant here is a recoverable, per-frame failure (spec.md §7): the
/// public `decode_frame` entry point returns these as `Err` rather than
/// panicking, and the caller is expected to retry on the next captured
/// frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VisualDecodeError {
    #[error("fewer than 3 finder patterns located in the camera image")]
    NotDetected,

    #[error("perspective rectification failed to produce a canonical square")]
    RectificationFailed,

    #[error("Reed-Solomon decode exceeded its correction radius in shard {shard_index}")]
    Uncorrectable { shard_index: usize },

    #[error("frame metadata checksum mismatch or invalid data_length: {reason}")]
    BadMetadata { reason: String },
}

/// Errors that can occur while decoding an audio packet header.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioDecodeError {
    #[error("header CRC-16 mismatch: expected {expected:#06x}, computed {actual:#06x}")]
    BadCrc { expected: u16, actual: u16 },
}

/// Configuration errors, raised at construction time, never mid-stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ecc_level {level} out of range [0.25, 0.50]")]
    InvalidEccLevel { level: String },

    #[error("module_count {count} out of range [50, 500]")]
    InvalidModuleCount { count: usize },

    #[error("sample_rate must be > 0")]
    InvalidSampleRate,

    #[error("num_subcarriers must be > 0")]
    InvalidSubcarrierCount,

    #[error("carrier_spacing must be > 0")]
    InvalidCarrierSpacing,

    #[error("packet_duration must be > 0")]
    InvalidPacketDuration,
}

/// Result type alias for HVATP operations.
pub type Result<T> = std::result::Result<T, HvatpError>;
