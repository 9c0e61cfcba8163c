//! Visual symbol carrier: 2D color/grayscale module grid encode/decode.

pub mod decoder;
pub mod detector;
pub mod encoder;
pub mod layout;
pub mod palette;
pub mod rectify;
pub mod sampler;

pub use decoder::{DecodedFrame, VisualDecoder};
pub use encoder::{FrameSequenceEncoder, VisualEncoder};
