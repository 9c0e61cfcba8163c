//! HVATP core library.
//!
//! A Rust-native implementation of the Hybrid Visual-Audio Transfer Protocol
//! codec: a 2D color/grayscale symbol carrier paired with a chirp-framed
//! OFDM acoustic control plane. Modules are organized by signal-chain stage,
//! matching the layering of the Python reference implementation this crate
//! supersedes, but expose a fully typed and tested API.

pub mod audio;
pub mod config;
pub mod constellation;
pub mod crc;
pub mod errors;
pub mod logging;
pub mod rs_code;
pub mod sequencing;
pub mod visual;

pub use errors::{HvatpError, Result};
