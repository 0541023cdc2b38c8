//! Image acquisition pipeline stages.
//!
//! - **validate**: size limits and format sniffing before decode
//! - **decode**: format detection, decode, dimension limits
//! - **orientation**: EXIF orientation correction
//! - **hash**: BLAKE3 content hashing

pub mod decode;
pub mod hash;
pub mod orientation;
pub mod validate;

// Re-exports for convenient access
pub use decode::{format_to_string, DecodedImage, ImageDecoder};
pub use hash::Hasher;
pub use validate::Validator;
