//! Scene codecs: a compact binary encoding and a human-editable JSON one
//!
//! Both are lossless for every scene whose unions are set and whose
//! numbers are finite, and both preserve object and camera order.

pub mod binary;
pub mod detect;
pub mod json;

#[cfg(test)]
pub(crate) mod testing;

pub use binary::{decode, encode, encode_to, FORMAT_MAJOR, FORMAT_MINOR, MAGIC};
pub use detect::{detect, Encoding};
pub use json::{decode_json, decode_json_slice, encode_json, encode_json_with, JsonStyle};
