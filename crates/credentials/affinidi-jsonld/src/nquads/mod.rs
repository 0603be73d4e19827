//! N-Quads reading and writing.

pub mod escape;
pub mod parser;
pub mod serializer;

pub use parser::parse;
pub use serializer::{serialize_quad, serialize_quad_for_hashing, serialize_sorted};

/// Media type selecting textual canonical output.
pub const MEDIA_TYPE: &str = "application/nquads";
