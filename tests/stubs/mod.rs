//! Stub tests: building and persisting stub trees.

pub mod tests_codec;
