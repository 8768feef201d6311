//! Syntax tree tests: lossless parsing and tree surgery.

pub mod tests_tree;
