pub mod errors;
pub mod tree;
