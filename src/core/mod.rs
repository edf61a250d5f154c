// Core modules
pub mod types;

pub use types::ByteSize;
