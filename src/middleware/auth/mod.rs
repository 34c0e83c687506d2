pub mod access;
pub mod policy;

pub use access::{AccessGate, apply};
