//! Writing run artifacts to disk.

pub mod writer;

pub use writer::{OutputWriter, WrittenArtifacts};
