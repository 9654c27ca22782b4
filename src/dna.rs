//! DNA rig-description documents: the in-memory model, the reader/writer capability traits,
//! and the on-disk codecs.

pub mod binary;
pub mod document;
pub mod json;
pub mod reader;
pub mod stream;
pub mod writer;

#[cfg(test)]
#[path = "../tests/unit/dna/fixture.rs"]
pub(crate) mod fixture;
