//! Ray-driven sculpting

pub mod probe;

pub use probe::{CastRecord, SculptProbe};
