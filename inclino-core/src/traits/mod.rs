//! Hardware abstraction traits
//!
//! These traits define the interface between the attitude pipeline and
//! the sensor implementations in `inclino-drivers`.

pub mod source;

pub use source::{SampleSource, SourceError};
