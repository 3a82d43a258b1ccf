//! # Domain Module
//!
//! The value tree, output modes and errors shared by both codecs.

pub mod errors;
pub mod output;
pub mod value;

pub use errors::*;
pub use output::*;
pub use value::*;
