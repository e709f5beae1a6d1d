//! Serialization of filter trees to CSDL text.

mod csdl;

pub use csdl::{CsdlWriter, condition_text, quote};
