//! Attribute types, values, and their wire codec.

pub mod codec;
pub mod types;
pub mod value;

pub use types::{AttributeKind, AttributeType};
pub use value::AttributeValue;
