//! Message framing: codes, header layout, attribute scanning.

pub mod code;
pub mod message;

pub use code::Code;
pub use message::{Message, MessageError};
