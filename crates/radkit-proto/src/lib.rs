//! RADIUS wire protocol primitives.
//!
//! Implements the message and attribute codecs from RFC 2865 (authentication)
//! and RFC 2866 (accounting), plus the MD5 authenticator and User-Password
//! constructions, with no I/O of its own. The `radkit-server` crate drives
//! this codec from its UDP listeners.
//!
//! # Features
//!
//! - Message parsing and encoding with strict framing checks
//! - Attribute codec over a fixed type table (text, integer, IPv4,
//!   User-Password, Vendor-Specific)
//! - Request and Response Authenticator handling
//! - User-Password obfuscation (single 16-octet block)
//!
//! # Example
//!
//! ```rust
//! use radkit_proto::auth::{encrypt_user_password, generate_request_authenticator};
//! use radkit_proto::{AttributeType, AttributeValue, Code, Message};
//!
//! let secret = b"shared-secret";
//! let authenticator = generate_request_authenticator();
//!
//! let mut request = Message::new(Code::AccessRequest, 1, authenticator);
//! request.add_attribute(AttributeType::UserName, "alice".into());
//! let block = encrypt_user_password("hunter2", secret, &authenticator)?;
//! request.add_attribute(AttributeType::UserPassword, AttributeValue::Text(block));
//!
//! let wire = request.encode()?;
//! let parsed = Message::parse(&wire, secret)?;
//! assert_eq!(parsed.text(AttributeType::UserName).as_deref(), Some("alice"));
//! assert_eq!(parsed.text(AttributeType::UserPassword).as_deref(), Some("hunter2"));
//! # Ok::<(), radkit_proto::MessageError>(())
//! ```

pub mod accounting;
pub mod attributes;
pub mod auth;
pub mod packet;

pub use accounting::AcctStatusType;
pub use attributes::{AttributeKind, AttributeType, AttributeValue};
pub use packet::{Code, Message, MessageError};
