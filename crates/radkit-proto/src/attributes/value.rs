//! Decoded attribute values.

use std::borrow::Cow;
use std::net::Ipv4Addr;

/// A decoded attribute payload.
///
/// `Text` carries raw octets rather than `String` because the wire gives no
/// UTF-8 guarantee, and because a User-Password recovered with the wrong
/// shared secret decodes to arbitrary bytes that still need to be carried to
/// the policy layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Raw octets, usually printable text.
    Text(Vec<u8>),
    /// 32-bit unsigned integer.
    Integer(u32),
    /// IPv4 address.
    Ipv4(Ipv4Addr),
    /// Vendor-Specific payload with the six-byte vendor header stripped.
    /// Multiple instances in one message accumulate `|`-joined.
    Vendor(Vec<u8>),
}

impl AttributeValue {
    /// The value as text, when it is a `Text` or `Vendor` payload. Invalid
    /// UTF-8 sequences are replaced.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            AttributeValue::Text(bytes) | AttributeValue::Vendor(bytes) => {
                Some(String::from_utf8_lossy(bytes))
            }
            _ => None,
        }
    }

    /// The value as an integer, when it is one.
    pub fn as_integer(&self) -> Option<u32> {
        match self {
            AttributeValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// The value as an IPv4 address, when it is one.
    pub fn as_ipv4(&self) -> Option<Ipv4Addr> {
        match self {
            AttributeValue::Ipv4(addr) => Some(*addr),
            _ => None,
        }
    }

    /// The raw octets of a `Text` or `Vendor` payload.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AttributeValue::Text(bytes) | AttributeValue::Vendor(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.as_bytes().to_vec())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value.into_bytes())
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<Ipv4Addr> for AttributeValue {
    fn from(value: Ipv4Addr) -> Self {
        AttributeValue::Ipv4(value)
    }
}
