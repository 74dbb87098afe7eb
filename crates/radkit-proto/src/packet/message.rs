//! RADIUS message framing.
//!
//! Wire layout per RFC 2865 section 3:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Code      |  Identifier   |            Length             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                                                               |
//! |                         Authenticator                         |
//! |                                                               |
//! |                                                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Attributes ...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-
//! ```

use std::io::{Cursor, Read};
use std::net::Ipv4Addr;

use thiserror::Error;

use crate::attributes::{codec, AttributeType, AttributeValue};
use crate::packet::Code;

/// Errors raised while parsing or encoding messages and attributes.
#[derive(Error, Debug)]
pub enum MessageError {
    /// Datagram shorter than the fixed header plus authenticator.
    #[error("Message truncated: {0} bytes is shorter than the 20-byte header")]
    Truncated(usize),

    /// Declared length below 20, above 4096, or past the end of the datagram.
    #[error("Invalid declared message length: {0}")]
    InvalidLength(usize),

    /// Code byte outside the known authentication and accounting codes.
    #[error("Unknown message code: {0}")]
    InvalidCode(u8),

    /// Attribute length octet of 0 or 1, which could never advance the scan.
    #[error("Invalid attribute length octet: {0}")]
    InvalidAttributeLength(u8),

    /// Attribute header or payload extends past the declared message length.
    #[error("Attribute {attr_type} at offset {offset} overruns the declared length")]
    AttributeOverrun { attr_type: u8, offset: usize },

    /// Fixed-size payload (integer or IPv4) with the wrong octet count.
    #[error("Attribute {attr_type} payload must be {expected} octets, got {actual}")]
    InvalidAttributeValue {
        attr_type: u8,
        expected: usize,
        actual: usize,
    },

    /// Attribute value past the 253-octet ceiling.
    #[error("Attribute value too long: {0} octets (max 253)")]
    AttributeTooLong(usize),

    /// Encoded message past the 4096-octet ceiling.
    #[error("Message too large: {0} octets (max 4096)")]
    MessageTooLarge(usize),

    /// User-Password attribute whose payload is not one 16-octet block.
    #[error("User-Password block must be 16 octets, got {0}")]
    InvalidPasswordBlock(usize),

    /// Password longer than one obfuscation block.
    #[error("Password too long for one block: {0} octets (max 16)")]
    PasswordTooLong(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One RADIUS message, request or reply.
///
/// Attributes are an ordered multimap: adding a type that is already
/// present appends rather than overwrites, and insertion order is what gets
/// serialized. The only merging the parser performs is for Vendor-Specific,
/// where repeated instances accumulate into one `|`-joined value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message code
    pub code: Code,
    /// Identifier echoed between a request and its reply.
    pub identifier: u8,
    /// Request Authenticator (requests) or Response Authenticator (replies).
    pub authenticator: [u8; 16],
    attributes: Vec<(AttributeType, AttributeValue)>,
}

impl Message {
    /// Header plus authenticator; no datagram below this parses.
    pub const MIN_SIZE: usize = 20;
    /// RFC 2865 ceiling on a whole message.
    pub const MAX_SIZE: usize = 4096;

    /// Create a message with no attributes.
    pub fn new(code: Code, identifier: u8, authenticator: [u8; 16]) -> Self {
        Message {
            code,
            identifier,
            authenticator,
            attributes: Vec::new(),
        }
    }

    /// Append an attribute. Repeating a type adds another instance.
    pub fn add_attribute(&mut self, attr_type: AttributeType, value: AttributeValue) {
        self.attributes.push((attr_type, value));
    }

    /// All attributes in insertion order.
    pub fn attributes(&self) -> &[(AttributeType, AttributeValue)] {
        &self.attributes
    }

    /// The first value of the given type.
    pub fn get(&self, attr_type: AttributeType) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(t, _)| *t == attr_type)
            .map(|(_, value)| value)
    }

    /// Every value of the given type, in insertion order.
    pub fn get_all(&self, attr_type: AttributeType) -> impl Iterator<Item = &AttributeValue> {
        self.attributes
            .iter()
            .filter(move |(t, _)| *t == attr_type)
            .map(|(_, value)| value)
    }

    /// Whether at least one attribute of the given type is present.
    pub fn has(&self, attr_type: AttributeType) -> bool {
        self.get(attr_type).is_some()
    }

    /// First value of the given type as text.
    pub fn text(&self, attr_type: AttributeType) -> Option<String> {
        self.get(attr_type)
            .and_then(|value| value.as_text())
            .map(|text| text.into_owned())
    }

    /// First value of the given type as an integer.
    pub fn integer(&self, attr_type: AttributeType) -> Option<u32> {
        self.get(attr_type).and_then(|value| value.as_integer())
    }

    /// First value of the given type as an IPv4 address.
    pub fn ipv4(&self, attr_type: AttributeType) -> Option<Ipv4Addr> {
        self.get(attr_type).and_then(|value| value.as_ipv4())
    }

    /// Parse a datagram.
    ///
    /// The shared secret is needed up front because User-Password recovery
    /// is part of decoding. Attribute types we do not track are skipped;
    /// octets past the declared length are ignored as padding. Structural
    /// problems fail the whole message.
    pub fn parse(data: &[u8], secret: &[u8]) -> Result<Self, MessageError> {
        if data.len() < Self::MIN_SIZE {
            return Err(MessageError::Truncated(data.len()));
        }

        let mut cursor = Cursor::new(data);
        let mut header = [0u8; 4];
        cursor.read_exact(&mut header)?;
        let code = Code::from_u8(header[0]).ok_or(MessageError::InvalidCode(header[0]))?;
        let identifier = header[1];
        let length = u16::from_be_bytes([header[2], header[3]]) as usize;
        if length < Self::MIN_SIZE || length > Self::MAX_SIZE || length > data.len() {
            return Err(MessageError::InvalidLength(length));
        }
        let mut authenticator = [0u8; 16];
        cursor.read_exact(&mut authenticator)?;

        let mut message = Message::new(code, identifier, authenticator);
        let mut offset = Self::MIN_SIZE;
        while offset < length {
            if length - offset < 2 {
                return Err(MessageError::AttributeOverrun {
                    attr_type: data[offset],
                    offset,
                });
            }
            let attr_type = data[offset];
            let attr_len = data[offset + 1] as usize;
            if attr_len < 2 {
                // 0 or 1 would never advance the scan
                return Err(MessageError::InvalidAttributeLength(data[offset + 1]));
            }
            if offset + attr_len > length {
                return Err(MessageError::AttributeOverrun { attr_type, offset });
            }

            let payload = &data[offset + 2..offset + attr_len];
            if let Some(known) = AttributeType::from_u8(attr_type) {
                let value = codec::decode(known, payload, &authenticator, secret)?;
                message.push_decoded(known, value);
            }
            offset += attr_len;
        }
        Ok(message)
    }

    /// Encode the message for the wire.
    ///
    /// The authenticator field is written exactly as stored; signing a
    /// reply happens on the encoded buffer afterwards (see
    /// [`crate::auth::seal_response`]).
    pub fn encode(&self) -> Result<Vec<u8>, MessageError> {
        let mut buffer = Vec::with_capacity(Self::MIN_SIZE);
        buffer.push(self.code.as_u8());
        buffer.push(self.identifier);
        // length backfilled once the attributes are in
        let length_pos = buffer.len();
        buffer.extend_from_slice(&[0, 0]);
        buffer.extend_from_slice(&self.authenticator);

        for (attr_type, value) in &self.attributes {
            let encoded = codec::encode(*attr_type, value)?;
            buffer.extend_from_slice(&encoded);
        }

        let total_length = buffer.len();
        if total_length > Self::MAX_SIZE {
            return Err(MessageError::MessageTooLarge(total_length));
        }
        buffer[length_pos] = (total_length >> 8) as u8;
        buffer[length_pos + 1] = (total_length & 0xff) as u8;
        Ok(buffer)
    }

    /// Insert a freshly decoded attribute, folding repeated Vendor-Specific
    /// instances into the first one with a `|` separator.
    fn push_decoded(&mut self, attr_type: AttributeType, value: AttributeValue) {
        if let AttributeValue::Vendor(new_bytes) = &value {
            let existing = self
                .attributes
                .iter_mut()
                .find(|(t, _)| *t == AttributeType::VendorSpecific)
                .map(|(_, value)| value);
            if let Some(AttributeValue::Vendor(existing)) = existing {
                existing.push(b'|');
                existing.extend_from_slice(new_bytes);
                return;
            }
        }
        self.attributes.push((attr_type, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth;

    const SECRET: &[u8] = b"s3cr3t";

    fn vendor_payload(value: &[u8]) -> Vec<u8> {
        // vendor id 9, vendor type 1, vendor length
        let mut payload = vec![0x00, 0x00, 0x00, 0x09, 0x01, (value.len() + 2) as u8];
        payload.extend_from_slice(value);
        payload
    }

    #[test]
    fn test_encode_parse_round_trip() {
        let mut message = Message::new(Code::AccessRequest, 42, [0xab; 16]);
        message.add_attribute(AttributeType::UserName, "bob".into());
        message.add_attribute(AttributeType::NasIpAddress, Ipv4Addr::new(10, 0, 0, 1).into());
        message.add_attribute(AttributeType::NasPort, 5u32.into());

        let encoded = message.encode().unwrap();
        assert_eq!(encoded[0], 1);
        assert_eq!(encoded[1], 42);
        let declared = u16::from_be_bytes([encoded[2], encoded[3]]) as usize;
        assert_eq!(declared, encoded.len());

        let parsed = Message::parse(&encoded, SECRET).unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_parse_rejects_short_datagram() {
        let result = Message::parse(&[0u8; 19], SECRET);
        assert!(matches!(result, Err(MessageError::Truncated(19))));
    }

    #[test]
    fn test_parse_rejects_unknown_code() {
        let mut data = vec![11, 1, 0, 20];
        data.extend_from_slice(&[0u8; 16]);
        let result = Message::parse(&data, SECRET);
        assert!(matches!(result, Err(MessageError::InvalidCode(11))));
    }

    #[test]
    fn test_parse_rejects_bad_declared_length() {
        // declared shorter than the header
        let mut data = vec![1, 1, 0, 10];
        data.extend_from_slice(&[0u8; 16]);
        assert!(matches!(
            Message::parse(&data, SECRET),
            Err(MessageError::InvalidLength(10))
        ));

        // declared longer than the datagram
        data[2] = 0;
        data[3] = 30;
        assert!(matches!(
            Message::parse(&data, SECRET),
            Err(MessageError::InvalidLength(30))
        ));
    }

    #[test]
    fn test_parse_rejects_zero_attribute_length() {
        let mut data = vec![1, 1, 0, 22];
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&[1, 0]);
        let result = Message::parse(&data, SECRET);
        assert!(matches!(result, Err(MessageError::InvalidAttributeLength(0))));
    }

    #[test]
    fn test_parse_rejects_attribute_overrun() {
        let mut data = vec![1, 1, 0, 24];
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&[1, 10, b'b', b'o']);
        let result = Message::parse(&data, SECRET);
        assert!(matches!(
            result,
            Err(MessageError::AttributeOverrun {
                attr_type: 1,
                offset: 20,
            })
        ));
    }

    #[test]
    fn test_parse_rejects_dangling_attribute_header() {
        let mut data = vec![1, 1, 0, 21];
        data.extend_from_slice(&[0u8; 16]);
        data.push(1);
        let result = Message::parse(&data, SECRET);
        assert!(matches!(
            result,
            Err(MessageError::AttributeOverrun { offset: 20, .. })
        ));
    }

    #[test]
    fn test_parse_skips_unknown_attribute_types() {
        // CHAP-Password (3) is not in the table
        let mut data = vec![1, 1, 0, 29];
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&[1, 5, b'b', b'o', b'b']);
        data.extend_from_slice(&[3, 4, 0xde, 0xad]);
        let parsed = Message::parse(&data, SECRET).unwrap();
        assert_eq!(parsed.attributes().len(), 1);
        assert_eq!(parsed.text(AttributeType::UserName).unwrap(), "bob");
    }

    #[test]
    fn test_parse_ignores_padding_after_declared_length() {
        let mut message = Message::new(Code::AccountingRequest, 3, [0x01; 16]);
        message.add_attribute(AttributeType::AcctSessionId, "abc".into());
        let mut encoded = message.encode().unwrap();
        encoded.extend_from_slice(&[0u8; 4]);

        let parsed = Message::parse(&encoded, SECRET).unwrap();
        assert_eq!(parsed.attributes().len(), 1);
        assert_eq!(parsed.text(AttributeType::AcctSessionId).unwrap(), "abc");
    }

    #[test]
    fn test_repeated_vendor_attributes_accumulate() {
        let first = vendor_payload(b"A");
        let second = vendor_payload(b"B");
        let length = 20 + first.len() + second.len() + 4;
        let mut data = vec![4, 9, 0, length as u8];
        data.extend_from_slice(&[0x02; 16]);
        data.push(26);
        data.push((first.len() + 2) as u8);
        data.extend_from_slice(&first);
        data.push(26);
        data.push((second.len() + 2) as u8);
        data.extend_from_slice(&second);

        let parsed = Message::parse(&data, SECRET).unwrap();
        assert_eq!(parsed.attributes().len(), 1);
        assert_eq!(
            parsed.get(AttributeType::VendorSpecific).unwrap(),
            &AttributeValue::Vendor(b"A|B".to_vec())
        );
        assert_eq!(parsed.text(AttributeType::VendorSpecific).unwrap(), "A|B");
    }

    #[test]
    fn test_repeated_plain_attributes_kept_separately() {
        let mut message = Message::new(Code::AccessRequest, 1, [0u8; 16]);
        message.add_attribute(AttributeType::ProxyState, "one".into());
        message.add_attribute(AttributeType::ProxyState, "two".into());
        let encoded = message.encode().unwrap();

        let parsed = Message::parse(&encoded, SECRET).unwrap();
        let values: Vec<_> = parsed.get_all(AttributeType::ProxyState).collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].as_text().unwrap(), "one");
        assert_eq!(values[1].as_text().unwrap(), "two");
        assert_eq!(parsed.text(AttributeType::ProxyState).unwrap(), "one");
    }

    #[test]
    fn test_password_survives_encode_and_parse() {
        let authenticator = auth::generate_request_authenticator();
        let mut message = Message::new(Code::AccessRequest, 7, authenticator);
        message.add_attribute(AttributeType::UserName, "bob".into());
        let block = auth::encrypt_user_password("hunter2", SECRET, &authenticator).unwrap();
        message.add_attribute(AttributeType::UserPassword, AttributeValue::Text(block));

        let encoded = message.encode().unwrap();
        let parsed = Message::parse(&encoded, SECRET).unwrap();
        assert_eq!(parsed.text(AttributeType::UserPassword).unwrap(), "hunter2");
    }

    #[test]
    fn test_encode_rejects_oversized_message() {
        let mut message = Message::new(Code::AccessRequest, 1, [0u8; 16]);
        for _ in 0..16 {
            message.add_attribute(
                AttributeType::FilterId,
                AttributeValue::Text(vec![b'x'; codec::MAX_VALUE_LENGTH]),
            );
        }
        let result = message.encode();
        assert!(matches!(result, Err(MessageError::MessageTooLarge(4100))));
    }

    #[test]
    fn test_empty_message_is_twenty_bytes() {
        let message = Message::new(Code::AccessAccept, 9, [0x55; 16]);
        let encoded = message.encode().unwrap();
        assert_eq!(encoded.len(), Message::MIN_SIZE);
        assert_eq!(&encoded[4..20], &[0x55; 16]);
    }
}
