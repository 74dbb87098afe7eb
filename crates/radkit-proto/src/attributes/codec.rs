//! Wire codec for individual attributes.

use std::net::Ipv4Addr;

use crate::attributes::{AttributeKind, AttributeType, AttributeValue};
use crate::auth;
use crate::packet::MessageError;

/// Longest value an attribute can carry: 255 total length minus the two
/// header octets.
pub const MAX_VALUE_LENGTH: usize = 253;

/// Octets a Vendor-Specific payload loses from its front when decoded: the
/// four-octet vendor id plus the vendor type/length pair.
const VENDOR_HEADER_LENGTH: usize = 6;

/// Decode one attribute payload according to its declared type.
///
/// `request_authenticator` and `secret` feed the User-Password recovery;
/// every other kind ignores them. Integer and IPv4 payloads must be exactly
/// four octets.
pub fn decode(
    attr_type: AttributeType,
    payload: &[u8],
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> Result<AttributeValue, MessageError> {
    let value = match attr_type.kind() {
        AttributeKind::Text => AttributeValue::Text(payload.to_vec()),
        AttributeKind::Integer => {
            AttributeValue::Integer(u32::from_be_bytes(four_octets(attr_type, payload)?))
        }
        AttributeKind::Ipv4 => {
            AttributeValue::Ipv4(Ipv4Addr::from(four_octets(attr_type, payload)?))
        }
        AttributeKind::Password => AttributeValue::Text(auth::decrypt_user_password(
            payload,
            secret,
            request_authenticator,
        )?),
        // A payload shorter than its own vendor header decodes to empty.
        AttributeKind::Vendor => AttributeValue::Vendor(
            payload
                .get(VENDOR_HEADER_LENGTH..)
                .unwrap_or_default()
                .to_vec(),
        ),
    };
    Ok(value)
}

/// Encode one attribute as `type`, `length`, `value` octets.
///
/// The payload follows the value variant: the caller is expected to pair
/// types with values of the matching kind, and to pre-obfuscate
/// User-Password values with [`auth::encrypt_user_password`].
pub fn encode(attr_type: AttributeType, value: &AttributeValue) -> Result<Vec<u8>, MessageError> {
    let payload: Vec<u8> = match value {
        AttributeValue::Text(bytes) | AttributeValue::Vendor(bytes) => bytes.clone(),
        AttributeValue::Integer(integer) => integer.to_be_bytes().to_vec(),
        AttributeValue::Ipv4(addr) => addr.octets().to_vec(),
    };
    if payload.len() > MAX_VALUE_LENGTH {
        return Err(MessageError::AttributeTooLong(payload.len()));
    }

    let mut buffer = Vec::with_capacity(payload.len() + 2);
    buffer.push(attr_type.as_u8());
    buffer.push((payload.len() + 2) as u8);
    buffer.extend_from_slice(&payload);
    Ok(buffer)
}

fn four_octets(attr_type: AttributeType, payload: &[u8]) -> Result<[u8; 4], MessageError> {
    payload
        .try_into()
        .map_err(|_| MessageError::InvalidAttributeValue {
            attr_type: attr_type.as_u8(),
            expected: 4,
            actual: payload.len(),
        })
}
