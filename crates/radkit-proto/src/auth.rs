//! Authenticator and password handling for RADIUS messages.
//!
//! Implements the MD5-based constructions from RFC 2865: the Request and
//! Response Authenticators (section 3) and the User-Password obfuscation
//! (section 5.2).

use rand::Rng;

use crate::packet::MessageError;

/// Generate a random Request Authenticator for an outgoing request.
pub fn generate_request_authenticator() -> [u8; 16] {
    let mut rng = rand::rng();
    let mut authenticator = [0u8; 16];
    rng.fill(&mut authenticator[..]);
    authenticator
}

/// Compute the Response Authenticator for an encoded reply.
///
/// The digest covers the reply exactly as it will sit on the wire except
/// that the authenticator field (bytes 4..20) must still hold the Request
/// Authenticator of the message being answered. `seal_response` does the
/// field swap for you.
pub fn response_authenticator(encoded: &[u8], secret: &[u8]) -> [u8; 16] {
    let mut data = Vec::with_capacity(encoded.len() + secret.len());
    data.extend_from_slice(encoded);
    data.extend_from_slice(secret);
    md5::compute(&data).0
}

/// Compute the Response Authenticator and splice it into an encoded reply.
///
/// `encoded` must be a full message (at least 20 bytes) whose authenticator
/// field carries the Request Authenticator of the message being answered.
pub fn seal_response(encoded: &mut [u8], secret: &[u8]) {
    let digest = response_authenticator(encoded, secret);
    encoded[4..20].copy_from_slice(&digest);
}

/// Check a received reply against the Request Authenticator it answers.
pub fn verify_response_authenticator(
    encoded: &[u8],
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> bool {
    if encoded.len() < 20 {
        return false;
    }
    let mut data = encoded.to_vec();
    data[4..20].copy_from_slice(request_authenticator);
    response_authenticator(&data, secret)[..] == encoded[4..20]
}

/// Obfuscate a password for a User-Password attribute.
///
/// The password is zero-padded to one 16-byte block and XORed with
/// `MD5(secret + request_authenticator)`. Longer passwords would need the
/// chained multi-block construction, which this codec does not speak, so
/// they are refused outright instead of being silently truncated.
pub fn encrypt_user_password(
    password: &str,
    secret: &[u8],
    request_authenticator: &[u8; 16],
) -> Result<Vec<u8>, MessageError> {
    let password = password.as_bytes();
    if password.len() > 16 {
        return Err(MessageError::PasswordTooLong(password.len()));
    }

    let mask = password_mask(secret, request_authenticator);
    let mut block = [0u8; 16];
    block[..password.len()].copy_from_slice(password);
    for (byte, mask_byte) in block.iter_mut().zip(mask.iter()) {
        *byte ^= mask_byte;
    }
    Ok(block.to_vec())
}

/// Recover the password bytes from a User-Password attribute.
///
/// Zero bytes are padding and are dropped wherever they appear in the
/// recovered block, not just at the end. A wrong shared secret yields
/// garbage bytes, never an error; rejecting those is an authentication
/// decision, not a codec one.
pub fn decrypt_user_password(
    encrypted: &[u8],
    secret: &[u8],
    request_authenticator: &[u8; 16],
) -> Result<Vec<u8>, MessageError> {
    if encrypted.len() != 16 {
        return Err(MessageError::InvalidPasswordBlock(encrypted.len()));
    }

    let mask = password_mask(secret, request_authenticator);
    let mut password = Vec::with_capacity(16);
    for (byte, mask_byte) in encrypted.iter().zip(mask.iter()) {
        let plain = byte ^ mask_byte;
        if plain != 0 {
            password.push(plain);
        }
    }
    Ok(password)
}

fn password_mask(secret: &[u8], request_authenticator: &[u8; 16]) -> [u8; 16] {
    let mut data = Vec::with_capacity(secret.len() + 16);
    data.extend_from_slice(secret);
    data.extend_from_slice(request_authenticator);
    md5::compute(&data).0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"s3cr3t";

    #[test]
    fn test_request_authenticators_differ() {
        assert_ne!(
            generate_request_authenticator(),
            generate_request_authenticator()
        );
    }

    #[test]
    fn test_password_round_trip() {
        let authenticator = generate_request_authenticator();
        let encrypted = encrypt_user_password("hunter2", SECRET, &authenticator).unwrap();
        assert_eq!(encrypted.len(), 16);
        let decrypted = decrypt_user_password(&encrypted, SECRET, &authenticator).unwrap();
        assert_eq!(decrypted, b"hunter2");
    }

    #[test]
    fn test_sixteen_byte_password_round_trip() {
        let authenticator = [0x42u8; 16];
        let encrypted = encrypt_user_password("0123456789abcdef", SECRET, &authenticator).unwrap();
        let decrypted = decrypt_user_password(&encrypted, SECRET, &authenticator).unwrap();
        assert_eq!(decrypted, b"0123456789abcdef");
    }

    #[test]
    fn test_encrypt_matches_manual_mask() {
        let authenticator = [7u8; 16];
        let mut mask_input = SECRET.to_vec();
        mask_input.extend_from_slice(&authenticator);
        let mask = md5::compute(&mask_input).0;

        let mut expected = [0u8; 16];
        expected[..7].copy_from_slice(b"hunter2");
        for (byte, mask_byte) in expected.iter_mut().zip(mask.iter()) {
            *byte ^= mask_byte;
        }

        let encrypted = encrypt_user_password("hunter2", SECRET, &authenticator).unwrap();
        assert_eq!(encrypted, expected);
    }

    #[test]
    fn test_interior_nul_bytes_stripped() {
        let authenticator = [9u8; 16];
        let encrypted = encrypt_user_password("pa\0ss", SECRET, &authenticator).unwrap();
        let decrypted = decrypt_user_password(&encrypted, SECRET, &authenticator).unwrap();
        assert_eq!(decrypted, b"pass");
    }

    #[test]
    fn test_overlong_password_refused() {
        let authenticator = [0u8; 16];
        let result = encrypt_user_password("01234567890123456", SECRET, &authenticator);
        assert!(matches!(result, Err(MessageError::PasswordTooLong(17))));
    }

    #[test]
    fn test_wrong_block_size_refused() {
        let authenticator = [0u8; 16];
        let result = decrypt_user_password(&[0u8; 15], SECRET, &authenticator);
        assert!(matches!(result, Err(MessageError::InvalidPasswordBlock(15))));
        let result = decrypt_user_password(&[0u8; 32], SECRET, &authenticator);
        assert!(matches!(result, Err(MessageError::InvalidPasswordBlock(32))));
    }

    #[test]
    fn test_wrong_secret_yields_garbage_not_error() {
        let authenticator = generate_request_authenticator();
        let encrypted = encrypt_user_password("hunter2", SECRET, &authenticator).unwrap();
        let decrypted = decrypt_user_password(&encrypted, b"other", &authenticator).unwrap();
        assert_ne!(decrypted, b"hunter2");
    }

    #[test]
    fn test_response_authenticator_matches_manual_digest() {
        let encoded = [
            0x02, 0x01, 0x00, 0x14, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa,
            0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa,
        ];
        let mut data = encoded.to_vec();
        data.extend_from_slice(SECRET);
        let expected = md5::compute(&data).0;
        assert_eq!(response_authenticator(&encoded, SECRET), expected);
    }

    #[test]
    fn test_seal_and_verify() {
        let request_authenticator = [0xaau8; 16];
        let mut reply = vec![0x02, 0x01, 0x00, 0x14];
        reply.extend_from_slice(&request_authenticator);
        seal_response(&mut reply, SECRET);

        assert_ne!(reply[4..20], request_authenticator);
        assert!(verify_response_authenticator(
            &reply,
            &request_authenticator,
            SECRET
        ));
        assert!(!verify_response_authenticator(
            &reply,
            &request_authenticator,
            b"other"
        ));

        let mut tampered = reply.clone();
        tampered[1] ^= 1;
        assert!(!verify_response_authenticator(
            &tampered,
            &request_authenticator,
            SECRET
        ));
    }

    #[test]
    fn test_verify_rejects_short_input() {
        assert!(!verify_response_authenticator(&[0u8; 10], &[0u8; 16], SECRET));
    }
}
