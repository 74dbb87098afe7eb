//! RADIUS message codes.

/// Message codes from RFC 2865 and RFC 2866.
///
/// Only the authentication and accounting codes the engine understands are
/// represented; anything else fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Code {
    /// Access-Request (1)
    AccessRequest = 1,
    /// Access-Accept (2)
    AccessAccept = 2,
    /// Access-Reject (3)
    AccessReject = 3,
    /// Accounting-Request (4)
    AccountingRequest = 4,
    /// Accounting-Response (5)
    AccountingResponse = 5,
}

impl Code {
    /// Convert a wire byte to a `Code`.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Code::AccessRequest),
            2 => Some(Code::AccessAccept),
            3 => Some(Code::AccessReject),
            4 => Some(Code::AccountingRequest),
            5 => Some(Code::AccountingResponse),
            _ => None,
        }
    }

    /// Convert a `Code` to its wire byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// True for the two request codes a server acts on.
    pub fn is_request(self) -> bool {
        matches!(self, Code::AccessRequest | Code::AccountingRequest)
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Code::AccessRequest => "Access-Request",
            Code::AccessAccept => "Access-Accept",
            Code::AccessReject => "Access-Reject",
            Code::AccountingRequest => "Accounting-Request",
            Code::AccountingResponse => "Accounting-Response",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for value in 1..=5u8 {
            let code = Code::from_u8(value).unwrap();
            assert_eq!(code.as_u8(), value);
        }
    }

    #[test]
    fn test_unknown_codes_rejected() {
        assert_eq!(Code::from_u8(0), None);
        assert_eq!(Code::from_u8(11), None);
        assert_eq!(Code::from_u8(255), None);
    }

    #[test]
    fn test_request_codes() {
        assert!(Code::AccessRequest.is_request());
        assert!(Code::AccountingRequest.is_request());
        assert!(!Code::AccessAccept.is_request());
        assert!(!Code::AccountingResponse.is_request());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Code::AccessRequest.to_string(), "Access-Request");
        assert_eq!(Code::AccountingResponse.to_string(), "Accounting-Response");
    }
}
