//! Accounting status values.

/// Acct-Status-Type values from RFC 2866 section 5.1 that drive session
/// tracking. Other values (Accounting-On, Accounting-Off, and the rest) are
/// acknowledged but cause no session change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AcctStatusType {
    /// Start (1)
    Start = 1,
    /// Stop (2)
    Stop = 2,
    /// Interim-Update (3)
    InterimUpdate = 3,
}

impl AcctStatusType {
    /// Convert a wire value to an `AcctStatusType`.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(AcctStatusType::Start),
            2 => Some(AcctStatusType::Stop),
            3 => Some(AcctStatusType::InterimUpdate),
            _ => None,
        }
    }

    /// Convert an `AcctStatusType` to its wire value.
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}
