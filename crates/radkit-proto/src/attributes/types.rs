//! RADIUS attribute type numbers and their value kinds.

/// How an attribute's payload is interpreted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Raw octets, usually printable text.
    Text,
    /// 32-bit unsigned integer, big-endian.
    Integer,
    /// IPv4 address as four octets.
    Ipv4,
    /// User-Password, obfuscated with the MD5 stream described in
    /// RFC 2865 section 5.2.
    Password,
    /// Vendor-Specific payload.
    Vendor,
}

/// Attribute types the codec understands.
///
/// Unlisted type numbers are skipped during parsing rather than rejected,
/// so vendors can salt requests with attributes we do not track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttributeType {
    /// User-Name (1) - RFC 2865
    UserName = 1,
    /// User-Password (2) - RFC 2865
    UserPassword = 2,
    /// NAS-IP-Address (4) - RFC 2865
    NasIpAddress = 4,
    /// NAS-Port (5) - RFC 2865
    NasPort = 5,
    /// Service-Type (6) - RFC 2865
    ServiceType = 6,
    /// Framed-Protocol (7) - RFC 2865
    FramedProtocol = 7,
    /// Framed-IP-Address (8) - RFC 2865
    FramedIpAddress = 8,
    /// Framed-IP-Netmask (9) - RFC 2865
    FramedIpNetmask = 9,
    /// Framed-Routing (10) - RFC 2865
    FramedRouting = 10,
    /// Filter-Id (11) - RFC 2865
    FilterId = 11,
    /// Framed-MTU (12) - RFC 2865
    FramedMtu = 12,
    /// Framed-Compression (13) - RFC 2865
    FramedCompression = 13,
    /// Login-IP-Host (14) - RFC 2865
    LoginIpHost = 14,
    /// Login-Service (15) - RFC 2865
    LoginService = 15,
    /// Login-TCP-Port (16) - RFC 2865
    LoginTcpPort = 16,
    /// Reply-Message (18) - RFC 2865
    ReplyMessage = 18,
    /// Callback-Number (19) - RFC 2865
    CallbackNumber = 19,
    /// Callback-Id (20) - RFC 2865
    CallbackId = 20,
    /// Framed-Route (22) - RFC 2865
    FramedRoute = 22,
    /// Framed-IPX-Network (23) - RFC 2865
    FramedIpxNetwork = 23,
    /// State (24) - RFC 2865
    State = 24,
    /// Class (25) - RFC 2865
    Class = 25,
    /// Vendor-Specific (26) - RFC 2865
    VendorSpecific = 26,
    /// Session-Timeout (27) - RFC 2865
    SessionTimeout = 27,
    /// Idle-Timeout (28) - RFC 2865
    IdleTimeout = 28,
    /// Termination-Action (29) - RFC 2865
    TerminationAction = 29,
    /// Called-Station-Id (30) - RFC 2865
    CalledStationId = 30,
    /// Calling-Station-Id (31) - RFC 2865
    CallingStationId = 31,
    /// NAS-Identifier (32) - RFC 2865
    NasIdentifier = 32,
    /// Proxy-State (33) - RFC 2865
    ProxyState = 33,
    /// Login-LAT-Service (34) - RFC 2865
    LoginLatService = 34,
    /// Login-LAT-Node (35) - RFC 2865
    LoginLatNode = 35,
    /// Login-LAT-Group (36) - RFC 2865
    LoginLatGroup = 36,
    /// Framed-AppleTalk-Link (37) - RFC 2865
    FramedAppleTalkLink = 37,
    /// Framed-AppleTalk-Network (38) - RFC 2865
    FramedAppleTalkNetwork = 38,
    /// Framed-AppleTalk-Zone (39) - RFC 2865
    FramedAppleTalkZone = 39,
    /// Acct-Status-Type (40) - RFC 2866
    AcctStatusType = 40,
    /// Acct-Delay-Time (41) - RFC 2866
    AcctDelayTime = 41,
    /// Acct-Input-Octets (42) - RFC 2866
    AcctInputOctets = 42,
    /// Acct-Output-Octets (43) - RFC 2866
    AcctOutputOctets = 43,
    /// Acct-Session-Id (44) - RFC 2866
    AcctSessionId = 44,
    /// Acct-Authentic (45) - RFC 2866
    AcctAuthentic = 45,
    /// Acct-Session-Time (46) - RFC 2866
    AcctSessionTime = 46,
    /// Acct-Input-Packets (47) - RFC 2866
    AcctInputPackets = 47,
    /// Acct-Output-Packets (48) - RFC 2866
    AcctOutputPackets = 48,
    /// Acct-Terminate-Cause (49) - RFC 2866
    AcctTerminateCause = 49,
    /// Acct-Multi-Session-Id (50) - RFC 2866
    AcctMultiSessionId = 50,
    /// Acct-Link-Count (51) - RFC 2866
    AcctLinkCount = 51,
    /// Acct-Input-Gigawords (52) - RFC 2869
    AcctInputGigawords = 52,
    /// Acct-Output-Gigawords (53) - RFC 2869
    AcctOutputGigawords = 53,
    /// CHAP-Challenge (60) - RFC 2865
    ChapChallenge = 60,
    /// NAS-Port-Type (61) - RFC 2865
    NasPortType = 61,
    /// Port-Limit (62) - RFC 2865
    PortLimit = 62,
    /// Login-LAT-Port (63) - RFC 2865
    LoginLatPort = 63,
    /// Tunnel-Type (64) - RFC 2868
    TunnelType = 64,
    /// Tunnel-Medium-Type (65) - RFC 2868
    TunnelMediumType = 65,
    /// Tunnel-Client-Endpoint (66) - RFC 2868
    TunnelClientEndpoint = 66,
    /// Tunnel-Server-Endpoint (67) - RFC 2868
    TunnelServerEndpoint = 67,
    /// Tunnel-Password (69) - RFC 2868
    TunnelPassword = 69,
    /// Connect-Info (77) - RFC 2869
    ConnectInfo = 77,
    /// Tunnel-Private-Group-ID (81) - RFC 2868
    TunnelPrivateGroupId = 81,
    /// Tunnel-Assignment-ID (82) - RFC 2868
    TunnelAssignmentId = 82,
    /// Tunnel-Preference (83) - RFC 2868
    TunnelPreference = 83,
    /// NAS-Port-Id (87) - RFC 2869
    NasPortId = 87,
    /// Tunnel-Client-Auth-ID (90) - RFC 2868
    TunnelClientAuthId = 90,
    /// Tunnel-Server-Auth-ID (91) - RFC 2868
    TunnelServerAuthId = 91,
}

impl AttributeType {
    /// Convert a wire byte to an `AttributeType`.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(AttributeType::UserName),
            2 => Some(AttributeType::UserPassword),
            4 => Some(AttributeType::NasIpAddress),
            5 => Some(AttributeType::NasPort),
            6 => Some(AttributeType::ServiceType),
            7 => Some(AttributeType::FramedProtocol),
            8 => Some(AttributeType::FramedIpAddress),
            9 => Some(AttributeType::FramedIpNetmask),
            10 => Some(AttributeType::FramedRouting),
            11 => Some(AttributeType::FilterId),
            12 => Some(AttributeType::FramedMtu),
            13 => Some(AttributeType::FramedCompression),
            14 => Some(AttributeType::LoginIpHost),
            15 => Some(AttributeType::LoginService),
            16 => Some(AttributeType::LoginTcpPort),
            18 => Some(AttributeType::ReplyMessage),
            19 => Some(AttributeType::CallbackNumber),
            20 => Some(AttributeType::CallbackId),
            22 => Some(AttributeType::FramedRoute),
            23 => Some(AttributeType::FramedIpxNetwork),
            24 => Some(AttributeType::State),
            25 => Some(AttributeType::Class),
            26 => Some(AttributeType::VendorSpecific),
            27 => Some(AttributeType::SessionTimeout),
            28 => Some(AttributeType::IdleTimeout),
            29 => Some(AttributeType::TerminationAction),
            30 => Some(AttributeType::CalledStationId),
            31 => Some(AttributeType::CallingStationId),
            32 => Some(AttributeType::NasIdentifier),
            33 => Some(AttributeType::ProxyState),
            34 => Some(AttributeType::LoginLatService),
            35 => Some(AttributeType::LoginLatNode),
            36 => Some(AttributeType::LoginLatGroup),
            37 => Some(AttributeType::FramedAppleTalkLink),
            38 => Some(AttributeType::FramedAppleTalkNetwork),
            39 => Some(AttributeType::FramedAppleTalkZone),
            40 => Some(AttributeType::AcctStatusType),
            41 => Some(AttributeType::AcctDelayTime),
            42 => Some(AttributeType::AcctInputOctets),
            43 => Some(AttributeType::AcctOutputOctets),
            44 => Some(AttributeType::AcctSessionId),
            45 => Some(AttributeType::AcctAuthentic),
            46 => Some(AttributeType::AcctSessionTime),
            47 => Some(AttributeType::AcctInputPackets),
            48 => Some(AttributeType::AcctOutputPackets),
            49 => Some(AttributeType::AcctTerminateCause),
            50 => Some(AttributeType::AcctMultiSessionId),
            51 => Some(AttributeType::AcctLinkCount),
            52 => Some(AttributeType::AcctInputGigawords),
            53 => Some(AttributeType::AcctOutputGigawords),
            60 => Some(AttributeType::ChapChallenge),
            61 => Some(AttributeType::NasPortType),
            62 => Some(AttributeType::PortLimit),
            63 => Some(AttributeType::LoginLatPort),
            64 => Some(AttributeType::TunnelType),
            65 => Some(AttributeType::TunnelMediumType),
            66 => Some(AttributeType::TunnelClientEndpoint),
            67 => Some(AttributeType::TunnelServerEndpoint),
            69 => Some(AttributeType::TunnelPassword),
            77 => Some(AttributeType::ConnectInfo),
            81 => Some(AttributeType::TunnelPrivateGroupId),
            82 => Some(AttributeType::TunnelAssignmentId),
            83 => Some(AttributeType::TunnelPreference),
            87 => Some(AttributeType::NasPortId),
            90 => Some(AttributeType::TunnelClientAuthId),
            91 => Some(AttributeType::TunnelServerAuthId),
            _ => None,
        }
    }

    /// Convert an `AttributeType` to its wire byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The value kind the codec applies to this attribute's payload.
    pub fn kind(self) -> AttributeKind {
        use AttributeType::*;
        match self {
            UserPassword => AttributeKind::Password,
            VendorSpecific => AttributeKind::Vendor,
            NasIpAddress | FramedIpAddress | FramedIpNetmask | LoginIpHost => AttributeKind::Ipv4,
            NasPort | ServiceType | FramedProtocol | FramedRouting | FramedMtu
            | FramedCompression | LoginService | LoginTcpPort | FramedIpxNetwork
            | SessionTimeout | IdleTimeout | TerminationAction | FramedAppleTalkLink
            | FramedAppleTalkNetwork | AcctStatusType | AcctDelayTime | AcctInputOctets
            | AcctOutputOctets | AcctAuthentic | AcctSessionTime | AcctInputPackets
            | AcctOutputPackets | AcctTerminateCause | AcctLinkCount | AcctInputGigawords
            | AcctOutputGigawords | NasPortType | PortLimit | TunnelType | TunnelMediumType
            | TunnelPreference => AttributeKind::Integer,
            _ => AttributeKind::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trip() {
        let types = [
            AttributeType::UserName,
            AttributeType::UserPassword,
            AttributeType::NasIpAddress,
            AttributeType::VendorSpecific,
            AttributeType::AcctStatusType,
            AttributeType::AcctSessionId,
            AttributeType::TunnelServerAuthId,
        ];
        for attr_type in types {
            assert_eq!(AttributeType::from_u8(attr_type.as_u8()), Some(attr_type));
        }
    }

    #[test]
    fn test_unassigned_numbers_unknown() {
        // 3 (CHAP-Password), 17, 21 and 68 are not tracked
        assert_eq!(AttributeType::from_u8(0), None);
        assert_eq!(AttributeType::from_u8(3), None);
        assert_eq!(AttributeType::from_u8(17), None);
        assert_eq!(AttributeType::from_u8(21), None);
        assert_eq!(AttributeType::from_u8(68), None);
        assert_eq!(AttributeType::from_u8(200), None);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(AttributeType::UserName.kind(), AttributeKind::Text);
        assert_eq!(AttributeType::UserPassword.kind(), AttributeKind::Password);
        assert_eq!(AttributeType::NasIpAddress.kind(), AttributeKind::Ipv4);
        assert_eq!(AttributeType::FramedIpAddress.kind(), AttributeKind::Ipv4);
        assert_eq!(AttributeType::NasPort.kind(), AttributeKind::Integer);
        assert_eq!(AttributeType::AcctInputOctets.kind(), AttributeKind::Integer);
        assert_eq!(AttributeType::VendorSpecific.kind(), AttributeKind::Vendor);
        assert_eq!(AttributeType::AcctSessionId.kind(), AttributeKind::Text);
        assert_eq!(AttributeType::TunnelClientEndpoint.kind(), AttributeKind::Text);
    }
}
