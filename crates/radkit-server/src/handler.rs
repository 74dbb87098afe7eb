//! Policy surface: the request wrapper, the reply builder, and the
//! handler trait applications implement.

use std::collections::HashMap;
use std::net::SocketAddr;

use radkit_proto::{auth, AttributeType, AttributeValue, Code, Message, MessageError};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::engine::Transport;
use crate::session::Session;

/// Key used for a request that carries no NAS-IP-Address, and session id
/// used when no identity attribute is present at all.
pub const UNKNOWN_NAS: &str = "N/A";

/// Which attribute supplied a derived session id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Acct-Session-Id was present.
    SessionId,
    /// Fell back to User-Name.
    UserName,
    /// Fell back to NAS-Port-Id.
    NasPortId,
    /// Nothing usable; the session runs under the sentinel id.
    Missing,
}

/// Session id derived from an Accounting-Request, with its provenance.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub sid: String,
    pub source: IdentitySource,
}

#[derive(Error, Debug)]
pub enum ReplyError {
    #[error("Reply encoding failed: {0}")]
    Encode(#[from] MessageError),
    #[error("Reply send failed: {0}")]
    Send(#[from] std::io::Error),
}

/// A parsed request plus everything needed to answer it.
pub struct Request<'a> {
    message: &'a Message,
    peer: SocketAddr,
    secret: &'a [u8],
    transport: &'a dyn Transport,
}

impl<'a> Request<'a> {
    pub(crate) fn new(
        message: &'a Message,
        peer: SocketAddr,
        secret: &'a [u8],
        transport: &'a dyn Transport,
    ) -> Self {
        Request {
            message,
            peer,
            secret,
            transport,
        }
    }

    /// The parsed message.
    pub fn message(&self) -> &Message {
        self.message
    }

    /// Source address of the datagram.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Request identifier.
    pub fn identifier(&self) -> u8 {
        self.message.identifier
    }

    /// User-Name, when present.
    pub fn username(&self) -> Option<String> {
        self.message.text(AttributeType::UserName)
    }

    /// Password recovered during parsing. A NAS configured with a
    /// different shared secret produces garbage here, not an error, so a
    /// comparison against the expected password is what rejects it.
    pub fn password(&self) -> Option<String> {
        self.message.text(AttributeType::UserPassword)
    }

    /// NAS-IP-Address in dotted form, or [`UNKNOWN_NAS`] when absent.
    /// Scopes retransmission suppression and session tracking.
    pub fn nas_key(&self) -> String {
        self.message
            .ipv4(AttributeType::NasIpAddress)
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| UNKNOWN_NAS.to_string())
    }

    /// Derive the session id for accounting bookkeeping.
    ///
    /// Prefers Acct-Session-Id, then User-Name, then NAS-Port-Id. With
    /// none of the three present the sentinel id is returned and the
    /// source says so; presence counts even when the value is empty.
    pub fn session_identity(&self) -> SessionIdentity {
        if let Some(sid) = self.message.text(AttributeType::AcctSessionId) {
            return SessionIdentity {
                sid,
                source: IdentitySource::SessionId,
            };
        }
        if let Some(sid) = self.message.text(AttributeType::UserName) {
            return SessionIdentity {
                sid,
                source: IdentitySource::UserName,
            };
        }
        if let Some(sid) = self.message.text(AttributeType::NasPortId) {
            return SessionIdentity {
                sid,
                source: IdentitySource::NasPortId,
            };
        }
        SessionIdentity {
            sid: UNKNOWN_NAS.to_string(),
            source: IdentitySource::Missing,
        }
    }

    /// Start an Access-Accept answering this request.
    pub fn accept(&self) -> Reply<'a> {
        self.reply(Code::AccessAccept)
    }

    /// Start an Access-Reject answering this request.
    pub fn reject(&self) -> Reply<'a> {
        self.reply(Code::AccessReject)
    }

    /// Start a reply of the given code answering this request.
    pub fn reply(&self, code: Code) -> Reply<'a> {
        Reply {
            // the Response Authenticator is computed over the request's
            // authenticator, which therefore rides along until sealing
            message: Message::new(code, self.message.identifier, self.message.authenticator),
            peer: self.peer,
            secret: self.secret,
            transport: self.transport,
        }
    }
}

/// An outgoing reply under construction. Dropping it without calling
/// [`Reply::send`] sends nothing.
pub struct Reply<'a> {
    message: Message,
    peer: SocketAddr,
    secret: &'a [u8],
    transport: &'a dyn Transport,
}

impl Reply<'_> {
    /// Append an attribute.
    pub fn add_attribute(mut self, attr_type: AttributeType, value: AttributeValue) -> Self {
        self.message.add_attribute(attr_type, value);
        self
    }

    /// Seal and transmit the reply.
    ///
    /// Oversized attributes or messages surface here as encoding errors,
    /// as do transport failures; the datagram is fire-and-forget beyond
    /// that.
    pub fn send(self) -> Result<(), ReplyError> {
        let mut wire = self.message.encode()?;
        auth::seal_response(&mut wire, self.secret);
        self.transport.send(&wire, self.peer)?;
        Ok(())
    }
}

/// Application policy invoked by the engine.
///
/// The access verdict belongs entirely to `on_access_request`: build it
/// with [`Request::accept`] or [`Request::reject`] and send it; the engine
/// sends nothing for an Access-Request on its own. The accounting
/// callbacks run with the tracked session borrowed mutably and the
/// Accounting-Response is sent by the engine afterwards.
///
/// Callbacks run inline on the datagram path and must not block or call
/// back into the engine.
pub trait RadiusHandler: Send + Sync {
    /// An Access-Request passed replay suppression.
    fn on_access_request(&self, request: &Request<'_>);

    /// An Accounting-Start was applied; the session is now tracked.
    fn on_accounting_start(&self, _request: &Request<'_>, _session: &mut Session) {}

    /// An Accounting-Stop was applied; the session is removed right after
    /// this returns.
    fn on_accounting_stop(&self, _request: &Request<'_>, _session: &mut Session) {}

    /// An Interim-Update was applied to a live session.
    fn on_interim_update(&self, _request: &Request<'_>, _session: &mut Session) {}
}

/// Authentication against a fixed username/password list, as loaded from
/// the configuration file.
#[derive(Default)]
pub struct StaticUserHandler {
    users: HashMap<String, String>,
}

impl StaticUserHandler {
    pub fn new() -> Self {
        StaticUserHandler {
            users: HashMap::new(),
        }
    }

    /// Register a user.
    pub fn add_user(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.users.insert(username.into(), password.into());
    }

    fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .map(|expected| expected == password)
            .unwrap_or(false)
    }
}

impl RadiusHandler for StaticUserHandler {
    fn on_access_request(&self, request: &Request<'_>) {
        let username = request.username().unwrap_or_default();
        let granted = match request.password() {
            Some(ref password) => self.verify(&username, password),
            None => false,
        };

        let result = if granted {
            info!(
                username = %username,
                client_ip = %request.peer().ip(),
                "Access granted"
            );
            request.accept().send()
        } else {
            warn!(
                username = %username,
                client_ip = %request.peer().ip(),
                "Access denied"
            );
            request
                .reject()
                .add_attribute(AttributeType::ReplyMessage, "Authentication failed".into())
                .send()
        };

        if let Err(e) = result {
            error!(error = %e, "Failed to send access verdict");
        }
    }

    fn on_accounting_start(&self, _request: &Request<'_>, session: &mut Session) {
        info!(
            session_id = %session.sid,
            nas = %session.nas,
            username = session.username.as_deref().unwrap_or("-"),
            "Session started"
        );
    }

    fn on_accounting_stop(&self, _request: &Request<'_>, session: &mut Session) {
        info!(
            session_id = %session.sid,
            nas = %session.nas,
            input_octets = session.input_octets.unwrap_or(0),
            output_octets = session.output_octets.unwrap_or(0),
            duration = session.duration().unwrap_or(0),
            "Session stopped"
        );
    }

    fn on_interim_update(&self, _request: &Request<'_>, session: &mut Session) {
        debug!(session_id = %session.sid, nas = %session.nas, "Interim update");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radkit_proto::auth::{encrypt_user_password, generate_request_authenticator};
    use std::io;
    use std::sync::Mutex;

    const SECRET: &[u8] = b"s3cr3t";

    #[derive(Default)]
    struct MockTransport {
        sent: Mutex<Vec<(Vec<u8>, SocketAddr)>>,
    }

    impl Transport for MockTransport {
        fn send(&self, data: &[u8], peer: SocketAddr) -> io::Result<()> {
            self.sent.lock().unwrap().push((data.to_vec(), peer));
            Ok(())
        }
    }

    fn peer() -> SocketAddr {
        "10.0.0.9:49152".parse().unwrap()
    }

    fn access_request(username: &str, password: &str) -> Message {
        let authenticator = generate_request_authenticator();
        let mut message = Message::new(Code::AccessRequest, 1, authenticator);
        message.add_attribute(AttributeType::UserName, username.into());
        let block = encrypt_user_password(password, SECRET, &authenticator).unwrap();
        message.add_attribute(AttributeType::UserPassword, AttributeValue::Text(block));
        let wire = message.encode().unwrap();
        Message::parse(&wire, SECRET).unwrap()
    }

    #[test]
    fn test_request_accessors() {
        let message = access_request("bob", "hunter2");
        let transport = MockTransport::default();
        let request = Request::new(&message, peer(), SECRET, &transport);

        assert_eq!(request.identifier(), 1);
        assert_eq!(request.username().as_deref(), Some("bob"));
        assert_eq!(request.password().as_deref(), Some("hunter2"));
        assert_eq!(request.nas_key(), UNKNOWN_NAS);
    }

    #[test]
    fn test_nas_key_from_attribute() {
        let mut message = access_request("bob", "hunter2");
        message.add_attribute(
            AttributeType::NasIpAddress,
            std::net::Ipv4Addr::new(10, 0, 0, 1).into(),
        );
        let transport = MockTransport::default();
        let request = Request::new(&message, peer(), SECRET, &transport);
        assert_eq!(request.nas_key(), "10.0.0.1");
    }

    #[test]
    fn test_session_identity_fallback_chain() {
        let transport = MockTransport::default();

        let mut message = Message::new(Code::AccountingRequest, 1, [0u8; 16]);
        message.add_attribute(AttributeType::AcctSessionId, "abc".into());
        message.add_attribute(AttributeType::UserName, "bob".into());
        let request = Request::new(&message, peer(), SECRET, &transport);
        let identity = request.session_identity();
        assert_eq!(identity.sid, "abc");
        assert_eq!(identity.source, IdentitySource::SessionId);

        let mut message = Message::new(Code::AccountingRequest, 1, [0u8; 16]);
        message.add_attribute(AttributeType::UserName, "bob".into());
        let request = Request::new(&message, peer(), SECRET, &transport);
        let identity = request.session_identity();
        assert_eq!(identity.sid, "bob");
        assert_eq!(identity.source, IdentitySource::UserName);

        let mut message = Message::new(Code::AccountingRequest, 1, [0u8; 16]);
        message.add_attribute(AttributeType::NasPortId, "eth0".into());
        let request = Request::new(&message, peer(), SECRET, &transport);
        let identity = request.session_identity();
        assert_eq!(identity.sid, "eth0");
        assert_eq!(identity.source, IdentitySource::NasPortId);

        let message = Message::new(Code::AccountingRequest, 1, [0u8; 16]);
        let request = Request::new(&message, peer(), SECRET, &transport);
        let identity = request.session_identity();
        assert_eq!(identity.sid, UNKNOWN_NAS);
        assert_eq!(identity.source, IdentitySource::Missing);
    }

    #[test]
    fn test_empty_session_id_still_counts_as_present() {
        let transport = MockTransport::default();
        let mut message = Message::new(Code::AccountingRequest, 1, [0u8; 16]);
        message.add_attribute(AttributeType::AcctSessionId, "".into());
        message.add_attribute(AttributeType::UserName, "bob".into());
        let request = Request::new(&message, peer(), SECRET, &transport);

        let identity = request.session_identity();
        assert_eq!(identity.sid, "");
        assert_eq!(identity.source, IdentitySource::SessionId);
    }

    #[test]
    fn test_reply_echoes_identifier_and_seals() {
        let message = access_request("bob", "hunter2");
        let request_authenticator = message.authenticator;
        let transport = MockTransport::default();
        let request = Request::new(&message, peer(), SECRET, &transport);

        request
            .accept()
            .add_attribute(AttributeType::ReplyMessage, "Welcome".into())
            .send()
            .unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (wire, to) = &sent[0];
        assert_eq!(*to, peer());
        assert_eq!(wire[0], Code::AccessAccept.as_u8());
        assert_eq!(wire[1], 1);
        assert!(auth::verify_response_authenticator(
            wire,
            &request_authenticator,
            SECRET
        ));
    }

    #[test]
    fn test_reply_surfaces_encoding_error() {
        let message = access_request("bob", "hunter2");
        let transport = MockTransport::default();
        let request = Request::new(&message, peer(), SECRET, &transport);

        let result = request
            .accept()
            .add_attribute(
                AttributeType::ReplyMessage,
                AttributeValue::Text(vec![b'x'; 300]),
            )
            .send();
        assert!(matches!(
            result,
            Err(ReplyError::Encode(MessageError::AttributeTooLong(300)))
        ));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_static_user_handler_verdicts() {
        let mut handler = StaticUserHandler::new();
        handler.add_user("bob", "hunter2");

        let transport = MockTransport::default();
        let message = access_request("bob", "hunter2");
        let request = Request::new(&message, peer(), SECRET, &transport);
        handler.on_access_request(&request);

        let message = access_request("bob", "wrong");
        let request = Request::new(&message, peer(), SECRET, &transport);
        handler.on_access_request(&request);

        let message = access_request("mallory", "hunter2");
        let request = Request::new(&message, peer(), SECRET, &transport);
        handler.on_access_request(&request);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].0[0], Code::AccessAccept.as_u8());
        assert_eq!(sent[1].0[0], Code::AccessReject.as_u8());
        assert_eq!(sent[2].0[0], Code::AccessReject.as_u8());
    }

    #[test]
    fn test_static_user_handler_requires_password() {
        let mut handler = StaticUserHandler::new();
        handler.add_user("bob", "hunter2");

        let mut message = Message::new(Code::AccessRequest, 4, [0u8; 16]);
        message.add_attribute(AttributeType::UserName, "bob".into());
        let transport = MockTransport::default();
        let request = Request::new(&message, peer(), SECRET, &transport);
        handler.on_access_request(&request);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0[0], Code::AccessReject.as_u8());
    }
}
