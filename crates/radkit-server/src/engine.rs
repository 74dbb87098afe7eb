//! The protocol engine: datagram dispatch, retransmission suppression,
//! and the accounting session lifecycle.
//!
//! The engine is synchronous and transport-agnostic. Listeners hand it raw
//! datagrams together with a [`Transport`] for replies; everything else,
//! including which requests are answered at all, is decided here and in
//! the application's [`RadiusHandler`].

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use dashmap::DashMap;
use radkit_proto::{AcctStatusType, AttributeType, Code, Message};
use tracing::{debug, error, info, warn};

use crate::audit::{AuditEntry, AuditEventType, AuditLogger};
use crate::handler::{IdentitySource, RadiusHandler, Request};
use crate::replay::ReplayGuard;
use crate::session::{unix_now, Session, SessionStore};

/// Outbound half of the transport.
///
/// `send` queues the datagram and returns; delivery is neither awaited nor
/// retried, the NAS retransmits on its own schedule.
pub trait Transport: Send + Sync {
    fn send(&self, data: &[u8], peer: SocketAddr) -> io::Result<()>;
}

/// Parses datagrams, suppresses retransmissions, tracks accounting
/// sessions, and invokes the application policy.
pub struct Engine {
    secret: Vec<u8>,
    handler: Arc<dyn RadiusHandler>,
    sessions: SessionStore,
    guards: DashMap<String, ReplayGuard>,
    audit: AuditLogger,
}

impl Engine {
    /// Create an engine with audit logging disabled.
    pub fn new(secret: impl Into<Vec<u8>>, handler: Arc<dyn RadiusHandler>) -> Self {
        Engine {
            secret: secret.into(),
            handler,
            sessions: SessionStore::new(),
            guards: DashMap::new(),
            audit: AuditLogger::disabled(),
        }
    }

    /// Attach an audit logger.
    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = audit;
        self
    }

    /// Live accounting sessions.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one datagram end to end.
    ///
    /// Nothing propagates out: malformed input and retransmissions are
    /// dropped silently (with a log line and an audit record), and replies
    /// go out through `transport`.
    pub fn process(&self, data: &[u8], peer: SocketAddr, transport: &dyn Transport) {
        let message = match Message::parse(data, &self.secret) {
            Ok(message) => message,
            Err(e) => {
                warn!(client_ip = %peer.ip(), error = %e, "Dropping malformed datagram");
                self.audit.log(
                    AuditEntry::new(AuditEventType::MalformedPacket)
                        .with_peer(peer)
                        .with_details(e.to_string()),
                );
                return;
            }
        };

        let request = Request::new(&message, peer, &self.secret, transport);
        let nas = request.nas_key();

        let fresh = self
            .guards
            .entry(nas.clone())
            .or_default()
            .check(message.identifier);
        if !fresh {
            debug!(
                client_ip = %peer.ip(),
                nas = %nas,
                identifier = message.identifier,
                "Suppressing retransmission"
            );
            self.audit.log(
                AuditEntry::new(AuditEventType::DuplicateSuppressed)
                    .with_nas(&nas)
                    .with_peer(peer)
                    .with_identifier(message.identifier),
            );
            return;
        }

        match message.code {
            Code::AccessRequest => {
                debug!(
                    client_ip = %peer.ip(),
                    identifier = message.identifier,
                    "Access-Request received"
                );
                self.handler.on_access_request(&request);
            }
            Code::AccountingRequest => self.handle_accounting(&request, &nas),
            other => {
                debug!(code = %other, client_ip = %peer.ip(), "Ignoring non-request message");
            }
        }
    }

    fn handle_accounting(&self, request: &Request<'_>, nas: &str) {
        // Without a status type this is not a usable accounting request;
        // it gets no acknowledgement either.
        let status = match request.message().integer(AttributeType::AcctStatusType) {
            Some(status) => status,
            None => {
                debug!(nas = %nas, "Accounting-Request without Acct-Status-Type ignored");
                return;
            }
        };

        let identity = request.session_identity();
        if identity.source == IdentitySource::Missing {
            error!(
                nas = %nas,
                client_ip = %request.peer().ip(),
                "Accounting-Request carries no usable session identity"
            );
            self.audit.log(
                AuditEntry::new(AuditEventType::MissingSessionIdentity)
                    .with_nas(nas)
                    .with_peer(request.peer())
                    .with_identifier(request.identifier()),
            );
        }
        let sid = identity.sid;

        match AcctStatusType::from_u32(status) {
            Some(AcctStatusType::Start) => self.accounting_start(request, &sid, nas),
            Some(AcctStatusType::Stop) => self.accounting_stop(request, &sid, nas),
            Some(AcctStatusType::InterimUpdate) => self.interim_update(request, &sid, nas),
            None => {
                debug!(status, nas = %nas, "Unhandled Acct-Status-Type, no session change");
            }
        }

        // Every deduplicated Accounting-Request with a status type is
        // acknowledged, whether or not it changed a session.
        if let Err(e) = request.reply(Code::AccountingResponse).send() {
            warn!(
                client_ip = %request.peer().ip(),
                error = %e,
                "Failed to send Accounting-Response"
            );
        }
    }

    fn accounting_start(&self, request: &Request<'_>, sid: &str, nas: &str) {
        if !self.sessions.has(sid, nas) {
            self.track(self.seed_session(request, sid, nas));
        }

        let now = unix_now();
        let mut username = None;
        self.sessions.update(sid, nas, |session| {
            // a repeated Start refreshes the start time on the session we
            // already hold rather than replacing it
            session.started = Some(now);
            self.handler.on_accounting_start(request, session);
            username = session.username.clone();
        });

        info!(session_id = %sid, nas = %nas, "Accounting session started");
        let mut entry = AuditEntry::new(AuditEventType::SessionStart)
            .with_session(sid)
            .with_nas(nas)
            .with_peer(request.peer());
        if let Some(username) = username {
            entry = entry.with_username(username);
        }
        self.audit.log(entry);
    }

    fn accounting_stop(&self, request: &Request<'_>, sid: &str, nas: &str) {
        if !self.sessions.has(sid, nas) {
            // The Start was lost (restart on our side or drop on the
            // wire); rebuild enough state for the Stop to produce a
            // usable record.
            warn!(session_id = %sid, nas = %nas, "Accounting-Stop for untracked session");
            self.track(self.seed_session(request, sid, nas));
        }

        let now = unix_now();
        let mut username = None;
        self.sessions.update(sid, nas, |session| {
            session.stopped = Some(now);
            session.input_octets =
                Some(request.message().integer(AttributeType::AcctInputOctets).unwrap_or(0));
            session.output_octets =
                Some(request.message().integer(AttributeType::AcctOutputOctets).unwrap_or(0));
            session.terminate_cause = Some(
                request
                    .message()
                    .integer(AttributeType::AcctTerminateCause)
                    .unwrap_or(0),
            );
            if session.started.is_none() {
                // place the start Acct-Session-Time seconds back so the
                // reconstructed session still has its reported duration
                let session_time = request
                    .message()
                    .integer(AttributeType::AcctSessionTime)
                    .unwrap_or(0);
                session.started = Some(now.saturating_sub(u64::from(session_time)));
            }
            self.handler.on_accounting_stop(request, session);
            username = session.username.clone();
        });

        // the stop clears the slot no matter what the callback did
        self.sessions.remove(sid, nas);

        info!(session_id = %sid, nas = %nas, "Accounting session stopped");
        let mut entry = AuditEntry::new(AuditEventType::SessionStop)
            .with_session(sid)
            .with_nas(nas)
            .with_peer(request.peer());
        if let Some(username) = username {
            entry = entry.with_username(username);
        }
        self.audit.log(entry);
    }

    fn interim_update(&self, request: &Request<'_>, sid: &str, nas: &str) {
        if !self.sessions.has(sid, nas) {
            debug!(session_id = %sid, nas = %nas, "Interim-Update for untracked session");
            self.track(self.seed_session(request, sid, nas));
        }

        self.sessions.update(sid, nas, |session| {
            self.handler.on_interim_update(request, session);
        });

        debug!(session_id = %sid, nas = %nas, "Interim update applied");
        self.audit.log(
            AuditEntry::new(AuditEventType::InterimUpdate)
                .with_session(sid)
                .with_nas(nas)
                .with_peer(request.peer()),
        );
    }

    /// New session seeded from the identity attributes the packet carries.
    fn seed_session(&self, request: &Request<'_>, sid: &str, nas: &str) -> Session {
        let message = request.message();
        let mut session = Session::new(sid, nas);
        session.username = message.text(AttributeType::UserName);
        session.client_ip = message.text(AttributeType::TunnelClientEndpoint);
        session.tunnel = message.text(AttributeType::TunnelAssignmentId);
        session.vsa = message.text(AttributeType::VendorSpecific);
        session.framed_ip = message.ipv4(AttributeType::FramedIpAddress);
        session
    }

    fn track(&self, session: Session) {
        if let Err(e) = self.sessions.add(session) {
            // lost a race with the other listener; reuse what it added
            debug!(error = %e, "Concurrent session add");
        }
    }
}
