//! An embeddable RADIUS authentication and accounting server.
//!
//! The [`Engine`] owns the protocol: parsing, retransmission suppression,
//! the accounting session lifecycle, and reply signing. Applications plug
//! policy in through [`RadiusHandler`] and run the engine behind the UDP
//! front end in [`RadiusServer`], or behind their own transport.
//!
//! # Example
//!
//! ```no_run
//! use radkit_server::{Config, Engine, RadiusServer, StaticUserHandler};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.secret = "s3cr3t".to_string();
//!
//!     let mut handler = StaticUserHandler::new();
//!     handler.add_user("bob", "hunter2");
//!
//!     let engine = Arc::new(Engine::new(config.secret.as_bytes(), Arc::new(handler)));
//!     let server = RadiusServer::bind(&config, engine).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod handler;
pub mod replay;
pub mod server;
pub mod session;

pub use audit::{AuditEntry, AuditEventType, AuditLogger};
pub use config::{Config, ConfigError, User};
pub use engine::{Engine, Transport};
pub use handler::{
    IdentitySource, RadiusHandler, Reply, ReplyError, Request, SessionIdentity,
    StaticUserHandler, UNKNOWN_NAS,
};
pub use replay::{ReplayGuard, REPLAY_WINDOW};
pub use server::{RadiusServer, ServerError, UdpTransport};
pub use session::{Session, SessionError, SessionKey, SessionStore};
