//! UDP listeners feeding datagrams into the engine.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use radkit_proto::Message;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::config::Config;
use crate::engine::{Engine, Transport};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Fire-and-forget sender bound to one listening socket, so each reply
/// leaves from the port its request arrived on.
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
}

impl UdpTransport {
    pub fn new(socket: Arc<UdpSocket>) -> Self {
        UdpTransport { socket }
    }
}

impl Transport for UdpTransport {
    fn send(&self, data: &[u8], peer: SocketAddr) -> io::Result<()> {
        // UDP sends do not block in practice; if the OS queue is full the
        // datagram is dropped and the NAS retransmits
        self.socket.try_send_to(data, peer).map(|_| ())
    }
}

/// RADIUS server: an authentication listener and an accounting listener
/// sharing one engine.
pub struct RadiusServer {
    engine: Arc<Engine>,
    auth_socket: Arc<UdpSocket>,
    acct_socket: Arc<UdpSocket>,
}

impl RadiusServer {
    /// Bind both listeners. A port of 0 binds an ephemeral port, which is
    /// how the integration tests run.
    pub async fn bind(config: &Config, engine: Arc<Engine>) -> Result<Self, ServerError> {
        let auth_socket = Arc::new(UdpSocket::bind(config.auth_addr()?).await?);
        let acct_socket = Arc::new(UdpSocket::bind(config.acct_addr()?).await?);
        info!(
            auth = %auth_socket.local_addr()?,
            acct = %acct_socket.local_addr()?,
            "RADIUS server listening"
        );
        Ok(RadiusServer {
            engine,
            auth_socket,
            acct_socket,
        })
    }

    /// The shared engine.
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Bound address of the authentication listener.
    pub fn auth_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.auth_socket.local_addr()?)
    }

    /// Bound address of the accounting listener.
    pub fn acct_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.acct_socket.local_addr()?)
    }

    /// Serve both sockets until one fails.
    pub async fn run(&self) -> Result<(), ServerError> {
        tokio::try_join!(
            Self::listen(Arc::clone(&self.engine), Arc::clone(&self.auth_socket)),
            Self::listen(Arc::clone(&self.engine), Arc::clone(&self.acct_socket)),
        )?;
        Ok(())
    }

    async fn listen(engine: Arc<Engine>, socket: Arc<UdpSocket>) -> Result<(), ServerError> {
        let transport = UdpTransport::new(Arc::clone(&socket));
        let mut buf = vec![0u8; Message::MAX_SIZE];
        loop {
            let (len, peer) = socket.recv_from(&mut buf).await?;
            debug!(client_addr = %peer, bytes = len, "Datagram received");
            engine.process(&buf[..len], peer, &transport);
        }
    }
}
