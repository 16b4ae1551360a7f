//! Datagram transport to the one fixed peer.
//!
//! [`Transport`] is the seam the pipelines see. [`UdpTransport`] is the real implementation:
//! a `std::net::UdpSocket` bound on all interfaces, with the peer address resolved once up
//! front. Blocking receives give up after the configured poll interval so that the receive
//! stage gets back to its cancellation check regularly.

use crate::config::ChatConfig;
use std::{
    io,
    net::{Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket},
    time::Duration,
};
use thiserror::Error;


/// Best-effort datagram exchange with a single peer
pub trait Transport: Send + Sync {
    /// Send `bytes` to the peer as one datagram. Not retried on failure.
    fn send(&self, bytes: &[u8]) -> io::Result<()>;

    /// Block until a datagram arrives and copy it into `buf`, returning its length
    ///
    /// Returns `Ok(None)` if no datagram arrived within the implementation's poll interval. A
    /// zero-length datagram is `Ok(Some(0))`.
    fn receive(&self, buf: &mut [u8]) -> io::Result<Option<usize>>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, bytes: &[u8]) -> io::Result<()> {
        (**self).send(bytes)
    }

    fn receive(&self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        (**self).receive(buf)
    }
}


/// Error setting up the transport at startup
#[derive(Error, Debug)]
pub enum SetupError {
    /// Name resolution of the remote host failed
    #[error("failed to resolve remote host {host:?}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },
    /// The remote host resolved, but not to any IPv4 address
    #[error("remote host {0:?} has no IPv4 address")]
    NoIpv4Address(String),
    /// Binding the local port failed
    #[error("failed to bind local UDP port {port}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },
    /// Configuring the bound socket failed
    #[error("failed to configure UDP socket")]
    Configure(#[source] io::Error),
}

/// Resolve `host` to its first IPv4 address, paired with `port`
pub fn resolve_ipv4(host: &str, port: u16) -> Result<SocketAddr, SetupError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| SetupError::Resolve { host: host.to_owned(), source })?;
    addrs
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| SetupError::NoIpv4Address(host.to_owned()))
}


/// [`Transport`] over a UDP socket
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpTransport {
    /// Bind the configured local port on all IPv4 interfaces and resolve the configured peer
    pub fn bind(config: &ChatConfig) -> Result<Self, SetupError> {
        let peer = resolve_ipv4(&config.remote_host, config.remote_port)?;
        let local = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.local_port));
        let socket = UdpSocket::bind(local)
            .map_err(|source| SetupError::Bind { port: config.local_port, source })?;
        Self::from_socket(socket, peer, config.poll_interval)
    }

    /// Wrap an already bound socket
    pub fn from_socket(
        socket: UdpSocket,
        peer: SocketAddr,
        poll_interval: Duration,
    ) -> Result<Self, SetupError> {
        socket.set_read_timeout(Some(poll_interval)).map_err(SetupError::Configure)?;
        if let Ok(local) = socket.local_addr() {
            debug!(%local, %peer, "udp transport ready");
        }
        Ok(UdpTransport { socket, peer })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Address every datagram is sent to
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for UdpTransport {
    fn send(&self, bytes: &[u8]) -> io::Result<()> {
        let n = self.socket.send_to(bytes, self.peer)?;
        if n != bytes.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("datagram truncated: sent {} of {} bytes", n, bytes.len()),
            ));
        }
        Ok(())
    }

    fn receive(&self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.socket.recv_from(buf) {
            Ok((n, from)) => {
                trace!(%from, len = n, "datagram received");
                Ok(Some(n))
            }
            // which of these a timed out read reports is platform-dependent
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                Ok(None),
            Err(e) => Err(e),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_socket() -> UdpSocket {
        UdpSocket::bind("127.0.0.1:0").unwrap()
    }

    #[test]
    fn resolves_ipv4_literal_and_localhost() {
        let addr = resolve_ipv4("127.0.0.1", 6000).unwrap();
        assert_eq!(addr, "127.0.0.1:6000".parse::<SocketAddr>().unwrap());

        let addr = resolve_ipv4("localhost", 6000).unwrap();
        assert!(addr.is_ipv4());
        assert_eq!(addr.port(), 6000);
    }

    #[test]
    fn ipv6_literal_has_no_ipv4_address() {
        assert!(matches!(resolve_ipv4("::1", 6000), Err(SetupError::NoIpv4Address(_))));
    }

    #[test]
    fn send_and_receive_over_loopback() {
        let a = loopback_socket();
        let b = loopback_socket();
        let a_addr = a.local_addr().unwrap();
        let b_addr = b.local_addr().unwrap();
        let poll = Duration::from_millis(500);
        let a = UdpTransport::from_socket(a, b_addr, poll).unwrap();
        let b = UdpTransport::from_socket(b, a_addr, poll).unwrap();
        assert_eq!(a.peer_addr(), b_addr);
        assert_eq!(a.local_addr().unwrap(), a_addr);
        assert_eq!(b.local_addr().unwrap(), b_addr);

        a.send(b"hello\n").unwrap();
        let mut buf = [0; 64];
        assert_eq!(b.receive(&mut buf).unwrap(), Some(6));
        assert_eq!(&buf[..6], b"hello\n");

        a.send(b"").unwrap();
        assert_eq!(b.receive(&mut buf).unwrap(), Some(0));
    }

    #[test]
    fn receive_gives_up_after_poll_interval() {
        let socket = loopback_socket();
        let peer = socket.local_addr().unwrap();
        let transport =
            UdpTransport::from_socket(socket, peer, Duration::from_millis(10)).unwrap();
        let mut buf = [0; 16];
        assert_eq!(transport.receive(&mut buf).unwrap(), None);
    }
}
