//! One-shot DNS transports.
//!
//! SOA discovery probes travel over UDP; signed update transactions travel over TCP,
//! which is reliable and not limited to a single datagram. Each exchange opens its own
//! socket and closes it with the reply: no pooling, no reuse, and no client-side
//! timeout. Callers that need a deadline should wrap the whole operation, e.g. with
//! [`tokio::time::timeout`].

use crate::error::TransportError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

/// Upper bound on a single UDP reply; SOA answers fit comfortably.
const MAX_DATAGRAM: usize = 4096;

/// A single request/response exchange with a DNS server.
///
/// The production implementation is [`NetTransport`]; tests substitute a synthetic
/// server behind the same trait.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one datagram and wait for one reply.
    async fn datagram(&self, server: SocketAddr, request: &[u8])
        -> Result<Vec<u8>, TransportError>;

    /// Exchange one message over a fresh stream connection, two-byte length framed.
    async fn stream(&self, server: SocketAddr, request: &[u8]) -> Result<Vec<u8>, TransportError>;
}

/// [`Transport`] over the operating system's UDP and TCP stacks.
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct NetTransport;

#[async_trait::async_trait]
impl Transport for NetTransport {
    async fn datagram(
        &self,
        server: SocketAddr,
        request: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        let bind_addr = if server.is_ipv4() {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)
        } else {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0)
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        // Connecting filters replies to the queried server.
        socket.connect(server).await?;
        socket.send(request).await?;
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let len = socket.recv(&mut buf).await?;
        buf.truncate(len);
        Ok(buf)
    }

    async fn stream(&self, server: SocketAddr, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        let framed_len =
            u16::try_from(request.len()).map_err(|_| TransportError::Oversized(request.len()))?;
        let mut stream = TcpStream::connect(server).await?;
        stream.write_u16(framed_len).await?;
        stream.write_all(request).await?;
        stream.flush().await?;

        let reply_len = stream.read_u16().await?;
        let mut reply = vec![0u8; usize::from(reply_len)];
        stream.read_exact(&mut reply).await?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn datagram_round_trip() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server_addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            let (len, peer) = server.recv_from(&mut buf).await.unwrap();
            server.send_to(&buf[..len], peer).await.unwrap();
        });

        let reply = NetTransport
            .datagram(server_addr, b"ping")
            .await
            .unwrap();
        assert_eq!(reply, b"ping");
    }

    #[tokio::test]
    async fn stream_round_trip_is_length_framed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut conn, _) = listener.accept().await.unwrap();
            let len = conn.read_u16().await.unwrap();
            let mut buf = vec![0u8; usize::from(len)];
            conn.read_exact(&mut buf).await.unwrap();
            buf.reverse();
            conn.write_u16(len).await.unwrap();
            conn.write_all(&buf).await.unwrap();
        });

        let reply = NetTransport
            .stream(server_addr, b"abc")
            .await
            .unwrap();
        assert_eq!(reply, b"cba");
    }

    #[tokio::test]
    async fn oversized_stream_request_is_rejected() {
        let request = vec![0u8; usize::from(u16::MAX) + 1];
        let err = NetTransport
            .stream("127.0.0.1:1".parse().unwrap(), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Oversized(_)));
    }

    #[tokio::test]
    async fn connection_refused_surfaces_as_io() {
        // Port 1 on loopback is expected to be closed.
        let err = NetTransport
            .stream("127.0.0.1:1".parse().unwrap(), b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }
}
