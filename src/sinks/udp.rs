//! UDP sink for best-effort remote delivery
//!
//! Each record becomes exactly one datagram. There is no acknowledgement,
//! no retry and no reconnection: a failed send is reported and dropped.

use crate::core::error::{EmitterError, Result};
use crate::core::sink::Sink;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Largest payload sent in one datagram. Fits a 1500-byte Ethernet MTU
/// after IP and UDP headers, so records are never fragmented.
pub const MAX_DATAGRAM_SIZE: usize = 1400;

/// Appended to payloads cut at [`MAX_DATAGRAM_SIZE`]
pub const TRUNCATION_MARKER: &[u8] = "…[truncated]".as_bytes();

/// Upper bound on how long a send may block
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(100);

/// Sink that sends each record to a fixed host:port over UDP
///
/// # Example
///
/// ```no_run
/// use log_emitter::sinks::UdpSink;
///
/// let sink = UdpSink::new("127.0.0.1", 9999).expect("Failed to bind UDP socket");
/// assert_eq!(sink.target().port(), 9999);
/// ```
pub struct UdpSink {
    socket: UdpSocket,
    target: SocketAddr,
    name: String,
    max_datagram: usize,
    truncated: AtomicU64,
}

impl UdpSink {
    /// Resolve `host:port`, bind a local socket and connect it to the target.
    ///
    /// # Errors
    ///
    /// Returns `AddressResolution` if the host does not resolve, or an IO
    /// error if the socket cannot be bound or configured.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let address = format!("{}:{}", host, port);
        let resolved: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|e| EmitterError::address(&address, e.to_string()))?
            .collect();
        // Prefer IPv4 so "localhost" works on hosts without an IPv6 stack
        let target = resolved
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| resolved.first())
            .copied()
            .ok_or_else(|| EmitterError::address(&address, "no addresses found"))?;
        Self::connect(target)
    }

    /// # Errors
    ///
    /// Returns an IO error if the socket cannot be bound or configured
    pub fn connect(target: SocketAddr) -> Result<Self> {
        let local: SocketAddr = if target.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let socket = UdpSocket::bind(local).map_err(|e| {
            EmitterError::io_operation("bind UDP socket", format!("Failed to bind {}", local), e)
        })?;
        socket.connect(target).map_err(|e| {
            EmitterError::io_operation(
                "connect UDP socket",
                format!("Failed to set peer {}", target),
                e,
            )
        })?;
        socket.set_write_timeout(Some(DEFAULT_SEND_TIMEOUT))?;

        Ok(Self {
            socket,
            target,
            name: format!("udp:{}", target),
            max_datagram: MAX_DATAGRAM_SIZE,
            truncated: AtomicU64::new(0),
        })
    }

    /// Bound how long a single send may block
    ///
    /// # Errors
    ///
    /// Returns an IO error for a zero duration
    pub fn with_send_timeout(self, timeout: Duration) -> Result<Self> {
        self.socket.set_write_timeout(Some(timeout))?;
        Ok(self)
    }

    /// Override the datagram size limit
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the limit cannot hold the marker
    pub fn with_max_datagram(mut self, max: usize) -> Result<Self> {
        if max <= TRUNCATION_MARKER.len() {
            return Err(EmitterError::config(
                "UdpSink",
                format!("datagram limit must exceed {} bytes", TRUNCATION_MARKER.len()),
            ));
        }
        self.max_datagram = max;
        Ok(self)
    }

    #[must_use]
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Number of records cut to fit one datagram
    #[must_use]
    pub fn truncated_count(&self) -> u64 {
        self.truncated.load(Ordering::Relaxed)
    }
}

/// Cut `bytes` to at most `max` bytes, ending with the truncation marker.
///
/// The cut lands on a UTF-8 character boundary so the payload stays valid
/// text.
pub fn truncate_datagram(bytes: &[u8], max: usize) -> Vec<u8> {
    let mut cut = max.saturating_sub(TRUNCATION_MARKER.len()).min(bytes.len());
    while cut > 0 && cut < bytes.len() && (bytes[cut] & 0xC0) == 0x80 {
        cut -= 1;
    }
    let mut out = Vec::with_capacity(cut + TRUNCATION_MARKER.len());
    out.extend_from_slice(&bytes[..cut]);
    out.extend_from_slice(TRUNCATION_MARKER);
    out
}

impl Sink for UdpSink {
    fn accept(&self, bytes: &[u8]) -> Result<()> {
        let sent = if bytes.len() > self.max_datagram {
            self.truncated.fetch_add(1, Ordering::Relaxed);
            self.socket.send(&truncate_datagram(bytes, self.max_datagram))
        } else {
            self.socket.send(bytes)
        };

        sent.map(|_| ())
            .map_err(|e| EmitterError::sink_write(&self.name, e.to_string()))
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receiver() -> UdpSocket {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        socket
    }

    #[test]
    fn test_sends_one_datagram_per_record() {
        let rx = receiver();
        let sink = UdpSink::connect(rx.local_addr().unwrap()).unwrap();

        sink.accept(br#"{"message":"hello"}"#).unwrap();

        let mut buf = [0u8; 2048];
        let n = rx.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], br#"{"message":"hello"}"#);
    }

    #[test]
    fn test_oversized_record_is_truncated() {
        let rx = receiver();
        let sink = UdpSink::connect(rx.local_addr().unwrap()).unwrap();

        let big = vec![b'a'; 5000];
        sink.accept(&big).unwrap();

        let mut buf = [0u8; 8192];
        let n = rx.recv(&mut buf).unwrap();
        assert_eq!(n, MAX_DATAGRAM_SIZE);
        assert!(buf[..n].ends_with(TRUNCATION_MARKER));
        assert_eq!(sink.truncated_count(), 1);
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // 'é' is two bytes; a cut at an odd offset must back off one byte
        let text = "é".repeat(20);
        let out = truncate_datagram(text.as_bytes(), TRUNCATION_MARKER.len() + 5);

        let s = std::str::from_utf8(&out).unwrap();
        assert!(s.starts_with("éé"));
        assert!(s.ends_with("…[truncated]"));
        assert!(out.len() <= TRUNCATION_MARKER.len() + 5);
    }

    #[test]
    fn test_resolves_localhost() {
        let sink = UdpSink::new("localhost", 9999).unwrap();
        assert_eq!(sink.target().port(), 9999);
        assert_eq!(sink.name(), format!("udp:{}", sink.target()));
    }

    #[test]
    fn test_unresolvable_host_fails_at_construction() {
        let result = UdpSink::new("host.invalid", 9999);
        assert!(matches!(result, Err(EmitterError::AddressResolution { .. })));
    }

    #[test]
    fn test_datagram_limit_must_fit_marker() {
        let rx = receiver();
        let sink = UdpSink::connect(rx.local_addr().unwrap()).unwrap();
        assert!(sink.with_max_datagram(4).is_err());
    }
}
