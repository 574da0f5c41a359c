//! Sink implementations

pub mod rotating_file;
pub mod udp;

pub use rotating_file::{RotatingFileSink, RotationPolicy, RotationTrigger};
pub use udp::{UdpSink, MAX_DATAGRAM_SIZE, TRUNCATION_MARKER};

pub use crate::core::Sink;
