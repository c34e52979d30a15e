use std::fmt;

/// Session-fatal protocol errors. Each session is an isolated failure
/// domain, so these never tear down a listener or a peer session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    InvalidFirstPacket,
    UnexpectedPacket(String),
    TicketNotFound,
    MalformedPacket(String),
}

impl std::error::Error for ProtocolViolation {}

impl fmt::Display for ProtocolViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolViolation::InvalidFirstPacket => write!(f, "invalid first packet"),
            ProtocolViolation::UnexpectedPacket(name) => write!(f, "unexpected packet: {}", name),
            ProtocolViolation::TicketNotFound => write!(f, "ticket not found"),
            ProtocolViolation::MalformedPacket(reason) => write!(f, "malformed packet: {}", reason),
        }
    }
}
