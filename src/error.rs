//! Error types.

use trust_dns_proto::error::ProtoError;
use trust_dns_proto::op::ResponseCode;

/// Error enumerates the possible dynup error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when none of the candidate zones derived from a record name produced an
    /// authoritative SOA answer from the configured server. Carries every candidate that
    /// was probed, in most-specific-first order.
    #[error("unable to determine zone for \"{record}\"; no authoritative SOA among {candidates:?}")]
    ZoneDiscovery {
        record: String,
        candidates: Vec<String>,
    },

    /// Returned when a discovery probe or an update transaction failed at the network
    /// level. The wrapped [`TransportError`] preserves the underlying cause.
    #[error("DNS transport failure")]
    Transport(#[from] TransportError),

    /// Returned when the server answered a signed update with a non-NOERROR response
    /// code, e.g. `NOTAUTH` on a TSIG key or algorithm mismatch, or `REFUSED` by policy.
    /// The caller must not assume the update was partially applied.
    #[error("server rejected dynamic update: {0:?}")]
    Update(ResponseCode),

    /// Returned when a record name is not a descendant of the zone discovered for it, so
    /// no well-formed update can be built.
    #[error("record \"{record}\" is not within zone \"{zone}\"")]
    NotInZone { record: String, zone: String },

    /// Returned when [`Config::key_algorithm`][`crate::config::Config::key_algorithm`]
    /// names an algorithm outside the RFC 2845/8945 HMAC set this crate implements.
    #[error("unrecognized TSIG algorithm \"{0}\"")]
    UnknownAlgorithm(String),

    /// Returned when [`Config::key_secret`][`crate::config::Config::key_secret`] is not
    /// valid standard base64.
    #[error("TSIG key secret is not valid base64")]
    InvalidKeySecret(#[from] base64::DecodeError),

    /// Returned when a DNS name fails to parse or a message fails to encode.
    #[error("DNS protocol error")]
    Proto(#[from] ProtoError),

    /// Returned when a generic IO error occurs, e.g. while
    /// [trying to load a `Config`][crate::config::Config::try_from_file].
    #[error("an IO error occurred")]
    Io(#[from] std::io::Error),

    /// Returned when the `Config` JSON file has invalid content.
    #[error("invalid JSON")]
    InvalidJson(#[from] serde_json::Error),
}

/// Network-level failure during a single DNS exchange.
///
/// Wrapped by [`Error::Transport`]; kept as its own enum so callers can distinguish an
/// unreachable server from a garbled reply.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// Socket-level failure: connection refused, reset, short read, etc.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The reply was received but did not decode as a DNS message.
    #[error("malformed DNS response")]
    Malformed(#[from] ProtoError),

    /// The reply decoded but carried a different message ID than the request.
    #[error("response ID {received} does not match query ID {sent}")]
    IdMismatch { sent: u16, received: u16 },

    /// The request does not fit the two-byte length framing used over TCP.
    #[error("message of {0} bytes exceeds the TCP framing limit")]
    Oversized(usize),
}
