//! dynup
//!
//! An [RFC 2136] Dynamic Update client for solving [RFC-8555][RFC-8555] [DNS-01]
//! challenges against an authoritative nameserver you control (e.g. BIND with an
//! `allow-update` key).
//!
//! Given a challenge record name, dynup discovers the owning zone by walking the name's
//! ancestors with non-recursive SOA probes, then sends a [TSIG]-signed UPDATE message
//! adding or removing the challenge TXT record. Each operation is one discovery round
//! trip over UDP plus one update transaction over TCP; there is no retry and no state
//! kept between calls.
//!
//! [RFC 2136]: https://www.rfc-editor.org/rfc/rfc2136
//! [RFC-8555]: https://www.rfc-editor.org/rfc/rfc8555
//! [DNS-01]: https://www.rfc-editor.org/rfc/rfc8555#section-8.4
//! [TSIG]: https://www.rfc-editor.org/rfc/rfc8945
//!
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod transport;
pub mod tsig;
pub mod update;
pub mod zone;

pub use config::Config;
pub use error::{Error, TransportError};
pub use transport::{NetTransport, Transport};
pub use tsig::{TsigAlgorithm, TsigKey};
pub use update::UpdateClient;
