//! RFC 2136 dynamic update client.
//!
//! [`UpdateClient`] mutates TXT records on an authoritative server to satisfy
//! [RFC-8555][RFC-8555] [DNS-01] challenges: one method to publish a challenge response
//! value, one to remove it. Every call is a single transaction — the owning zone is
//! [discovered][crate::zone], an UPDATE message is built and TSIG-signed, and one TCP
//! round trip carries it to the server. There is no retry, no batching, and no
//! connection reuse; a network failure or a non-NOERROR response code is terminal for
//! that call.
//!
//! Both operations are idempotent by RFC 2136 semantics: adding a TXT record that
//! already exists and deleting one that never did are NOERROR no-ops on a conformant
//! server.
//!
//! [RFC-8555]: https://www.rfc-editor.org/rfc/rfc8555
//! [DNS-01]: https://www.rfc-editor.org/rfc/rfc8555#section-8.4

pub(crate) mod message;

use crate::error::{Error, TransportError};
use crate::transport::{NetTransport, Transport};
use crate::tsig::{self, TsigKey};
use crate::zone;
use std::net::SocketAddr;
use tracing::debug;
use trust_dns_proto::op::{Message, ResponseCode};

/// A client for one authoritative server and one TSIG key.
///
/// Plain value type: the endpoint and key are immutable after construction, so a client
/// may be shared read-only across concurrent tasks, or built fresh per operation. The
/// server remains the sole arbiter of conflicting concurrent updates to the same record.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct UpdateClient<T = NetTransport> {
    server: SocketAddr,
    key: TsigKey,
    transport: T,
}

impl UpdateClient<NetTransport> {
    /// A client speaking to `server` over the operating system's network stack.
    pub fn new(server: SocketAddr, key: TsigKey) -> Self {
        Self::with_transport(server, key, NetTransport)
    }
}

impl<T: Transport> UpdateClient<T> {
    /// A client with a caller-supplied [`Transport`], e.g. a synthetic server in tests.
    pub fn with_transport(server: SocketAddr, key: TsigKey, transport: T) -> Self {
        UpdateClient {
            server,
            key,
            transport,
        }
    }

    /// Publish a TXT record at `record_name` with the given value and TTL.
    ///
    /// `domain` anchors zone discovery (typically the domain under validation);
    /// `record_name` is the fully qualified challenge name, typically beginning with
    /// `_acme-challenge.`, and must fall inside the discovered zone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZoneDiscovery`], [`Error::Transport`], [`Error::NotInZone`], or
    /// [`Error::Update`] per the failure taxonomy in [`crate::error`]. On any error the
    /// record must be assumed unpublished.
    pub async fn add_txt_record(
        &self,
        domain: &str,
        record_name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<(), Error> {
        let zone = zone::resolve_zone(&self.transport, self.server, domain).await?;
        let name = message::fqdn(record_name)?;
        let relative = message::relativize(&name, &zone)?;
        debug!("adding TXT record {relative} in zone {zone}");

        let update = message::add_txt(&zone, &name, value, ttl, fastrand::u16(..));
        self.transact(&update).await?;
        debug!("successfully added TXT record");
        Ok(())
    }

    /// Remove the TXT record that exactly matches `record_name` and `value`.
    ///
    /// Removing a record that does not exist is a success: the server answers NOERROR
    /// for a no-op delete, and that is the desired cleanup semantic.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`add_txt_record`][Self::add_txt_record].
    pub async fn del_txt_record(
        &self,
        domain: &str,
        record_name: &str,
        value: &str,
    ) -> Result<(), Error> {
        let zone = zone::resolve_zone(&self.transport, self.server, domain).await?;
        let name = message::fqdn(record_name)?;
        let relative = message::relativize(&name, &zone)?;
        debug!("deleting TXT record {relative} in zone {zone}");

        let update = message::del_txt(&zone, &name, value, fastrand::u16(..));
        self.transact(&update).await?;
        debug!("successfully deleted TXT record");
        Ok(())
    }

    /// Sign and send one update transaction, interpreting the response code.
    async fn transact(&self, update: &Message) -> Result<(), Error> {
        let unsigned = update.to_vec()?;
        let signed = self.key.sign_message(&unsigned, tsig::unix_time())?;

        let reply = self.transport.stream(self.server, &signed).await?;
        let reply = Message::from_vec(&reply).map_err(TransportError::from)?;
        if reply.id() != update.id() {
            return Err(TransportError::IdMismatch {
                sent: update.id(),
                received: reply.id(),
            }
            .into());
        }

        match reply.response_code() {
            ResponseCode::NoError => Ok(()),
            code => Err(Error::Update(code)),
        }
    }
}
