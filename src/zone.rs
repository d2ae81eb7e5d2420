//! Authoritative zone discovery.
//!
//! A dynamic update must be scoped to the zone that actually holds the record, and the
//! caller only knows a record name like `_acme-challenge.www.example.com`. The resolver
//! walks the name's ancestors, most specific first, probing each with a non-recursive
//! SOA query until the configured server answers authoritatively. That candidate is the
//! zone the update is addressed to.

use crate::error::{Error, TransportError};
use crate::transport::Transport;
use crate::update::message;
use std::net::SocketAddr;
use tracing::debug;
use trust_dns_proto::op::{Message, ResponseCode};
use trust_dns_proto::rr::Name;

/// The label ACME DNS-01 challenge records live under. It is stripped before candidate
/// generation: the challenge record's own label is never a zone apex.
const CHALLENGE_LABEL: &[u8] = b"_acme-challenge";

/// The ordered list of possible zone apexes for a record name, most specific first.
///
/// `_acme-challenge.foo.example.com` yields `foo.example.com.`, `example.com.`, `com.`.
/// A name without the challenge label starts from the name itself.
///
/// # Errors
///
/// Returns [`Error::Proto`] if `record_name` is not a parseable DNS name.
pub fn candidate_zones(record_name: &str) -> Result<Vec<Name>, Error> {
    let mut name = Name::from_ascii(record_name)?;
    name.set_fqdn(true);

    let stripped = match name.iter().next() {
        Some(label) if label.eq_ignore_ascii_case(CHALLENGE_LABEL) => name.base_name(),
        _ => name,
    };

    let mut candidates = Vec::with_capacity(usize::from(stripped.num_labels()));
    let mut current = stripped;
    while current.num_labels() > 0 {
        candidates.push(current.clone());
        current = current.base_name();
    }
    Ok(candidates)
}

/// Find the nearest ancestor zone of `record_name` that `server` is authoritative for.
///
/// Each candidate is probed over UDP with a SOA query whose Recursion-Desired flag is
/// cleared, so the server answers only from its own data. A candidate is accepted iff
/// the response is NOERROR with a non-empty answer section and the Authoritative-Answer
/// flag set. Stateless; nothing is cached between calls.
///
/// # Errors
///
/// Returns [`Error::ZoneDiscovery`] naming every candidate tried when none is
/// authoritative, or [`Error::Transport`] as soon as any probe fails at the network
/// level. No retry is attempted in either case.
pub async fn resolve_zone<T: Transport>(
    transport: &T,
    server: SocketAddr,
    record_name: &str,
) -> Result<Name, Error> {
    let candidates = candidate_zones(record_name)?;

    for candidate in &candidates {
        let id = fastrand::u16(..);
        let probe = message::soa_query(candidate, id).to_vec()?;
        let reply = transport.datagram(server, &probe).await?;
        let reply = Message::from_vec(&reply).map_err(TransportError::from)?;
        if reply.id() != id {
            return Err(TransportError::IdMismatch {
                sent: id,
                received: reply.id(),
            }
            .into());
        }

        if reply.response_code() == ResponseCode::NoError
            && !reply.answers().is_empty()
            && reply.authoritative()
        {
            debug!("received authoritative SOA response for {candidate}");
            return Ok(candidate.clone());
        }
        debug!("no authoritative SOA record found for {candidate}");
    }

    Err(Error::ZoneDiscovery {
        record: record_name.to_string(),
        candidates: candidates.iter().map(ToString::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(candidates: &[Name]) -> Vec<String> {
        candidates.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn challenge_label_is_stripped() {
        let candidates = candidate_zones("_acme-challenge.foo.example.com.").unwrap();
        assert_eq!(
            names(&candidates),
            vec!["foo.example.com.", "example.com.", "com."]
        );
    }

    #[test]
    fn plain_names_start_from_themselves() {
        let candidates = candidate_zones("www.example.com").unwrap();
        assert_eq!(
            names(&candidates),
            vec!["www.example.com.", "example.com.", "com."]
        );
    }

    #[test]
    fn single_label_yields_one_candidate() {
        let candidates = candidate_zones("com").unwrap();
        assert_eq!(names(&candidates), vec!["com."]);
    }

    #[test]
    fn stripping_is_case_insensitive() {
        let candidates = candidate_zones("_ACME-Challenge.example.com").unwrap();
        assert_eq!(names(&candidates), vec!["example.com.", "com."]);
    }
}
