//! DNS message construction for SOA probes and RFC 2136 update transactions.

use crate::error::Error;
use trust_dns_proto::op::{Message, MessageType, OpCode, Query};
use trust_dns_proto::rr::rdata::TXT;
use trust_dns_proto::rr::{DNSClass, Name, RData, Record, RecordType};

/// A non-recursive SOA query for one zone-discovery probe.
pub(crate) fn soa_query(candidate: &Name, id: u16) -> Message {
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(false);
    message.add_query(Query::query(candidate.clone(), RecordType::SOA));
    message
}

/// An UPDATE message skeleton scoped to `zone`: the zone section names the zone's SOA
/// per RFC 2136 §2.3, and the update section starts empty.
fn update_skeleton(zone: &Name, id: u16) -> Message {
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Update)
        .set_recursion_desired(false);
    message.add_query(Query::query(zone.clone(), RecordType::SOA));
    message
}

/// An UPDATE adding one TXT record at `record_name` with the given TTL.
pub(crate) fn add_txt(zone: &Name, record_name: &Name, value: &str, ttl: u32, id: u16) -> Message {
    let mut message = update_skeleton(zone, id);
    let mut record = Record::from_rdata(
        record_name.clone(),
        ttl,
        RData::TXT(TXT::new(vec![value.to_string()])),
    );
    record.set_dns_class(DNSClass::IN);
    message.add_name_server(record);
    message
}

/// An UPDATE deleting the TXT record that exactly matches `record_name` and `value`.
/// Class NONE with TTL 0 selects "delete an RR from an RRset" (RFC 2136 §2.5.4); the
/// TTL plays no role in matching.
pub(crate) fn del_txt(zone: &Name, record_name: &Name, value: &str, id: u16) -> Message {
    let mut message = update_skeleton(zone, id);
    let mut record = Record::from_rdata(
        record_name.clone(),
        0,
        RData::TXT(TXT::new(vec![value.to_string()])),
    );
    record.set_dns_class(DNSClass::NONE);
    message.add_name_server(record);
    message
}

/// Parse `record_name` as a fully qualified name.
pub(crate) fn fqdn(record_name: &str) -> Result<Name, Error> {
    let mut name = Name::from_ascii(record_name)?;
    name.set_fqdn(true);
    Ok(name)
}

/// The owner name of `name` relative to `zone`, e.g. `_acme-challenge.www` for
/// `_acme-challenge.www.example.com` in zone `example.com`. The zone apex itself
/// relativizes to the root name.
///
/// # Errors
///
/// Returns [`Error::NotInZone`] when `name` is not a descendant of `zone`.
pub(crate) fn relativize(name: &Name, zone: &Name) -> Result<Name, Error> {
    if !zone.zone_of(name) {
        return Err(Error::NotInZone {
            record: name.to_string(),
            zone: zone.to_string(),
        });
    }
    let keep = usize::from(name.num_labels() - zone.num_labels());
    if keep == 0 {
        return Ok(Name::root());
    }
    let mut relative = Name::from_labels(name.iter().take(keep))?;
    relative.set_fqdn(false);
    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    #[test]
    fn soa_probe_clears_recursion_desired() {
        let probe = soa_query(&name("example.com."), 42);
        assert_eq!(probe.id(), 42);
        assert!(!probe.recursion_desired());
        assert_eq!(probe.op_code(), OpCode::Query);
        assert_eq!(probe.queries().len(), 1);
        assert_eq!(probe.queries()[0].query_type(), RecordType::SOA);
    }

    #[test]
    fn add_scopes_update_to_zone() {
        let update = add_txt(
            &name("example.com."),
            &name("_acme-challenge.www.example.com."),
            "token",
            120,
            1,
        );
        assert_eq!(update.op_code(), OpCode::Update);
        assert_eq!(update.queries()[0].name(), &name("example.com."));
        let records = update.name_servers();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].dns_class(), DNSClass::IN);
        assert_eq!(records[0].ttl(), 120);
    }

    #[test]
    fn delete_uses_class_none_and_zero_ttl() {
        let update = del_txt(
            &name("example.com."),
            &name("_acme-challenge.www.example.com."),
            "token",
            1,
        );
        let records = update.name_servers();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].dns_class(), DNSClass::NONE);
        assert_eq!(records[0].ttl(), 0);
    }

    #[test]
    fn relativize_strips_the_zone_suffix() {
        let rel = relativize(
            &name("_acme-challenge.www.example.com."),
            &name("example.com."),
        )
        .unwrap();
        assert_eq!(rel.to_string(), "_acme-challenge.www");
        assert!(!rel.is_fqdn());
    }

    #[test]
    fn zone_apex_relativizes_to_root() {
        let rel = relativize(&name("example.com."), &name("example.com.")).unwrap();
        assert!(rel.is_root());
    }

    #[test]
    fn foreign_name_is_rejected() {
        let err = relativize(&name("www.example.org."), &name("example.com.")).unwrap_err();
        assert!(matches!(err, Error::NotInZone { .. }));
    }
}
