//! TSIG keys and message signing.
//!
//! Implements the client half of secret key transaction authentication for DNS
//! ([RFC 8945], originally RFC 2845): a keyed HMAC over the outgoing message plus the
//! TSIG variables, carried in a TSIG resource record appended to the additional section.
//!
//! The algorithm set matches what RFC 2136 update servers (e.g. BIND) accept for
//! `allow-update` keys: HMAC with MD5, SHA-1, or the SHA-2 family.
//!
//! [RFC 8945]: https://www.rfc-editor.org/rfc/rfc8945

use crate::error::Error;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use trust_dns_proto::error::ProtoError;
use trust_dns_proto::rr::{DNSClass, Name};
use trust_dns_proto::serialize::binary::{BinEncodable, BinEncoder};

/// TSIG resource record type code.
const TSIG_TYPE: u16 = 250;

/// Seconds of clock skew the server should tolerate around the time-signed value.
const FUDGE: u16 = 300;

const HEADER_LEN: usize = 12;
const ARCOUNT_OFFSET: usize = 10;

/// The HMAC algorithm a [`TsigKey`] signs with.
///
/// A fixed enumeration rather than a keyring: the algorithm is chosen once from the
/// credential configuration and travels with the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum TsigAlgorithm {
    HmacMd5,
    HmacSha1,
    HmacSha224,
    HmacSha256,
    HmacSha384,
    HmacSha512,
}

impl TsigAlgorithm {
    /// The algorithm's registered DNS name, as it appears in TSIG rdata.
    pub fn wire_name(self) -> Name {
        let name = match self {
            Self::HmacMd5 => "hmac-md5.sig-alg.reg.int.",
            Self::HmacSha1 => "hmac-sha1.",
            Self::HmacSha224 => "hmac-sha224.",
            Self::HmacSha256 => "hmac-sha256.",
            Self::HmacSha384 => "hmac-sha384.",
            Self::HmacSha512 => "hmac-sha512.",
        };
        // NB: unwrap is safe: constant names that always parse.
        Name::from_ascii(name).unwrap()
    }

    /// Compute the MAC of `data` under `secret`.
    pub(crate) fn mac(self, secret: &[u8], data: &[u8]) -> Vec<u8> {
        match self {
            Self::HmacMd5 => hmac_bytes::<Hmac<Md5>>(secret, data),
            Self::HmacSha1 => hmac_bytes::<Hmac<Sha1>>(secret, data),
            Self::HmacSha224 => hmac_bytes::<Hmac<Sha224>>(secret, data),
            Self::HmacSha256 => hmac_bytes::<Hmac<Sha256>>(secret, data),
            Self::HmacSha384 => hmac_bytes::<Hmac<Sha384>>(secret, data),
            Self::HmacSha512 => hmac_bytes::<Hmac<Sha512>>(secret, data),
        }
    }
}

impl FromStr for TsigAlgorithm {
    type Err = Error;

    /// Parse the spelling used in credential files, e.g. `HMAC-SHA256`. Case-insensitive.
    /// An unrecognized name is an error, never a silent fallback.
    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hmac-md5" => Ok(Self::HmacMd5),
            "hmac-sha1" => Ok(Self::HmacSha1),
            "hmac-sha224" => Ok(Self::HmacSha224),
            "hmac-sha256" => Ok(Self::HmacSha256),
            "hmac-sha384" => Ok(Self::HmacSha384),
            "hmac-sha512" => Ok(Self::HmacSha512),
            _ => Err(Error::UnknownAlgorithm(s.to_string())),
        }
    }
}

fn hmac_bytes<M: Mac + KeyInit>(secret: &[u8], data: &[u8]) -> Vec<u8> {
    // NB: unwrap is safe: HMAC accepts keys of any length. `Mac` and `KeyInit` both
    // expose new_from_slice, so the call must name one.
    let mut mac = <M as Mac>::new_from_slice(secret).unwrap();
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// A shared secret for authenticating dynamic updates, as configured on both the client
/// and the server's `allow-update` policy. Immutable once constructed; safe to share
/// read-only across concurrent operations.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct TsigKey {
    name: Name,
    secret: Vec<u8>,
    algorithm: TsigAlgorithm,
}

impl TsigKey {
    pub fn new(name: Name, secret: Vec<u8>, algorithm: TsigAlgorithm) -> Self {
        TsigKey {
            name,
            secret,
            algorithm,
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn algorithm(&self) -> TsigAlgorithm {
        self.algorithm
    }

    /// Sign a serialized DNS message, returning the wire form with a TSIG record
    /// appended to the additional section and ARCOUNT incremented.
    ///
    /// The MAC covers the unsigned message followed by the TSIG variables
    /// ([RFC 8945 §4.3.3]), so the signature authenticates the entire transaction.
    /// `now` is seconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Proto`] if `unsigned` is shorter than a DNS header or the TSIG
    /// record fails to encode.
    ///
    /// [RFC 8945 §4.3.3]: https://www.rfc-editor.org/rfc/rfc8945#section-4.3.3
    #[allow(clippy::cast_possible_truncation)] // MAC and rdata lengths are < 300 bytes
    pub fn sign_message(&self, unsigned: &[u8], now: u64) -> Result<Vec<u8>, Error> {
        if unsigned.len() < HEADER_LEN {
            return Err(ProtoError::from("message shorter than a DNS header").into());
        }
        let original_id = u16::from_be_bytes([unsigned[0], unsigned[1]]);

        let key_name = self.name.to_lowercase();
        let algorithm_name = self.algorithm.wire_name();
        let to_sign = mac_payload(unsigned, &key_name, &algorithm_name, now, FUDGE)?;
        let mac = self.algorithm.mac(&self.secret, &to_sign);

        let mut rdata = Vec::with_capacity(64 + mac.len());
        {
            let mut enc = BinEncoder::new(&mut rdata);
            enc.set_canonical_names(true);
            algorithm_name.emit(&mut enc)?;
            emit_u48(&mut enc, now)?;
            enc.emit_u16(FUDGE)?;
            enc.emit_u16(mac.len() as u16)?;
            enc.emit_vec(&mac)?;
            enc.emit_u16(original_id)?;
            enc.emit_u16(0)?; // error
            enc.emit_u16(0)?; // other len
        }

        let mut record = Vec::with_capacity(rdata.len() + 32);
        {
            let mut enc = BinEncoder::new(&mut record);
            enc.set_canonical_names(true);
            key_name.emit(&mut enc)?;
            enc.emit_u16(TSIG_TYPE)?;
            enc.emit_u16(u16::from(DNSClass::ANY))?;
            enc.emit_u32(0)?; // TTL
            enc.emit_u16(rdata.len() as u16)?;
            enc.emit_vec(&rdata)?;
        }

        let mut signed = Vec::with_capacity(unsigned.len() + record.len());
        signed.extend_from_slice(unsigned);
        let arcount = u16::from_be_bytes([signed[ARCOUNT_OFFSET], signed[ARCOUNT_OFFSET + 1]]) + 1;
        signed[ARCOUNT_OFFSET..ARCOUNT_OFFSET + 2].copy_from_slice(&arcount.to_be_bytes());
        signed.extend_from_slice(&record);
        Ok(signed)
    }
}

#[cfg(test)]
impl TsigKey {
    /// Server-side check used by the stub server in tests: recompute the MAC over the
    /// reconstructed unsigned message and compare.
    pub(crate) fn verify_mac(
        &self,
        unsigned: &[u8],
        time_signed: u64,
        fudge: u16,
        mac: &[u8],
    ) -> bool {
        let payload = mac_payload(
            unsigned,
            &self.name.to_lowercase(),
            &self.algorithm.wire_name(),
            time_signed,
            fudge,
        )
        .expect("mac payload");
        self.algorithm.mac(&self.secret, &payload) == mac
    }
}

/// Build the byte string the MAC is computed over: the unsigned message followed by the
/// TSIG variables in canonical form.
pub(crate) fn mac_payload(
    unsigned: &[u8],
    key_name: &Name,
    algorithm_name: &Name,
    time_signed: u64,
    fudge: u16,
) -> Result<Vec<u8>, ProtoError> {
    // The variables are encoded into their own buffer: BinEncoder writes from the
    // start of the Vec it is handed, so it cannot append to the message bytes.
    let mut variables = Vec::with_capacity(64);
    {
        let mut enc = BinEncoder::new(&mut variables);
        enc.set_canonical_names(true);
        key_name.emit(&mut enc)?;
        enc.emit_u16(u16::from(DNSClass::ANY))?;
        enc.emit_u32(0)?; // TTL
        algorithm_name.emit(&mut enc)?;
        emit_u48(&mut enc, time_signed)?;
        enc.emit_u16(fudge)?;
        enc.emit_u16(0)?; // error
        enc.emit_u16(0)?; // other len
    }

    let mut payload = Vec::with_capacity(unsigned.len() + variables.len());
    payload.extend_from_slice(unsigned);
    payload.extend_from_slice(&variables);
    Ok(payload)
}

#[allow(clippy::cast_possible_truncation)]
fn emit_u48(enc: &mut BinEncoder<'_>, value: u64) -> Result<(), ProtoError> {
    enc.emit_u16((value >> 32) as u16)?;
    enc.emit_u32(value as u32)?;
    Ok(())
}

/// Current time as seconds since the Unix epoch, for the TSIG time-signed field.
pub(crate) fn unix_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
