use crate::error::Error;
use crate::tsig::TsigKey;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use trust_dns_proto::rr::Name;

/// Default DNS port.
fn default_port() -> u16 {
    53
}

/// Default TTL for published challenge records. Short, since the records only need to
/// outlive one validation attempt.
fn default_ttl() -> u32 {
    120
}

/// Credentials and endpoint for one authoritative server, loaded from a JSON file.
///
/// ```json
/// {
///   "server": "192.0.2.1",
///   "key_name": "update-key.example.com",
///   "key_secret": "aS1hbS1hLXNoYXJlZC1zZWNyZXQ=",
///   "key_algorithm": "HMAC-SHA256"
/// }
/// ```
///
/// `port` defaults to 53 and `ttl` to 120 seconds when omitted. The secret is standard
/// base64, and the algorithm is one of the HMAC names in
/// [`TsigAlgorithm`][crate::tsig::TsigAlgorithm].
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub server: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    pub key_name: String,
    pub key_secret: String,
    pub key_algorithm: String,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl Config {
    /// Load and validate a `Config` from the JSON file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::InvalidJson`] for unreadable or malformed
    /// files, and the key-material errors of [`tsig_key`][Self::tsig_key] so that bad
    /// credentials are caught at load time rather than mid-challenge.
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.tsig_key()?;
        Ok(conf)
    }

    /// The server endpoint updates and probes are sent to.
    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server, self.port)
    }

    /// The validated TSIG key assembled from the credential fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Proto`] for an unparseable key name,
    /// [`Error::InvalidKeySecret`] for invalid base64, and
    /// [`Error::UnknownAlgorithm`] for an algorithm outside the supported HMAC set.
    pub fn tsig_key(&self) -> Result<TsigKey, Error> {
        let name = Name::from_ascii(&self.key_name)?;
        let secret = BASE64.decode(self.key_secret.trim())?;
        let algorithm = self.key_algorithm.parse()?;
        Ok(TsigKey::new(name, secret, algorithm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tsig::TsigAlgorithm;

    fn base_config() -> Config {
        serde_json::from_str(
            r#"{
                "server": "192.0.2.1",
                "key_name": "update-key.example.com",
                "key_secret": "c2hhcmVkLXNlY3JldA==",
                "key_algorithm": "HMAC-SHA256"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn defaults_apply_when_fields_are_omitted() {
        let conf = base_config();
        assert_eq!(conf.port, 53);
        assert_eq!(conf.ttl, 120);
        assert_eq!(conf.server_addr().to_string(), "192.0.2.1:53");
    }

    #[test]
    fn key_material_round_trips() {
        let key = base_config().tsig_key().unwrap();
        assert_eq!(key.algorithm(), TsigAlgorithm::HmacSha256);
        assert_eq!(key.name().to_string(), "update-key.example.com");
    }

    #[test]
    fn invalid_secret_is_rejected() {
        let mut conf = base_config();
        conf.key_secret = "not base64!".to_string();
        assert!(matches!(conf.tsig_key(), Err(Error::InvalidKeySecret(_))));
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let mut conf = base_config();
        conf.key_algorithm = "HMAC-CRC32".to_string();
        assert!(matches!(conf.tsig_key(), Err(Error::UnknownAlgorithm(_))));
    }
}
