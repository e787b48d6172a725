//! `crypto.subtle.digest` backed by the host `hash` primitive.

use std::fmt;
use std::str::FromStr;

use crate::bridge::HostBridge;
use crate::error::{EdkError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// Name the host expects.
    pub fn as_str(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Length of the digest in bytes.
    pub fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha512 => 64,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = EdkError;

    /// Accepts `SHA-256`, `sha256` and the like.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "");
        match normalized.as_str() {
            "SHA1" => Ok(DigestAlgorithm::Sha1),
            "SHA256" => Ok(DigestAlgorithm::Sha256),
            "SHA512" => Ok(DigestAlgorithm::Sha512),
            _ => Err(EdkError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Hash `data` on the host. Strings are hashed as their UTF-8 bytes.
pub fn digest(
    bridge: &dyn HostBridge,
    algorithm: DigestAlgorithm,
    data: impl AsRef<[u8]>,
) -> Result<Vec<u8>> {
    let data = data.as_ref();
    tracing::trace!(algorithm = %algorithm, len = data.len(), "digest");
    bridge.hash(algorithm.as_str(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockHost;

    #[test]
    fn test_parse_names() {
        assert_eq!("SHA-256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert_eq!("sha512".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha512);
        assert_eq!("Sha-1".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha1);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "MD5".parse::<DigestAlgorithm>().unwrap_err();
        assert!(matches!(err, EdkError::UnsupportedAlgorithm(name) if name == "MD5"));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(DigestAlgorithm::Sha1.to_string(), "SHA-1");
        assert_eq!(DigestAlgorithm::Sha256.as_str(), "SHA-256");
        assert_eq!(DigestAlgorithm::Sha512.as_str(), "SHA-512");
    }

    #[test]
    fn test_digest_sha256() {
        let host = MockHost::new();
        let out = digest(&host, DigestAlgorithm::Sha256, "abc").unwrap();
        assert_eq!(out.len(), DigestAlgorithm::Sha256.output_len());
        assert_eq!(
            &out[..4],
            &[0xba, 0x78, 0x16, 0xbf],
            "SHA-256(\"abc\") starts with ba7816bf"
        );
    }

    #[test]
    fn test_digest_bytes_and_str_agree() {
        let host = MockHost::new();
        let a = digest(&host, DigestAlgorithm::Sha512, "moosync").unwrap();
        let b = digest(&host, DigestAlgorithm::Sha512, b"moosync".to_vec()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_host_failure_propagates() {
        let host = MockHost::new();
        assert!(digest(&host, DigestAlgorithm::Sha1, "abc").is_err());
    }
}
