//! Session identifier and the policy used to mint new ones.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// Opaque token grouping a user's turns for backend continuity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new SessionId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new SessionId with the default policy.
    pub fn generate() -> Self {
        IdGenerator::default().generate()
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A source of cryptographically strong random bytes.
pub trait EntropySource: Send {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), rand::Error>;
}

/// Entropy from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        OsRng.try_fill_bytes(dest)
    }
}

/// Mints session identifiers.
///
/// Strategies are tried in order:
/// 1. the native UUID v4 generator (if enabled),
/// 2. an RFC 4122 v4 UUID assembled from the entropy source,
/// 3. a base-36 `timestamp-random` string when no entropy is available.
///
/// Generation never fails.
pub struct IdGenerator {
    native: bool,
    entropy: Option<Box<dyn EntropySource>>,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self {
            native: true,
            entropy: Some(Box::new(OsEntropy)),
        }
    }
}

impl IdGenerator {
    /// Disable the native UUID generator.
    pub fn without_native(mut self) -> Self {
        self.native = false;
        self
    }

    /// Use a specific entropy source for the assembled UUID.
    pub fn with_entropy(mut self, entropy: impl EntropySource + 'static) -> Self {
        self.entropy = Some(Box::new(entropy));
        self
    }

    /// Drop the entropy source entirely.
    pub fn without_entropy(mut self) -> Self {
        self.entropy = None;
        self
    }

    /// Generate a new identifier.
    pub fn generate(&mut self) -> SessionId {
        if self.native {
            return SessionId(Uuid::new_v4().to_string());
        }

        if let Some(entropy) = self.entropy.as_mut() {
            let mut bytes = [0u8; 16];
            match entropy.fill(&mut bytes) {
                Ok(()) => return SessionId(uuid_v4_from_bytes(bytes)),
                Err(e) => warn!(error = %e, "Entropy source failed, using fallback session id"),
            }
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let mut rng = StdRng::seed_from_u64(now.as_nanos() as u64 ^ u64::from(std::process::id()));
        let id = fallback_id(now.as_millis() as u64, rng.gen());
        debug!(session_id = %id, "Generated fallback session id");
        SessionId(id)
    }
}

/// Format 16 random bytes as an RFC 4122 version 4 UUID.
///
/// The version nibble is forced to `4` and the variant bits to `10`.
pub fn uuid_v4_from_bytes(mut bytes: [u8; 16]) -> String {
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Non-cryptographic identifier: base-36 timestamp, a dash, and up to eight
/// base-36 characters of randomness.
pub fn fallback_id(timestamp_ms: u64, random: u64) -> String {
    let fragment: String = to_base36(random).chars().take(8).collect();
    format!("{}-{}", to_base36(timestamp_ms), fragment)
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEntropy(u8);

    impl EntropySource for FixedEntropy {
        fn fill(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            dest.fill(self.0);
            Ok(())
        }
    }

    struct BrokenEntropy;

    impl EntropySource for BrokenEntropy {
        fn fill(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no entropy",
            )))
        }
    }

    fn assert_uuid_v4(id: &str) {
        assert_eq!(id.len(), 36);
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(
            parts.iter().map(|p| p.len()).collect::<Vec<_>>(),
            vec![8, 4, 4, 4, 12]
        );
        assert_eq!(&id[14..15], "4");
        assert!(matches!(&id[19..20], "8" | "9" | "a" | "b"));
    }

    #[test]
    fn test_native_generator() {
        let id = SessionId::generate();
        assert_uuid_v4(id.as_str());
        assert_ne!(id, SessionId::generate());
    }

    #[test]
    fn test_uuid_from_bytes_forces_version_and_variant() {
        let id = uuid_v4_from_bytes([0xff; 16]);
        assert_eq!(id, "ffffffff-ffff-4fff-bfff-ffffffffffff");

        let id = uuid_v4_from_bytes([0x00; 16]);
        assert_eq!(id, "00000000-0000-4000-8000-000000000000");
    }

    #[test]
    fn test_assembled_uuid_from_entropy() {
        let mut generator = IdGenerator::default()
            .without_native()
            .with_entropy(FixedEntropy(0x5a));
        let id = generator.generate();
        assert_uuid_v4(id.as_str());
        assert!(id.as_str().starts_with("5a5a5a5a-5a5a-4a5a-9a5a-"));
    }

    #[test]
    fn test_fallback_when_entropy_fails() {
        let mut generator = IdGenerator::default()
            .without_native()
            .with_entropy(BrokenEntropy);
        let id = generator.generate().into_inner();
        let (ts, fragment) = id.split_once('-').unwrap();
        assert!(!ts.is_empty());
        assert!(!fragment.is_empty() && fragment.len() <= 8);
        assert!(id
            .chars()
            .all(|c| c == '-' || c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_fallback_id_shape() {
        assert_eq!(fallback_id(0, 0), "0-0");
        assert_eq!(fallback_id(35, 36), "z-10");
        assert_eq!(fallback_id(1, u64::MAX).len(), 2 + 8);
    }

    #[test]
    fn test_id_display() {
        let id = SessionId::new("test-123");
        assert_eq!(format!("{}", id), "test-123");
    }
}
