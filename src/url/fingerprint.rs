use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

/// SHA-256 digest identifying a normalized URL in the durable stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hex form used as the storage key
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses the storage key form; `None` unless it is 64 hex characters
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        bytes.try_into().ok().map(Self)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Computes the fingerprint of a URL
///
/// The digest covers `host[:port]/path/query` and ignores the scheme, so
/// `http` and `https` spellings of a page share one record.
///
/// # Examples
///
/// ```
/// use sumi_frontier::url::fingerprint;
/// use url::Url;
///
/// let a = fingerprint(&Url::parse("http://example.com/a?x=1").unwrap());
/// let b = fingerprint(&Url::parse("https://example.com/a?x=1").unwrap());
/// assert_eq!(a, b);
/// ```
pub fn fingerprint(url: &Url) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(url.host_str().unwrap_or("").as_bytes());
    if let Some(port) = url.port() {
        hasher.update(format!(":{}", port).as_bytes());
    }
    hasher.update(b"/");
    hasher.update(url.path().as_bytes());
    hasher.update(b"/");
    hasher.update(url.query().unwrap_or("").as_bytes());
    Fingerprint(hasher.finalize().into())
}
