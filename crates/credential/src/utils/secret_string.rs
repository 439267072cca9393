//! Zeroizing holder for secret access keys and API tokens

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Text shown wherever a secret would otherwise be printed or serialized
pub const REDACTED: &str = "[REDACTED]";

/// A secret value that is never printed and is wiped on drop
///
/// Reads go through [`expose_secret`](Self::expose_secret) so the plain text
/// cannot outlive the closure. Sinks that must hand the value to another
/// owner (a child process argument, an HTTP body) take a
/// [`Zeroizing`] copy with [`to_zeroizing`](Self::to_zeroizing).
///
/// ```
/// use keyturn_credential::SecretString;
///
/// let secret = SecretString::new("wJalrXUtnFEMI/K7MDENG");
/// assert_eq!(secret.expose_secret(str::len), 21);
/// assert_eq!(format!("{secret:?}"), "[REDACTED]");
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    inner: String,
}

impl SecretString {
    /// Wrap a secret value
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self { inner: s.into() }
    }

    /// Run `f` against the plain text
    pub fn expose_secret<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        f(&self.inner)
    }

    /// Owned copy that is wiped when dropped
    pub fn to_zeroizing(&self) -> Zeroizing<String> {
        Zeroizing::new(self.inner.clone())
    }

    /// Byte length
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the value is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Whether the value is empty or only whitespace
    pub fn is_blank(&self) -> bool {
        self.inner.trim().is_empty()
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(REDACTED)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}
