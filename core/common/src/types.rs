//! Common types used throughout ovhdeploy.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// Characters escaped inside a single URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A normalized, `/`-separated object path inside a storage account.
///
/// Empty segments and `.` are dropped and `..` pops the previous segment,
/// so joining pieces that start or end with separators never produces
/// doubled slashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectPath {
    components: Vec<String>,
}

impl ObjectPath {
    /// Create an empty path.
    pub fn root() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Parse a path string, normalizing separators.
    ///
    /// Only `/` separates segments; a backslash is part of its segment.
    pub fn parse(path: &str) -> Self {
        let mut parsed = Self::root();
        parsed.push(path);
        parsed
    }

    /// Build a path from several pieces, each of which may itself contain
    /// separators.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut path = Self::root();
        for part in parts {
            path.push(part.as_ref());
        }
        path
    }

    /// Append a piece to this path.
    pub fn push(&mut self, piece: &str) {
        for segment in piece.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    self.components.pop();
                }
                other => self.components.push(other.to_string()),
            }
        }
    }

    /// Return a new path with `piece` appended.
    pub fn join(&self, piece: &str) -> Self {
        let mut joined = self.clone();
        joined.push(piece);
        joined
    }

    /// Check if the path has no segments.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Get the path components.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Render as `/a/b/c`, or `/` for the empty path.
    pub fn to_string_path(&self) -> String {
        if self.is_root() {
            "/".to_string()
        } else {
            format!("/{}", self.components.join("/"))
        }
    }

    /// Compose an absolute URL under `base_url`.
    ///
    /// Each segment is percent-encoded; a trailing `/` on the base is ignored.
    pub fn to_url(&self, base_url: &str) -> String {
        let mut url = base_url.trim_end_matches('/').to_string();
        for component in &self.components {
            url.push('/');
            url.extend(utf8_percent_encode(component, SEGMENT));
        }
        url
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_path())
    }
}

/// Secret string that zeroizes on drop and never prints its value.
#[derive(Clone, Default, Zeroize, Serialize, Deserialize)]
#[zeroize(drop)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret for signing.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}
