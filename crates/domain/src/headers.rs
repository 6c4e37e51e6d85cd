//! Case-insensitive HTTP header collection.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A single header as written by the scenario author or received on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Header name with its original casing.
    pub name: String,
    /// Header value.
    pub value: String,
}

impl Header {
    /// Creates a header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Header collection with case-insensitive names.
///
/// Insertion order is preserved for display. Inserting a name that already
/// exists (in any casing) replaces the previous entry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    items: Vec<Header>,
}

impl Headers {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Inserts or replaces a header without validation.
    ///
    /// Used for response headers, which were already accepted by the
    /// transport.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let header = Header::new(name, value);
        match self
            .items
            .iter_mut()
            .find(|h| h.name.eq_ignore_ascii_case(&header.name))
        {
            Some(existing) => *existing = header,
            None => self.items.push(header),
        }
    }

    /// Inserts or replaces a header after validating name and value.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not an HTTP token or the value
    /// contains CR or LF.
    pub fn try_insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> DomainResult<()> {
        let name = name.into();
        let value = value.into();
        validate_name(&name)?;
        if value.contains(['\r', '\n']) {
            return Err(DomainError::InvalidHeaderValue {
                name,
                reason: "line breaks are not allowed".to_string(),
            });
        }
        self.insert(name, value);
        Ok(())
    }

    /// Looks up a header value ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Returns true if a header with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.items.iter()
    }

    /// Number of headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no headers are present.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

// RFC 9110 token characters.
fn validate_name(name: &str) -> DomainResult<()> {
    let is_tchar = |c: char| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c);
    if name.is_empty() || !name.chars().all(is_tchar) {
        return Err(DomainError::InvalidHeaderName(name.to_string()));
    }
    Ok(())
}
