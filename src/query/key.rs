use std::fmt;

/// Identifies a cache entry: a resource name plus an optional identifier.
///
/// `QueryKey::list("posts")` addresses the whole collection and
/// `QueryKey::item("posts", "42")` a single member of it. Invalidation works on
/// the resource name, so both are covered by `invalidate("posts")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: String,
    id: Option<String>,
}

impl QueryKey {
    /// Key for a whole collection.
    pub fn list(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            id: None,
        }
    }

    /// Key for a single member of a collection.
    pub fn item(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            id: Some(id.into()),
        }
    }

    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns `true` if this key falls under the given resource prefix.
    #[must_use]
    pub fn matches(&self, prefix: &str) -> bool {
        self.resource == prefix
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}/{id}", self.resource),
            None => f.write_str(&self.resource),
        }
    }
}
