//! Publish session identity

/// Unique identifier for a publish session (scope + stream name)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublishKey {
    /// Scope name (e.g., "live")
    pub scope: String,
    /// Stream name (e.g., "alice")
    pub name: String,
}

impl PublishKey {
    /// Create a new publish key
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for PublishKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.scope, self.name)
    }
}
