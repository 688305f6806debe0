use std::fmt;

/// How long a resolved instance lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceScope {
    /// One instance, owned by the root provider and shared with every scope
    #[default]
    Singleton,
    /// One instance per scope; the web host opens a scope per request
    Scoped,
    /// A fresh instance on every resolution
    Transient,
}

impl ServiceScope {
    pub fn is_singleton(&self) -> bool {
        matches!(self, ServiceScope::Singleton)
    }
}

impl fmt::Display for ServiceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ServiceScope::Singleton => "singleton",
            ServiceScope::Scoped => "scoped",
            ServiceScope::Transient => "transient",
        })
    }
}
