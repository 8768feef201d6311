//! Project configuration.

/// Default bound on initializer text kept in a field stub.
pub const DEFAULT_MAX_INITIALIZER_LEN: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Initializers longer than this many bytes are stored as "too long" and
    /// read back from the syntax tree when needed.
    pub max_initializer_len: usize,
    /// Build stub trees on the rayon pool when loading several files.
    pub parallel_indexing: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            max_initializer_len: DEFAULT_MAX_INITIALIZER_LEN,
            parallel_indexing: true,
        }
    }
}

impl ProjectConfig {
    pub fn with_max_initializer_len(mut self, len: usize) -> Self {
        self.max_initializer_len = len;
        self
    }

    pub fn with_parallel_indexing(mut self, enabled: bool) -> Self {
        self.parallel_indexing = enabled;
        self
    }
}
