/// Splits and joins separator-delimited property paths.
///
/// Purely string based. Segment contents are never validated, so a path
/// that starts, ends, or doubles up on the separator yields empty-string
/// segments which are stored as literal empty keys.
///
/// # Examples
/// * `"server.port"` splits into `["server", "port"]`
/// * `"server"` splits into `["server"]`
/// * `".port"` splits into `["", "port"]`
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    separator: &'a str,
}

impl<'a> PathResolver<'a> {
    /// Creates a resolver for the given separator.
    ///
    /// The separator must not be empty; `StoreOptions` guarantees this for
    /// every resolver the store hands out.
    pub fn new(separator: &'a str) -> Self {
        Self { separator }
    }

    /// The separator this resolver splits on.
    pub fn separator(&self) -> &'a str {
        self.separator
    }

    /// Splits a path into its ordered segments.
    pub fn split<'p>(&self, path: &'p str) -> Vec<&'p str> {
        path.split(self.separator).collect()
    }

    /// Joins segments back into a path.
    pub fn join<S: AsRef<str>>(&self, segments: &[S]) -> String {
        let mut path = String::new();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                path.push_str(self.separator);
            }
            path.push_str(segment.as_ref());
        }
        path
    }

    /// Path of `key` directly below `base`.
    pub fn child(&self, base: &str, key: &str) -> String {
        format!("{base}{}{key}", self.separator)
    }
}
