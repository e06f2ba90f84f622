use std::collections::HashMap;

use serde_json::Value;
use tracing::trace;

/// Where an indexed path lives in the tree.
///
/// Stores the byte offsets at which the path's separators start, so the
/// segments are slices of the indexed path itself. A key that contains the
/// separator (written under another separator, or nested inside an object
/// value) still resolves to the node it was indexed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Location {
    breaks: Box<[usize]>,
    separator_len: usize,
}

impl Location {
    /// Location of a path already split into `segments`.
    pub(crate) fn of(segments: &[&str], separator: &str) -> Self {
        let mut breaks = Vec::with_capacity(segments.len().saturating_sub(1));
        let mut offset = 0;

        for segment in segments.iter().take(segments.len().saturating_sub(1)) {
            offset += segment.len();
            breaks.push(offset);
            offset += separator.len();
        }

        Self {
            breaks: breaks.into_boxed_slice(),
            separator_len: separator.len(),
        }
    }

    /// Location of a key appended to a path of `parent_len` bytes.
    fn child(&self, parent_len: usize) -> Self {
        let mut breaks = Vec::with_capacity(self.breaks.len() + 1);
        breaks.extend_from_slice(&self.breaks);
        breaks.push(parent_len);

        Self {
            breaks: breaks.into_boxed_slice(),
            separator_len: self.separator_len,
        }
    }

    /// Tree segments of `path`, which must be the path this location was
    /// indexed under.
    pub(crate) fn segments<'p>(&'p self, path: &'p str) -> impl Iterator<Item = &'p str> {
        let separator_len = self.separator_len;
        let mut start = 0;

        self.breaks
            .iter()
            .copied()
            .chain([path.len()])
            .map(move |end| {
                let segment = path.get(start..end).unwrap_or_default();
                start = end + separator_len;
                segment
            })
    }
}

/// Flat lookup from full path to its node in the tree.
///
/// Entries hold locations, not values: reading an entry walks the tree, so
/// an indexed ancestor always sees writes made below it. Object values are
/// fully materialized: all of their descendant paths are indexed too
/// (unless written with `references` disabled). The root itself is never
/// indexed.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReferenceIndex {
    entries: HashMap<String, Location>,
}

impl ReferenceIndex {
    pub(crate) fn location(&self, path: &str) -> Option<&Location> {
        self.entries.get(path)
    }

    pub(crate) fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Drops `path` and every path materialized from `previous`, the value
    /// being replaced.
    ///
    /// Returns the number of entries removed.
    pub(crate) fn invalidate(
        &mut self,
        path: &str,
        previous: Option<&Value>,
        separator: &str,
    ) -> usize {
        let removed = self.remove_subtree(path, previous, separator);
        trace!(path, removed, "Invalidated index entries");
        removed
    }

    fn remove_subtree(&mut self, path: &str, node: Option<&Value>, separator: &str) -> usize {
        let mut removed = usize::from(self.entries.remove(path).is_some());

        if let Some(Value::Object(object)) = node {
            for (key, child) in object {
                let child_path = format!("{path}{separator}{key}");
                removed += self.remove_subtree(&child_path, Some(child), separator);
            }
        }

        removed
    }

    /// Indexes `value` at `path`, and with `deep` every descendant of an
    /// object value.
    pub(crate) fn materialize(
        &mut self,
        path: &str,
        location: Location,
        value: &Value,
        separator: &str,
        deep: bool,
    ) {
        if deep {
            if let Value::Object(object) = value {
                for (key, child) in object {
                    let child_path = format!("{path}{separator}{key}");
                    let child_location = location.child(path.len());
                    self.materialize(&child_path, child_location, child, separator, deep);
                }
            }
        }

        self.entries.insert(path.to_string(), location);
    }
}
