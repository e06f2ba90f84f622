use std::collections::HashSet;

use serde_json::{Map, Value};

/// Returns true for values the store traverses and indexes key by key.
///
/// Only bare JSON objects qualify. Arrays and scalars (including `null`) are
/// stored and indexed as single opaque leaves.
pub fn is_plain_object(value: &Value) -> bool {
    matches!(value, Value::Object(_))
}

/// Classification of an own child of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Missing,
    Branch,
    Leaf,
}

/// Why the tree refused an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertError {
    /// The parent location does not exist or is not an object.
    Detached,
    /// The parent object is frozen and the key is new.
    Frozen,
}

/// Canonical nested storage.
///
/// The root is always an object. Frozen locations are tracked by segment
/// list rather than by joined path so a later separator change does not
/// affect them.
#[derive(Debug, Clone)]
pub(crate) struct PropertyTree {
    root: Value,
    frozen: HashSet<Vec<String>>,
}

impl Default for PropertyTree {
    fn default() -> Self {
        Self {
            root: Value::Object(Map::new()),
            frozen: HashSet::new(),
        }
    }
}

impl PropertyTree {
    pub(crate) fn root(&self) -> &Value {
        &self.root
    }

    pub(crate) fn node(&self, segments: &[&str]) -> Option<&Value> {
        self.walk(segments.iter().copied())
    }

    /// Follows `segments` down from the root.
    pub(crate) fn walk<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Option<&Value> {
        segments
            .into_iter()
            .try_fold(&self.root, |node, segment| node.as_object()?.get(segment))
    }

    fn node_mut(&mut self, segments: &[&str]) -> Option<&mut Value> {
        let mut node = &mut self.root;
        for segment in segments {
            node = node.as_object_mut()?.get_mut(*segment)?;
        }
        Some(node)
    }

    pub(crate) fn child_kind(&self, parent: &[&str], key: &str) -> NodeKind {
        match self
            .node(parent)
            .and_then(Value::as_object)
            .and_then(|object| object.get(key))
        {
            None => NodeKind::Missing,
            Some(child) if is_plain_object(child) => NodeKind::Branch,
            Some(_) => NodeKind::Leaf,
        }
    }

    /// Writes `value` under `key` of the object at `parent`.
    ///
    /// Any freeze marks at or below the replaced location are dropped: the
    /// object they protected is gone.
    pub(crate) fn insert(
        &mut self,
        parent: &[&str],
        key: &str,
        value: Value,
    ) -> Result<(), InsertError> {
        let frozen = self.is_frozen(parent);
        let object = self
            .node_mut(parent)
            .and_then(Value::as_object_mut)
            .ok_or(InsertError::Detached)?;

        if frozen && !object.contains_key(key) {
            return Err(InsertError::Frozen);
        }

        object.insert(key.to_string(), value);
        self.thaw_below(parent, key);
        Ok(())
    }

    /// Shallow structural freeze: the object at `segments` can no longer
    /// gain keys. Existing keys stay writable and nested objects are not
    /// affected.
    pub(crate) fn freeze(&mut self, segments: &[&str]) {
        self.frozen.insert(owned(segments));
    }

    pub(crate) fn is_frozen(&self, segments: &[&str]) -> bool {
        !self.frozen.is_empty() && self.frozen.contains(&owned(segments))
    }

    fn thaw_below(&mut self, parent: &[&str], key: &str) {
        if self.frozen.is_empty() {
            return;
        }

        let mut location = owned(parent);
        location.push(key.to_string());
        self.frozen.retain(|marked| !marked.starts_with(&location));
    }
}

fn owned(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|segment| segment.to_string()).collect()
}
