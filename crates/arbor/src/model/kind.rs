//! Node kinds and the kind registry.
//!
//! A [`NodeKind`] is a type identifier string attached to every node. The
//! [`KindRegistry`] maps kinds to constructors producing their default fields
//! and records the base kind each kind extends. Lookups such as "which kinds
//! may be inserted where `Shape` is expected" are answered from the registry
//! at configuration time rather than by inspecting node types at runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TreeError, TreeResult};

/// Field payload carried by a node.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// Constructor returning the default fields of a kind.
pub type KindConstructor = fn() -> FieldMap;

/// A node type identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKind(String);

impl NodeKind {
    /// Create a kind from its identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The kind identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKind {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeKind {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone)]
struct KindInfo {
    kind: NodeKind,
    base: Option<NodeKind>,
    constructor: KindConstructor,
}

/// Registry of known node kinds.
///
/// Kinds are kept in registration order, which is also the order
/// [`embedders_of`](Self::embedders_of) reports them in.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: Vec<KindInfo>,
}

impl KindRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind with no fields.
    pub fn register(&mut self, kind: impl Into<NodeKind>, base: Option<&NodeKind>) -> TreeResult<()> {
        self.register_with(kind, base, FieldMap::new)
    }

    /// Register a kind with a constructor for its default fields.
    ///
    /// The base kind, if any, must already be registered. Registering a kind
    /// twice replaces its constructor; the base set on first registration is
    /// kept.
    pub fn register_with(
        &mut self,
        kind: impl Into<NodeKind>,
        base: Option<&NodeKind>,
        constructor: KindConstructor,
    ) -> TreeResult<()> {
        let kind = kind.into();
        if let Some(base) = base
            && !self.contains(base)
        {
            return Err(TreeError::unknown_kind(base.as_str()));
        }
        match self.kinds.iter_mut().find(|k| k.kind == kind) {
            Some(existing) => existing.constructor = constructor,
            None => self.kinds.push(KindInfo {
                kind,
                base: base.cloned(),
                constructor,
            }),
        }
        Ok(())
    }

    /// Whether `kind` is registered.
    pub fn contains(&self, kind: &NodeKind) -> bool {
        self.info(kind).is_some()
    }

    /// The base kind `kind` extends.
    pub fn base_of(&self, kind: &NodeKind) -> Option<&NodeKind> {
        self.info(kind).and_then(|info| info.base.as_ref())
    }

    /// Whether `kind` is `ancestor` or extends it, directly or indirectly.
    pub fn is_a(&self, kind: &NodeKind, ancestor: &NodeKind) -> bool {
        let mut current = Some(kind);
        // The base chain is acyclic: a base must exist before its extension.
        while let Some(k) = current {
            if k == ancestor {
                return self.contains(k);
            }
            current = self.base_of(k);
        }
        false
    }

    /// All registered kinds insertable where `kind` is expected.
    ///
    /// `kind` itself comes first, then every kind extending it.
    pub fn embedders_of(&self, kind: &NodeKind) -> Vec<NodeKind> {
        if !self.contains(kind) {
            return Vec::new();
        }
        let mut out = vec![kind.clone()];
        out.extend(
            self.kinds
                .iter()
                .filter(|info| &info.kind != kind && self.is_a(&info.kind, kind))
                .map(|info| info.kind.clone()),
        );
        out
    }

    /// Default fields for a new node of `kind`.
    pub fn construct(&self, kind: &NodeKind) -> TreeResult<FieldMap> {
        self.info(kind)
            .map(|info| (info.constructor)())
            .ok_or_else(|| TreeError::unknown_kind(kind.as_str()))
    }

    /// Iterate over registered kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &NodeKind> {
        self.kinds.iter().map(|info| &info.kind)
    }

    fn info(&self, kind: &NodeKind) -> Option<&KindInfo> {
        self.kinds.iter().find(|info| &info.kind == kind)
    }
}
