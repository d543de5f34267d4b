//! Comparison paths and cycle-detection references
//!
//! Every node visited during a walk is addressed by a [`NodePath`]: an
//! ordered sequence of segments from the root subject down to the current
//! member, element, or dictionary entry. Paths render the way they appear
//! in failure reports (`Friends[2].Name`, `Scores["math"]`).
//!
//! [`ObjectReference`] combines an object's instance identity with the
//! path it was reached through and is the key used for per-branch cycle
//! detection. Two references to the same instance are considered equal
//! when their paths are *compatible*: either path is empty, or one path's
//! segment sequence is a segment-boundary prefix of the other's. The
//! relation is symmetric by construction; revisiting an instance through a
//! compatible path on the same branch is a cycle, while the same instance
//! at unrelated positions is legitimate aliasing.

use std::fmt;

use crate::value::ObjectHandle;

/// A single segment in a comparison path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named member (field or property)
    Member(String),
    /// A sequence element index
    Index(usize),
    /// A dictionary key, rendered with its value description
    Key(String),
}

impl PathSegment {
    /// Create a member segment
    pub fn member(name: impl Into<String>) -> Self {
        Self::Member(name.into())
    }

    /// The member name, if this is a member segment
    pub fn member_name(&self) -> Option<&str> {
        match self {
            Self::Member(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member(name) => write!(f, "{name}"),
            Self::Index(index) => write!(f, "[{index}]"),
            Self::Key(key) => write!(f, "[{key}]"),
        }
    }
}

/// An ordered path from the comparison root to the current node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath {
    segments: Vec<PathSegment>,
}

impl NodePath {
    /// The empty path addressing the top-level subject
    pub fn root() -> Self {
        Self::default()
    }

    /// Number of segments; used as the recursion depth of the node
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the top-level subject path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The raw segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Push a segment while descending into a child node
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Pop the last segment when unwinding out of a child node
    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// A new path extended with one segment
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// The dotted member-name path, skipping index and key segments
    ///
    /// Selection and per-path configuration rules address members by this
    /// form, so a rule for `Friends.Name` applies to every element of the
    /// `Friends` collection.
    pub fn member_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            if let PathSegment::Member(name) = segment {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
        }
        out
    }

    /// Whether `prefix`'s segments are a segment-boundary prefix of ours
    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "subject");
        }
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                PathSegment::Member(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                other => out.push_str(&other.to_string()),
            }
        }
        write!(f, "{out}")
    }
}

/// Identifies an object node in the comparison graph by (instance, path)
///
/// Used as the cycle-detection key: the engine keeps a stack of the
/// references on the current branch and treats a new node equal to any
/// ancestor as a cyclic revisit.
#[derive(Debug, Clone)]
pub struct ObjectReference {
    instance: usize,
    path: NodePath,
}

impl ObjectReference {
    /// Create a reference for an object reached through `path`
    pub fn new(object: &ObjectHandle, path: NodePath) -> Self {
        Self {
            instance: object.instance_id(),
            path,
        }
    }

    /// The instance identity of the referenced object
    pub fn instance_id(&self) -> usize {
        self.instance
    }

    /// The path the object was reached through
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Whether two paths are compatible for reference equality
    ///
    /// True when either path is empty or one path's segment sequence is a
    /// segment-boundary prefix of the other's. Symmetric for all inputs:
    /// `compatible_paths(a, b) == compatible_paths(b, a)`.
    pub fn compatible_paths(a: &NodePath, b: &NodePath) -> bool {
        a.is_root() || b.is_root() || a.starts_with(b) || b.starts_with(a)
    }
}

impl PartialEq for ObjectReference {
    fn eq(&self, other: &Self) -> bool {
        self.instance == other.instance && Self::compatible_paths(&self.path, &other.path)
    }
}

impl Eq for ObjectReference {}
