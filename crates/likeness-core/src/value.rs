//! The uniform object-graph model the engine compares
//!
//! Adapters materialize any structured external value (typed objects,
//! parsed JSON, tabular rows) into a [`Value`] graph before invoking the
//! engine; the engine itself has no native awareness of those formats.
//! Objects are `Arc`-shared cells with an interior-mutable member list so
//! adapters can wire aliased and cyclic graphs; the `Arc` address is the
//! instance identity used for cycle detection.

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::LikenessError;
use crate::reflect::Member;
use crate::result::Result;

/// A node in a comparison graph
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    /// Widest common integral representation; holds the full `u64` range
    /// and beyond, so enum discriminants above `i64::MAX` survive intact.
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Enum(EnumValue),
    Seq(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Tuple(Vec<Value>),
    Object(ObjectHandle),
    /// Caller-wrapped predicate or assertion placeholder; expectation side
    /// only, never produced by adapters for subjects.
    Expect(Expectation),
}

/// An enum value: symbolic name plus underlying discriminant
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub enum_type: String,
    pub variant: String,
    pub discriminant: i128,
}

impl EnumValue {
    pub fn new(
        enum_type: impl Into<String>,
        variant: impl Into<String>,
        discriminant: i128,
    ) -> Self {
        Self {
            enum_type: enum_type.into(),
            variant: variant.into(),
            discriminant,
        }
    }
}

/// Whether an object carries record (value-object) semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Ordinary,
    Record,
}

struct ObjectCell {
    type_name: String,
    lineage: Vec<String>,
    interfaces: Vec<String>,
    kind: ObjectKind,
    members: RwLock<Vec<Member>>,
}

/// A shared handle to an object node
///
/// Cloning the handle aliases the same instance; [`ObjectHandle::instance_id`]
/// is stable for the lifetime of the graph and keys cycle detection.
#[derive(Clone)]
pub struct ObjectHandle(Arc<ObjectCell>);

impl ObjectHandle {
    /// An empty ordinary object; members can be pushed afterwards, which
    /// is how adapters wire cyclic graphs.
    pub fn new(type_name: impl Into<String>) -> Self {
        ObjectBuilder::new(type_name).build()
    }

    /// The runtime type name of the instance
    pub fn type_name(&self) -> &str {
        &self.0.type_name
    }

    /// The type lineage: runtime type first, then ancestors
    pub fn lineage(&self) -> &[String] {
        &self.0.lineage
    }

    /// Interfaces the runtime type implements
    pub fn interfaces(&self) -> &[String] {
        &self.0.interfaces
    }

    /// Whether `name` is the runtime type, an ancestor, or an interface
    pub fn knows_type(&self, name: &str) -> bool {
        self.0.lineage.iter().any(|t| t == name) || self.0.interfaces.iter().any(|t| t == name)
    }

    pub fn kind(&self) -> ObjectKind {
        self.0.kind
    }

    pub fn is_record(&self) -> bool {
        self.0.kind == ObjectKind::Record
    }

    /// Snapshot of the member list in declaration order
    pub fn members(&self) -> Vec<Member> {
        self.0
            .members
            .read()
            .map(|members| members.clone())
            .unwrap_or_default()
    }

    /// Append a member; used by adapters after construction, which is what
    /// makes self-referential graphs expressible.
    pub fn push_member(&self, member: Member) {
        if let Ok(mut members) = self.0.members.write() {
            members.push(member);
        }
    }

    /// Replace the value of an existing member, or append a new public
    /// property with that name
    pub fn set_member_value(&self, name: &str, value: Value) {
        if let Ok(mut members) = self.0.members.write() {
            if let Some(member) = members.iter_mut().find(|m| m.name == name) {
                member.value = value;
            } else {
                members.push(Member::property(name, value));
            }
        }
    }

    /// Stable instance identity for cycle detection
    pub fn instance_id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Whether two handles alias the same instance
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Whole-value structural equality: same runtime type and pairwise
    /// equal members. Used by by-value comparison modes; not cycle-safe,
    /// which is acceptable for the value-like types those modes target.
    pub fn structurally_equal(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.type_name() != other.type_name() {
            return false;
        }
        let ours = self.members();
        let theirs = other.members();
        ours.len() == theirs.len()
            && ours
                .iter()
                .zip(theirs.iter())
                .all(|(a, b)| a.name == b.name && a.value == b.value)
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Shallow output: the graph may be cyclic.
        write!(
            f,
            "ObjectHandle({}, {} members)",
            self.0.type_name,
            self.members().len()
        )
    }
}

/// Builder for object nodes with full control over type metadata
pub struct ObjectBuilder {
    type_name: String,
    lineage: Vec<String>,
    interfaces: Vec<String>,
    kind: ObjectKind,
    members: Vec<Member>,
}

impl ObjectBuilder {
    pub fn new(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            lineage: vec![type_name.clone()],
            type_name,
            interfaces: Vec::new(),
            kind: ObjectKind::Ordinary,
            members: Vec::new(),
        }
    }

    /// Mark the object as a record (value-object semantics)
    pub fn record(mut self) -> Self {
        self.kind = ObjectKind::Record;
        self
    }

    /// Append an ancestor type to the lineage (nearest base first)
    pub fn inherits(mut self, base: impl Into<String>) -> Self {
        self.lineage.push(base.into());
        self
    }

    /// Declare an implemented interface
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Append a public property member
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.push(Member::property(name, value.into()));
        self
    }

    /// Append a public field member
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.push(Member::field(name, value.into()));
        self
    }

    /// Append a fully-specified member
    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn build(self) -> ObjectHandle {
        ObjectHandle(Arc::new(ObjectCell {
            type_name: self.type_name,
            lineage: self.lineage,
            interfaces: self.interfaces,
            kind: self.kind,
            members: RwLock::new(self.members),
        }))
    }
}

/// A caller-supplied placeholder on the expectation side
#[derive(Clone)]
pub enum Expectation {
    /// The subject must satisfy a boolean predicate
    Predicate {
        expected_type: String,
        description: String,
        predicate: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
    },
    /// The subject must pass an assertion returning a failure message
    Assertion {
        expected_type: String,
        description: String,
        check: Arc<dyn Fn(&Value) -> std::result::Result<(), String> + Send + Sync>,
    },
}

impl Expectation {
    /// The type name the wrapped delegate applies to; the subject's
    /// runtime type must match it exactly.
    pub fn expected_type(&self) -> &str {
        match self {
            Self::Predicate { expected_type, .. } | Self::Assertion { expected_type, .. } => {
                expected_type
            }
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Predicate { description, .. } | Self::Assertion { description, .. } => {
                description
            }
        }
    }
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate {
                expected_type,
                description,
                ..
            } => write!(f, "Predicate<{expected_type}>({description})"),
            Self::Assertion {
                expected_type,
                description,
                ..
            } => write!(f, "Assertion<{expected_type}>({description})"),
        }
    }
}

impl Value {
    /// A predicate placeholder: the matched subject value must have the
    /// exact runtime type `expected_type` and satisfy `predicate`.
    ///
    /// Fails at construction time when `expected_type` or `description`
    /// is empty; placeholder configuration defects must never reach the
    /// walk.
    pub fn matching<F>(
        expected_type: impl Into<String>,
        description: impl Into<String>,
        predicate: F,
    ) -> Result<Self>
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let expected_type = expected_type.into();
        let description = description.into();
        if expected_type.is_empty() {
            return Err(LikenessError::configuration_error(
                "predicate placeholder requires a type name (parameter: expected_type)",
            ));
        }
        if description.is_empty() {
            return Err(LikenessError::configuration_error(
                "predicate placeholder requires a description (parameter: description)",
            ));
        }
        Ok(Self::Expect(Expectation::Predicate {
            expected_type,
            description,
            predicate: Arc::new(predicate),
        }))
    }

    /// An assertion placeholder: `check` returns a failure message when
    /// the matched subject value is unacceptable.
    pub fn satisfying<F>(
        expected_type: impl Into<String>,
        description: impl Into<String>,
        check: F,
    ) -> Result<Self>
    where
        F: Fn(&Value) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        let expected_type = expected_type.into();
        let description = description.into();
        if expected_type.is_empty() {
            return Err(LikenessError::configuration_error(
                "assertion placeholder requires a type name (parameter: expected_type)",
            ));
        }
        if description.is_empty() {
            return Err(LikenessError::configuration_error(
                "assertion placeholder requires a description (parameter: description)",
            ));
        }
        Ok(Self::Expect(Expectation::Assertion {
            expected_type,
            description,
            check: Arc::new(check),
        }))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The structural kind of the value, used in mismatch descriptions
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Enum(_) => "enum",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "map",
            Self::Tuple(_) => "tuple",
            Self::Object(_) => "object",
            Self::Expect(_) => "expectation",
        }
    }

    /// The runtime type name: the object or enum type where one exists,
    /// the structural kind otherwise
    pub fn type_name(&self) -> String {
        match self {
            Self::Object(object) => object.type_name().to_string(),
            Self::Enum(value) => value.enum_type.clone(),
            other => other.kind_name().to_string(),
        }
    }

    /// Human-readable description used in reports
    pub fn describe(&self) -> String {
        self.describe_at(0)
    }

    fn describe_at(&self, depth: usize) -> String {
        match self {
            Self::Null => "<null>".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Str(s) => format!("{s:?}"),
            Self::Bytes(bytes) => {
                if bytes.len() <= 8 {
                    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
                    format!("0x{hex}")
                } else {
                    format!("<{} bytes>", bytes.len())
                }
            }
            Self::Enum(value) => format!(
                "{}::{} ({})",
                value.enum_type, value.variant, value.discriminant
            ),
            Self::Seq(items) => Self::describe_items(items, depth, "[", "]"),
            Self::Tuple(items) => Self::describe_items(items, depth, "(", ")"),
            Self::Map(entries) => format!("{{{} entries}}", entries.len()),
            Self::Object(object) => {
                if depth >= 1 {
                    return format!("{} {{ … }}", object.type_name());
                }
                let members = object.members();
                let shown: Vec<String> = members
                    .iter()
                    .take(4)
                    .map(|m| format!("{}: {}", m.name, m.value.describe_at(depth + 1)))
                    .collect();
                let ellipsis = if members.len() > 4 { ", …" } else { "" };
                format!(
                    "{} {{ {}{} }}",
                    object.type_name(),
                    shown.join(", "),
                    ellipsis
                )
            }
            Self::Expect(expectation) => match expectation {
                Expectation::Predicate { description, .. } => {
                    format!("<value matching {description}>")
                }
                Expectation::Assertion { description, .. } => {
                    format!("<value satisfying {description}>")
                }
            },
        }
    }

    fn describe_items(items: &[Value], depth: usize, open: &str, close: &str) -> String {
        if items.len() > 4 || depth >= 2 {
            return format!("{open}{} items{close}", items.len());
        }
        let rendered: Vec<String> = items.iter().map(|v| v.describe_at(depth + 1)).collect();
        format!("{open}{}{close}", rendered.join(", "))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Seq(a), Self::Seq(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.structurally_equal(b),
            // Placeholders have no equality of their own; they are
            // evaluated by the pipeline, never compared directly.
            (Self::Expect(_), _) | (_, Self::Expect(_)) => false,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Int(v.into())
    }
}

impl From<i128> for Value {
    fn from(v: i128) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<ObjectHandle> for Value {
    fn from(v: ObjectHandle) -> Self {
        Self::Object(v)
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Self::Enum(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliased_handles_share_identity() {
        let object = ObjectHandle::new("Node");
        let alias = object.clone();
        assert!(object.ptr_eq(&alias));
        assert_eq!(object.instance_id(), alias.instance_id());

        let other = ObjectHandle::new("Node");
        assert!(!object.ptr_eq(&other));
    }

    #[test]
    fn cyclic_graphs_are_constructible() {
        let parent = ObjectHandle::new("Node");
        let child = ObjectHandle::new("Node");
        child.set_member_value("Parent", Value::Object(parent.clone()));
        parent.set_member_value("Child", Value::Object(child.clone()));

        let members = parent.members();
        assert_eq!(members.len(), 1);
        match &members[0].value {
            Value::Object(inner) => assert!(inner.ptr_eq(&child)),
            other => panic!("expected object member, got {other:?}"),
        }
    }

    #[test]
    fn structural_equality_compares_members() {
        let a = ObjectBuilder::new("Point").property("X", 1).property("Y", 2).build();
        let b = ObjectBuilder::new("Point").property("X", 1).property("Y", 2).build();
        let c = ObjectBuilder::new("Point").property("X", 1).property("Y", 3).build();

        assert_eq!(Value::Object(a.clone()), Value::Object(b));
        assert_ne!(Value::Object(a), Value::Object(c));
    }

    #[test]
    fn describe_is_shallow_for_nested_objects() {
        let inner = ObjectBuilder::new("Address").property("City", "Berlin").build();
        let outer = ObjectBuilder::new("Person")
            .property("Name", "Ada")
            .property("Home", Value::Object(inner))
            .build();

        let description = Value::Object(outer).describe();
        assert!(description.contains("Person"));
        assert!(description.contains("\"Ada\""));
        assert!(description.contains("Address { … }"));
    }

    #[test]
    fn placeholder_construction_validates_inputs() {
        let err = Value::matching("", "positive", |_| true).unwrap_err();
        assert!(err.to_string().contains("expected_type"));

        let ok = Value::matching("integer", "positive", |v| matches!(v, Value::Int(i) if *i > 0));
        assert!(ok.is_ok());
    }

    #[test]
    fn int_holds_values_beyond_signed_64_bit() {
        let value = Value::from(u64::MAX);
        match value {
            Value::Int(i) => assert_eq!(i, u64::MAX as i128),
            other => panic!("expected integer, got {other:?}"),
        }
    }
}
