//! Member model and declared-vs-runtime member resolution
//!
//! The engine never reflects over host-language types directly. Adapters
//! present every object as a uniform set of [`Member`]s: name, declared
//! type, declaring type, accessibility, field/property kind, and a
//! pre-materialized value standing in for the getter. [`MemberResolver`]
//! turns that raw set into the effective member view for a comparison
//! node, applying the declared-type visibility, explicit-interface, and
//! member-hiding policies, and caches the outcome per type pair.

use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;

use crate::value::{ObjectHandle, Value};

/// Accessibility of a member, as reported by the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Internal,
    Protected,
    Private,
}

/// Whether a member is a field or a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Property,
}

/// A single comparable member of an object
///
/// `declaration_depth` is the distance from the object's runtime type to
/// the type that declared this member (0 = declared on the runtime type
/// itself). Member hiding resolves to the smallest depth.
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub declared_type: String,
    pub declaring_type: String,
    pub declaration_depth: u32,
    pub visibility: Visibility,
    pub kind: MemberKind,
    pub write_only: bool,
    pub explicit_interface: Option<String>,
    pub value: Value,
}

impl Member {
    /// A public property with the declared type inferred from the value
    pub fn property(name: impl Into<String>, value: Value) -> Self {
        Self::new(name, MemberKind::Property, value)
    }

    /// A public field with the declared type inferred from the value
    pub fn field(name: impl Into<String>, value: Value) -> Self {
        Self::new(name, MemberKind::Field, value)
    }

    fn new(name: impl Into<String>, kind: MemberKind, value: Value) -> Self {
        Self {
            name: name.into(),
            declared_type: value.type_name(),
            declaring_type: String::new(),
            declaration_depth: 0,
            visibility: Visibility::Public,
            kind,
            write_only: false,
            explicit_interface: None,
            value,
        }
    }

    /// Override the declared type of the member slot
    pub fn with_declared_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = declared_type.into();
        self
    }

    /// Record the declaring type and its distance from the runtime type
    pub fn declared_by(mut self, declaring_type: impl Into<String>, depth: u32) -> Self {
        self.declaring_type = declaring_type.into();
        self.declaration_depth = depth;
        self
    }

    /// Set the member accessibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark the member as write-only (never compared)
    pub fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    /// Mark the member as an explicit implementation of `interface`
    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.explicit_interface = Some(interface.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResolutionKey {
    runtime_type: String,
    lookup_type: String,
}

/// Resolves the effective member view of an object for a comparison node
///
/// Resolution picks, per member name, the declaration that the policies
/// make visible:
///
/// - when runtime types are not respected, only names declared on the
///   effective lookup type (the declared type, when the object's lineage
///   knows it) or one of its ancestors are enumerated;
/// - explicitly-implemented interface members are visible only when the
///   lookup type is that interface, and then win over a concrete member
///   of the same name;
/// - among concrete declarations of one name, the most-derived relative
///   to the runtime type wins (smallest declaration depth), even when the
///   lookup type is a base; hidden base declarations never resurface.
///
/// Outcomes are cached per `(runtime type, lookup type)`, relying on the
/// adapter contract that objects reporting the same type expose the same
/// member shape.
pub struct MemberResolver {
    cache: DashMap<ResolutionKey, Arc<Vec<(String, String)>>>,
}

impl MemberResolver {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Resolve the member view of `object` seen through `declared_type`
    ///
    /// `respect_runtime` switches the lookup type to the object's runtime
    /// type regardless of the declared reference.
    pub fn resolve(
        &self,
        object: &ObjectHandle,
        declared_type: Option<&str>,
        respect_runtime: bool,
    ) -> Vec<Member> {
        let members = object.members();
        let runtime = object.type_name().to_string();
        let lookup = self.effective_lookup(object, declared_type, respect_runtime);

        let key = ResolutionKey {
            runtime_type: runtime,
            lookup_type: lookup.clone(),
        };

        let picks = if let Some(cached) = self.cache.get(&key) {
            Arc::clone(&cached)
        } else {
            let picks = Arc::new(Self::pick_declarations(object, &members, &lookup));
            self.cache.insert(key, Arc::clone(&picks));
            picks
        };

        picks
            .iter()
            .filter_map(|(name, declaring)| {
                members
                    .iter()
                    .find(|m| m.name == *name && m.declaring_type == *declaring)
                    .cloned()
            })
            .collect()
    }

    fn effective_lookup(
        &self,
        object: &ObjectHandle,
        declared_type: Option<&str>,
        respect_runtime: bool,
    ) -> String {
        if respect_runtime {
            return object.type_name().to_string();
        }
        match declared_type {
            Some(declared) if !declared.is_empty() && object.knows_type(declared) => {
                declared.to_string()
            }
            // Unknown or unspecified declared references fall back to the
            // runtime type; primitives and adapter omissions land here.
            _ => object.type_name().to_string(),
        }
    }

    fn pick_declarations(
        object: &ObjectHandle,
        members: &[Member],
        lookup: &str,
    ) -> Vec<(String, String)> {
        let mut by_name: IndexMap<String, Vec<&Member>> = IndexMap::new();
        for member in members {
            by_name.entry(member.name.clone()).or_default().push(member);
        }

        let mut picks = Vec::new();
        for (name, declarations) in by_name {
            // An explicit interface implementation is only visible through
            // its own interface, and then wins over concrete declarations.
            if let Some(explicit) = declarations
                .iter()
                .find(|m| m.explicit_interface.as_deref() == Some(lookup))
            {
                picks.push((name, explicit.declaring_type.clone()));
                continue;
            }

            let concrete: Vec<&&Member> = declarations
                .iter()
                .filter(|m| m.explicit_interface.is_none())
                .collect();
            if concrete.is_empty() {
                continue;
            }

            let visible = concrete
                .iter()
                .any(|m| Self::declaring_visible_from(object, &m.declaring_type, lookup));
            if !visible {
                continue;
            }

            // Member hiding: the most-derived declaration relative to the
            // runtime type wins, even when the lookup type is a base.
            if let Some(chosen) = concrete.iter().min_by_key(|m| m.declaration_depth) {
                picks.push((name, chosen.declaring_type.clone()));
            }
        }
        picks
    }

    fn declaring_visible_from(object: &ObjectHandle, declaring: &str, lookup: &str) -> bool {
        if declaring.is_empty() || declaring == lookup {
            return true;
        }
        // Looking through an interface exposes the full concrete surface.
        if object.interfaces().iter().any(|i| i == lookup) {
            return true;
        }
        let lineage = object.lineage();
        match (
            lineage.iter().position(|t| t == lookup),
            lineage.iter().position(|t| t == declaring),
        ) {
            // Visible when the declaring type is the lookup type itself or
            // one of its ancestors.
            (Some(lookup_at), Some(declaring_at)) => declaring_at >= lookup_at,
            // Adapter did not place the declaring type in the lineage.
            _ => true,
        }
    }
}

impl Default for MemberResolver {
    fn default() -> Self {
        Self::new()
    }
}
