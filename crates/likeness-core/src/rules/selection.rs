//! Member selection rules

use std::fmt;
use std::sync::Arc;

use crate::path::NodePath;
use crate::reflect::{Member, MemberKind, Visibility};

/// Context handed to selection predicates
pub struct MemberInfo<'a> {
    pub name: &'a str,
    /// Dotted member path from the comparison root, indexes elided
    pub path: &'a str,
    pub declared_type: &'a str,
    pub declaring_type: &'a str,
    pub visibility: Visibility,
    pub kind: MemberKind,
}

/// A single include or exclude rule
#[derive(Clone)]
pub enum MemberSelector {
    /// Any member with this name, at any depth
    Name(String),
    /// A dotted member path from the root; as an include it also selects
    /// the members leading to and beneath it
    Path(String),
    /// Any member whose declared type has this name
    DeclaredType(String),
    /// Arbitrary predicate over the member context
    Predicate(Arc<dyn Fn(&MemberInfo<'_>) -> bool + Send + Sync>),
}

impl fmt::Debug for MemberSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "Name({name})"),
            Self::Path(path) => write!(f, "Path({path})"),
            Self::DeclaredType(ty) => write!(f, "DeclaredType({ty})"),
            Self::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

/// The selection policy for one comparison call
///
/// Precedence while selecting the members of a node:
///
/// 1. strictly-private and write-only members are always out;
/// 2. member-kind toggles (fields/properties) filter by kind;
/// 3. when any include rule exists, only members on an included branch
///    survive and the all-members default is suppressed;
/// 4. otherwise accessibility filtering applies (non-public members are
///    out unless internal inclusion is enabled);
/// 5. exclude rules remove members last.
#[derive(Clone, Debug)]
pub struct SelectionRules {
    pub(crate) includes: Vec<MemberSelector>,
    pub(crate) excludes: Vec<MemberSelector>,
    pub(crate) include_internal: bool,
    pub(crate) compare_fields: bool,
    pub(crate) compare_properties: bool,
    pub(crate) nested_objects: bool,
}

impl Default for SelectionRules {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            excludes: Vec::new(),
            include_internal: false,
            compare_fields: true,
            compare_properties: true,
            nested_objects: true,
        }
    }
}

impl SelectionRules {
    /// Whether nested objects are recursed into (default) or compared by
    /// whole-value equality
    pub fn recurses_nested_objects(&self) -> bool {
        self.nested_objects
    }

    /// Apply the selection policy to a node's resolved members
    pub fn select(&self, members: Vec<Member>, node_path: &NodePath) -> Vec<Member> {
        let base = node_path.member_path();
        members
            .into_iter()
            .filter(|member| self.selects(member, &base))
            .collect()
    }

    fn selects(&self, member: &Member, base_path: &str) -> bool {
        if member.write_only || member.visibility == Visibility::Private {
            return false;
        }
        match member.kind {
            MemberKind::Field if !self.compare_fields => return false,
            MemberKind::Property if !self.compare_properties => return false,
            _ => {}
        }

        let path = member_path(base_path, &member.name);
        let info = MemberInfo {
            name: &member.name,
            path: &path,
            declared_type: &member.declared_type,
            declaring_type: &member.declaring_type,
            visibility: member.visibility,
            kind: member.kind,
        };

        if !self.includes.is_empty() {
            if !self.includes.iter().any(|rule| include_matches(rule, &info)) {
                return false;
            }
        } else if member.visibility != Visibility::Public && !self.include_internal {
            return false;
        }

        !self.excludes.iter().any(|rule| exclude_matches(rule, &info))
    }
}

fn member_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}.{name}")
    }
}

fn include_matches(rule: &MemberSelector, info: &MemberInfo<'_>) -> bool {
    match rule {
        MemberSelector::Name(name) => name == info.name,
        // A member is on an included branch when its path leads to, hits,
        // or sits beneath the included path.
        MemberSelector::Path(path) => {
            info.path == path
                || path.starts_with(&format!("{}.", info.path))
                || info.path.starts_with(&format!("{path}."))
        }
        MemberSelector::DeclaredType(ty) => ty == info.declared_type,
        MemberSelector::Predicate(predicate) => predicate(info),
    }
}

fn exclude_matches(rule: &MemberSelector, info: &MemberInfo<'_>) -> bool {
    match rule {
        MemberSelector::Name(name) => name == info.name,
        // Excluding a path removes that member and everything beneath it,
        // but not the members leading to it.
        MemberSelector::Path(path) => {
            info.path == path || info.path.starts_with(&format!("{path}."))
        }
        MemberSelector::DeclaredType(ty) => ty == info.declared_type,
        MemberSelector::Predicate(predicate) => predicate(info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathSegment;
    use crate::value::Value;

    fn members() -> Vec<Member> {
        vec![
            Member::property("Age", Value::Int(36)),
            Member::property("Name", Value::Str("Ada".into())),
            Member::property("Secret", Value::Int(1)).with_visibility(Visibility::Internal),
            Member::property("Hidden", Value::Int(2)).with_visibility(Visibility::Private),
            Member::property("Sink", Value::Null).write_only(),
            Member::field("Tag", Value::Str("x".into())),
        ]
    }

    fn names(selected: &[Member]) -> Vec<&str> {
        selected.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn default_selection_takes_public_readable_members() {
        let rules = SelectionRules::default();
        let selected = rules.select(members(), &NodePath::root());
        assert_eq!(names(&selected), vec!["Age", "Name", "Tag"]);
    }

    #[test]
    fn private_and_write_only_members_never_survive() {
        let rules = SelectionRules {
            include_internal: true,
            includes: vec![
                MemberSelector::Name("Hidden".into()),
                MemberSelector::Name("Sink".into()),
            ],
            ..SelectionRules::default()
        };
        let selected = rules.select(members(), &NodePath::root());
        assert!(selected.is_empty());
    }

    #[test]
    fn include_rules_suppress_the_all_members_default() {
        let rules = SelectionRules {
            includes: vec![MemberSelector::Name("Age".into())],
            ..SelectionRules::default()
        };
        let selected = rules.select(members(), &NodePath::root());
        assert_eq!(names(&selected), vec!["Age"]);
    }

    #[test]
    fn include_path_selects_the_branch_leading_to_it() {
        let rules = SelectionRules {
            includes: vec![MemberSelector::Path("Address.City".into())],
            ..SelectionRules::default()
        };

        let root = rules.select(
            vec![
                Member::property("Address", Value::Null),
                Member::property("Age", Value::Int(1)),
            ],
            &NodePath::root(),
        );
        assert_eq!(names(&root), vec!["Address"]);

        let nested_path = NodePath::root().child(PathSegment::member("Address"));
        let nested = rules.select(
            vec![
                Member::property("City", Value::Str("Berlin".into())),
                Member::property("Street", Value::Str("A".into())),
            ],
            &nested_path,
        );
        assert_eq!(names(&nested), vec!["City"]);
    }

    #[test]
    fn excludes_apply_after_includes() {
        let rules = SelectionRules {
            includes: vec![MemberSelector::Path("Address".into())],
            excludes: vec![MemberSelector::Path("Address.Street".into())],
            ..SelectionRules::default()
        };

        let nested_path = NodePath::root().child(PathSegment::member("Address"));
        let nested = rules.select(
            vec![
                Member::property("City", Value::Str("Berlin".into())),
                Member::property("Street", Value::Str("A".into())),
            ],
            &nested_path,
        );
        assert_eq!(names(&nested), vec!["City"]);
    }

    #[test]
    fn internal_members_opt_in() {
        let rules = SelectionRules {
            include_internal: true,
            ..SelectionRules::default()
        };
        let selected = rules.select(members(), &NodePath::root());
        assert!(names(&selected).contains(&"Secret"));
    }

    #[test]
    fn field_toggle_filters_by_kind() {
        let rules = SelectionRules {
            compare_fields: false,
            ..SelectionRules::default()
        };
        let selected = rules.select(members(), &NodePath::root());
        assert_eq!(names(&selected), vec!["Age", "Name"]);
    }

    #[test]
    fn predicate_selectors_see_the_member_context() {
        let rules = SelectionRules {
            excludes: vec![MemberSelector::Predicate(Arc::new(|info| {
                info.declared_type == "string"
            }))],
            ..SelectionRules::default()
        };
        let selected = rules.select(members(), &NodePath::root());
        assert_eq!(names(&selected), vec!["Age"]);
    }
}
