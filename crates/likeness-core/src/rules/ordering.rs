//! Sequence ordering rules

use crate::path::NodePath;

/// Decides whether a sequence is compared position-by-position or as an
/// unordered multiset
///
/// Byte sequences are intrinsically order-significant and are always
/// strict. Everything else defaults to unordered unless strict ordering
/// is configured globally or for a matching member path; among per-path
/// rules, the last writer wins.
#[derive(Debug, Clone, Default)]
pub struct OrderingRules {
    pub(crate) strict_by_default: bool,
    pub(crate) path_rules: Vec<(String, bool)>,
}

impl OrderingRules {
    /// Whether the sequence at `path` must preserve element order
    pub fn is_strict(&self, path: &NodePath, is_bytes: bool) -> bool {
        if is_bytes {
            return true;
        }
        let member_path = path.member_path();
        for (rule_path, strict) in self.path_rules.iter().rev() {
            if *rule_path == member_path {
                return *strict;
            }
        }
        self.strict_by_default
    }

    pub fn strict_by_default(&self) -> bool {
        self.strict_by_default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathSegment;

    fn path(name: &str) -> NodePath {
        NodePath::root().child(PathSegment::member(name))
    }

    #[test]
    fn sequences_default_to_unordered() {
        let rules = OrderingRules::default();
        assert!(!rules.is_strict(&path("Scores"), false));
    }

    #[test]
    fn bytes_are_always_strict() {
        let rules = OrderingRules::default();
        assert!(rules.is_strict(&path("Payload"), true));
    }

    #[test]
    fn per_path_rules_override_the_default_last_writer_wins() {
        let rules = OrderingRules {
            strict_by_default: false,
            path_rules: vec![
                ("Scores".to_string(), true),
                ("Scores".to_string(), false),
            ],
        };
        assert!(!rules.is_strict(&path("Scores"), false));

        let rules = OrderingRules {
            strict_by_default: true,
            path_rules: vec![("Scores".to_string(), false)],
        };
        assert!(!rules.is_strict(&path("Scores"), false));
        assert!(rules.is_strict(&path("Other"), false));
    }

    #[test]
    fn path_rules_address_members_through_collections() {
        let rules = OrderingRules {
            strict_by_default: false,
            path_rules: vec![("Friends.Nicknames".to_string(), true)],
        };
        let mut nested = NodePath::root();
        nested.push(PathSegment::member("Friends"));
        nested.push(PathSegment::Index(2));
        nested.push(PathSegment::member("Nicknames"));
        assert!(rules.is_strict(&nested, false));
    }
}
