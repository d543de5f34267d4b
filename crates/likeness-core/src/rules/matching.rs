//! Member matching rules

use std::sync::Arc;

use crate::reflect::Member;

/// What to do when a subject member has no expectation counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingMemberPolicy {
    /// Record a missing-member discrepancy (default)
    #[default]
    Fail,
    /// Skip the member silently
    Ignore,
}

/// Pairs a subject member with its counterpart on the expectation
///
/// Custom matchers run before the built-in name match, in registration
/// order; the first matcher returning an index wins.
pub trait MemberMatcher: Send + Sync {
    /// Index of the expectation member matching `subject`, if any
    fn find_match(&self, subject: &Member, expectation: &[Member]) -> Option<usize>;

    /// Short label used in traces and the configuration summary
    fn name(&self) -> &str {
        "custom matcher"
    }
}

/// The matching policy for one comparison call
#[derive(Clone)]
pub struct MatchingRules {
    pub(crate) custom: Vec<Arc<dyn MemberMatcher>>,
    pub(crate) missing_members: MissingMemberPolicy,
}

impl Default for MatchingRules {
    fn default() -> Self {
        Self {
            custom: Vec::new(),
            missing_members: MissingMemberPolicy::Fail,
        }
    }
}

impl MatchingRules {
    pub fn missing_member_policy(&self) -> MissingMemberPolicy {
        self.missing_members
    }

    /// Find the expectation member paired with `subject`
    pub fn find_expectation_member(
        &self,
        subject: &Member,
        expectation: &[Member],
    ) -> Option<usize> {
        for matcher in &self.custom {
            if let Some(index) = matcher.find_match(subject, expectation) {
                return Some(index);
            }
        }
        expectation.iter().position(|m| m.name == subject.name)
    }

    /// A ready-made matcher pairing members by ASCII-case-insensitive name
    pub fn case_insensitive() -> Arc<dyn MemberMatcher> {
        Arc::new(CaseInsensitiveMatcher)
    }
}

struct CaseInsensitiveMatcher;

impl MemberMatcher for CaseInsensitiveMatcher {
    fn find_match(&self, subject: &Member, expectation: &[Member]) -> Option<usize> {
        expectation
            .iter()
            .position(|m| m.name.eq_ignore_ascii_case(&subject.name))
    }

    fn name(&self) -> &str {
        "case-insensitive name"
    }
}
