//! The immutable per-call options snapshot

use std::sync::Arc;

use crate::path::NodePath;
use crate::report::ConfigurationSummary;
use crate::rules::{MatchingRules, MissingMemberPolicy, OrderingRules, SelectionRules};
use crate::steps::EquivalencyStep;
use crate::value::Value;

/// How enum values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumComparisonMode {
    /// Compare underlying discriminants, across distinct enum types
    #[default]
    ByValue,
    /// Compare variant names, case-sensitively
    ByName,
}

/// How records (value objects) are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordComparisonMode {
    /// Recurse into members (default)
    #[default]
    ByMembers,
    /// Use whole-value equality
    ByValue,
}

/// Recursion guard for cyclic and deeply-nested graphs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecursionPolicy {
    /// Maximum node depth before the guard trips
    pub max_depth: usize,
    /// When set, cycles and depth overruns end the branch as equivalent
    /// instead of raising a recursion error
    pub allow_infinite: bool,
}

impl Default for RecursionPolicy {
    fn default() -> Self {
        Self {
            max_depth: 10,
            allow_infinite: false,
        }
    }
}

/// Auto-conversion policy: global toggle plus per-path opt-ins
#[derive(Clone, Default)]
pub struct ConversionRules {
    pub(crate) global: bool,
    pub(crate) paths: Vec<String>,
    pub(crate) predicates: Vec<Arc<dyn Fn(&NodePath) -> bool + Send + Sync>>,
}

impl ConversionRules {
    pub fn enabled_at(&self, path: &NodePath) -> bool {
        if self.global {
            return true;
        }
        let member_path = path.member_path();
        self.paths.iter().any(|p| *p == member_path)
            || self.predicates.iter().any(|predicate| predicate(path))
    }
}

/// Declared-vs-runtime typing policy
#[derive(Debug, Clone, Default)]
pub struct TypingRules {
    pub(crate) respect_runtime: bool,
    pub(crate) runtime_paths: Vec<String>,
}

impl TypingRules {
    pub fn respects_runtime_at(&self, path: &NodePath) -> bool {
        if self.respect_runtime {
            return true;
        }
        let member_path = path.member_path();
        self.runtime_paths.iter().any(|p| *p == member_path)
    }
}

/// A user-registered equality comparer keyed by type name
#[derive(Clone)]
pub struct RegisteredComparer {
    pub(crate) type_name: String,
    pub(crate) comparer: Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>,
}

impl RegisteredComparer {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn compare(&self, subject: &Value, expectation: &Value) -> bool {
        (self.comparer)(subject, expectation)
    }
}

/// Immutable configuration snapshot for one comparison call
///
/// Logically immutable for the duration of the walk and `Send + Sync`,
/// so concurrent top-level comparisons can share one snapshot freely.
#[derive(Clone)]
pub struct EquivalencyOptions {
    pub(crate) selection: SelectionRules,
    pub(crate) matching: MatchingRules,
    pub(crate) ordering: OrderingRules,
    pub(crate) comparers: Vec<RegisteredComparer>,
    pub(crate) user_steps_front: Vec<Arc<dyn EquivalencyStep>>,
    pub(crate) user_steps_back: Vec<Arc<dyn EquivalencyStep>>,
    pub(crate) builtin_steps: bool,
    pub(crate) enum_mode: EnumComparisonMode,
    pub(crate) record_mode: RecordComparisonMode,
    pub(crate) type_overrides: Vec<(String, RecordComparisonMode)>,
    pub(crate) conversion: ConversionRules,
    pub(crate) typing: TypingRules,
    pub(crate) recursion: RecursionPolicy,
    pub(crate) tracing: bool,
    pub(crate) report_configuration: bool,
}

impl std::fmt::Debug for EquivalencyOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EquivalencyOptions")
            .field("comparers", &self.comparers.len())
            .field("user_steps_front", &self.user_steps_front.len())
            .field("user_steps_back", &self.user_steps_back.len())
            .field("builtin_steps", &self.builtin_steps)
            .field("enum_mode", &self.enum_mode)
            .field("record_mode", &self.record_mode)
            .field("tracing", &self.tracing)
            .field("report_configuration", &self.report_configuration)
            .finish_non_exhaustive()
    }
}

impl Default for EquivalencyOptions {
    fn default() -> Self {
        Self {
            selection: SelectionRules::default(),
            matching: MatchingRules::default(),
            ordering: OrderingRules::default(),
            comparers: Vec::new(),
            user_steps_front: Vec::new(),
            user_steps_back: Vec::new(),
            builtin_steps: true,
            enum_mode: EnumComparisonMode::default(),
            record_mode: RecordComparisonMode::default(),
            type_overrides: Vec::new(),
            conversion: ConversionRules::default(),
            typing: TypingRules::default(),
            recursion: RecursionPolicy::default(),
            tracing: false,
            report_configuration: false,
        }
    }
}

impl EquivalencyOptions {
    /// Start a fluent builder seeded with the built-in defaults
    pub fn builder() -> crate::config::OptionsBuilder {
        crate::config::OptionsBuilder::new()
    }

    pub fn selection(&self) -> &SelectionRules {
        &self.selection
    }

    pub fn matching(&self) -> &MatchingRules {
        &self.matching
    }

    pub fn ordering(&self) -> &OrderingRules {
        &self.ordering
    }

    pub fn comparers(&self) -> &[RegisteredComparer] {
        &self.comparers
    }

    pub fn enum_mode(&self) -> EnumComparisonMode {
        self.enum_mode
    }

    pub fn record_mode(&self) -> RecordComparisonMode {
        self.record_mode
    }

    pub fn recursion(&self) -> RecursionPolicy {
        self.recursion
    }

    pub fn tracing(&self) -> bool {
        self.tracing
    }

    pub fn reports_configuration(&self) -> bool {
        self.report_configuration
    }

    /// Whether the node at `path` resolves members against runtime types
    pub fn respects_runtime_at(&self, path: &NodePath) -> bool {
        self.typing.respects_runtime_at(path)
    }

    /// Whether auto-conversion applies to the node at `path`
    pub fn conversion_enabled_at(&self, path: &NodePath) -> bool {
        self.conversion.enabled_at(path)
    }

    /// Whether `type_name` compares by whole-value equality
    ///
    /// Per-type overrides win over the global record mode; among multiple
    /// overrides for one type the last writer wins.
    pub fn compares_by_value(&self, type_name: &str, is_record: bool) -> bool {
        for (name, mode) in self.type_overrides.iter().rev() {
            if name == type_name {
                return *mode == RecordComparisonMode::ByValue;
            }
        }
        is_record && self.record_mode == RecordComparisonMode::ByValue
    }

    /// Assemble the step pipeline: user steps first, then built-ins, then
    /// late user steps, with the default-equality fallback always last
    pub(crate) fn assemble_pipeline(&self) -> Vec<Arc<dyn EquivalencyStep>> {
        let mut steps = self.user_steps_front.clone();
        if self.builtin_steps {
            steps.extend(crate::steps::builtin_steps());
        }
        steps.extend(self.user_steps_back.clone());
        if self.builtin_steps {
            steps.push(crate::steps::fallback_step());
        }
        steps
    }

    /// The configuration summary appended to reports on request
    pub fn summary(&self) -> ConfigurationSummary {
        let mut selection = if self.selection.includes.is_empty() {
            "all public members".to_string()
        } else {
            format!("restricted to {} include rule(s)", self.selection.includes.len())
        };
        if !self.selection.excludes.is_empty() {
            selection.push_str(&format!(", {} exclude rule(s)", self.selection.excludes.len()));
        }
        if self.selection.include_internal {
            selection.push_str(", internal members included");
        }
        if !self.selection.compare_fields {
            selection.push_str(", fields excluded");
        }
        if !self.selection.compare_properties {
            selection.push_str(", properties excluded");
        }
        if !self.selection.nested_objects {
            selection.push_str(", nested objects compared by value");
        }

        let mut matching = if self.matching.custom.is_empty() {
            "case-sensitive name match".to_string()
        } else {
            format!(
                "{} custom matcher(s), then case-sensitive name match",
                self.matching.custom.len()
            )
        };
        matching.push_str(match self.matching.missing_members {
            MissingMemberPolicy::Fail => ", missing members fail",
            MissingMemberPolicy::Ignore => ", missing members ignored",
        });

        let mut ordering = if self.ordering.strict_by_default() {
            "strict by default".to_string()
        } else {
            "unordered by default, bytes strict".to_string()
        };
        if !self.ordering.path_rules.is_empty() {
            ordering.push_str(&format!(", {} path override(s)", self.ordering.path_rules.len()));
        }

        let enums = match self.enum_mode {
            EnumComparisonMode::ByValue => "by value".to_string(),
            EnumComparisonMode::ByName => "by name".to_string(),
        };

        let mut records = match self.record_mode {
            RecordComparisonMode::ByMembers => "by members".to_string(),
            RecordComparisonMode::ByValue => "by value".to_string(),
        };
        if !self.type_overrides.is_empty() {
            records.push_str(&format!(", {} type override(s)", self.type_overrides.len()));
        }

        let mut typing = if self.typing.respect_runtime {
            "runtime types".to_string()
        } else {
            "declared types".to_string()
        };
        if !self.typing.runtime_paths.is_empty() {
            typing.push_str(&format!(
                ", runtime types for {} path(s)",
                self.typing.runtime_paths.len()
            ));
        }

        let conversion = if self.conversion.global {
            "enabled".to_string()
        } else if self.conversion.paths.is_empty() && self.conversion.predicates.is_empty() {
            "disabled".to_string()
        } else {
            format!(
                "enabled for {} path rule(s)",
                self.conversion.paths.len() + self.conversion.predicates.len()
            )
        };

        ConfigurationSummary {
            selection,
            matching,
            ordering,
            enums,
            records,
            typing,
            conversion,
        }
    }
}
