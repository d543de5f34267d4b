//! Fluent builder for comparison options

use std::sync::Arc;

use crate::config::options::{
    EnumComparisonMode, EquivalencyOptions, RecordComparisonMode, RegisteredComparer,
};
use crate::error::LikenessError;
use crate::path::NodePath;
use crate::result::Result;
use crate::rules::{MemberInfo, MemberMatcher, MemberSelector, MissingMemberPolicy};
use crate::steps::EquivalencyStep;
use crate::value::Value;

/// Fluent, additive builder for [`EquivalencyOptions`]
///
/// Every method returns the builder, so calls chain freely. Conflicting
/// global toggles are last-writer-wins. Invalid input is remembered and
/// surfaced by [`OptionsBuilder::build`] as a configuration error naming
/// the offending parameter. The first defect wins, and no walk ever
/// starts from a defective builder.
pub struct OptionsBuilder {
    options: EquivalencyOptions,
    error: Option<String>,
}

impl OptionsBuilder {
    /// Builder seeded with the built-in defaults
    pub fn new() -> Self {
        Self {
            options: EquivalencyOptions::default(),
            error: None,
        }
    }

    /// Builder seeded from an existing snapshot (e.g. the process-wide
    /// defaults)
    pub fn from_options(options: &EquivalencyOptions) -> Self {
        Self {
            options: options.clone(),
            error: None,
        }
    }

    fn fail(&mut self, message: &str) {
        if self.error.is_none() {
            self.error = Some(message.to_string());
        }
    }

    // -- selection ---------------------------------------------------------

    /// Restrict comparison to the member at the dotted `path` (and the
    /// members leading to and beneath it)
    pub fn including_path(mut self, path: &str) -> Self {
        if path.is_empty() {
            self.fail("include path must not be empty (parameter: path)");
        } else {
            self.options
                .selection
                .includes
                .push(MemberSelector::Path(path.to_string()));
        }
        self
    }

    /// Restrict comparison to members with this name, at any depth
    pub fn including_named(mut self, name: &str) -> Self {
        if name.is_empty() {
            self.fail("include name must not be empty (parameter: name)");
        } else {
            self.options
                .selection
                .includes
                .push(MemberSelector::Name(name.to_string()));
        }
        self
    }

    /// Restrict comparison to members satisfying the predicate
    pub fn including_members<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&MemberInfo<'_>) -> bool + Send + Sync + 'static,
    {
        self.options
            .selection
            .includes
            .push(MemberSelector::Predicate(Arc::new(predicate)));
        self
    }

    /// Exclude the member at the dotted `path` and everything beneath it
    pub fn excluding_path(mut self, path: &str) -> Self {
        if path.is_empty() {
            self.fail("exclude path must not be empty (parameter: path)");
        } else {
            self.options
                .selection
                .excludes
                .push(MemberSelector::Path(path.to_string()));
        }
        self
    }

    /// Exclude members with this name, at any depth
    pub fn excluding_named(mut self, name: &str) -> Self {
        if name.is_empty() {
            self.fail("exclude name must not be empty (parameter: name)");
        } else {
            self.options
                .selection
                .excludes
                .push(MemberSelector::Name(name.to_string()));
        }
        self
    }

    /// Exclude members satisfying the predicate
    pub fn excluding_members<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&MemberInfo<'_>) -> bool + Send + Sync + 'static,
    {
        self.options
            .selection
            .excludes
            .push(MemberSelector::Predicate(Arc::new(predicate)));
        self
    }

    /// Exclude members whose declared type has this name
    pub fn excluding_declared_type(mut self, type_name: &str) -> Self {
        if type_name.is_empty() {
            self.fail("exclude type name must not be empty (parameter: type_name)");
        } else {
            self.options
                .selection
                .excludes
                .push(MemberSelector::DeclaredType(type_name.to_string()));
        }
        self
    }

    /// Include internal and protected members in the comparison
    pub fn including_internal_members(mut self) -> Self {
        self.options.selection.include_internal = true;
        self
    }

    pub fn including_fields(mut self) -> Self {
        self.options.selection.compare_fields = true;
        self
    }

    pub fn excluding_fields(mut self) -> Self {
        self.options.selection.compare_fields = false;
        self
    }

    pub fn including_properties(mut self) -> Self {
        self.options.selection.compare_properties = true;
        self
    }

    pub fn excluding_properties(mut self) -> Self {
        self.options.selection.compare_properties = false;
        self
    }

    /// Compare nested objects by whole-value equality instead of
    /// recursing into their members
    pub fn excluding_nested_objects(mut self) -> Self {
        self.options.selection.nested_objects = false;
        self
    }

    // -- matching ----------------------------------------------------------

    /// Register a custom member matcher; matchers run before the default
    /// name match, in registration order
    pub fn using_matcher(mut self, matcher: Arc<dyn MemberMatcher>) -> Self {
        self.options.matching.custom.push(matcher);
        self
    }

    /// Skip subject members with no expectation counterpart
    pub fn ignoring_missing_members(mut self) -> Self {
        self.options.matching.missing_members = MissingMemberPolicy::Ignore;
        self
    }

    /// Report subject members with no expectation counterpart (default)
    pub fn failing_on_missing_members(mut self) -> Self {
        self.options.matching.missing_members = MissingMemberPolicy::Fail;
        self
    }

    // -- ordering ----------------------------------------------------------

    /// Require strict element order for all sequences
    pub fn with_strict_ordering(mut self) -> Self {
        self.options.ordering.strict_by_default = true;
        self
    }

    /// Require strict element order for the sequence at the dotted `path`
    pub fn with_strict_ordering_for(mut self, path: &str) -> Self {
        if path.is_empty() {
            self.fail("ordering path must not be empty (parameter: path)");
        } else {
            self.options
                .ordering
                .path_rules
                .push((path.to_string(), true));
        }
        self
    }

    /// Allow unordered comparison for the sequence at the dotted `path`
    pub fn without_strict_ordering_for(mut self, path: &str) -> Self {
        if path.is_empty() {
            self.fail("ordering path must not be empty (parameter: path)");
        } else {
            self.options
                .ordering
                .path_rules
                .push((path.to_string(), false));
        }
        self
    }

    // -- enums and records -------------------------------------------------

    pub fn comparing_enums_by_value(mut self) -> Self {
        self.options.enum_mode = EnumComparisonMode::ByValue;
        self
    }

    pub fn comparing_enums_by_name(mut self) -> Self {
        self.options.enum_mode = EnumComparisonMode::ByName;
        self
    }

    pub fn comparing_records_by_value(mut self) -> Self {
        self.options.record_mode = RecordComparisonMode::ByValue;
        self
    }

    pub fn comparing_records_by_members(mut self) -> Self {
        self.options.record_mode = RecordComparisonMode::ByMembers;
        self
    }

    /// Compare the named type by whole-value equality
    pub fn comparing_by_value_for(mut self, type_name: &str) -> Self {
        if type_name.is_empty() {
            self.fail("by-value type name must not be empty (parameter: type_name)");
        } else {
            self.options
                .type_overrides
                .push((type_name.to_string(), RecordComparisonMode::ByValue));
        }
        self
    }

    /// Compare the named type member-wise, overriding the record mode
    pub fn comparing_by_members_for(mut self, type_name: &str) -> Self {
        if type_name.is_empty() {
            self.fail("by-members type name must not be empty (parameter: type_name)");
        } else {
            self.options
                .type_overrides
                .push((type_name.to_string(), RecordComparisonMode::ByMembers));
        }
        self
    }

    // -- conversion --------------------------------------------------------

    /// Attempt type coercion before default equality, everywhere
    pub fn with_auto_conversion(mut self) -> Self {
        self.options.conversion.global = true;
        self
    }

    /// Attempt type coercion for the member at the dotted `path`
    pub fn with_auto_conversion_for(mut self, path: &str) -> Self {
        if path.is_empty() {
            self.fail("conversion path must not be empty (parameter: path)");
        } else {
            self.options.conversion.paths.push(path.to_string());
        }
        self
    }

    /// Attempt type coercion for nodes whose path satisfies the predicate
    pub fn with_auto_conversion_matching<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&NodePath) -> bool + Send + Sync + 'static,
    {
        self.options.conversion.predicates.push(Arc::new(predicate));
        self
    }

    // -- comparers and steps -----------------------------------------------

    /// Register an equality comparer for the named declared type; among
    /// multiple comparers for one type the last registered wins
    pub fn using_comparer<F>(mut self, type_name: &str, comparer: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        if type_name.is_empty() {
            self.fail("comparer type name must not be empty (parameter: type_name)");
        } else {
            self.options.comparers.push(RegisteredComparer {
                type_name: type_name.to_string(),
                comparer: Arc::new(comparer),
            });
        }
        self
    }

    /// Inject a custom step ahead of the built-in pipeline
    pub fn with_step(mut self, step: impl EquivalencyStep + 'static) -> Self {
        self.options.user_steps_front.push(Arc::new(step));
        self
    }

    /// Inject a custom step after the built-in pipeline (but before the
    /// default-equality fallback)
    pub fn with_step_after_builtins(mut self, step: impl EquivalencyStep + 'static) -> Self {
        self.options.user_steps_back.push(Arc::new(step));
        self
    }

    /// Drop the built-in pipeline entirely; only user steps remain, and a
    /// node no step can handle becomes a structural error
    pub fn without_builtin_steps(mut self) -> Self {
        self.options.builtin_steps = false;
        self
    }

    // -- typing ------------------------------------------------------------

    /// Resolve members against runtime types everywhere
    pub fn respecting_runtime_types(mut self) -> Self {
        self.options.typing.respect_runtime = true;
        self
    }

    /// Resolve members against declared types (default)
    pub fn respecting_declared_types(mut self) -> Self {
        self.options.typing.respect_runtime = false;
        self
    }

    /// Resolve members against runtime types for the node at `path`
    pub fn respecting_runtime_types_for(mut self, path: &str) -> Self {
        if path.is_empty() {
            self.fail("typing path must not be empty (parameter: path)");
        } else {
            self.options.typing.runtime_paths.push(path.to_string());
        }
        self
    }

    // -- recursion, tracing, reporting -------------------------------------

    /// Treat cycles and depth overruns as equivalent instead of errors
    pub fn allowing_infinite_recursion(mut self) -> Self {
        self.options.recursion.allow_infinite = true;
        self
    }

    /// Cap the recursion depth; zero is rejected at build time
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        if depth == 0 {
            self.fail("recursion depth must be at least 1 (parameter: depth)");
        } else {
            self.options.recursion.max_depth = depth;
        }
        self
    }

    /// Emit per-node trace events during the walk
    pub fn with_tracing(mut self) -> Self {
        self.options.tracing = true;
        self
    }

    /// Append the configuration summary to failure reports
    pub fn with_reported_configuration(mut self) -> Self {
        self.options.report_configuration = true;
        self
    }

    /// Finalize the snapshot, surfacing the first configuration defect
    pub fn build(self) -> Result<EquivalencyOptions> {
        match self.error {
            Some(message) => Err(LikenessError::configuration_error(message)),
            None => Ok(self.options),
        }
    }
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
