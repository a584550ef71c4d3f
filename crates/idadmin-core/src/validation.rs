//! Declarative command validation.
//!
//! Each command kind owns an explicit table of rules. A rule pairs the field
//! it reports against, a message, and a predicate that must hold. Evaluation
//! is pure and always yields a [`ValidationResult`]; the pipeline decides what
//! an invalid result means.

use std::collections::HashSet;

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field (or concept) the error concerns.
    pub field: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// Outcome of validating a command, errors in rule declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// `true` when no rule failed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failed rules in declaration order.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Records a failure.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field,
            message: message.into(),
        });
    }

    /// Appends the errors of `other` after this result's own.
    #[must_use]
    pub fn and(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self
    }
}

/// A predicate over a command plus what to report when it does not hold.
pub struct Rule<C> {
    field: &'static str,
    message: &'static str,
    check: fn(&C) -> bool,
}

impl<C> Rule<C> {
    /// The field this rule reports against.
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// The message reported on failure.
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.message
    }
}

impl<C> std::fmt::Debug for Rule<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("field", &self.field)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Ordered rule table for one command kind.
#[derive(Debug)]
pub struct Validator<C> {
    rules: Vec<Rule<C>>,
}

impl<C> Default for Validator<C> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<C> Validator<C> {
    /// Creates an empty rule table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule: `check` must return `true` for a valid command.
    #[must_use]
    pub fn rule(mut self, field: &'static str, message: &'static str, check: fn(&C) -> bool) -> Self {
        self.rules.push(Rule {
            field,
            message,
            check,
        });
        self
    }

    /// The declared rules, in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule<C>] {
        &self.rules
    }

    /// Evaluates every rule against `command`.
    #[must_use]
    pub fn validate(&self, command: &C) -> ValidationResult {
        let mut result = ValidationResult::default();
        for rule in &self.rules {
            if !(rule.check)(command) {
                result.push(rule.field, rule.message);
            }
        }
        result
    }
}

/// Reusable predicates for rule tables.
pub mod checks {
    use super::HashSet;

    /// Non-empty after trimming whitespace.
    #[must_use]
    pub fn not_blank(value: &str) -> bool {
        !value.trim().is_empty()
    }

    /// At most `max` characters.
    #[must_use]
    pub fn max_len(value: &str, max: usize) -> bool {
        value.chars().count() <= max
    }

    /// Absolute `http`/`https` URI with a non-empty authority.
    #[must_use]
    pub fn is_absolute_uri(value: &str) -> bool {
        let rest = value
            .strip_prefix("https://")
            .or_else(|| value.strip_prefix("http://"));
        match rest {
            Some(rest) => {
                let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
                !authority.is_empty() && !value.chars().any(char::is_whitespace)
            }
            None => false,
        }
    }

    /// Every entry is an absolute URI.
    #[must_use]
    pub fn all_absolute_uris(values: &[String]) -> bool {
        values.iter().all(|v| is_absolute_uri(v))
    }

    /// Every entry is non-blank.
    #[must_use]
    pub fn no_blank_entries(values: &[String]) -> bool {
        values.iter().all(|v| not_blank(v))
    }

    /// No entry appears twice.
    #[must_use]
    pub fn distinct(values: &[String]) -> bool {
        let mut seen = HashSet::with_capacity(values.len());
        values.iter().all(|v| seen.insert(v.as_str()))
    }

    /// A resource or scope name: non-blank, no whitespace.
    #[must_use]
    pub fn is_name(value: &str) -> bool {
        not_blank(value) && !value.chars().any(char::is_whitespace)
    }
}
