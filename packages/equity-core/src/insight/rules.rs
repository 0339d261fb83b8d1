//! Ordered rule tables.
//!
//! A table is a list of threshold rules evaluated top to bottom; the first
//! match wins and a default covers everything else.

use serde::{Deserialize, Serialize};

/// Threshold test applied to a single value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Condition {
    /// `value <= threshold`
    AtMost(f64),
    /// `value >= threshold`
    AtLeast(f64),
    /// `value > threshold`
    Above(f64),
}

impl Condition {
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Condition::AtMost(t) => value <= t,
            Condition::AtLeast(t) => value >= t,
            Condition::Above(t) => value > t,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rule<T> {
    pub condition: Condition,
    pub outcome: T,
}

impl<T> Rule<T> {
    pub fn new(condition: Condition, outcome: T) -> Self {
        Self { condition, outcome }
    }
}

/// First-match-wins rule table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleTable<T> {
    rules: Vec<Rule<T>>,
    default: T,
}

impl<T: Copy> RuleTable<T> {
    pub fn new(rules: Vec<Rule<T>>, default: T) -> Self {
        Self { rules, default }
    }

    /// Outcome of the first matching rule, or the default.
    ///
    /// NaN matches no rule.
    pub fn evaluate(&self, value: f64) -> T {
        self.rules
            .iter()
            .find(|rule| rule.condition.matches(value))
            .map(|rule| rule.outcome)
            .unwrap_or(self.default)
    }

    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    pub fn default_outcome(&self) -> T {
        self.default
    }
}
