//! Function and syntax fix chain.
//!
//! Each [`FixRule`] is a stateless text-to-text rewrite of one construct Jet
//! cannot parse. Rules run in the fixed order of [`FixRule::ALL`], skip
//! string literals (they work on tokens) and never produce text that a rule
//! would match again.

mod aggregate;
mod case_when;
mod functions;
mod order_by;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;

/// A single rewrite in the fix chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixRule {
    /// `upper(x)` / `lower(x)` to `ucase(x)` / `lcase(x)`.
    UpperLower,
    /// `CAST(x AS type)` to the matching Jet conversion function.
    Cast,
    /// `EXTRACT(part FROM d)` to `DatePart('<interval>', d)`.
    Extract,
    /// `LOCATE(sub, s[, start])` to `InStr([start, ]s, sub)`.
    Locate,
    /// `AGG(DISTINCT x)` to an aggregate over a `SELECT DISTINCT` derived
    /// table.
    AggregateDistinct,
    /// ORDER BY items naming a select-list alias to the aliased expression.
    OrderByAlias,
    /// `CASE` expressions to nested `IIf` calls.
    CaseWhen,
}

impl FixRule {
    /// Every rule, in application order.
    pub const ALL: [Self; 7] = [
        Self::UpperLower,
        Self::Cast,
        Self::Extract,
        Self::Locate,
        Self::AggregateDistinct,
        Self::OrderByAlias,
        Self::CaseWhen,
    ];

    /// Returns the configuration name of the rule.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::UpperLower => "upper_lower",
            Self::Cast => "cast",
            Self::Extract => "extract",
            Self::Locate => "locate",
            Self::AggregateDistinct => "aggregate_distinct",
            Self::OrderByAlias => "order_by_alias",
            Self::CaseWhen => "case_when",
        }
    }

    /// Applies this rule to a whole statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement cannot be tokenized or the rule
    /// meets a construct it cannot translate.
    pub fn apply(self, sql: &str) -> Result<String> {
        match self {
            Self::UpperLower => functions::upper_lower(sql),
            Self::Cast => functions::cast(sql),
            Self::Extract => functions::extract(sql),
            Self::Locate => functions::locate(sql),
            Self::AggregateDistinct => aggregate::aggregate_distinct(sql),
            Self::OrderByAlias => order_by::order_by_alias(sql),
            Self::CaseWhen => case_when::case_when(sql),
        }
    }
}

impl fmt::Display for FixRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Error returned when parsing an unknown rule name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown fix rule '{0}'")]
pub struct UnknownFixRule(pub String);

impl FromStr for FixRule {
    type Err = UnknownFixRule;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|rule| rule.name() == normalized)
            .ok_or_else(|| UnknownFixRule(String::from(s)))
    }
}

/// The ordered set of enabled rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixChain {
    enabled: Vec<FixRule>,
}

impl Default for FixChain {
    fn default() -> Self {
        Self::all()
    }
}

impl FixChain {
    /// A chain with every rule enabled.
    #[must_use]
    pub fn all() -> Self {
        Self {
            enabled: FixRule::ALL.to_vec(),
        }
    }

    /// A chain with no rule enabled.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            enabled: Vec::new(),
        }
    }

    /// A chain with exactly the given rules enabled. Order and duplicates in
    /// `rules` are irrelevant.
    #[must_use]
    pub fn with_rules(rules: impl IntoIterator<Item = FixRule>) -> Self {
        let mut enabled: Vec<FixRule> = rules.into_iter().collect();
        enabled.sort_unstable();
        enabled.dedup();
        Self { enabled }
    }

    /// Enables a rule.
    #[must_use]
    pub fn enable(self, rule: FixRule) -> Self {
        Self::with_rules(self.enabled.into_iter().chain([rule]))
    }

    /// Disables a rule.
    #[must_use]
    pub fn disable(mut self, rule: FixRule) -> Self {
        self.enabled.retain(|r| *r != rule);
        self
    }

    /// Returns true if the rule is enabled.
    #[must_use]
    pub fn is_enabled(&self, rule: FixRule) -> bool {
        self.enabled.contains(&rule)
    }

    /// The enabled rules in application order.
    #[must_use]
    pub fn rules(&self) -> &[FixRule] {
        &self.enabled
    }

    /// Runs every enabled rule over the statement text.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a rule.
    pub fn apply(&self, sql: &str) -> Result<String> {
        let mut text = String::from(sql);
        for rule in &self.enabled {
            let fixed = rule.apply(&text)?;
            if fixed != text {
                trace!(rule = %rule, sql = %fixed, "Fix rule applied");
                text = fixed;
            }
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_names_round_trip() {
        for rule in FixRule::ALL {
            assert_eq!(rule.name().parse::<FixRule>().unwrap(), rule);
        }
        assert_eq!("Order-By-Alias".parse::<FixRule>().unwrap(), FixRule::OrderByAlias);
        assert!("nope".parse::<FixRule>().is_err());
    }

    #[test]
    fn test_rules_serialize_snake_case() {
        let json = serde_json::to_string(&FixRule::AggregateDistinct).unwrap();
        assert_eq!(json, "\"aggregate_distinct\"");
        let rule: FixRule = serde_json::from_str("\"case_when\"").unwrap();
        assert_eq!(rule, FixRule::CaseWhen);
    }

    #[test]
    fn test_chain_keeps_application_order() {
        let chain = FixChain::with_rules([FixRule::CaseWhen, FixRule::UpperLower, FixRule::CaseWhen]);
        assert_eq!(chain.rules(), &[FixRule::UpperLower, FixRule::CaseWhen]);
        let chain = FixChain::none().enable(FixRule::Cast).enable(FixRule::UpperLower);
        assert_eq!(chain.rules(), &[FixRule::UpperLower, FixRule::Cast]);
    }

    #[test]
    fn test_disabled_rule_is_skipped() {
        let chain = FixChain::all().disable(FixRule::UpperLower);
        assert!(!chain.is_enabled(FixRule::UpperLower));
        assert_eq!(
            chain.apply("select upper(a) from T").unwrap(),
            "select upper(a) from T"
        );
    }

    #[test]
    fn test_full_chain() {
        let sql = "select upper(name) as n, cast(age as int), locate('x', name) \
                   from T where extract(year from born) = @p0 order by n";
        assert_eq!(
            FixChain::all().apply(sql).unwrap(),
            "select ucase(name) as n, CLng(age), InStr(name, 'x') \
             from T where DatePart('yyyy', born) = @p0 order by ucase(name)"
        );
    }

    #[test]
    fn test_chain_output_is_fixed_point() {
        let sql = "select count(distinct a) as c from T where case when b = 1 then 'x' else upper(c) end = 'x'";
        let once = FixChain::all().apply(sql).unwrap();
        assert_eq!(FixChain::all().apply(&once).unwrap(), once);
    }
}
