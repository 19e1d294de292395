//! Cross-field business rules for trade requests.
//!
//! Every request shape owns an ordered table of [`Rule`]s. Checking a request
//! is a pure walk over that table: nothing is mutated and nothing touches the
//! network. Callers pick between collect-all ([`Validate::violations`]) and
//! fail-fast ([`Validate::first_violation`]); the order of the table decides
//! which message a fail-fast caller sees.

pub mod format;
mod order;
mod position;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::models::{
    ClosePosition, CreatePosition, CreateWorkingOrder, UpdatePosition, UpdateWorkingOrder,
};

/// One named constraint over a request shape.
pub struct Rule<T> {
    /// Stable identifier, e.g. `force-open-required`
    pub id: &'static str,
    /// Wire names of the fields the rule inspects
    pub fields: &'static [&'static str],
    pub message: &'static str,
    /// Returns true when the request satisfies the rule
    pub holds: fn(&T) -> bool,
}

impl<T> Rule<T> {
    pub fn check(&self, request: &T) -> Option<RuleViolation> {
        if (self.holds)(request) {
            None
        } else {
            Some(RuleViolation {
                rule: self.id,
                fields: self.fields,
                message: self.message,
            })
        }
    }
}

impl<T> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("fields", &self.fields)
            .finish()
    }
}

/// A failed rule, naming the offending fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleViolation {
    pub rule: &'static str,
    pub fields: &'static [&'static str],
    pub message: &'static str,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

/// A request was rejected before it reached the transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {rule_set} request: {}", summarize(.violations))]
pub struct ValidationError {
    pub rule_set: RuleSet,
    /// Every violation, in rule order. Never empty.
    pub violations: Vec<RuleViolation>,
}

fn summarize(violations: &[RuleViolation]) -> String {
    match violations {
        [] => "no violations".to_string(),
        [only] => only.message.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}

impl ValidationError {
    /// The violation a fail-fast caller would report
    pub fn first(&self) -> Option<&RuleViolation> {
        self.violations.first()
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.rule).collect()
    }

    pub fn messages(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.message).collect()
    }

    pub fn has_rule(&self, id: &str) -> bool {
        self.violations.iter().any(|v| v.rule == id)
    }
}

/// A request shape with its rule table.
pub trait Validate: Sized + 'static {
    const RULE_SET: RuleSet;

    fn rules() -> &'static [Rule<Self>];

    /// All violations, in rule order
    fn violations(&self) -> Vec<RuleViolation> {
        Self::rules().iter().filter_map(|rule| rule.check(self)).collect()
    }

    fn first_violation(&self) -> Option<RuleViolation> {
        Self::rules().iter().find_map(|rule| rule.check(self))
    }

    fn is_valid(&self) -> bool {
        Self::rules().iter().all(|rule| (rule.holds)(self))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                rule_set: Self::RULE_SET,
                violations,
            })
        }
    }
}

/// Identifies which rule table applies to a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleSet {
    CreatePosition,
    ClosePosition,
    UpdatePosition,
    CreateWorkingOrder,
    UpdateWorkingOrder,
}

impl RuleSet {
    pub const ALL: [RuleSet; 5] = [
        RuleSet::CreatePosition,
        RuleSet::ClosePosition,
        RuleSet::UpdatePosition,
        RuleSet::CreateWorkingOrder,
        RuleSet::UpdateWorkingOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSet::CreatePosition => "create-position",
            RuleSet::ClosePosition => "close-position",
            RuleSet::UpdatePosition => "update-position",
            RuleSet::CreateWorkingOrder => "create-working-order",
            RuleSet::UpdateWorkingOrder => "update-working-order",
        }
    }

    /// (id, message) of every rule in evaluation order
    pub fn describe(&self) -> Vec<(&'static str, &'static str)> {
        fn describe<T>(rules: &[Rule<T>]) -> Vec<(&'static str, &'static str)> {
            rules.iter().map(|r| (r.id, r.message)).collect()
        }
        match self {
            RuleSet::CreatePosition => describe(CreatePosition::rules()),
            RuleSet::ClosePosition => describe(ClosePosition::rules()),
            RuleSet::UpdatePosition => describe(UpdatePosition::rules()),
            RuleSet::CreateWorkingOrder => describe(CreateWorkingOrder::rules()),
            RuleSet::UpdateWorkingOrder => describe(UpdateWorkingOrder::rules()),
        }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleSet::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = RuleSet::ALL.iter().map(|r| r.as_str()).collect();
                format!("unknown rule set '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Any request the engine knows how to check.
#[derive(Debug, Clone, PartialEq)]
pub enum TradeRequest {
    CreatePosition(CreatePosition),
    ClosePosition(ClosePosition),
    UpdatePosition(UpdatePosition),
    CreateWorkingOrder(CreateWorkingOrder),
    UpdateWorkingOrder(UpdateWorkingOrder),
}

impl TradeRequest {
    /// Decode a wire payload as the shape `rule_set` names
    pub fn from_json(rule_set: RuleSet, json: &str) -> Result<Self, serde_json::Error> {
        Ok(match rule_set {
            RuleSet::CreatePosition => TradeRequest::CreatePosition(serde_json::from_str(json)?),
            RuleSet::ClosePosition => TradeRequest::ClosePosition(serde_json::from_str(json)?),
            RuleSet::UpdatePosition => TradeRequest::UpdatePosition(serde_json::from_str(json)?),
            RuleSet::CreateWorkingOrder => {
                TradeRequest::CreateWorkingOrder(serde_json::from_str(json)?)
            }
            RuleSet::UpdateWorkingOrder => {
                TradeRequest::UpdateWorkingOrder(serde_json::from_str(json)?)
            }
        })
    }

    pub fn rule_set(&self) -> RuleSet {
        match self {
            TradeRequest::CreatePosition(_) => CreatePosition::RULE_SET,
            TradeRequest::ClosePosition(_) => ClosePosition::RULE_SET,
            TradeRequest::UpdatePosition(_) => UpdatePosition::RULE_SET,
            TradeRequest::CreateWorkingOrder(_) => CreateWorkingOrder::RULE_SET,
            TradeRequest::UpdateWorkingOrder(_) => UpdateWorkingOrder::RULE_SET,
        }
    }

    pub fn violations(&self) -> Vec<RuleViolation> {
        match self {
            TradeRequest::CreatePosition(r) => r.violations(),
            TradeRequest::ClosePosition(r) => r.violations(),
            TradeRequest::UpdatePosition(r) => r.violations(),
            TradeRequest::CreateWorkingOrder(r) => r.violations(),
            TradeRequest::UpdateWorkingOrder(r) => r.violations(),
        }
    }

    pub fn first_violation(&self) -> Option<RuleViolation> {
        match self {
            TradeRequest::CreatePosition(r) => r.first_violation(),
            TradeRequest::ClosePosition(r) => r.first_violation(),
            TradeRequest::UpdatePosition(r) => r.first_violation(),
            TradeRequest::CreateWorkingOrder(r) => r.first_violation(),
            TradeRequest::UpdateWorkingOrder(r) => r.first_violation(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            TradeRequest::CreatePosition(r) => r.validate(),
            TradeRequest::ClosePosition(r) => r.validate(),
            TradeRequest::UpdatePosition(r) => r.validate(),
            TradeRequest::CreateWorkingOrder(r) => r.validate(),
            TradeRequest::UpdateWorkingOrder(r) => r.validate(),
        }
    }
}

impl From<CreatePosition> for TradeRequest {
    fn from(request: CreatePosition) -> Self {
        TradeRequest::CreatePosition(request)
    }
}

impl From<ClosePosition> for TradeRequest {
    fn from(request: ClosePosition) -> Self {
        TradeRequest::ClosePosition(request)
    }
}

impl From<UpdatePosition> for TradeRequest {
    fn from(request: UpdatePosition) -> Self {
        TradeRequest::UpdatePosition(request)
    }
}

impl From<CreateWorkingOrder> for TradeRequest {
    fn from(request: CreateWorkingOrder) -> Self {
        TradeRequest::CreateWorkingOrder(request)
    }
}

impl From<UpdateWorkingOrder> for TradeRequest {
    fn from(request: UpdateWorkingOrder) -> Self {
        TradeRequest::UpdateWorkingOrder(request)
    }
}
