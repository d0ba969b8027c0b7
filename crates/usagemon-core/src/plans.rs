//! Plan tiers and their default limits.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cost limit used when a snapshot does not carry a P90 cost limit
pub const DEFAULT_COST_LIMIT: f64 = 50.0;

/// Message limit used when a snapshot does not carry a P90 message limit
pub const DEFAULT_MESSAGES_LIMIT: u64 = 1500;

/// Usage tier selecting limits and rendering mode
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Plan {
    /// Limits derived from the user's own P90 history
    #[default]
    Custom,
    Pro,
    Max5,
    Max20,
    /// Any plan name this build does not know about
    Other(String),
}

/// Static limits for a plan tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanLimits {
    pub token_limit: u64,
    pub cost_limit: f64,
    pub message_limit: u64,
}

impl Plan {
    /// Parse a plan name (case-insensitive, surrounding whitespace ignored)
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "custom" => Plan::Custom,
            "pro" => Plan::Pro,
            "max5" => Plan::Max5,
            "max20" => Plan::Max20,
            _ => Plan::Other(name.trim().to_string()),
        }
    }

    /// Name as shown in the header and written back to config
    pub fn name(&self) -> &str {
        match self {
            Plan::Custom => "custom",
            Plan::Pro => "pro",
            Plan::Max5 => "max5",
            Plan::Max20 => "max20",
            Plan::Other(name) => name,
        }
    }

    /// Whether the plan uses the wide, limit-based layout
    pub fn is_tiered(&self) -> bool {
        !matches!(self, Plan::Other(_))
    }

    /// Default limits for this plan (unknown plans fall back to `pro`)
    pub fn limits(&self) -> PlanLimits {
        match self {
            Plan::Pro | Plan::Other(_) => PlanLimits {
                token_limit: 19_000,
                cost_limit: 18.0,
                message_limit: 250,
            },
            Plan::Max5 => PlanLimits {
                token_limit: 88_000,
                cost_limit: 35.0,
                message_limit: 1_000,
            },
            Plan::Max20 => PlanLimits {
                token_limit: 220_000,
                cost_limit: 140.0,
                message_limit: 2_000,
            },
            Plan::Custom => PlanLimits {
                token_limit: 44_000,
                cost_limit: DEFAULT_COST_LIMIT,
                message_limit: 250,
            },
        }
    }
}

impl From<String> for Plan {
    fn from(name: String) -> Self {
        Plan::parse(&name)
    }
}

impl From<Plan> for String {
    fn from(plan: Plan) -> Self {
        plan.name().to_string()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_plans_case_insensitive() {
        assert_eq!(Plan::parse("PRO"), Plan::Pro);
        assert_eq!(Plan::parse(" Max5 "), Plan::Max5);
        assert_eq!(Plan::parse("max20"), Plan::Max20);
        assert_eq!(Plan::parse("custom"), Plan::Custom);
    }

    #[test]
    fn test_unknown_plan_round_trips() {
        let plan = Plan::parse("team-enterprise");
        assert_eq!(plan, Plan::Other("team-enterprise".to_string()));
        assert_eq!(plan.to_string(), "team-enterprise");
        assert!(!plan.is_tiered());
    }

    #[test]
    fn test_tiered_plans() {
        for plan in [Plan::Custom, Plan::Pro, Plan::Max5, Plan::Max20] {
            assert!(plan.is_tiered(), "{} should be tiered", plan);
        }
    }

    #[test]
    fn test_serde_uses_plan_name() {
        let json = serde_json::to_string(&Plan::Max5).unwrap();
        assert_eq!(json, "\"max5\"");
        let plan: Plan = serde_json::from_str("\"Max20\"").unwrap();
        assert_eq!(plan, Plan::Max20);
    }

    #[test]
    fn test_limits() {
        assert_eq!(Plan::Max20.limits().token_limit, 220_000);
        assert_eq!(Plan::Custom.limits().cost_limit, DEFAULT_COST_LIMIT);
        assert_eq!(Plan::Other("x".into()).limits(), Plan::Pro.limits());
    }
}
