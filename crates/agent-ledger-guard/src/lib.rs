//! Agent Ledger Guard - Spend Enforcement Rule
//!
//! Decides, for a proposed action against an agent, whether the action may be
//! logged. The rule is a pure function of the agent's limits, the proposed
//! cost and the spend already accumulated in the current window; it never
//! reads a clock or touches storage. Stores call [`evaluate`] inside their
//! own transaction and apply the outcome.
//!
//! # Checks
//!
//! Evaluated strictly in this order, first failure wins:
//!
//! 1. Paused agents may not spend.
//! 2. `cost > per_action_limit` is rejected.
//! 3. `month_spend + cost > monthly_budget` is rejected **and** pauses the
//!    agent with a `budget_exceeded` alert.
//! 4. Anything else is approved.
//!
//! Both limits are inclusive: spending exactly up to a limit is allowed.

use agent_ledger_types::{AgentStatus, SpendLimits};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a proposed action is refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Agent is paused")]
    AgentPaused,

    #[error("Exceeds per-action limit of ${}", .limit.normalize())]
    PerActionLimitExceeded { limit: Decimal, cost: Decimal },

    #[error("Monthly budget exceeded. Agent has been paused.")]
    MonthlyBudgetExceeded {
        budget: Decimal,
        attempted_total: Decimal,
    },

    #[error("cost must not be negative, got {0}")]
    NegativeCost(Decimal),

    #[error("Spend total out of range")]
    SpendOverflow { month_spend: Decimal, cost: Decimal },
}

impl GuardError {
    /// Whether this refusal moves the agent to `paused`
    pub fn pauses_agent(&self) -> bool {
        matches!(self, Self::MonthlyBudgetExceeded { .. })
    }

    /// Message for the alert written alongside the pause, if any
    pub fn alert_message(&self) -> Option<String> {
        match self {
            Self::MonthlyBudgetExceeded { budget, attempted_total } => {
                Some(budget_exceeded_message(*budget, *attempted_total))
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;

/// An approved action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    /// Window spend including the approved action
    pub projected_total: Decimal,
}

/// Run the spend rule.
pub fn evaluate(limits: &SpendLimits, cost: Decimal, month_spend: Decimal) -> Result<Approval> {
    if cost < Decimal::ZERO {
        return Err(GuardError::NegativeCost(cost));
    }

    if limits.status == AgentStatus::Paused {
        return Err(GuardError::AgentPaused);
    }

    if cost > limits.per_action_limit {
        return Err(GuardError::PerActionLimitExceeded {
            limit: limits.per_action_limit,
            cost,
        });
    }

    let projected_total = month_spend
        .checked_add(cost)
        .ok_or(GuardError::SpendOverflow { month_spend, cost })?;
    if projected_total > limits.monthly_budget {
        return Err(GuardError::MonthlyBudgetExceeded {
            budget: limits.monthly_budget,
            attempted_total: projected_total,
        });
    }

    Ok(Approval { projected_total })
}

/// Alert text for an auto-pause.
///
/// The budget drops trailing zeros (`$25`), the attempted total always
/// shows cents (`$28.00`).
pub fn budget_exceeded_message(budget: Decimal, attempted_total: Decimal) -> String {
    format!(
        "Agent auto-paused: monthly budget of ${} exceeded (attempted spend: ${:.2})",
        budget.normalize(),
        attempted_total.round_dp(2)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn limits(status: AgentStatus, budget: Decimal, per_action: Decimal) -> SpendLimits {
        SpendLimits {
            status,
            monthly_budget: budget,
            per_action_limit: per_action,
        }
    }

    fn active() -> SpendLimits {
        limits(AgentStatus::Active, dec!(25.00), dec!(5.00))
    }

    #[test]
    fn test_paused_agent_rejected_for_any_cost() {
        let paused = limits(AgentStatus::Paused, dec!(25.00), dec!(5.00));
        for cost in [Decimal::ZERO, dec!(0.01), dec!(5.00), dec!(500)] {
            assert_eq!(evaluate(&paused, cost, Decimal::ZERO), Err(GuardError::AgentPaused));
        }
    }

    #[test]
    fn test_pause_check_precedes_limits() {
        let paused = limits(AgentStatus::Paused, dec!(1), dec!(1));
        let err = evaluate(&paused, dec!(100), dec!(100)).unwrap_err();
        assert_eq!(err, GuardError::AgentPaused);
        assert!(!err.pauses_agent());
    }

    #[test]
    fn test_per_action_limit_regardless_of_budget() {
        let roomy = limits(AgentStatus::Active, dec!(1000), dec!(2.00));
        let err = evaluate(&roomy, dec!(2.01), Decimal::ZERO).unwrap_err();
        assert_eq!(
            err,
            GuardError::PerActionLimitExceeded { limit: dec!(2.00), cost: dec!(2.01) }
        );
        assert_eq!(err.to_string(), "Exceeds per-action limit of $2");
        assert!(!err.pauses_agent());
        assert!(err.alert_message().is_none());
    }

    #[test]
    fn test_per_action_limit_checked_before_budget() {
        // Both checks would fail; the per-action one must win and must not pause.
        let err = evaluate(&active(), dec!(6.00), dec!(24.00)).unwrap_err();
        assert!(matches!(err, GuardError::PerActionLimitExceeded { .. }));
    }

    #[test]
    fn test_per_action_limit_is_inclusive() {
        assert!(evaluate(&active(), dec!(5.00), Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_budget_equality_accepted() {
        let approval = evaluate(&active(), dec!(4.00), dec!(21.00)).unwrap();
        assert_eq!(approval.projected_total, dec!(25.00));
    }

    #[test]
    fn test_budget_exceeded_pauses() {
        let err = evaluate(&active(), dec!(0.01), dec!(25.00)).unwrap_err();
        assert!(err.pauses_agent());
        assert_eq!(err.to_string(), "Monthly budget exceeded. Agent has been paused.");
    }

    #[test]
    fn test_scenario_accept_then_pause() {
        let first = evaluate(&active(), dec!(3.00), dec!(21.00)).unwrap();
        assert_eq!(first.projected_total, dec!(24.00));

        let err = evaluate(&active(), dec!(4.00), first.projected_total).unwrap_err();
        assert_eq!(
            err,
            GuardError::MonthlyBudgetExceeded { budget: dec!(25.00), attempted_total: dec!(28.00) }
        );
        let message = err.alert_message().unwrap();
        assert!(message.contains("$25"));
        assert!(message.contains("$28.00"));
    }

    #[test]
    fn test_alert_message_format() {
        assert_eq!(
            budget_exceeded_message(dec!(50.00), dec!(50.2)),
            "Agent auto-paused: monthly budget of $50 exceeded (attempted spend: $50.20)"
        );
        assert_eq!(
            budget_exceeded_message(dec!(12.50), dec!(12.556)),
            "Agent auto-paused: monthly budget of $12.5 exceeded (attempted spend: $12.56)"
        );
    }

    #[test]
    fn test_negative_cost_rejected() {
        assert_eq!(
            evaluate(&active(), dec!(-1), Decimal::ZERO),
            Err(GuardError::NegativeCost(dec!(-1)))
        );
    }

    #[test]
    fn test_overflowing_total_is_rejected_without_pausing() {
        let unbounded = limits(AgentStatus::Active, Decimal::MAX, Decimal::MAX);
        assert!(evaluate(&unbounded, Decimal::MAX, Decimal::ZERO).is_ok());

        let err = evaluate(&unbounded, Decimal::MAX, Decimal::MAX).unwrap_err();
        assert_eq!(
            err,
            GuardError::SpendOverflow { month_spend: Decimal::MAX, cost: Decimal::MAX }
        );
        assert!(!err.pauses_agent());
    }

    #[test]
    fn test_zero_cost_accepted_at_full_budget() {
        assert!(evaluate(&active(), Decimal::ZERO, dec!(25.00)).is_ok());
    }
}
