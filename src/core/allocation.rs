use serde::Serialize;

use super::categories::CategoryId;
use super::types::{GameState, RoundState};

/// Where the next allocation is paid from, with how much that source can
/// still cover.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum AllocationMode {
    Normal { remaining: f64 },
    Savings { available: f64 },
    Debt { available: f64 },
    #[serde(rename = "none")]
    Exhausted,
}

impl AllocationMode {
    pub fn capacity(&self) -> f64 {
        match *self {
            Self::Normal { remaining } => remaining,
            Self::Savings { available } | Self::Debt { available } => available,
            Self::Exhausted => 0.0,
        }
    }

    /// What this mode can put toward `category`. Reserves never fund a
    /// transfer category: drawing savings into savings or borrowing to repay
    /// debt would only move the money in a circle.
    pub fn capacity_for(&self, category: CategoryId) -> f64 {
        match self {
            Self::Savings { .. } | Self::Debt { .. } if category.is_transfer() => 0.0,
            _ => self.capacity(),
        }
    }
}

/// Decides the funding source for the next category. First match wins:
/// unallocated income, then savings (until exhausted this round), then debt
/// up to the per-round cap.
pub fn resolve_mode(
    state: &GameState,
    remaining_to_allocate: f64,
    round: &RoundState,
) -> AllocationMode {
    if remaining_to_allocate > 0.0 {
        return AllocationMode::Normal {
            remaining: remaining_to_allocate,
        };
    }

    if state.savings > 0.0 && !round.savings_exhausted {
        return AllocationMode::Savings {
            available: state.savings,
        };
    }

    let available_debt = (state.debt_cap_per_round() - round.debt_used_this_round).max(0.0);
    if available_debt > 0.0 {
        return AllocationMode::Debt {
            available: available_debt,
        };
    }

    AllocationMode::Exhausted
}

/// Spends income on `category`. Savings and debt repayment move the money
/// into the matching balance.
pub fn apply_normal(state: &GameState, amount: f64, category: CategoryId) -> GameState {
    let amount = amount.max(0.0);
    let mut next = state.with_allocation(category, amount);

    match category {
        CategoryId::Savings => next.savings += amount,
        CategoryId::DebtRepayment => {
            if next.debt > 0.0 {
                if amount >= next.debt {
                    next.savings += amount - next.debt;
                    next.debt = 0.0;
                } else {
                    next.debt -= amount;
                }
            } else {
                next.savings += amount;
            }
        }
        _ => {}
    }

    next
}

/// Pays for `category` out of savings. Any part savings cannot cover becomes
/// debt. The flag reports whether savings are now empty.
pub fn apply_from_savings(
    state: &GameState,
    amount: f64,
    category: CategoryId,
) -> (GameState, bool) {
    let amount = amount.max(0.0);
    let mut next = state.with_allocation(category, amount);

    if amount > next.savings {
        next.debt += amount - next.savings;
        next.savings = 0.0;
    } else {
        next.savings -= amount;
    }

    let exhausted = next.savings <= 0.0;
    (next, exhausted)
}

/// Pays for `category` with new debt. The caller owns the round's
/// `debt_used_this_round` counter.
pub fn apply_from_debt(state: &GameState, amount: f64, category: CategoryId) -> GameState {
    let amount = amount.max(0.0);
    let mut next = state.with_allocation(category, amount);
    next.debt += amount;
    next
}

#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub state: GameState,
    pub round: RoundState,
    pub amount: f64,
}

/// Clamps `requested` to what `mode` can cover for `category` and routes it to
/// the matching applier.
pub fn apply_allocation(
    state: &GameState,
    round: &RoundState,
    mode: AllocationMode,
    requested: f64,
    category: CategoryId,
) -> Applied {
    let amount = requested.max(0.0).min(mode.capacity_for(category));
    let mut round = *round;

    let state = match mode {
        AllocationMode::Normal { .. } => {
            if category == CategoryId::DebtRepayment {
                round.debt_repaid_this_round += amount.min(state.debt.max(0.0));
            }
            apply_normal(state, amount, category)
        }
        AllocationMode::Savings { .. } => {
            let (next, exhausted) = apply_from_savings(state, amount, category);
            round.savings_drawn_this_round += amount;
            round.savings_exhausted |= exhausted;
            next
        }
        AllocationMode::Debt { .. } => {
            round.debt_used_this_round += amount;
            apply_from_debt(state, amount, category)
        }
        AllocationMode::Exhausted => state.with_allocation(category, 0.0),
    };

    Applied {
        state,
        round,
        amount,
    }
}
