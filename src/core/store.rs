use serde::Serialize;
use tracing::{debug, info};

use super::allocation::{AllocationMode, apply_allocation, resolve_mode};
use super::categories::{CATEGORIES, CATEGORY_COUNT, CategoryId, category_at};
use super::error::GameError;
use super::settlement::settle_period;
use super::types::{
    FinalReport, GameState, IterationSummary, LocationCosts, RoundState, Stage,
};

/// Read model for the allocation screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub iteration: u32,
    pub category: CategoryId,
    pub label: &'static str,
    pub glyph: &'static str,
    pub categories_left: usize,
    pub mode: AllocationMode,
    pub capacity: f64,
    pub period_income: f64,
    pub fixed_costs: f64,
    pub cost_of_debt: f64,
    pub discretionary_income: f64,
    pub remaining_to_allocate: f64,
    pub debt_cap: f64,
    pub debt_cap_left: f64,
    pub savings_exhausted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationOutcome {
    pub category: CategoryId,
    pub mode: AllocationMode,
    pub requested: f64,
    pub applied: f64,
    pub round_complete: bool,
}

/// Owns the single [`GameState`] record and the round-local state beside it.
/// Every transition builds a new record and swaps it in; a failed
/// transition leaves both untouched.
#[derive(Debug, Clone, Default)]
pub struct GameStore {
    state: GameState,
    round: RoundState,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    pub fn reset(&mut self) {
        info!("resetting game");
        *self = Self::default();
    }

    pub fn submit_salary(&mut self, gross_monthly_salary: f64) -> Result<(), GameError> {
        self.require_stage(Stage::Salary)?;
        if !gross_monthly_salary.is_finite() || gross_monthly_salary <= 0.0 {
            return Err(GameError::InvalidSalary);
        }

        self.state = GameState {
            stage: Stage::Location,
            gross_monthly_salary,
            ..self.state.clone()
        };
        info!(gross_monthly_salary, "salary accepted");
        Ok(())
    }

    /// Stores an estimate for `location`. The game stays in the location
    /// stage so the figures can still be edited.
    pub fn set_location(&mut self, location: &str, costs: LocationCosts) -> Result<(), GameError> {
        self.require_stage(Stage::Location)?;
        let location = location.trim();
        if location.is_empty() {
            return Err(GameError::EmptyLocation);
        }
        validate_costs(&costs)?;

        self.state = GameState {
            location: location.to_string(),
            housing_cost: costs.housing_cost,
            utility_cost: costs.utility_cost,
            tax_rate: costs.tax_rate,
            ..self.state.clone()
        };
        info!(location, ?costs, "location estimate stored");
        Ok(())
    }

    pub fn edit_costs(&mut self, costs: LocationCosts) -> Result<(), GameError> {
        self.require_stage(Stage::Location)?;
        if self.state.location.is_empty() {
            return Err(GameError::MissingEstimate);
        }
        validate_costs(&costs)?;

        self.state = GameState {
            housing_cost: costs.housing_cost,
            utility_cost: costs.utility_cost,
            tax_rate: costs.tax_rate,
            ..self.state.clone()
        };
        debug!(?costs, "location costs edited");
        Ok(())
    }

    /// Locks the location in, derives net and bi-weekly income and opens the
    /// first round.
    pub fn confirm_location(&mut self) -> Result<(), GameError> {
        self.require_stage(Stage::Location)?;
        if self.state.location.is_empty() {
            return Err(GameError::MissingEstimate);
        }

        let monthly_salary = self.state.gross_monthly_salary * (1.0 - self.state.tax_rate / 100.0);
        self.state = GameState {
            stage: Stage::BudgetAllocation,
            monthly_salary,
            biweekly_income: monthly_salary / 2.0,
            current_category_index: 0,
            allocations: Default::default(),
            allocated_amount: 0.0,
            ..self.state.clone()
        };
        self.round = RoundState::default();
        info!(
            location = %self.state.location,
            monthly_salary,
            biweekly_income = self.state.biweekly_income,
            "budget allocation started"
        );
        Ok(())
    }

    /// Unallocated discretionary income this round. Fixed-cost shortfalls
    /// are not financed here; settlement covers them.
    pub fn remaining_to_allocate(&self) -> f64 {
        let income_allocated = self.state.allocated_amount - self.round.reserve_funded();
        (self.state.discretionary_income() - income_allocated).max(0.0)
    }

    pub fn current_mode(&self) -> AllocationMode {
        resolve_mode(&self.state, self.remaining_to_allocate(), &self.round)
    }

    pub fn round_view(&self) -> Option<RoundView> {
        if self.state.stage != Stage::BudgetAllocation {
            return None;
        }
        let category = category_at(self.state.current_category_index)?;
        let mode = self.current_mode();
        let debt_cap = self.state.debt_cap_per_round();

        Some(RoundView {
            iteration: self.state.iteration,
            category: category.id,
            label: category.label,
            glyph: category.glyph,
            categories_left: CATEGORY_COUNT - self.state.current_category_index,
            mode,
            capacity: mode.capacity_for(category.id),
            period_income: self.state.period_income(),
            fixed_costs: self.state.fixed_costs(),
            cost_of_debt: self.state.cost_of_debt,
            discretionary_income: self.state.discretionary_income(),
            remaining_to_allocate: self.remaining_to_allocate(),
            debt_cap,
            debt_cap_left: (debt_cap - self.round.debt_used_this_round).max(0.0),
            savings_exhausted: self.round.savings_exhausted,
        })
    }

    /// Allocates to the current category. The amount is clamped to what the
    /// resolved funding source can cover; the ninth allocation closes the
    /// round.
    pub fn allocate(&mut self, requested: f64) -> Result<AllocationOutcome, GameError> {
        self.require_stage(Stage::BudgetAllocation)?;
        if !requested.is_finite() || requested < 0.0 {
            return Err(GameError::InvalidAmount);
        }
        // The stage moves to summary on the ninth allocation, so the index is
        // in range here.
        let category = CATEGORIES[self.state.current_category_index];

        let mode = self.current_mode();
        let applied = apply_allocation(&self.state, &self.round, mode, requested, category.id);

        let current_category_index = self.state.current_category_index + 1;
        let round_complete = current_category_index >= CATEGORY_COUNT;
        self.state = GameState {
            current_category_index,
            stage: if round_complete {
                Stage::Summary
            } else {
                Stage::BudgetAllocation
            },
            ..applied.state
        };
        self.round = applied.round;

        debug!(
            category = ?category.id,
            ?mode,
            requested,
            applied = applied.amount,
            "allocation applied"
        );
        if round_complete {
            info!(
                iteration = self.state.iteration,
                allocated = self.state.allocated_amount,
                "round allocation complete"
            );
        }

        Ok(AllocationOutcome {
            category: category.id,
            mode,
            requested,
            applied: applied.amount,
            round_complete,
        })
    }

    pub fn settle(&mut self) -> Result<IterationSummary, GameError> {
        self.require_stage(Stage::Summary)?;

        let settlement = settle_period(&self.state, &self.round);
        self.state = settlement.state;
        self.round = RoundState::default();

        let summary = settlement.summary;
        info!(
            iteration = summary.iteration,
            event = %summary.event.message,
            ending_balance = summary.ending_balance,
            savings = summary.savings,
            debt = summary.debt,
            next_stage = ?self.state.stage,
            "period settled"
        );
        Ok(summary)
    }

    pub fn set_advice(&mut self, advice: String) {
        self.state = GameState {
            advice: Some(advice),
            ..self.state.clone()
        };
    }

    pub fn final_report(&self) -> Result<FinalReport, GameError> {
        self.require_stage(Stage::GameOver)?;
        let history = &self.state.iteration_history;

        Ok(FinalReport {
            rounds: history.len(),
            ending_balance: self.state.current_balance,
            savings: self.state.savings,
            debt: self.state.debt,
            net_worth: self.state.net_worth(),
            total_allocated: history.iter().map(|s| s.allocated_amount).sum(),
            total_interest: history.iter().map(|s| s.interest_accrued).sum(),
            total_event_adjustment: history.iter().map(|s| s.event.adjustment).sum(),
        })
    }

    pub fn require_stage(&self, expected: Stage) -> Result<(), GameError> {
        if self.state.stage != expected {
            return Err(GameError::WrongStage {
                expected,
                actual: self.state.stage,
            });
        }
        Ok(())
    }
}

fn validate_costs(costs: &LocationCosts) -> Result<(), GameError> {
    for (field, value) in [
        ("housing cost", costs.housing_cost),
        ("utility cost", costs.utility_cost),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(GameError::InvalidCost { field });
        }
    }
    if !(0.0..=100.0).contains(&costs.tax_rate) {
        return Err(GameError::InvalidTaxRate);
    }
    Ok(())
}
