use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::categories::CategoryId;

pub const ANNUAL_INTEREST_RATE: f64 = 0.15;
pub const MONTHS_PER_YEAR: f64 = 12.0;
pub const BIWEEKLY_PERIODS_PER_YEAR: f64 = 26.0;
pub const TOTAL_ROUNDS: u32 = 12;
/// Share of net monthly salary that discretionary allocation may borrow in
/// one round.
pub const DEBT_CAP_FRACTION: f64 = 0.25;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Salary,
    Location,
    BudgetAllocation,
    Summary,
    GameOver,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Allocation {
    pub amount: f64,
    pub glyph: &'static str,
}

pub type Allocations = BTreeMap<CategoryId, Allocation>;

/// Housing, utility and tax figures for a location, as returned by the cost
/// estimator (wire names are snake_case).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationCosts {
    pub housing_cost: f64,
    pub utility_cost: f64,
    pub tax_rate: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct RandomEvent {
    pub message: &'static str,
    pub adjustment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationSummary {
    pub iteration: u32,
    pub period_income: f64,
    pub fixed_costs: f64,
    pub allocated_amount: f64,
    pub income_spent: f64,
    pub reserve_funded: f64,
    pub event: RandomEvent,
    pub debt_repaid: f64,
    pub savings_drawn: f64,
    pub debt_added: f64,
    pub interest_accrued: f64,
    pub ending_balance: f64,
    pub savings: f64,
    pub debt: f64,
    pub allocations: Allocations,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub stage: Stage,
    pub gross_monthly_salary: f64,
    pub monthly_salary: f64,
    pub biweekly_income: f64,
    pub location: String,
    pub housing_cost: f64,
    pub utility_cost: f64,
    pub tax_rate: f64,
    pub current_balance: f64,
    pub iteration: u32,
    pub current_category_index: usize,
    pub allocations: Allocations,
    pub allocated_amount: f64,
    pub debt: f64,
    pub savings: f64,
    pub cost_of_debt: f64,
    pub advice: Option<String>,
    pub iteration_history: Vec<IterationSummary>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            stage: Stage::Salary,
            gross_monthly_salary: 0.0,
            monthly_salary: 0.0,
            biweekly_income: 0.0,
            location: String::new(),
            housing_cost: 0.0,
            utility_cost: 0.0,
            tax_rate: 0.0,
            current_balance: 0.0,
            iteration: 1,
            current_category_index: 0,
            allocations: Allocations::new(),
            allocated_amount: 0.0,
            debt: 0.0,
            savings: 0.0,
            cost_of_debt: 0.0,
            advice: None,
            iteration_history: Vec::new(),
        }
    }
}

impl GameState {
    pub fn fixed_costs(&self) -> f64 {
        self.housing_cost / 2.0 + self.utility_cost / 2.0
    }

    /// Income available this round: the paycheck, plus the carried balance
    /// after the first round.
    pub fn period_income(&self) -> f64 {
        if self.iteration <= 1 {
            self.biweekly_income
        } else {
            self.current_balance + self.biweekly_income
        }
    }

    pub fn discretionary_income(&self) -> f64 {
        self.period_income() - self.fixed_costs() - self.cost_of_debt
    }

    pub fn debt_cap_per_round(&self) -> f64 {
        (self.monthly_salary * DEBT_CAP_FRACTION).max(0.0)
    }

    pub fn net_worth(&self) -> f64 {
        self.current_balance + self.savings - self.debt
    }

    pub fn is_finished(&self) -> bool {
        self.iteration > TOTAL_ROUNDS
    }

    /// Records `amount` under `category`, replacing any earlier record so the
    /// running total stays equal to the sum of records.
    pub(crate) fn with_allocation(&self, category: CategoryId, amount: f64) -> Self {
        let mut next = self.clone();
        if let Some(previous) = next.allocations.insert(
            category,
            Allocation {
                amount,
                glyph: category.glyph(),
            },
        ) {
            next.allocated_amount -= previous.amount;
        }
        next.allocated_amount += amount;
        next
    }
}

pub fn biweekly_interest(debt: f64) -> f64 {
    debt * ANNUAL_INTEREST_RATE / BIWEEKLY_PERIODS_PER_YEAR
}

pub fn monthly_interest(debt: f64) -> f64 {
    debt * ANNUAL_INTEREST_RATE / MONTHS_PER_YEAR
}

/// Round-local bookkeeping that lives beside [`GameState`] and is reset at
/// every settlement.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundState {
    pub debt_used_this_round: f64,
    pub savings_drawn_this_round: f64,
    pub debt_repaid_this_round: f64,
    pub savings_exhausted: bool,
}

impl RoundState {
    /// Allocations this round that were paid from savings or new debt rather
    /// than from income.
    pub fn reserve_funded(&self) -> f64 {
        self.debt_used_this_round + self.savings_drawn_this_round
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    pub rounds: usize,
    pub ending_balance: f64,
    pub savings: f64,
    pub debt: f64,
    pub net_worth: f64,
    pub total_allocated: f64,
    pub total_interest: f64,
    pub total_event_adjustment: f64,
}
