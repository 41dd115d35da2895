use super::events::draw_event;
use super::types::{
    Allocations, GameState, IterationSummary, RoundState, Stage, biweekly_interest,
    monthly_interest,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub state: GameState,
    pub summary: IterationSummary,
}

/// Closes the current round: charges fixed costs and income-funded
/// allocations, applies the round's event, covers any shortfall from savings
/// then debt, accrues monthly interest on even rounds and opens the next
/// round (or ends the game).
///
/// Debt repayment was applied when it was allocated; here it is only
/// reported.
pub fn settle_period(state: &GameState, round: &RoundState) -> Settlement {
    let fixed_costs = state.fixed_costs();
    let period_income = state.period_income();
    let reserve_funded = round.reserve_funded().min(state.allocated_amount);
    let income_spent = state.allocated_amount - reserve_funded;

    let mut balance = period_income - fixed_costs - income_spent;

    let event = draw_event(state.biweekly_income, state.iteration);
    balance += event.adjustment;

    let mut savings = state.savings.max(0.0);
    let mut debt = state.debt.max(0.0);
    let mut savings_drawn = 0.0;
    let mut debt_added = 0.0;
    if balance < 0.0 {
        let shortfall = -balance;
        savings_drawn = shortfall.min(savings);
        savings -= savings_drawn;
        debt_added = shortfall - savings_drawn;
        debt += debt_added;
        balance = 0.0;
    }

    let interest_accrued = if state.iteration % 2 == 0 {
        monthly_interest(debt)
    } else {
        0.0
    };
    debt += interest_accrued;

    let summary = IterationSummary {
        iteration: state.iteration,
        period_income,
        fixed_costs,
        allocated_amount: state.allocated_amount,
        income_spent,
        reserve_funded,
        event,
        debt_repaid: round.debt_repaid_this_round,
        savings_drawn,
        debt_added,
        interest_accrued,
        ending_balance: balance,
        savings,
        debt,
        allocations: state.allocations.clone(),
    };

    let iteration = state.iteration + 1;
    let mut iteration_history = state.iteration_history.clone();
    iteration_history.push(summary.clone());

    let mut next = GameState {
        stage: Stage::BudgetAllocation,
        current_balance: balance,
        iteration,
        current_category_index: 0,
        allocations: Allocations::new(),
        allocated_amount: 0.0,
        debt,
        savings,
        cost_of_debt: biweekly_interest(debt),
        advice: None,
        iteration_history,
        ..state.clone()
    };
    if next.is_finished() {
        next.stage = Stage::GameOver;
    }

    Settlement {
        state: next,
        summary,
    }
}
