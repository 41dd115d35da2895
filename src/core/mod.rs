mod allocation;
mod categories;
mod error;
mod events;
mod settlement;
mod store;
mod types;

pub use allocation::{
    AllocationMode, Applied, apply_allocation, apply_from_debt, apply_from_savings, apply_normal,
    resolve_mode,
};
pub use categories::{CATEGORIES, CATEGORY_COUNT, Category, CategoryId, category_at};
pub use error::GameError;
pub use events::draw_event;
pub use settlement::{Settlement, settle_period};
pub use store::{AllocationOutcome, GameStore, RoundView};
pub use types::{
    ANNUAL_INTEREST_RATE, Allocation, Allocations, DEBT_CAP_FRACTION, FinalReport, GameState,
    IterationSummary, LocationCosts, RandomEvent, RoundState, Stage, TOTAL_ROUNDS,
};
