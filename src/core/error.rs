use super::types::Stage;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("gross monthly salary must be a positive number")]
    InvalidSalary,
    #[error("location must not be empty")]
    EmptyLocation,
    #[error("{field} must be a finite number >= 0")]
    InvalidCost { field: &'static str },
    #[error("tax rate must be between 0 and 100")]
    InvalidTaxRate,
    #[error("allocation amount must be a finite number >= 0")]
    InvalidAmount,
    #[error("no location estimate has been set")]
    MissingEstimate,
    #[error("action requires stage {expected:?}, but the game is in {actual:?}")]
    WrongStage { expected: Stage, actual: Stage },
}

impl GameError {
    /// Validation failures are the caller's input; everything else is a
    /// request that does not fit the current stage.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidSalary
                | Self::EmptyLocation
                | Self::InvalidCost { .. }
                | Self::InvalidTaxRate
                | Self::InvalidAmount
        )
    }
}
