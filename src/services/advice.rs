use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Collaborators, Estimate, ServiceError};
use crate::core::{Allocations, GameState, Stage};

pub const FALLBACK_ADVICE: &str = "Our financial expert is unavailable right now. A good rule \
of thumb: cover essentials first, keep an emergency buffer, and pay down high-interest debt \
before spending on extras.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceRequest<'a> {
    pub location: &'a str,
    pub monthly_salary: f64,
    pub allocations: &'a Allocations,
    pub iteration: u32,
    pub is_game_over: bool,
}

impl<'a> AdviceRequest<'a> {
    /// Describes the round that just closed. Once the game is over the live
    /// allocations are empty, so the last recorded round is used.
    pub fn from_state(state: &'a GameState) -> Self {
        let is_game_over = state.stage == Stage::GameOver;
        let (allocations, iteration) = match state.iteration_history.last() {
            Some(last) if is_game_over => (&last.allocations, last.iteration),
            _ => (&state.allocations, state.iteration),
        };
        Self {
            location: &state.location,
            monthly_salary: state.monthly_salary,
            allocations,
            iteration,
            is_game_over,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AdviceResponse {
    advice: String,
}

impl Collaborators {
    pub async fn advice(&self, request: &AdviceRequest<'_>) -> Estimate<String> {
        match self.fetch_advice(request).await {
            Ok(advice) => Estimate::fetched(advice),
            Err(err) => {
                warn!(
                    iteration = request.iteration,
                    error = %err,
                    "advice unavailable, using fallback"
                );
                Estimate::fallback(FALLBACK_ADVICE.to_string())
            }
        }
    }

    async fn fetch_advice(&self, request: &AdviceRequest<'_>) -> Result<String, ServiceError> {
        let url = self
            .config
            .advice_url
            .as_deref()
            .ok_or(ServiceError::NotConfigured("advice"))?;
        let response: AdviceResponse = self.post_json(url, request).await?;
        let advice = response.advice.trim();
        if advice.is_empty() {
            return Err(ServiceError::InvalidValue("empty advice".to_string()));
        }
        Ok(advice.to_string())
    }
}
