use serde::Serialize;
use tracing::warn;

use super::{Collaborators, Estimate, ServiceError};
use crate::core::LocationCosts;

pub const FALLBACK_LOCATION_COSTS: LocationCosts = LocationCosts {
    housing_cost: 1200.0,
    utility_cost: 200.0,
    tax_rate: 25.0,
};

#[derive(Debug, Serialize)]
struct CostEstimateRequest<'a> {
    location: &'a str,
}

impl Collaborators {
    /// Housing, utility and tax estimates for `location`, or the fixed
    /// fallback when the estimator cannot be reached or answers badly.
    pub async fn location_costs(&self, location: &str) -> Estimate<LocationCosts> {
        match self.fetch_location_costs(location).await {
            Ok(costs) => Estimate::fetched(costs),
            Err(err) => {
                warn!(location, error = %err, "cost estimate unavailable, using defaults");
                Estimate::fallback(FALLBACK_LOCATION_COSTS)
            }
        }
    }

    async fn fetch_location_costs(&self, location: &str) -> Result<LocationCosts, ServiceError> {
        let url = self
            .config
            .cost_estimate_url
            .as_deref()
            .ok_or(ServiceError::NotConfigured("cost estimate"))?;
        let costs: LocationCosts = self
            .post_json(url, &CostEstimateRequest { location })
            .await?;

        for (name, value) in [
            ("housing_cost", costs.housing_cost),
            ("utility_cost", costs.utility_cost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ServiceError::InvalidValue(format!("{name}={value}")));
            }
        }
        if !(0.0..=100.0).contains(&costs.tax_rate) {
            return Err(ServiceError::InvalidValue(format!(
                "tax_rate={}",
                costs.tax_rate
            )));
        }
        Ok(costs)
    }
}
