//! Client for the external meal recommender backend
//!
//! The backend picks recipes for a free-text goal; this side only validates
//! the request and relays the JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const MIN_MEALS: u32 = 1;
pub const MAX_MEALS: u32 = 10;

#[derive(Debug, Error)]
pub enum RecommenderError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Recommender backend returned {status}: {body}")]
    Backend { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendRequest {
    pub goal: String,
    #[serde(rename = "numMeals")]
    pub num_meals: u32,
}

impl RecommendRequest {
    /// Trim the goal and check the meal count against the backend's limits
    pub fn new(goal: &str, num_meals: u32) -> Result<Self, RecommenderError> {
        let goal = goal.trim();
        if goal.is_empty() {
            return Err(RecommenderError::InvalidRequest("Goal cannot be empty".to_string()));
        }
        if !(MIN_MEALS..=MAX_MEALS).contains(&num_meals) {
            return Err(RecommenderError::InvalidRequest(format!(
                "numMeals must be between {} and {}, got {}",
                MIN_MEALS, MAX_MEALS, num_meals
            )));
        }
        Ok(Self {
            goal: goal.to_string(),
            num_meals,
        })
    }
}

/// Meal plan as returned by the backend; recipe objects are passed through untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub goal_expanded: String,
    pub recipes: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Clone)]
pub struct RecommenderClient {
    http: reqwest::Client,
    base_url: String,
}

impl RecommenderClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RecommenderError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the backend for a meal plan
    pub async fn recommend(&self, request: &RecommendRequest) -> Result<RecommendResponse, RecommenderError> {
        let url = format!("{}/recommender", self.base_url);
        info!(goal = %request.goal, num_meals = request.num_meals, "Requesting meal plan");

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecommenderError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let plan: RecommendResponse = response.json().await?;
        debug!(recipes = plan.recipes.len(), "Received meal plan");
        Ok(plan)
    }

    /// Backend liveness probe
    pub async fn health(&self) -> Result<HealthResponse, RecommenderError> {
        let url = format!("{}/health", self.base_url);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecommenderError::Backend {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let request = RecommendRequest::new("  lose weight  ", 3).unwrap();
        assert_eq!(request.goal, "lose weight");

        assert!(matches!(
            RecommendRequest::new("   ", 3),
            Err(RecommenderError::InvalidRequest(_))
        ));
        assert!(RecommendRequest::new("bulk", 0).is_err());
        assert!(RecommendRequest::new("bulk", 11).is_err());
        assert!(RecommendRequest::new("bulk", 10).is_ok());
    }

    #[test]
    fn test_request_uses_backend_field_names() {
        let request = RecommendRequest::new("more protein", 2).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"goal": "more protein", "numMeals": 2}));
    }

    #[test]
    fn test_response_passes_recipes_through() {
        let body = r#"{"goal_expanded": "high protein", "recipes": [{"id": 4, "name": "Tofu", "reason": "lean"}]}"#;
        let plan: RecommendResponse = serde_json::from_str(body).unwrap();
        assert_eq!(plan.goal_expanded, "high protein");
        assert_eq!(plan.recipes[0]["reason"], "lean");
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = RecommenderClient::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
