//! Recommender MCP Tool

use serde::Serialize;

use crate::recommender::{RecommendRequest, RecommendResponse, RecommenderClient};

#[derive(Debug, Serialize)]
pub struct BackendHealthResponse {
    pub backend_url: String,
    pub reachable: bool,
    pub status: Option<String>,
    pub error: Option<String>,
}

/// Validate the goal and meal count, then ask the backend for a plan
pub async fn recommend_meals(
    client: &RecommenderClient,
    goal: &str,
    num_meals: u32,
) -> Result<RecommendResponse, String> {
    let request = RecommendRequest::new(goal, num_meals).map_err(|e| e.to_string())?;
    client
        .recommend(&request)
        .await
        .map_err(|e| format!("Failed to get recommendations: {}", e))
}

/// Probe the backend; an unreachable backend is reported, not raised
pub async fn recommender_health(client: &RecommenderClient) -> BackendHealthResponse {
    let backend_url = client.base_url().to_string();
    match client.health().await {
        Ok(health) => BackendHealthResponse {
            backend_url,
            reachable: true,
            status: Some(health.status),
            error: None,
        },
        Err(e) => BackendHealthResponse {
            backend_url,
            reachable: false,
            status: None,
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_invalid_request_never_reaches_backend() {
        // Nothing listens on port 9; a request that got this far would fail with an HTTP error
        let client = RecommenderClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();

        let err = recommend_meals(&client, "  ", 3).await.unwrap_err();
        assert!(err.contains("Goal cannot be empty"));

        let err = recommend_meals(&client, "bulk", 0).await.unwrap_err();
        assert!(err.contains("numMeals"));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let client = RecommenderClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = recommend_meals(&client, "bulk", 2).await.unwrap_err();
        assert!(err.starts_with("Failed to get recommendations"));

        let health = recommender_health(&client).await;
        assert!(!health.reachable);
        assert!(health.error.is_some());
    }
}
