use async_trait::async_trait;
use thiserror::Error;

use crate::report::ReportTarget;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Route not found: {0}")]
    NotFound(String),

    #[error("Failed to start route {route_id}: {reason}")]
    StartFailed { route_id: String, reason: String },
}

/// Hook into the orchestration engine that releases downstream delivery.
#[async_trait]
pub trait RouteController: Send + Sync {
    /// Starts the route with the given id.
    async fn start_route(&self, route_id: &str) -> Result<(), RouteError>;
}

/// Id of the delivery route for a (location, institution) pair.
pub fn route_id(target: &ReportTarget, suffix: &str) -> String {
    format!(
        "{}{}{}",
        target.location_code, target.institution_code, suffix
    )
}
