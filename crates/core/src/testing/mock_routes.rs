//! Mock route controller for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::coordinator::{RouteController, RouteError};

/// Mock implementation of the RouteController trait.
///
/// Records every route start so tests can assert the delivery route was
/// released exactly once per completed sequence.
#[derive(Debug, Clone, Default)]
pub struct MockRouteController {
    started: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<RouteError>>>,
}

impl MockRouteController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route ids started so far, in order.
    pub async fn started_routes(&self) -> Vec<String> {
        self.started.read().await.clone()
    }

    /// Configure the next start to fail with the given error.
    pub async fn set_next_error(&self, error: RouteError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl RouteController for MockRouteController {
    async fn start_route(&self, route_id: &str) -> Result<(), RouteError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        self.started.write().await.push(route_id.to_string());
        Ok(())
    }
}
