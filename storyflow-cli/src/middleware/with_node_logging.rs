//! Extension trait for fluent API: attach node logging middleware then compile.

use std::sync::Arc;

use storyflow::{StateGraph, StoryState};

use super::logging::LoggingMiddleware;

/// Returns the same graph with `LoggingMiddleware` attached. Chain with `.compile()?`.
pub trait WithNodeLogging {
    fn with_node_logging(self) -> Self;
}

impl WithNodeLogging for StateGraph<StoryState> {
    fn with_node_logging(self) -> Self {
        self.with_middleware(Arc::new(LoggingMiddleware))
    }
}
