//! Application state shared by all handlers.

use std::sync::Arc;

use searoute_lib::Coordinator;

/// Shared state for axum handlers. Cheaply cloneable; the coordinator owns
/// every collaborator (repository, graph handle, cache, analytics) by
/// explicit composition.
#[derive(Clone)]
pub struct AppState {
    coordinator: Arc<Coordinator>,
}

impl AppState {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let graph = self.coordinator.graph_handle().snapshot();
        f.debug_struct("AppState")
            .field("graph_nodes", &graph.node_count())
            .field("graph_edges", &graph.edge_count())
            .field("catalog_version", &graph.catalog_version())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::test_state;

    #[test]
    fn state_is_cloneable_and_debuggable() {
        let state = test_state();
        let clone = state.clone();
        let rendered = format!("{:?}", clone);
        assert!(rendered.contains("graph_nodes"));
        assert!(rendered.contains("catalog_version"));
    }
}
