//! Request coordinator.
//!
//! Orchestrates validate -> cache lookup -> single-flight compute ->
//! cache store -> respond, under a single deadline. Concurrent identical
//! requests (same fingerprint) collapse onto one computation through an
//! in-flight registry of watch channels; a global semaphore bounds
//! simultaneous compute executions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{watch, Semaphore};
use tracing::{debug, info, warn};

use crate::analytics::{AnalyticsSink, CalculationEvent, CalculationOutcome};
use crate::cache::{CacheStore, CacheTtls, ResponseCache};
use crate::catalog::PortCatalog;
use crate::config::PlannerConfig;
use crate::cost::CostModel;
use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;
use crate::graph::GraphHandle;
use crate::path::{CancelToken, PathSearch, SearchLimits};
use crate::repository::PortRepository;
use crate::request::RouteCalculationRequest;
use crate::response::RouteResponse;
use crate::tables::Tables;

/// Budget for a single repository call.
const REPOSITORY_CALL_TIMEOUT: Duration = Duration::from_millis(200);

/// Queued requests beyond this are rejected outright.
const MAX_QUEUED_REQUESTS: usize = 512;

/// Cloneable outcome shared with single-flight followers.
#[derive(Debug, Clone)]
enum SharedOutcome {
    Response(Arc<RouteResponse>),
    Failed(SharedError),
}

#[derive(Debug, Clone)]
enum SharedError {
    DeadlineExceeded,
    Cancelled,
    Overloaded,
    Other(String),
}

impl SharedError {
    fn from_error(error: &Error) -> Self {
        match error {
            Error::DeadlineExceeded => SharedError::DeadlineExceeded,
            Error::Cancelled => SharedError::Cancelled,
            Error::Overloaded => SharedError::Overloaded,
            other => SharedError::Other(other.to_string()),
        }
    }

    fn into_error(self) -> Error {
        match self {
            SharedError::DeadlineExceeded => Error::DeadlineExceeded,
            SharedError::Cancelled => Error::Cancelled,
            SharedError::Overloaded => Error::Overloaded,
            SharedError::Other(message) => Error::BackendUnavailable {
                backend: "coordinator".to_string(),
                message,
            },
        }
    }
}

type InFlightMap = HashMap<String, watch::Receiver<Option<SharedOutcome>>>;

/// The request coordinator. Owns its collaborators by explicit
/// composition; one instance serves the whole process.
pub struct Coordinator {
    repository: Arc<dyn PortRepository>,
    graph: Arc<GraphHandle>,
    cost_model: CostModel,
    cache: ResponseCache,
    analytics: Arc<dyn AnalyticsSink>,
    config: PlannerConfig,
    compute_slots: Arc<Semaphore>,
    in_flight: Mutex<InFlightMap>,
    queued: AtomicUsize,
    /// Pathfinder executions actually started, for instrumentation.
    computations: AtomicU64,
}

impl Coordinator {
    pub fn new(
        repository: Arc<dyn PortRepository>,
        graph: Arc<GraphHandle>,
        tables: Arc<Tables>,
        cache_store: Arc<dyn CacheStore>,
        analytics: Arc<dyn AnalyticsSink>,
        config: PlannerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let ttls = CacheTtls {
            route: Duration::from_secs(config.route_cache_ttl_s),
            ..CacheTtls::default()
        };
        Ok(Self {
            repository,
            graph,
            cost_model: CostModel::new(tables),
            cache: ResponseCache::new(cache_store, ttls),
            analytics,
            compute_slots: Arc::new(Semaphore::new(config.max_concurrent_calculations)),
            config,
            in_flight: Mutex::new(HashMap::new()),
            queued: AtomicUsize::new(0),
            computations: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn graph_handle(&self) -> &Arc<GraphHandle> {
        &self.graph
    }

    pub fn repository(&self) -> &Arc<dyn PortRepository> {
        &self.repository
    }

    /// Number of pathfinder executions started since process start.
    pub fn computations_started(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }

    /// Rebuild the graph snapshot from a newer catalog. Serialized and
    /// atomic; on failure the previous snapshot stays live.
    pub fn rebuild_graph(&self, catalog: &PortCatalog) -> Result<()> {
        self.graph
            .rebuild(catalog, &self.config.graph_options(), self.cost_model.tables())
    }

    /// Validation-only entry point: request syntax plus port resolution.
    pub async fn validate(&self, request: &RouteCalculationRequest) -> Result<()> {
        request.validate()?;
        let fingerprint = Fingerprint::of(request);
        if let Some(true) = self.cache.get_validation(&fingerprint).await {
            return Ok(());
        }
        self.resolve_port(&request.origin).await?;
        self.resolve_port(&request.destination).await?;
        self.cache.put_validation(&fingerprint, true).await;
        Ok(())
    }

    /// Cached port lookup for the `GET /ports/{code}` surface. Serves the
    /// serialized port from the cache's 24 h lookup class when possible.
    pub async fn port_lookup(&self, code: &str) -> Result<String> {
        if let Some(raw) = self.cache.get_port_lookup(code).await {
            return Ok(raw);
        }
        let port = tokio::time::timeout(REPOSITORY_CALL_TIMEOUT, self.repository.get(code))
            .await
            .map_err(|_| Error::BackendUnavailable {
                backend: "port repository".to_string(),
                message: format!("lookup of {code} timed out"),
            })??;
        let raw = serde_json::to_string(&*port)?;
        self.cache.put_port_lookup(code, raw.clone()).await;
        Ok(raw)
    }

    /// Full calculation entry point.
    pub async fn calculate(
        &self,
        request: RouteCalculationRequest,
        request_id: &str,
    ) -> Result<RouteResponse> {
        let started = Instant::now();
        let deadline = self.deadline_for(&request);
        if deadline.is_zero() {
            return Err(Error::DeadlineExceeded);
        }

        request.validate()?;
        self.resolve_port(&request.origin).await?;
        self.resolve_port(&request.destination).await?;

        let fingerprint = Fingerprint::of(&request);
        if let Some(response) = self.cache.get_route(&fingerprint).await {
            debug!(fingerprint = %fingerprint, "route cache hit");
            self.emit(&request, request_id, &fingerprint, &response, CalculationOutcome::CacheHit, started);
            return Ok(response);
        }

        // Single-flight: attach to an in-flight computation when one
        // exists, otherwise register as its leader.
        let slot = {
            let mut registry = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(receiver) = registry.get(fingerprint.as_hex()) {
                InFlightSlot::Follower(receiver.clone())
            } else {
                let (sender, receiver) = watch::channel(None);
                registry.insert(fingerprint.as_hex().to_string(), receiver);
                InFlightSlot::Leader(sender, InFlightGuard {
                    coordinator: self,
                    key: fingerprint.as_hex().to_string(),
                })
            }
        };
        let (sender, guard) = match slot {
            InFlightSlot::Follower(receiver) => {
                return self.await_leader(receiver, started, deadline).await;
            }
            InFlightSlot::Leader(sender, guard) => (sender, guard),
        };

        let result = self
            .compute(&request, request_id, &fingerprint, started, deadline)
            .await;

        match &result {
            Ok(response) => {
                let _ = sender.send(Some(SharedOutcome::Response(Arc::new(response.clone()))));
            }
            Err(error) => {
                let _ = sender.send(Some(SharedOutcome::Failed(SharedError::from_error(error))));
            }
        }
        drop(guard);
        result
    }

    /// Wait on the leader's outcome, bounded by this request's deadline.
    async fn await_leader(
        &self,
        mut receiver: watch::Receiver<Option<SharedOutcome>>,
        started: Instant,
        deadline: Duration,
    ) -> Result<RouteResponse> {
        let remaining = deadline.saturating_sub(started.elapsed());
        let outcome = tokio::time::timeout(remaining, receiver.wait_for(|v| v.is_some())).await;
        match outcome {
            Ok(Ok(value)) => match (*value).clone().expect("wait_for guarantees Some") {
                SharedOutcome::Response(response) => Ok((*response).clone()),
                SharedOutcome::Failed(error) => Err(error.into_error()),
            },
            // The leader vanished without publishing (cancelled); the entry
            // is already removed, so the caller may retry.
            Ok(Err(_)) => Err(Error::Cancelled),
            Err(_) => Err(Error::DeadlineExceeded),
        }
    }

    async fn compute(
        &self,
        request: &RouteCalculationRequest,
        request_id: &str,
        fingerprint: &Fingerprint,
        started: Instant,
        deadline: Duration,
    ) -> Result<RouteResponse> {
        // Concurrency ceiling: bounded queue, then a slot wait budget.
        if self.queued.fetch_add(1, Ordering::SeqCst) >= MAX_QUEUED_REQUESTS {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::Overloaded);
        }
        let slot_wait = Duration::from_secs_f64(self.config.overload_wait_s)
            .min(deadline.saturating_sub(started.elapsed()));
        let permit =
            match tokio::time::timeout(slot_wait, self.compute_slots.clone().acquire_owned()).await
            {
                Ok(Ok(permit)) => permit,
                Ok(Err(_)) | Err(_) => {
                    self.queued.fetch_sub(1, Ordering::SeqCst);
                    return Err(Error::Overloaded);
                }
            };
        self.queued.fetch_sub(1, Ordering::SeqCst);

        let graph = self.graph.snapshot();
        let cancel = CancelToken::new();
        let limits = SearchLimits {
            max_intermediate_ports: request.max_connecting_ports,
            cancel_check_interval: self.config.pathfinder_cancel_check_interval,
        };
        let cost_model = self.cost_model.clone();
        let vessel = request.vessel.clone();
        let criterion = request.optimization;
        let origin = request.origin.clone();
        let destination = request.destination.clone();
        let departure = request.departure_time;
        let k = request.max_alternative_routes + 1;
        let ratio = self.config.pathfinder_alt_cost_ratio;
        let search_cancel = cancel.clone();

        self.computations.fetch_add(1, Ordering::SeqCst);
        let worker = tokio::task::spawn_blocking(move || -> Result<ComputeOutput> {
            let _permit = permit;
            let Some(origin_node) = graph.node_by_code(&origin) else {
                return Ok(ComputeOutput::no_route(vec![format!(
                    "origin {origin} is not in the routing graph"
                )]));
            };
            let Some(destination_node) = graph.node_by_code(&destination) else {
                return Ok(ComputeOutput::no_route(vec![format!(
                    "destination {destination} is not in the routing graph"
                )]));
            };

            let search = PathSearch::new(
                &graph,
                &cost_model,
                &vessel,
                criterion,
                limits,
                search_cancel,
            );
            let algorithm = search.algorithm();
            let found = search.top_k(origin_node, destination_node, k, ratio)?;
            if found.paths.is_empty() {
                return Ok(ComputeOutput {
                    routes: Vec::new(),
                    algorithm,
                    candidates_evaluated: found.candidates_evaluated,
                    diagnostics: vec![format!(
                        "no feasible route from {origin} to {destination} under the submitted vessel constraints"
                    )],
                });
            }

            let assembler =
                crate::assemble::RouteAssembler::new(&graph, &cost_model, &vessel, criterion, departure);
            let routes = found.paths.iter().map(|path| assembler.assemble(path)).collect();
            Ok(ComputeOutput {
                routes,
                algorithm,
                candidates_evaluated: found.candidates_evaluated,
                diagnostics: Vec::new(),
            })
        });

        let remaining = deadline.saturating_sub(started.elapsed());
        let output: ComputeOutput = tokio::select! {
            joined = worker => match joined {
                Ok(result) => result?,
                Err(join_error) => {
                    warn!(%join_error, "compute task failed");
                    return Err(Error::BackendUnavailable {
                        backend: "pathfinder".to_string(),
                        message: join_error.to_string(),
                    });
                }
            },
            _ = tokio::time::sleep(remaining) => {
                cancel.cancel();
                return Err(Error::DeadlineExceeded);
            }
        };

        let mut routes = output.routes.into_iter();
        let primary = routes.next();
        let response = RouteResponse {
            request_id: request_id.to_string(),
            generated_at: Utc::now(),
            calculation_ms: started.elapsed().as_millis() as u64,
            primary_route: primary,
            alternatives: routes.collect(),
            algorithm: output.algorithm.to_string(),
            criterion,
            candidates_evaluated: output.candidates_evaluated,
            cache_hit: false,
            diagnostics: output.diagnostics,
        };

        let outcome = if response.primary_route.is_some() {
            self.cache.put_route(fingerprint, &response).await;
            CalculationOutcome::Computed
        } else {
            CalculationOutcome::NoRoute
        };

        info!(
            request_id,
            fingerprint = %fingerprint,
            algorithm = %response.algorithm,
            routes = response.alternatives.len() + usize::from(response.primary_route.is_some()),
            candidates = response.candidates_evaluated,
            duration_ms = response.calculation_ms,
            "route calculation finished"
        );
        self.emit(request, request_id, fingerprint, &response, outcome, started);
        Ok(response)
    }

    fn deadline_for(&self, request: &RouteCalculationRequest) -> Duration {
        let default = self.config.default_request_timeout_s;
        let seconds = request
            .timeout_s
            .map(|timeout| timeout.min(default))
            .unwrap_or(default)
            .max(0.0);
        Duration::from_secs_f64(seconds)
    }

    /// Resolve a port code and require it to accept traffic.
    async fn resolve_port(&self, code: &str) -> Result<Arc<crate::port::Port>> {
        let port = tokio::time::timeout(REPOSITORY_CALL_TIMEOUT, self.repository.get(code))
            .await
            .map_err(|_| Error::BackendUnavailable {
                backend: "port repository".to_string(),
                message: format!("lookup of {code} timed out"),
            })??;
        if !port.status.accepts_traffic() {
            return Err(Error::PortNotFound {
                code: code.to_string(),
                suggestions: Vec::new(),
            });
        }
        Ok(port)
    }

    fn emit(
        &self,
        request: &RouteCalculationRequest,
        request_id: &str,
        fingerprint: &Fingerprint,
        response: &RouteResponse,
        outcome: CalculationOutcome,
        started: Instant,
    ) {
        self.analytics.emit(CalculationEvent {
            request_id: request_id.to_string(),
            fingerprint: fingerprint.as_hex().to_string(),
            origin: request.origin.clone(),
            destination: request.destination.clone(),
            criterion: request.optimization,
            outcome,
            duration_ms: started.elapsed().as_millis() as u64,
            routes_returned: response.alternatives.len()
                + usize::from(response.primary_route.is_some()),
            candidates_evaluated: response.candidates_evaluated,
        });
    }
}

struct ComputeOutput {
    routes: Vec<crate::response::DetailedRoute>,
    algorithm: &'static str,
    candidates_evaluated: usize,
    diagnostics: Vec<String>,
}

impl ComputeOutput {
    fn no_route(diagnostics: Vec<String>) -> Self {
        Self {
            routes: Vec::new(),
            algorithm: "dijkstra",
            candidates_evaluated: 0,
            diagnostics,
        }
    }
}

/// Outcome of checking the in-flight registry: either attach to an
/// existing computation, or register as its leader.
enum InFlightSlot<'a> {
    Follower(watch::Receiver<Option<SharedOutcome>>),
    Leader(watch::Sender<Option<SharedOutcome>>, InFlightGuard<'a>),
}

/// Removes the in-flight entry on drop, success or failure, so a
/// cancelled computation never poisons the registry.
struct InFlightGuard<'a> {
    coordinator: &'a Coordinator,
    key: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.coordinator
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}
