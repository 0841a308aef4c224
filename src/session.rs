//! In-memory route planning session.
//!
//! Holds the working route, the optional start and end anchors, derived
//! path and analytics, saved route snapshots and the current options.
//! Optimization runs on the rayon pool; results are tagged with the session
//! generation at the time the run started and are dropped if the session has
//! changed since.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analytics::RouteAnalytics;
use crate::destination::detect_final_destination;
use crate::error::{PlannerError, Result};
use crate::export::{self, DEFAULT_ROUTE_NAME, ExportFormat};
use crate::maps;
use crate::options::RouteOptions;
use crate::solver::{CancelFlag, Strategy};
use crate::solver::nearest_neighbor::nearest_neighbor;
use crate::stop::{Stop, StopId};
use crate::traits::StopSource;

/// Identifier of a saved route: creation time in milliseconds, kept strictly
/// increasing within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedRouteId(pub i64);

/// Named snapshot of a working route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRoute {
    pub id: SavedRouteId,
    pub name: String,
    pub locations: Vec<Stop>,
    pub created_at: DateTime<Utc>,
    pub total_distance_km: f64,
    pub estimated_time_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Optimizing,
}

/// What happened to a finished optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationOutcome {
    /// The strategy's route replaced the working route.
    Applied { strategy: Strategy },
    /// The run timed out; the working route was ordered by nearest neighbor
    /// instead.
    FellBack { strategy: Strategy },
    /// The worker failed; the working route was left as it was.
    Failed { strategy: Strategy },
    /// The session changed or the run was abandoned; nothing was applied.
    Discarded,
}

/// Handle for a run started with [`RouteSession::begin_optimization`].
#[derive(Debug)]
pub struct OptimizationTicket {
    run_id: u64,
    generation: u64,
    strategy: Strategy,
    snapshot: Vec<Stop>,
    started_at: Instant,
    timeout: Duration,
    cancel: CancelFlag,
    receiver: Receiver<Vec<Stop>>,
}

impl OptimizationTicket {
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.started_at.elapsed())
    }
}

impl Drop for OptimizationTicket {
    // Nobody can collect the result any more; let the worker stop early.
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// The run a session is currently waiting for.
#[derive(Debug)]
struct PendingRun {
    id: u64,
    cancel: CancelFlag,
}

enum RunResult {
    Finished(Vec<Stop>),
    TimedOut,
    WorkerFailed,
}

#[derive(Debug, Default)]
pub struct RouteSession {
    route: Vec<Stop>,
    final_destination: Option<Stop>,
    current_location: Option<Stop>,
    complete_path: Vec<Stop>,
    analytics: RouteAnalytics,
    saved_routes: Vec<SavedRoute>,
    options: RouteOptions,
    generation: u64,
    pending_run: Option<PendingRun>,
    next_run_id: u64,
    last_saved_id: Option<SavedRouteId>,
    last_error: Option<String>,
}

impl RouteSession {
    pub fn new(options: RouteOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    /// The working route in its current order.
    pub fn route(&self) -> &[Stop] {
        &self.route
    }

    /// Current location, working route and final destination, in order.
    pub fn complete_path(&self) -> &[Stop] {
        &self.complete_path
    }

    pub fn analytics(&self) -> RouteAnalytics {
        self.analytics
    }

    pub fn final_destination(&self) -> Option<&Stop> {
        self.final_destination.as_ref()
    }

    pub fn current_location(&self) -> Option<&Stop> {
        self.current_location.as_ref()
    }

    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    pub fn status(&self) -> SessionStatus {
        if self.pending_run.is_some() {
            SessionStatus::Optimizing
        } else {
            SessionStatus::Idle
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn saved_routes(&self) -> &[SavedRoute] {
        &self.saved_routes
    }

    pub fn saved_route(&self, id: SavedRouteId) -> Option<&SavedRoute> {
        self.saved_routes.iter().find(|route| route.id == id)
    }

    // ------------------------------------------------------------------
    // Working route edits
    // ------------------------------------------------------------------

    /// Adds a stop unless one with the same id is already on the route.
    pub fn add_to_working_route(&mut self, stop: Stop) -> bool {
        if self.route.iter().any(|existing| existing.id() == stop.id()) {
            return false;
        }

        debug!(stop = %stop.id(), "stop added to route");
        self.route.push(stop);
        if self.route.len() > self.options.max_stops {
            warn!(
                stops = self.route.len(),
                max_stops = self.options.max_stops,
                "working route exceeds configured max stops"
            );
        }
        self.touch();
        true
    }

    /// Looks the stop up in `source` and adds it. `false` if it is unknown or
    /// already on the route.
    pub fn add_stop_by_id<S>(&mut self, source: &S, id: StopId) -> bool
    where
        S: StopSource + ?Sized,
    {
        match source.stop_by_id(id) {
            Some(stop) => self.add_to_working_route(stop),
            None => {
                self.last_error = Some(format!("location {} not found", id));
                false
            }
        }
    }

    pub fn remove_from_working_route(&mut self, id: StopId) -> bool {
        let before = self.route.len();
        self.route.retain(|stop| stop.id() != id);
        let removed = self.route.len() != before;
        if removed {
            debug!(stop = %id, "stop removed from route");
            self.touch();
        }
        removed
    }

    /// Empties the working route, final destination and complete path and
    /// abandons any in-flight optimization. The current location is kept for
    /// the next route.
    pub fn clear(&mut self) {
        self.route.clear();
        self.final_destination = None;
        self.abandon_pending_run();
        self.touch();
    }

    pub fn set_final_destination(&mut self, stop: Stop) {
        debug!(stop = %stop.id(), "final destination set");
        self.final_destination = Some(stop);
        self.touch();
    }

    pub fn clear_final_destination(&mut self) {
        if self.final_destination.take().is_some() {
            self.touch();
        }
    }

    /// Picks a final destination from the working route and sets it.
    pub fn detect_final_destination(&mut self) -> Option<&Stop> {
        let detected = detect_final_destination(&self.route)?;
        self.set_final_destination(detected);
        self.final_destination.as_ref()
    }

    pub fn set_current_location(
        &mut self,
        latitude: f64,
        longitude: f64,
        address: impl Into<String>,
    ) -> Result<()> {
        self.current_location = Some(Stop::current_location(latitude, longitude, address)?);
        self.touch();
        Ok(())
    }

    pub fn clear_current_location(&mut self) {
        if self.current_location.take().is_some() {
            self.touch();
        }
    }

    /// Replaces the options used by the next optimization run.
    pub fn set_options(&mut self, options: RouteOptions) -> Result<()> {
        options.validate()?;
        info!(
            strategy = ?options.strategy,
            optimize_for = ?options.optimize_for,
            "route options updated"
        );
        self.options = options;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Saved routes
    // ------------------------------------------------------------------

    /// Snapshots the working route under a fresh id.
    pub fn save_route(&mut self, name: &str) -> SavedRouteId {
        let created_at = Utc::now();
        let mut id = SavedRouteId(created_at.timestamp_millis());
        if let Some(last) = self.last_saved_id {
            if id <= last {
                id = SavedRouteId(last.0 + 1);
            }
        }
        self.last_saved_id = Some(id);

        let name = name.trim();
        let name = if name.is_empty() {
            format!("Route {}", self.saved_routes.len() + 1)
        } else {
            name.to_string()
        };

        info!(id = id.0, name = %name, stops = self.route.len(), "route saved");
        self.saved_routes.push(SavedRoute {
            id,
            name,
            locations: self.route.clone(),
            created_at,
            total_distance_km: self.analytics.total_distance_km,
            estimated_time_minutes: self.analytics.estimated_time_minutes,
        });
        id
    }

    /// Replaces the working route with a saved one. Unknown ids are ignored.
    pub fn load_route(&mut self, id: SavedRouteId) -> bool {
        let Some(saved) = self.saved_route(id) else {
            debug!(id = id.0, "load of unknown saved route ignored");
            return false;
        };
        self.route = saved.locations.clone();
        info!(id = id.0, stops = self.route.len(), "saved route loaded");
        self.touch();
        true
    }

    /// Removes a saved route. Unknown ids are ignored.
    pub fn delete_route(&mut self, id: SavedRouteId) -> bool {
        let before = self.saved_routes.len();
        self.saved_routes.retain(|route| route.id != id);
        self.saved_routes.len() != before
    }

    // ------------------------------------------------------------------
    // Outputs
    // ------------------------------------------------------------------

    pub fn export(&self, format: ExportFormat) -> Result<String> {
        export::export(&self.complete_path, format, DEFAULT_ROUTE_NAME)
    }

    pub fn export_named(&self, format: ExportFormat, route_name: &str) -> Result<String> {
        export::export(&self.complete_path, format, route_name)
    }

    pub fn maps_url(&self) -> Result<Option<Url>> {
        maps::directions_url(&self.complete_path)
    }

    // ------------------------------------------------------------------
    // Optimization
    // ------------------------------------------------------------------

    /// Starts ordering the working route in the background with the current
    /// options.
    pub fn begin_optimization(&mut self) -> Result<OptimizationTicket> {
        let strategy = self.options.strategy;
        let cost = self.options.cost_model();
        let seed = self.options.seed;

        self.spawn_run(strategy, move |stops, cancel| {
            let mut rng = match seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_entropy(),
            };
            strategy.optimize_until(stops, &cost, &mut rng, cancel)
        })
    }

    /// Runs `job` over a snapshot of the stops to optimize on the rayon pool.
    fn spawn_run<F>(&mut self, strategy: Strategy, job: F) -> Result<OptimizationTicket>
    where
        F: FnOnce(&[Stop], &CancelFlag) -> Vec<Stop> + Send + 'static,
    {
        if self.pending_run.is_some() {
            return Err(PlannerError::OptimizationInProgress);
        }

        let run_id = self.next_run_id;
        self.next_run_id += 1;
        let cancel = CancelFlag::default();
        self.pending_run = Some(PendingRun {
            id: run_id,
            cancel: cancel.clone(),
        });

        let snapshot = self.stops_to_optimize();
        let (sender, receiver) = mpsc::channel();

        let stops = snapshot.clone();
        let worker_cancel = cancel.clone();
        rayon::spawn(move || {
            let run = panic::catch_unwind(AssertUnwindSafe(|| job(&stops, &worker_cancel)));
            match run {
                Ok(route) => {
                    // The session may have dropped the ticket already.
                    let _ = sender.send(route);
                }
                Err(_) => warn!(run_id, "optimization worker panicked"),
            }
        });

        info!(
            run_id,
            generation = self.generation,
            ?strategy,
            stops = snapshot.len(),
            "optimization started"
        );
        Ok(OptimizationTicket {
            run_id,
            generation: self.generation,
            strategy,
            snapshot,
            started_at: Instant::now(),
            timeout: self.options.timeout(),
            cancel,
            receiver,
        })
    }

    /// Waits for the run behind `ticket` (up to the configured timeout) and
    /// applies its result if the session has not changed in the meantime.
    pub fn complete_optimization(&mut self, ticket: OptimizationTicket) -> OptimizationOutcome {
        if !self.is_pending(ticket.run_id) {
            return OptimizationOutcome::Discarded;
        }
        let result = match ticket.receiver.recv_timeout(ticket.remaining()) {
            Ok(route) => RunResult::Finished(route),
            Err(RecvTimeoutError::Timeout) => RunResult::TimedOut,
            Err(RecvTimeoutError::Disconnected) => RunResult::WorkerFailed,
        };
        self.finish(&ticket, result)
    }

    /// Non-blocking check on a run. `None` while it is still working and
    /// within its timeout.
    pub fn poll_optimization(
        &mut self,
        ticket: &OptimizationTicket,
    ) -> Option<OptimizationOutcome> {
        if !self.is_pending(ticket.run_id) {
            return Some(OptimizationOutcome::Discarded);
        }
        let result = match ticket.receiver.try_recv() {
            Ok(route) => RunResult::Finished(route),
            Err(TryRecvError::Disconnected) => RunResult::WorkerFailed,
            Err(TryRecvError::Empty) if ticket.remaining().is_zero() => RunResult::TimedOut,
            Err(TryRecvError::Empty) => return None,
        };
        Some(self.finish(ticket, result))
    }

    /// Abandons the in-flight run; its result will be discarded.
    pub fn cancel_optimization(&mut self) {
        self.abandon_pending_run();
    }

    fn abandon_pending_run(&mut self) {
        if let Some(run) = self.pending_run.take() {
            run.cancel.cancel();
            debug!(run_id = run.id, "in-flight optimization abandoned");
        }
    }

    fn is_pending(&self, run_id: u64) -> bool {
        self.pending_run.as_ref().is_some_and(|run| run.id == run_id)
    }

    /// Runs the configured strategy and waits for it.
    pub fn optimize(&mut self) -> Result<OptimizationOutcome> {
        let ticket = self.begin_optimization()?;
        Ok(self.complete_optimization(ticket))
    }

    fn finish(&mut self, ticket: &OptimizationTicket, result: RunResult) -> OptimizationOutcome {
        if !self.is_pending(ticket.run_id) {
            debug!(run_id = ticket.run_id, "result of abandoned optimization discarded");
            return OptimizationOutcome::Discarded;
        }
        self.pending_run = None;
        // A timed-out worker is still searching; stop it so it frees its
        // pool thread.
        ticket.cancel.cancel();

        if ticket.generation != self.generation {
            warn!(
                run_id = ticket.run_id,
                run_generation = ticket.generation,
                session_generation = self.generation,
                "route changed during optimization, result discarded"
            );
            return OptimizationOutcome::Discarded;
        }

        let strategy = ticket.strategy;
        let (ordered, outcome) = match result {
            RunResult::Finished(route) => (route, OptimizationOutcome::Applied { strategy }),
            RunResult::TimedOut => {
                warn!(
                    run_id = ticket.run_id,
                    ?strategy,
                    "optimization timed out, using nearest neighbor"
                );
                self.last_error = Some(format!(
                    "{} took too long; route ordered by nearest neighbor instead",
                    strategy.label()
                ));
                (nearest_neighbor(&ticket.snapshot), OptimizationOutcome::FellBack { strategy })
            }
            RunResult::WorkerFailed => {
                self.last_error =
                    Some(format!("Failed to generate route with {}", strategy.label()));
                return OptimizationOutcome::Failed { strategy };
            }
        };

        // The final destination is kept out of the optimized part and stays
        // on the working route after it.
        let anchored = self.final_destination.as_ref().and_then(|destination| {
            self.route
                .iter()
                .find(|stop| stop.id() == destination.id())
                .cloned()
        });
        self.route = ordered;
        self.route.extend(anchored);
        self.touch();

        info!(
            run_id = ticket.run_id,
            ?outcome,
            stops = self.route.len(),
            "optimization applied"
        );
        outcome
    }

    /// Working route without the final destination.
    fn stops_to_optimize(&self) -> Vec<Stop> {
        let final_id = self.final_destination.as_ref().map(Stop::id);
        self.route
            .iter()
            .filter(|stop| Some(stop.id()) != final_id)
            .cloned()
            .collect()
    }

    /// Bumps the generation and rebuilds the derived path and analytics.
    ///
    /// With nothing to visit the path is empty, even if a current location
    /// is known.
    fn touch(&mut self) {
        self.generation += 1;

        let mut path = Vec::with_capacity(self.route.len() + 2);
        if !self.route.is_empty() || self.final_destination.is_some() {
            path.extend(self.current_location.iter().cloned());
            path.extend(self.stops_to_optimize());
            path.extend(self.final_destination.iter().cloned());
        }

        self.analytics = RouteAnalytics::compute(&path);
        self.complete_path = path;
    }
}
