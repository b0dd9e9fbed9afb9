//! Parallel compute backend for planning batches.
//!
//! A batch is a fixed-layout slice of requests; results come back in the same
//! order, one per request. Lanes share nothing but the read-only tuning.

use std::sync::Arc;

use crossbeam_channel::Sender;
use log::{error, info};
use rayon::prelude::*;

use salvo_core::config::PlannerTuning;
use salvo_core::error::BackendError;
use salvo_core::planning::{PlanningRequest, PlanningResult};

use crate::planner::plan;

/// A batch handed to the backend without waiting for it.
#[derive(Debug, Clone)]
pub struct PlanningJob {
    pub batch_id: u64,
    pub requests: Vec<PlanningRequest>,
    pub tuning: Arc<PlannerTuning>,
}

/// Results for a [`PlanningJob`], index-aligned with its requests.
#[derive(Debug, Clone)]
pub struct PlanningReply {
    pub batch_id: u64,
    pub results: Vec<PlanningResult>,
}

/// Batched-parallel execution facility for the planner.
pub trait ComputeBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Number of parallel lanes.
    fn lanes(&self) -> usize;

    /// Plan a batch and wait for it.
    fn execute(&self, requests: &[PlanningRequest], tuning: &PlannerTuning) -> Vec<PlanningResult>;

    /// Plan a batch in the background and send the reply when done.
    fn submit(&self, job: PlanningJob, reply: Sender<PlanningReply>);
}

/// Work-stealing thread pool backend.
pub struct RayonBackend {
    pool: rayon::ThreadPool,
}

impl RayonBackend {
    /// `threads` = 0 sizes the pool to the machine.
    pub fn new(threads: usize) -> Result<Self, BackendError> {
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("salvo-plan-{i}"));
        if threads > 0 {
            builder = builder.num_threads(threads);
        }
        let pool = builder
            .build()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        info!("planning backend up with {} lanes", pool.current_num_threads());
        Ok(Self { pool })
    }
}

impl ComputeBackend for RayonBackend {
    fn name(&self) -> &str {
        "rayon"
    }

    fn lanes(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn execute(&self, requests: &[PlanningRequest], tuning: &PlannerTuning) -> Vec<PlanningResult> {
        self.pool
            .install(|| requests.par_iter().map(|req| plan(req, tuning)).collect())
    }

    fn submit(&self, job: PlanningJob, reply: Sender<PlanningReply>) {
        self.pool.spawn(move || {
            let results = job
                .requests
                .par_iter()
                .map(|req| plan(req, &job.tuning))
                .collect();
            let batch_id = job.batch_id;
            if reply.send(PlanningReply { batch_id, results }).is_err() {
                error!("planning reply for batch {batch_id} lost: result queue closed");
            }
        });
    }
}
