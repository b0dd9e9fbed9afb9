//! Planning scheduler.
//!
//! Owns the planning clock and the single in-flight batch. Each scheduling
//! tick it polls for a finished batch, then, if due and idle, derives the
//! next period from time-to-impact, collects validated state, grows
//! continuation points, agrees coordinated impact times and dispatches one
//! batch to the compute backend.
//!
//! In `Synchronous` mode the batch is awaited and merged inside the same
//! tick. In `Pipelined` mode it is merged on a later tick, when the reply
//! shows up on the result queue; guidance keeps running meanwhile.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use hecs::World;
use log::{debug, error, warn};

use salvo_core::config::{PlannerTuning, SalvoConfig, SchedulerTuning};
use salvo_core::enums::{ArchetypeKind, PlanningMode};
use salvo_core::events::SalvoEvent;
use salvo_core::planning::PlanningRequest;
use salvo_core::sequence::WaypointSequence;
use salvo_core::state::PlanningView;
use salvo_planner::intercept::time_to_impact;
use salvo_planner::{earliest_arrival, ComputeBackend, PlanningJob, PlanningReply};

use crate::systems::collector::{self, Collected};
use crate::systems::continuation::continuation_point;
use crate::systems::merge::{self, Dispatched};
use crate::world_setup::planning_request;

/// Slack when comparing simulated time against the next due time (seconds).
const DUE_EPSILON: f64 = 1e-6;

/// Planning period for the smallest time-to-impact in the batch.
///
/// Step function: 1 Hz at or above `slow_tti`, 2 Hz at or above
/// `medium_tti`, 3 Hz below that, never faster than `max_rate_hz`.
/// No closing munition at all plans at 1 Hz.
pub fn period_for(min_time_to_impact: Option<f64>, tuning: &SchedulerTuning) -> f64 {
    let rate: f64 = match min_time_to_impact {
        None => 1.0,
        Some(tti) if tti >= tuning.slow_tti => 1.0,
        Some(tti) if tti >= tuning.medium_tti => 2.0,
        Some(_) => 3.0,
    };
    1.0 / rate.min(tuning.max_rate_hz)
}

/// A batch handed to a pipelined backend and not yet merged.
struct InFlight {
    batch_id: u64,
    dispatched: Vec<Dispatched>,
}

pub struct Scheduler {
    config: Arc<SalvoConfig>,
    planner: Arc<PlannerTuning>,
    backend: Arc<dyn ComputeBackend>,
    period: f64,
    next_due: f64,
    in_flight: Option<InFlight>,
    reply_tx: Sender<PlanningReply>,
    reply_rx: Receiver<PlanningReply>,
    next_batch_id: u64,
    /// Absolute impact time (simulated seconds) agreed per coordination group.
    group_impacts: HashMap<u32, f64>,
    batches_dispatched: u64,
    last_batch_size: usize,
    min_time_to_impact: Option<f64>,
}

impl Scheduler {
    pub fn new(config: Arc<SalvoConfig>, backend: Arc<dyn ComputeBackend>) -> Self {
        // One slot is enough: at most one batch is ever in flight.
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let planner = Arc::new(config.planner.clone());
        Self {
            config,
            planner,
            backend,
            period: 1.0,
            next_due: 0.0,
            in_flight: None,
            reply_tx,
            reply_rx,
            next_batch_id: 0,
            group_impacts: HashMap::new(),
            batches_dispatched: 0,
            last_batch_size: 0,
            min_time_to_impact: None,
        }
    }

    /// Current planning period (seconds).
    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Agreed absolute impact time for a coordination group, if any.
    pub fn group_impact_time(&self, group: u32) -> Option<f64> {
        self.group_impacts.get(&group).copied()
    }

    pub fn view(&self) -> PlanningView {
        PlanningView {
            period_secs: self.period,
            min_time_to_impact: self.min_time_to_impact,
            batches_dispatched: self.batches_dispatched,
            last_batch_size: self.last_batch_size,
            in_flight: self.in_flight.is_some(),
        }
    }

    /// One scheduling tick at simulated time `now` (seconds).
    pub fn run(&mut self, world: &mut World, now: f64, events: &mut Vec<SalvoEvent>) {
        self.poll(world, events);
        if self.in_flight.is_some() || now + DUE_EPSILON < self.next_due {
            return;
        }

        let batch = collector::collect(world, &self.config.limits, events);

        // 1-2. Urgency sets the next period.
        self.min_time_to_impact = batch
            .iter()
            .map(|c| time_to_impact(&c.munition, &c.target))
            .filter(|t| t.is_finite())
            .reduce(f64::min);
        let period = period_for(self.min_time_to_impact, &self.config.scheduler);
        if (period - self.period).abs() > 1e-9 {
            debug!("planning period {:.3}s -> {:.3}s", self.period, period);
            events.push(SalvoEvent::PeriodChanged {
                period_secs: period,
            });
        }
        self.period = period;
        self.next_due = now + period;

        // An empty batch is a no-op; planning resumes next period.
        if batch.is_empty() {
            return;
        }

        // 3-4. Requests grown from independent continuation points.
        let mut requests = self.build_requests(world, &batch);
        self.resolve_groups(&mut requests, &batch, now);

        // 5-6. Dispatch; merge now or when the reply arrives.
        let dispatched = batch
            .iter()
            .map(|c| Dispatched {
                entity: c.entity,
                generation: c.generation,
                current_index: c.current_index,
            })
            .collect();
        self.dispatch(world, requests, dispatched, events);
    }

    /// Block until the in-flight batch (if any) is merged.
    pub fn flush(&mut self, world: &mut World, events: &mut Vec<SalvoEvent>) {
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };
        match self.reply_rx.recv() {
            Ok(reply) => self.merge_reply(world, in_flight, reply, events),
            Err(_) => error!("result queue closed with batch {} in flight", in_flight.batch_id),
        }
    }

    fn poll(&mut self, world: &mut World, events: &mut Vec<SalvoEvent>) {
        if self.in_flight.is_none() {
            return;
        }
        match self.reply_rx.try_recv() {
            Ok(reply) => {
                if let Some(in_flight) = self.in_flight.take() {
                    self.merge_reply(world, in_flight, reply, events);
                }
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                error!("result queue closed; abandoning in-flight batch");
                self.in_flight = None;
            }
        }
    }

    fn merge_reply(
        &mut self,
        world: &mut World,
        in_flight: InFlight,
        reply: PlanningReply,
        events: &mut Vec<SalvoEvent>,
    ) {
        if reply.batch_id != in_flight.batch_id {
            warn!(
                "discarding reply for batch {}, expected {}",
                reply.batch_id, in_flight.batch_id
            );
            return;
        }
        let merged = merge::apply(
            world,
            &in_flight.dispatched,
            reply.results,
            self.config.scheduler.protected_count,
            events,
        );
        debug!("batch {} merged into {merged} sequences", reply.batch_id);
    }

    fn build_requests(&self, world: &World, batch: &[Collected]) -> Vec<PlanningRequest> {
        let protected_count = self.config.scheduler.protected_count;
        batch
            .iter()
            .map(|c| {
                let protected = world
                    .get::<&WaypointSequence>(c.entity)
                    .map(|s| s.protected_ahead(protected_count).to_vec())
                    .unwrap_or_default();
                let continuation =
                    continuation_point(&c.munition, &protected, &c.target, &self.config.scheduler);
                planning_request(&c.munition, &c.target, &c.assignment, continuation, None)
            })
            .collect()
    }

    /// Agree one impact time per coordination group and hand each member
    /// the seconds remaining until it.
    ///
    /// A group keeps its time while every member can still make it; it is
    /// pushed out to the latest earliest arrival plus slack otherwise.
    fn resolve_groups(&mut self, requests: &mut [PlanningRequest], batch: &[Collected], now: f64) {
        let mut earliest: BTreeMap<u32, f64> = BTreeMap::new();
        for (request, collected) in requests.iter().zip(batch) {
            let Some(group) = coordinated_group(request, collected) else {
                continue;
            };
            let arrival = earliest_arrival(request, &self.planner);
            let entry = earliest.entry(group).or_insert(f64::NEG_INFINITY);
            if let Some(arrival) = arrival {
                *entry = entry.max(arrival);
            }
        }

        let slack = self.config.scheduler.coordination_slack_secs;
        self.group_impacts.retain(|group, _| earliest.contains_key(group));
        for (&group, &latest) in &earliest {
            if !latest.is_finite() {
                self.group_impacts.remove(&group);
                continue;
            }
            let still_feasible = self
                .group_impacts
                .get(&group)
                .is_some_and(|&impact| impact - now >= latest);
            if !still_feasible {
                let impact = now + latest + slack;
                debug!("group {group} impact time set to {impact:.2}s");
                self.group_impacts.insert(group, impact);
            }
        }

        for (request, collected) in requests.iter_mut().zip(batch) {
            if let Some(group) = coordinated_group(request, collected) {
                request.impact_time = self.group_impacts.get(&group).map(|impact| impact - now);
            }
        }
    }

    fn dispatch(
        &mut self,
        world: &mut World,
        requests: Vec<PlanningRequest>,
        dispatched: Vec<Dispatched>,
        events: &mut Vec<SalvoEvent>,
    ) {
        let batch_id = self.next_batch_id;
        self.next_batch_id += 1;
        self.batches_dispatched += 1;
        self.last_batch_size = requests.len();
        debug!(
            "batch {batch_id}: {} munitions on {}, period {:.3}s, min tti {:?}",
            requests.len(),
            self.backend.name(),
            self.period,
            self.min_time_to_impact
        );

        match self.config.backend.mode {
            PlanningMode::Synchronous => {
                let results = self.backend.execute(&requests, &self.planner);
                self.merge_reply(
                    world,
                    InFlight {
                        batch_id,
                        dispatched,
                    },
                    PlanningReply { batch_id, results },
                    events,
                );
            }
            PlanningMode::Pipelined => {
                let job = PlanningJob {
                    batch_id,
                    requests,
                    tuning: Arc::clone(&self.planner),
                };
                self.backend.submit(job, self.reply_tx.clone());
                self.in_flight = Some(InFlight {
                    batch_id,
                    dispatched,
                });
            }
        }
    }
}

fn coordinated_group(request: &PlanningRequest, collected: &Collected) -> Option<u32> {
    (request.archetype.kind() == ArchetypeKind::Coordinated)
        .then_some(collected.assignment.group)
        .flatten()
}
