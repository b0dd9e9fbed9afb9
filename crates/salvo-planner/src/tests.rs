#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
    use std::sync::Arc;
    use std::time::Duration;

    use proptest::prelude::*;

    use salvo_core::config::PlannerTuning;
    use salvo_core::enums::{ManeuverKind, TrajectoryArchetype};
    use salvo_core::error::PlanFault;
    use salvo_core::planning::{Continuation, PlanningRequest, Slot};
    use salvo_core::sequence::Waypoint;
    use salvo_core::types::{angle_between, KinematicState, Vec2};

    use crate::archetype::{self, Context};
    use crate::backend::{ComputeBackend, PlanningJob, RayonBackend};
    use crate::planner::{earliest_arrival, plan};
    use crate::validate::validate_tail;

    const MAX_ACCEL: f64 = 1400.0;

    fn munition(position: Vec2, velocity: Vec2) -> KinematicState {
        KinematicState {
            max_acceleration: MAX_ACCEL,
            max_rotation_rate: 2.0,
            ..KinematicState::point(position, velocity)
        }
    }

    fn request(
        munition: KinematicState,
        target: KinematicState,
        archetype: TrajectoryArchetype,
    ) -> PlanningRequest {
        let los = target.position - munition.position;
        PlanningRequest {
            munition,
            target,
            archetype,
            slot: Slot::single(),
            reference_bearing: los.y.atan2(los.x),
            continuation: Continuation::at(&munition),
            impact_time: None,
        }
    }

    fn wp(x: f64, y: f64, speed: f64) -> Waypoint {
        Waypoint::new(Vec2::new(x, y), speed, ManeuverKind::Cruise).with_tolerances(150.0, 50.0)
    }

    fn final_leg(tail: &[Waypoint]) -> Vec2 {
        let n = tail.len();
        tail[n - 1].position - tail[n - 2].position
    }

    #[test]
    fn test_direct_intercept_matches_closed_form() {
        let tuning = PlannerTuning::default();
        let m = munition(Vec2::ZERO, Vec2::ZERO);
        let t = KinematicState::point(Vec2::new(10_000.0, 0.0), Vec2::new(-500.0, 0.0));
        let result = plan(&request(m, t, TrajectoryArchetype::Direct), &tuning);

        assert!(result.feasible, "fault: {:?}", result.fault);
        assert!(!result.tail.is_empty());

        // Constant acceleration a from rest toward a target closing at 500 m/s:
        // a/2 t² + 500 t - 10000 = 0.
        let a = MAX_ACCEL * tuning.direct.accel_fraction;
        let time = (-500.0 + (500.0_f64.powi(2) + 2.0 * a * 10_000.0).sqrt()) / a;
        let intercept = Vec2::new(10_000.0 - 500.0 * time, 0.0);

        let last = result.tail.last().unwrap();
        assert_eq!(last.kind, ManeuverKind::Terminal);
        let miss = last.position.distance(intercept);
        assert!(miss < 50.0, "final waypoint {miss:.1} m from intercept");
    }

    #[test]
    fn test_direct_speeds_are_monotonic() {
        let tuning = PlannerTuning::default();
        let m = munition(Vec2::ZERO, Vec2::new(200.0, 0.0));
        let t = KinematicState::point(Vec2::new(80_000.0, 5_000.0), Vec2::new(-300.0, 0.0));
        let result = plan(&request(m, t, TrajectoryArchetype::Direct), &tuning);

        assert!(result.feasible);
        for pair in result.tail.windows(2) {
            assert!(pair[1].target_speed >= pair[0].target_speed);
        }
        assert_eq!(result.tail[0].kind, ManeuverKind::Boost);
        assert!(result.tail.iter().all(|w| w.acceptance_radius == tuning.direct.acceptance_radius));
    }

    #[test]
    fn test_forced_flip_precedes_curve() {
        let tuning = PlannerTuning::default();
        let m = munition(Vec2::ZERO, Vec2::new(-20_000.0, 0.0));
        let t = KinematicState::point(Vec2::new(3_000.0, 0.0), Vec2::ZERO);
        let archetype = TrajectoryArchetype::OffsetAngle {
            approach_angle: FRAC_PI_2,
            separation: 0.0,
        };
        let result = plan(&request(m, t, archetype), &tuning);

        assert!(result.feasible, "fault: {:?}", result.fault);
        let kinds: Vec<ManeuverKind> = result.tail.iter().map(|w| w.kind).collect();
        let flip = kinds.iter().position(|k| *k == ManeuverKind::Flip);
        let curve = kinds.iter().position(|k| *k == ManeuverKind::Curve);
        let flip = flip.expect("flip waypoint");
        let curve = curve.expect("curve waypoint");
        assert!(flip < curve, "flip at {flip}, first curve at {curve}");
        assert_eq!(kinds[flip + 1], ManeuverKind::Burn);
        assert_eq!(kinds.iter().filter(|k| **k == ManeuverKind::Flip).count(), 1);

        // Arrives travelling north: 90° off the line of sight.
        let arrival = final_leg(&result.tail);
        assert!(angle_between(arrival, Vec2::Y) < 1e-6);
    }

    #[test]
    fn test_slow_munition_turns_without_flip() {
        let tuning = PlannerTuning::default();
        let m = munition(Vec2::ZERO, Vec2::new(-300.0, 0.0));
        let t = KinematicState::point(Vec2::new(60_000.0, 0.0), Vec2::ZERO);
        let result = plan(&request(m, t, TrajectoryArchetype::Direct), &tuning);

        assert!(result.feasible, "fault: {:?}", result.fault);
        assert!(result.tail.iter().all(|w| w.kind != ManeuverKind::Flip));
    }

    #[test]
    fn test_offset_arrives_on_approach_angle() {
        let tuning = PlannerTuning::default();
        let m = munition(Vec2::ZERO, Vec2::new(500.0, 0.0));
        let t = KinematicState::point(Vec2::new(100_000.0, 0.0), Vec2::ZERO);
        let archetype = TrajectoryArchetype::OffsetAngle {
            approach_angle: FRAC_PI_4,
            separation: 0.0,
        };
        let result = plan(&request(m, t, archetype), &tuning);

        assert!(result.feasible, "fault: {:?}", result.fault);
        assert!(result.tail.iter().any(|w| w.kind == ManeuverKind::Curve));
        assert!(result.tail.iter().all(|w| w.kind != ManeuverKind::Flip));
        let arrival = final_leg(&result.tail);
        assert!(angle_between(arrival, Vec2::from_angle(FRAC_PI_4)) < 1e-6);
        assert!(result.tail.last().unwrap().position.distance(t.position) < 1.0);
    }

    #[test]
    fn test_replan_from_curve_keeps_curve() {
        let tuning = PlannerTuning::default();
        let m = munition(Vec2::ZERO, Vec2::new(500.0, 0.0));
        let t = KinematicState::point(Vec2::new(100_000.0, 0.0), Vec2::ZERO);
        let archetype = TrajectoryArchetype::OffsetAngle {
            approach_angle: FRAC_PI_4,
            separation: 0.0,
        };
        let mut req = request(m, t, archetype);
        let first = plan(&req, &tuning);
        assert!(first.feasible, "fault: {:?}", first.fault);

        // Grow a new plan from the first point on the arc, as if everything
        // up to it were protected.
        let k = first
            .tail
            .iter()
            .position(|w| w.kind == ManeuverKind::Curve)
            .expect("curve waypoint");
        assert!(k >= 1);
        let anchor = first.tail[k];
        req.continuation = Continuation {
            position: anchor.position,
            direction: (anchor.position - first.tail[k - 1].position).normalize(),
            speed: anchor.target_speed,
            lead_time: 20.0,
        };
        let again = plan(&req, &tuning);

        assert!(again.feasible, "fault: {:?}", again.fault);
        assert!(again.tail.iter().all(|w| w.kind != ManeuverKind::Flip));
        assert!(again.tail.iter().any(|w| w.kind == ManeuverKind::Curve));
        assert!(again.tail[0].position.distance(anchor.position) >= tuning.min_spacing);
        let arrival = final_leg(&again.tail);
        assert!(angle_between(arrival, Vec2::from_angle(FRAC_PI_4)) < 1e-6);
        assert!(again.tail.last().unwrap().position.distance(t.position) < 1.0);
    }

    #[test]
    fn test_offset_slots_are_separated() {
        let tuning = PlannerTuning::default();
        let t = KinematicState::point(Vec2::new(120_000.0, 0.0), Vec2::ZERO);
        let archetype = TrajectoryArchetype::OffsetAngle {
            approach_angle: 0.0,
            separation: 0.8,
        };
        let arrivals: Vec<Vec2> = [(0, -3_000.0), (1, 3_000.0)]
            .into_iter()
            .map(|(index, y)| {
                let m = munition(Vec2::new(0.0, y), Vec2::new(500.0, 0.0));
                let mut req = request(m, t, archetype);
                req.reference_bearing = 0.0;
                req.slot = Slot { index, count: 2 };
                let result = plan(&req, &tuning);
                assert!(result.feasible, "slot {index} fault: {:?}", result.fault);
                final_leg(&result.tail)
            })
            .collect();

        assert!(angle_between(arrivals[0], Vec2::from_angle(-0.4)) < 1e-6);
        assert!(angle_between(arrivals[1], Vec2::from_angle(0.4)) < 1e-6);
    }

    #[test]
    fn test_coordinated_group_shares_impact_time() {
        let tuning = PlannerTuning::default();
        let t = KinematicState::point(Vec2::new(60_000.0, 0.0), Vec2::ZERO);
        let archetype = TrajectoryArchetype::Coordinated { fan_arc: 0.6 };
        let mut requests: Vec<PlanningRequest> = [
            (0, Vec2::new(0.0, 0.0)),
            (1, Vec2::new(-10_000.0, 3_000.0)),
        ]
        .into_iter()
        .map(|(index, position)| {
            let mut req = request(munition(position, Vec2::new(300.0, 0.0)), t, archetype);
            req.reference_bearing = 0.0;
            req.slot = Slot { index, count: 2 };
            req
        })
        .collect();

        let earliest: Vec<f64> = requests
            .iter()
            .map(|r| earliest_arrival(r, &tuning).unwrap())
            .collect();
        assert!(earliest[1] > earliest[0]);
        let impact = earliest[0].max(earliest[1]) + 2.0;

        for req in &mut requests {
            req.impact_time = Some(impact);
            let result = plan(req, &tuning);
            assert!(result.feasible, "fault: {:?}", result.fault);
            assert!(result.tail.last().unwrap().position.distance(t.position) < 1.0);

            let ctx = Context::new(req, &tuning);
            let body = archetype::body(&ctx, &req.continuation).unwrap();
            assert!(
                (body.arrival - impact).abs() < 0.05,
                "arrives at {:.2}s, group impact {impact:.2}s",
                body.arrival
            );
        }
    }

    #[test]
    fn test_plan_grows_from_continuation_point() {
        let tuning = PlannerTuning::default();
        let m = munition(Vec2::ZERO, Vec2::new(1_000.0, 0.0));
        let t = KinematicState::point(Vec2::new(50_000.0, 20_000.0), Vec2::ZERO);
        let mut req = request(m, t, TrajectoryArchetype::Direct);
        req.continuation = Continuation {
            position: Vec2::new(5_000.0, 0.0),
            direction: Vec2::X,
            speed: 1_000.0,
            lead_time: 5.0,
        };
        let result = plan(&req, &tuning);
        assert!(result.feasible);

        // The straight tail lies on the line from the continuation point, not
        // from the live position.
        let start = req.continuation.position;
        let end = result.tail.last().unwrap().position;
        let first = result.tail[0].position;
        assert!((first - start).perp_dot(end - start).abs() / (end - start).length() < 1e-6);
        assert!((first - m.position).perp_dot(end - m.position).abs() > 1.0);
    }

    #[test]
    fn test_no_intercept_degrades_to_fallback() {
        let tuning = PlannerTuning::default();
        let m = munition(Vec2::ZERO, Vec2::new(100.0, 0.0));
        // Target outruns the planner's top speed.
        let t = KinematicState::point(Vec2::new(5_000.0, 0.0), Vec2::new(20_000.0, 0.0));
        let result = plan(&request(m, t, TrajectoryArchetype::Direct), &tuning);

        assert!(!result.feasible);
        assert_eq!(result.fault, Some(PlanFault::NoIntercept));
        assert!(!result.tail.is_empty());
        assert_eq!(result.tail.last().unwrap().kind, ManeuverKind::Terminal);
        assert!(result.tail.iter().all(|w| w.target_speed == 100.0));
    }

    #[test]
    fn test_immobile_munition_degrades() {
        let tuning = PlannerTuning::default();
        let mut m = munition(Vec2::ZERO, Vec2::new(100.0, 0.0));
        m.max_acceleration = 0.0;
        let t = KinematicState::point(Vec2::new(5_000.0, 0.0), Vec2::ZERO);
        let result = plan(&request(m, t, TrajectoryArchetype::Direct), &tuning);
        assert_eq!(result.fault, Some(PlanFault::DegenerateGeometry));
    }

    #[test]
    fn test_validation_rejects_spacing() {
        let tuning = PlannerTuning::default();
        let start = Continuation::at(&munition(Vec2::ZERO, Vec2::new(100.0, 0.0)));
        let tail = vec![wp(1_000.0, 0.0, 100.0), wp(1_010.0, 0.0, 100.0)];
        assert!(matches!(
            validate_tail(&start, &tail, MAX_ACCEL, &tuning),
            Err(PlanFault::SpacingTooSmall { index: 1, .. })
        ));
    }

    #[test]
    fn test_validation_rejects_velocity_change() {
        let tuning = PlannerTuning::default();
        let start = Continuation::at(&munition(Vec2::ZERO, Vec2::new(100.0, 0.0)));
        // 5000 m/s gained in 100 m is far beyond 1400 m/s².
        let tail = vec![wp(100.0, 0.0, 5_000.0)];
        assert!(matches!(
            validate_tail(&start, &tail, MAX_ACCEL, &tuning),
            Err(PlanFault::VelocityChangeInfeasible { index: 0, .. })
        ));
    }

    #[test]
    fn test_validation_rejects_tight_turn() {
        let tuning = PlannerTuning::default();
        let start = Continuation::at(&munition(Vec2::ZERO, Vec2::new(3_000.0, 0.0)));
        // 90° corner at 3000 m/s needs ~6.4 km; legs are 1 km.
        let tail = vec![wp(1_000.0, 0.0, 3_000.0), wp(1_000.0, 1_000.0, 3_000.0)];
        assert!(matches!(
            validate_tail(&start, &tail, MAX_ACCEL, &tuning),
            Err(PlanFault::TurnRadiusExceeded { index: 0, .. })
        ));
    }

    #[test]
    fn test_validation_rejects_sharp_seam() {
        let tuning = PlannerTuning::default();
        let start = Continuation::at(&munition(Vec2::ZERO, Vec2::new(3_000.0, 0.0)));
        // Straight on from the first waypoint, but the first leg itself leaves
        // at 90° to the direction of arrival.
        let tail = vec![wp(0.0, 1_000.0, 3_000.0), wp(0.0, 2_000.0, 3_000.0)];
        assert!(matches!(
            validate_tail(&start, &tail, MAX_ACCEL, &tuning),
            Err(PlanFault::TurnRadiusExceeded { index: 0, .. })
        ));

        // The same corner at walking pace fits.
        let slow = Continuation::at(&munition(Vec2::ZERO, Vec2::new(100.0, 0.0)));
        let tail = vec![wp(0.0, 1_000.0, 100.0), wp(0.0, 2_000.0, 100.0)];
        assert!(validate_tail(&slow, &tail, MAX_ACCEL, &tuning).is_ok());
    }

    #[test]
    fn test_validation_rejects_non_finite() {
        let tuning = PlannerTuning::default();
        let start = Continuation::at(&munition(Vec2::ZERO, Vec2::new(100.0, 0.0)));
        let tail = vec![wp(1_000.0, 0.0, 100.0), wp(f64::NAN, 0.0, 100.0)];
        assert_eq!(
            validate_tail(&start, &tail, MAX_ACCEL, &tuning),
            Err(PlanFault::NonFinite { index: 1 })
        );
        assert_eq!(
            validate_tail(&start, &[], MAX_ACCEL, &tuning),
            Err(PlanFault::EmptyTail)
        );
    }

    #[test]
    fn test_validation_skips_flip_waypoints() {
        let tuning = PlannerTuning::default();
        let start = Continuation::at(&munition(Vec2::ZERO, Vec2::new(3_000.0, 0.0)));
        let mut tail = vec![wp(1_000.0, 0.0, 3_000.0), wp(1_000.0, 1_000.0, 3_000.0)];
        tail[0].kind = ManeuverKind::Flip;
        assert!(validate_tail(&start, &tail, MAX_ACCEL, &tuning).is_ok());
    }

    #[test]
    fn test_backend_preserves_batch_order() {
        let tuning = PlannerTuning::default();
        let backend = RayonBackend::new(2).unwrap();
        assert_eq!(backend.lanes(), 2);
        assert_eq!(backend.name(), "rayon");

        let requests: Vec<PlanningRequest> = (0..16)
            .map(|i| {
                let m = munition(Vec2::new(0.0, i as f64 * 1_000.0), Vec2::new(300.0, 0.0));
                let t = KinematicState::point(Vec2::new(40_000.0, 0.0), Vec2::ZERO);
                request(m, t, TrajectoryArchetype::Direct)
            })
            .collect();

        let results = backend.execute(&requests, &tuning);
        assert_eq!(results.len(), requests.len());
        for (req, result) in requests.iter().zip(&results) {
            assert_eq!(*result, plan(req, &tuning));
        }
    }

    #[test]
    fn test_backend_submit_replies() {
        let backend = RayonBackend::new(1).unwrap();
        let (tx, rx) = crossbeam_channel::bounded(1);
        let m = munition(Vec2::ZERO, Vec2::new(300.0, 0.0));
        let t = KinematicState::point(Vec2::new(40_000.0, 0.0), Vec2::ZERO);
        let job = PlanningJob {
            batch_id: 7,
            requests: vec![request(m, t, TrajectoryArchetype::Direct); 3],
            tuning: Arc::new(PlannerTuning::default()),
        };
        backend.submit(job, tx);

        let reply = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(reply.batch_id, 7);
        assert_eq!(reply.results.len(), 3);
        assert!(reply.results.iter().all(|r| r.feasible));
    }

    proptest! {
        /// Whatever the geometry, a plan is never empty, never non-finite, and
        /// a feasible plan never turns tighter than the airframe allows.
        #[test]
        fn prop_feasible_plans_respect_turn_radius(
            mx in -50_000.0f64..50_000.0,
            my in -50_000.0f64..50_000.0,
            heading in -PI..PI,
            speed in 0.0f64..6_000.0,
            tx in -80_000.0f64..80_000.0,
            ty in -80_000.0f64..80_000.0,
            tvx in -600.0f64..600.0,
            tvy in -600.0f64..600.0,
            approach in -1.2f64..1.2,
            offset in any::<bool>(),
        ) {
            let tuning = PlannerTuning::default();
            let m = munition(Vec2::new(mx, my), Vec2::from_angle(heading) * speed);
            let t = KinematicState::point(Vec2::new(tx, ty), Vec2::new(tvx, tvy));
            let archetype = if offset {
                TrajectoryArchetype::OffsetAngle { approach_angle: approach, separation: 0.0 }
            } else {
                TrajectoryArchetype::Direct
            };
            let req = request(m, t, archetype);
            let result = plan(&req, &tuning);

            prop_assert!(!result.tail.is_empty());
            prop_assert!(result.tail.iter().all(|w| w.position.is_finite() && w.target_speed.is_finite()));
            prop_assert_eq!(result.feasible, result.fault.is_none());
            if result.feasible {
                let mut points = vec![req.continuation.position];
                points.extend(result.tail.iter().map(|w| w.position));
                for i in 0..result.tail.len().saturating_sub(1) {
                    let here = &result.tail[i];
                    if here.kind == ManeuverKind::Flip {
                        continue;
                    }
                    let incoming = points[i + 1] - points[i];
                    let outgoing = points[i + 2] - points[i + 1];
                    if angle_between(incoming, outgoing) > tuning.turn_angle_threshold {
                        let radius = here.target_speed.powi(2) / MAX_ACCEL;
                        prop_assert!(radius <= incoming.length().min(outgoing.length()) + 1e-6);
                    }
                }
            }
        }
    }
}
