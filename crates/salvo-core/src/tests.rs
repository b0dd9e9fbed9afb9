#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use proptest::prelude::*;

    use crate::commands::EngineCommand;
    use crate::components::{Assignment, Guidable, Munition};
    use crate::config::SalvoConfig;
    use crate::enums::*;
    use crate::error::{ConfigError, PlanFault};
    use crate::events::SalvoEvent;
    use crate::planning::Slot;
    use crate::sequence::{Waypoint, WaypointSequence};
    use crate::types::*;

    fn wp(x: f64, speed: f64) -> Waypoint {
        Waypoint::new(Vec2::new(x, 0.0), speed, ManeuverKind::Cruise).with_tolerances(150.0, 50.0)
    }

    fn sequence(n: usize) -> WaypointSequence {
        WaypointSequence::new((0..n).map(|i| wp(i as f64 * 1000.0, 500.0)).collect())
    }

    #[test]
    fn test_archetype_serde() {
        let variants = vec![
            TrajectoryArchetype::Direct,
            TrajectoryArchetype::OffsetAngle {
                approach_angle: 0.5,
                separation: 0.3,
            },
            TrajectoryArchetype::Coordinated { fan_arc: 1.2 },
        ];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: TrajectoryArchetype = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_event_serde_is_tagged() {
        let event = SalvoEvent::PlanDegraded {
            munition: 7,
            fault: PlanFault::NoIntercept,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"PlanDegraded\""));
        let back: SalvoEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_command_parses_from_host_json() {
        let json = r#"{"type":"Retarget","munition":12,"target":3}"#;
        let command: EngineCommand = serde_json::from_str(json).unwrap();
        assert_eq!(
            command,
            EngineCommand::Retarget {
                munition: 12,
                target: 3
            }
        );
    }

    #[test]
    fn test_guidance_mode_for_maneuver() {
        assert_eq!(GuidanceMode::for_maneuver(ManeuverKind::Flip), GuidanceMode::Flip);
        assert_eq!(GuidanceMode::for_maneuver(ManeuverKind::Burn), GuidanceMode::Burn);
        assert_eq!(
            GuidanceMode::for_maneuver(ManeuverKind::Terminal),
            GuidanceMode::Terminal
        );
        for kind in [ManeuverKind::Cruise, ManeuverKind::Boost, ManeuverKind::Curve] {
            assert_eq!(GuidanceMode::for_maneuver(kind), GuidanceMode::CruiseToWaypoint);
        }
    }

    #[test]
    fn test_scenario_names_round_trip() {
        for id in ScenarioId::ALL {
            assert_eq!(ScenarioId::from_name(id.name()), Some(id));
        }
        assert_eq!(ScenarioId::from_name("nonsense"), None);
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI - 0.5) - (PI - 0.5)).abs() < 1e-9);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(0.25) - 0.25).abs() < 1e-12);
        assert!((wrap_angle(-7.0) - (-7.0 + 2.0 * PI)).abs() < 1e-12);
    }

    #[test]
    fn test_signed_angle() {
        let east = Vec2::X;
        let north = Vec2::Y;
        assert!((signed_angle(east, north) - PI / 2.0).abs() < 1e-12);
        assert!((signed_angle(north, east) + PI / 2.0).abs() < 1e-12);
        assert!((angle_between(east, -east) - PI).abs() < 1e-12);
        assert_eq!(signed_angle(Vec2::ZERO, north), 0.0);
    }

    #[test]
    fn test_travel_direction_falls_back_to_heading() {
        let mut state = KinematicState::point(Vec2::ZERO, Vec2::ZERO);
        state.heading = PI / 2.0;
        assert!((state.travel_direction() - Vec2::Y).length() < 1e-12);
        state.velocity = Vec2::new(-10.0, 0.0);
        assert!((state.travel_direction() + Vec2::X).length() < 1e-12);
    }

    #[test]
    fn test_slot_centred_offset() {
        let three: Vec<f64> = (0..3)
            .map(|index| Slot { index, count: 3 }.centred_offset())
            .collect();
        assert_eq!(three, vec![-1.0, 0.0, 1.0]);
        assert_eq!(Slot { index: 1, count: 2 }.centred_offset(), 0.5);
        assert_eq!(Slot::single().centred_offset(), 0.0);
        // Out-of-range index clamps to the last slot.
        assert_eq!(Slot { index: 9, count: 3 }.centred_offset(), 1.0);
    }

    #[test]
    fn test_guidable_munition() {
        let munition = Munition {
            state: KinematicState::point(Vec2::new(1.0, 2.0), Vec2::X),
            assignment: Assignment::direct(),
            status: MunitionStatus::Active,
        };
        assert!(munition.is_active());
        assert_eq!(munition.kinematics().position, Vec2::new(1.0, 2.0));
        assert_eq!(munition.assignment().archetype, TrajectoryArchetype::Direct);
    }

    #[test]
    fn test_replace_tail_keeps_protected_prefix() {
        let mut seq = sequence(8);
        seq.advance();
        seq.advance();
        let tail = vec![wp(-1.0, 10.0), wp(-2.0, 20.0)];
        assert_eq!(seq.replace_tail(3, &tail), Some(1));
        // current 2 + protected 3 = 5 kept
        assert_eq!(seq.len(), 7);
        assert_eq!(seq.current_index(), 2);
        assert_eq!(seq.waypoints()[4].position.x, 4000.0);
        assert_eq!(seq.waypoints()[5].position.x, -1.0);
    }

    #[test]
    fn test_replace_tail_empty_is_noop() {
        let mut seq = sequence(4);
        assert_eq!(seq.replace_tail(3, &[]), None);
        assert_eq!(seq.generation(), 0);
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn test_short_sequence_is_fully_protected() {
        let mut seq = sequence(2);
        assert_eq!(seq.protected_end(3), 2);
        seq.replace_tail(3, &[wp(9.0, 1.0)]);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.waypoints()[1].position.x, 1000.0);
    }

    #[test]
    fn test_advance_stops_at_end() {
        let mut seq = sequence(1);
        assert!(seq.advance());
        assert!(seq.is_exhausted());
        assert!(!seq.advance());
        assert_eq!(seq.current_index(), 1);
        assert!(seq.protected_ahead(3).is_empty());
    }

    #[test]
    fn test_reseed_bumps_generation() {
        let mut seq = sequence(4);
        seq.advance();
        seq.replace_tail(1, &[wp(5.0, 5.0)]);
        assert_eq!(seq.reseed(vec![wp(1.0, 1.0)]), 2);
        assert_eq!(seq.current_index(), 0);
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn test_config_defaults_validate() {
        let config = SalvoConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scheduler.protected_count, 3);
        assert_eq!(config.scheduler.max_rate_hz, 3.0);
        assert_eq!(config.backend.mode, PlanningMode::Synchronous);
    }

    #[test]
    fn test_config_partial_json_overrides() {
        let json = r#"{
            "scheduler": { "protected_count": 5 },
            "planner": { "direct": { "acceptance_radius": 80.0 } },
            "backend": { "mode": "Pipelined", "worker_threads": 2 }
        }"#;
        let config = SalvoConfig::from_json_str(json).unwrap();
        assert_eq!(config.scheduler.protected_count, 5);
        assert_eq!(config.planner.direct.acceptance_radius, 80.0);
        assert_eq!(config.planner.direct.speed_tolerance, 50.0);
        assert_eq!(config.backend.mode, PlanningMode::Pipelined);
        assert_eq!(config.backend.worker_threads, 2);
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        let zero_protected = r#"{ "scheduler": { "protected_count": 0 } }"#;
        assert!(matches!(
            SalvoConfig::from_json_str(zero_protected),
            Err(ConfigError::Invalid {
                field: "scheduler.protected_count",
                ..
            })
        ));

        let bad_fraction = r#"{ "planner": { "coordinated": { "accel_fraction": 1.5 } } }"#;
        assert!(matches!(
            SalvoConfig::from_json_str(bad_fraction),
            Err(ConfigError::Invalid { .. })
        ));

        assert!(matches!(
            SalvoConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = SalvoConfig::load("/nonexistent/salvo-tuning.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("salvo-tuning.json"));
    }

    proptest! {
        /// Every merge leaves `[0, current + protected)` bit-identical.
        #[test]
        fn prop_merge_preserves_protected_prefix(
            len in 0usize..20,
            advances in 0usize..20,
            protected in 1usize..6,
            tails in prop::collection::vec(prop::collection::vec(-1e6f64..1e6, 0..10), 1..6),
        ) {
            let mut seq = sequence(len);
            for _ in 0..advances {
                seq.advance();
            }
            for xs in tails {
                let before: Vec<Waypoint> = seq.waypoints().to_vec();
                let boundary = seq.protected_end(protected);
                let generation = seq.generation();
                let tail: Vec<Waypoint> = xs.iter().map(|&x| wp(x, x.abs() / 100.0)).collect();

                let merged = seq.replace_tail(protected, &tail);

                for i in 0..boundary {
                    prop_assert!(seq.waypoints()[i].bitwise_eq(&before[i]));
                }
                if tail.is_empty() {
                    prop_assert_eq!(merged, None);
                    prop_assert_eq!(seq.generation(), generation);
                    prop_assert_eq!(seq.len(), before.len());
                } else {
                    prop_assert_eq!(merged, Some(generation + 1));
                    prop_assert_eq!(seq.len(), boundary + tail.len());
                }
            }
        }
    }
}
