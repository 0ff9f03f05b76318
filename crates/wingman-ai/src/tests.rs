#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::DVec3;

    use wingman_core::config::{AiConfig, BehaviorSettings};
    use wingman_core::constants::DT;
    use wingman_core::enums::{CombinerPolicy, DockingState, TargetingPolicy};
    use wingman_core::events::AiEvent;
    use wingman_core::ids::{AgentId, FactionId, SquadronId, StateId};
    use wingman_core::types::{Bounds, Kinematics, SteeringCommand, WaypointPath};
    use wingman_core::AiError;

    use crate::decision::DecisionContext;
    use crate::requests::RequestBuffer;
    use crate::steering::{
        arrival_speed, evaluate, BehaviorKind, BehaviorRequest, SteeringInput, TargetDescriptor,
    };
    use crate::target::Target;
    use crate::AiContext;

    fn context() -> AiContext {
        AiContext::new(AiConfig::default()).unwrap()
    }

    fn spawn_at(ctx: &mut AiContext, faction: u16, position: DVec3) -> AgentId {
        ctx.spawn_agent(FactionId(faction), Kinematics::at(position, DVec3::Y))
    }

    /// A squadron of `n` agents, spread along x at a north offset per faction.
    fn squadron(ctx: &mut AiContext, name: &str, faction: u16, n: usize) -> (SquadronId, Vec<AgentId>) {
        let id = ctx.create_squadron(name, FactionId(faction));
        let members = (0..n)
            .map(|i| {
                let position = DVec3::new(i as f64 * 200.0, faction as f64 * 3000.0, 0.0);
                let agent = spawn_at(ctx, faction, position);
                ctx.add_to_squadron(id, agent).unwrap();
                agent
            })
            .collect();
        (id, members)
    }

    fn recorder(ctx: &mut AiContext) -> Rc<RefCell<Vec<AiEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        ctx.subscribe(move |event: &AiEvent| sink.borrow_mut().push(event.clone()));
        log
    }

    // --- Stale references ---

    #[test]
    fn test_destroyed_target_is_noop_for_every_behavior() {
        let mut ctx = context();
        let a = spawn_at(&mut ctx, 1, DVec3::ZERO);
        let b = spawn_at(&mut ctx, 2, DVec3::new(0.0, 500.0, 0.0));
        assert!(ctx.destroy_agent(b));

        let settings = BehaviorSettings::default();
        let kin = ctx.agent(a).unwrap().kinematics;
        for kind in [
            BehaviorKind::Seek,
            BehaviorKind::Arrival,
            BehaviorKind::Pursue,
            BehaviorKind::Flee,
            BehaviorKind::UnblockCone,
            BehaviorKind::Idle,
        ] {
            let request = BehaviorRequest {
                kind,
                target: TargetDescriptor::Agent(b),
                weight: 1.0,
            };
            assert_eq!(
                evaluate(&request, a, &kin, ctx.roster(), &settings),
                None,
                "{kind:?} should be a no-op"
            );
        }
    }

    #[test]
    fn test_destroyed_target_reads_as_no_target() {
        let mut ctx = context();
        let a = spawn_at(&mut ctx, 1, DVec3::ZERO);
        let b = spawn_at(&mut ctx, 2, DVec3::new(0.0, 500.0, 0.0));
        assert!(ctx.assign_target_agent(a, b));
        assert!(ctx.set_state(a, StateId::DOGFIGHT));
        ctx.destroy_agent(b);

        assert_eq!(ctx.target_agent(a), None);
        assert_eq!(ctx.target_position(a), None);
        ctx.tick(DT);
        // Dogfight without a target heads home.
        let command = ctx.command(a).unwrap();
        assert!(command.velocity.is_some());
        assert!(ctx.has_completed_action(a));
        // A second destroy is refused.
        assert!(!ctx.destroy_agent(b));
    }

    #[test]
    fn test_targets_cannot_be_assigned_to_or_from_the_dead() {
        let mut ctx = context();
        let a = spawn_at(&mut ctx, 1, DVec3::ZERO);
        let b = spawn_at(&mut ctx, 2, DVec3::X);
        ctx.destroy_agent(b);
        assert!(!ctx.assign_target_agent(a, b));
        assert!(!ctx.assign_target_agent(a, a));
        assert!(!ctx.assign_target_position(b, DVec3::ZERO));
        assert!(!ctx.assign_target_location(a, "nowhere"));
    }

    // --- Registry ---

    fn noop(_ctx: &mut DecisionContext<'_>, _out: &mut RequestBuffer) {}

    #[test]
    fn test_registry_ids_increase_and_duplicates_fail() {
        let mut ctx = context();
        assert_eq!(ctx.state_id("idle"), Some(StateId::IDLE));
        assert_eq!(ctx.state_id("move-to-target"), Some(StateId::MOVE_TO_TARGET));
        assert_eq!(ctx.state_id("dogfight"), Some(StateId::DOGFIGHT));

        let first = ctx.register_state("patrol", noop, CombinerPolicy::PriorityOnly).unwrap();
        let second = ctx.register_state("escort", noop, CombinerPolicy::PriorityOnly).unwrap();
        let attack = ctx.register_attack_state().unwrap();
        assert!(StateId::DOGFIGHT < first && first < second && second < attack);

        let err = ctx
            .register_state("patrol", noop, CombinerPolicy::PrioritisedDithering)
            .unwrap_err();
        assert!(matches!(err, AiError::DuplicateStateName(name) if name == "patrol"));
        // The failed registration did not burn an id.
        let third = ctx.register_state("screen", noop, CombinerPolicy::PriorityOnly).unwrap();
        assert_eq!(third.0, attack.0 + 1);
        assert_eq!(ctx.registry().len(), 7);
    }

    #[test]
    fn test_set_state_rejects_unknown_ids() {
        let mut ctx = context();
        let a = spawn_at(&mut ctx, 1, DVec3::ZERO);
        assert!(!ctx.set_state(a, StateId(40)));
        assert_eq!(ctx.state(a), Some(StateId::IDLE));
        assert!(ctx.set_state(a, StateId::MOVE_TO_TARGET));
        assert_eq!(ctx.state_name(a), Some("move-to-target"));
        assert!(ctx.set_engage_state(StateId(40)).is_err());
    }

    // --- Steering ---

    #[test]
    fn test_arrival_speed_braking_relation() {
        let v = arrival_speed(0.0, 10.0, 100.0);
        assert!((v - 44.72).abs() < 0.01, "got {v}");
    }

    #[test]
    fn test_arrival_through_context_uses_formula() {
        let config = AiConfig {
            behavior: BehaviorSettings {
                deceleration: 10.0,
                min_arrival_speed: 0.0,
                max_speed: 500.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut ctx = AiContext::new(config).unwrap();
        let a = spawn_at(&mut ctx, 1, DVec3::ZERO);
        ctx.assign_target_position(a, DVec3::new(0.0, 100.0, 0.0));
        ctx.set_state(a, StateId::MOVE_TO_TARGET);
        ctx.tick(DT);

        let command = ctx.command(a).unwrap();
        let speed = command.velocity.unwrap().length();
        assert!((speed - 44.72).abs() < 0.01, "got {speed}");
        assert_eq!(command.target_position, Some(DVec3::new(0.0, 100.0, 0.0)));
    }

    fn climb(input: &SteeringInput<'_>) -> Option<SteeringCommand> {
        Some(SteeringCommand {
            heading: DVec3::Z,
            velocity: Some(DVec3::Z * 10.0),
            target_position: None,
            up_hint: Some(-input.kinematics.forward()),
        })
    }

    fn climbing(_ctx: &mut DecisionContext<'_>, out: &mut RequestBuffer) {
        out.push(BehaviorKind::Custom(climb), TargetDescriptor::None, 1.0);
    }

    #[test]
    fn test_custom_behavior_kind() {
        let mut ctx = context();
        let a = spawn_at(&mut ctx, 1, DVec3::ZERO);
        let state = ctx
            .register_state("climb", climbing, CombinerPolicy::PriorityOnly)
            .unwrap();
        ctx.set_state(a, state);
        ctx.tick(DT);
        let command = ctx.command(a).unwrap();
        assert_eq!(command.heading, DVec3::Z);
        assert_eq!(command.up_hint, Some(-DVec3::Y));
    }

    #[test]
    fn test_idle_holds_heading() {
        let mut ctx = context();
        let a = ctx.spawn_agent(FactionId(1), Kinematics::at(DVec3::ZERO, DVec3::X));
        ctx.tick(DT);
        let command = ctx.command(a).unwrap();
        assert!((command.heading - DVec3::X).length() < 1e-9);
        assert_eq!(command.velocity, Some(DVec3::ZERO));
    }

    #[test]
    fn test_player_agents_are_never_steered() {
        let mut ctx = context();
        let p = ctx.spawn_player(FactionId(1), Kinematics::default());
        ctx.tick(DT);
        assert_eq!(ctx.command(p), None);
    }

    #[test]
    fn test_steering_interval_throttles_pass() {
        let config = AiConfig {
            steering_interval_secs: 0.1,
            ..Default::default()
        };
        let mut ctx = AiContext::new(config).unwrap();
        let a = spawn_at(&mut ctx, 1, DVec3::ZERO);
        ctx.tick(DT);
        assert_eq!(ctx.command(a), None);
        for _ in 0..3 {
            ctx.tick(DT);
        }
        assert!(ctx.command(a).is_some());
    }

    // --- State transitions inside decisions ---

    fn give_up(ctx: &mut DecisionContext<'_>, out: &mut RequestBuffer) {
        out.push(BehaviorKind::Seek, TargetDescriptor::Position(DVec3::X * 1e4), 1.0);
        ctx.set_state(StateId::IDLE);
    }

    fn ping(ctx: &mut DecisionContext<'_>, _out: &mut RequestBuffer) {
        let next = StateId(ctx.state().0 + 1);
        ctx.set_state(next);
    }

    fn pong(ctx: &mut DecisionContext<'_>, _out: &mut RequestBuffer) {
        let previous = StateId(ctx.state().0 - 1);
        ctx.set_state(previous);
    }

    #[test]
    fn test_transition_discards_requests_and_reevaluates() {
        let mut ctx = context();
        let a = spawn_at(&mut ctx, 1, DVec3::ZERO);
        let state = ctx
            .register_state("give-up", give_up, CombinerPolicy::PriorityOnly)
            .unwrap();
        ctx.set_state(a, state);
        ctx.drain_events();
        ctx.tick(DT);

        assert_eq!(ctx.state(a), Some(StateId::IDLE));
        // The seek pushed before the transition never reached the blender.
        assert_eq!(ctx.command(a).unwrap().velocity, Some(DVec3::ZERO));
        let events = ctx.drain_events();
        assert!(events.contains(&AiEvent::StateChanged {
            agent: a,
            previous: state,
            current: StateId::IDLE,
        }));
    }

    #[test]
    fn test_transition_loop_is_bounded() {
        let mut ctx = context();
        let a = spawn_at(&mut ctx, 1, DVec3::ZERO);
        let first = ctx.register_state("ping", ping, CombinerPolicy::PriorityOnly).unwrap();
        ctx.register_state("pong", pong, CombinerPolicy::PriorityOnly).unwrap();
        ctx.set_state(a, first);
        for _ in 0..5 {
            ctx.tick(DT);
        }
        // Bounced every tick, idled each time, never hung.
        assert_eq!(ctx.command(a).unwrap().velocity, Some(DVec3::ZERO));
    }

    // --- Observers ---

    #[test]
    fn test_completion_reaches_observer_in_same_tick() {
        let mut ctx = context();
        let log = recorder(&mut ctx);
        let a = spawn_at(&mut ctx, 1, DVec3::ZERO);
        ctx.set_state(a, StateId::MOVE_TO_TARGET);
        ctx.assign_target_position(a, DVec3::new(0.0, 10.0, 0.0));
        log.borrow_mut().clear();

        ctx.tick(DT);
        assert!(log.borrow().contains(&AiEvent::ActionCompleted {
            agent: a,
            state: StateId::MOVE_TO_TARGET,
        }));
        assert!(ctx.has_completed_action(a));

        // Rising edge only.
        log.borrow_mut().clear();
        ctx.tick(DT);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_external_completion_flag() {
        let mut ctx = context();
        let log = recorder(&mut ctx);
        let a = spawn_at(&mut ctx, 1, DVec3::ZERO);
        assert!(ctx.set_action_completed(a, true));
        assert!(ctx.has_completed_action(a));
        assert_eq!(
            log.borrow().as_slice(),
            [AiEvent::ActionCompleted {
                agent: a,
                state: StateId::IDLE
            }]
        );
        assert!(ctx.set_action_completed(a, false));
        assert!(!ctx.has_completed_action(a));
    }

    // --- Targets and landmarks ---

    #[test]
    fn test_location_and_path_targets() {
        let mut ctx = context();
        let a = spawn_at(&mut ctx, 1, DVec3::ZERO);
        ctx.add_location("rally", DVec3::new(100.0, 0.0, 0.0));
        assert!(ctx.assign_target_location(a, "rally"));
        assert_eq!(ctx.target_position(a), Some(DVec3::new(100.0, 0.0, 0.0)));

        let path = ctx.add_path(WaypointPath::new(
            "patrol",
            vec![DVec3::new(10.0, 0.0, 0.0), DVec3::new(0.0, 900.0, 0.0)],
            false,
        ));
        assert!(ctx.assign_target_path(a, path));
        ctx.set_state(a, StateId::MOVE_TO_TARGET);
        ctx.tick(DT);
        // First waypoint is within reach, so the agent moves on to the second.
        assert_eq!(ctx.target(a), Some(Target::Path { path, next: 1 }));
        assert_eq!(
            ctx.command(a).unwrap().target_position,
            Some(DVec3::new(0.0, 900.0, 0.0))
        );
    }

    // --- Squadrons ---

    #[test]
    fn test_two_squadrons_target_each_other() {
        let mut ctx = context();
        let (blue, blue_members) = squadron(&mut ctx, "blue", 1, 3);
        let (red, red_members) = squadron(&mut ctx, "red", 2, 3);
        ctx.update_squadrons();

        assert_eq!(ctx.squadrons().get(blue).unwrap().target(), red);
        assert_eq!(ctx.squadrons().get(red).unwrap().target(), blue);
        for &agent in &blue_members {
            let target = ctx.target_agent(agent).expect("blue agent has a target");
            assert!(red_members.contains(&target));
            assert_ne!(target, agent);
            assert_eq!(ctx.state(agent), Some(StateId::DOGFIGHT));
        }
        for &agent in &red_members {
            let target = ctx.target_agent(agent).expect("red agent has a target");
            assert!(blue_members.contains(&target));
        }
    }

    #[test]
    fn test_single_squadron_has_no_target_and_runs() {
        let mut ctx = context();
        let (solo, members) = squadron(&mut ctx, "solo", 1, 3);
        assert_eq!(ctx.target_squadron(FactionId(1)), None);
        ctx.update_squadrons();
        assert_eq!(ctx.squadrons().get(solo).unwrap().target(), solo);
        for _ in 0..200 {
            ctx.tick(DT);
        }
        for agent in members {
            assert_eq!(ctx.target_agent(agent), None);
            assert_eq!(ctx.state(agent), Some(StateId::IDLE));
        }
    }

    #[test]
    fn test_next_target_ship_wraps() {
        let mut ctx = context();
        let (solo, members) = squadron(&mut ctx, "solo", 1, 3);
        ctx.destroy_agent(members[1]);
        assert_eq!(ctx.next_target_ship(solo, 0), Some((2, members[2])));
        assert_eq!(ctx.next_target_ship(solo, 2), Some((0, members[0])));
        assert_eq!(ctx.next_target_ship(SquadronId(9), 0), None);
    }

    #[test]
    fn test_agent_joins_one_squadron() {
        let mut ctx = context();
        let a = spawn_at(&mut ctx, 1, DVec3::ZERO);
        let first = ctx.create_squadron("first", FactionId(1));
        let second = ctx.create_squadron("second", FactionId(1));
        ctx.add_to_squadron(first, a).unwrap();
        assert!(matches!(
            ctx.add_to_squadron(second, a),
            Err(AiError::AlreadyInSquadron { .. })
        ));
        assert!(matches!(
            ctx.add_to_squadron(SquadronId(7), a),
            Err(AiError::UnknownSquadron(_))
        ));
    }

    #[test]
    fn test_completed_engagement_retargets_immediately() {
        let mut ctx = context();
        let (_, blue) = squadron(&mut ctx, "blue", 1, 1);
        let (_, red) = squadron(&mut ctx, "red", 2, 2);
        ctx.update_squadrons();

        let hunter = blue[0];
        assert!(ctx.assign_target_agent(hunter, red[0]));
        ctx.destroy_agent(red[0]);
        ctx.tick(DT);

        assert_eq!(ctx.target_agent(hunter), Some(red[1]));
        assert_eq!(ctx.state(hunter), Some(StateId::DOGFIGHT));
        assert!(!ctx.has_completed_action(hunter));
    }

    #[test]
    fn test_periodic_retarget_prunes_destroyed_members() {
        let config = AiConfig {
            retarget_interval_secs: 0.5,
            ..Default::default()
        };
        let mut ctx = AiContext::new(config).unwrap();
        let (_, blue) = squadron(&mut ctx, "blue", 1, 2);
        let (red, red_members) = squadron(&mut ctx, "red", 2, 3);
        ctx.destroy_agent(red_members[0]);
        for _ in 0..30 {
            ctx.tick(DT);
        }
        let squadron = ctx.squadrons().get(red).unwrap();
        assert_eq!(squadron.live_count(), 2);
        assert_eq!(squadron.members().len(), 2);
        for agent in blue {
            assert_ne!(ctx.target_agent(agent), Some(red_members[0]));
            assert!(ctx.target_agent(agent).is_some());
        }
    }

    #[test]
    fn test_random_player_policy_prefers_players() {
        let config = AiConfig {
            targeting_policy: TargetingPolicy::RandomPlayerAgent,
            ..Default::default()
        };
        let mut ctx = AiContext::new(config).unwrap();
        let (_, red) = squadron(&mut ctx, "red", 2, 3);
        let (_, blue) = squadron(&mut ctx, "blue", 1, 2);
        let player = ctx.spawn_player(FactionId(1), Kinematics::default());
        ctx.update_squadrons();

        for agent in red {
            assert_eq!(ctx.target_agent(agent), Some(player));
        }
        // No enemy players for blue: falls back to red members.
        for agent in blue {
            assert!(ctx.target_agent(agent).is_some());
            assert_ne!(ctx.target_agent(agent), Some(player));
        }
    }

    // --- Docking ---

    fn docking_scene() -> (AiContext, AgentId, AgentId, wingman_core::ids::DockingPointId) {
        let mut ctx = context();
        let station = ctx.add_station("carrier");
        let point = ctx
            .add_docking_point(station, DVec3::ZERO, DVec3::Y, DVec3::Z)
            .unwrap();
        let a = spawn_at(&mut ctx, 1, DVec3::new(0.0, 400.0, 0.0));
        let b = spawn_at(&mut ctx, 1, DVec3::new(0.0, 600.0, 0.0));
        (ctx, a, b, point)
    }

    #[test]
    fn test_undock_when_not_docked_is_noop() {
        let (mut ctx, a, _, _) = docking_scene();
        let log = recorder(&mut ctx);
        assert!(!ctx.undock(a));
        assert_eq!(ctx.docking_state(a), DockingState::NotDocked);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_dock_on_occupied_point_fails_cleanly() {
        let (mut ctx, a, b, point) = docking_scene();
        assert_eq!(ctx.dock(a, Some(point)).unwrap(), point);
        let err = ctx.dock(b, Some(point)).unwrap_err();
        assert!(matches!(err, AiError::PointOccupied { occupant, .. } if occupant == a));

        let slot = ctx.docking().point(point).unwrap();
        assert_eq!(slot.occupant(), Some(a));
        assert_eq!(ctx.docking_state(a), DockingState::Docking);
        assert_eq!(ctx.docking_state(b), DockingState::NotDocked);
    }

    #[test]
    fn test_docking_gates_state_and_steering() {
        let (mut ctx, a, b, point) = docking_scene();
        ctx.set_state(a, StateId::MOVE_TO_TARGET);
        ctx.dock(a, Some(point)).unwrap();
        assert_eq!(ctx.state(a), Some(StateId::IDLE));
        assert!(!ctx.set_state(a, StateId::DOGFIGHT));
        assert!(ctx.set_state(a, StateId::IDLE));

        ctx.tick(DT);
        // Straight down the approach axis: final leg into the point.
        let command = ctx.command(a).unwrap();
        assert_eq!(command.target_position, Some(DVec3::ZERO));
        assert_eq!(command.up_hint, Some(DVec3::Z));

        assert!(matches!(ctx.dock(b, None), Err(AiError::NoFreeDockingPoint)));
        ctx.destroy_agent(a);
        assert!(matches!(ctx.dock(a, None), Err(AiError::AgentDestroyed(_))));
        ctx.tick(DT);
        // The destroyed agent's point is free again.
        assert_eq!(ctx.dock(b, None).unwrap(), point);
    }

    #[test]
    fn test_docking_transitions_reach_observer() {
        let (mut ctx, a, _, point) = docking_scene();
        let log = recorder(&mut ctx);
        ctx.dock(a, Some(point)).unwrap();
        ctx.update_kinematics(a, Kinematics::at(DVec3::new(0.0, 2.0, 0.0), -DVec3::Y));
        ctx.tick(DT);
        assert_eq!(ctx.docking_state(a), DockingState::Docked);
        assert!(ctx.undock(a));

        let docking: Vec<_> = log
            .borrow()
            .iter()
            .filter_map(|e| match e {
                AiEvent::DockingStateChanged { previous, current, .. } => Some((*previous, *current)),
                _ => None,
            })
            .collect();
        assert_eq!(
            docking,
            [
                (DockingState::NotDocked, DockingState::Docking),
                (DockingState::Docking, DockingState::Docked),
                (DockingState::Docked, DockingState::Undocking),
            ]
        );
    }

    // --- Determinism ---

    fn skirmish(seed: u64) -> Vec<Option<SteeringCommand>> {
        let config = AiConfig {
            seed,
            ..Default::default()
        };
        let mut ctx = AiContext::new(config).unwrap();
        ctx.register_attack_state().unwrap();
        let attack = ctx.state_id("attack").unwrap();
        ctx.set_engage_state(attack).unwrap();
        let (_, blue) = squadron(&mut ctx, "blue", 1, 4);
        let (_, red) = squadron(&mut ctx, "red", 2, 4);
        ctx.update_squadrons();
        for _ in 0..60 {
            ctx.tick(DT);
        }
        blue.iter().chain(&red).map(|&a| ctx.command(a)).collect()
    }

    #[test]
    fn test_same_seed_same_commands() {
        assert_eq!(skirmish(5), skirmish(5));
    }

    #[test]
    fn test_config_rejects_degenerate_intervals() {
        let config = AiConfig {
            retarget_interval_secs: 0.0,
            ..Default::default()
        };
        assert!(matches!(AiContext::new(config), Err(AiError::Config(_))));
    }

    #[test]
    fn test_closest_enemy_skips_friends_and_the_dead() {
        let mut ctx = context();
        let me = spawn_at(&mut ctx, 1, DVec3::ZERO);
        let _wingman = spawn_at(&mut ctx, 1, DVec3::new(10.0, 0.0, 0.0));
        let near = spawn_at(&mut ctx, 2, DVec3::new(0.0, 300.0, 0.0));
        let far = spawn_at(&mut ctx, 2, DVec3::new(0.0, 900.0, 0.0));

        assert_eq!(ctx.closest_enemy(me), Some(near));
        ctx.destroy_agent(near);
        assert_eq!(ctx.closest_enemy(me), Some(far));
        ctx.destroy_agent(far);
        assert_eq!(ctx.closest_enemy(me), None);
        assert_eq!(ctx.closest_enemy(far), None);
    }

    #[test]
    fn test_closest_enemy_respects_theater() {
        let config = AiConfig {
            theater: Some(Bounds::centered(DVec3::ZERO, 500.0)),
            ..Default::default()
        };
        let mut ctx = AiContext::new(config).unwrap();
        let me = spawn_at(&mut ctx, 1, DVec3::ZERO);
        let outside = spawn_at(&mut ctx, 2, DVec3::new(0.0, 600.0, 0.0));
        let inside = spawn_at(&mut ctx, 2, DVec3::new(0.0, -450.0, 0.0));

        assert_eq!(ctx.closest_enemy(me), Some(inside));
        ctx.destroy_agent(inside);
        assert_eq!(ctx.closest_enemy(me), None);
        assert!(ctx.agent(outside).is_some());
    }

    #[test]
    fn test_policy_change_reports_downgrade_again() {
        let mut ctx = context();
        squadron(&mut ctx, "blue", 1, 2);
        squadron(&mut ctx, "red", 2, 2);
        let log = recorder(&mut ctx);
        let downgrades = |log: &Rc<RefCell<Vec<AiEvent>>>| {
            log.borrow()
                .iter()
                .filter(|e| matches!(e, AiEvent::PolicyDowngraded { .. }))
                .count()
        };

        ctx.set_targeting_policy(TargetingPolicy::NextInOwnSquadron);
        ctx.update_squadrons();
        ctx.update_squadrons();
        assert_eq!(downgrades(&log), 1);

        ctx.set_targeting_policy(TargetingPolicy::RandomEnemyAgent);
        ctx.update_squadrons();
        ctx.set_targeting_policy(TargetingPolicy::NextInOwnSquadron);
        ctx.update_squadrons();
        assert_eq!(downgrades(&log), 2);
    }
}
