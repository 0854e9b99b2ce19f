//! Agents steered by flow fields, with the crowd and pool held as ECS
//! resources the way a game would own them.

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use flowcrowd::crowd::{Crowd, CrowdConfig, FieldId, FieldPool, FixedNum, FixedVec2, FlowField};

fn num(v: f32) -> FixedNum {
    FixedNum::from_num(v)
}

fn dt() -> FixedNum {
    num(1.0) / num(20.0)
}

/// Advance every agent one tick along `field` and move it by `velocity * dt`.
fn step(crowd: &mut Crowd<u32>, field: &FlowField) {
    for (id, velocity) in crowd.tick(field, dt()) {
        let next = crowd.state(id).unwrap().position + velocity * dt();
        assert!(crowd.set_position(id, next));
    }
}

#[test]
fn test_single_agent_reaches_target_cell() {
    let config = CrowdConfig::default();
    let mut field = FlowField::new(10, 10, num(1.0), FixedVec2::ZERO);
    field.solve((9, 9)).unwrap();

    let mut crowd = Crowd::<u32>::from_config(&config).unwrap();
    crowd.insert(0, config.agent_state(FixedVec2::from_f32(0.5, 0.5)));

    for _ in 0..100 {
        step(&mut crowd, &field);
    }

    let state = crowd.state(0).unwrap();
    assert_eq!(field.world_to_grid(state.position), Some((9, 9)));
    assert!(state.velocity.length() <= state.max_speed);
}

#[test]
fn test_speed_cap_holds_for_a_dense_crowd() {
    let config = CrowdConfig::default();
    let mut field = FlowField::new(16, 16, num(1.0), FixedVec2::ZERO);
    field.solve((15, 8)).unwrap();

    let mut rng = fastrand::Rng::with_seed(42);
    let mut crowd = Crowd::<u32>::from_config(&config).unwrap();
    for id in 0..40 {
        let pos = FixedVec2::from_f32(rng.f32() * 4.0, rng.f32() * 16.0);
        crowd.insert(id, config.agent_state(pos));
    }

    for _ in 0..50 {
        step(&mut crowd, &field);
        for id in 0..40 {
            let state = crowd.state(id).unwrap();
            assert!(state.velocity.length() <= state.max_speed, "agent {id} too fast");
            assert_eq!(crowd.index().position_of(id), Some(state.position));
        }
    }
    assert_eq!(crowd.tick_count(), 50);
}

#[test]
fn test_overlapping_pair_separates() {
    let config = CrowdConfig::default();
    // An unsolved field has no direction anywhere, leaving only the pushes.
    let field = FlowField::new(8, 8, num(1.0), FixedVec2::ZERO);

    let mut crowd = Crowd::<u32>::from_config(&config).unwrap();
    crowd.insert(1, config.agent_state(FixedVec2::from_f32(4.0, 4.0)));
    crowd.insert(2, config.agent_state(FixedVec2::from_f32(4.4, 4.0)));

    let gap = |c: &Crowd<u32>| c.state(1).unwrap().position.distance(c.state(2).unwrap().position);
    let before = gap(&crowd);
    step(&mut crowd, &field);
    assert!(gap(&crowd) > before);
    assert!(crowd.velocity_of(1).unwrap().x < FixedNum::ZERO);
    assert!(crowd.velocity_of(2).unwrap().x > FixedNum::ZERO);
}

#[test]
fn test_agents_follow_their_own_pool_fields() {
    let config = CrowdConfig {
        grid_width: 12,
        grid_height: 12,
        ..Default::default()
    };
    let mut pool = FieldPool::new(config.field_template()).unwrap();
    let east = pool.field_for_target((11, 6)).unwrap();
    let west = pool.field_for_target((0, 6)).unwrap();

    let mut crowd = Crowd::<u32>::from_config(&config).unwrap();
    crowd.insert(0, config.agent_state(FixedVec2::from_f32(6.5, 2.5)));
    crowd.insert(1, config.agent_state(FixedVec2::from_f32(6.5, 9.5)));
    let assignment = [east, west];

    let resolved = crowd.tick_with(dt(), |id, state| {
        pool.get(assignment[id as usize]).unwrap().get_direction(state.position)
    });

    assert_eq!(resolved.len(), 2);
    assert!(resolved[0].1.x > FixedNum::ZERO);
    assert!(resolved[1].1.x < FixedNum::ZERO);
}

#[derive(Resource)]
struct Assignments(Vec<FieldId>);

fn steer_system(mut crowd: ResMut<Crowd<u32>>, pool: Res<FieldPool>, assignments: Res<Assignments>) {
    let resolved = crowd.tick_with(dt(), |id, state| {
        pool.get(assignments.0[id as usize])
            .map(|f| f.get_direction(state.position))
            .unwrap_or(FixedVec2::ZERO)
    });
    for (id, velocity) in resolved {
        let next = crowd.state(id).map(|s| s.position + velocity * dt());
        if let Some(next) = next {
            crowd.set_position(id, next);
        }
    }
}

fn wall_system(mut pool: ResMut<FieldPool>, config: Res<CrowdConfig>) {
    for y in 2..10 {
        pool.set_obstacle_all(6, y, true, config.repair_radius);
    }
}

#[test]
fn test_resources_drive_a_world() {
    let config = CrowdConfig {
        grid_width: 12,
        grid_height: 12,
        ..Default::default()
    };

    let mut pool = FieldPool::new(config.field_template()).unwrap();
    let target = pool.field_for_target((11, 6)).unwrap();
    let mut crowd = Crowd::<u32>::from_config(&config).unwrap();
    for id in 0..6 {
        crowd.insert(id, config.agent_state(FixedVec2::from_f32(1.5, 1.5 + 1.5 * id as f32)));
    }

    let mut world = World::new();
    world.insert_resource(Assignments(vec![target; 6]));
    world.insert_resource(pool);
    world.insert_resource(crowd);
    world.insert_resource(config);

    world.run_system_once(wall_system).unwrap();
    for _ in 0..20 {
        world.run_system_once(steer_system).unwrap();
    }

    let pool = world.resource::<FieldPool>();
    let field = pool.get(target).unwrap();
    assert!(field.is_obstacle(6, 5));
    // The gaps at y = 0..2 and y = 10..12 keep the far side reachable.
    assert!(field.cost(0, 6).unwrap() < flowcrowd::crowd::UNREACHED);

    let crowd = world.resource::<Crowd<u32>>();
    assert_eq!(crowd.tick_count(), 20);
    for id in 0..6 {
        assert!(crowd.state(id).unwrap().position.x > num(1.5), "agent {id} did not advance");
    }
}
