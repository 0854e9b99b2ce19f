use super::*;

fn num(v: f32) -> FixedNum {
    FixedNum::from_num(v)
}

fn agent_at(x: f32, y: f32) -> AgentState {
    AgentState::new(FixedVec2::from_f32(x, y), num(0.5), num(2.0), num(1.0))
}

fn dt() -> FixedNum {
    num(1.0 / 30.0)
}

#[test]
fn test_no_neighbors_follows_desired_direction() {
    let agent = agent_at(0.0, 0.0);
    let v = compute_velocity(&agent, FixedVec2::from_f32(1.0, 0.0), &[], dt());
    assert_eq!(v, FixedVec2::from_f32(2.0, 0.0));
}

#[test]
fn test_zero_direction_without_neighbors_is_zero() {
    let agent = agent_at(0.0, 0.0);
    assert_eq!(compute_velocity(&agent, FixedVec2::ZERO, &[], dt()), FixedVec2::ZERO);
}

#[test]
fn test_overlapping_neighbor_pushes_away() {
    let agent = agent_at(0.0, 0.0);
    // Combined radius 1.0, neighbour 0.5 away on +x.
    let other = agent_at(0.5, 0.0);

    let v = compute_velocity(&agent, FixedVec2::ZERO, &[other], dt());
    // Push = max_speed * (1.0 - 0.5) / 1.0 = 1.0 toward -x.
    assert_eq!(v, FixedVec2::from_f32(-1.0, 0.0));
}

#[test]
fn test_approaching_but_separated_neighbor_is_not_attracted() {
    let agent = agent_at(0.0, 0.0);
    // 1.5 apart and heading straight at it: w is inside the obstacle cone,
    // but they do not overlap yet.
    let other = agent_at(1.5, 0.0);
    let v = compute_velocity(&agent, FixedVec2::from_f32(1.0, 0.0), &[other], dt());
    assert_eq!(v, FixedVec2::from_f32(2.0, 0.0));
}

#[test]
fn test_diverging_neighbor_is_ignored() {
    let agent = agent_at(0.0, 0.0);
    let mut other = agent_at(0.5, 0.0);
    other.velocity = FixedVec2::from_f32(2.0, 0.0);

    // Moving away from us fast enough that w leaves the threshold disc.
    let v = compute_velocity(&agent, FixedVec2::from_f32(-1.0, 0.0), &[other], dt());
    assert_eq!(v, FixedVec2::from_f32(-2.0, 0.0));
}

#[test]
fn test_coincident_neighbor_gives_no_push() {
    let agent = agent_at(3.0, 3.0);
    let other = agent_at(3.0, 3.0);
    let v = compute_velocity(&agent, FixedVec2::ZERO, &[other], dt());
    assert_eq!(v, FixedVec2::ZERO);
}

#[test]
fn test_pushes_accumulate_additively() {
    let mut agent = agent_at(0.0, 0.0);
    agent.time_horizon = num(0.5);
    let right = agent_at(0.5, 0.0);
    let up = agent_at(0.0, 0.5);

    // The second check already sees the first push in the candidate.

    let v = compute_velocity(&agent, FixedVec2::ZERO, &[right, up], dt());
    assert_eq!(v, FixedVec2::from_f32(-1.0, -1.0));
}

#[test]
fn test_symmetric_encounter_both_react() {
    let a = agent_at(-0.25, 0.0);
    let b = agent_at(0.25, 0.0);

    let va = compute_velocity(&a, FixedVec2::ZERO, &[b], dt());
    let vb = compute_velocity(&b, FixedVec2::ZERO, &[a], dt());
    assert!(va.x < FixedNum::ZERO);
    assert_eq!(va, -vb, "independent reactions mirror each other");
}

#[test]
fn test_speed_is_capped() {
    let mut rng = fastrand::Rng::with_seed(99);
    for _ in 0..500 {
        let mut agent = agent_at(rng.f32() * 4.0, rng.f32() * 4.0);
        agent.max_speed = num(rng.f32() * 5.0);
        agent.velocity = FixedVec2::from_f32(rng.f32() * 20.0 - 10.0, rng.f32() * 20.0 - 10.0);

        let neighbors: Vec<AgentState> = (0..rng.usize(0..8))
            .map(|_| {
                let mut n = agent_at(rng.f32() * 4.0, rng.f32() * 4.0);
                n.radius = num(rng.f32() * 2.0);
                n.velocity = FixedVec2::from_f32(rng.f32() * 6.0 - 3.0, rng.f32() * 6.0 - 3.0);
                n
            })
            .collect();
        let dir = FixedVec2::from_f32(rng.f32() * 2.0 - 1.0, rng.f32() * 2.0 - 1.0).normalize();
        let step = if rng.bool() { dt() } else { FixedNum::ZERO };

        let v = compute_velocity(&agent, dir, &neighbors, step);
        assert!(
            v.length_squared() <= agent.max_speed * agent.max_speed,
            "speed {} exceeds {}",
            v.length(),
            agent.max_speed
        );
    }
}

#[test]
fn test_zero_dt_still_applies_formula() {
    let mut agent = agent_at(0.0, 0.0);
    agent.velocity = FixedVec2::from_f32(0.5, 0.0);

    // Previous velocity is ignored: desired direction times max speed.
    let v = compute_velocity(&agent, FixedVec2::from_f32(0.0, 1.0), &[], FixedNum::ZERO);
    assert_eq!(v, FixedVec2::from_f32(0.0, 2.0));

    // Pushes still apply with a zero step.
    let other = agent_at(0.5, 0.0);
    let pushed = compute_velocity(&agent, FixedVec2::ZERO, &[other], FixedNum::ZERO);
    assert_eq!(pushed, compute_velocity(&agent, FixedVec2::ZERO, &[other], dt()));
    assert!(pushed.x < FixedNum::ZERO);
}

#[test]
fn test_crowd_tick_uses_previous_velocities_and_persists() {
    let mut field = FlowField::new(10, 10, num(1.0), FixedVec2::ZERO);
    field.solve((9, 5)).unwrap();

    let short_horizon = |x: f32, y: f32| AgentState { time_horizon: num(0.25), ..agent_at(x, y) };

    let mut crowd: Crowd<u32> = Crowd::new(num(2.0), num(3.0)).unwrap();
    crowd.insert(1, short_horizon(2.5, 5.5));
    crowd.insert(2, short_horizon(2.9, 5.5));
    crowd.insert(3, short_horizon(8.0, 0.5));

    let out = crowd.tick(&field, dt());
    assert_eq!(out.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![1, 2, 3]);
    for &(agent, velocity) in &out {
        assert_eq!(crowd.velocity_of(agent), Some(velocity));
    }
    assert_eq!(crowd.tick_count(), 1);

    // Agent 2 is ahead of agent 1 and overlapping: pushed forward harder
    // than agent 1, which is pushed back.
    let v1 = crowd.velocity_of(1).unwrap();
    let v2 = crowd.velocity_of(2).unwrap();
    assert!(v2.x > v1.x);
}

#[test]
fn test_crowd_neighbors_exclude_self_and_far_agents() {
    let mut crowd: Crowd<u32> = Crowd::new(num(2.0), num(3.0)).unwrap();
    crowd.insert(5, agent_at(0.0, 0.0));
    crowd.insert(2, agent_at(1.0, 0.0));
    crowd.insert(9, agent_at(0.0, 2.0));
    crowd.insert(4, agent_at(10.0, 0.0));

    let mut out = Vec::new();
    crowd.neighbors_of(5, &mut out);
    let positions: Vec<FixedVec2> = out.iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![FixedVec2::from_f32(1.0, 0.0), FixedVec2::from_f32(0.0, 2.0)]);
}

#[test]
fn test_crowd_set_position_and_remove() {
    let mut crowd: Crowd<u32> = Crowd::new(num(2.0), num(3.0)).unwrap();
    crowd.insert(1, agent_at(0.0, 0.0));

    assert!(crowd.set_position(1, FixedVec2::from_f32(20.0, 20.0)));
    assert_eq!(crowd.index().position_of(1), Some(FixedVec2::from_f32(20.0, 20.0)));
    assert!(!crowd.set_position(2, FixedVec2::ZERO));

    assert!(crowd.remove(1).is_some());
    assert!(crowd.index().is_empty());
    assert!(crowd.remove(1).is_none());
}

#[test]
fn test_crowd_tick_matches_per_agent_velocity_for() {
    let mut field = FlowField::new(12, 12, num(1.0), FixedVec2::ZERO);
    field.solve((11, 6)).unwrap();

    let mut rng = fastrand::Rng::with_seed(17);
    let mut crowd: Crowd<u32> = Crowd::new(num(1.5), num(2.0)).unwrap();
    for id in 0..25 {
        crowd.insert(id, agent_at(rng.f32() * 5.0, rng.f32() * 5.0));
    }

    // Neighbour buffers reused across agents must not leak between them.
    let expected: Vec<(u32, FixedVec2)> = (0..25)
        .map(|id| (id, crowd.velocity_for(id, &field, dt()).unwrap()))
        .collect();
    assert_eq!(crowd.tick(&field, dt()), expected);
}
