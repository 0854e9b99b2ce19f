//! Local velocity-obstacle avoidance.
//!
//! Each agent starts from the flow-field direction scaled to its max speed and
//! is pushed away from neighbours it is on course to overlap within its time
//! horizon. Pushes from several neighbours simply add up; nothing is solved
//! jointly and both parties of an encounter react independently each tick.
//! Symmetric head-on encounters can therefore oscillate. That is the intended
//! behaviour of this model, not true reciprocal (ORCA) avoidance.

use crate::crowd::fixed_math::{FixedNum, FixedVec2};
use crate::crowd::flow_field::FlowField;

mod registry;
#[cfg(test)]
mod tests;

pub use registry::Crowd;

/// Per-agent avoidance state, owned by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentState {
    pub position: FixedVec2,
    /// Velocity returned for this agent on the previous tick.
    pub velocity: FixedVec2,
    pub radius: FixedNum,
    pub max_speed: FixedNum,
    /// How far ahead (in seconds) collisions are anticipated.
    pub time_horizon: FixedNum,
}

impl AgentState {
    pub fn new(position: FixedVec2, radius: FixedNum, max_speed: FixedNum, time_horizon: FixedNum) -> Self {
        Self {
            position,
            velocity: FixedVec2::ZERO,
            radius,
            max_speed,
            time_horizon,
        }
    }
}

/// Flow direction at the agent's position scaled to its max speed.
pub fn desired_velocity(field: &FlowField, agent: &AgentState) -> FixedVec2 {
    field.get_direction(agent.position) * agent.max_speed
}

/// Resolve one agent's velocity for this tick.
///
/// `desired_dir` is the sampled flow direction (unit or zero); `neighbors`
/// must not contain the agent itself. For each neighbour, in order:
///
/// - `w = (candidate - neighbour.velocity) - relative_position / time_horizon`
/// - if `|w| < combined_radius / time_horizon`, push the candidate directly
///   away from the neighbour by `max_speed * (combined_radius - distance) / combined_radius`
///
/// The push never pulls agents together: its scale floors at zero once the
/// agents are farther apart than their combined radius. Coincident agents
/// get no push. The result is capped at `max_speed`.
///
/// `_dt` is the driver's timestep. It does not enter the formula.
pub fn compute_velocity(
    agent: &AgentState,
    desired_dir: FixedVec2,
    neighbors: &[AgentState],
    _dt: FixedNum,
) -> FixedVec2 {
    let max_speed = agent.max_speed;
    let mut candidate = desired_dir * max_speed;

    let tau = agent.time_horizon;
    if tau > FixedNum::ZERO {
        for other in neighbors {
            let combined = agent.radius + other.radius;
            if combined <= FixedNum::ZERO {
                continue;
            }

            let rel_pos = other.position - agent.position;
            let rel_vel = candidate - other.velocity;
            let w = rel_vel - rel_pos / tau;
            let threshold = combined / tau;
            if w.length_squared() >= threshold * threshold {
                continue;
            }

            let dist = rel_pos.length();
            if dist == FixedNum::ZERO {
                continue;
            }

            let overlap = ((combined - dist) / combined).max(FixedNum::ZERO);
            let away = -(rel_pos / dist);
            candidate += away * (max_speed * overlap);
        }
    }

    candidate.clamp_length_max(max_speed)
}
