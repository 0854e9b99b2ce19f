use std::hash::Hash;

use bevy::prelude::Resource;
use rustc_hash::FxHashMap;

use super::{compute_velocity, AgentState};
use crate::crowd::config::CrowdConfig;
use crate::crowd::error::Result;
use crate::crowd::fixed_math::{FixedNum, FixedVec2};
use crate::crowd::flow_field::FlowField;
use crate::crowd::spatial_hash::SpatialHash;
use crate::profile_log;
use crate::crowd::profiling::profile;

/// Agent registry pairing avoidance state with a [`SpatialHash`].
///
/// The crowd keeps each agent's last returned velocity so the next tick can
/// compute relative velocities. It never moves agents: after a
/// [`tick`](Self::tick) the caller integrates `velocity * dt` and writes the
/// new position back with [`set_position`](Self::set_position). Agents must
/// be [`remove`](Self::remove)d before the caller discards them.
#[derive(Resource, Clone, Debug)]
pub struct Crowd<K> {
    index: SpatialHash<K>,
    agents: FxHashMap<K, AgentState>,
    neighbor_distance: FixedNum,
    tick_count: u64,
}

impl<K: Copy + Eq + Hash + Ord> Crowd<K> {
    pub fn new(bucket_size: FixedNum, neighbor_distance: FixedNum) -> Result<Self> {
        Ok(Self {
            index: SpatialHash::try_new(bucket_size)?,
            agents: FxHashMap::default(),
            neighbor_distance,
            tick_count: 0,
        })
    }

    pub fn from_config(config: &CrowdConfig) -> Result<Self> {
        Self::new(config.fixed_bucket_size(), config.fixed_neighbor_distance())
    }

    pub fn index(&self) -> &SpatialHash<K> { &self.index }
    pub fn neighbor_distance(&self) -> FixedNum { self.neighbor_distance }
    pub fn tick_count(&self) -> u64 { self.tick_count }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Add (or replace) an agent.
    pub fn insert(&mut self, agent: K, state: AgentState) {
        self.index.insert(agent, state.position);
        self.agents.insert(agent, state);
    }

    pub fn remove(&mut self, agent: K) -> Option<AgentState> {
        self.index.remove(agent);
        self.agents.remove(&agent)
    }

    /// Record the caller's integrated position. Returns `false` for unknown agents.
    pub fn set_position(&mut self, agent: K, position: FixedVec2) -> bool {
        let Some(state) = self.agents.get_mut(&agent) else {
            return false;
        };
        state.position = position;
        self.index.update(agent, position);
        true
    }

    pub fn state(&self, agent: K) -> Option<&AgentState> {
        self.agents.get(&agent)
    }

    pub fn velocity_of(&self, agent: K) -> Option<FixedVec2> {
        self.agents.get(&agent).map(|s| s.velocity)
    }

    /// States of the agents within the neighbour distance of `agent`,
    /// excluding itself, ordered by key.
    pub fn neighbors_of(&self, agent: K, out: &mut Vec<AgentState>) {
        self.collect_neighbors(agent, &mut Vec::new(), out);
    }

    /// [`neighbors_of`](Self::neighbors_of) with a caller-owned key buffer.
    fn collect_neighbors(&self, agent: K, keys: &mut Vec<K>, out: &mut Vec<AgentState>) {
        out.clear();
        keys.clear();
        let Some(state) = self.agents.get(&agent) else {
            return;
        };

        self.index
            .query_nearby_into(state.position, self.neighbor_distance, Some(agent), keys);
        keys.sort_unstable();
        out.extend(keys.iter().filter_map(|k| self.agents.get(k).copied()));
    }

    /// Velocity `agent` would get this tick on `field`, without recording it.
    pub fn velocity_for(&self, agent: K, field: &FlowField, dt: FixedNum) -> Option<FixedVec2> {
        let state = self.agents.get(&agent)?;
        let mut neighbors = Vec::new();
        self.neighbors_of(agent, &mut neighbors);
        Some(compute_velocity(state, field.get_direction(state.position), &neighbors, dt))
    }

    /// Resolve every agent against one shared field.
    pub fn tick(&mut self, field: &FlowField, dt: FixedNum) -> Vec<(K, FixedVec2)> {
        self.tick_with(dt, |_, state| field.get_direction(state.position))
    }

    /// Resolve every agent, sampling each one's desired direction from
    /// `desired_dir` (e.g. a per-agent field from a pool).
    ///
    /// All velocities are computed from the previous tick's velocities, in key
    /// order, then stored together. Returns `(agent, velocity)` in key order.
    #[profile(4)]
    pub fn tick_with<F>(&mut self, dt: FixedNum, mut desired_dir: F) -> Vec<(K, FixedVec2)>
    where
        F: FnMut(K, &AgentState) -> FixedVec2,
    {
        let mut keys: Vec<K> = self.agents.keys().copied().collect();
        keys.sort_unstable();

        let mut scratch = Vec::new();
        let mut neighbors = Vec::new();
        let mut resolved = Vec::with_capacity(keys.len());
        for &agent in &keys {
            let Some(state) = self.agents.get(&agent) else {
                continue;
            };
            self.collect_neighbors(agent, &mut scratch, &mut neighbors);
            let dir = desired_dir(agent, state);
            resolved.push((agent, compute_velocity(state, dir, &neighbors, dt)));
        }

        for &(agent, velocity) in &resolved {
            if let Some(state) = self.agents.get_mut(&agent) {
                state.velocity = velocity;
            }
        }

        self.tick_count += 1;
        profile_log!(self.tick_count, "[CROWD] tick {}: {} agents", self.tick_count, resolved.len());
        resolved
    }
}
