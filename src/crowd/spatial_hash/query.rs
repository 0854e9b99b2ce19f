use std::hash::Hash;

use rustc_hash::FxHashSet;

use super::{BucketKey, SpatialHash};
use crate::crowd::fixed_math::{FixedNum, FixedVec2};

impl<K: Copy + Eq + Hash> SpatialHash<K> {
    /// All agents whose recorded position lies within `radius` of `pos`
    /// (inclusive). The querying agent is included if it is indexed inside the
    /// radius; exclude it by key or use [`query_nearby_into`](Self::query_nearby_into).
    pub fn query_nearby(&self, pos: FixedVec2, radius: FixedNum) -> FxHashSet<K> {
        let mut out = Vec::new();
        self.query_nearby_into(pos, radius, None, &mut out);
        out.into_iter().collect()
    }

    /// Allocation-free proximity query for per-tick callers.
    ///
    /// Clears `out_agents`, then fills it with every agent within `radius` of
    /// `pos` except `exclude`. Each agent sits in exactly one bucket, so the
    /// output has no duplicates. Order is unspecified.
    pub fn query_nearby_into(
        &self,
        pos: FixedVec2,
        radius: FixedNum,
        exclude: Option<K>,
        out_agents: &mut Vec<K>,
    ) {
        out_agents.clear();
        if radius < FixedNum::ZERO || self.is_empty() {
            return;
        }

        let radius_sq = radius * radius;
        let min = (self.axis_bucket(pos.x - radius), self.axis_bucket(pos.y - radius));
        let max = (self.axis_bucket(pos.x + radius), self.axis_bucket(pos.y + radius));

        let mut visit = |key: BucketKey, agents: &[K]| {
            if key.0 < min.0 || key.0 > max.0 || key.1 < min.1 || key.1 > max.1 {
                return;
            }
            for &agent in agents {
                if Some(agent) == exclude {
                    continue;
                }
                if let Some(entry) = self.entries.get(&agent) {
                    if (entry.position - pos).length_squared() <= radius_sq {
                        out_agents.push(agent);
                    }
                }
            }
        };

        let span = (max.0 as i64 - min.0 as i64 + 1) * (max.1 as i64 - min.1 as i64 + 1);
        if span > self.buckets.len() as i64 {
            // Huge radius relative to occupancy: walk the live buckets instead.
            for (&key, agents) in &self.buckets {
                visit(key, agents);
            }
        } else {
            for by in min.1..=max.1 {
                for bx in min.0..=max.0 {
                    if let Some(agents) = self.bucket((bx, by)) {
                        visit((bx, by), agents);
                    }
                }
            }
        }
    }
}
