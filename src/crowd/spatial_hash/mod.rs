use std::hash::Hash;

use bevy::prelude::Resource;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::crowd::error::{CrowdError, Result};
use crate::crowd::fixed_math::{FixedNum, FixedVec2};

mod grid;
mod query;

/// Bucket coordinates: `floor(pos / cell_size)` per axis.
pub type BucketKey = (i32, i32);

/// Agents sharing one bucket. Most buckets hold a handful of agents.
pub(crate) type Bucket<K> = SmallVec<[K; 8]>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Entry {
    pub position: FixedVec2,
    pub bucket: BucketKey,
}

/// Uniform-bucket spatial index from 2D position to the agents in each bucket.
///
/// Unbounded: buckets are created on demand in a hash map and evicted once
/// empty, so agents may roam anywhere. Agent keys are opaque (`Entity`, an
/// integer id, ...); the index only remembers each agent's last recorded
/// position.
///
/// # Example
///
/// ```rust
/// use flowcrowd::crowd::{FixedNum, FixedVec2, SpatialHash};
///
/// let mut hash = SpatialHash::new(FixedNum::from_num(4));
/// hash.insert(1_u32, FixedVec2::from_f32(0.0, 0.0));
/// hash.insert(2_u32, FixedVec2::from_f32(3.0, 0.0));
/// hash.insert(3_u32, FixedVec2::from_f32(9.0, 0.0));
///
/// let nearby = hash.query_nearby(FixedVec2::ZERO, FixedNum::from_num(5));
/// assert!(nearby.contains(&1) && nearby.contains(&2) && !nearby.contains(&3));
/// ```
///
/// # Performance
///
/// - **Insert / remove / update:** O(1) amortized plus a short bucket edit
/// - **Query:** O(buckets in range + candidates)
///
/// The bucket size only affects performance, never which agents a query
/// returns. Mutations must be serialized by the caller.
#[derive(Resource, Clone, Debug)]
pub struct SpatialHash<K> {
    cell_size: FixedNum,
    buckets: FxHashMap<BucketKey, Bucket<K>>,
    entries: FxHashMap<K, Entry>,
}

impl<K: Copy + Eq + Hash> SpatialHash<K> {
    /// Panics on a non-positive bucket size; see [`try_new`](Self::try_new).
    pub fn new(cell_size: FixedNum) -> Self {
        match Self::try_new(cell_size) {
            Ok(hash) => hash,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_new(cell_size: FixedNum) -> Result<Self> {
        if cell_size <= FixedNum::ZERO {
            return Err(CrowdError::InvalidCellSize(cell_size.to_num()));
        }
        Ok(Self {
            cell_size,
            buckets: FxHashMap::default(),
            entries: FxHashMap::default(),
        })
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.entries.clear();
    }

    pub fn cell_size(&self) -> FixedNum { self.cell_size }

    /// Number of indexed agents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of non-empty buckets.
    /// Useful for debugging and diagnostics.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn contains(&self, agent: K) -> bool {
        self.entries.contains_key(&agent)
    }

    /// Last recorded position of an agent.
    pub fn position_of(&self, agent: K) -> Option<FixedVec2> {
        self.entries.get(&agent).map(|e| e.position)
    }

    /// Bucket the agent is currently filed under.
    pub fn bucket_of(&self, agent: K) -> Option<BucketKey> {
        self.entries.get(&agent).map(|e| e.bucket)
    }

    /// Every indexed agent with its recorded position, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (K, FixedVec2)> + '_ {
        self.entries.iter().map(|(&k, e)| (k, e.position))
    }

    pub(crate) fn bucket(&self, key: BucketKey) -> Option<&Bucket<K>> {
        self.buckets.get(&key)
    }
}
