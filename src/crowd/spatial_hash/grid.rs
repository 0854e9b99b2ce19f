use std::hash::Hash;

use super::{BucketKey, Entry, SpatialHash};
use crate::crowd::fixed_math::{FixedNum, FixedVec2};

impl<K: Copy + Eq + Hash> SpatialHash<K> {
    /// Bucket coordinates covering `pos`.
    pub fn bucket_key(&self, pos: FixedVec2) -> BucketKey {
        (self.axis_bucket(pos.x), self.axis_bucket(pos.y))
    }

    pub(crate) fn axis_bucket(&self, v: FixedNum) -> i32 {
        (v / self.cell_size).floor().saturating_to_num::<i32>()
    }

    /// File `agent` under the bucket for `pos` and record the position.
    ///
    /// Inserting an agent that is already indexed moves it instead, so an
    /// agent never sits in two buckets.
    pub fn insert(&mut self, agent: K, pos: FixedVec2) {
        if self.entries.contains_key(&agent) {
            self.remove(agent);
        }

        let bucket = self.bucket_key(pos);
        self.buckets.entry(bucket).or_default().push(agent);
        self.entries.insert(agent, Entry { position: pos, bucket });
    }

    /// Forget an agent. Unknown agents are ignored.
    pub fn remove(&mut self, agent: K) {
        let Some(entry) = self.entries.remove(&agent) else {
            return;
        };

        if let Some(list) = self.buckets.get_mut(&entry.bucket) {
            if let Some(slot) = list.iter().position(|&k| k == agent) {
                list.swap_remove(slot);
            }
            if list.is_empty() {
                self.buckets.remove(&entry.bucket);
            }
        }
    }

    /// Move an indexed agent to `new_pos`: remove followed by insert.
    /// Unknown agents are ignored.
    pub fn update(&mut self, agent: K, new_pos: FixedVec2) {
        let bucket = self.bucket_key(new_pos);
        let Some(entry) = self.entries.get_mut(&agent) else {
            return;
        };

        // Same bucket: only the recorded position changes.
        if bucket == entry.bucket {
            entry.position = new_pos;
            return;
        }

        self.remove(agent);
        self.insert(agent, new_pos);
    }
}
