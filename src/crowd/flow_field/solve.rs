use std::cmp::Reverse;
use std::collections::BinaryHeap;

use bevy::log::{debug, warn};

use super::{FlowDir, FlowField, Window, UNREACHED};
use crate::crowd::error::{CrowdError, Result};
use crate::crowd::profiling::profile;

/// Min-priority frontier of `(tentative cost, cell index)`.
pub(super) type Frontier = BinaryHeap<Reverse<(u32, usize)>>;

impl FlowField {
    /// Full solve toward `target`: resets every cell, relaxes the whole grid
    /// from the target and derives all flow directions.
    ///
    /// Fails with [`CrowdError::TargetOutOfBounds`] before touching any state
    /// if the target is outside the grid. An obstacle target is accepted but
    /// leaves every cell unreached.
    #[profile(2)]
    pub fn solve(&mut self, target: (usize, usize)) -> Result<()> {
        let (tx, ty) = target;
        if !self.in_bounds(tx, ty) {
            return Err(CrowdError::TargetOutOfBounds {
                x: tx,
                y: ty,
                width: self.width,
                height: self.height,
            });
        }

        self.costs.fill(UNREACHED);
        self.directions.fill(FlowDir::None);
        self.target = Some(target);

        let target_idx = self.get_index(tx, ty);
        if self.obstacles.contains(target_idx) {
            warn!("[FLOW_FIELD] Target ({}, {}) is an obstacle; field left unreached", tx, ty);
            return Ok(());
        }

        self.costs[target_idx] = 0;
        let mut frontier = Frontier::new();
        frontier.push(Reverse((0, target_idx)));

        let window = Window::full(self.width, self.height);
        self.relax(&mut frontier, &window);
        self.recompute_directions(&window);

        debug!(
            "[FLOW_FIELD] Solved {}x{} toward ({}, {}): {} cells reached",
            self.width,
            self.height,
            tx,
            ty,
            self.reached_count()
        );
        Ok(())
    }

    /// Drain the frontier, relaxing 8-connected neighbours inside `window`.
    ///
    /// Cells outside the window are never written. Duplicate frontier entries
    /// are expected; an entry whose cost is worse than the cell's current best
    /// is skipped.
    pub(super) fn relax(&mut self, frontier: &mut Frontier, window: &Window) {
        while let Some(Reverse((cost, idx))) = frontier.pop() {
            if cost > self.costs[idx] {
                continue; // stale
            }

            let x = idx % self.width;
            let y = idx / self.width;

            for dir in FlowDir::NEIGHBORS {
                let Some((nx, ny)) = self.neighbor(x, y, dir) else {
                    continue;
                };
                if !window.contains(nx, ny) {
                    continue;
                }

                let n_idx = self.get_index(nx, ny);
                if self.obstacles.contains(n_idx) {
                    continue;
                }

                let new_cost = cost.saturating_add(dir.weight());
                if new_cost < self.costs[n_idx] {
                    self.costs[n_idx] = new_cost;
                    frontier.push(Reverse((new_cost, n_idx)));
                }
            }
        }
    }

    /// Re-derive flow directions for every cell inside `window`.
    ///
    /// Neighbours outside the window are still read.
    pub(super) fn recompute_directions(&mut self, window: &Window) {
        for y in window.min_y..=window.max_y {
            for x in window.min_x..=window.max_x {
                let idx = self.get_index(x, y);
                self.directions[idx] = self.best_direction(x, y);
            }
        }
    }

    /// Direction toward the strictly cheapest passable, reached neighbour.
    fn best_direction(&self, x: usize, y: usize) -> FlowDir {
        let idx = self.get_index(x, y);
        if self.obstacles.contains(idx) || self.costs[idx] == UNREACHED {
            return FlowDir::None;
        }

        let mut best_cost = self.costs[idx];
        let mut best_dir = FlowDir::None;

        for dir in FlowDir::NEIGHBORS {
            let Some((nx, ny)) = self.neighbor(x, y, dir) else {
                continue;
            };
            let n_idx = self.get_index(nx, ny);
            if self.obstacles.contains(n_idx) {
                continue;
            }

            let n_cost = self.costs[n_idx];
            if n_cost < best_cost {
                best_cost = n_cost;
                best_dir = dir;
            }
        }

        best_dir
    }
}
