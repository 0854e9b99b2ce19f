use std::cmp::Reverse;

use bevy::log::debug;

use super::solve::Frontier;
use super::{FlowDir, FlowField, UNREACHED};
use crate::crowd::profiling::profile;

/// Inclusive rectangle of cells, always clamped to the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl Window {
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            min_x: 0,
            min_y: 0,
            max_x: width - 1,
            max_y: height - 1,
        }
    }

    /// Square of side `2 * radius + 1` centred on `(x, y)`, clamped to the grid.
    pub fn around(x: usize, y: usize, radius: usize, width: usize, height: usize) -> Self {
        Self::spanning((x, y), (x, y), radius, width, height)
    }

    /// Bounding box of two corners grown by `margin` cells, clamped to the grid.
    pub fn spanning(
        a: (usize, usize),
        b: (usize, usize),
        margin: usize,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            min_x: a.0.min(b.0).saturating_sub(margin),
            min_y: a.1.min(b.1).saturating_sub(margin),
            max_x: a.0.max(b.0).saturating_add(margin).min(width - 1),
            max_y: a.1.max(b.1).saturating_add(margin).min(height - 1),
        }
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    fn on_edge(&self, x: usize, y: usize) -> bool {
        x == self.min_x || x == self.max_x || y == self.min_y || y == self.max_y
    }

    pub fn cell_count(&self) -> usize {
        (self.max_x - self.min_x + 1) * (self.max_y - self.min_y + 1)
    }
}

impl FlowField {
    /// Toggle an obstacle and repair the field around it.
    ///
    /// Out-of-range cells and unchanged flags are silent no-ops. With
    /// `radius` set, only the `(2 * radius + 1)²` window around the cell is
    /// re-relaxed, using the costs just outside it as boundary conditions;
    /// `None` repairs the whole grid. Before the first [`solve`](Self::solve)
    /// only the flag changes.
    pub fn set_obstacle(&mut self, x: usize, y: usize, is_obstacle: bool, radius: Option<usize>) {
        if !self.apply_obstacle(x, y, is_obstacle) {
            return;
        }

        let window = match radius {
            Some(r) => Window::around(x, y, r, self.width, self.height),
            None => Window::full(self.width, self.height),
        };
        self.repair(&window);
    }

    /// Set every cell in the inclusive rectangle `a..=b` to `is_obstacle` and
    /// run a single repair over the rectangle grown by `margin` (`None`
    /// repairs the whole grid). The far corner is clamped to the grid; a
    /// rectangle lying entirely outside it changes nothing. Returns how many
    /// cells actually changed.
    pub fn set_obstacle_region(
        &mut self,
        a: (usize, usize),
        b: (usize, usize),
        is_obstacle: bool,
        margin: Option<usize>,
    ) -> usize {
        let lo = (a.0.min(b.0), a.1.min(b.1));
        if lo.0 >= self.width || lo.1 >= self.height {
            return 0;
        }
        let hi = (
            a.0.max(b.0).min(self.width - 1),
            a.1.max(b.1).min(self.height - 1),
        );

        let mut changed = 0;
        for y in lo.1..=hi.1 {
            for x in lo.0..=hi.0 {
                if self.apply_obstacle(x, y, is_obstacle) {
                    changed += 1;
                }
            }
        }
        if changed == 0 {
            return 0;
        }

        let window = match margin {
            Some(m) => Window::spanning(lo, hi, m, self.width, self.height),
            None => Window::full(self.width, self.height),
        };
        self.repair(&window);
        changed
    }

    /// Flip the flag if it differs. Returns whether anything changed.
    fn apply_obstacle(&mut self, x: usize, y: usize, is_obstacle: bool) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.get_index(x, y);
        if self.obstacles.contains(idx) == is_obstacle {
            return false;
        }

        self.obstacles.set(idx, is_obstacle);
        if is_obstacle {
            self.costs[idx] = UNREACHED;
            self.directions[idx] = FlowDir::None;
        }
        true
    }

    /// Re-relax `window` against the unchanged costs around it.
    #[profile(1)]
    fn repair(&mut self, window: &Window) {
        let Some((tx, ty)) = self.target else {
            return;
        };

        for y in window.min_y..=window.max_y {
            for x in window.min_x..=window.max_x {
                let idx = self.get_index(x, y);
                if !self.obstacles.contains(idx) {
                    self.costs[idx] = UNREACHED;
                    self.directions[idx] = FlowDir::None;
                }
            }
        }

        let mut frontier = Frontier::new();
        if window.contains(tx, ty) {
            let target_idx = self.get_index(tx, ty);
            if !self.obstacles.contains(target_idx) {
                self.costs[target_idx] = 0;
                frontier.push(Reverse((0, target_idx)));
            }
        } else {
            self.seed_window_edge(window, &mut frontier);
        }

        self.relax(&mut frontier, window);
        self.recompute_directions(window);

        debug!(
            "[FLOW_FIELD] Repaired window ({}, {})..=({}, {}), {} cells",
            window.min_x,
            window.min_y,
            window.max_x,
            window.max_y,
            window.cell_count()
        );
    }

    /// Seed every passable edge cell of the window with the cheapest
    /// `outside cost + edge weight` over its reached neighbours outside the
    /// window.
    fn seed_window_edge(&mut self, window: &Window, frontier: &mut Frontier) {
        for y in window.min_y..=window.max_y {
            for x in window.min_x..=window.max_x {
                if !window.on_edge(x, y) {
                    continue;
                }
                let idx = self.get_index(x, y);
                if self.obstacles.contains(idx) {
                    continue;
                }

                let mut seed = UNREACHED;
                for dir in FlowDir::NEIGHBORS {
                    let Some((nx, ny)) = self.neighbor(x, y, dir) else {
                        continue;
                    };
                    if window.contains(nx, ny) {
                        continue;
                    }
                    let n_idx = self.get_index(nx, ny);
                    let n_cost = self.costs[n_idx];
                    if self.obstacles.contains(n_idx) || n_cost == UNREACHED {
                        continue;
                    }
                    seed = seed.min(n_cost.saturating_add(dir.weight()));
                }

                if seed < self.costs[idx] {
                    self.costs[idx] = seed;
                    frontier.push(Reverse((seed, idx)));
                }
            }
        }
    }
}
