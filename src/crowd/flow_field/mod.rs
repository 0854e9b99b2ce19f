use bevy::prelude::Resource;
use fixedbitset::FixedBitSet;

use crate::crowd::error::{CrowdError, Result};
use crate::crowd::fixed_math::{FixedNum, FixedVec2};

mod render;
mod repair;
mod sample;
mod solve;

pub use repair::Window;

/// Cost of a cell the relaxation never reached.
pub const UNREACHED: u32 = u32::MAX;

/// Edge weight for an axis-aligned step.
pub const AXIS_COST: u32 = 10;

/// Edge weight for a diagonal step (10·√2 rounded).
pub const DIAGONAL_COST: u32 = 14;

/// One of the eight compass directions a cell can flow toward, or none.
///
/// North is +y. [`FlowDir::NEIGHBORS`] is the fixed enumeration order used
/// both for relaxation and for breaking ties between equally cheap
/// neighbours: N, E, S, W, NE, SE, SW, NW.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlowDir {
    #[default]
    None,
    N,
    E,
    S,
    W,
    NE,
    SE,
    SW,
    NW,
}

impl FlowDir {
    pub const NEIGHBORS: [FlowDir; 8] = [
        FlowDir::N,
        FlowDir::E,
        FlowDir::S,
        FlowDir::W,
        FlowDir::NE,
        FlowDir::SE,
        FlowDir::SW,
        FlowDir::NW,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            FlowDir::None => (0, 0),
            FlowDir::N => (0, 1),
            FlowDir::E => (1, 0),
            FlowDir::S => (0, -1),
            FlowDir::W => (-1, 0),
            FlowDir::NE => (1, 1),
            FlowDir::SE => (1, -1),
            FlowDir::SW => (-1, -1),
            FlowDir::NW => (-1, 1),
        }
    }

    pub fn from_offset(dx: i32, dy: i32) -> Self {
        match (dx.signum(), dy.signum()) {
            (0, 1) => FlowDir::N,
            (1, 0) => FlowDir::E,
            (0, -1) => FlowDir::S,
            (-1, 0) => FlowDir::W,
            (1, 1) => FlowDir::NE,
            (1, -1) => FlowDir::SE,
            (-1, -1) => FlowDir::SW,
            (-1, 1) => FlowDir::NW,
            _ => FlowDir::None,
        }
    }

    /// Edge weight of a single step in this direction.
    pub fn weight(self) -> u32 {
        match self {
            FlowDir::None => 0,
            FlowDir::N | FlowDir::E | FlowDir::S | FlowDir::W => AXIS_COST,
            _ => DIAGONAL_COST,
        }
    }

    /// Raw direction vector with components in {-1, 0, 1}; not normalized.
    pub fn vector(self) -> FixedVec2 {
        let (dx, dy) = self.offset();
        FixedVec2::from_offset(dx, dy)
    }

    pub fn glyph(self) -> char {
        match self {
            FlowDir::None => '.',
            FlowDir::N => '↑',
            FlowDir::E => '→',
            FlowDir::S => '↓',
            FlowDir::W => '←',
            FlowDir::NE => '↗',
            FlowDir::SE => '↘',
            FlowDir::SW => '↙',
            FlowDir::NW => '↖',
        }
    }
}

/// Flow field over a rectangular grid, solved toward a single target cell.
///
/// # Algorithm
///
/// 1. **Obstacles:** a bitset of impassable cells.
/// 2. **Cost field:** Dijkstra relaxation from the target over the
///    8-connected grid, 10 per axis step and 14 per diagonal.
/// 3. **Directions:** every reached cell points at its strictly cheapest
///    passable neighbour (ties go to the first in [`FlowDir::NEIGHBORS`]).
///
/// After the first [`solve`](Self::solve), obstacle edits through
/// [`set_obstacle`](Self::set_obstacle) repair only a window around the
/// edited cell instead of re-solving everything. Windowed repair is an
/// approximation: cells outside the window keep their costs even when the
/// edit changed their true shortest path. Pick a radius that bounds the
/// affected region or call `solve` again when that matters.
///
/// # Example
///
/// ```rust
/// use flowcrowd::crowd::{FixedNum, FixedVec2, FlowDir, FlowField};
///
/// let mut field = FlowField::new(10, 10, FixedNum::from_num(1), FixedVec2::ZERO);
/// field.solve((9, 9)).unwrap();
/// assert_eq!(field.cost(0, 0), Some(9 * 14));
/// assert_eq!(field.flow_dir(0, 0), Some(FlowDir::NE));
///
/// // Toggle an obstacle and repair a 5x5 window around it.
/// field.set_obstacle(4, 4, true, Some(2));
/// ```
///
/// A single field must not be mutated from two threads at once; wrap it in
/// a lock or keep it on one owning thread.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct FlowField {
    width: usize,
    height: usize,
    cell_size: FixedNum,
    origin: FixedVec2, // Bottom-left corner of the grid in world space
    obstacles: FixedBitSet,
    costs: Vec<u32>,
    directions: Vec<FlowDir>,
    target: Option<(usize, usize)>,
}

impl FlowField {
    /// Build an empty, unsolved field. Panics on zero dimensions or a
    /// non-positive cell size; use [`try_new`](Self::try_new) for untrusted input.
    pub fn new(width: usize, height: usize, cell_size: FixedNum, origin: FixedVec2) -> Self {
        match Self::try_new(width, height, cell_size, origin) {
            Ok(field) => field,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_new(
        width: usize,
        height: usize,
        cell_size: FixedNum,
        origin: FixedVec2,
    ) -> Result<Self> {
        if width == 0 || height == 0 || cell_size <= FixedNum::ZERO {
            return Err(CrowdError::InvalidDimensions {
                width,
                height,
                cell_size: cell_size.to_num(),
            });
        }

        let size = width * height;
        Ok(Self {
            width,
            height,
            cell_size,
            origin,
            obstacles: FixedBitSet::with_capacity(size),
            costs: vec![UNREACHED; size],
            directions: vec![FlowDir::None; size],
            target: None,
        })
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn cell_size(&self) -> FixedNum { self.cell_size }
    pub fn origin(&self) -> FixedVec2 { self.origin }
    pub fn target(&self) -> Option<(usize, usize)> { self.target }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn get_index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn is_obstacle(&self, x: usize, y: usize) -> bool {
        self.in_bounds(x, y) && self.obstacles.contains(self.get_index(x, y))
    }

    /// Accumulated path cost to the target, `UNREACHED` if no path was found,
    /// `None` outside the grid.
    pub fn cost(&self, x: usize, y: usize) -> Option<u32> {
        self.in_bounds(x, y).then(|| self.costs[self.get_index(x, y)])
    }

    pub fn flow_dir(&self, x: usize, y: usize) -> Option<FlowDir> {
        self.in_bounds(x, y).then(|| self.directions[self.get_index(x, y)])
    }

    pub fn obstacles(&self) -> &FixedBitSet {
        &self.obstacles
    }

    /// Replace the obstacle layout wholesale without repairing. Callers are
    /// expected to `solve` afterwards.
    pub(crate) fn load_obstacles(&mut self, obstacles: &FixedBitSet) {
        self.obstacles.clear();
        self.obstacles.union_with(obstacles);
    }

    pub fn world_to_grid(&self, world_pos: FixedVec2) -> Option<(usize, usize)> {
        let local_pos = world_pos - self.origin;
        if local_pos.x < FixedNum::ZERO || local_pos.y < FixedNum::ZERO {
            return None;
        }

        let x = (local_pos.x / self.cell_size).to_num::<usize>();
        let y = (local_pos.y / self.cell_size).to_num::<usize>();

        self.in_bounds(x, y).then_some((x, y))
    }

    /// Like [`world_to_grid`](Self::world_to_grid) but clamps far-away
    /// positions onto the nearest edge cell.
    pub fn world_to_grid_clamped(&self, world_pos: FixedVec2) -> (usize, usize) {
        let local_pos = world_pos - self.origin;
        let max_x = FixedNum::from_num(self.width - 1);
        let max_y = FixedNum::from_num(self.height - 1);
        let gx = (local_pos.x / self.cell_size).floor().clamp(FixedNum::ZERO, max_x);
        let gy = (local_pos.y / self.cell_size).floor().clamp(FixedNum::ZERO, max_y);
        (gx.to_num::<usize>(), gy.to_num::<usize>())
    }

    /// World position of the centre of a cell.
    pub fn grid_to_world(&self, x: usize, y: usize) -> FixedVec2 {
        let offset = self.cell_size / FixedNum::from_num(2);
        self.origin
            + FixedVec2::new(
                FixedNum::from_num(x) * self.cell_size + offset,
                FixedNum::from_num(y) * self.cell_size + offset,
            )
    }

    pub(crate) fn neighbor(&self, x: usize, y: usize, dir: FlowDir) -> Option<(usize, usize)> {
        let (dx, dy) = dir.offset();
        let nx = x.checked_add_signed(dx as isize)?;
        let ny = y.checked_add_signed(dy as isize)?;
        self.in_bounds(nx, ny).then_some((nx, ny))
    }

    /// Number of passable cells with a finite cost.
    pub fn reached_count(&self) -> usize {
        self.costs.iter().filter(|&&c| c != UNREACHED).count()
    }
}
