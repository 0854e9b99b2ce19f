use super::{FlowDir, FlowField};
use crate::crowd::fixed_math::{FixedNum, FixedVec2};

impl FlowField {
    /// Movement direction at a world position.
    ///
    /// Bilinearly blends the raw `{-1, 0, 1}²` direction vectors of the four
    /// cells whose centres surround `world_pos`, then normalizes the blend.
    /// Obstacle and unreached cells contribute zero, which damps flow along
    /// obstacle edges. Positions outside the grid are clamped onto it. The
    /// result is a unit vector, or zero where no direction exists.
    pub fn get_direction(&self, world_pos: FixedVec2) -> FixedVec2 {
        let local = world_pos - self.origin;
        let half = FixedNum::from_num(0.5);
        let max_x = FixedNum::from_num(self.width - 1);
        let max_y = FixedNum::from_num(self.height - 1);

        // Continuous grid coordinates measured from cell centres.
        let gx = (local.x / self.cell_size - half).clamp(FixedNum::ZERO, max_x);
        let gy = (local.y / self.cell_size - half).clamp(FixedNum::ZERO, max_y);

        let x0 = gx.floor().to_num::<usize>();
        let y0 = gy.floor().to_num::<usize>();
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let tx = gx - FixedNum::from_num(x0);
        let ty = gy - FixedNum::from_num(y0);
        let sx = FixedNum::ONE - tx;
        let sy = FixedNum::ONE - ty;

        let bottom = self.cell_vector(x0, y0) * sx + self.cell_vector(x1, y0) * tx;
        let top = self.cell_vector(x0, y1) * sx + self.cell_vector(x1, y1) * tx;
        let blended = bottom * sy + top * ty;

        blended.normalize()
    }

    /// Direction of the single cell containing `world_pos` (clamped), without
    /// blending.
    pub fn nearest_direction(&self, world_pos: FixedVec2) -> FlowDir {
        let (x, y) = self.world_to_grid_clamped(world_pos);
        self.directions[self.get_index(x, y)]
    }

    fn cell_vector(&self, x: usize, y: usize) -> FixedVec2 {
        self.directions[self.get_index(x, y)].vector()
    }
}
