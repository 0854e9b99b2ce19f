use super::FlowField;

impl FlowField {
    /// Debug rendering: one glyph per cell, highest row first. `X` marks an
    /// obstacle, arrows give the flow direction and `.` means none.
    ///
    /// Highest row first so the text reads like a map with +y pointing up.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.width * 2 + 1) * self.height);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let idx = self.get_index(x, y);
                let glyph = if self.obstacles.contains(idx) {
                    'X'
                } else {
                    self.directions[idx].glyph()
                };
                if x > 0 {
                    out.push(' ');
                }
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}
