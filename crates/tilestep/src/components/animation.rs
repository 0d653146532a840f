//! Sprite-sheet frame bookkeeping.
//!
//! Rendering is the driver's job; this only tracks which cell of a
//! `cols` x `rows` sheet is current and how many full cycles have played.

/// Frame state for a sheet laid out left to right, top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    pub cols: u32,
    pub rows: u32,
    /// Milliseconds per frame.
    pub frame_delay: f32,
    /// Cycles to play before finishing. 0 loops forever.
    pub cycles: u32,
    /// Current column.
    pub col: u32,
    /// Current row.
    pub row: u32,
    /// Completed cycles.
    pub cycle: u32,
    /// Time accumulated in the current frame.
    pub timer: f32,
}

impl SpriteSheet {
    /// A sheet that loops forever.
    pub fn looping(cols: u32, rows: u32, frame_delay: f32) -> Self {
        Self::one_shot(cols, rows, frame_delay, 0)
    }

    /// A sheet that finishes after `cycles` full passes.
    pub fn one_shot(cols: u32, rows: u32, frame_delay: f32, cycles: u32) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
            frame_delay,
            cycles,
            col: 0,
            row: 0,
            cycle: 0,
            timer: 0.0,
        }
    }

    /// Current (col, row) cell.
    pub fn current_frame(&self) -> (u32, u32) {
        (self.col, self.row)
    }

    pub fn is_finished(&self) -> bool {
        self.cycles > 0 && self.cycle >= self.cycles
    }

    /// Advance by `dt` ms. At most one frame per call; the frame timer restarts
    /// from zero rather than carrying the remainder. Returns true if the frame
    /// changed.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.is_finished() {
            return false;
        }

        self.timer += dt;
        if self.timer < self.frame_delay {
            return false;
        }

        self.timer = 0.0;
        self.col += 1;
        if self.col == self.cols {
            self.col = 0;
            self.row += 1;
            if self.row == self.rows {
                self.row = 0;
                self.cycle += 1;
            }
        }
        true
    }
}
