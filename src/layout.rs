//! Screen geometry for the 2×2 container grid.
//!
//! Renderers draw from these rects and pointer input is hit-tested against
//! them, so both always agree on where a container is.

use crate::chest::ContainerId;

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

const MAX_CELL: f32 = 220.0;
const COLS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerLayout {
    pub width: f32,
    pub height: f32,
    rects: [(ContainerId, Rect); 4],
}

impl ContainerLayout {
    pub fn compute(width: f32, height: f32) -> Self {
        let short = width.min(height);
        let margin = short * 0.06;
        // Band at the top reserved for the gem counter.
        let top_area = height * 0.14;
        let avail_w = width - margin * 2.0;
        let avail_h = height - top_area - margin * 2.0;

        let gap = short * 0.04;
        let cell_w = (avail_w - gap) / 2.0;
        let cell_h = (avail_h - gap) / 2.0;
        let size = cell_w.min(cell_h).min(MAX_CELL).max(0.0);

        let grid_w = size * 2.0 + gap;
        let grid_h = size * 2.0 + gap;
        let start_x = (width - grid_w) / 2.0;
        let start_y = top_area + (avail_h - grid_h) / 2.0 + margin;

        let rects = ContainerId::ALL.map(|id| {
            let idx = id.index();
            let (row, col) = (idx / COLS, idx % COLS);
            (
                id,
                Rect::new(
                    start_x + col as f32 * (size + gap),
                    start_y + row as f32 * (size + gap),
                    size,
                    size,
                ),
            )
        });

        Self {
            width,
            height,
            rects,
        }
    }

    pub fn rect(&self, id: ContainerId) -> Rect {
        self.rects[id.index()].1
    }

    pub fn rects(&self) -> impl Iterator<Item = (ContainerId, Rect)> + '_ {
        self.rects.iter().copied()
    }

    pub fn hit_test(&self, px: f32, py: f32) -> Option<ContainerId> {
        self.rects
            .iter()
            .find(|(_, r)| r.contains(px, py))
            .map(|(id, _)| *id)
    }
}
