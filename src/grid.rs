//! Uniform spatial hash broadphase. Rebuilt every step from the current
//! segment positions; points are never inserted; a point query walks the
//! 3x3 cell neighborhood around its own cell (spec §4.4.3).

use std::collections::HashMap;

use crate::geometry::Vec2;
use crate::state::CachedState;

/// Collision-free for cell coordinates in `[-2^25, 2^25 - 1]` (spec §4.3).
fn cell_key(cx: i32, cy: i32) -> i64 {
    const OFFSET: i64 = 1 << 25;
    const SHIFT: i64 = 1 << 26;
    (cx as i64 + OFFSET) * SHIFT + (cy as i64 + OFFSET)
}

pub struct Grid {
    origin: Vec2,
    cell_size: f32,
    cells: HashMap<i64, Vec<usize>>,
    /// `segment_empty[i]` is true for inert or degenerate segments, which
    /// never occupy a cell.
    segment_empty: Vec<bool>,
    visited: Vec<u32>,
    next_query_id: u32,
}

impl Grid {
    pub fn new() -> Grid {
        Grid {
            origin: Vec2::ZERO,
            cell_size: 1.0,
            cells: HashMap::new(),
            segment_empty: Vec::new(),
            visited: Vec::new(),
            next_query_id: 0,
        }
    }

    fn cell_of(&self, p: Vec2) -> (i32, i32) {
        let cx = ((p.x - self.origin.x) / self.cell_size).floor() as i32;
        let cy = ((p.y - self.origin.y) / self.cell_size).floor() as i32;
        (cx, cy)
    }

    /// Rebuilds the segment index from scratch for the current step.
    pub fn rebuild(&mut self, state: &CachedState) {
        self.origin = match state.bounds {
            Some(b) => Vec2::new(b.min_x, b.min_y),
            None => Vec2::ZERO,
        };
        self.cell_size = state.cell_size;
        let influence = state.global_influence;

        self.cells.clear();
        self.segment_empty.clear();
        self.segment_empty.resize(state.n_segments(), true);
        self.visited.clear();
        self.visited.resize(state.n_segments(), 0);
        self.next_query_id = 0;

        for i in 0..state.n_segments() {
            if state.segment_inert(i) {
                continue;
            }
            let a = state.point_pos(state.seg_a[i].unwrap());
            let b = state.point_pos(state.seg_b[i].unwrap());
            let min_x = a.x.min(b.x) - influence;
            let max_x = a.x.max(b.x) + influence;
            let min_y = a.y.min(b.y) - influence;
            let max_y = a.y.max(b.y) + influence;
            if max_x < min_x || max_y < min_y {
                continue;
            }
            self.segment_empty[i] = false;
            let (cx0, cy0) = self.cell_of(Vec2::new(min_x, min_y));
            let (cx1, cy1) = self.cell_of(Vec2::new(max_x, max_y));
            for cx in cx0..=cx1 {
                for cy in cy0..=cy1 {
                    self.cells.entry(cell_key(cx, cy)).or_default().push(i);
                }
            }
        }
    }

    fn next_query(&mut self) -> u32 {
        self.next_query_id += 1;
        self.next_query_id
    }

    /// Segments sharing at least one cell with segment `seg_idx`, that
    /// have index strictly greater than `seg_idx`, deduped.
    pub fn segments_near_segment(&mut self, seg_idx: usize, state: &CachedState) -> Vec<usize> {
        let mut out = Vec::new();
        if state.segment_inert(seg_idx) {
            return out;
        }
        let a = state.point_pos(state.seg_a[seg_idx].unwrap());
        let b = state.point_pos(state.seg_b[seg_idx].unwrap());
        let influence = state.global_influence;
        let min_x = a.x.min(b.x) - influence;
        let max_x = a.x.max(b.x) + influence;
        let min_y = a.y.min(b.y) - influence;
        let max_y = a.y.max(b.y) + influence;
        let (cx0, cy0) = self.cell_of(Vec2::new(min_x, min_y));
        let (cx1, cy1) = self.cell_of(Vec2::new(max_x, max_y));
        let query_id = self.next_query();
        for cx in cx0..=cx1 {
            for cy in cy0..=cy1 {
                if let Some(candidates) = self.cells.get(&cell_key(cx, cy)) {
                    for &j in candidates {
                        if j > seg_idx && self.visited[j] != query_id {
                            self.visited[j] = query_id;
                            out.push(j);
                        }
                    }
                }
            }
        }
        out
    }

    /// Segments occupying the 3x3 cell neighborhood around point `p`,
    /// deduped.
    pub fn segments_near_point(&mut self, p: Vec2) -> Vec<usize> {
        let mut out = Vec::new();
        let (cx, cy) = self.cell_of(p);
        let query_id = self.next_query();
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(candidates) = self.cells.get(&cell_key(cx + dx, cy + dy)) {
                    for &j in candidates {
                        if self.visited[j] != query_id {
                            self.visited[j] = query_id;
                            out.push(j);
                        }
                    }
                }
            }
        }
        out
    }
}

impl Default for Grid {
    fn default() -> Grid {
        Grid::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Point, Problem, Segment};

    #[test]
    fn cell_key_is_injective_over_small_range() {
        let mut seen = std::collections::HashSet::new();
        for cx in -5..5 {
            for cy in -5..5 {
                assert!(seen.insert(cell_key(cx, cy)));
            }
        }
    }

    #[test]
    fn segments_near_point_finds_overlapping_segment() {
        let mut problem = Problem::default();
        problem.points.push(Point::new("a", -5.0, 0.0));
        problem.points.push(Point::new("b", 5.0, 0.0));
        problem.segments.push(Segment::new("s1", "a", "b"));
        problem.interactions.point_segment_repel.min_separation = 1.0;
        let state = CachedState::build(&problem);
        let mut grid = Grid::new();
        grid.rebuild(&state);
        let found = grid.segments_near_point(Vec2::new(0.0, 0.1));
        assert_eq!(found, vec![0]);
    }

    #[test]
    fn segments_near_segment_dedupes_across_cells() {
        let mut problem = Problem::default();
        problem.points.push(Point::new("a", -5.0, 0.0));
        problem.points.push(Point::new("b", 5.0, 0.0));
        problem.points.push(Point::new("c", -5.0, 1.0));
        problem.points.push(Point::new("d", 5.0, 1.0));
        problem.segments.push(Segment::new("s1", "a", "b"));
        problem.segments.push(Segment::new("s2", "c", "d"));
        let state = CachedState::build(&problem);
        let mut grid = Grid::new();
        grid.rebuild(&state);
        let found = grid.segments_near_segment(0, &state);
        assert_eq!(found, vec![1]);
    }
}
