//! Head trail recording and arc-length sampling
//!
//! Body segments are never moved directly. Each tick the head position is
//! recorded onto a bounded trail (newest first) and every segment is placed at
//! `index * spacing` of arc length behind the head, which keeps spacing exact
//! through sharp turns and uneven tick lengths.
//!
//! Points are kept at least `min_step` apart: until the newest point is that
//! far from the previous one, it slides forward with the head instead of a
//! new one being added. Turn corners are always kept. The trail
//! therefore covers a fixed arc length per point whatever the tick rate.

use std::collections::VecDeque;

use super::state::Position;

/// Points closer than this are treated as the same point when walking
const MIN_STEP: f32 = 1e-6;

/// Fixed-capacity trail of head positions, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct PathRecorder {
    points: VecDeque<Position>,
    capacity: usize,
    min_step: f32,
    /// Newest point is a corner and must not slide
    front_pinned: bool,
}

impl PathRecorder {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            min_step: 0.0,
            front_pinned: false,
        }
    }

    /// Minimum arc length between stored points
    pub fn with_min_step(mut self, min_step: f32) -> Self {
        self.set_min_step(min_step);
        self
    }

    pub fn set_min_step(&mut self, min_step: f32) {
        self.min_step = if min_step.is_finite() { min_step.max(0.0) } else { 0.0 };
    }

    pub fn min_step(&self) -> f32 {
        self.min_step
    }

    /// Build a trail from segments ordered head first
    pub fn seeded(capacity: usize, segments: &[Position]) -> Self {
        let mut path = Self::new(capacity);
        for segment in segments.iter().take(path.capacity) {
            path.points.push_back(*segment);
        }
        path
    }

    /// Record a new head position.
    ///
    /// Slides the newest point onto the head while it is still within
    /// `min_step` of the point before it, otherwise adds a point and drops the
    /// oldest when full. Stored points therefore sit at least `min_step` apart.
    pub fn record(&mut self, head: Position) {
        let sliding = !self.front_pinned
            && self.points.len() >= 2
            && self.points[0].distance(self.points[1]) < self.min_step;
        if sliding {
            self.points[0] = head;
            return;
        }
        self.push(head);
        self.front_pinned = false;
    }

    /// Record a turn corner; it stays on the trail until it ages out
    pub fn record_corner(&mut self, corner: Position) {
        self.push(corner);
        self.front_pinned = true;
    }

    fn push(&mut self, point: Position) {
        if self.points.len() == self.capacity {
            self.points.pop_back();
        }
        self.points.push_front(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.front_pinned = false;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn newest(&self) -> Option<Position> {
        self.points.front().copied()
    }

    pub fn oldest(&self) -> Option<Position> {
        self.points.back().copied()
    }

    /// Total arc length covered by the trail
    pub fn total_length(&self) -> f32 {
        self.points
            .iter()
            .zip(self.points.iter().skip(1))
            .map(|(a, b)| a.distance(*b))
            .sum()
    }

    /// Position `distance` units of arc length behind the newest point.
    ///
    /// Clamps to the oldest point when the trail is too short. Returns `None`
    /// only for an empty trail.
    pub fn sample(&self, distance: f32) -> Option<Position> {
        let newest = self.newest()?;
        if distance <= 0.0 {
            return Some(newest);
        }

        let mut walked = 0.0;
        for (a, b) in self.points.iter().zip(self.points.iter().skip(1)) {
            let step = a.distance(*b);
            if step <= MIN_STEP {
                continue;
            }
            if walked + step >= distance {
                let t = (distance - walked) / step;
                return Some(a.lerp(*b, t));
            }
            walked += step;
        }

        self.oldest()
    }

    /// Place segments 1.. along the trail, leaving the head untouched
    pub fn layout(&self, segments: &mut [Position], spacing: f32) {
        for (i, segment) in segments.iter_mut().enumerate().skip(1) {
            if let Some(pos) = self.sample(i as f32 * spacing) {
                *segment = pos;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn close(a: Position, b: Position) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    fn straight_trail() -> PathRecorder {
        // Oldest first: walking right along y = 5
        let mut path = PathRecorder::new(64);
        for i in 0..=10 {
            path.record(Position::new(i as f32 * 0.5, 5.0));
        }
        path
    }

    #[test]
    fn test_record_is_newest_first() {
        let path = straight_trail();
        assert_eq!(path.newest(), Some(Position::new(5.0, 5.0)));
        assert_eq!(path.oldest(), Some(Position::new(0.0, 5.0)));
        assert_eq!(path.len(), 11);
    }

    #[test]
    fn test_capacity_overwrites_oldest() {
        let mut path = PathRecorder::new(3);
        for i in 0..5 {
            path.record(Position::new(i as f32, 0.0));
        }
        assert_eq!(path.len(), 3);
        assert_eq!(path.newest(), Some(Position::new(4.0, 0.0)));
        assert_eq!(path.oldest(), Some(Position::new(2.0, 0.0)));
    }

    #[test]
    fn test_sample_interpolates() {
        let path = straight_trail();
        assert!(close(path.sample(0.0).unwrap(), Position::new(5.0, 5.0)));
        assert!(close(path.sample(1.0).unwrap(), Position::new(4.0, 5.0)));
        assert!(close(path.sample(1.25).unwrap(), Position::new(3.75, 5.0)));
    }

    #[test]
    fn test_sample_clamps_to_oldest() {
        let path = straight_trail();
        assert_eq!(path.sample(50.0), Some(Position::new(0.0, 5.0)));
        assert_eq!(PathRecorder::new(4).sample(1.0), None);
    }

    #[test]
    fn test_sample_follows_corner() {
        // Head came down from (2,0) to (2,2) after travelling right from (0,0)
        let path = PathRecorder::seeded(
            16,
            &[
                Position::new(2.0, 2.0),
                Position::new(2.0, 1.0),
                Position::new(2.0, 0.0),
                Position::new(1.0, 0.0),
                Position::new(0.0, 0.0),
            ],
        );
        assert!(close(path.sample(2.0).unwrap(), Position::new(2.0, 0.0)));
        assert!(close(path.sample(2.5).unwrap(), Position::new(1.5, 0.0)));
        assert!((path.total_length() - 4.0).abs() < EPS);
    }

    #[test]
    fn test_duplicate_points_are_skipped() {
        let path = PathRecorder::seeded(
            8,
            &[
                Position::new(3.0, 0.0),
                Position::new(3.0, 0.0),
                Position::new(2.0, 0.0),
            ],
        );
        assert!(close(path.sample(0.5).unwrap(), Position::new(2.5, 0.0)));
    }

    #[test]
    fn test_layout_spacing_is_exact() {
        let path = straight_trail();
        let mut segments = vec![Position::new(5.0, 5.0); 4];
        path.layout(&mut segments, 1.0);
        for pair in segments.windows(2) {
            assert!((pair[0].distance(pair[1]) - 1.0).abs() < EPS);
        }
        assert!(close(segments[3], Position::new(2.0, 5.0)));
    }

    #[test]
    fn test_short_steps_slide_newest_point() {
        let mut path = PathRecorder::new(32).with_min_step(0.25);
        path.record(Position::new(0.0, 0.0));
        for i in 1..=30 {
            path.record(Position::new(i as f32 * 0.05, 0.0));
        }

        // 1.5 units at 0.05 per step is kept as a handful of points, not thirty
        assert!(path.len() <= 8);
        assert_eq!(path.newest(), Some(Position::new(1.5, 0.0)));
        assert!(close(path.sample(1.0).unwrap(), Position::new(0.5, 0.0)));
    }

    #[test]
    fn test_corner_is_never_slid_away() {
        let mut path = PathRecorder::new(16).with_min_step(0.25);
        path.record(Position::new(0.0, 0.0));
        path.record(Position::new(0.5, 0.0));
        path.record_corner(Position::new(1.0, 0.0));
        path.record(Position::new(1.0, 0.1));
        path.record(Position::new(1.0, 0.2));

        // (1, 0.1) slid up to the head but the corner stayed put
        assert!(close(path.sample(0.2).unwrap(), Position::new(1.0, 0.0)));
        assert!(close(path.sample(0.7).unwrap(), Position::new(0.5, 0.0)));
        assert!((path.total_length() - 1.2).abs() < EPS);
    }

    #[test]
    fn test_min_step_rejects_bad_values() {
        assert_eq!(PathRecorder::new(4).with_min_step(-1.0).min_step(), 0.0);
        assert_eq!(PathRecorder::new(4).with_min_step(f32::NAN).min_step(), 0.0);
        assert_eq!(PathRecorder::new(4).with_min_step(0.5).min_step(), 0.5);
    }

    #[test]
    fn test_trail_covers_arc_beyond_point_count() {
        // Sixty units of travel in 1/60 s ticks at four units per second
        let mut path = PathRecorder::new(300).with_min_step(0.25);
        let step = 4.0 / 60.0;
        for i in 0..=900 {
            path.record(Position::new(i as f32 * step, 0.0));
        }

        assert!(path.len() < 300);
        let head = path.newest().unwrap();
        let mut segments = vec![head; 50];
        path.layout(&mut segments, 1.0);
        for pair in segments.windows(2) {
            assert!((pair[0].distance(pair[1]) - 1.0).abs() < 1e-3);
        }
    }
}
