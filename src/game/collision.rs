use super::state::Position;

/// True if `pos` lies outside `[0, width) x [0, height)`
pub fn out_of_bounds(pos: Position, width: u32, height: u32) -> bool {
    pos.x < 0.0 || pos.y < 0.0 || pos.x >= width as f32 || pos.y >= height as f32
}

/// Head-to-body test.
///
/// The first `skip` segments (head included) never count, which lets the
/// snake turn sharply without tripping on its own neck. Snakes of `skip`
/// segments or fewer cannot hit themselves at all.
pub fn hits_body(head: Position, segments: &[Position], skip: usize, radius: f32) -> bool {
    if segments.len() <= skip {
        return false;
    }
    segments[skip..].iter().any(|s| s.distance(head) < radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_checking() {
        assert!(!out_of_bounds(Position::new(0.0, 0.0), 20, 20));
        assert!(!out_of_bounds(Position::new(19.99, 19.99), 20, 20));
        assert!(out_of_bounds(Position::new(-0.01, 5.0), 20, 20));
        assert!(out_of_bounds(Position::new(20.0, 5.0), 20, 20));
        assert!(out_of_bounds(Position::new(5.0, 20.0), 20, 20));
    }

    #[test]
    fn test_leading_segments_are_ignored() {
        let segments = [
            Position::new(5.0, 5.0),
            Position::new(5.1, 5.0),
            Position::new(5.2, 5.0),
            Position::new(9.0, 9.0),
        ];
        assert!(!hits_body(Position::new(5.0, 5.0), &segments, 3, 0.4));
        assert!(hits_body(Position::new(9.3, 9.0), &segments, 3, 0.4));
    }

    #[test]
    fn test_short_snake_never_collides() {
        let segments = [
            Position::new(5.0, 5.0),
            Position::new(5.0, 5.0),
            Position::new(5.0, 5.0),
        ];
        assert!(!hits_body(Position::new(5.0, 5.0), &segments, 3, 0.4));
    }

    #[test]
    fn test_radius_is_exclusive() {
        let segments = [Position::new(0.0, 0.0); 4];
        assert!(!hits_body(Position::new(0.4, 0.0), &segments, 3, 0.4));
        assert!(hits_body(Position::new(0.39, 0.0), &segments, 3, 0.4));
    }
}
