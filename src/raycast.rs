//! Ray/grid intersection.
//!
//! Walls only occupy whole cells, so the first wall a ray meets sits on a
//! grid line. Each ray scans the horizontal lines and the vertical lines it
//! crosses separately and keeps the nearer hit.

use std::f32::consts::{FRAC_PI_2, PI};

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::normalize_angle;
use crate::player::Pose;
use crate::world::GridMap;

/// |sin| or |cos| below this makes the matching scan degenerate: the ray
/// runs parallel to that family of grid lines and never crosses one.
const DEGENERATE_EPS: f32 = 1e-6;

/// Offset that moves a wall sample off a grid line into the cell being
/// entered. Capped at half a cell so it never skips that cell.
#[inline]
fn sample_offset(cell: f32) -> f32 {
    1.0_f32.min(0.5 * cell)
}

/// Which way a ray points. Down means +y (screen coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    DownRight,
    DownLeft,
    UpLeft,
    UpRight,
}

impl Quadrant {
    /// `angle` must already be normalized. Down is 0 < angle < π, left is
    /// π/2 < angle < 3π/2, so the axis angles fall into fixed quadrants
    /// (0 is up-right, π/2 down-right, π up-left, 3π/2 up-right).
    pub fn classify(angle: f32) -> Self {
        let down = angle > 0.0 && angle < PI;
        let left = angle > FRAC_PI_2 && angle < 1.5 * PI;
        match (down, left) {
            (true, false) => Quadrant::DownRight,
            (true, true) => Quadrant::DownLeft,
            (false, true) => Quadrant::UpLeft,
            (false, false) => Quadrant::UpRight,
        }
    }

    /// Sign of travel along (x, y).
    #[inline]
    pub fn step_signs(self) -> (f32, f32) {
        match self {
            Quadrant::DownRight => (1.0, 1.0),
            Quadrant::DownLeft => (-1.0, 1.0),
            Quadrant::UpLeft => (-1.0, -1.0),
            Quadrant::UpRight => (1.0, -1.0),
        }
    }

    #[inline]
    pub fn facing_down(self) -> bool {
        matches!(self, Quadrant::DownRight | Quadrant::DownLeft)
    }

    #[inline]
    pub fn facing_left(self) -> bool {
        matches!(self, Quadrant::DownLeft | Quadrant::UpLeft)
    }
}

/// Which family of grid lines a hit landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// A vertical line (constant x).
    Vertical,
    /// A horizontal line (constant y).
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Normalized ray angle.
    pub angle: f32,
    /// Hit point; the caster position when nothing was hit.
    pub point: [f32; 2],
    /// Euclidean distance from the caster, `f32::INFINITY` for no hit.
    pub distance: f32,
    pub boundary: Boundary,
}

impl RayHit {
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.distance.is_finite()
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    point: [f32; 2],
    distance: f32,
}

/// Walk the grid lines of one family. `first` is the first crossing,
/// `step` the offset between crossings and `nudge` the shift that moves the
/// wall sample off the line into the cell being entered.
fn scan(
    map: &GridMap,
    origin: [f32; 2],
    first: [f32; 2],
    step: [f32; 2],
    nudge: [f32; 2],
) -> Option<Candidate> {
    let [mut x, mut y] = first;
    for _ in 0..map.max_scan_steps() {
        if !map.contains(x, y) {
            return None;
        }
        if map.has_wall_at(x + nudge[0], y + nudge[1]) {
            let (dx, dy) = (x - origin[0], y - origin[1]);
            return Some(Candidate {
                point: [x, y],
                distance: (dx * dx + dy * dy).sqrt(),
            });
        }
        x += step[0];
        y += step[1];
    }
    None
}

/// Crossings with horizontal grid lines (constant y).
fn scan_horizontal(
    map: &GridMap,
    origin: [f32; 2],
    angle: f32,
    quadrant: Quadrant,
) -> Option<Candidate> {
    let (sin, cos) = angle.sin_cos();
    if sin.abs() < DEGENERATE_EPS {
        return None;
    }
    let cell = map.cell_size();
    let (sx, sy) = quadrant.step_signs();

    let mut y = (origin[1] / cell).floor() * cell;
    if quadrant.facing_down() {
        y += cell;
    }
    let x = origin[0] + (y - origin[1]) * cos / sin;

    let step = [(cell * cos / sin).abs() * sx, cell * sy];
    let nudge = [0.0, if quadrant.facing_down() { 0.0 } else { -sample_offset(cell) }];
    scan(map, origin, [x, y], step, nudge)
}

/// Crossings with vertical grid lines (constant x).
fn scan_vertical(
    map: &GridMap,
    origin: [f32; 2],
    angle: f32,
    quadrant: Quadrant,
) -> Option<Candidate> {
    let (sin, cos) = angle.sin_cos();
    if cos.abs() < DEGENERATE_EPS {
        return None;
    }
    let cell = map.cell_size();
    let (sx, sy) = quadrant.step_signs();

    let mut x = (origin[0] / cell).floor() * cell;
    if !quadrant.facing_left() {
        x += cell;
    }
    let y = origin[1] + (x - origin[0]) * sin / cos;

    let step = [cell * sx, (cell * sin / cos).abs() * sy];
    let nudge = [if quadrant.facing_left() { -sample_offset(cell) } else { 0.0 }, 0.0];
    scan(map, origin, [x, y], step, nudge)
}

/// Closer of the two scans, a missing scan counting as infinitely far.
/// Ties go to the vertical scan.
fn nearest(
    horz: Option<Candidate>,
    vert: Option<Candidate>,
) -> (Option<Candidate>, Boundary) {
    let horz_dist = horz.map_or(f32::INFINITY, |c| c.distance);
    let vert_dist = vert.map_or(f32::INFINITY, |c| c.distance);
    if vert_dist <= horz_dist {
        (vert, Boundary::Vertical)
    } else {
        (horz, Boundary::Horizontal)
    }
}

/// Nearest wall along one ray. On an exact distance tie the vertical-line
/// hit wins.
pub fn cast_ray(map: &GridMap, origin: [f32; 2], angle: f32) -> RayHit {
    let angle = normalize_angle(angle);
    let quadrant = Quadrant::classify(angle);

    let (winner, boundary) = nearest(
        scan_horizontal(map, origin, angle, quadrant),
        scan_vertical(map, origin, angle, quadrant),
    );

    match winner {
        Some(c) => RayHit {
            angle,
            point: c.point,
            distance: c.distance,
            boundary,
        },
        None => RayHit {
            angle,
            point: origin,
            distance: f32::INFINITY,
            boundary,
        },
    }
}

/// Angle of column `i` out of `columns` spread over `fov`, centred on `heading`.
#[inline]
pub fn column_angle(heading: f32, fov: f32, columns: usize, i: usize) -> f32 {
    normalize_angle(heading - fov * 0.5 + i as f32 * (fov / columns as f32))
}

/// One ray per screen column, left to right. Columns are cast in parallel;
/// every ray reads the same `pose`.
pub fn cast_all_rays(map: &GridMap, pose: &Pose, fov: f32, columns: usize) -> Vec<RayHit> {
    (0..columns)
        .into_par_iter()
        .map(|i| cast_ray(map, pose.pos, column_angle(pose.heading, fov, columns, i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::TAU;

    const CELL: f32 = 32.0;

    fn room(rows: usize, cols: usize) -> Vec<Vec<u8>> {
        (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| (r == 0 || c == 0 || r == rows - 1 || c == cols - 1) as u8)
                    .collect()
            })
            .collect()
    }

    fn assert_close(actual: f32, expected: f32) {
        let tol = 1e-6 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tol,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_quadrant_classification() {
        assert_eq!(Quadrant::classify(0.3), Quadrant::DownRight);
        assert_eq!(Quadrant::classify(2.0), Quadrant::DownLeft);
        assert_eq!(Quadrant::classify(3.5), Quadrant::UpLeft);
        assert_eq!(Quadrant::classify(5.5), Quadrant::UpRight);
        assert_eq!(Quadrant::classify(0.0), Quadrant::UpRight);
        assert_eq!(Quadrant::classify(PI), Quadrant::UpLeft);
        assert_eq!(Quadrant::classify(FRAC_PI_2), Quadrant::DownRight);
        assert_eq!(Quadrant::classify(1.5 * PI), Quadrant::UpRight);
    }

    #[test]
    fn test_straight_ray_hits_wall_column() {
        // Solid column at grid column 2.
        let mut rows = room(5, 6);
        for row in rows.iter_mut() {
            row[2] = 1;
        }
        let map = GridMap::from_rows(rows, CELL).unwrap();
        let hit = cast_ray(&map, [1.5 * CELL, 1.5 * CELL], 0.0);
        assert!(hit.is_hit());
        assert_close(hit.distance, 0.5 * CELL);
        assert_eq!(hit.boundary, Boundary::Vertical);
        assert_close(hit.point[0], 2.0 * CELL);
    }

    #[test]
    fn test_ray_up_in_open_room_hits_top_boundary() {
        // Room with no walls at all: the map edge is the only obstacle.
        let map = GridMap::from_rows(vec![vec![0u8; 15]; 11], CELL).unwrap();
        let origin = [map.width() * 0.5, map.height() * 0.5];
        let hit = cast_ray(&map, origin, 1.5 * PI);
        assert!(hit.is_hit());
        assert_eq!(hit.boundary, Boundary::Horizontal);
        assert!((hit.distance - origin[1]).abs() < 1e-3);
        assert!(hit.point[1].abs() < 1e-6);
    }

    #[test]
    fn test_ray_up_in_bordered_room_hits_border() {
        let map = GridMap::from_rows(room(11, 15), CELL).unwrap();
        let origin = [240.0, 176.0];
        let hit = cast_ray(&map, origin, 1.5 * PI);
        // Border row 0 ends at y = 32.
        assert!((hit.distance - (origin[1] - CELL)).abs() < 1e-3);
    }

    #[test]
    fn test_axis_angles_stay_finite() {
        let map = GridMap::default_layout(CELL);
        for angle in [0.0, FRAC_PI_2, PI, 1.5 * PI, 1e-8, PI - 1e-7, TAU - 1e-7] {
            let hit = cast_ray(&map, [240.0, 176.0], angle);
            assert!(hit.distance.is_finite(), "angle {} -> {:?}", angle, hit);
            assert!(hit.point[0].is_finite() && hit.point[1].is_finite());
        }
    }

    #[test]
    fn test_leftward_ray_samples_left_cell() {
        let map = GridMap::from_rows(room(5, 6), CELL).unwrap();
        let hit = cast_ray(&map, [2.5 * CELL, 2.5 * CELL], PI);
        assert_eq!(hit.boundary, Boundary::Vertical);
        assert_close(hit.distance, 1.5 * CELL);
    }

    #[test]
    fn test_tie_prefers_vertical() {
        let at = |x: f32, d: f32| Some(Candidate { point: [x, 0.0], distance: d });
        let (winner, boundary) = nearest(at(1.0, 10.0), at(2.0, 10.0));
        assert_eq!(boundary, Boundary::Vertical);
        assert_eq!(winner.map(|c| c.point[0]), Some(2.0));

        assert_eq!(nearest(at(1.0, 9.0), at(2.0, 10.0)).1, Boundary::Horizontal);
        assert_eq!(nearest(at(1.0, 9.0), None).1, Boundary::Horizontal);
        let (winner, boundary) = nearest(None, None);
        assert!(winner.is_none());
        assert_eq!(boundary, Boundary::Vertical);
    }

    #[test]
    fn test_diagonal_into_corner() {
        // From a cell centre at 45° the ray meets the cell corner, where
        // both scans land on (nearly) the same point.
        let map = GridMap::from_rows(room(3, 3), CELL).unwrap();
        let hit = cast_ray(&map, [1.5 * CELL, 1.5 * CELL], PI / 4.0);
        assert!((hit.distance - (0.5 * CELL * 2f32.sqrt())).abs() < 1e-3);
        assert!((hit.point[0] - 2.0 * CELL).abs() < 1e-3);
        assert!((hit.point[1] - 2.0 * CELL).abs() < 1e-3);
    }

    #[test]
    fn test_sub_unit_cells_sample_adjacent_cell() {
        let map = GridMap::from_rows(room(5, 5), 0.5).unwrap();
        let up = cast_ray(&map, [1.25, 1.75], 1.5 * PI);
        assert!((up.point[1] - 0.5).abs() < 1e-5, "hit {:?}", up.point);
        assert!((up.distance - 1.25).abs() < 1e-4);

        let left = cast_ray(&map, [1.75, 1.25], PI);
        assert_eq!(left.boundary, Boundary::Vertical);
        assert!((left.point[0] - 0.5).abs() < 1e-5, "hit {:?}", left.point);
        assert!((left.distance - 1.25).abs() < 1e-4);
    }

    #[test]
    fn test_no_hit_is_infinite() {
        // Caster outside the map: every crossing is out of bounds.
        let map = GridMap::from_rows(room(3, 3), CELL).unwrap();
        let hit = cast_ray(&map, [-50.0, -50.0], 1.5 * PI);
        assert!(!hit.is_hit());
        assert_eq!(hit.point, [-50.0, -50.0]);
    }

    #[test]
    fn test_cast_all_rays_spacing() {
        let map = GridMap::default_layout(CELL);
        let pose = Pose {
            pos: [240.0, 176.0],
            heading: 0.1,
        };
        let fov = 60f32.to_radians();
        let hits = cast_all_rays(&map, &pose, fov, 320);
        assert_eq!(hits.len(), 320);
        assert!((hits[0].angle - normalize_angle(0.1 - fov / 2.0)).abs() < 1e-5);
        let step = fov / 320.0;
        for pair in hits.windows(2) {
            let d = normalize_angle(pair[1].angle - pair[0].angle);
            assert!((d - step).abs() < 1e-4);
        }
    }

    proptest! {
        #[test]
        fn rays_terminate_inside_map(
            x in 33.0f32..447.0,
            y in 33.0f32..319.0,
            angle in 0.0f32..TAU,
        ) {
            let map = GridMap::default_layout(CELL);
            prop_assume!(!map.has_wall_at(x, y));
            let hit = cast_ray(&map, [x, y], angle);
            prop_assert!(hit.is_hit());
            prop_assert!(hit.distance >= 0.0);
            prop_assert!(map.contains(hit.point[0], hit.point[1]));
        }

        #[test]
        fn column_count_matches(columns in 1usize..200, heading in 0.0f32..TAU) {
            let map = GridMap::default_layout(CELL);
            let pose = Pose { pos: [240.0, 176.0], heading };
            let hits = cast_all_rays(&map, &pose, 1.0, columns);
            prop_assert_eq!(hits.len(), columns);
            let first = normalize_angle(heading - 0.5);
            let d = (hits[0].angle - first).abs();
            prop_assert!(d.min(TAU - d) < 1e-4);
        }
    }
}
