use crate::config::Config;
use crate::normalize_angle;
use crate::world::GridMap;

/// Caster position in world units and heading in radians, [0, 2π).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub pos: [f32; 2],
    pub heading: f32,
}

/// The four logical input signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    TurnLeft,
    TurnRight,
    MoveForward,
    MoveBackward,
}

/// Independent turn/walk axes, each in {-1, 0, 1}.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub turn: i8,
    pub walk: i8,
}

impl MovementIntent {
    /// Start sets the event's axis to ±1, stop clears that axis. Opposite
    /// signals are last-write-wins.
    pub fn apply(&mut self, event: InputEvent, active: bool) {
        let (axis, dir) = match event {
            InputEvent::TurnLeft => (&mut self.turn, -1),
            InputEvent::TurnRight => (&mut self.turn, 1),
            InputEvent::MoveForward => (&mut self.walk, 1),
            InputEvent::MoveBackward => (&mut self.walk, -1),
        };
        *axis = if active { dir } else { 0 };
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pose: Pose,
    intent: MovementIntent,
    move_speed: f32,     // world units per tick
    rotation_speed: f32, // radians per tick
}

impl Player {
    pub fn new(pos: [f32; 2], heading: f32, move_speed: f32, rotation_speed: f32) -> Self {
        Self {
            pose: Pose {
                pos,
                heading: normalize_angle(heading),
            },
            intent: MovementIntent::default(),
            move_speed,
            rotation_speed,
        }
    }

    pub fn from_config(config: &Config, map: &GridMap) -> Self {
        Self::new(
            config.start_position(map),
            config.start_heading(),
            config.move_speed,
            config.rotation_speed(),
        )
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    #[inline]
    pub fn intent(&self) -> MovementIntent {
        self.intent
    }

    pub fn start(&mut self, event: InputEvent) {
        self.intent.apply(event, true);
    }

    pub fn stop(&mut self, event: InputEvent) {
        self.intent.apply(event, false);
    }

    /// Advance one tick. The move is all-or-nothing: a candidate position
    /// inside a wall leaves the player where it was. Returns whether the
    /// position changed.
    pub fn update(&mut self, map: &GridMap) -> bool {
        self.pose.heading = normalize_angle(
            self.pose.heading + self.intent.turn as f32 * self.rotation_speed,
        );

        if self.intent.walk == 0 {
            return false;
        }
        let step = self.intent.walk as f32 * self.move_speed;
        let (s, c) = self.pose.heading.sin_cos();
        let nx = self.pose.pos[0] + c * step;
        let ny = self.pose.pos[1] + s * step;

        if map.has_wall_at(nx, ny) {
            log::trace!("move to ({:.2}, {:.2}) blocked", nx, ny);
            return false;
        }
        self.pose.pos = [nx, ny];
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const CELL: f32 = 32.0;

    /// Bordered 15x11 room with a single interior wall at row 2, column 5.
    fn bordered_map() -> GridMap {
        let mut rows = vec![vec![0u8; 15]; 11];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                if r == 0 || r == 10 || c == 0 || c == 14 {
                    *cell = 1;
                }
            }
        }
        rows[2][5] = 1;
        GridMap::from_rows(rows, CELL).unwrap()
    }

    #[test]
    fn test_intent_last_write_wins() {
        let mut intent = MovementIntent::default();
        intent.apply(InputEvent::MoveForward, true);
        intent.apply(InputEvent::MoveBackward, true);
        assert_eq!(intent.walk, -1);
        // releasing forward still clears the shared axis
        intent.apply(InputEvent::MoveForward, false);
        assert_eq!(intent.walk, 0);

        intent.apply(InputEvent::TurnRight, true);
        assert_eq!(intent, MovementIntent { turn: 1, walk: 0 });
        intent.apply(InputEvent::TurnLeft, true);
        assert_eq!(intent.turn, -1);
    }

    #[test]
    fn test_turn_wraps_heading() {
        let map = bordered_map();
        let mut player = Player::new([240.0, 176.0], 0.0, 2.0, 0.1);
        player.start(InputEvent::TurnLeft);
        player.update(&map);
        let h = player.pose().heading;
        assert!((0.0..2.0 * PI).contains(&h));
        assert!((h - (2.0 * PI - 0.1)).abs() < 1e-5);
        assert_eq!(player.pose().pos, [240.0, 176.0]);
    }

    #[test]
    fn test_walk_stops_at_bottom_wall() {
        let map = bordered_map();
        let start_y = 5.5 * CELL;
        let speed = 2.0;
        let mut player = Player::new([7.5 * CELL, start_y], FRAC_PI_2, speed, 2f32.to_radians());
        player.start(InputEvent::MoveForward);

        // Row 10 starts at y = 320; the last reachable y on the 2-unit
        // lattice from 176 is the largest 176 + 2k below that.
        let wall_top = 10.0 * CELL;
        let k = ((wall_top - start_y) / speed).ceil() - 1.0;
        let expected_y = start_y + k * speed;
        assert_eq!(expected_y, 318.0);

        for _ in 0..200 {
            player.update(&map);
        }
        let [x, y] = player.pose().pos;
        assert!((y - expected_y).abs() < 1e-3, "stopped at y = {}", y);
        assert!((x - 7.5 * CELL).abs() < 1e-3);
        assert!(!player.update(&map));
    }

    #[test]
    fn test_blocked_move_keeps_position_without_sliding() {
        let map = bordered_map();
        // Just left of the interior wall cell (row 2, col 5), heading into it diagonally.
        let mut player = Player::new([159.0, 80.0], PI / 4.0, 4.0, 0.0);
        player.start(InputEvent::MoveForward);
        assert!(!player.update(&map));
        assert_eq!(player.pose().pos, [159.0, 80.0]);
    }

    proptest! {
        #[test]
        fn never_commits_into_wall(
            start in (1usize..14, 1usize..10, 0.05f32..0.95, 0.05f32..0.95),
            heading in 0.0f32..6.28,
            speed in 0.5f32..40.0,
            steps in prop::collection::vec((-1i8..=1, -1i8..=1), 1..200),
        ) {
            let map = GridMap::default_layout(CELL);
            let (col, row, fx, fy) = start;
            prop_assume!(!map.is_wall_cell(row, col));
            let pos = [(col as f32 + fx) * CELL, (row as f32 + fy) * CELL];
            let mut player = Player::new(pos, heading, speed, 0.2);
            for (turn, walk) in steps {
                player.intent = MovementIntent { turn, walk };
                player.update(&map);
                let [x, y] = player.pose().pos;
                prop_assert!(!map.has_wall_at(x, y));
            }
        }
    }
}
