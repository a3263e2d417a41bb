//! Engine constants, loadable from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::world::GridMap;

/// Every tunable the engine reads. Speeds are per tick, angles in degrees
/// on disk and radians through the accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub cell_size: f32,
    pub map_rows: usize,
    pub map_cols: usize,
    pub fov_degrees: f32,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Pixel width of one wall stripe; sets the column count unless
    /// `num_columns` is given.
    pub wall_strip_width: u32,
    pub num_columns: Option<usize>,
    pub move_speed: f32,
    pub rotation_speed_degrees: f32,
    pub minimap_scale: f32,
    /// Numerator of the distance-based depth cue.
    pub depth_cue_constant: f32,
    /// Drawn size only; collision treats the player as a point.
    pub player_radius: f32,
    /// Start position in world units, defaults to the map centre.
    pub start: Option<[f32; 2]>,
    pub start_heading_degrees: f32,
}

impl Default for Config {
    fn default() -> Self {
        let cell_size = 32.0;
        let (map_rows, map_cols) = (11, 15);
        Self {
            cell_size,
            map_rows,
            map_cols,
            fov_degrees: 60.0,
            screen_width: (map_cols as f32 * cell_size) as u32,
            screen_height: (map_rows as f32 * cell_size) as u32,
            wall_strip_width: 1,
            num_columns: None,
            move_speed: 2.0,
            rotation_speed_degrees: 2.0,
            minimap_scale: 0.2,
            depth_cue_constant: 170.0,
            player_radius: 3.0,
            start: None,
            start_heading_degrees: 90.0,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    #[inline]
    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed_degrees.to_radians()
    }

    #[inline]
    pub fn start_heading(&self) -> f32 {
        self.start_heading_degrees.to_radians()
    }

    /// Rays cast per frame.
    pub fn column_count(&self) -> usize {
        self.num_columns
            .unwrap_or((self.screen_width / self.wall_strip_width.max(1)) as usize)
    }

    /// Screen pixels covered by one column.
    pub fn column_width(&self) -> f32 {
        self.screen_width as f32 / self.column_count().max(1) as f32
    }

    pub fn start_position(&self, map: &GridMap) -> [f32; 2] {
        self.start
            .unwrap_or([map.width() * 0.5, map.height() * 0.5])
    }

    /// Defaults resized to `map`: grid counts from the map, one screen
    /// pixel per world unit.
    pub fn sized_for(map: &GridMap) -> Self {
        Self {
            cell_size: map.cell_size(),
            map_rows: map.rows(),
            map_cols: map.cols(),
            screen_width: map.width() as u32,
            screen_height: map.height() as u32,
            ..Self::default()
        }
    }

    /// Range checks that do not need the map.
    pub fn validate(&self) -> Result<(), LoadError> {
        fn check(ok: bool, msg: &str) -> Result<(), LoadError> {
            if ok {
                Ok(())
            } else {
                Err(LoadError::InvalidConfig(msg.to_string()))
            }
        }

        check(
            self.cell_size.is_finite() && self.cell_size > 0.0,
            "cell_size must be positive",
        )?;
        check(
            self.map_rows > 0 && self.map_cols > 0,
            "map_rows and map_cols must be non-zero",
        )?;
        check(
            self.fov_degrees > 0.0 && self.fov_degrees < 180.0,
            "fov_degrees must lie in (0, 180)",
        )?;
        check(
            self.screen_width > 0 && self.screen_height > 0,
            "screen size must be non-zero",
        )?;
        check(self.wall_strip_width > 0, "wall_strip_width must be non-zero")?;
        check(self.column_count() > 0, "column count must be non-zero")?;
        check(
            self.move_speed.is_finite() && self.move_speed >= 0.0,
            "move_speed must be finite and non-negative",
        )?;
        check(
            self.rotation_speed_degrees.is_finite() && self.rotation_speed_degrees >= 0.0,
            "rotation_speed_degrees must be finite and non-negative",
        )?;
        check(
            self.minimap_scale > 0.0 && self.minimap_scale <= 1.0,
            "minimap_scale must lie in (0, 1]",
        )?;
        check(
            self.depth_cue_constant.is_finite() && self.depth_cue_constant >= 0.0,
            "depth_cue_constant must be finite and non-negative",
        )?;
        check(
            self.start_heading_degrees.is_finite(),
            "start_heading_degrees must be finite",
        )
    }

    /// Checks that tie the config to a loaded map.
    pub fn validate_against(&self, map: &GridMap) -> Result<(), LoadError> {
        if map.rows() != self.map_rows || map.cols() != self.map_cols {
            return Err(LoadError::InvalidConfig(format!(
                "map is {}x{} cells but config expects {}x{}",
                map.cols(),
                map.rows(),
                self.map_cols,
                self.map_rows
            )));
        }
        let [x, y] = self.start_position(map);
        if map.has_wall_at(x, y) {
            return Err(LoadError::InvalidConfig(format!(
                "start position ({}, {}) is inside a wall",
                x, y
            )));
        }
        Ok(())
    }
}
