//! Explicit owner of the map and the caster; drives one frame per tick.

use crate::camera::{Camera, ColumnProjection};
use crate::config::Config;
use crate::error::LoadError;
use crate::player::{InputEvent, Player, Pose};
use crate::raycast::{RayHit, cast_all_rays};
use crate::world::GridMap;

/// Everything one tick produces. Rebuilt from scratch every frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Pose every ray in this frame was cast from.
    pub pose: Pose,
    pub hits: Vec<RayHit>,
    pub columns: Vec<ColumnProjection>,
}

pub struct Session {
    config: Config,
    map: GridMap,
    player: Player,
    camera: Camera,
}

impl Session {
    /// Validates the config against the map before anything runs.
    pub fn new(config: Config, map: GridMap) -> Result<Self, LoadError> {
        config.validate()?;
        config.validate_against(&map)?;
        let player = Player::from_config(&config, &map);
        let camera = Camera::from_config(&config);
        log::info!(
            "session: {}x{} map, cell {}, {} columns, fov {:.1} deg",
            map.cols(),
            map.rows(),
            map.cell_size(),
            config.column_count(),
            config.fov_degrees
        );
        Ok(Self {
            config,
            map,
            player,
            camera,
        })
    }

    /// Default config on the built-in map.
    pub fn with_defaults() -> Result<Self, LoadError> {
        let config = Config::default();
        let map = GridMap::default_layout(config.cell_size);
        Self::new(config, map)
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn map(&self) -> &GridMap {
        &self.map
    }

    #[inline]
    pub fn player(&self) -> &Player {
        &self.player
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Record a start (`active`) or stop signal; applied on the next tick.
    pub fn handle(&mut self, event: InputEvent, active: bool) {
        if active {
            self.player.start(event);
        } else {
            self.player.stop(event);
        }
    }

    /// Move the player, then cast and project against the frozen pose.
    pub fn tick(&mut self) -> Frame {
        self.player.update(&self.map);
        self.render_frame()
    }

    /// Cast and project for the current pose without moving.
    pub fn render_frame(&self) -> Frame {
        let pose = self.player.pose();
        let hits = cast_all_rays(
            &self.map,
            &pose,
            self.config.fov(),
            self.config.column_count(),
        );
        let columns = self.camera.project(&hits, pose.heading);
        Frame {
            pose,
            hits,
            columns,
        }
    }
}
