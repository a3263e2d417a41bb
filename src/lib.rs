//! Grid raycaster: turns a tile map and a caster pose into per-column wall
//! distances and stripe heights for a pseudo-3D first-person view.
//!
//! - `world`: static tile map and point-in-wall queries
//! - `player`: caster pose and intent-driven movement
//! - `raycast`: per-column ray/grid intersection
//! - `camera`: fisheye correction and screen projection
//! - `session`: owns map + player, produces one `Frame` per tick
//! - `renderer` / `framebuffer`: drawing backend seam and a CPU implementation

pub mod camera;
pub mod config;
pub mod error;
pub mod framebuffer;
pub mod player;
pub mod raycast;
pub mod renderer;
pub mod session;
pub mod world;

pub use camera::{Camera, ColumnProjection};
pub use config::Config;
pub use error::LoadError;
pub use player::{InputEvent, MovementIntent, Player, Pose};
pub use raycast::{Boundary, Quadrant, RayHit, cast_all_rays, cast_ray};
pub use session::{Frame, Session};
pub use world::GridMap;

use std::f32::consts::TAU;

/// Wrap an angle into [0, 2π).
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}
