use crate::camera::ColumnProjection;
use crate::raycast::Boundary;
use crate::session::{Frame, Session};
use crate::world::GridMap;

/// Length of the heading indicator on the minimap, world units.
const HEADING_LINE: f32 = 20.0;

/// Drawing primitives the frame renderer needs. Coordinates are screen
/// pixels; implementations clip.
pub trait RenderBackend {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: u32);
    fn draw_line(&mut self, from: [f32; 2], to: [f32; 2], color: u32);
    fn draw_circle(&mut self, center: [f32; 2], radius: f32, color: u32);
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // 0RGB, the layout softbuffer expects
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
}

/// Grey level for a stripe: vertical-line hits are lit, horizontal ones
/// shaded, both faded by the depth cue.
pub fn wall_color(column: &ColumnProjection) -> u32 {
    let base = match column.boundary {
        Boundary::Vertical => 255.0,
        Boundary::Horizontal => 180.0,
    };
    let v = (base * column.depth_cue.clamp(0.0, 1.0)) as u8;
    pack_rgb(v, v, v)
}

/// Full frame: ceiling/floor, wall stripes, then the minimap on top.
pub fn render_frame<B: RenderBackend>(backend: &mut B, session: &Session, frame: &Frame) {
    let config = session.config();
    let width = config.screen_width as f32;
    let height = config.screen_height as f32;
    let mid = height * 0.5;

    backend.fill_rect(0.0, 0.0, width, mid, pack_rgb(30, 30, 70));
    backend.fill_rect(0.0, mid, width, height - mid, pack_rgb(40, 40, 40));

    draw_walls(backend, &frame.columns, config.column_width());
    draw_minimap(
        backend,
        session.map(),
        frame,
        config.minimap_scale,
        config.player_radius,
    );
}

pub fn draw_walls<B: RenderBackend>(
    backend: &mut B,
    columns: &[ColumnProjection],
    column_width: f32,
) {
    for (i, column) in columns.iter().enumerate() {
        if !column.hit || column.stripe_height <= 0.0 {
            continue;
        }
        backend.fill_rect(
            i as f32 * column_width,
            column.top,
            column_width,
            column.stripe_height,
            wall_color(column),
        );
    }
}

/// Top-down overlay: tiles, one line per ray that hit something, the
/// caster and its heading.
pub fn draw_minimap<B: RenderBackend>(
    backend: &mut B,
    map: &GridMap,
    frame: &Frame,
    scale: f32,
    player_radius: f32,
) {
    let tile = map.cell_size() * scale;
    let wall = pack_rgb(34, 34, 34);
    let open = pack_rgb(255, 255, 255);
    for (row, col, is_wall) in map.cells() {
        let color = if is_wall { wall } else { open };
        backend.fill_rect(col as f32 * tile, row as f32 * tile, tile, tile, color);
    }

    let s = |p: [f32; 2]| [p[0] * scale, p[1] * scale];
    let origin = s(frame.pose.pos);
    let ray_color = pack_rgb(255, 0, 0);
    for hit in frame.hits.iter().filter(|h| h.is_hit()) {
        backend.draw_line(origin, s(hit.point), ray_color);
    }

    let (sin, cos) = frame.pose.heading.sin_cos();
    let tip = [
        frame.pose.pos[0] + cos * HEADING_LINE,
        frame.pose.pos[1] + sin * HEADING_LINE,
    ];
    backend.draw_circle(origin, player_radius * scale, ray_color);
    backend.draw_line(origin, s(tip), ray_color);
}
