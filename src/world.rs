use std::path::Path;

use crate::error::LoadError;

/// Layout the engine starts with when no map file is given.
const DEFAULT_LAYOUT: [[u8; 15]; 11] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1],
    [1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 1, 0, 1],
    [1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 0, 0, 0, 1, 1, 1, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

/// Static tile map. Row-major, one byte per cell (0 open, 1 wall).
#[derive(Debug, Clone, PartialEq)]
pub struct GridMap {
    cells: Vec<u8>,
    rows: usize,
    cols: usize,
    cell_size: f32,
}

impl GridMap {
    /// Build from numeric rows, rejecting ragged rows and non-binary markers.
    pub fn from_rows(rows: Vec<Vec<u8>>, cell_size: f32) -> Result<Self, LoadError> {
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(LoadError::InvalidConfig(format!(
                "cell size must be positive, got {}",
                cell_size
            )));
        }
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if cols == 0 {
            return Err(LoadError::EmptyMap);
        }

        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(LoadError::RaggedRow {
                    row: row_index,
                    expected: cols,
                    found: row.len(),
                });
            }
            for (col_index, &marker) in row.iter().enumerate() {
                if marker > 1 {
                    return Err(LoadError::UnknownMarker {
                        row: row_index,
                        col: col_index,
                        marker: marker.to_string(),
                    });
                }
                cells.push(marker);
            }
        }

        Ok(Self {
            cells,
            rows: rows.len(),
            cols,
            cell_size,
        })
    }

    /// Parse the text map format: one row per line, `0`/`1` cells.
    /// Blank lines and lines starting with `#` are skipped; spaces, tabs and
    /// commas between cells are ignored.
    pub fn parse(text: &str, cell_size: f32) -> Result<Self, LoadError> {
        let mut rows = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row_index = rows.len();
            let mut row = Vec::with_capacity(line.len());
            for ch in line.chars().filter(|c| !c.is_whitespace() && *c != ',') {
                match ch {
                    '0' => row.push(0),
                    '1' => row.push(1),
                    other => {
                        return Err(LoadError::UnknownMarker {
                            row: row_index,
                            col: row.len(),
                            marker: other.to_string(),
                        });
                    }
                }
            }
            rows.push(row);
        }
        Self::from_rows(rows, cell_size)
    }

    pub fn load(path: &Path, cell_size: f32) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, cell_size)
    }

    /// The built-in 15x11 layout.
    pub fn default_layout(cell_size: f32) -> Self {
        Self {
            cells: DEFAULT_LAYOUT.iter().flatten().copied().collect(),
            rows: DEFAULT_LAYOUT.len(),
            cols: DEFAULT_LAYOUT[0].len(),
            cell_size,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World-space extent along x.
    #[inline]
    pub fn width(&self) -> f32 {
        self.cols as f32 * self.cell_size
    }

    /// World-space extent along y.
    #[inline]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    /// Cell lookup by index. Anything off the grid is solid.
    #[inline]
    pub fn is_wall_cell(&self, row: usize, col: usize) -> bool {
        if row >= self.rows || col >= self.cols {
            return true;
        }
        self.cells[row * self.cols + col] != 0
    }

    /// Closed bounds test over [0, width] x [0, height]. NaN is outside.
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && x <= self.width() && y >= 0.0 && y <= self.height()
    }

    /// Point-in-wall query in world coordinates. Outside the map counts as
    /// wall, and so does the far edge (x == width or y == height), which
    /// floors to one past the last cell.
    pub fn has_wall_at(&self, x: f32, y: f32) -> bool {
        if !self.contains(x, y) {
            return true;
        }
        let col = (x / self.cell_size).floor() as usize;
        let row = (y / self.cell_size).floor() as usize;
        self.is_wall_cell(row, col)
    }

    /// Upper bound on grid lines one scan can cross before leaving the map.
    #[inline]
    pub fn max_scan_steps(&self) -> usize {
        self.rows + self.cols + 2
    }

    /// Iterate `(row, col, is_wall)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &c)| (i / self.cols, i % self.cols, c != 0))
    }
}
