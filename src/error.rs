use std::fmt;
use std::path::PathBuf;

/// Startup failures. Everything after loading is infallible.
#[derive(Debug)]
pub enum LoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// No rows, or rows with no cells.
    EmptyMap,
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    UnknownMarker {
        row: usize,
        col: usize,
        marker: String,
    },
    InvalidConfig(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => write!(f, "reading {}: {}", path.display(), source),
            LoadError::Json { path, source } => {
                write!(f, "parsing {}: {}", path.display(), source)
            }
            LoadError::EmptyMap => write!(f, "map has no cells"),
            LoadError::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "map row {} has {} cells, expected {}",
                row, found, expected
            ),
            LoadError::UnknownMarker { row, col, marker } => write!(
                f,
                "unknown cell marker {:?} at row {}, column {}",
                marker, row, col
            ),
            LoadError::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}
