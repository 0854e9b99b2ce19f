use std::path::PathBuf;

/// Errors reported by the navigation core.
///
/// Most edits are defined no-ops rather than errors (out-of-range obstacle
/// toggles, removing unknown agents); only genuinely invalid requests end up
/// here.
#[derive(thiserror::Error, Debug)]
pub enum CrowdError {
    #[error("target cell ({x}, {y}) is outside the {width}x{height} grid")]
    TargetOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("invalid grid dimensions {width}x{height} with cell size {cell_size}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        cell_size: f32,
    },

    #[error("bucket size must be positive, got {0}")]
    InvalidCellSize(f32),

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),
}

pub type Result<T> = std::result::Result<T, CrowdError>;
