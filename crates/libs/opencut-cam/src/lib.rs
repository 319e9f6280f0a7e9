//! CAM toolpath planners over the polyscan engine: high-speed pocketing,
//! V-carving, and tab separation, plus the Boolean/offset surface a host
//! application drives.

use thiserror::Error;

pub mod pocket;
pub mod spiral;
pub mod tabs;
pub mod vcarve;

pub use pocket::hspocket;
pub use spiral::{create_spiral, trim_spiral};
pub use tabs::{separate_tabs, TabSpan};
pub use vcarve::vpocket;

// Re-export the engine surface so hosts depend on one crate.
pub use polyscan::{
    clean_polygon_set as clean, combine_polygon_sets as boolean_combine, offset_polygon,
    offset_polygon_set as offset, BooleanOp, OffsetKind,
};

/// One inch in kernel units.
pub const INCH_TO_UNITS: i32 = 100_000;
/// Default chord error for offset arcs.
pub const ARC_TOLERANCE: i32 = INCH_TO_UNITS / 10_000;
/// Coarser chord error for the pocket seed spiral.
pub const SPIRAL_ARC_TOLERANCE: i32 = INCH_TO_UNITS / 1_000;
/// Snap distance for cleaning host-supplied polygons.
pub const CLEAN_POLY_DIST: i32 = INCH_TO_UNITS / 100_000;

/// Custom result type for planner operations
pub type Result<T> = std::result::Result<T, CamError>;

/// Represents all possible errors that can occur in the planners
#[derive(Error, Debug)]
pub enum CamError {
    #[error(transparent)]
    Scan(#[from] polyscan::ScanError),

    #[error("Voronoi construction failed: {0}")]
    Voronoi(String),

    #[error("fewer than two input segments survive filtering")]
    DegenerateVoronoi,

    #[error("Illegal input: {0}")]
    IllegalInput(String),
}

impl From<boostvoronoi::BvError> for CamError {
    fn from(e: boostvoronoi::BvError) -> Self {
        CamError::Voronoi(e.to_string())
    }
}
