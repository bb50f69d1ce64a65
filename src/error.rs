use std::fmt;
use std::io;

/// Failure kinds of the planning pipeline.
///
/// Recoverable conditions (a degenerate user angle, an empty cell sweep) are
/// not errors: the pipeline warns on stderr and continues.
#[derive(Debug)]
#[non_exhaustive]
pub enum PlanError {
    /// Empty or unreadable map, or nothing left after morphology.
    InvalidMap(String),
    /// Self-intersecting, coincident-vertex or under-sized polygon.
    DegeneratePolygon(String),
    /// Internal invariant violation during cell decomposition.
    Decomposition(String),
    /// Start point outside every cell and outside the free region.
    StartOutOfRegion,
    /// Bad value in the parameter file.
    InvalidParameter(String),
    Io(io::Error),
    #[cfg(feature = "im-io")]
    Image(image::ImageError),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMap(msg) => write!(f, "invalid map: {msg}"),
            Self::DegeneratePolygon(msg) => write!(f, "degenerate polygon: {msg}"),
            Self::Decomposition(msg) => write!(f, "cell decomposition failed: {msg}"),
            Self::StartOutOfRegion => write!(f, "start point outside the free region"),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "im-io")]
            Self::Image(err) => write!(f, "image error: {err}"),
        }
    }
}

impl std::error::Error for PlanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            #[cfg(feature = "im-io")]
            Self::Image(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for PlanError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(feature = "im-io")]
impl From<image::ImageError> for PlanError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err)
    }
}
