//! Error types for the immersed-boundary force computation.

use std::fmt;
use thiserror::Error;

use crate::floating_type_mod::FT;

/// Structural element categories, used for error reports and model flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Spring,
    Beam,
    Target,
    Muscle,
    HillMuscle,
    Mass,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ElementKind::Spring => "spring",
            ElementKind::Beam => "beam",
            ElementKind::Target => "target",
            ElementKind::Muscle => "muscle",
            ElementKind::HillMuscle => "hill muscle",
            ElementKind::Mass => "mass",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Errors that abort the force computation of one timestep.
///
/// Element and point indices in messages are 1-based, the same numbering
/// used by structure files.
#[derive(Debug, Error)]
pub enum IbError {
    /// Zero-length spring or muscle segment, the force direction is undefined.
    #[error("degenerate geometry in {element} #{element_index}: zero-length segment")]
    DegenerateGeometry { element: ElementKind, element_index: usize },

    /// The kernel support window of a point does not fit on a wall-bounded axis.
    #[error("point #{point} at {axis}={coordinate} is too close to a non-periodic boundary for the kernel support")]
    OutOfDomain { point: usize, axis: Axis, coordinate: FT },

    /// Kernel and grid disagree on the support width.
    #[error("delta kernel support {kernel_support} does not match grid support {grid_support}")]
    Domain { kernel_support: usize, grid_support: usize },

    /// An element references a point outside `[1, num_points]`.
    #[error("{element} #{element_index} references point {point}, valid range is [1, {num_points}]")]
    Index {
        element: ElementKind,
        element_index: usize,
        point: usize,
        num_points: usize,
    },

    #[error("expected {expected} lagrangian points, got {actual}")]
    PointCountMismatch { expected: usize, actual: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("failed parsing configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("failed reading configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for immersed-boundary operations.
pub type IbResult<T> = std::result::Result<T, IbError>;

#[test]
fn error_messages_name_element_and_index() {
    let err = IbError::DegenerateGeometry {
        element: ElementKind::Spring,
        element_index: 3,
    };
    assert_eq!(format!("{}", err), "degenerate geometry in spring #3: zero-length segment");

    let err = IbError::Index {
        element: ElementKind::HillMuscle,
        element_index: 2,
        point: 11,
        num_points: 10,
    };
    let msg = format!("{}", err);
    assert!(msg.contains("hill muscle #2"));
    assert!(msg.contains("[1, 10]"));

    let err = IbError::OutOfDomain {
        point: 4,
        axis: Axis::Y,
        coordinate: 0.25,
    };
    assert!(format!("{}", err).contains("y=0.25"));
}
