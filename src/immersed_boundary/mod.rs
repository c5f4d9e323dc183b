pub mod aggregator;
pub mod concurrency;
pub mod delta_kernels;
pub mod error;
pub mod force_generators;
pub mod force_model;
pub mod grid;
pub mod index_mapper;
pub mod lagrangian_points;
pub mod muscle_activation;
pub mod parameters;
pub mod spreading;
pub mod structure;

pub type IT = i64;

#[cfg(feature = "double-precision")]
pub mod floating_type_mod {
    pub type FT = f64;
    pub use std::f64::consts::{FRAC_1_PI, PI, TAU};
}

#[cfg(not(feature = "double-precision"))]
pub mod floating_type_mod {
    pub type FT = f32;
    pub use std::f32::consts::{FRAC_1_PI, PI, TAU};
}

use floating_type_mod::FT;

use nalgebra::SVector;
use num_traits::Float;
use std::fmt::Display;

pub type V<FT, const D: usize> = SVector<FT, D>;

pub type V2 = V<FT, 2>;

pub fn vec2f(x: FT, y: FT) -> V2 {
    [x, y].into()
}

pub use aggregator::{aggregate_force_density, ForceDensity, MassForce, ModelFlags};
pub use delta_kernels::{CosineKernel, DeltaKernel, DeltaKernelTrait, HatKernel, Peskin4Kernel};
pub use error::{Axis, ElementKind, IbError, IbResult};
pub use force_model::{Clock, ForceOutput, ImmersedBoundaryForces};
pub use grid::{BoundaryKind, GridDescriptor};
pub use lagrangian_points::{LagrangianPoints, PointId};
pub use muscle_activation::{ActivationWaveform, HillActivation, MuscleActivation, MuscleKind, MuscleState};
pub use parameters::{DeltaKernelType, ForceModelParams, SceneConfig};
pub use spreading::{EulerianForce, PointStencil, SpreadingOperator};
pub use structure::{
    BeamElement, ElementTables, MassElement, MuscleElement, SpringElement, Structure, TargetElement,
};

pub fn is_ft_approx_eq<FT: Float>(a: FT, b: FT, tolerance: FT) -> bool {
    assert!(!a.is_nan());
    assert!(!b.is_nan());
    b <= a + tolerance && b >= a - tolerance
}

/**
 * Panics with a descriptive message if `a` and `b` differ by more than `tolerance`.
 * The message closure is only evaluated on failure.
 */
pub fn assert_ft_approx_eq<FT: Float + Display>(a: FT, b: FT, tolerance: FT, s: impl FnOnce() -> String) {
    if !is_ft_approx_eq(a, b, tolerance) {
        panic!(
            "{} value not equal with a tolerance of {}:\n\ta={}\n\tb={}\n",
            s(),
            tolerance,
            a,
            b
        );
    }
}
