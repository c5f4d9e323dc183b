/*!
Force density generators, one per structural element type.

Every generator reads positions only and returns a dense per-point contribution, so the
generators can run concurrently and be summed afterwards.
*/

mod beams;
mod masses;
mod muscles;
mod springs;
mod targets;

pub use beams::beam_force_density;
pub use masses::{mass_force_density, MassForce};
pub use muscles::muscle_force_density;
pub use springs::spring_force_density;
pub use targets::target_force_density;

use crate::{
    error::{ElementKind, IbError, IbResult},
    floating_type_mod::FT,
    lagrangian_points::{LagrangianPoints, PointId},
    structure::Structure,
    V2,
};

/// Element indices were validated against `structure.num_points()`, so the snapshot must match it.
pub(crate) fn check_point_count(structure: &Structure, points: &LagrangianPoints) -> IbResult<()> {
    if points.len() != structure.num_points() {
        return Err(IbError::PointCountMismatch {
            expected: structure.num_points(),
            actual: points.len(),
        });
    }
    Ok(())
}

/// Separation vector from `master` to `slave` and its length.
pub(crate) fn segment(positions: &[V2], master: PointId, slave: PointId) -> (V2, FT) {
    let diff = positions[slave.index()] - positions[master.index()];
    (diff, diff.norm())
}

/// Unit vector of a segment, failing for zero length.
pub(crate) fn unit_direction(diff: V2, length: FT, element: ElementKind, element_index: usize) -> IbResult<V2> {
    if length == 0. || !length.is_finite() {
        return Err(IbError::DegenerateGeometry {
            element,
            element_index: element_index + 1,
        });
    }
    Ok(diff / length)
}

/// Adds `force` to `master` and its negation to `slave`.
pub(crate) fn apply_pair(density: &mut [V2], master: PointId, slave: PointId, force: V2) {
    density[master.index()] += force;
    density[slave.index()] -= force;
}
