use crate::{error::IbResult, lagrangian_points::LagrangianPoints, structure::Structure, vec2f, V2};

use super::check_point_count;

/**
 * Bending force on the middle point of every beam triple.
 *
 * With `C = (x3-x2)(y2-y1) - (y3-y2)(x2-x1)` the middle point receives
 * `k (C - C0) (dy21 + dy32, -(dx32 + dx21))`, the negative gradient of `k/2 (C - C0)^2`
 * with respect to the middle point. End points get their share from neighbouring triples.
 */
pub fn beam_force_density(structure: &Structure, points: &LagrangianPoints) -> IbResult<Vec<V2>> {
    check_point_count(structure, points)?;
    let positions = points.current_positions();
    let mut density = vec![V2::zeros(); positions.len()];

    for beam in structure.beams() {
        let p1 = positions[beam.left.index()];
        let p2 = positions[beam.middle.index()];
        let p3 = positions[beam.right.index()];

        let d21 = p2 - p1;
        let d32 = p3 - p2;
        let cross = d32.x * d21.y - d32.y * d21.x;

        let factor = beam.stiffness * (cross - beam.curvature);
        density[beam.middle.index()] += factor * vec2f(d21.y + d32.y, -(d32.x + d21.x));
    }

    Ok(density)
}
