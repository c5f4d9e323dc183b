use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::{
    concurrency::par_map_collect,
    error::{ElementKind, IbResult},
    force_generators::{
        beam_force_density, check_point_count, mass_force_density, muscle_force_density, spring_force_density,
        target_force_density,
    },
    force_model::Clock,
    lagrangian_points::LagrangianPoints,
    muscle_activation::{MuscleActivation, MuscleKind},
    structure::Structure,
    V2,
};

pub use crate::force_generators::MassForce;

/// Which element categories contribute forces. Disabled categories are not evaluated at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelFlags {
    pub springs: bool,
    pub beams: bool,
    pub targets: bool,
    pub muscles_lt_fv: bool,
    pub muscles_hill: bool,
    pub masses: bool,
}

impl ModelFlags {
    pub fn all() -> Self {
        ModelFlags {
            springs: true,
            beams: true,
            targets: true,
            muscles_lt_fv: true,
            muscles_hill: true,
            masses: true,
        }
    }

    pub fn is_enabled(&self, kind: ElementKind) -> bool {
        match kind {
            ElementKind::Spring => self.springs,
            ElementKind::Beam => self.beams,
            ElementKind::Target => self.targets,
            ElementKind::Muscle => self.muscles_lt_fv,
            ElementKind::HillMuscle => self.muscles_hill,
            ElementKind::Mass => self.masses,
        }
    }

    pub fn with(mut self, kind: ElementKind, enabled: bool) -> Self {
        match kind {
            ElementKind::Spring => self.springs = enabled,
            ElementKind::Beam => self.beams = enabled,
            ElementKind::Target => self.targets = enabled,
            ElementKind::Muscle => self.muscles_lt_fv = enabled,
            ElementKind::HillMuscle => self.muscles_hill = enabled,
            ElementKind::Mass => self.masses = enabled,
        }
        self
    }

    /// Enabled categories in summation order.
    pub fn enabled_kinds(&self) -> Vec<ElementKind> {
        [
            ElementKind::Spring,
            ElementKind::Beam,
            ElementKind::Target,
            ElementKind::Muscle,
            ElementKind::HillMuscle,
            ElementKind::Mass,
        ]
        .iter()
        .cloned()
        .filter(|&kind| self.is_enabled(kind))
        .collect()
    }
}

/// Per-point Lagrangian force density `(fx, fy)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceDensity(Vec<V2>);

impl ForceDensity {
    pub fn zeros(num_points: usize) -> Self {
        ForceDensity(vec![V2::zeros(); num_points])
    }

    pub fn total(&self) -> V2 {
        self.0.iter().fold(V2::zeros(), |acc, f| acc + f)
    }

    pub fn into_inner(self) -> Vec<V2> {
        self.0
    }

    fn add_assign(&mut self, contribution: &[V2]) {
        for (f, c) in self.0.iter_mut().zip(contribution.iter()) {
            *f += c;
        }
    }
}

impl From<Vec<V2>> for ForceDensity {
    fn from(v: Vec<V2>) -> Self {
        ForceDensity(v)
    }
}

impl Deref for ForceDensity {
    type Target = [V2];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedForces {
    pub density: ForceDensity,
    // empty unless masses are enabled
    pub mass_forces: Vec<MassForce>,
}

fn generate<A: MuscleActivation + ?Sized>(
    kind: ElementKind,
    structure: &Structure,
    points: &LagrangianPoints,
    clock: Clock,
    activation: &A,
) -> IbResult<(Vec<V2>, Vec<MassForce>)> {
    let density = match kind {
        ElementKind::Spring => spring_force_density(structure, points)?,
        ElementKind::Beam => beam_force_density(structure, points)?,
        ElementKind::Target => target_force_density(structure, points)?,
        ElementKind::Muscle => {
            muscle_force_density(structure, MuscleKind::LengthTensionVelocity, points, clock, activation)?
        }
        ElementKind::HillMuscle => {
            muscle_force_density(structure, MuscleKind::HillThreeElement, points, clock, activation)?
        }
        ElementKind::Mass => return mass_force_density(structure, points),
    };
    Ok((density, Vec::new()))
}

/**
 * Sums the contributions of all enabled element categories.
 *
 * The generators run concurrently. Their results are summed in the fixed order of
 * `ModelFlags::enabled_kinds`, so the result does not depend on scheduling.
 */
pub fn aggregate_force_density<A: MuscleActivation + ?Sized>(
    structure: &Structure,
    flags: &ModelFlags,
    points: &LagrangianPoints,
    clock: Clock,
    activation: &A,
) -> IbResult<AggregatedForces> {
    check_point_count(structure, points)?;

    let kinds = flags.enabled_kinds();
    let contributions = par_map_collect(kinds.len(), |i| generate(kinds[i], structure, points, clock, activation))?;

    let mut density = ForceDensity::zeros(points.len());
    let mut mass_forces = Vec::new();
    for (contribution, raw) in contributions {
        density.add_assign(&contribution);
        mass_forces.extend(raw);
    }

    Ok(AggregatedForces { density, mass_forces })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::IbError,
        force_generators::test_utils::random_points,
        muscle_activation::HillActivation,
        structure::{BeamElement, ElementTables, MassElement, MuscleElement, SpringElement, TargetElement},
        vec2f, PointId,
    };

    fn full_structure(n: u32) -> Structure {
        let id = PointId::from_one_based;
        let tables = ElementTables {
            springs: (1..n)
                .map(|i| SpringElement {
                    master: id(i),
                    slave: id(i + 1),
                    stiffness: 10.,
                    resting_length: 0.05,
                })
                .collect(),
            beams: (1..n - 1)
                .map(|i| BeamElement {
                    left: id(i),
                    middle: id(i + 1),
                    right: id(i + 2),
                    stiffness: 2.,
                    curvature: 0.,
                })
                .collect(),
            targets: vec![TargetElement {
                point: id(1),
                anchor: vec2f(0.5, 0.5),
                stiffness: 100.,
            }],
            masses: vec![MassElement {
                point: id(n),
                anchor: vec2f(0.25, 0.75),
                stiffness: 20.,
                mass: 1.,
            }],
            muscles: vec![MuscleElement {
                master: id(1),
                slave: id(3),
                optimal_length: 0.2,
                force_scale: 0.3,
                hill_a: 0.25,
                hill_b: 4.,
                max_force: 1.,
            }],
            hill_muscles: vec![MuscleElement {
                master: id(2),
                slave: id(4),
                optimal_length: 0.2,
                force_scale: 0.3,
                hill_a: 0.25,
                hill_b: 4.,
                max_force: 1.,
            }],
        };
        Structure::new(n as usize, tables).unwrap()
    }

    const CLOCK: Clock = Clock { time: 0.2, dt: 1e-4 };

    #[test]
    fn disabled_categories_do_not_contribute() {
        let structure = full_structure(12);
        let points = random_points(12, 7);
        let activation = HillActivation::default();

        let nothing = aggregate_force_density(&structure, &ModelFlags::default(), &points, CLOCK, &activation).unwrap();
        assert!(nothing.density.iter().all(|f| *f == V2::zeros()));
        assert!(nothing.mass_forces.is_empty());
    }

    #[test]
    fn toggles_are_independent() {
        let structure = full_structure(12);
        let points = random_points(12, 11);
        let activation = HillActivation::default();
        let all = ModelFlags::all();

        for removed in all.enabled_kinds() {
            let flags = all.with(removed, false);
            let reduced = aggregate_force_density(&structure, &flags, &points, CLOCK, &activation).unwrap();

            // the same categories evaluated against a structure that lacks the removed table
            let mut tables = structure.tables().clone();
            match removed {
                ElementKind::Spring => tables.springs.clear(),
                ElementKind::Beam => tables.beams.clear(),
                ElementKind::Target => tables.targets.clear(),
                ElementKind::Muscle => tables.muscles.clear(),
                ElementKind::HillMuscle => tables.hill_muscles.clear(),
                ElementKind::Mass => tables.masses.clear(),
            }
            let stripped = Structure::new(structure.num_points(), tables).unwrap();
            let reference = aggregate_force_density(&stripped, &flags, &points, CLOCK, &activation).unwrap();

            assert_eq!(reduced, reference, "removing {}", removed);

            // the removed category accounts for the whole difference
            let full = aggregate_force_density(&structure, &all, &points, CLOCK, &activation).unwrap();
            let only = aggregate_force_density(
                &structure,
                &ModelFlags::default().with(removed, true),
                &points,
                CLOCK,
                &activation,
            )
            .unwrap();
            for i in 0..points.len() {
                let diff = full.density[i] - reduced.density[i] - only.density[i];
                assert!(diff.norm() < 1e-9, "{}: point {} differs by {}", removed, i, diff);
            }
        }
    }

    #[test]
    fn mass_side_channel_matches_density() {
        let structure = full_structure(6);
        let points = random_points(6, 5);
        let flags = ModelFlags::default().with(ElementKind::Mass, true);
        let out = aggregate_force_density(&structure, &flags, &points, CLOCK, &HillActivation::default()).unwrap();

        assert_eq!(out.mass_forces.len(), 1);
        let mf = out.mass_forces[0];
        assert_eq!(mf.point, PointId::from_one_based(6));
        assert_eq!(out.density[5], mf.force);
    }

    #[test]
    fn point_count_must_match_structure() {
        let structure = full_structure(6);
        for n in [5, 7] {
            let points = random_points(n, 2);
            for flags in [ModelFlags::all(), ModelFlags::default()] {
                match aggregate_force_density(&structure, &flags, &points, CLOCK, &HillActivation::default()) {
                    Err(IbError::PointCountMismatch { expected, actual }) => {
                        assert_eq!(expected, 6);
                        assert_eq!(actual, n);
                    }
                    other => panic!("expected point count mismatch, got {:?}", other),
                }
            }
            assert!(matches!(
                spring_force_density(&structure, &points),
                Err(IbError::PointCountMismatch { .. })
            ));
        }
    }

    #[test]
    fn aggregation_is_deterministic() {
        let structure = full_structure(30);
        let points = random_points(30, 1);
        let activation = HillActivation::default();
        let first = aggregate_force_density(&structure, &ModelFlags::all(), &points, CLOCK, &activation).unwrap();
        for _ in 0..10 {
            let again = aggregate_force_density(&structure, &ModelFlags::all(), &points, CLOCK, &activation).unwrap();
            assert_eq!(first, again);
        }
    }
}
