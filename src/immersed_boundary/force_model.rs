use crate::{
    aggregator::{aggregate_force_density, ForceDensity, MassForce, ModelFlags},
    delta_kernels::{DeltaKernel, DeltaKernelTrait},
    error::{IbError, IbResult},
    floating_type_mod::FT,
    grid::GridDescriptor,
    lagrangian_points::LagrangianPoints,
    muscle_activation::MuscleActivation,
    spreading::{EulerianForce, SpreadingOperator},
    structure::Structure,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    pub time: FT,
    pub dt: FT,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForceOutput {
    /// Source term for the fluid solver.
    pub eulerian: EulerianForce,
    /// Raw forces of mass points, for the point mass dynamics.
    pub mass_forces: Vec<MassForce>,
    pub lagrangian: ForceDensity,
}

/**
 * Everything that stays fixed while the fluid solver advances: grid, kernel, enabled
 * element categories and the validated structure.
 */
#[derive(Debug, Clone)]
pub struct ImmersedBoundaryForces {
    grid: GridDescriptor,
    kernel: DeltaKernel,
    flags: ModelFlags,
    structure: Structure,
}

impl ImmersedBoundaryForces {
    pub fn new(grid: GridDescriptor, kernel: DeltaKernel, flags: ModelFlags, structure: Structure) -> IbResult<Self> {
        if kernel.support() != grid.support() {
            return Err(IbError::Domain {
                kernel_support: kernel.support(),
                grid_support: grid.support(),
            });
        }
        if structure.num_points() != grid.num_points() {
            return Err(IbError::PointCountMismatch {
                expected: grid.num_points(),
                actual: structure.num_points(),
            });
        }
        Ok(ImmersedBoundaryForces {
            grid,
            kernel,
            flags,
            structure,
        })
    }

    pub fn grid(&self) -> &GridDescriptor {
        &self.grid
    }

    pub fn kernel(&self) -> &DeltaKernel {
        &self.kernel
    }

    pub fn flags(&self) -> &ModelFlags {
        &self.flags
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /**
     * Computes the Lagrangian force density of all enabled elements and spreads it onto the grid.
     *
     * Any error aborts the whole timestep; no partially filled force field is returned.
     */
    pub fn compute<A: MuscleActivation + ?Sized>(
        &self,
        points: &LagrangianPoints,
        clock: Clock,
        activation: &A,
    ) -> IbResult<ForceOutput> {
        if points.len() != self.grid.num_points() {
            return Err(IbError::PointCountMismatch {
                expected: self.grid.num_points(),
                actual: points.len(),
            });
        }

        let aggregated = aggregate_force_density(&self.structure, &self.flags, points, clock, activation)?;

        let operator = SpreadingOperator::build(&self.grid, &self.kernel, points.current_positions())?;
        let eulerian = operator.apply(&aggregated.density)?;

        if log::log_enabled!(log::Level::Debug) {
            let total = aggregated.density.total();
            let integral = eulerian.integral();
            log::debug!(
                "t={:.6}: kinds={:?} lagrangian total=({:.6e}, {:.6e}) eulerian integral=({:.6e}, {:.6e})",
                clock.time,
                self.flags.enabled_kinds(),
                total.x * self.grid.ds(),
                total.y * self.grid.ds(),
                integral.x,
                integral.y
            );
        }

        Ok(ForceOutput {
            eulerian,
            mass_forces: aggregated.mass_forces,
            lagrangian: aggregated.density,
        })
    }
}
