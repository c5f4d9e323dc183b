use serde::{Deserialize, Serialize};

use crate::{
    error::{Axis, IbError, IbResult},
    floating_type_mod::FT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryKind {
    // kernel windows wrap around the domain seam
    Periodic,

    // kernel windows have to fit into the grid
    Wall,
}

impl Default for BoundaryKind {
    fn default() -> Self {
        BoundaryKind::Periodic
    }
}

/**
 * Immutable description of the Eulerian grid and the Lagrangian discretization for one timestep.
 *
 * Eulerian node `i` along an axis sits at `i * h` with `h = L / N`.
 */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridDescriptor {
    nx: usize,
    ny: usize,
    lx: FT,
    ly: FT,
    dx: FT,
    dy: FT,
    support: usize,
    num_points: usize,
    ds: FT,
    boundary_x: BoundaryKind,
    boundary_y: BoundaryKind,
}

impl GridDescriptor {
    /// Periodic grid on both axes.
    pub fn new(nx: usize, ny: usize, lx: FT, ly: FT, support: usize, num_points: usize, ds: FT) -> IbResult<Self> {
        Self::with_boundaries(
            nx,
            ny,
            lx,
            ly,
            support,
            num_points,
            ds,
            BoundaryKind::Periodic,
            BoundaryKind::Periodic,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_boundaries(
        nx: usize,
        ny: usize,
        lx: FT,
        ly: FT,
        support: usize,
        num_points: usize,
        ds: FT,
        boundary_x: BoundaryKind,
        boundary_y: BoundaryKind,
    ) -> IbResult<Self> {
        if nx == 0 || ny == 0 {
            return Err(IbError::InvalidParameter(format!(
                "grid needs at least one cell per axis, got {}x{}",
                nx, ny
            )));
        }
        if !(lx > 0. && ly > 0. && lx.is_finite() && ly.is_finite()) {
            return Err(IbError::InvalidParameter(format!(
                "domain lengths must be positive, got lx={} ly={}",
                lx, ly
            )));
        }
        if support < 2 || support % 2 != 0 {
            return Err(IbError::InvalidParameter(format!(
                "support width must be even and >= 2, got {}",
                support
            )));
        }
        if support > nx.min(ny) {
            return Err(IbError::InvalidParameter(format!(
                "support width {} exceeds grid size {}x{}",
                support, nx, ny
            )));
        }
        if !(ds > 0. && ds.is_finite()) {
            return Err(IbError::InvalidParameter(format!("ds must be positive, got {}", ds)));
        }

        Ok(GridDescriptor {
            nx,
            ny,
            lx,
            ly,
            dx: lx / nx as FT,
            dy: ly / ny as FT,
            support,
            num_points,
            ds,
            boundary_x,
            boundary_y,
        })
    }

    /// Half a grid cell, so that a resolved structure leaves no Eulerian cell unreached.
    pub fn default_ds(lx: FT, nx: usize) -> FT {
        lx / (2. * nx as FT)
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn lx(&self) -> FT {
        self.lx
    }

    pub fn ly(&self) -> FT {
        self.ly
    }

    pub fn dx(&self) -> FT {
        self.dx
    }

    pub fn dy(&self) -> FT {
        self.dy
    }

    pub fn support(&self) -> usize {
        self.support
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn ds(&self) -> FT {
        self.ds
    }

    pub fn cells(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.nx,
            Axis::Y => self.ny,
        }
    }

    pub fn spacing(&self, axis: Axis) -> FT {
        match axis {
            Axis::X => self.dx,
            Axis::Y => self.dy,
        }
    }

    pub fn boundary(&self, axis: Axis) -> BoundaryKind {
        match axis {
            Axis::X => self.boundary_x,
            Axis::Y => self.boundary_y,
        }
    }

    pub fn x_coords(&self) -> Vec<FT> {
        (0..self.nx).map(|i| i as FT * self.dx).collect()
    }

    pub fn y_coords(&self) -> Vec<FT> {
        (0..self.ny).map(|j| j as FT * self.dy).collect()
    }
}

#[test]
fn grid_descriptor_spacing_test() {
    let grid = GridDescriptor::new(64, 32, 2.0, 1.0, 4, 10, 0.01).unwrap();
    assert_eq!(grid.dx(), 2.0 / 64.);
    assert_eq!(grid.dy(), 1.0 / 32.);
    assert_eq!(grid.x_coords().len(), 64);
    assert_eq!(grid.y_coords()[31], 31. / 32.);
    assert_eq!(grid.boundary(Axis::X), BoundaryKind::Periodic);
    approx::assert_relative_eq!(GridDescriptor::default_ds(2.0, 64), 1. / 64.);
}

#[test]
fn grid_descriptor_rejects_bad_support() {
    assert!(GridDescriptor::new(16, 16, 1., 1., 3, 1, 0.1).is_err());
    assert!(GridDescriptor::new(16, 16, 1., 1., 0, 1, 0.1).is_err());
    assert!(GridDescriptor::new(4, 16, 1., 1., 6, 1, 0.1).is_err());
    assert!(GridDescriptor::new(16, 16, 0., 1., 4, 1, 0.1).is_err());
    assert!(GridDescriptor::new(16, 16, 1., 1., 4, 1, 0.).is_err());
}
