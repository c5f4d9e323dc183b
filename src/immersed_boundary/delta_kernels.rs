use enum_dispatch::enum_dispatch;

use crate::{
    error::{IbError, IbResult},
    floating_type_mod::{FT, PI},
};

/**
 * A one dimensional discrete delta function.
 *
 * `phi` is the dimensionless kernel in grid units. It has to vanish for `|q| >= support / 2`,
 * be symmetric and continuous, and its samples at integer shifts have to sum to one.
 */
#[enum_dispatch]
pub trait DeltaKernelTrait {
    /// Number of grid cells covered by the kernel.
    fn support(&self) -> usize;

    fn phi(&self, q: FT) -> FT;

    /**
     * r is the Eulerian coordinate minus the Lagrangian coordinate.
     * h is the grid spacing along the axis.
     */
    fn delta(&self, r: FT, h: FT) -> FT {
        self.phi(r / h) / h
    }
}

/**
 * Raised cosine kernel `(1/s)(1 + cos(2 pi q / s))` on `|q| < s/2`.
 *
 * With `s = 4` this is the standard cosine kernel of the immersed boundary method.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CosineKernel {
    support: usize,
}

impl CosineKernel {
    pub fn new(support: usize) -> IbResult<Self> {
        if support < 2 || support % 2 != 0 {
            return Err(IbError::InvalidParameter(format!(
                "cosine kernel support must be even and >= 2, got {}",
                support
            )));
        }
        Ok(CosineKernel { support })
    }
}

impl DeltaKernelTrait for CosineKernel {
    fn support(&self) -> usize {
        self.support
    }

    fn phi(&self, q: FT) -> FT {
        let s = self.support as FT;
        if q.abs() < 0.5 * s {
            return (1. + (2. * PI * q / s).cos()) / s;
        } else {
            return 0.;
        }
    }
}

/// Classical four point kernel by Peskin.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Peskin4Kernel;

impl DeltaKernelTrait for Peskin4Kernel {
    fn support(&self) -> usize {
        4
    }

    fn phi(&self, q: FT) -> FT {
        let r = q.abs();
        if r <= 1. {
            return (3. - 2. * r + (1. + 4. * r - 4. * r * r).sqrt()) * 0.125;
        } else if r < 2. {
            return (5. - 2. * r - (-7. + 12. * r - 4. * r * r).sqrt()) * 0.125;
        } else {
            return 0.;
        }
    }
}

/// Linear interpolation kernel (support 2).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct HatKernel;

impl DeltaKernelTrait for HatKernel {
    fn support(&self) -> usize {
        2
    }

    fn phi(&self, q: FT) -> FT {
        let r = q.abs();
        if r < 1. {
            1. - r
        } else {
            0.
        }
    }
}

#[enum_dispatch(DeltaKernelTrait)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeltaKernel {
    CosineKernel(CosineKernel),
    Peskin4Kernel(Peskin4Kernel),
    HatKernel(HatKernel),
}

#[cfg(test)]
fn all_test_kernels() -> Vec<DeltaKernel> {
    vec![
        CosineKernel::new(4).unwrap().into(),
        CosineKernel::new(6).unwrap().into(),
        Peskin4Kernel.into(),
        HatKernel.into(),
    ]
}

#[test]
fn delta_kernel_partition_of_unity_test() {
    let h = 0.125;
    let num_offsets = 97;

    for kernel in all_test_kernels() {
        let half = (kernel.support() / 2) as i64;
        for o in 0..num_offsets {
            let frac = o as FT / num_offsets as FT;
            let x = 3. * h + frac * h;

            let sum: FT = (-half + 1..=half)
                .map(|k| kernel.delta((3 + k) as FT * h - x, h))
                .sum();

            crate::assert_ft_approx_eq(sum, 1. / h, 1e-10, || {
                format!("{:?} weight sum at sub-cell offset {}", kernel, frac)
            });
        }
    }
}

#[test]
fn delta_kernel_symmetry_and_compact_support_test() {
    for kernel in all_test_kernels() {
        let s = kernel.support() as FT;
        for i in 0..=200 {
            let q = i as FT / 200. * s;
            approx::assert_relative_eq!(kernel.phi(q), kernel.phi(-q), epsilon = 1e-14);
            if q >= 0.5 * s {
                assert_eq!(kernel.phi(q), 0., "{:?} non-zero outside support at {}", kernel, q);
            } else {
                assert!(kernel.phi(q) >= 0.);
            }
        }
    }
}

#[test]
fn delta_kernel_continuity_test() {
    // no jumps inside the support, including the boundary and the Peskin branch switch
    let dq = 1e-7;
    for kernel in all_test_kernels() {
        let s = kernel.support() as FT;
        let steps = 1000;
        for i in 0..=steps {
            let q = -0.5 * s + s * i as FT / steps as FT;
            let jump = (kernel.phi(q + dq) - kernel.phi(q - dq)).abs();
            assert!(jump < 1e-5, "{:?} jumps by {} at q={}", kernel, jump, q);
        }
    }
}

#[test]
fn peskin_kernel_first_moment_test() {
    let kernel = Peskin4Kernel;
    for o in 0..10 {
        let frac = o as FT / 10.;
        let moment: FT = (-1..=2).map(|k| (k as FT - frac) * kernel.phi(k as FT - frac)).sum();
        approx::assert_abs_diff_eq!(moment, 0., epsilon = 1e-12);
    }
}

#[test]
fn cosine_kernel_rejects_odd_support() {
    assert!(CosineKernel::new(3).is_err());
    assert!(CosineKernel::new(0).is_err());
    assert!(CosineKernel::new(8).is_ok());
}
