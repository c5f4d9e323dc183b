use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    aggregator::ModelFlags,
    delta_kernels::{CosineKernel, DeltaKernel, HatKernel, Peskin4Kernel},
    error::{IbError, IbResult},
    floating_type_mod::FT,
    force_model::{Clock, ImmersedBoundaryForces},
    grid::{BoundaryKind, GridDescriptor},
    lagrangian_points::LagrangianPoints,
    muscle_activation::{ActivationWaveform, HillActivation},
    structure::{ElementTables, Structure},
    V2,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaKernelType {
    // raised cosine, any even support
    Cosine,
    // needs support 4
    Peskin4,
    // needs support 2
    Hat,
}

impl DeltaKernelType {
    pub fn kernel(self, support: usize) -> IbResult<DeltaKernel> {
        let kernel: DeltaKernel = match self {
            DeltaKernelType::Cosine => CosineKernel::new(support)?.into(),
            DeltaKernelType::Peskin4 => Peskin4Kernel.into(),
            DeltaKernelType::Hat => HatKernel.into(),
        };
        Ok(kernel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceModelParams {
    pub nx: usize,
    pub ny: usize,
    pub lx: FT,
    pub ly: FT,
    pub support: usize,

    // defaults to half a grid cell
    #[serde(default)]
    pub ds: Option<FT>,

    #[serde(default)]
    pub boundary_x: BoundaryKind,
    #[serde(default)]
    pub boundary_y: BoundaryKind,

    pub kernel: DeltaKernelType,

    #[serde(default)]
    pub flags: ModelFlags,

    #[serde(default)]
    pub activation: ActivationWaveform,

    pub dt: FT,
}

impl ForceModelParams {
    pub fn from_yaml_str(yaml: &str) -> IbResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /**
     * Parses the parameters and replaces single top level entries with the ones in `overrides`.
     * Keys missing from the base parameters are rejected, so typos do not pass silently.
     */
    pub fn from_yaml_with_overrides(yaml: &str, overrides: Option<&str>) -> IbResult<Self> {
        let mut params: serde_yaml::Value = serde_yaml::from_str(yaml)?;

        if let Some(overrides) = overrides {
            let overrides: HashMap<String, serde_yaml::Value> = serde_yaml::from_str(overrides)?;
            let mapping = params
                .as_mapping_mut()
                .ok_or_else(|| IbError::InvalidParameter("parameters are not a mapping".to_string()))?;
            for (k, v) in overrides.into_iter() {
                let entry = mapping
                    .get_mut(&serde_yaml::Value::String(k.clone()))
                    .ok_or_else(|| IbError::InvalidParameter(format!("not able to find attribute {}", k)))?;
                *entry = v;
            }
        }

        Ok(serde_yaml::from_value(params)?)
    }

    pub fn from_file(path: impl AsRef<Path>, overrides: Option<&Path>) -> IbResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        let overrides = match overrides {
            Some(p) => Some(std::fs::read_to_string(p)?),
            None => None,
        };
        Self::from_yaml_with_overrides(&yaml, overrides.as_deref())
    }

    pub fn ds(&self) -> FT {
        self.ds.unwrap_or_else(|| GridDescriptor::default_ds(self.lx, self.nx))
    }

    pub fn grid(&self, num_points: usize) -> IbResult<GridDescriptor> {
        GridDescriptor::with_boundaries(
            self.nx,
            self.ny,
            self.lx,
            self.ly,
            self.support,
            num_points,
            self.ds(),
            self.boundary_x,
            self.boundary_y,
        )
    }

    pub fn delta_kernel(&self) -> IbResult<DeltaKernel> {
        self.kernel.kernel(self.support)
    }

    pub fn muscle_activation(&self) -> HillActivation {
        HillActivation {
            waveform: self.activation,
        }
    }

    pub fn clock(&self, time: FT) -> Clock {
        Clock { time, dt: self.dt }
    }

    pub fn build(&self, structure: Structure) -> IbResult<ImmersedBoundaryForces> {
        let grid = self.grid(structure.num_points())?;
        ImmersedBoundaryForces::new(grid, self.delta_kernel()?, self.flags, structure)
    }
}

/// Lagrangian points and element tables of one structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub points: Vec<V2>,

    // positions of the previous timestep, the current ones if missing
    #[serde(default)]
    pub previous_points: Option<Vec<V2>>,

    #[serde(default)]
    pub elements: ElementTables,
}

impl SceneConfig {
    pub fn from_yaml_str(yaml: &str) -> IbResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> IbResult<Self> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    pub fn lagrangian_points(&self) -> IbResult<LagrangianPoints> {
        match &self.previous_points {
            Some(previous) => LagrangianPoints::new(self.points.clone(), previous.clone()),
            None => Ok(LagrangianPoints::stationary(self.points.clone())),
        }
    }

    pub fn structure(&self) -> IbResult<Structure> {
        Structure::new(self.points.len(), self.elements.clone())
    }
}

#[cfg(test)]
const TEST_PARAMS: &str = "
nx: 32
ny: 32
lx: 1.0
ly: 1.0
support: 4
kernel: Cosine
dt: 0.0001
flags:
  springs: true
  targets: true
activation:
  Pulsed:
    period: 1.0
    duration: 0.5
    phase: 0.0
";

#[test]
fn params_from_yaml() {
    let params = ForceModelParams::from_yaml_str(TEST_PARAMS).unwrap();
    assert_eq!(params.nx, 32);
    assert!(params.flags.springs && params.flags.targets);
    assert!(!params.flags.beams);
    assert_eq!(params.boundary_x, BoundaryKind::Periodic);
    approx::assert_relative_eq!(params.ds(), 1. / 64.);

    let grid = params.grid(10).unwrap();
    assert_eq!(grid.num_points(), 10);
    assert!(matches!(params.delta_kernel().unwrap(), DeltaKernel::CosineKernel(_)));
    assert!(matches!(params.activation, ActivationWaveform::Pulsed { .. }));
}

#[test]
fn params_overrides_replace_entries() {
    let params = ForceModelParams::from_yaml_with_overrides(TEST_PARAMS, Some("nx: 64\nkernel: Peskin4")).unwrap();
    assert_eq!(params.nx, 64);
    assert_eq!(params.kernel, DeltaKernelType::Peskin4);

    assert!(matches!(
        ForceModelParams::from_yaml_with_overrides(TEST_PARAMS, Some("nz: 3")),
        Err(IbError::InvalidParameter(_))
    ));
}

#[test]
fn peskin_kernel_with_wrong_support_is_rejected_at_build() {
    let mut params = ForceModelParams::from_yaml_str(TEST_PARAMS).unwrap();
    params.kernel = DeltaKernelType::Peskin4;
    params.support = 6;
    let structure = Structure::new(1, ElementTables::default()).unwrap();
    assert!(matches!(params.build(structure), Err(IbError::Domain { .. })));
}

#[test]
fn scene_from_yaml() {
    let yaml = "
points:
  - [0.0, 0.0]
  - [1.0, 0.0]
elements:
  springs:
    - { master: 1, slave: 2, stiffness: 2.0, resting_length: 1.5 }
";
    let scene = SceneConfig::from_yaml_str(yaml).unwrap();
    let points = scene.lagrangian_points().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(scene.structure().unwrap().springs().len(), 1);
}
