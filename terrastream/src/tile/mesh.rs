use crate::resource::MemoryCost;

/// Column-major 4×4 identity.
pub const IDENTITY_TRANSFORM: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Transform from the normalized `[-1, 1]³` mesh cube to the physical
/// extents `ll..ur`: translate to the center, scale by the half extent.
/// Column-major.
pub fn normalized_to_physical(ll: [f64; 3], ur: [f64; 3]) -> [f64; 16] {
    let half = [
        (ur[0] - ll[0]) * 0.5,
        (ur[1] - ll[1]) * 0.5,
        (ur[2] - ll[2]) * 0.5,
    ];
    let center = [
        (ur[0] + ll[0]) * 0.5,
        (ur[1] + ll[1]) * 0.5,
        (ur[2] + ll[2]) * 0.5,
    ];
    [
        half[0], 0.0, 0.0, 0.0, //
        0.0, half[1], 0.0, 0.0, //
        0.0, 0.0, half[2], 0.0, //
        center[0], center[1], center[2], 1.0,
    ]
}

/// One drawable part of a tile mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct SubMesh {
    /// Has its own texture coordinates (texture from the surface template).
    pub internal_uv: bool,
    /// Has external texture coordinates (texture from a bound layer).
    pub external_uv: bool,
    pub texture_layer: u32,
    pub surface_reference: u32,
    pub norm_to_phys: [f64; 16],
    pub ram_cost: u64,
    pub gpu_cost: u64,
}

impl Default for SubMesh {
    fn default() -> Self {
        Self {
            internal_uv: false,
            external_uv: false,
            texture_layer: 0,
            surface_reference: 0,
            norm_to_phys: IDENTITY_TRANSFORM,
            ram_cost: 0,
            gpu_cost: 0,
        }
    }
}

impl SubMesh {
    pub fn internal() -> Self {
        Self {
            internal_uv: true,
            ..Self::default()
        }
    }

    pub fn external() -> Self {
        Self {
            external_uv: true,
            ..Self::default()
        }
    }
}

/// All sub-meshes of one tile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshAggregate {
    pub submeshes: Vec<SubMesh>,
}

impl MeshAggregate {
    pub fn new(submeshes: Vec<SubMesh>) -> Self {
        Self { submeshes }
    }

    pub fn memory_cost(&self) -> MemoryCost {
        let own = (self.submeshes.len() * std::mem::size_of::<SubMesh>()) as u64;
        self.submeshes.iter().fold(MemoryCost::ram(own), |acc, m| {
            acc + MemoryCost {
                ram: m.ram_cost,
                gpu: m.gpu_cost,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_to_physical_maps_cube_corners() {
        let m = normalized_to_physical([10.0, 20.0, -4.0], [30.0, 60.0, 4.0]);
        let apply = |p: [f64; 3]| {
            [
                m[0] * p[0] + m[4] * p[1] + m[8] * p[2] + m[12],
                m[1] * p[0] + m[5] * p[1] + m[9] * p[2] + m[13],
                m[2] * p[0] + m[6] * p[1] + m[10] * p[2] + m[14],
            ]
        };
        assert_eq!(apply([-1.0, -1.0, -1.0]), [10.0, 20.0, -4.0]);
        assert_eq!(apply([1.0, 1.0, 1.0]), [30.0, 60.0, 4.0]);
        assert_eq!(apply([0.0, 0.0, 0.0]), [20.0, 40.0, 0.0]);
    }

    #[test]
    fn test_mesh_cost_sums_parts() {
        let mut a = SubMesh::internal();
        a.ram_cost = 100;
        a.gpu_cost = 1000;
        let mut b = SubMesh::external();
        b.ram_cost = 50;
        b.gpu_cost = 500;

        let cost = MeshAggregate::new(vec![a, b]).memory_cost();
        assert_eq!(cost.gpu, 1500);
        assert_eq!(cost.ram, 150 + 2 * std::mem::size_of::<SubMesh>() as u64);
    }
}
