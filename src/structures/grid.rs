// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Implementation of the geometry of a regular voxel grid.

use crate::errors::GridError;

/// Tolerance used when comparing voxel coordinates (in ångströms).
const COORD_TOL: f64 = 1e-3;

/// Geometry of a regular, axis-aligned voxel grid.
///
/// `origin` is the center of the first voxel, `delta` holds the voxel edge
/// lengths and `shape` the number of voxels along each axis. All lengths are
/// in ångströms.
///
/// Voxels are linearly ordered with the **z index changing fastest**:
/// `index = (ix * ny + iy) * nz + iz`. This is the row order of GIST output
/// tables and of the data section of OpenDX files, so data loaded from a GIST
/// table can be written out without any reordering.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    origin: [f64; 3],
    delta: [f64; 3],
    shape: [usize; 3],
}

impl GridSpec {
    /// Create a new grid from its origin, voxel dimensions and shape.
    pub fn new(origin: [f64; 3], delta: [f64; 3], shape: [usize; 3]) -> Result<Self, GridError> {
        if shape.iter().any(|&n| n == 0) {
            return Err(GridError::Empty);
        }

        for (d, axis) in delta.iter().zip(['x', 'y', 'z']) {
            if *d <= 0.0 || !d.is_finite() {
                return Err(GridError::InvalidDelta(axis));
            }
        }

        Ok(GridSpec {
            origin,
            delta,
            shape,
        })
    }

    /// Infer the grid from per-voxel center coordinates listed in z-fastest order.
    ///
    /// This is the inverse of what a GIST table stores: every data row carries
    /// the center of its voxel. The coordinates must form a complete regular
    /// grid; comparison uses a tolerance of 10⁻³ Å.
    pub fn from_coordinates(xs: &[f64], ys: &[f64], zs: &[f64]) -> Result<Self, GridError> {
        let n = xs.len();
        if n == 0 || ys.len() != n || zs.len() != n {
            return Err(GridError::Empty);
        }

        let (ox, dx, nx) = axis_values(xs, 'x')?;
        let (oy, dy, ny) = axis_values(ys, 'y')?;
        let (oz, dz, nz) = axis_values(zs, 'z')?;

        let grid = GridSpec::new([ox, oy, oz], [dx, dy, dz], [nx, ny, nz])?;

        if grid.n_voxels() != n {
            return Err(GridError::IncompleteGrid(grid.n_voxels(), n));
        }

        // verify that the rows are actually ordered z-fastest
        for i in 0..n {
            let center = grid.voxel_center(i);
            if (xs[i] - center[0]).abs() > COORD_TOL
                || (ys[i] - center[1]).abs() > COORD_TOL
                || (zs[i] - center[2]).abs() > COORD_TOL
            {
                return Err(GridError::NotRegular(i));
            }
        }

        Ok(grid)
    }

    /// Get the center of the first voxel (in ångströms).
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Get the voxel edge lengths (in ångströms).
    pub fn delta(&self) -> [f64; 3] {
        self.delta
    }

    /// Get the number of voxels along each axis.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Get the total number of voxels in the grid.
    pub fn n_voxels(&self) -> usize {
        self.shape[0] * self.shape[1] * self.shape[2]
    }

    /// Get the volume of a single voxel (in Å³).
    pub fn voxel_volume(&self) -> f64 {
        self.delta[0] * self.delta[1] * self.delta[2]
    }

    /// Convert a 3D voxel index to its linear index.
    #[inline]
    pub fn ijk_to_index(&self, ijk: [usize; 3]) -> usize {
        (ijk[0] * self.shape[1] + ijk[1]) * self.shape[2] + ijk[2]
    }

    /// Convert a linear voxel index to its 3D index.
    #[inline]
    pub fn index_to_ijk(&self, index: usize) -> [usize; 3] {
        let nz = self.shape[2];
        let ny = self.shape[1];
        [index / (ny * nz), (index / nz) % ny, index % nz]
    }

    /// Get the center of the voxel with the given linear index (in ångströms).
    #[inline]
    pub fn voxel_center(&self, index: usize) -> [f64; 3] {
        let ijk = self.index_to_ijk(index);
        [
            self.origin[0] + self.delta[0] * ijk[0] as f64,
            self.origin[1] + self.delta[1] * ijk[1] as f64,
            self.origin[2] + self.delta[2] * ijk[2] as f64,
        ]
    }
}

/// Extract origin, spacing and count of the unique coordinates along one axis.
fn axis_values(values: &[f64], axis: char) -> Result<(f64, f64, usize), GridError> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut unique = vec![sorted[0]];
    for &value in &sorted[1..] {
        if !value.is_finite() {
            return Err(GridError::InvalidDelta(axis));
        }
        if value - *unique.last().unwrap() > COORD_TOL {
            unique.push(value);
        }
    }

    if unique.len() == 1 {
        return Err(GridError::DegenerateAxis(axis));
    }

    let delta = (unique[unique.len() - 1] - unique[0]) / (unique.len() - 1) as f64;
    for pair in unique.windows(2) {
        if ((pair[1] - pair[0]) - delta).abs() > COORD_TOL {
            return Err(GridError::IrregularSpacing(axis));
        }
    }

    Ok((unique[0], delta, unique.len()))
}

/******************************/
/*         UNIT TESTS         */
/******************************/
