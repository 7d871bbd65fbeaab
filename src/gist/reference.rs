// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Implementation of bulk detection and reference-value handling for GIST datasets.

use hashbrown::HashMap;
use ndarray::Array1;

use crate::errors::GistError;
use crate::gist::dataset::Gist;
use crate::structures::vector3d::Vector3D;

/// Default distance from the solute (in ångströms) beyond which a voxel is
/// considered to contain bulk solvent. The first solvation shells reach out
/// to roughly 4.5 Å, so everything farther than this is safely bulk.
pub const BULK_DISTANCE_CUTOFF: f32 = 5.0;

/// ## Methods for bulk detection and referencing of GIST columns.
impl Gist {
    /// Classify the voxels of the grid as bulk or non-bulk.
    ///
    /// A voxel is bulk when its center lies farther than `cutoff` from every
    /// atom of the associated solute structure. The search bins the solute
    /// atoms into cutoff-sized cells so that only the 27 neighboring cells
    /// have to be inspected per voxel.
    ///
    /// ## Returns
    /// One flag per voxel, in the linear order of the grid.
    /// `GistError::MissingSolute` if no solute structure is associated.
    pub fn bulk_voxels(&self, cutoff: f32) -> Result<Vec<bool>, GistError> {
        let solute = self.solute().ok_or(GistError::MissingSolute)?;
        let n_voxels = self.grid().n_voxels();

        if solute.get_n_atoms() == 0 || cutoff <= 0.0 {
            return Ok(vec![true; n_voxels]);
        }

        // bin the solute atoms into cutoff-sized cells
        let mut cells: HashMap<(i32, i32, i32), Vec<Vector3D>> = HashMap::new();
        for atom in solute.atoms_iter() {
            let position = *atom.get_position();
            cells
                .entry(cell_index(&position, cutoff))
                .or_default()
                .push(position);
        }

        let cutoff2 = cutoff * cutoff;
        let mut mask = vec![true; n_voxels];

        for (index, flag) in mask.iter_mut().enumerate() {
            let center = self.grid().voxel_center(index);
            let center = Vector3D::new(center[0] as f32, center[1] as f32, center[2] as f32);
            let (cx, cy, cz) = cell_index(&center, cutoff);

            'search: for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let Some(atoms) = cells.get(&(cx + dx, cy + dy, cz + dz)) else {
                            continue;
                        };

                        for position in atoms {
                            let dist = center - *position;
                            if dist.dot(&dist) <= cutoff2 {
                                *flag = false;
                                break 'search;
                            }
                        }
                    }
                }
            }
        }

        Ok(mask)
    }

    /// Detect the bulk reference value of a column using the default
    /// bulk distance cutoff. See [`Gist::detect_reference_value_with_cutoff`].
    pub fn detect_reference_value(&self, column: &str) -> Result<f64, GistError> {
        self.detect_reference_value_with_cutoff(column, BULK_DISTANCE_CUTOFF)
    }

    /// Detect the bulk reference value of a column.
    ///
    /// The returned value is always **per water molecule**, independent of the
    /// flavor of the inspected column:
    /// - for `*_norm` columns, the population-weighted mean over bulk voxels,
    /// - for `*_dens` columns, the plain mean over bulk voxels divided by the
    ///   reference density.
    ///
    /// One detected value is therefore valid for referencing both flavors of
    /// the quantity (see [`Gist::referenced`]).
    ///
    /// ## Returns
    /// `GistError::MissingSolute` if no solute structure is associated.
    /// `GistError::NoBulkVoxels` if no voxel lies beyond the cutoff.
    /// `GistError::NotReferencable` if the column has neither flavor suffix.
    pub fn detect_reference_value_with_cutoff(
        &self,
        column: &str,
        cutoff: f32,
    ) -> Result<f64, GistError> {
        let values = self.column(column)?;
        let mask = self.bulk_voxels(cutoff)?;

        if column.ends_with("_norm") {
            let population = self.column("population")?;

            let mut weighted_sum = 0.0;
            let mut weight = 0.0;
            for (index, value) in values.iter().enumerate() {
                if mask[index] {
                    weighted_sum += value * population[index];
                    weight += population[index];
                }
            }

            if weight == 0.0 {
                return Err(GistError::NoBulkVoxels(format!("{}", cutoff)));
            }

            Ok(weighted_sum / weight)
        } else if column.ends_with("_dens") {
            let mut sum = 0.0;
            let mut count = 0usize;
            for (index, value) in values.iter().enumerate() {
                if mask[index] {
                    sum += value;
                    count += 1;
                }
            }

            if count == 0 {
                return Err(GistError::NoBulkVoxels(format!("{}", cutoff)));
            }

            Ok(sum / count as f64 / self.rho0())
        } else {
            Err(GistError::NotReferencable(column.to_string()))
        }
    }

    /// Subtract a per-molecule reference value from a column.
    ///
    /// - `*_norm` columns: the reference value is subtracted directly.
    /// - `*_dens` columns: the reference value is scaled by the per-voxel
    ///   water number density before subtraction, so bulk-like voxels end up
    ///   near zero in both flavors.
    ///
    /// The referenced values are returned; no column of the dataset is modified.
    pub fn referenced(&self, column: &str, refval: f64) -> Result<Array1<f64>, GistError> {
        let values = self.column(column)?;

        if column.ends_with("_norm") {
            Ok(values - refval)
        } else if column.ends_with("_dens") {
            let density = self.number_density()?;
            Ok(values - density * refval)
        } else {
            Err(GistError::NotReferencable(column.to_string()))
        }
    }

    /// Re-reference the six-dimensional entropy columns against their detected
    /// bulk value.
    ///
    /// Poorly converged entropy estimates leave a non-zero offset in bulk
    /// regions which would otherwise leak into every derived free energy.
    /// This method snapshots the unreferenced values into `dTSsix_unref_norm`
    /// and `dTSsix_unref_dens` on first use, detects the bulk value on
    /// `dTSsix_unref_dens`, and rewrites `dTSsix_norm` and `dTSsix_dens` as
    /// referenced columns.
    ///
    /// The method is idempotent: repeated calls re-detect the reference from
    /// the preserved unreferenced snapshot.
    ///
    /// ## Returns
    /// The detected per-molecule reference value (in kcal/mol).
    pub fn reference_entropy(&mut self) -> Result<f64, GistError> {
        if !self.has_column("dTSsix_unref_norm") {
            let norm = self.column("dTSsix_norm")?;
            let dens = self.column("dTSsix_dens")?;

            self.insert("dTSsix_unref_norm", norm)?;
            self.insert("dTSsix_unref_dens", dens)?;
        }

        let refval = self.detect_reference_value("dTSsix_unref_dens")?;

        let norm = self.referenced("dTSsix_unref_norm", refval)?;
        let dens = self.referenced("dTSsix_unref_dens", refval)?;

        self.insert("dTSsix_norm", norm)?;
        self.insert("dTSsix_dens", dens)?;

        Ok(refval)
    }
}

/// Get the index of the cutoff-sized cell containing the provided point.
#[inline]
fn cell_index(position: &Vector3D, cell_size: f32) -> (i32, i32, i32) {
    (
        (position.x / cell_size).floor() as i32,
        (position.y / cell_size).floor() as i32,
        (position.z / cell_size).floor() as i32,
    )
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::atom::Atom;
    use crate::structures::simbox::SimBox;
    use crate::system::general::System;
    use float_cmp::assert_approx_eq;

    fn load_example() -> Gist {
        Gist::from_file("test_files/example_gist.dat").unwrap()
    }

    /// A solute with a single atom at the provided position.
    fn solute_at(position: [f32; 3]) -> System {
        let atom = Atom::new(1, "MOL", 1, "C1", position.into());
        System::new("Solute", vec![atom], SimBox::default())
    }

    #[test]
    fn bulk_voxels_all_bulk() {
        let mut gist = load_example();
        gist.set_solute(solute_at([100.0, 100.0, 100.0]));

        let mask = gist.bulk_voxels(BULK_DISTANCE_CUTOFF).unwrap();
        assert_eq!(mask.len(), 8);
        assert!(mask.iter().all(|&flag| flag));
    }

    #[test]
    fn bulk_voxels_partial() {
        let mut gist = load_example();
        // the solute atom sits exactly in the first voxel center
        gist.set_solute(solute_at([0.25, 0.25, 0.25]));

        let mask = gist.bulk_voxels(0.6).unwrap();

        // voxels within 0.6 Å: the origin voxel and its three face neighbors
        assert_eq!(mask.iter().filter(|&&flag| !flag).count(), 4);
        assert!(!mask[0]);
        assert!(!mask[1]);
        assert!(!mask[2]);
        assert!(!mask[4]);
        assert!(mask[3]);
        assert!(mask[7]);
    }

    #[test]
    fn bulk_voxels_no_solute() {
        let gist = load_example();

        match gist.bulk_voxels(BULK_DISTANCE_CUTOFF) {
            Err(GistError::MissingSolute) => (),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn detect_reference_value_dens() {
        let mut gist = load_example();
        gist.set_solute(solute_at([100.0, 100.0, 100.0]));

        // bulk mean of the entropy density divided by rho0 gives the per-molecule value
        let refval = gist.detect_reference_value("dTSsix_dens").unwrap();
        assert_approx_eq!(f64, refval, 0.9, epsilon = 1e-9);
    }

    #[test]
    fn detect_reference_value_norm() {
        let mut gist = load_example();
        gist.set_solute(solute_at([100.0, 100.0, 100.0]));

        let refval = gist.detect_reference_value("dTSsix_norm").unwrap();
        assert_approx_eq!(f64, refval, 0.9, epsilon = 1e-9);
    }

    #[test]
    fn detect_reference_value_no_bulk() {
        let mut gist = load_example();
        // with the default cutoff the whole tiny grid is within the solute's reach
        gist.set_solute(solute_at([0.5, 0.5, 0.5]));

        match gist.detect_reference_value("dTSsix_dens") {
            Err(GistError::NoBulkVoxels(_)) => (),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn detect_reference_value_wrong_flavor() {
        let mut gist = load_example();
        gist.set_solute(solute_at([100.0, 100.0, 100.0]));

        match gist.detect_reference_value("g_O") {
            Err(GistError::NotReferencable(name)) => assert_eq!(name, "g_O"),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn referenced_norm_and_dens() {
        let gist = load_example();

        let norm = gist.referenced("dTSsix_norm", 0.9).unwrap();
        let dens = gist.referenced("dTSsix_dens", 0.9).unwrap();

        for index in 0..8 {
            assert_approx_eq!(f64, norm[index], 0.0, epsilon = 1e-9);
            assert_approx_eq!(f64, dens[index], 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn reference_entropy() {
        let mut gist = load_example();
        gist.set_solute(solute_at([100.0, 100.0, 100.0]));

        let refval = gist.reference_entropy().unwrap();
        assert_approx_eq!(f64, refval, 0.9, epsilon = 1e-9);

        // the entropy columns are now referenced, the snapshots preserved
        assert_approx_eq!(f64, gist.column("dTSsix_norm").unwrap()[0], 0.0, epsilon = 1e-9);
        assert_approx_eq!(f64, gist.column("dTSsix_dens").unwrap()[0], 0.0, epsilon = 1e-9);
        assert_approx_eq!(f64, gist.column("dTSsix_unref_norm").unwrap()[0], 0.9);
        assert_approx_eq!(
            f64,
            gist.column("dTSsix_unref_dens").unwrap()[0],
            0.030060
        );

        // repeated referencing detects the same value from the snapshot
        let again = gist.reference_entropy().unwrap();
        assert_approx_eq!(f64, again, refval, epsilon = 1e-9);
        assert_approx_eq!(f64, gist.column("dTSsix_norm").unwrap()[0], 0.0, epsilon = 1e-9);
    }
}
