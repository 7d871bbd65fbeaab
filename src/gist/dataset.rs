// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Implementation of the `Gist` structure holding a loaded GIST dataset.

use std::path::Path;

use indexmap::IndexMap;
use ndarray::Array1;

use crate::errors::{GistError, ParseGistError, WriteDxError};
use crate::io::dx_io;
use crate::io::gist_io;
use crate::structures::grid::GridSpec;
use crate::system::general::System;

/// A loaded GIST dataset: a regular voxel grid with named per-voxel data
/// columns and the metadata needed to interpret them.
///
/// Columns come in two flavors distinguished by their name suffix:
/// `*_dens` columns hold densities (kcal/mol/Å³ for energies) and `*_norm`
/// columns hold per-water-molecule values (kcal/mol).
///
/// ## Example
/// ```no_run
/// use grist_rs::prelude::*;
///
/// let mut gist = Gist::from_file("gist.dat").unwrap();
///
/// // associate the solute structure and the solvent reference energy
/// gist.set_solute(System::from_file("solute.pdb").unwrap());
/// gist.set_eww_ref(-9.533).unwrap();
///
/// // export the solvation free-energy density
/// gist.save_dx("A_dens", "deltaG_density.dx").unwrap();
/// ```
#[derive(Debug)]
pub struct Gist {
    grid: GridSpec,
    data: IndexMap<String, Array1<f64>>,
    n_frames: u32,
    rho0: f64,
    eww_ref: Option<f64>,
    solute: Option<System>,
}

impl Gist {
    /// Load a GIST dataset from an output table.
    ///
    /// The number of analyzed frames and the reference density must be present
    /// in the file header; use [`Gist::from_file_with`] to provide them explicitly.
    pub fn from_file(filename: impl AsRef<Path>) -> Result<Self, ParseGistError> {
        Self::from_file_with(filename, None, None)
    }

    /// Load a GIST dataset from an output table, optionally overriding the
    /// number of analyzed frames and the reference (bulk) number density.
    ///
    /// Explicitly provided values take precedence over values found in the
    /// file header. If a value is neither provided nor present in the header,
    /// an error is returned: both are required to interpret the data columns.
    pub fn from_file_with(
        filename: impl AsRef<Path>,
        n_frames: Option<u32>,
        rho0: Option<f64>,
    ) -> Result<Self, ParseGistError> {
        let table = gist_io::read_gist_table(filename)?;

        let n_frames = n_frames
            .or(table.n_frames)
            .ok_or(ParseGistError::MissingFrameCount)?;
        let rho0 = rho0
            .or(table.rho0)
            .ok_or(ParseGistError::MissingReferenceDensity)?;

        Ok(Gist {
            grid: table.grid,
            data: table.columns,
            n_frames,
            rho0,
            eww_ref: None,
            solute: None,
        })
    }

    /// Get the geometry of the voxel grid.
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Get the number of frames analyzed by the GIST calculation.
    pub fn n_frames(&self) -> u32 {
        self.n_frames
    }

    /// Get the reference (bulk) number density of the solvent (in Å⁻³).
    pub fn rho0(&self) -> f64 {
        self.rho0
    }

    /// Get the water-water reference energy (in kcal/mol), if set.
    pub fn eww_ref(&self) -> Option<f64> {
        self.eww_ref
    }

    /// Get the solute structure associated with the dataset, if any.
    pub fn solute(&self) -> Option<&System> {
        self.solute.as_ref()
    }

    /// Associate a solute structure with the dataset.
    /// The solute is required for detecting bulk reference values.
    pub fn set_solute(&mut self, solute: System) {
        self.solute = Some(solute);
    }

    /// Set the water-water reference energy (in kcal/mol) and derive the
    /// referenced `Eww_norm` and `Eww_dens` columns from their unreferenced
    /// counterparts.
    ///
    /// The reference energy is specific to the solvent model (e.g. −9.533
    /// kcal/mol for TIP3P water) and is given per water molecule using the
    /// half-interaction convention of GIST analyses.
    pub fn set_eww_ref(&mut self, eww_ref: f64) -> Result<(), GistError> {
        self.eww_ref = Some(eww_ref);

        let norm = self.referenced("Eww_unref_norm", eww_ref)?;
        let dens = self.referenced("Eww_unref_dens", eww_ref)?;

        self.insert("Eww_norm", norm)?;
        self.insert("Eww_dens", dens)?;

        Ok(())
    }

    /// Iterate over the names of the stored data columns, in file order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|name| name.as_str())
    }

    /// Check whether a column with the provided name is stored in the dataset.
    /// Note that derived columns (see [`Gist::column`]) are not stored until computed.
    pub fn has_column(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Get the values of a column.
    ///
    /// Stored columns are returned as they are. In addition, the following
    /// derived columns are computed on demand:
    /// - `Eww_dens` / `Eww_norm`: water-water energy referenced against the
    ///   reference energy set by [`Gist::set_eww_ref`].
    /// - `dTS_dens` / `dTS_norm`: total entropy; the six-dimensional entropy
    ///   (`dTSsix_*`) when the table provides it, otherwise the sum of the
    ///   translational and orientational contributions.
    /// - `Eall_dens` / `Eall_norm`: `Esw + 2·Eww`. The factor of two restores
    ///   the full water-water interaction from the half-interaction convention.
    /// - `A_dens` / `A_norm`: solvation free energy, `Eall − dTS`.
    pub fn column(&self, name: &str) -> Result<Array1<f64>, GistError> {
        if let Some(values) = self.data.get(name) {
            return Ok(values.clone());
        }

        match name {
            "Eww_dens" | "Eww_norm" => {
                let eww_ref = self.eww_ref.ok_or(GistError::MissingEwwRef)?;
                let unref = format!("Eww_unref_{}", suffix(name));
                self.referenced(&unref, eww_ref)
            }
            "dTS_dens" | "dTS_norm" => {
                let suffix = suffix(name);
                let six = format!("dTSsix_{}", suffix);
                match self.has_column(&six) {
                    true => self.column(&six),
                    false => Ok(self.column(&format!("dTStrans_{}", suffix))?
                        + self.column(&format!("dTSorient_{}", suffix))?),
                }
            }
            "Eall_dens" | "Eall_norm" => {
                let suffix = suffix(name);
                let esw = self.column(&format!("Esw_{}", suffix))?;
                let eww = self.column(&format!("Eww_{}", suffix))?;
                Ok(esw + eww * 2.0)
            }
            "A_dens" | "A_norm" => {
                let suffix = suffix(name);
                let energy = self.column(&format!("Eall_{}", suffix))?;
                let entropy = self.column(&format!("dTS_{}", suffix))?;
                Ok(energy - entropy)
            }
            _ => Err(self.column_not_found(name)),
        }
    }

    /// Store a column, overwriting any existing column with the same name.
    ///
    /// ## Returns
    /// `GistError::ColumnLengthMismatch` if the number of values does not
    /// match the number of voxels of the grid.
    pub fn insert(&mut self, name: &str, values: Array1<f64>) -> Result<(), GistError> {
        if values.len() != self.grid.n_voxels() {
            return Err(GistError::ColumnLengthMismatch(
                name.to_string(),
                values.len(),
                self.grid.n_voxels(),
            ));
        }

        self.data.insert(name.to_string(), values);
        Ok(())
    }

    /// Remove a stored column, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<Array1<f64>> {
        self.data.shift_remove(name)
    }

    /// Get the per-voxel water number density (in Å⁻³):
    /// `population / (n_frames · voxel volume)`.
    pub fn number_density(&self) -> Result<Array1<f64>, GistError> {
        let population = self.column("population")?;
        let normalization = self.n_frames as f64 * self.grid.voxel_volume();

        Ok(population / normalization)
    }

    /// Export a column into an OpenDX volumetric file.
    /// Derived columns (see [`Gist::column`]) can be exported directly.
    ///
    /// ## Example
    /// ```no_run
    /// use grist_rs::prelude::*;
    ///
    /// let mut gist = Gist::from_file("gist.dat").unwrap();
    /// gist.set_eww_ref(-9.533).unwrap();
    ///
    /// gist.save_dx("A_dens", "deltaG_density.dx").unwrap();
    /// ```
    pub fn save_dx(
        &self,
        column: &str,
        filename: impl AsRef<Path>,
    ) -> Result<(), WriteDxError> {
        let values = self.column(column)?;
        dx_io::write_dx(&self.grid, &values, column, filename)
    }

    pub(crate) fn column_not_found(&self, name: &str) -> GistError {
        let available: Vec<&str> = self.column_names().collect();
        GistError::ColumnNotFound(name.to_string(), available.join(", "))
    }
}

/// Get the flavor suffix (`dens` or `norm`) of a column name.
fn suffix(name: &str) -> &str {
    match name.ends_with("_dens") {
        true => "dens",
        false => "norm",
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn load_example() -> Gist {
        Gist::from_file("test_files/example_gist.dat").unwrap()
    }

    #[test]
    fn from_file() {
        let gist = load_example();

        assert_eq!(gist.n_frames(), 1000);
        assert_approx_eq!(f64, gist.rho0(), 0.0334);
        assert_eq!(gist.grid().shape(), [2, 2, 2]);
        assert_eq!(gist.eww_ref(), None);
        assert!(gist.solute().is_none());
        assert!(gist.has_column("population"));
        assert!(!gist.has_column("A_dens"));
    }

    #[test]
    fn from_file_missing_metadata() {
        match Gist::from_file("test_files/example_gist_nometa.dat") {
            Err(ParseGistError::MissingFrameCount) => (),
            other => panic!("Unexpected result: {:?}", other),
        }

        match Gist::from_file_with("test_files/example_gist_nometa.dat", Some(1000), None) {
            Err(ParseGistError::MissingReferenceDensity) => (),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn from_file_with_overrides() {
        let gist =
            Gist::from_file_with("test_files/example_gist_nometa.dat", Some(500), Some(0.0329))
                .unwrap();

        assert_eq!(gist.n_frames(), 500);
        assert_approx_eq!(f64, gist.rho0(), 0.0329);

        // explicit values take precedence over the file header
        let gist = Gist::from_file_with("test_files/example_gist.dat", Some(500), None).unwrap();
        assert_eq!(gist.n_frames(), 500);
        assert_approx_eq!(f64, gist.rho0(), 0.0334);
    }

    #[test]
    fn number_density() {
        let gist = load_example();
        let density = gist.number_density().unwrap();

        // population 4.175 over 1000 frames in 0.125 Å³ voxels is exactly rho0
        for value in density.iter() {
            assert_approx_eq!(f64, *value, 0.0334, epsilon = 1e-12);
        }
    }

    #[test]
    fn eww_referencing() {
        let mut gist = load_example();

        // referenced energies are not available before the reference is set
        match gist.column("Eww_norm") {
            Err(GistError::MissingEwwRef) => (),
            other => panic!("Unexpected result: {:?}", other),
        }

        gist.set_eww_ref(-9.533).unwrap();
        assert_approx_eq!(f64, gist.eww_ref().unwrap(), -9.533);

        let norm = gist.column("Eww_norm").unwrap();
        assert_approx_eq!(f64, norm[0], -0.067, epsilon = 1e-9);

        let dens = gist.column("Eww_dens").unwrap();
        assert_approx_eq!(f64, dens[0], -0.320640 + 9.533 * 0.0334, epsilon = 1e-9);

        // the unreferenced columns are untouched
        assert_approx_eq!(f64, gist.column("Eww_unref_norm").unwrap()[0], -9.6);
    }

    #[test]
    fn derived_columns() {
        let mut gist = load_example();
        gist.set_eww_ref(-9.533).unwrap();

        // the six-dimensional entropy supersedes the trans + orient split
        let dts = gist.column("dTS_norm").unwrap();
        assert_approx_eq!(f64, dts[0], 0.9);

        let eall = gist.column("Eall_norm").unwrap();
        assert_approx_eq!(f64, eall[0], -0.2 + 2.0 * (-0.067), epsilon = 1e-9);

        let a = gist.column("A_norm").unwrap();
        assert_approx_eq!(f64, a[0], -1.234, epsilon = 1e-9);

        let a_dens = gist.column("A_dens").unwrap();
        assert_approx_eq!(f64, a_dens[0], -1.234 * 0.0334, epsilon = 1e-9);
    }

    #[test]
    fn derived_entropy_fallback() {
        let mut gist = load_example();
        gist.remove("dTSsix_norm").unwrap();
        gist.remove("dTSsix_dens").unwrap();

        let dts = gist.column("dTS_norm").unwrap();
        assert_approx_eq!(f64, dts[0], 0.8, epsilon = 1e-9);
    }

    #[test]
    fn column_not_found() {
        let gist = load_example();

        match gist.column("B_dens") {
            Err(GistError::ColumnNotFound(name, available)) => {
                assert_eq!(name, "B_dens");
                assert!(available.contains("population"));
                assert!(available.contains("Esw_dens"));
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn insert_length_mismatch() {
        let mut gist = load_example();

        match gist.insert("custom", Array1::from_elem(7, 1.0)) {
            Err(GistError::ColumnLengthMismatch(name, 7, 8)) => assert_eq!(name, "custom"),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn save_dx() {
        let mut gist = load_example();
        gist.set_eww_ref(-9.533).unwrap();

        let output = tempfile::NamedTempFile::new().unwrap();
        gist.save_dx("A_dens", output.path()).unwrap();

        let written = std::fs::read_to_string(output.path()).unwrap();
        assert!(written.starts_with("object 1 class gridpositions counts 2 2 2"));
        assert!(written.contains("origin 0.250000 0.250000 0.250000"));
        assert!(written.contains("object 3 class array type double rank 0 items 8 data follows"));
        assert!(written.contains("object \"A_dens\" class field"));

        // all eight voxels hold the same free-energy density
        assert_eq!(written.matches("-4.121560e-2").count(), 8);
    }

    #[test]
    fn save_dx_unknown_column() {
        let gist = load_example();

        let output = tempfile::NamedTempFile::new().unwrap();
        match gist.save_dx("B_dens", output.path()) {
            Err(WriteDxError::Column(GistError::ColumnNotFound(name, _))) => {
                assert_eq!(name, "B_dens")
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }
}
