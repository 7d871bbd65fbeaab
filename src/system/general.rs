// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Implementation of the `System` structure and methods for constructing the `System` and accessing its properties.

use std::error::Error;
use std::path::Path;

use crate::errors::ParseFileError;
use crate::files::FileType;
use crate::io::pdb_io;
use crate::io::prmtop_io;
use crate::structures::{atom::Atom, simbox::SimBox};

#[derive(Debug)]
pub struct System {
    /// Name of the molecular system.
    name: String,
    /// Vector of atoms in the system.
    atoms: Vec<Atom>,
    /// Size of the simulation box.
    simulation_box: SimBox,
    /// Whether the system is periodic, i.e. whether trajectory frames carry box information.
    periodic: bool,
    /// Simulation time of the current frame in picoseconds.
    simulation_time: f32,
}

/// ## Methods for creating `System` structures and accessing their properties.
impl System {
    /// Create new System structure with a given name from the provided vector of atoms and simulation box.
    ///
    /// ## Example
    /// ```no_run
    /// # use grist_rs::prelude::*;
    /// #
    /// let name = "My System";
    /// let atoms = Vec::new();
    ///
    /// // ... fill the `atoms` vector with Atom structures ...
    ///
    /// let simulation_box = SimBox::from([40.0, 40.0, 45.0]);
    ///
    /// // construct the molecular system
    /// let system = System::new(name, atoms, simulation_box);
    /// ```
    pub fn new(name: &str, atoms: Vec<Atom>, simulation_box: SimBox) -> Self {
        let periodic = !simulation_box.is_zero();

        System {
            name: name.to_string(),
            atoms,
            simulation_box,
            periodic,
            simulation_time: 0.0,
        }
    }

    /// Create a new System from an Amber prmtop file or a pdb file.
    /// The method will attempt to automatically recognize the file based on its extension.
    ///
    /// ## Returns
    /// `System` structure if successful.
    /// `ParseFileError` if the file format is not supported.
    /// `ParsePrmtopError` if parsing of the prmtop file fails.
    /// `ParsePdbError` if parsing of the pdb file fails.
    ///
    /// ## Example
    /// ```no_run
    /// # use grist_rs::prelude::*;
    /// #
    /// let system = match System::from_file("system.prmtop") {
    ///     Ok(x) => x,
    ///     Err(e) => {
    ///         eprintln!("{}", e);
    ///         return;
    ///     }
    /// };
    /// ```
    ///
    /// ## Notes
    /// - A topology file carries no coordinates: all atoms of a `System` read
    /// from a prmtop file are placed at the origin until a trajectory frame is applied.
    pub fn from_file(filename: impl AsRef<Path>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        match FileType::from_name(&filename) {
            FileType::PRMTOP => prmtop_io::read_prmtop(filename).map_err(Box::from),
            FileType::PDB => pdb_io::read_pdb(filename).map_err(Box::from),
            _ => Err(Box::from(ParseFileError::UnknownExtension(Box::from(
                filename.as_ref(),
            )))),
        }
    }

    /// Get the name of the molecular system.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Get the number of atoms in the system.
    pub fn get_n_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Get immutable reference to the atoms of the system.
    pub fn get_atoms_as_ref(&self) -> &Vec<Atom> {
        &self.atoms
    }

    /// Get immutable reference to the atom at target index. Atoms are indexed starting from 0.
    pub fn get_atom_as_ref(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Immutably iterate over the atoms of the system.
    pub fn atoms_iter(&self) -> std::slice::Iter<'_, Atom> {
        self.atoms.iter()
    }

    /// Mutably iterate over the atoms of the system.
    pub fn atoms_iter_mut(&mut self) -> std::slice::IterMut<'_, Atom> {
        self.atoms.iter_mut()
    }

    /// Get immutable reference to the simulation box of the system.
    pub fn get_box_as_ref(&self) -> &SimBox {
        &self.simulation_box
    }

    /// Get copy of the simulation box of the system.
    pub fn get_box_copy(&self) -> SimBox {
        self.simulation_box.clone()
    }

    /// Set the simulation box of the system.
    pub fn set_box(&mut self, simulation_box: SimBox) {
        self.simulation_box = simulation_box;
    }

    /// Check whether the system has a non-zero simulation box.
    pub fn has_box(&self) -> bool {
        !self.simulation_box.is_zero()
    }

    /// Check whether the system is periodic, i.e. whether its trajectory frames carry box information.
    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    /// Mark the system as periodic or non-periodic.
    pub fn set_periodic(&mut self, periodic: bool) {
        self.periodic = periodic;
    }

    /// Get the simulation time of the current frame (in picoseconds).
    pub fn get_simulation_time(&self) -> f32 {
        self.simulation_time
    }

    /// Set the simulation time of the current frame (in picoseconds).
    pub fn set_simulation_time(&mut self, time: f32) {
        self.simulation_time = time;
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;

    fn make_atoms() -> Vec<Atom> {
        vec![
            Atom::new(1, "WAT", 1, "O", [1.0, 2.0, 3.0].into()),
            Atom::new(1, "WAT", 2, "H1", [1.5, 2.0, 3.0].into()),
            Atom::new(1, "WAT", 3, "H2", [1.0, 2.5, 3.0].into()),
        ]
    }

    #[test]
    fn new() {
        let system = System::new("Water", make_atoms(), SimBox::from([20.0, 20.0, 20.0]));

        assert_eq!(system.get_name(), "Water");
        assert_eq!(system.get_n_atoms(), 3);
        assert!(system.has_box());
        assert!(system.is_periodic());
        assert_eq!(system.get_simulation_time(), 0.0);
    }

    #[test]
    fn new_without_box() {
        let system = System::new("Water", make_atoms(), SimBox::default());

        assert!(!system.has_box());
        assert!(!system.is_periodic());
    }

    #[test]
    fn from_file_unknown_extension() {
        match System::from_file("system.xyz") {
            Ok(_) => panic!("Parsing should have failed, but it succeeded."),
            Err(e) => assert!(e.to_string().contains("unknown or unsupported")),
        }
    }

    #[test]
    fn iterate_atoms() {
        let mut system = System::new("Water", make_atoms(), SimBox::from([20.0, 20.0, 20.0]));

        let names: Vec<String> = system
            .atoms_iter()
            .map(|atom| atom.get_atom_name().to_owned())
            .collect();
        assert_eq!(names, ["O", "H1", "H2"]);

        for atom in system.atoms_iter_mut() {
            atom.set_residue_name("SOL");
        }

        assert!(system
            .atoms_iter()
            .all(|atom| atom.get_residue_name() == "SOL"));
    }

    #[test]
    fn get_atom_as_ref() {
        let system = System::new("Water", make_atoms(), SimBox::default());

        assert_eq!(system.get_atom_as_ref(1).unwrap().get_atom_name(), "H1");
        assert!(system.get_atom_as_ref(3).is_none());
    }
}
