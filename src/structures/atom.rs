// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Implementation of the Atom structure and its methods.

use std::io::Write;

use crate::errors::WritePdbError;
use crate::structures::vector3d::Vector3D;

/// Conversion factor between Amber charge units and elementary charges.
pub const AMBER_CHARGE_FACTOR: f32 = 18.2223;

#[derive(Debug, Clone)]
pub struct Atom {
    residue_number: usize,
    residue_name: String,
    atom_number: usize,
    atom_name: String,
    chain: Option<char>,
    position: Vector3D,
    /// Partial charge in elementary charge units.
    charge: f32,
    /// Atomic mass in atomic mass units.
    mass: f32,
}

impl Atom {
    /// Create new Atom structure with the specified properties.
    ///
    /// ## Notes
    /// - By default, `Atom` structure is constructed with `chain` set to `None`
    /// and with zero charge and mass. Use `Atom::with_chain`, `Atom::with_charge`,
    /// and `Atom::with_mass` to provide these properties.
    pub fn new(
        residue_number: usize,
        residue_name: &str,
        atom_number: usize,
        atom_name: &str,
        position: Vector3D,
    ) -> Self {
        Atom {
            residue_number,
            residue_name: residue_name.to_string(),
            atom_number,
            atom_name: atom_name.to_string(),
            chain: None,
            position,
            charge: 0.0,
            mass: 0.0,
        }
    }

    /// Add chain information to target atom.
    ///
    /// ## Example
    /// ```
    /// use grist_rs::prelude::*;
    /// let atom = Atom::new(1, "LYS", 1, "CA", [14.0, 15.0, 17.0].into()).with_chain('A');
    ///
    /// assert_eq!(atom.get_chain().unwrap(), 'A');
    /// ```
    pub fn with_chain(mut self, chain: char) -> Self {
        self.set_chain(chain);
        self
    }

    /// Add charge information (in elementary charge units) to target atom.
    pub fn with_charge(mut self, charge: f32) -> Self {
        self.set_charge(charge);
        self
    }

    /// Add mass information (in atomic mass units) to target atom.
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.set_mass(mass);
        self
    }

    /// Get the number of the residue to which the atom belongs.
    pub fn get_residue_number(&self) -> usize {
        self.residue_number
    }

    /// Set the number of the residue to which the atom belongs.
    pub fn set_residue_number(&mut self, resnum: usize) {
        self.residue_number = resnum;
    }

    /// Get the name of the residue to which the atom belongs.
    pub fn get_residue_name(&self) -> &str {
        &self.residue_name
    }

    /// Set the name of the residue to which the atom belongs.
    pub fn set_residue_name(&mut self, resname: &str) {
        self.residue_name = resname.to_string();
    }

    /// Get the number of the atom.
    pub fn get_atom_number(&self) -> usize {
        self.atom_number
    }

    /// Set the number of the atom.
    pub fn set_atom_number(&mut self, atomnum: usize) {
        self.atom_number = atomnum;
    }

    /// Get the name of the atom.
    pub fn get_atom_name(&self) -> &str {
        &self.atom_name
    }

    /// Set the name of the atom.
    pub fn set_atom_name(&mut self, atomname: &str) {
        self.atom_name = atomname.to_string();
    }

    /// Get the chain this atom is part of.
    pub fn get_chain(&self) -> Option<char> {
        self.chain
    }

    /// Set the chain of the atom.
    pub fn set_chain(&mut self, chain: char) {
        self.chain = Some(chain);
    }

    /// Get the coordinates of the atom (in ångströms).
    pub fn get_position(&self) -> &Vector3D {
        &self.position
    }

    /// Set the coordinates of the atom (in ångströms).
    pub fn set_position(&mut self, pos: &Vector3D) {
        self.position.x = pos.x;
        self.position.y = pos.y;
        self.position.z = pos.z;
    }

    /// Get the partial charge of the atom (in elementary charge units).
    pub fn get_charge(&self) -> f32 {
        self.charge
    }

    /// Set the partial charge of the atom (in elementary charge units).
    pub fn set_charge(&mut self, charge: f32) {
        self.charge = charge;
    }

    /// Get the mass of the atom (in atomic mass units).
    pub fn get_mass(&self) -> f32 {
        self.mass
    }

    /// Set the mass of the atom (in atomic mass units).
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
    }

    /// Check whether the atom has non-zero position.
    pub fn has_position(&self) -> bool {
        self.position.x != 0.0 || self.position.y != 0.0 || self.position.z != 0.0
    }

    /// Calculate the euclidean distance between two atoms.
    pub fn distance(&self, atom: &Atom) -> f32 {
        self.position.distance(&atom.position)
    }

    /// Calculate the euclidean distance between an atom and a point in space.
    pub fn distance_from_point(&self, point: &Vector3D) -> f32 {
        self.position.distance(point)
    }

    /// Write information about the atom in pdb format.
    ///
    /// ## Notes
    /// - All atoms are treated as 'ATOM'. 'HETATM' is not used at all.
    /// - Allows for 0 to 4-letter atom names, 0 to 4-letter residue names, 1 to 5-digit atom numbers and 1 to 4-digit residue numbers.
    /// - Longer names are shortened, longer numbers are wrapped to 0.
    pub fn write_pdb(&self, stream: &mut impl Write) -> Result<(), WritePdbError> {
        let position = self.get_position();

        let format_resname = match self.get_residue_name().len() {
            0..=3 => format!("{:>3} ", self.get_residue_name()),
            4 => format!("{:>4}", self.get_residue_name()),
            _ => format!(
                "{:>4}",
                self.get_residue_name().chars().take(4).collect::<String>()
            ),
        };

        let format_atomname = match self.get_atom_name().len() {
            0..=3 => format!(" {:<3}", self.get_atom_name()),
            4 => format!("{:<4}", self.get_atom_name()),
            _ => format!(
                "{:<4}",
                self.get_atom_name().chars().take(4).collect::<String>()
            ),
        };

        let format_chain = self.get_chain().unwrap_or(' ');

        writeln!(
            stream,
            "ATOM  {:>5} {} {}{}{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00            ",
            self.get_atom_number() % 100000,
            format_atomname,
            format_resname,
            format_chain,
            self.get_residue_number() % 10000,
            position.x,
            position.y,
            position.z,
        )
        .map_err(|_| WritePdbError::CouldNotWrite)?;

        Ok(())
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn make_default_atom() -> Atom {
        Atom::new(45, "GLY", 123, "CA", [15.123, 14.321, 9.834].into())
            .with_charge(-0.25)
            .with_mass(12.01)
    }

    #[test]
    fn new() {
        let atom = make_default_atom();

        assert_eq!(atom.get_residue_number(), 45);
        assert_eq!(atom.get_residue_name(), "GLY");
        assert_eq!(atom.get_atom_number(), 123);
        assert_eq!(atom.get_atom_name(), "CA");
        assert_eq!(atom.get_chain(), None);

        assert_approx_eq!(f32, atom.get_position().x, 15.123);
        assert_approx_eq!(f32, atom.get_position().y, 14.321);
        assert_approx_eq!(f32, atom.get_position().z, 9.834);

        assert_approx_eq!(f32, atom.get_charge(), -0.25);
        assert_approx_eq!(f32, atom.get_mass(), 12.01);
    }

    #[test]
    fn with_chain() {
        let atom = make_default_atom().with_chain('B');
        assert_eq!(atom.get_chain().unwrap(), 'B');
    }

    #[test]
    fn setters() {
        let mut atom = make_default_atom();

        atom.set_residue_number(187);
        atom.set_residue_name("WAT");
        atom.set_atom_number(1);
        atom.set_atom_name("O");
        atom.set_position(&[1.0, 2.0, 3.0].into());
        atom.set_charge(-0.834);
        atom.set_mass(16.0);

        assert_eq!(atom.get_residue_number(), 187);
        assert_eq!(atom.get_residue_name(), "WAT");
        assert_eq!(atom.get_atom_number(), 1);
        assert_eq!(atom.get_atom_name(), "O");
        assert_approx_eq!(f32, atom.get_position().x, 1.0);
        assert_approx_eq!(f32, atom.get_charge(), -0.834);
        assert_approx_eq!(f32, atom.get_mass(), 16.0);
    }

    #[test]
    fn distance() {
        let atom1 = Atom::new(1, "WAT", 1, "O", [1.0, 2.0, 3.0].into());
        let atom2 = Atom::new(1, "WAT", 2, "H1", [1.0, 5.0, 7.0].into());

        assert_approx_eq!(f32, atom1.distance(&atom2), 5.0);
        assert_approx_eq!(
            f32,
            atom1.distance_from_point(&[1.0, 5.0, 7.0].into()),
            5.0
        );
    }

    #[test]
    fn write_pdb() {
        let atom = make_default_atom().with_chain('A');

        let mut buffer = Vec::new();
        atom.write_pdb(&mut buffer).unwrap();
        let line = String::from_utf8(buffer).unwrap();

        assert_eq!(
            line,
            "ATOM    123  CA  GLY A  45      15.123  14.321   9.834  1.00  0.00            \n"
        );
    }

    #[test]
    fn write_pdb_wrapping() {
        let atom = Atom::new(10003, "ARGGT", 200001, "SC1", [0.0, 0.0, 0.0].into());

        let mut buffer = Vec::new();
        atom.write_pdb(&mut buffer).unwrap();
        let line = String::from_utf8(buffer).unwrap();

        assert!(line.starts_with("ATOM      1  SC1 ARGG    3"));
    }
}
