// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Implementation of functions for reading Amber prmtop (topology) files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use hashbrown::HashMap;

use crate::errors::ParsePrmtopError;
use crate::structures::atom::{Atom, AMBER_CHARGE_FACTOR};
use crate::structures::simbox::SimBox;
use crate::structures::vector3d::Vector3D;
use crate::system::general::System;

/// Indices of the pointers used by `grist_rs` inside the `POINTERS` section.
const POINTER_NATOM: usize = 0;
const POINTER_NRES: usize = 11;
const POINTER_IFBOX: usize = 27;

/// Read an Amber7-format prmtop file and construct a System structure.
///
/// ## Notes
/// - Only the sections describing atoms and residues are interpreted:
/// `POINTERS`, `ATOM_NAME`, `CHARGE`, `MASS`, `RESIDUE_LABEL`, `RESIDUE_POINTER`,
/// and the optional `TITLE` and `BOX_DIMENSIONS`. Force-field sections are ignored.
/// - Charges are converted from Amber units to elementary charges.
/// - A topology carries no coordinates: all atoms are placed at the origin.
/// - The system is marked periodic when the `IFBOX` pointer is non-zero;
/// trajectory readers use this to decide whether frames carry box information.
pub fn read_prmtop(filename: impl AsRef<Path>) -> Result<System, ParsePrmtopError> {
    let sections = read_sections(filename)?;

    let pointers = parse_integers(&sections, "POINTERS")?;
    if pointers.len() <= POINTER_IFBOX {
        return Err(ParsePrmtopError::SectionTooShort(
            "POINTERS".to_string(),
            pointers.len(),
            POINTER_IFBOX + 1,
        ));
    }

    for index in [POINTER_NATOM, POINTER_NRES, POINTER_IFBOX] {
        if pointers[index] < 0 {
            return Err(ParsePrmtopError::InvalidPointer(
                pointers[index].to_string(),
            ));
        }
    }

    let n_atoms = pointers[POINTER_NATOM] as usize;
    let n_residues = pointers[POINTER_NRES] as usize;
    let periodic = pointers[POINTER_IFBOX] > 0;

    let atom_names = parse_strings(&sections, "ATOM_NAME")?;
    check_length(&atom_names, n_atoms, "ATOM_NAME")?;

    let charges = parse_floats(&sections, "CHARGE")?;
    check_length(&charges, n_atoms, "CHARGE")?;

    let masses = parse_floats(&sections, "MASS")?;
    check_length(&masses, n_atoms, "MASS")?;

    let residue_labels = parse_strings(&sections, "RESIDUE_LABEL")?;
    check_length(&residue_labels, n_residues, "RESIDUE_LABEL")?;

    let residue_pointers = parse_integers(&sections, "RESIDUE_POINTER")?;
    check_length(&residue_pointers, n_residues, "RESIDUE_POINTER")?;

    // assign a residue number and name to every atom
    let mut atoms = Vec::with_capacity(n_atoms);
    for res_index in 0..n_residues {
        let start = residue_pointer(&residue_pointers, res_index, n_atoms)?;
        let end = match res_index + 1 < n_residues {
            true => residue_pointer(&residue_pointers, res_index + 1, n_atoms)?,
            false => n_atoms,
        };

        for atom_index in start..end {
            let atom = Atom::new(
                res_index + 1,
                &residue_labels[res_index],
                atom_index + 1,
                &atom_names[atom_index],
                Vector3D::default(),
            )
            .with_charge((charges[atom_index] / AMBER_CHARGE_FACTOR as f64) as f32)
            .with_mass(masses[atom_index] as f32);

            atoms.push(atom);
        }
    }

    if atoms.len() != n_atoms {
        return Err(ParsePrmtopError::SectionTooShort(
            "RESIDUE_POINTER".to_string(),
            atoms.len(),
            n_atoms,
        ));
    }

    let title = match sections.get("TITLE") {
        Some(section) => section
            .lines
            .iter()
            .map(|line| line.trim())
            .find(|line| !line.is_empty())
            .unwrap_or("Unknown")
            .to_string(),
        None => "Unknown".to_string(),
    };

    // BOX_DIMENSIONS holds the unique box angle followed by the three box lengths
    let simbox = match sections.contains_key("BOX_DIMENSIONS") {
        true => {
            let values = parse_floats(&sections, "BOX_DIMENSIONS")?;
            check_length(&values, 4, "BOX_DIMENSIONS")?;

            let beta = values[0] as f32;
            SimBox::from_lengths_angles(
                [values[1] as f32, values[2] as f32, values[3] as f32].into(),
                [beta, beta, beta].into(),
            )
        }
        false => SimBox::default(),
    };

    let mut system = System::new(&title, atoms, simbox);
    system.set_periodic(periodic || system.has_box());

    Ok(system)
}

/// One `%FLAG` section of a prmtop file.
struct Section {
    format: Option<String>,
    lines: Vec<String>,
}

/// Split a prmtop file into its `%FLAG` sections.
fn read_sections(
    filename: impl AsRef<Path>,
) -> Result<HashMap<String, Section>, ParsePrmtopError> {
    let file = match File::open(filename.as_ref()) {
        Ok(x) => x,
        Err(_) => {
            return Err(ParsePrmtopError::FileNotFound(Box::from(
                filename.as_ref(),
            )))
        }
    };

    let reader = BufReader::new(file);

    let mut sections: HashMap<String, Section> = HashMap::new();
    let mut current: Option<String> = None;

    for raw_line in reader.lines() {
        let line = match raw_line {
            Ok(x) => x,
            Err(_) => {
                return Err(ParsePrmtopError::LineNotFound(Box::from(
                    filename.as_ref(),
                )))
            }
        };

        if let Some(flag) = line.strip_prefix("%FLAG") {
            let flag = flag.trim().to_string();
            sections.insert(
                flag.clone(),
                Section {
                    format: None,
                    lines: Vec::new(),
                },
            );
            current = Some(flag);
        } else if let Some(format) = line.strip_prefix("%FORMAT") {
            if let Some(flag) = &current {
                let format = format.trim().trim_start_matches('(').trim_end_matches(')');
                sections
                    .get_mut(flag)
                    .expect("FATAL GRIST ERROR | prmtop_io::read_sections | Current section must exist.")
                    .format = Some(format.to_string());
            }
        } else if line.starts_with("%VERSION") || line.starts_with("%COMMENT") {
            continue;
        } else if let Some(flag) = &current {
            sections
                .get_mut(flag)
                .expect("FATAL GRIST ERROR | prmtop_io::read_sections | Current section must exist.")
                .lines
                .push(line);
        }
    }

    Ok(sections)
}

fn get_section<'a>(
    sections: &'a HashMap<String, Section>,
    flag: &str,
) -> Result<&'a Section, ParsePrmtopError> {
    sections
        .get(flag)
        .ok_or_else(|| ParsePrmtopError::MissingSection(flag.to_string()))
}

/// Parse integer values from a section.
fn parse_integers(
    sections: &HashMap<String, Section>,
    flag: &str,
) -> Result<Vec<i64>, ParsePrmtopError> {
    let section = get_section(sections, flag)?;

    let mut values = Vec::new();
    for line in &section.lines {
        for word in line.split_whitespace() {
            let value = word.parse::<i64>().map_err(|_| {
                ParsePrmtopError::ParseValueErr(flag.to_string(), word.to_string())
            })?;
            values.push(value);
        }
    }

    Ok(values)
}

/// Parse floating point values from a section.
fn parse_floats(
    sections: &HashMap<String, Section>,
    flag: &str,
) -> Result<Vec<f64>, ParsePrmtopError> {
    let section = get_section(sections, flag)?;

    let mut values = Vec::new();
    for line in &section.lines {
        for word in line.split_whitespace() {
            let value = word.parse::<f64>().map_err(|_| {
                ParsePrmtopError::ParseValueErr(flag.to_string(), word.to_string())
            })?;
            values.push(value);
        }
    }

    Ok(values)
}

/// Parse fixed-width string values (like atom names) from a section.
/// The field width is taken from the section's `%FORMAT` line (e.g. `20a4`).
fn parse_strings(
    sections: &HashMap<String, Section>,
    flag: &str,
) -> Result<Vec<String>, ParsePrmtopError> {
    let section = get_section(sections, flag)?;
    let width = string_width(section).unwrap_or(4);

    let mut values = Vec::new();
    for line in &section.lines {
        let mut position = 0;
        while position < line.len() {
            let end = (position + width).min(line.len());
            let value = line[position..end].trim();
            if !value.is_empty() {
                values.push(value.to_string());
            }
            position = end;
        }
    }

    Ok(values)
}

/// Extract the field width from a format such as `20a4`.
fn string_width(section: &Section) -> Option<usize> {
    let format = section.format.as_ref()?;
    let position = format.find(['a', 'A'])?;
    format[position + 1..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .ok()
}

/// Convert a 1-based residue pointer into a 0-based atom index.
fn residue_pointer(
    pointers: &[i64],
    index: usize,
    n_atoms: usize,
) -> Result<usize, ParsePrmtopError> {
    let value = pointers[index];
    if value < 1 || value as usize > n_atoms {
        return Err(ParsePrmtopError::ParseValueErr(
            "RESIDUE_POINTER".to_string(),
            value.to_string(),
        ));
    }

    Ok((value - 1) as usize)
}

fn check_length<T>(values: &[T], expected: usize, flag: &str) -> Result<(), ParsePrmtopError> {
    if values.len() < expected {
        return Err(ParsePrmtopError::SectionTooShort(
            flag.to_string(),
            values.len(),
            expected,
        ));
    }

    Ok(())
}

/******************************/
/*         UNIT TESTS         */
/******************************/
