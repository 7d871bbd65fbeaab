// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Implementation of functions for reading GIST output tables.
//!
//! A GIST table is a whitespace-separated text file produced by a grid
//! inhomogeneous solvation theory analysis: one banner line and/or
//! `#`-prefixed comment lines, one line with column names, and then one row
//! per voxel. Column names carry optional unit suffixes in parentheses
//! (e.g. `dTStrans-dens(kcal/mol/A^3)`).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use indexmap::IndexMap;
use ndarray::Array1;

use crate::errors::ParseGistError;
use crate::structures::grid::GridSpec;

/// Contents of a parsed GIST table.
#[derive(Debug)]
pub struct GistTable {
    /// Geometry of the voxel grid inferred from the coordinate columns.
    pub grid: GridSpec,
    /// Data columns in file order, keyed by canonical name.
    /// The `voxel` and coordinate columns are not included.
    pub columns: IndexMap<String, Array1<f64>>,
    /// Number of frames analyzed, when present in the file header.
    pub n_frames: Option<u32>,
    /// Reference (bulk) number density in Å⁻³, when present in the file header.
    pub rho0: Option<f64>,
}

/// Read a GIST output table.
///
/// ## Notes
/// - Column names are normalized: unit suffixes are stripped and dashes are
/// replaced by underscores. Raw water-water energy columns are stored under
/// the canonical names `Eww_unref_dens`/`Eww_unref_norm` since the values
/// written by a GIST analysis are always unreferenced.
/// - Header comment lines are scanned for `n_frames` and `rho0` metadata.
/// - The voxel coordinates must form a complete regular grid listed with the
/// z coordinate changing fastest.
pub fn read_gist_table(filename: impl AsRef<Path>) -> Result<GistTable, ParseGistError> {
    let file = match File::open(filename.as_ref()) {
        Ok(x) => x,
        Err(_) => return Err(ParseGistError::FileNotFound(Box::from(filename.as_ref()))),
    };

    let reader = BufReader::new(file);

    let mut names: Option<Vec<String>> = None;
    let mut values: Vec<Vec<f64>> = Vec::new();
    let mut n_frames: Option<u32> = None;
    let mut rho0: Option<f64> = None;

    for raw_line in reader.lines() {
        let line = match raw_line {
            Ok(x) => x,
            Err(_) => return Err(ParseGistError::LineNotFound(Box::from(filename.as_ref()))),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(names) = &names {
            if !trimmed.starts_with('#') {
                parse_row(trimmed, names.len(), &mut values)?;
            }
        } else if trimmed.starts_with('#') || trimmed.starts_with("GIST") {
            // banner and comment lines may carry metadata; the first
            // remaining line is the column header
            scan_metadata(trimmed, &mut n_frames, &mut rho0);
        } else {
            let header = parse_header(trimmed)?;
            values = vec![Vec::new(); header.len()];
            names = Some(header);
        }
    }

    let names = names.ok_or(ParseGistError::EmptyTable)?;
    if values[0].is_empty() {
        return Err(ParseGistError::EmptyTable);
    }

    let mut columns: IndexMap<String, Array1<f64>> = IndexMap::new();
    let mut xs = None;
    let mut ys = None;
    let mut zs = None;

    for (name, column) in names.into_iter().zip(values.into_iter()) {
        match name.as_str() {
            "voxel" => {
                for (index, value) in column.iter().enumerate() {
                    if (value - index as f64).abs() > 0.5 {
                        return Err(ParseGistError::VoxelIndexMismatch(index));
                    }
                }
            }
            "xcoord" => xs = Some(column),
            "ycoord" => ys = Some(column),
            "zcoord" => zs = Some(column),
            _ => {
                columns.insert(name, Array1::from_vec(column));
            }
        }
    }

    let xs = xs.ok_or_else(|| ParseGistError::MissingColumn("xcoord".to_string()))?;
    let ys = ys.ok_or_else(|| ParseGistError::MissingColumn("ycoord".to_string()))?;
    let zs = zs.ok_or_else(|| ParseGistError::MissingColumn("zcoord".to_string()))?;

    let grid = GridSpec::from_coordinates(&xs, &ys, &zs)?;

    Ok(GistTable {
        grid,
        columns,
        n_frames,
        rho0,
    })
}

/// Parse the column header line into canonical column names.
fn parse_header(line: &str) -> Result<Vec<String>, ParseGistError> {
    let mut names = Vec::new();

    for word in line.split_whitespace() {
        let name = canonical_column_name(word);
        if names.contains(&name) {
            return Err(ParseGistError::DuplicateColumn(name));
        }
        names.push(name);
    }

    Ok(names)
}

/// Parse a single data row into the per-column value vectors.
fn parse_row(
    line: &str,
    n_columns: usize,
    values: &mut [Vec<f64>],
) -> Result<(), ParseGistError> {
    let mut count = 0;

    for (index, word) in line.split_whitespace().enumerate() {
        if index >= n_columns {
            return Err(ParseGistError::ParseRowErr(line.to_string()));
        }

        let value = word
            .parse::<f64>()
            .map_err(|_| ParseGistError::ParseRowErr(line.to_string()))?;

        values[index].push(value);
        count += 1;
    }

    if count != n_columns {
        return Err(ParseGistError::ParseRowErr(line.to_string()));
    }

    Ok(())
}

/// Normalize a raw column name to its canonical form.
///
/// Unit suffixes in parentheses are stripped and dashes are replaced by
/// underscores. Raw `Eww` columns map to their `Eww_unref_*` canonical names.
fn canonical_column_name(raw: &str) -> String {
    let base = match raw.find('(') {
        Some(position) => &raw[..position],
        None => raw,
    };

    let name = base.replace('-', "_");

    match name.as_str() {
        "x" => "xcoord".to_string(),
        "y" => "ycoord".to_string(),
        "z" => "zcoord".to_string(),
        "pop" => "population".to_string(),
        "Eww_dens" | "Eww_dens_unref" | "Eww_unref_dens" => "Eww_unref_dens".to_string(),
        "Eww_norm" | "Eww_norm_unref" | "Eww_unref_norm" => "Eww_unref_norm".to_string(),
        _ => name,
    }
}

/// Scan a banner or comment line for `n_frames` and `rho0` metadata.
///
/// Both `key value` and `key = value` forms are recognized.
fn scan_metadata(line: &str, n_frames: &mut Option<u32>, rho0: &mut Option<f64>) {
    let cleaned = line.replace(['#', '=', ':', ','], " ");
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    for (index, token) in tokens.iter().enumerate() {
        match token.to_lowercase().as_str() {
            "n_frames" | "nframes" => {
                if n_frames.is_none() {
                    *n_frames = tokens.get(index + 1).and_then(|t| t.parse().ok());
                }
            }
            "rho0" => {
                if rho0.is_none() {
                    *rho0 = tokens.get(index + 1).and_then(|t| t.parse().ok());
                }
            }
            _ => (),
        }
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
