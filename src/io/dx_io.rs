// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Implementation of functions for writing OpenDX volumetric files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::Array1;

use crate::errors::WriteDxError;
use crate::structures::grid::GridSpec;

/// Write scalar values defined on a regular grid into an OpenDX file.
///
/// The produced file follows the "regular positions, regular connections"
/// scalar field layout understood by the common molecular viewers. Values are
/// written three per line in the grid's linear order (z fastest), which is
/// exactly the order mandated by the format.
pub fn write_dx(
    grid: &GridSpec,
    values: &Array1<f64>,
    name: &str,
    filename: impl AsRef<Path>,
) -> Result<(), WriteDxError> {
    if values.len() != grid.n_voxels() {
        return Err(WriteDxError::LengthMismatch(values.len(), grid.n_voxels()));
    }

    let output = File::create(&filename)
        .map_err(|_| WriteDxError::CouldNotCreate(Box::from(filename.as_ref())))?;

    let mut writer = BufWriter::new(output);
    write_dx_to(&mut writer, grid, values, name)?;
    writer.flush().map_err(|_| WriteDxError::CouldNotWrite)?;

    Ok(())
}

/// Write an OpenDX scalar field into the provided stream.
fn write_dx_to(
    writer: &mut impl Write,
    grid: &GridSpec,
    values: &Array1<f64>,
    name: &str,
) -> Result<(), WriteDxError> {
    let [nx, ny, nz] = grid.shape();
    let origin = grid.origin();
    let delta = grid.delta();

    write_line(
        writer,
        &format!("object 1 class gridpositions counts {} {} {}", nx, ny, nz),
    )?;
    write_line(
        writer,
        &format!("origin {:.6} {:.6} {:.6}", origin[0], origin[1], origin[2]),
    )?;
    write_line(writer, &format!("delta {:.6} 0.000000 0.000000", delta[0]))?;
    write_line(writer, &format!("delta 0.000000 {:.6} 0.000000", delta[1]))?;
    write_line(writer, &format!("delta 0.000000 0.000000 {:.6}", delta[2]))?;
    write_line(
        writer,
        &format!("object 2 class gridconnections counts {} {} {}", nx, ny, nz),
    )?;
    write_line(
        writer,
        &format!(
            "object 3 class array type double rank 0 items {} data follows",
            values.len()
        ),
    )?;

    for chunk in values.as_slice().expect(
        "FATAL GRIST ERROR | dx_io::write_dx_to | Column array must be contiguous.",
    ).chunks(3) {
        let formatted: Vec<String> = chunk.iter().map(|value| format!("{:.6e}", value)).collect();
        write_line(writer, &formatted.join(" "))?;
    }

    write_line(writer, "attribute \"dep\" string \"positions\"")?;
    write_line(
        writer,
        &format!("object \"{}\" class field", name),
    )?;
    write_line(writer, "component \"positions\" value 1")?;
    write_line(writer, "component \"connections\" value 2")?;
    write_line(writer, "component \"data\" value 3")?;

    Ok(())
}

fn write_line(writer: &mut impl Write, line: &str) -> Result<(), WriteDxError> {
    writeln!(writer, "{}", line).map_err(|_| WriteDxError::CouldNotWrite)
}

/******************************/
/*         UNIT TESTS         */
/******************************/
