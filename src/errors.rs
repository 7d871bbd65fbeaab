// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Error types that can be returned by the `grist_rs` library.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur when recognizing a file based on its name.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseFileError {
    #[error("File `{0}` has an unknown or unsupported file extension.")]
    UnknownExtension(Box<Path>),
}

/// Errors that can occur when reading and parsing a pdb file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParsePdbError {
    #[error("File `{0}` was not found.")]
    FileNotFound(Box<Path>),
    #[error("File `{0}` ended unexpectedly.")]
    LineNotFound(Box<Path>),
    #[error("Could not parse line `{0}` as atom.")]
    ParseAtomLineErr(String),
    #[error("Could not parse line `{0}` as box dimensions.")]
    ParseBoxLineErr(String),
}

/// Errors that can occur when writing a pdb file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WritePdbError {
    #[error("File `{0}` could not be created.")]
    CouldNotCreate(Box<Path>),
    #[error("Could not write line into the output file.")]
    CouldNotWrite,
}

/// Errors that can occur when reading and parsing an Amber prmtop file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParsePrmtopError {
    #[error("File `{0}` was not found.")]
    FileNotFound(Box<Path>),
    #[error("File `{0}` ended unexpectedly.")]
    LineNotFound(Box<Path>),
    #[error("Section `{0}` is missing from the topology.")]
    MissingSection(String),
    #[error("Could not parse value `{1}` in section `{0}`.")]
    ParseValueErr(String, String),
    #[error("Section `{0}` contains {1} values but at least {2} were expected.")]
    SectionTooShort(String, usize, usize),
    #[error("Section `POINTERS` contains an invalid value: `{0}`.")]
    InvalidPointer(String),
}

/// Errors that can occur when reading a trajectory file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReadTrajError {
    #[error("File `{0}` was not found.")]
    FileNotFound(Box<Path>),
    #[error("File `{0}` ended unexpectedly.")]
    UnexpectedEof(Box<Path>),
    #[error("Trajectory file is not valid: {0}")]
    InvalidFormat(String),
    #[error("Trajectory file does not define the required dimension `{0}`.")]
    MissingDimension(String),
    #[error("Trajectory file does not define the required variable `{0}`.")]
    MissingVariable(String),
    #[error("Variable `{0}` has an unexpected type or shape.")]
    InvalidVariable(String),
    #[error(
        "Number of atoms in the trajectory file `{0}` does not match the number of atoms in the system."
    )]
    AtomsNumberMismatch(Box<Path>),
    #[error("Frame `{0}` is out of range: the trajectory contains {1} frames.")]
    FrameOutOfRange(usize, usize),
    #[error("Could not parse value `{0}` as a coordinate.")]
    ParseValueErr(String),
}

/// Errors that can occur when constructing or validating a regular voxel grid.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid contains no voxels.")]
    Empty,
    #[error("Grid spacing must be positive along the {0} axis.")]
    InvalidDelta(char),
    #[error("Coordinates along the {0} axis are not evenly spaced.")]
    IrregularSpacing(char),
    #[error("The {0} axis contains a single unique coordinate: the grid spacing cannot be determined.")]
    DegenerateAxis(char),
    #[error("Expected {0} grid points but {1} were provided.")]
    IncompleteGrid(usize, usize),
    #[error("Grid point `{0}` does not match the expected regular grid ordering.")]
    NotRegular(usize),
}

/// Errors that can occur when reading and parsing a GIST output table.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseGistError {
    #[error("File `{0}` was not found.")]
    FileNotFound(Box<Path>),
    #[error("File `{0}` ended unexpectedly.")]
    LineNotFound(Box<Path>),
    #[error("Could not parse line `{0}` as a data row.")]
    ParseRowErr(String),
    #[error("Column `{0}` appears multiple times in the table.")]
    DuplicateColumn(String),
    #[error("Required column `{0}` is missing from the table.")]
    MissingColumn(String),
    #[error("Voxel index on row {0} does not match its position in the table.")]
    VoxelIndexMismatch(usize),
    #[error("The table contains no data rows.")]
    EmptyTable,
    #[error("Number of frames is not present in the file header and was not provided.")]
    MissingFrameCount,
    #[error("Reference density is not present in the file header and was not provided.")]
    MissingReferenceDensity,
    #[error("Voxel coordinates do not form a regular grid: {0}")]
    Grid(#[from] GridError),
}

/// Errors that can occur when working with a loaded GIST dataset.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GistError {
    #[error("Column `{0}` does not exist and no recipe is available for it. Available columns: {1}.")]
    ColumnNotFound(String, String),
    #[error("Column `{0}` has {1} values but the grid contains {2} voxels.")]
    ColumnLengthMismatch(String, usize, usize),
    #[error("Column `{0}` is neither a `_dens` nor a `_norm` column and cannot be referenced.")]
    NotReferencable(String),
    #[error("Water-water reference energy has not been set. Referenced energies are not available.")]
    MissingEwwRef,
    #[error("No solute structure is associated with the dataset. Bulk voxels cannot be detected.")]
    MissingSolute,
    #[error("No bulk voxels were found farther than {0} \u{212B} from the solute.")]
    NoBulkVoxels(String),
}

/// Errors that can occur when writing an OpenDX volumetric file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WriteDxError {
    #[error("File `{0}` could not be created.")]
    CouldNotCreate(Box<Path>),
    #[error("Could not write line into the output file.")]
    CouldNotWrite,
    #[error("Data contains {0} values but the grid contains {1} voxels.")]
    LengthMismatch(usize, usize),
    #[error("{0}")]
    Column(#[from] GistError),
}
