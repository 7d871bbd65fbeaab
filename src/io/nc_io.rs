// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Implementation of functions for reading Amber NetCDF trajectory files.
//!
//! Amber NetCDF trajectories are NetCDF-3 container files (classic or
//! 64-bit-offset variant) following the AMBER trajectory convention:
//! a record dimension `frame`, fixed dimensions `atom` and `spatial` (= 3),
//! a float record variable `coordinates` in ångströms and optional record
//! variables `time` (ps), `cell_lengths` (ångströms) and `cell_angles`
//! (degrees). All values are stored big-endian.
//!
//! The container is parsed directly; no external NetCDF library is used.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::marker::PhantomData;
use std::path::Path;

use crate::errors::ReadTrajError;
use crate::io::traj_io::{FrameData, TrajFile, TrajRead, TrajReader, TrajSeekRead};
use crate::structures::simbox::SimBox;
use crate::system::general::System;

/// NetCDF external data types used by Amber trajectories.
const NC_CHAR: u32 = 2;
const NC_SHORT: u32 = 3;
const NC_INT: u32 = 4;
const NC_FLOAT: u32 = 5;
const NC_DOUBLE: u32 = 6;

/// Tags introducing the header lists of a NetCDF-3 file.
const TAG_DIMENSION: u32 = 0x0A;
const TAG_VARIABLE: u32 = 0x0B;
const TAG_ATTRIBUTE: u32 = 0x0C;

/// Value of `numrecs` marking a file that is still being written.
const STREAMING: u32 = 0xFFFF_FFFF;

/// One dimension defined in the file header.
#[derive(Debug)]
struct NcDim {
    name: String,
    /// Stored size of the dimension; the record dimension is stored with size 0.
    size: usize,
}

/// One variable defined in the file header.
#[derive(Debug)]
struct NcVar {
    name: String,
    dimids: Vec<usize>,
    nc_type: u32,
    vsize: u64,
    begin: u64,
}

/// Layout of a record variable needed to read its values.
#[derive(Debug, Clone, Copy)]
struct RecordVar {
    begin: u64,
    nc_type: u32,
}

/// Opened Amber NetCDF trajectory file.
///
/// The structure is generic over the underlying reader so that the container
/// parser can also be driven from in-memory buffers.
#[derive(Debug)]
pub struct NcFile<R: Read + Seek> {
    reader: R,
    path: Box<Path>,
    n_frames: usize,
    n_atoms: usize,
    current_frame: usize,
    record_size: u64,
    coordinates: RecordVar,
    time: Option<RecordVar>,
    cell_lengths: Option<RecordVar>,
    cell_angles: Option<RecordVar>,
}

/// Amber NetCDF trajectory file opened from disk.
pub type NcTrajFile = NcFile<BufReader<File>>;

impl TrajFile for NcTrajFile {}

impl<R: Read + Seek> NcFile<R> {
    /// Parse the header of a NetCDF-3 container and locate the variables
    /// required by the AMBER trajectory convention.
    pub fn open(mut reader: R, path: impl AsRef<Path>) -> Result<Self, ReadTrajError> {
        let path: Box<Path> = Box::from(path.as_ref());

        // magic number: 'C' 'D' 'F' followed by the version byte
        let mut magic = [0u8; 4];
        read_exact(&mut reader, &mut magic, &path)?;
        if &magic[0..3] != b"CDF" {
            return Err(ReadTrajError::InvalidFormat(
                "the file is not a NetCDF container".to_string(),
            ));
        }

        // version 1 = classic (32-bit offsets), version 2 = 64-bit offsets
        let wide_offsets = match magic[3] {
            1 => false,
            2 => true,
            v => {
                return Err(ReadTrajError::InvalidFormat(format!(
                    "unsupported NetCDF version byte `{}`",
                    v
                )))
            }
        };

        let numrecs = read_u32(&mut reader, &path)?;
        if numrecs == STREAMING {
            return Err(ReadTrajError::InvalidFormat(
                "the number of records is indeterminate (file still being written?)".to_string(),
            ));
        }

        let dims = read_dim_list(&mut reader, &path)?;
        let conventions = read_att_list(&mut reader, &path)?;
        let vars = read_var_list(&mut reader, &path, wide_offsets)?;

        match &conventions {
            Some(value) if value.contains("AMBER") => (),
            Some(_) | None => {
                return Err(ReadTrajError::InvalidFormat(
                    "the file does not follow the AMBER trajectory convention".to_string(),
                ))
            }
        }

        // the record dimension is stored with size 0
        let record_dim = dims
            .iter()
            .position(|dim| dim.size == 0)
            .ok_or_else(|| ReadTrajError::MissingDimension("frame".to_string()))?;

        let atom_dim = find_dim(&dims, "atom")?;
        let spatial_dim = find_dim(&dims, "spatial")?;
        if dims[spatial_dim].size != 3 {
            return Err(ReadTrajError::MissingDimension("spatial".to_string()));
        }

        let n_atoms = dims[atom_dim].size;

        let coordinates = vars
            .iter()
            .find(|var| var.name == "coordinates")
            .ok_or_else(|| ReadTrajError::MissingVariable("coordinates".to_string()))?;

        if coordinates.dimids != [record_dim, atom_dim, spatial_dim]
            || coordinates.nc_type != NC_FLOAT
        {
            return Err(ReadTrajError::InvalidVariable("coordinates".to_string()));
        }

        let time = match vars.iter().find(|var| var.name == "time") {
            Some(var) if var.dimids == [record_dim] && var.nc_type == NC_FLOAT => {
                Some(record_var(var))
            }
            Some(_) => return Err(ReadTrajError::InvalidVariable("time".to_string())),
            None => None,
        };

        let cell_lengths = find_cell_var(&vars, "cell_lengths", record_dim)?;
        let cell_angles = find_cell_var(&vars, "cell_angles", record_dim)?;

        // each record consists of one slab of every record variable
        let record_size: u64 = vars
            .iter()
            .filter(|var| var.dimids.first() == Some(&record_dim))
            .map(|var| var.vsize)
            .sum();

        Ok(NcFile {
            reader,
            path,
            n_frames: numrecs as usize,
            n_atoms,
            current_frame: 0,
            record_size,
            coordinates: record_var(coordinates),
            time,
            cell_lengths,
            cell_angles,
        })
    }

    /// Get the number of frames stored in the file.
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// Get the number of atoms stored in the file.
    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    /// Position the reader so that the next frame read is the frame with the provided index.
    pub fn jump_to_frame(&mut self, frame: usize) -> Result<(), ReadTrajError> {
        if frame >= self.n_frames {
            return Err(ReadTrajError::FrameOutOfRange(frame, self.n_frames));
        }

        self.current_frame = frame;
        Ok(())
    }

    /// Read the next frame of the trajectory. Returns `None` once all frames have been read.
    fn read_frame(&mut self) -> Option<Result<NcFrameData, ReadTrajError>> {
        if self.current_frame >= self.n_frames {
            return None;
        }

        let frame = self.current_frame;
        self.current_frame += 1;

        Some(self.read_frame_data(frame))
    }

    fn read_frame_data(&mut self, frame: usize) -> Result<NcFrameData, ReadTrajError> {
        let offset = self.coordinates.begin + frame as u64 * self.record_size;
        self.seek(offset)?;

        let mut positions = vec![0.0f32; self.n_atoms * 3];
        let mut buffer = [0u8; 4];
        for value in positions.iter_mut() {
            read_exact(&mut self.reader, &mut buffer, &self.path)?;
            *value = f32::from_be_bytes(buffer);
        }

        let time = match self.time {
            Some(var) => {
                self.seek(var.begin + frame as u64 * self.record_size)?;
                read_exact(&mut self.reader, &mut buffer, &self.path)?;
                Some(f32::from_be_bytes(buffer))
            }
            None => None,
        };

        let cell = match (self.cell_lengths, self.cell_angles) {
            (Some(lengths_var), Some(angles_var)) => {
                let lengths = self.read_cell_values(lengths_var, frame)?;
                let angles = self.read_cell_values(angles_var, frame)?;
                Some((lengths, angles))
            }
            _ => None,
        };

        Ok(NcFrameData {
            positions,
            time,
            cell,
        })
    }

    /// Read the three values of a `cell_lengths`/`cell_angles` slab.
    fn read_cell_values(
        &mut self,
        var: RecordVar,
        frame: usize,
    ) -> Result<[f64; 3], ReadTrajError> {
        self.seek(var.begin + frame as u64 * self.record_size)?;

        let mut values = [0.0f64; 3];
        for value in values.iter_mut() {
            *value = match var.nc_type {
                NC_DOUBLE => {
                    let mut buffer = [0u8; 8];
                    read_exact(&mut self.reader, &mut buffer, &self.path)?;
                    f64::from_be_bytes(buffer)
                }
                _ => {
                    let mut buffer = [0u8; 4];
                    read_exact(&mut self.reader, &mut buffer, &self.path)?;
                    f32::from_be_bytes(buffer) as f64
                }
            };
        }

        Ok(values)
    }

    fn seek(&mut self, offset: u64) -> Result<(), ReadTrajError> {
        self.reader
            .seek(SeekFrom::Start(offset))
            .map(|_| ())
            .map_err(|_| ReadTrajError::UnexpectedEof(self.path.clone()))
    }
}

fn record_var(var: &NcVar) -> RecordVar {
    RecordVar {
        begin: var.begin,
        nc_type: var.nc_type,
    }
}

fn find_dim(dims: &[NcDim], name: &str) -> Result<usize, ReadTrajError> {
    dims.iter()
        .position(|dim| dim.name == name)
        .ok_or_else(|| ReadTrajError::MissingDimension(name.to_string()))
}

/// Locate an optional per-frame cell variable (`cell_lengths` or `cell_angles`).
fn find_cell_var(
    vars: &[NcVar],
    name: &str,
    record_dim: usize,
) -> Result<Option<RecordVar>, ReadTrajError> {
    match vars.iter().find(|var| var.name == name) {
        Some(var)
            if var.dimids.len() == 2
                && var.dimids[0] == record_dim
                && (var.nc_type == NC_DOUBLE || var.nc_type == NC_FLOAT) =>
        {
            Ok(Some(record_var(var)))
        }
        Some(_) => Err(ReadTrajError::InvalidVariable(name.to_string())),
        None => Ok(None),
    }
}

/*********************************/
/*  Low-level container parsing  */
/*********************************/

fn read_exact<R: Read>(
    reader: &mut R,
    buffer: &mut [u8],
    path: &Path,
) -> Result<(), ReadTrajError> {
    reader
        .read_exact(buffer)
        .map_err(|_| ReadTrajError::UnexpectedEof(Box::from(path)))
}

fn read_u32<R: Read>(reader: &mut R, path: &Path) -> Result<u32, ReadTrajError> {
    let mut buffer = [0u8; 4];
    read_exact(reader, &mut buffer, path)?;
    Ok(u32::from_be_bytes(buffer))
}

fn read_u64<R: Read>(reader: &mut R, path: &Path) -> Result<u64, ReadTrajError> {
    let mut buffer = [0u8; 8];
    read_exact(reader, &mut buffer, path)?;
    Ok(u64::from_be_bytes(buffer))
}

/// Read a name: length, bytes, and padding to the next 4-byte boundary.
fn read_name<R: Read>(reader: &mut R, path: &Path) -> Result<String, ReadTrajError> {
    let length = read_u32(reader, path)? as usize;

    let mut bytes = vec![0u8; length + padding(length)];
    read_exact(reader, &mut bytes, path)?;
    bytes.truncate(length);

    String::from_utf8(bytes)
        .map_err(|_| ReadTrajError::InvalidFormat("header contains an invalid name".to_string()))
}

/// Number of padding bytes needed to reach the next 4-byte boundary.
fn padding(length: usize) -> usize {
    (4 - length % 4) % 4
}

/// Read the header tag and count of a dimension/attribute/variable list.
fn read_list_header<R: Read>(
    reader: &mut R,
    path: &Path,
    expected_tag: u32,
) -> Result<usize, ReadTrajError> {
    let tag = read_u32(reader, path)?;
    let count = read_u32(reader, path)? as usize;

    if tag == expected_tag {
        Ok(count)
    } else if tag == 0 && count == 0 {
        // the list is absent
        Ok(0)
    } else {
        Err(ReadTrajError::InvalidFormat(format!(
            "unexpected header tag `{}`",
            tag
        )))
    }
}

fn read_dim_list<R: Read>(reader: &mut R, path: &Path) -> Result<Vec<NcDim>, ReadTrajError> {
    let count = read_list_header(reader, path, TAG_DIMENSION)?;

    let mut dims = Vec::with_capacity(count);
    for _ in 0..count {
        let name = read_name(reader, path)?;
        let size = read_u32(reader, path)? as usize;
        dims.push(NcDim { name, size });
    }

    Ok(dims)
}

/// Read an attribute list, returning the value of the `Conventions` attribute if present.
fn read_att_list<R: Read>(reader: &mut R, path: &Path) -> Result<Option<String>, ReadTrajError> {
    let count = read_list_header(reader, path, TAG_ATTRIBUTE)?;

    let mut conventions = None;
    for _ in 0..count {
        let name = read_name(reader, path)?;
        let nc_type = read_u32(reader, path)?;
        let n_values = read_u32(reader, path)? as usize;

        let value_size = n_values * type_size(nc_type)?;
        let mut bytes = vec![0u8; value_size + padding(value_size)];
        read_exact(reader, &mut bytes, path)?;

        if name == "Conventions" && nc_type == NC_CHAR {
            bytes.truncate(n_values);
            conventions = Some(String::from_utf8_lossy(&bytes).to_string());
        }
    }

    Ok(conventions)
}

fn read_var_list<R: Read>(
    reader: &mut R,
    path: &Path,
    wide_offsets: bool,
) -> Result<Vec<NcVar>, ReadTrajError> {
    let count = read_list_header(reader, path, TAG_VARIABLE)?;

    let mut vars = Vec::with_capacity(count);
    for _ in 0..count {
        let name = read_name(reader, path)?;

        let ndims = read_u32(reader, path)? as usize;
        let mut dimids = Vec::with_capacity(ndims);
        for _ in 0..ndims {
            dimids.push(read_u32(reader, path)? as usize);
        }

        // per-variable attributes are not interpreted
        read_att_list(reader, path)?;

        let nc_type = read_u32(reader, path)?;
        let vsize = read_u32(reader, path)? as u64;
        let begin = match wide_offsets {
            true => read_u64(reader, path)?,
            false => read_u32(reader, path)? as u64,
        };

        vars.push(NcVar {
            name,
            dimids,
            nc_type,
            vsize,
            begin,
        });
    }

    Ok(vars)
}

/// Size in bytes of a single value of the provided external type.
fn type_size(nc_type: u32) -> Result<usize, ReadTrajError> {
    match nc_type {
        1 | NC_CHAR => Ok(1),
        NC_SHORT => Ok(2),
        NC_INT | NC_FLOAT => Ok(4),
        NC_DOUBLE => Ok(8),
        other => Err(ReadTrajError::InvalidFormat(format!(
            "unknown external data type `{}`",
            other
        ))),
    }
}

/**********************************/
/*  Frame data and reader traits  */
/**********************************/

/// Structure containing data read from a single frame of an Amber NetCDF trajectory.
pub struct NcFrameData {
    positions: Vec<f32>,
    time: Option<f32>,
    cell: Option<([f64; 3], [f64; 3])>,
}

impl FrameData for NcFrameData {
    type TrajFile = NcTrajFile;

    /// Read the next frame of the NetCDF file.
    fn from_frame(
        traj_file: &mut NcTrajFile,
        _system: &System,
    ) -> Option<Result<NcFrameData, ReadTrajError>> {
        traj_file.read_frame()
    }

    /// Update the `System` structure with data from the frame.
    fn update_system(self, system: &mut System) {
        for (atom, chunk) in system.atoms_iter_mut().zip(self.positions.chunks_exact(3)) {
            atom.set_position(&[chunk[0], chunk[1], chunk[2]].into());
        }

        if let Some(time) = self.time {
            system.set_simulation_time(time);
        }

        if let Some((lengths, angles)) = self.cell {
            system.set_box(SimBox::from_lengths_angles(
                [lengths[0] as f32, lengths[1] as f32, lengths[2] as f32].into(),
                [angles[0] as f32, angles[1] as f32, angles[2] as f32].into(),
            ));
        }
    }
}

/// Structure for reading of Amber NetCDF trajectory files.
pub struct NcReader<'a> {
    system: *mut System,
    nc: NcTrajFile,
    phantom: PhantomData<&'a mut System>,
}

impl<'a> TrajRead<'a> for NcReader<'a> {
    type FrameData = NcFrameData;

    fn new(
        system: &'a mut System,
        filename: impl AsRef<Path>,
    ) -> Result<NcReader<'a>, ReadTrajError> {
        let file = match File::open(filename.as_ref()) {
            Ok(x) => x,
            Err(_) => return Err(ReadTrajError::FileNotFound(Box::from(filename.as_ref()))),
        };

        let nc = NcFile::open(BufReader::new(file), filename.as_ref())?;

        if nc.n_atoms() != system.get_n_atoms() {
            return Err(ReadTrajError::AtomsNumberMismatch(Box::from(
                filename.as_ref(),
            )));
        }

        Ok(NcReader {
            system: system as *mut System,
            nc,
            phantom: PhantomData,
        })
    }

    fn get_system(&mut self) -> *mut System {
        self.system
    }

    fn get_file_handle(&mut self) -> &mut NcTrajFile {
        &mut self.nc
    }
}

impl<'a> TrajSeekRead<'a> for NcReader<'a> {
    fn n_frames(&self) -> usize {
        self.nc.n_frames()
    }

    fn jump_to_frame(&mut self, frame: usize) -> Result<(), ReadTrajError> {
        self.nc.jump_to_frame(frame)
    }
}

/// ## Methods for reading Amber NetCDF files.
impl System {
    /// Create an iterator over an Amber NetCDF trajectory file.
    /// The iterator updates the `System` structure with the properties of each frame.
    ///
    /// ## Returns
    /// `TrajReader<NcReader>` if the file exists and is a valid Amber NetCDF trajectory.
    /// `ReadTrajError` in case of an error.
    ///
    /// ## Example
    /// ```no_run
    /// use grist_rs::prelude::*;
    ///
    /// let mut system = System::from_file("system.prmtop").unwrap();
    ///
    /// for raw_frame in system.nc_iter("trajectory.nc").unwrap() {
    ///     let frame = raw_frame.unwrap();
    ///     // perform some analysis
    /// }
    /// ```
    ///
    /// ## Notes
    /// - NetCDF trajectories know their frame count in advance: use
    /// `TrajReader::n_frames` and `TrajReader::skip_to_frame` for random access.
    pub fn nc_iter(
        &mut self,
        filename: impl AsRef<Path>,
    ) -> Result<TrajReader<'_, NcReader<'_>>, ReadTrajError> {
        Ok(TrajReader::wrap_traj(NcReader::new(self, filename)?))
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use std::io::{Cursor, Write};

    fn push_u32(buffer: &mut Vec<u8>, value: u32) {
        buffer.extend_from_slice(&value.to_be_bytes());
    }

    fn push_name(buffer: &mut Vec<u8>, name: &str) {
        push_u32(buffer, name.len() as u32);
        buffer.extend_from_slice(name.as_bytes());
        buffer.extend(std::iter::repeat(0u8).take(padding(name.len())));
    }

    /// Construct a minimal Amber NetCDF trajectory in memory.
    ///
    /// Coordinates follow the same pattern as the mdcrd test fixture:
    /// `atom + axis * 0.1 + frame * 10`, with atoms numbered from 1.
    fn build_nc(n_frames: u32, n_atoms: u32, with_cell: bool, wide_offsets: bool) -> Vec<u8> {
        let mut buffer = Vec::new();

        buffer.extend_from_slice(b"CDF");
        buffer.push(if wide_offsets { 2 } else { 1 });
        push_u32(&mut buffer, n_frames);

        // dimension list: frame (record), spatial, atom [+ cell dims]
        push_u32(&mut buffer, TAG_DIMENSION);
        push_u32(&mut buffer, if with_cell { 5 } else { 3 });
        push_name(&mut buffer, "frame");
        push_u32(&mut buffer, 0);
        push_name(&mut buffer, "spatial");
        push_u32(&mut buffer, 3);
        push_name(&mut buffer, "atom");
        push_u32(&mut buffer, n_atoms);
        if with_cell {
            push_name(&mut buffer, "cell_spatial");
            push_u32(&mut buffer, 3);
            push_name(&mut buffer, "cell_angular");
            push_u32(&mut buffer, 3);
        }

        // global attributes: Conventions = "AMBER"
        push_u32(&mut buffer, TAG_ATTRIBUTE);
        push_u32(&mut buffer, 1);
        push_name(&mut buffer, "Conventions");
        push_u32(&mut buffer, NC_CHAR);
        push_u32(&mut buffer, 5);
        buffer.extend_from_slice(b"AMBER");
        buffer.extend(std::iter::repeat(0u8).take(padding(5)));

        // variable list: time, coordinates [+ cell_lengths, cell_angles]
        struct TestVar {
            name: &'static str,
            dimids: Vec<u32>,
            nc_type: u32,
            vsize: u32,
        }

        let mut vars = vec![
            TestVar {
                name: "time",
                dimids: vec![0],
                nc_type: NC_FLOAT,
                vsize: 4,
            },
            TestVar {
                name: "coordinates",
                dimids: vec![0, 2, 1],
                nc_type: NC_FLOAT,
                vsize: n_atoms * 3 * 4,
            },
        ];

        if with_cell {
            vars.push(TestVar {
                name: "cell_lengths",
                dimids: vec![0, 3],
                nc_type: NC_DOUBLE,
                vsize: 24,
            });
            vars.push(TestVar {
                name: "cell_angles",
                dimids: vec![0, 4],
                nc_type: NC_DOUBLE,
                vsize: 24,
            });
        }

        push_u32(&mut buffer, TAG_VARIABLE);
        push_u32(&mut buffer, vars.len() as u32);

        let mut begin_patches = Vec::new();
        for var in &vars {
            push_name(&mut buffer, var.name);
            push_u32(&mut buffer, var.dimids.len() as u32);
            for &dimid in &var.dimids {
                push_u32(&mut buffer, dimid);
            }
            // empty per-variable attribute list
            push_u32(&mut buffer, 0);
            push_u32(&mut buffer, 0);
            push_u32(&mut buffer, var.nc_type);
            push_u32(&mut buffer, var.vsize);
            begin_patches.push(buffer.len());
            if wide_offsets {
                buffer.extend_from_slice(&0u64.to_be_bytes());
            } else {
                push_u32(&mut buffer, 0);
            }
        }

        // patch the begin offsets now that the header size is known
        let data_start = buffer.len() as u64;
        let mut offset = data_start;
        for (var, patch) in vars.iter().zip(&begin_patches) {
            if wide_offsets {
                buffer[*patch..*patch + 8].copy_from_slice(&offset.to_be_bytes());
            } else {
                buffer[*patch..*patch + 4].copy_from_slice(&(offset as u32).to_be_bytes());
            }
            offset += var.vsize as u64;
        }

        // append the records
        for frame in 0..n_frames {
            buffer.extend_from_slice(&(frame as f32 * 0.5).to_be_bytes());

            for atom in 0..n_atoms {
                for axis in 0..3u32 {
                    let value = (atom + 1) as f32 + axis as f32 * 0.1 + frame as f32 * 10.0;
                    buffer.extend_from_slice(&value.to_be_bytes());
                }
            }

            if with_cell {
                for _ in 0..3 {
                    buffer.extend_from_slice(&(30.0f64 + frame as f64).to_be_bytes());
                }
                for _ in 0..3 {
                    buffer.extend_from_slice(&90.0f64.to_be_bytes());
                }
            }
        }

        buffer
    }

    #[test]
    fn parse_classic() {
        let bytes = build_nc(3, 5, true, false);
        let mut nc = NcFile::open(Cursor::new(bytes), "memory.nc").unwrap();

        assert_eq!(nc.n_frames(), 3);
        assert_eq!(nc.n_atoms(), 5);

        let frame = nc.read_frame().unwrap().unwrap();
        assert_approx_eq!(f32, frame.positions[0], 1.0);
        assert_approx_eq!(f32, frame.positions[1], 1.1);
        assert_approx_eq!(f32, frame.positions[14], 5.2);
        assert_approx_eq!(f32, frame.time.unwrap(), 0.0);

        let (lengths, angles) = frame.cell.unwrap();
        assert_approx_eq!(f64, lengths[0], 30.0);
        assert_approx_eq!(f64, angles[0], 90.0);
    }

    #[test]
    fn parse_wide_offsets() {
        let bytes = build_nc(2, 4, false, true);
        let mut nc = NcFile::open(Cursor::new(bytes), "memory.nc").unwrap();

        assert_eq!(nc.n_frames(), 2);
        assert_eq!(nc.n_atoms(), 4);

        // skip to the second frame
        nc.jump_to_frame(1).unwrap();
        let frame = nc.read_frame().unwrap().unwrap();
        assert_approx_eq!(f32, frame.positions[0], 11.0);
        assert_approx_eq!(f32, frame.time.unwrap(), 0.5);
        assert!(frame.cell.is_none());

        // all frames have been consumed
        assert!(nc.read_frame().is_none());
    }

    #[test]
    fn jump_out_of_range() {
        let bytes = build_nc(2, 4, false, false);
        let mut nc = NcFile::open(Cursor::new(bytes), "memory.nc").unwrap();

        assert_eq!(
            nc.jump_to_frame(2),
            Err(ReadTrajError::FrameOutOfRange(2, 2))
        );
    }

    #[test]
    fn invalid_magic() {
        let bytes = b"NOTCDF".to_vec();

        match NcFile::open(Cursor::new(bytes), "memory.nc") {
            Err(ReadTrajError::InvalidFormat(_)) => (),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_conventions() {
        let mut bytes = build_nc(1, 2, false, false);
        // corrupt the attribute name so the Conventions attribute is not recognized
        let position = bytes
            .windows(11)
            .position(|window| window == b"Conventions")
            .unwrap();
        bytes[position] = b'X';

        match NcFile::open(Cursor::new(bytes), "memory.nc") {
            Err(ReadTrajError::InvalidFormat(e)) => {
                assert!(e.contains("AMBER"));
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn nc_iter_and_seek() {
        let bytes = build_nc(4, 5, true, false);
        let mut traj = tempfile::NamedTempFile::new().unwrap();
        traj.write_all(&bytes).unwrap();
        traj.flush().unwrap();

        let mut system = System::from_file("test_files/example.prmtop").unwrap();

        // sequential iteration
        let mut n_frames = 0;
        for raw_frame in system.nc_iter(traj.path()).unwrap() {
            let frame = raw_frame.unwrap();

            let first = frame.get_atom_as_ref(0).unwrap().get_position();
            assert_approx_eq!(f32, first.x, 1.0 + 10.0 * n_frames as f32);
            assert_approx_eq!(f32, frame.get_simulation_time(), 0.5 * n_frames as f32);
            assert_approx_eq!(f32, frame.get_box_as_ref().x, 30.0 + n_frames as f32);

            n_frames += 1;
        }
        assert_eq!(n_frames, 4);

        // random access to the last frame
        let reader = system.nc_iter(traj.path()).unwrap();
        assert_eq!(reader.n_frames(), 4);

        let frame = reader
            .skip_to_frame(3)
            .unwrap()
            .next()
            .expect("Trajectory should not be empty.")
            .unwrap();

        let last = frame.get_atom_as_ref(4).unwrap().get_position();
        assert_approx_eq!(f32, last.x, 35.0);
        assert_approx_eq!(f32, last.z, 35.2);
    }

    #[test]
    fn nc_iter_atom_mismatch() {
        let bytes = build_nc(1, 3, false, false);
        let mut traj = tempfile::NamedTempFile::new().unwrap();
        traj.write_all(&bytes).unwrap();
        traj.flush().unwrap();

        let mut system = System::from_file("test_files/example.prmtop").unwrap();

        match system.nc_iter(traj.path()) {
            Err(ReadTrajError::AtomsNumberMismatch(_)) => (),
            Ok(_) => panic!("Opening should have failed, but it succeeded."),
            Err(e) => panic!("Incorrect error type `{:?}` was returned.", e),
        }
    }
}
