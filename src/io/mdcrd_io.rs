// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Implementation of functions for reading Amber ASCII (mdcrd) trajectory files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::Path;

use crate::errors::ReadTrajError;
use crate::io::traj_io::{FrameData, TrajFile, TrajRead, TrajReader};
use crate::structures::simbox::SimBox;
use crate::system::general::System;

/// Width of a single coordinate field in an mdcrd file.
const FIELD_WIDTH: usize = 8;

/// Opened mdcrd file for reading.
pub struct MdcrdFile {
    reader: BufReader<File>,
    path: Box<Path>,
    /// Whether each frame is followed by a line with box lengths.
    has_box: bool,
}

impl TrajFile for MdcrdFile {}

impl MdcrdFile {
    /// Open an mdcrd file and skip its title line.
    fn open(filename: impl AsRef<Path>, has_box: bool) -> Result<Self, ReadTrajError> {
        let file = match File::open(filename.as_ref()) {
            Ok(x) => x,
            Err(_) => return Err(ReadTrajError::FileNotFound(Box::from(filename.as_ref()))),
        };

        let mut reader = BufReader::new(file);

        // the first line of an mdcrd file is a title
        let mut title = String::new();
        if reader
            .read_line(&mut title)
            .map_err(|_| ReadTrajError::UnexpectedEof(Box::from(filename.as_ref())))?
            == 0
        {
            return Err(ReadTrajError::UnexpectedEof(Box::from(filename.as_ref())));
        }

        Ok(MdcrdFile {
            reader,
            path: Box::from(filename.as_ref()),
            has_box,
        })
    }

    /// Read `count` fixed-width coordinate values.
    ///
    /// ## Returns
    /// - `None` if the end of file is reached before any value is read.
    /// - `Some(Err)` if the end of file is reached in the middle of the block
    /// or a value can not be parsed.
    fn read_values(&mut self, count: usize) -> Option<Result<Vec<f32>, ReadTrajError>> {
        if count == 0 {
            return None;
        }

        let mut values = Vec::with_capacity(count);
        let mut line = String::new();

        while values.len() < count {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) if values.is_empty() => return None,
                Ok(0) => return Some(Err(ReadTrajError::UnexpectedEof(self.path.clone()))),
                Ok(_) => (),
                Err(_) => return Some(Err(ReadTrajError::UnexpectedEof(self.path.clone()))),
            }

            let trimmed = line.trim_end_matches(['\n', '\r']);
            let mut position = 0;
            while position < trimmed.len() && values.len() < count {
                let end = (position + FIELD_WIDTH).min(trimmed.len());
                let field = trimmed[position..end].trim();

                match field.parse::<f32>() {
                    Ok(value) => values.push(value),
                    Err(_) => {
                        return Some(Err(ReadTrajError::ParseValueErr(field.to_string())))
                    }
                }

                position = end;
            }
        }

        Some(Ok(values))
    }
}

/// Structure containing data read from a single frame of an mdcrd trajectory.
pub struct MdcrdFrameData {
    positions: Vec<f32>,
    box_lengths: Option<[f32; 3]>,
}

impl FrameData for MdcrdFrameData {
    type TrajFile = MdcrdFile;

    /// Read the next frame of the mdcrd file.
    fn from_frame(
        traj_file: &mut MdcrdFile,
        system: &System,
    ) -> Option<Result<MdcrdFrameData, ReadTrajError>> {
        let positions = match traj_file.read_values(system.get_n_atoms() * 3)? {
            Ok(x) => x,
            Err(e) => return Some(Err(e)),
        };

        let box_lengths = match traj_file.has_box {
            true => match traj_file.read_values(3) {
                None => return Some(Err(ReadTrajError::UnexpectedEof(traj_file.path.clone()))),
                Some(Err(e)) => return Some(Err(e)),
                Some(Ok(values)) => Some([values[0], values[1], values[2]]),
            },
            false => None,
        };

        Some(Ok(MdcrdFrameData {
            positions,
            box_lengths,
        }))
    }

    /// Update the `System` structure with data from the frame.
    fn update_system(self, system: &mut System) {
        for (atom, chunk) in system.atoms_iter_mut().zip(self.positions.chunks_exact(3)) {
            atom.set_position(&[chunk[0], chunk[1], chunk[2]].into());
        }

        // an mdcrd box line only carries lengths; the box is treated as orthogonal
        if let Some(lengths) = self.box_lengths {
            system.set_box(SimBox::from(lengths));
        }
    }
}

/// Structure for reading of Amber ASCII (mdcrd) trajectory files.
pub struct MdcrdReader<'a> {
    system: *mut System,
    mdcrd: MdcrdFile,
    phantom: PhantomData<&'a mut System>,
}

impl<'a> TrajRead<'a> for MdcrdReader<'a> {
    type FrameData = MdcrdFrameData;

    /// Create an iterator over an mdcrd file.
    ///
    /// ## Notes
    /// - Whether the frames carry a box line can not be detected from the file
    /// itself: it is taken from the periodicity of the `System`, which in turn
    /// comes from the `IFBOX` pointer of the topology.
    fn new(
        system: &'a mut System,
        filename: impl AsRef<Path>,
    ) -> Result<MdcrdReader<'a>, ReadTrajError> {
        let mdcrd = MdcrdFile::open(filename, system.is_periodic())?;

        Ok(MdcrdReader {
            system: system as *mut System,
            mdcrd,
            phantom: PhantomData,
        })
    }

    fn get_system(&mut self) -> *mut System {
        self.system
    }

    fn get_file_handle(&mut self) -> &mut MdcrdFile {
        &mut self.mdcrd
    }
}

/// ## Methods for reading mdcrd files.
impl System {
    /// Create an iterator over an Amber ASCII (mdcrd) trajectory file.
    /// The iterator updates the `System` structure with the properties of each frame.
    ///
    /// ## Returns
    /// `TrajReader<MdcrdReader>` if the file exists.
    /// `ReadTrajError` in case of an error.
    ///
    /// ## Example
    /// ```no_run
    /// use grist_rs::prelude::*;
    ///
    /// let mut system = System::from_file("system.prmtop").unwrap();
    ///
    /// for raw_frame in system.mdcrd_iter("trajectory.mdcrd").unwrap() {
    ///     let frame = raw_frame.unwrap();
    ///     // perform some analysis
    /// }
    /// ```
    ///
    /// ## Notes
    /// - The number of frames of an mdcrd file is not known in advance:
    /// to reach the final frame the entire file must be read.
    pub fn mdcrd_iter(
        &mut self,
        filename: impl AsRef<Path>,
    ) -> Result<TrajReader<'_, MdcrdReader<'_>>, ReadTrajError> {
        Ok(TrajReader::wrap_traj(MdcrdReader::new(self, filename)?))
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn read_simple() {
        let mut system = System::from_file("test_files/example_nobox.prmtop").unwrap();

        let mut n_frames = 0;

        for (index, raw_frame) in system
            .mdcrd_iter("test_files/example.mdcrd")
            .unwrap()
            .enumerate()
        {
            let frame = raw_frame.unwrap();
            let shift = 10.0 * index as f32;

            let first = frame.get_atom_as_ref(0).unwrap().get_position();
            assert_approx_eq!(f32, first.x, 1.0 + shift);
            assert_approx_eq!(f32, first.y, 1.1 + shift);
            assert_approx_eq!(f32, first.z, 1.2 + shift);

            let last = frame.get_atom_as_ref(4).unwrap().get_position();
            assert_approx_eq!(f32, last.x, 5.0 + shift);
            assert_approx_eq!(f32, last.y, 5.1 + shift);
            assert_approx_eq!(f32, last.z, 5.2 + shift);

            n_frames += 1;
        }

        assert_eq!(n_frames, 3);
    }

    #[test]
    fn read_with_box() {
        let mut system = System::from_file("test_files/example.prmtop").unwrap();

        let mut n_frames = 0;

        for raw_frame in system.mdcrd_iter("test_files/example_box.mdcrd").unwrap() {
            let frame = raw_frame.unwrap();

            let simbox = frame.get_box_as_ref();
            assert_approx_eq!(f32, simbox.x, 30.5 + n_frames as f32);
            assert_approx_eq!(f32, simbox.y, 30.5 + n_frames as f32);
            assert_approx_eq!(f32, simbox.z, 30.5 + n_frames as f32);

            n_frames += 1;
        }

        assert_eq!(n_frames, 2);
    }

    #[test]
    fn read_truncated() {
        let mut system = System::from_file("test_files/example_nobox.prmtop").unwrap();

        let mut failed = false;
        for raw_frame in system
            .mdcrd_iter("test_files/example_truncated.mdcrd")
            .unwrap()
        {
            if let Err(e) = raw_frame {
                assert_eq!(
                    e,
                    ReadTrajError::UnexpectedEof(Box::from(Path::new(
                        "test_files/example_truncated.mdcrd"
                    )))
                );
                failed = true;
                break;
            }
        }

        assert!(failed);
    }

    #[test]
    fn read_nonexistent() {
        let mut system = System::from_file("test_files/example_nobox.prmtop").unwrap();

        match system.mdcrd_iter("test_files/nonexistent.mdcrd") {
            Err(ReadTrajError::FileNotFound(path)) => {
                assert_eq!(path, Box::from(Path::new("test_files/nonexistent.mdcrd")))
            }
            Ok(_) => panic!("Opening should have failed, but it succeeded."),
            Err(e) => panic!("Incorrect error type `{:?}` was returned.", e),
        }
    }
}
