// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Traits for reading generic trajectory files.

use std::marker::PhantomData;
use std::path::Path;

use crate::errors::ReadTrajError;
use crate::progress::{ProgressPrinter, ProgressStatus};
use crate::system::general::System;

/*********************************************/
/*  TrajFile and supported trajectory files  */
/*********************************************/

/// Any trajectory file must implement this trait.
/// Note that the exact nature of the trajectory file is not relevant,
/// but the `FrameData::from_frame` function must be able to read it.
pub trait TrajFile {}

/*****************************/
/*  TrajRead and TrajReader  */
/*****************************/

/// Trait that must be implemented by structure storing data from a single trajectory frame.
pub trait FrameData {
    type TrajFile: TrajFile;

    /// Method specifying how a frame of the trajectory should be read and stored in the `FrameData` structure.
    fn from_frame(
        traj_file: &mut Self::TrajFile,
        system: &System,
    ) -> Option<Result<Self, ReadTrajError>>
    where
        Self: Sized;

    /// Method specifying how the `System` structure should be updated based on the data in the `FrameData` structure.
    fn update_system(self, system: &mut System);
}

/// Any structure implementing `TrajRead` can be used to read a trajectory file.
pub trait TrajRead<'a> {
    type FrameData: FrameData;

    /// Method specifying how to open the trajectory file.
    fn new(system: &'a mut System, filename: impl AsRef<Path>) -> Result<Self, ReadTrajError>
    where
        Self: Sized;

    /// Method specifying how to get a mutable pointer to the `System` structure.
    /// Mutable pointer to the `System` structure must be part of the trajectory reader.
    fn get_system(&mut self) -> *mut System;

    /// Method specifying how to get a mutable handle to the file containing the trajectory.
    fn get_file_handle(
        &mut self,
    ) -> &mut <<Self as TrajRead<'a>>::FrameData as FrameData>::TrajFile;
}

/// Any structure implementing this trait supports random access to trajectory frames,
/// i.e. it knows the total number of frames and can jump directly to any of them.
pub trait TrajSeekRead<'a>: TrajRead<'a> {
    /// Get the total number of frames in the trajectory file.
    fn n_frames(&self) -> usize;

    /// Position the reader so that the next frame read is the frame with the provided index.
    /// Frames are indexed starting from 0.
    fn jump_to_frame(&mut self, frame: usize) -> Result<(), ReadTrajError>;
}

/// Wrapper for any structure implementing `TrajRead` so the `Iterator` trait can be implemented for it.
pub struct TrajReader<'a, R: TrajRead<'a>> {
    traj_reader: R,
    progress_printer: Option<ProgressPrinter>,
    frame_number: usize,
    _phantom: &'a PhantomData<R>,
}

impl<'a, R> TrajReader<'a, R>
where
    R: TrajRead<'a>,
{
    /// Wrap trajectory reader implementing `TrajRead` into `TrajReader` structure.
    pub fn wrap_traj(traj_reader: R) -> TrajReader<'a, R> {
        TrajReader {
            traj_reader,
            progress_printer: None,
            frame_number: 0,
            _phantom: &PhantomData,
        }
    }

    /// Print progress of the trajectory reading.
    ///
    /// ## Example
    /// ```no_run
    /// use grist_rs::prelude::*;
    ///
    /// let mut system = System::from_file("system.prmtop").unwrap();
    ///
    /// // information will be printed every 100 trajectory frames
    /// let printer = ProgressPrinter::new().with_print_freq(100);
    ///
    /// for raw_frame in system.nc_iter("trajectory.nc").unwrap().print_progress(printer) {
    ///     let frame = raw_frame.unwrap();
    ///
    ///     // perform some analysis
    /// }
    /// ```
    pub fn print_progress(mut self, printer: ProgressPrinter) -> Self {
        self.progress_printer = Some(printer);
        self
    }
}

/// Iterate the `TrajReader`.
impl<'a, R: TrajRead<'a>> Iterator for TrajReader<'a, R> {
    type Item = Result<&'a mut System, ReadTrajError>;

    /// Read the next frame in the trajectory file and update the `System` structure.
    ///
    /// ## Returns
    /// - `Some(Ok(&mut System))` if the frame has been successfully read.
    /// - `Some(Err(ReadTrajError))` if the frame could not be read.
    /// - `None` if the end of the trajectory file has been reached.
    fn next(&mut self) -> Option<Self::Item> {
        unsafe {
            let system = self.traj_reader.get_system();

            let result =
                match R::FrameData::from_frame(self.traj_reader.get_file_handle(), &*system) {
                    None => None,
                    Some(Err(e)) => Some(Err(e)),
                    Some(Ok(data)) => {
                        data.update_system(&mut *system);
                        Some(Ok(&mut *system))
                    }
                };

            if let Some(printer) = &mut self.progress_printer {
                match &result {
                    None => printer.set_status(ProgressStatus::Completed),
                    Some(Err(_)) => printer.set_status(ProgressStatus::Failed),
                    Some(Ok(_)) => (),
                }

                printer.print(self.frame_number, (*system).get_simulation_time());
            }

            self.frame_number += 1;

            result
        }
    }
}

impl<'a, R> TrajReader<'a, R>
where
    R: TrajSeekRead<'a>,
{
    /// Get the total number of frames in the trajectory file.
    pub fn n_frames(&self) -> usize {
        self.traj_reader.n_frames()
    }

    /// Skip forward so that the next yielded frame is the frame with the provided index.
    /// Frames are indexed starting from 0. Frames before the target frame are not read at all.
    ///
    /// ## Example
    /// Reading the last frame of an Amber NetCDF trajectory.
    /// ```no_run
    /// use grist_rs::prelude::*;
    ///
    /// let mut system = System::from_file("system.prmtop").unwrap();
    ///
    /// let reader = system.nc_iter("trajectory.nc").unwrap();
    /// let last = reader.n_frames() - 1;
    ///
    /// let frame = reader
    ///     .skip_to_frame(last)
    ///     .unwrap()
    ///     .next()
    ///     .expect("Trajectory is empty.")
    ///     .unwrap();
    ///
    /// frame.write_pdb("last_frame.pdb").unwrap();
    /// ```
    pub fn skip_to_frame(mut self, frame: usize) -> Result<Self, ReadTrajError> {
        self.traj_reader.jump_to_frame(frame)?;
        self.frame_number = frame;
        Ok(self)
    }
}

/***************************************/
/*        Generic System methods       */
/***************************************/

/// ## Generic methods for iterating over trajectory files.
impl System {
    /// Iterate over any trajectory file implementing a trajectory reader.
    /// A 'trajectory reader' is any structure implementing the `TrajRead` trait.
    ///
    /// ## Returns
    /// `TrajReader<TrajRead>` if the trajectory file has been successfully opened.
    /// `ReadTrajError` in case of an error.
    ///
    /// ## Example
    /// ```no_run
    /// use grist_rs::prelude::*;
    /// use grist_rs::errors::ReadTrajError;
    ///
    /// fn example_fn() -> Result<(), ReadTrajError> {
    ///     // load system from file
    ///     let mut system = System::from_file("system.prmtop").unwrap();
    ///
    ///     // loop through an Amber NetCDF trajectory
    ///     for raw_frame in system.traj_iter::<NcReader>("trajectory.nc")? {
    ///         let frame = raw_frame?;
    ///         println!("{}", frame.get_simulation_time());
    ///     }
    ///
    ///     // loop through an Amber ASCII trajectory
    ///     for raw_frame in system.traj_iter::<MdcrdReader>("trajectory.mdcrd")? {
    ///         let frame = raw_frame?;
    ///         println!("{}", frame.get_n_atoms());
    ///     }
    ///
    ///     Ok(())
    /// }
    /// ```
    ///
    /// ## Notes
    /// - The `System` structure is modified while iterating through the trajectory.
    /// - `nc` and `mdcrd` files also have their own specific functions implementing iteration.
    /// See `System::nc_iter()` and `System::mdcrd_iter()`.
    pub fn traj_iter<'a, Read>(
        &'a mut self,
        filename: impl AsRef<Path>,
    ) -> Result<TrajReader<'a, Read>, ReadTrajError>
    where
        Read: TrajRead<'a>,
    {
        Ok(TrajReader::wrap_traj(Read::new(self, filename)?))
    }
}

/**************************/
/*       UNIT TESTS       */
/**************************/
