// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! # grist_rs: GIST Solvation Analysis Library for Rust
//!
//! Rust library for working with grid inhomogeneous solvation theory (GIST)
//! datasets and the Amber simulation files around them.
//! Currently in an early stage of development:
//! anything can break, change or stop working at any time.
//!
//! ## Usage
//!
//! Run
//!
//! ```bash
//! $ cargo add grist_rs
//! ```
//!
//! Import the crate in your Rust code:
//! ```
//! use grist_rs::prelude::*;
//! ```
//!
//! ## Examples
//!
//! #### Extracting frames from a trajectory
//!
//! Read an Amber topology and a NetCDF trajectory and write the first and
//! the last frame into pdb files.
//!
//! ```no_run
//! use grist_rs::prelude::*;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
//!     // read the topology
//!     let mut system = System::from_file("streptavidin.parm7")?;
//!
//!     // open the trajectory; NetCDF trajectories know their length in advance
//!     let mut reader = system.nc_iter("streptavidin.nc")?;
//!     let last = reader.n_frames() - 1;
//!
//!     // write the first frame
//!     let frame = reader.next().expect("Trajectory is empty.")?;
//!     frame.write_pdb("streptavidin_first.pdb")?;
//!
//!     // jump directly to the last frame; no frame in between is read
//!     let frame = system
//!         .nc_iter("streptavidin.nc")?
//!         .skip_to_frame(last)?
//!         .next()
//!         .expect("Trajectory is empty.")?;
//!     frame.write_pdb("streptavidin_last.pdb")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! #### Analyzing a trajectory
//!
//! Iterate over the frames of a trajectory, updating the `System` in place.
//! _(`grist_rs` supports procedural as well as functional approaches.)_
//!
//! ```no_run
//! use grist_rs::prelude::*;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
//!     let mut system = System::from_file("system.prmtop")?;
//!
//!     // collect the z-coordinate of the first atom in every frame
//!     let mut heights = Vec::new();
//!
//!     for frame in system.mdcrd_iter("trajectory.mdcrd")? {
//!         // check that the frame has been read correctly
//!         let frame = frame?;
//!
//!         let first = frame
//!             .get_atom_as_ref(0)
//!             .expect("System contains no atoms.");
//!         heights.push(first.get_position().z);
//!     }
//!
//!     println!("{:?}", heights);
//!
//!     Ok(())
//! }
//! ```
//!
//! #### Exporting a solvation free-energy density
//!
//! Load a GIST output table, apply the solvent reference energy, correct the
//! entropy for its bulk offset, and export the free-energy density into an
//! OpenDX file.
//!
//! ```no_run
//! use grist_rs::prelude::*;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
//!     let mut gist = Gist::from_file("streptavidin_gist.dat")?;
//!
//!     println!("Number of frames: {}", gist.n_frames());
//!     println!("Reference density: {}", gist.rho0());
//!
//!     // the solute structure is needed for bulk detection
//!     gist.set_solute(System::from_file("streptavidin_first.pdb")?);
//!
//!     // reference energy of the solvent model (TIP3P water here)
//!     gist.set_eww_ref(-9.533)?;
//!
//!     // correct the entropy columns for their bulk offset
//!     let refval = gist.reference_entropy()?;
//!     println!("Detected entropy reference value: {} kcal/mol", refval);
//!
//!     // export the free-energy density
//!     gist.save_dx("A_dens", "deltaG_density.dx")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//! - [x] reading Amber prmtop topologies
//! - [x] reading and writing pdb files
//! - [x] reading Amber NetCDF trajectories (with random frame access)
//! - [x] reading Amber ASCII (mdcrd) trajectories
//! - [x] loading GIST output tables
//! - [x] bulk reference detection and entropy re-referencing
//! - [x] derived free-energy columns
//! - [x] OpenDX volumetric export
//! - [ ] reading Amber restart (rst7) files
//! - [ ] dipole and order-parameter analysis of GIST datasets
//!
//! ## Error handling
//! Proper error handling and propagation is at heart of the `grist_rs` library.
//! The individual error types provided by `grist_rs` are however not exported
//! into the `prelude` module.
//!
//! If you want to use a specific error type from the `grist_rs` library, you
//! will have to include it explicitly from the `errors` module. For instance,
//! if you want to directly work with errors that can occur when loading a
//! GIST table, use:
//! ```
//! use grist_rs::errors::ParseGistError;
//! ```
//!
//! ## License
//! This library is released under the MIT License.

/// Current version of the `grist_rs` library.
pub const GRIST_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod errors;
pub mod files;
pub mod gist {
    pub mod dataset;
    pub mod reference;
}
pub mod io {
    pub mod dx_io;
    pub mod gist_io;
    pub mod mdcrd_io;
    pub mod nc_io;
    pub mod pdb_io;
    pub mod prmtop_io;
    pub mod traj_io;
}
pub mod progress;
pub mod structures {
    pub mod atom;
    pub mod grid;
    pub mod simbox;
    pub mod vector3d;
}
pub mod system {
    pub mod general;
}

/// Reexported basic `grist_rs` structures and traits.
pub mod prelude {
    pub use crate::gist::dataset::Gist;
    pub use crate::gist::reference::BULK_DISTANCE_CUTOFF;
    pub use crate::io::mdcrd_io::MdcrdReader;
    pub use crate::io::nc_io::NcReader;
    pub use crate::io::traj_io::{TrajRead, TrajReader, TrajSeekRead};
    pub use crate::progress::{ProgressPrinter, ProgressStatus};
    pub use crate::structures::atom::Atom;
    pub use crate::structures::grid::GridSpec;
    pub use crate::structures::simbox::SimBox;
    pub use crate::structures::vector3d::Vector3D;
    pub use crate::system::general::System;
}
