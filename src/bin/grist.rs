// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Command-line interface for the `grist_rs` library.

use std::error::Error;
use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};
use colored::Colorize;

use grist_rs::errors::ParseFileError;
use grist_rs::files::FileType;
use grist_rs::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "grist",
    version,
    about = "GIST solvation analysis toolkit: extract trajectory frames and export solvation free-energy grids.",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract the first and/or last frame of a trajectory into pdb files.
    ExtractFrames(ExtractFramesArgs),
    /// Export a data channel of a GIST dataset into an OpenDX volumetric file.
    ExportDg(ExportDgArgs),
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("output")
        .required(true)
        .multiple(true)
        .args(["first", "last"])
))]
struct ExtractFramesArgs {
    /// Path to the Amber topology (prmtop/parm7) file.
    #[arg(short = 'p', long, value_name = "PATH")]
    topology: PathBuf,

    /// Path to the trajectory file (NetCDF or mdcrd).
    #[arg(short = 'x', long, value_name = "PATH")]
    trajectory: PathBuf,

    /// Path for the pdb file with the first frame.
    #[arg(long, value_name = "PATH")]
    first: Option<PathBuf>,

    /// Path for the pdb file with the last frame.
    #[arg(long, value_name = "PATH")]
    last: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExportDgArgs {
    /// Path to the GIST output table.
    #[arg(value_name = "GIST_TABLE")]
    gist: PathBuf,

    /// Path for the OpenDX output file.
    #[arg(short, long, value_name = "PATH")]
    output: PathBuf,

    /// Data channel to export. Derived channels such as `A_dens` are computed on demand.
    #[arg(short, long, default_value = "A_dens", value_name = "NAME")]
    column: String,

    /// Path to the solute structure; required for entropy referencing.
    #[arg(long, value_name = "PATH")]
    solute: Option<PathBuf>,

    /// Water-water reference energy of the solvent model in kcal/mol
    /// (e.g. -9.533 for TIP3P water).
    #[arg(long, value_name = "ENERGY", allow_negative_numbers = true)]
    eww_ref: Option<f64>,

    /// Re-reference the entropy columns against their detected bulk value.
    /// Requires --solute.
    #[arg(long, requires = "solute")]
    reference_entropy: bool,

    /// Number of frames analyzed by the GIST calculation (overrides the file header).
    #[arg(long, value_name = "N")]
    n_frames: Option<u32>,

    /// Reference (bulk) number density in 1/A^3 (overrides the file header).
    #[arg(long, value_name = "DENSITY", allow_negative_numbers = true)]
    rho0: Option<f64>,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::ExtractFrames(args) => extract_frames(args),
        Commands::ExportDg(args) => export_dg(args),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Extract the first and/or last frame of a trajectory into pdb files.
fn extract_frames(args: ExtractFramesArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut system = System::from_file(&args.topology)?;
    println!(
        "Loaded topology `{}` ({} atoms).",
        args.topology.display(),
        system.get_n_atoms()
    );

    match FileType::from_name(&args.trajectory) {
        FileType::NC => extract_frames_nc(&mut system, &args),
        FileType::MDCRD => extract_frames_mdcrd(&mut system, &args),
        _ => Err(Box::from(ParseFileError::UnknownExtension(Box::from(
            args.trajectory.as_path(),
        )))),
    }
}

/// Extraction from a NetCDF trajectory: the last frame is reached by a direct jump.
fn extract_frames_nc(system: &mut System, args: &ExtractFramesArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let n_frames = system.nc_iter(&args.trajectory)?.n_frames();
    if n_frames == 0 {
        return Err("the trajectory contains no frames".into());
    }

    if let Some(path) = &args.first {
        let mut reader = system.nc_iter(&args.trajectory)?;
        let frame = reader
            .next()
            .expect("FATAL GRIST ERROR | extract_frames_nc | Non-empty trajectory yielded no frame.")?;

        frame.write_pdb(path)?;
        report_frame("first", 1, path);
    }

    if let Some(path) = &args.last {
        let frame = system
            .nc_iter(&args.trajectory)?
            .skip_to_frame(n_frames - 1)?
            .next()
            .expect("FATAL GRIST ERROR | extract_frames_nc | Non-empty trajectory yielded no frame.")?;

        frame.write_pdb(path)?;
        report_frame("last", n_frames, path);
    }

    Ok(())
}

/// Extraction from an mdcrd trajectory: the frame count is unknown in advance,
/// so the entire file is streamed and the final state of the system is written.
fn extract_frames_mdcrd(
    system: &mut System,
    args: &ExtractFramesArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut reader = system.mdcrd_iter(&args.trajectory)?;

    let mut n_frames: usize = match reader.next() {
        None => return Err("the trajectory contains no frames".into()),
        Some(frame) => {
            let frame = frame?;

            if let Some(path) = &args.first {
                frame.write_pdb(path)?;
                report_frame("first", 1, path);
            }

            1
        }
    };

    while let Some(frame) = reader.next() {
        frame?;
        n_frames += 1;
    }

    if let Some(path) = &args.last {
        system.write_pdb(path)?;
        report_frame("last", n_frames, path);
    }

    Ok(())
}

fn report_frame(which: &str, number: usize, path: &std::path::Path) {
    println!(
        "{}",
        format!(
            "The {} frame (frame {}) has been saved as `{}`.",
            which,
            number,
            path.display()
        )
        .green()
    );
}

/// Load a GIST dataset, apply the requested corrections and export one channel.
fn export_dg(args: ExportDgArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut gist = Gist::from_file_with(&args.gist, args.n_frames, args.rho0)?;

    println!(
        "Loaded `{}` ({} voxels).",
        args.gist.display(),
        gist.grid().n_voxels()
    );
    println!("Number of frames: {}", gist.n_frames());
    println!("Reference density: {} A^-3", gist.rho0());

    if let Some(path) = &args.solute {
        let solute = System::from_file(path)?;
        println!(
            "Loaded solute structure `{}` ({} atoms).",
            path.display(),
            solute.get_n_atoms()
        );
        gist.set_solute(solute);
    }

    if let Some(eww_ref) = args.eww_ref {
        gist.set_eww_ref(eww_ref)?;
    }

    if args.reference_entropy {
        let refval = gist.reference_entropy()?;
        println!(
            "Entropy columns referenced against the bulk value {:.4} kcal/mol.",
            refval
        );
    }

    gist.save_dx(&args.column, &args.output)?;
    println!(
        "{}",
        format!(
            "Column `{}` has been exported as `{}`.",
            args.column,
            args.output.display()
        )
        .green()
    );

    Ok(())
}
