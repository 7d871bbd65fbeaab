// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Enum capturing file types supported by `grist_rs`.

use std::path::Path;

/// Types of files supported by `grist_rs`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum FileType {
    Unknown,
    PRMTOP,
    PDB,
    NC,
    MDCRD,
    DAT,
    DX,
}

impl FileType {
    /// Identify file type from the name of the file (based on file extension).
    pub fn from_name(filename: impl AsRef<Path>) -> FileType {
        let extension = match filename.as_ref().extension() {
            Some(x) => x,
            None => return FileType::Unknown,
        };

        match extension.to_str() {
            Some("prmtop") | Some("parm7") | Some("top") => FileType::PRMTOP,
            Some("pdb") => FileType::PDB,
            Some("nc") | Some("ncdf") => FileType::NC,
            Some("mdcrd") | Some("crd") | Some("trj") => FileType::MDCRD,
            Some("dat") => FileType::DAT,
            Some("dx") => FileType::DX,
            Some(_) | None => FileType::Unknown,
        }
    }
}
