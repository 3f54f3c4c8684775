//! Command line error reporting

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;
use vehmocap_core::MocapError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error("Cannot access {}", path.display())]
    #[diagnostic(code(vehmocap::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a capture file", path.display())]
    #[diagnostic(
        code(vehmocap::file_type),
        help("capture files end in .json or .vmc")
    )]
    UnsupportedFileType { path: PathBuf },

    #[error("Invalid scene description {}: {reason}", path.display())]
    #[diagnostic(
        code(vehmocap::scene),
        help("a scene file holds an `objects` list with name, parent and dimensions")
    )]
    Scene { path: PathBuf, reason: String },

    #[error("Vehicle object {0} is not in the scene")]
    #[diagnostic(code(vehmocap::scene::vehicle), help("set --vehicle-object"))]
    MissingVehicleObject(String),

    #[error(transparent)]
    #[diagnostic(code(vehmocap::convert))]
    Mocap(#[from] MocapError),

    #[error(transparent)]
    #[diagnostic(code(vehmocap::export))]
    Export(#[from] anyhow::Error),
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }
}
