use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{Level, event};

use super::super::listing::{LiteralListing, SymbolListing};
use super::super::types::{AssemblerFailure, IoAction, IoFailed, IoTarget};
use super::{Assembly, OutputOptions};

fn write_file<T: Display>(path: &Path, contents: &T) -> Result<(), AssemblerFailure> {
    let io_failed = |error| {
        AssemblerFailure::Io(IoFailed {
            action: IoAction::Write,
            target: IoTarget::File(path.to_path_buf()),
            error,
        })
    };
    let file = File::create(path).map_err(io_failed)?;
    let mut writer = BufWriter::new(file);
    write!(writer, "{contents}").map_err(io_failed)?;
    writer.flush().map_err(io_failed)
}

/// Write the object program, and the symbol and literal tables if
/// they were asked for.
pub(super) fn write_outputs(
    assembly: &Assembly,
    object_file: &Path,
    options: &OutputOptions,
) -> Result<(), AssemblerFailure> {
    write_file(object_file, &assembly.object)?;
    event!(
        Level::INFO,
        "wrote {} section(s) of object code to {}",
        assembly.object.sections.len(),
        object_file.display()
    );
    if let Some(path) = &options.symtab {
        write_file(path, &SymbolListing(&assembly.sections))?;
        event!(Level::DEBUG, "wrote symbol table to {}", path.display());
    }
    if let Some(path) = &options.littab {
        write_file(path, &LiteralListing(&assembly.sections))?;
        event!(Level::DEBUG, "wrote literal table to {}", path.display());
    }
    Ok(())
}
