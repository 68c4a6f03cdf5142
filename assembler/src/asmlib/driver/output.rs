use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{event, span, Level};

use base::prelude::{write_program, MemoryCell, ProgramFormatError};

use super::super::listing::Listing;
use super::super::types::AssemblerFailure;

/// Write the assembled program to `output_file_name`, replacing any
/// existing file.
pub(super) fn write_program_file(
    output_file_name: &Path,
    memory: &[MemoryCell],
) -> Result<(), AssemblerFailure> {
    let span = span!(Level::ERROR, "write program file", output=?output_file_name);
    let _enter = span.enter();

    let failed = |error| AssemblerFailure::IoErrorOnOutput {
        filename: output_file_name.to_path_buf(),
        error,
    };
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(output_file_name)
        .map_err(failed)?;
    match write_program(BufWriter::new(file), memory) {
        Ok(()) => {
            event!(Level::INFO, "wrote {} memory cells", memory.len());
            Ok(())
        }
        Err(ProgramFormatError::Io(e)) => Err(failed(e)),
        Err(e) => Err(AssemblerFailure::BadProgramFormat(e)),
    }
}

pub(super) fn write_listing_to_stdout(listing: &Listing<'_>) -> Result<(), AssemblerFailure> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write!(handle, "{listing}")
        .and_then(|()| handle.flush())
        .map_err(|error| AssemblerFailure::IoErrorOnStdout { error })
}
