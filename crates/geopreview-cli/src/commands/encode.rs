//! Encode command implementation

use crate::cli::EncodeArgs;
use crate::output::OutputWriter;
use crate::output_types::EncodeOutput;
use anyhow::Result;
use geopreview_core::encoding::file_to_data_uri;

pub fn execute(args: EncodeArgs, output: &OutputWriter) -> Result<()> {
    let data_uri = file_to_data_uri(&args.file)?;

    if output.is_json() {
        output.result(EncodeOutput { path: args.file.display().to_string(), data_uri })?;
    } else {
        println!("{}", data_uri);
    }

    Ok(())
}
