use clap::Parser;

use taxcount_rs::cli::{init_logging, RecentrifugeArgs};
use taxcount_rs::error::TaxCountError;
use taxcount_rs::reader::{open_lines, open_output};
use taxcount_rs::recentrifuge::convert_stream;

fn run(args: RecentrifugeArgs) -> Result<(), TaxCountError> {
    let input = open_lines(&args.input)?;
    if let Some(path) = &args.output {
        log::info!("Output file: {}", path.display());
    }
    let output = open_output(args.output.as_ref())?;

    log::info!("Processing {}...", args.input.display());
    convert_stream(input, output)?;
    Ok(())
}

fn main() {
    let args = RecentrifugeArgs::parse();
    init_logging(args.verbose);

    if let Err(error) = run(args) {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}
