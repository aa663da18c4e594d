use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use taxcount_rs::cli::{init_logging, CountArgs};
use taxcount_rs::error::TaxCountError;
use taxcount_rs::count_to_output;

fn spinner(visible: bool, color: &str, message: &'static str) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    let template = format!("{{spinner:.{color}}} {{msg}}");
    if let Ok(style) = ProgressStyle::default_spinner().template(&template) {
        spinner.set_style(style.tick_strings(&[
            "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
        ]));
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn run(args: CountArgs) -> Result<(), TaxCountError> {
    let verbose = args.verbose;
    let options = args.into_options()?;

    // Output is opened first, then the taxonomy and reads are processed
    let spinner_count = spinner(verbose, "green", "Counting reads per taxon...");
    let results = count_to_output(&options)?;
    spinner_count.finish_with_message(format!(
        "Counted {} reads in {} taxa. All done!",
        results.stats.counted,
        results.rows.len()
    ));

    Ok(())
}

fn main() {
    let args = CountArgs::parse();
    init_logging(args.verbose);

    if let Err(error) = run(args) {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}
