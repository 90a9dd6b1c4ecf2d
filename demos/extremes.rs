mod logging;

use city_temps::{extremes_for_date, load_readings_with, parse_date, OnMalformed};
use miette::IntoDiagnostic;

fn main() -> miette::Result<()> {
    logging::init();

    let usage = "usage: extremes <file> <date d/m/yyyy> [--skip-malformed]";
    let file = std::env::args().nth(1).expect(usage);
    let date = parse_date(&std::env::args().nth(2).expect(usage)).into_diagnostic()?;
    let policy = match std::env::args().nth(3).as_deref() {
        Some("--skip-malformed") => OnMalformed::Skip,
        Some(other) => return Err(miette::miette!("unknown flag `{other}`. {usage}")),
        None => OnMalformed::Abort,
    };

    let loaded = load_readings_with(file, policy)?;
    if loaded.skipped_count() > 0 {
        eprintln!("{} malformed lines were ignored", loaded.skipped_count());
    }

    match extremes_for_date(&loaded.readings, date) {
        Some(extremes) => println!("{extremes}"),
        None => println!("No reading recorded on {date}"),
    }

    Ok(())
}
