mod logging;

use city_temps::{load_readings, parse_date, statistics_for_city_range, DateRange};
use miette::IntoDiagnostic;

fn main() -> miette::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let usage = "usage: stats <file> <city> <from d/m/yyyy> <to d/m/yyyy>";
    let file = args.next().expect(usage);
    let city = args.next().expect(usage);
    let from = parse_date(&args.next().expect(usage)).into_diagnostic()?;
    let to = parse_date(&args.next().expect(usage)).into_diagnostic()?;

    let range = DateRange::new(from, to).into_diagnostic()?;
    let readings = load_readings(file)?;

    println!("{city}, {range}");
    print!("{}", statistics_for_city_range(&readings, &city, range));

    Ok(())
}
