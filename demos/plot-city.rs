mod logging;

use city_temps::{
    load_readings, parse_date,
    query::{average, filter, maximum, minimum, temperatures},
    DateRange,
};
use miette::IntoDiagnostic;
use plotters::prelude::*;

fn to_chrono(date: time::Date) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(date.year(), date.month() as u32, date.day() as u32)
        .expect("every time::Date is a valid chrono date")
}

fn main() -> miette::Result<()> {
    logging::init();

    let usage = "usage: plot-city <file> <city> <from d/m/yyyy> <to d/m/yyyy>";
    let input = std::env::args().nth(1).expect(usage);
    let city = std::env::args().nth(2).expect(usage);
    let from = parse_date(&std::env::args().nth(3).expect(usage)).into_diagnostic()?;
    let to = parse_date(&std::env::args().nth(4).expect(usage)).into_diagnostic()?;
    let range = DateRange::new(from, to).into_diagnostic()?;

    let readings = load_readings(&input)?;
    let days = filter(&readings, &city, range.from(), range.to());
    if days.is_empty() {
        println!("No reading for {city} from {range}");
        return Ok(());
    }

    let values = temperatures(&days);
    let mean = average(&values);

    let output = format!("{input}.{city}.png");
    let root = BitMapBackend::new(&output, (1920, 1080)).into_drawing_area();
    root.fill(&WHITE).unwrap();
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Temperature in {city}, {range}"),
            ("sans-serif", 60).into_font(),
        )
        .margin(5)
        .x_label_area_size(80)
        .y_label_area_size(80)
        .build_cartesian_2d(
            to_chrono(range.from())..to_chrono(range.to()),
            (minimum(&values) - 1.0)..(maximum(&values) + 1.0),
        )
        .unwrap();

    chart.configure_mesh().draw().unwrap();

    chart
        .draw_series(LineSeries::new(
            days.iter()
                .map(|reading| (to_chrono(reading.date), reading.temperature)),
            GREEN,
        ))
        .unwrap()
        .label("Temperature")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));
    chart
        .draw_series(LineSeries::new(
            [
                (to_chrono(range.from()), mean),
                (to_chrono(range.to()), mean),
            ],
            RED,
        ))
        .unwrap()
        .label(format!("Average ({mean:.1} °C)"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .unwrap();

    root.present().unwrap();
    println!("wrote {output}");

    Ok(())
}
