mod logging;

use city_temps::{averages_for_range_by_city, load_readings, parse_date, DateRange};
use miette::IntoDiagnostic;
use plotters::prelude::*;

fn main() -> miette::Result<()> {
    logging::init();

    let usage = "usage: plot-averages <file> <from d/m/yyyy> <to d/m/yyyy>";
    let input = std::env::args().nth(1).expect(usage);
    let from = parse_date(&std::env::args().nth(2).expect(usage)).into_diagnostic()?;
    let to = parse_date(&std::env::args().nth(3).expect(usage)).into_diagnostic()?;

    // Refuse an inverted range before touching the data.
    let range = DateRange::new(from, to).into_diagnostic()?;

    let readings = load_readings(&input)?;
    let averages = averages_for_range_by_city(&readings, range);
    if averages.is_empty() {
        println!("No data found in {input}");
        return Ok(());
    }

    let cities: Vec<&String> = averages.keys().collect();
    let low = averages.values().copied().fold(0.0_f64, f64::min);
    let high = averages.values().copied().fold(0.0_f64, f64::max);

    let output = format!("{input}.averages.png");
    let root = BitMapBackend::new(&output, (1280, 720)).into_drawing_area();
    root.fill(&WHITE).unwrap();
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Average temperature per city, {range}"),
            ("sans-serif", 40).into_font(),
        )
        .margin(5)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(
            (0u32..cities.len() as u32).into_segmented(),
            (low - 1.0)..(high + 1.0),
        )
        .unwrap();

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("City")
        .y_desc("Average temperature (°C)")
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(index) => cities
                .get(*index as usize)
                .map(|city| city.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .unwrap();

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.mix(0.6).filled())
                .margin(20)
                .data(
                    averages
                        .values()
                        .enumerate()
                        .map(|(index, average)| (index as u32, *average)),
                ),
        )
        .unwrap();

    root.present().unwrap();
    println!("wrote {output}");

    Ok(())
}
