//! Aggregations over a slice of readings. Nothing here mutates its input or
//! touches the file system.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use time::Date;

use crate::TemperatureReading;

/// Every city name of `readings`, once, in ascending order.
pub fn distinct_cities(readings: &[TemperatureReading]) -> Vec<&str> {
    readings
        .iter()
        .map(|reading| reading.city.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn matching<'a>(
    readings: &'a [TemperatureReading],
    city: &'a str,
    from: Date,
    to: Date,
) -> impl Iterator<Item = &'a TemperatureReading> + 'a {
    debug_assert!(from <= to, "inverted range {from} > {to}");
    readings
        .iter()
        .filter(move |reading| reading.city == city && from <= reading.date && reading.date <= to)
}

/// Readings of `city` (exact, case sensitive match) dated within `from..=to`.
pub fn filter(
    readings: &[TemperatureReading],
    city: &str,
    from: Date,
    to: Date,
) -> Vec<TemperatureReading> {
    matching(readings, city, from, to).cloned().collect()
}

pub fn temperatures(readings: &[TemperatureReading]) -> Vec<f64> {
    readings.iter().map(|reading| reading.temperature).collect()
}

/// Arithmetic mean, `0.0` when `values` is empty.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// `0.0` when `values` is empty.
pub fn maximum(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// `0.0` when `values` is empty.
pub fn minimum(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub average: f64,
    pub maximum: f64,
    pub minimum: f64,
}

impl Statistics {
    pub fn of(values: &[f64]) -> Self {
        Self {
            average: average(values),
            maximum: maximum(values),
            minimum: minimum(values),
        }
    }

    pub fn entries(&self) -> [(&'static str, f64); 3] {
        [
            ("average", self.average),
            ("maximum", self.maximum),
            ("minimum", self.minimum),
        ]
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.entries() {
            writeln!(f, "{name}: {value:.1} °C")?;
        }
        Ok(())
    }
}

pub fn statistics(
    readings: &[TemperatureReading],
    city: &str,
    from: Date,
    to: Date,
) -> Statistics {
    let values: Vec<f64> = matching(readings, city, from, to)
        .map(|reading| reading.temperature)
        .collect();
    Statistics::of(&values)
}

/// Average over `from..=to` for every city present anywhere in `readings`,
/// including cities that have no reading in the range (they get `0.0`).
pub fn average_per_city(
    readings: &[TemperatureReading],
    from: Date,
    to: Date,
) -> BTreeMap<String, f64> {
    distinct_cities(readings)
        .into_iter()
        .map(|city| {
            let values: Vec<f64> = matching(readings, city, from, to)
                .map(|reading| reading.temperature)
                .collect();
            (city.to_string(), average(&values))
        })
        .collect()
}

/// Hottest and coldest readings recorded on a single day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremes<'a> {
    pub date: Date,
    pub hottest: &'a TemperatureReading,
    pub coldest: &'a TemperatureReading,
}

impl fmt::Display for Extremes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Date: {}", self.date)?;
        writeln!(f)?;
        writeln!(
            f,
            "Hottest city: {} ({:.1} °C)",
            self.hottest.city, self.hottest.temperature
        )?;
        write!(
            f,
            "Coldest city: {} ({:.1} °C)",
            self.coldest.city, self.coldest.temperature
        )
    }
}

/// `None` when nothing was recorded on `date`. On ties the reading coming
/// first in `readings` wins.
pub fn extremes_on_date(readings: &[TemperatureReading], date: Date) -> Option<Extremes<'_>> {
    let mut on_date = readings.iter().filter(|reading| reading.date == date);
    let first = on_date.next()?;

    let (hottest, coldest) = on_date.fold((first, first), |(hottest, coldest), reading| {
        (
            if reading.temperature > hottest.temperature { reading } else { hottest },
            if reading.temperature < coldest.temperature { reading } else { coldest },
        )
    });

    Some(Extremes {
        date,
        hottest,
        coldest,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn reading(city: &str, date: Date, temperature: f64) -> TemperatureReading {
        TemperatureReading::new(city, date, temperature)
    }

    fn dataset() -> Vec<TemperatureReading> {
        vec![
            reading("Cali", date!(2024 - 03 - 14), 27.0),
            reading("Bogota", date!(2024 - 03 - 15), 21.0),
            reading("Cali", date!(2024 - 03 - 15), 28.0),
            reading("Medellin", date!(2024 - 03 - 15), 15.0),
            reading("Bogota", date!(2024 - 03 - 16), 19.0),
            reading("Cali", date!(2024 - 03 - 17), 30.0),
            reading("Pasto", date!(2024 - 01 - 01), 9.5),
        ]
    }

    #[test]
    fn empty_aggregates_are_zero() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(maximum(&[]), 0.0);
        assert_eq!(minimum(&[]), 0.0);
        assert_eq!(
            Statistics::of(&[]),
            Statistics {
                average: 0.0,
                maximum: 0.0,
                minimum: 0.0
            }
        );
    }

    #[test]
    fn average_lies_between_extremes() {
        let samples: [&[f64]; 5] = [
            &[1.0],
            &[-3.5, 4.0],
            &[10.0, 20.0, 30.0, 40.0],
            &[-12.0, -8.25, -30.5],
            &[0.1, 0.2, 0.3, 0.1, 0.2, 0.3, 0.4],
        ];
        for values in samples {
            let (min, avg, max) = (minimum(values), average(values), maximum(values));
            assert!(min <= avg && avg <= max, "{min} <= {avg} <= {max} for {values:?}");
        }
        assert_eq!(maximum(&[-3.5, 4.0]), 4.0);
        assert_eq!(minimum(&[-3.5, 4.0]), -3.5);
        assert_eq!(average(&[10.0, 20.0, 30.0, 40.0]), 25.0);
    }

    #[test]
    fn cities_are_sorted_and_unique() {
        let readings = dataset();
        assert_eq!(distinct_cities(&readings), ["Bogota", "Cali", "Medellin", "Pasto"]);
        assert!(distinct_cities(&[]).is_empty());
    }

    #[test]
    fn filter_is_inclusive_and_exact() {
        let readings = dataset();
        let cali = filter(&readings, "Cali", date!(2024 - 03 - 14), date!(2024 - 03 - 15));
        assert_eq!(temperatures(&cali), [27.0, 28.0]);

        assert!(filter(&readings, "cali", date!(2024 - 03 - 14), date!(2024 - 03 - 17)).is_empty());
        assert!(filter(&readings, "Cali", date!(2025 - 01 - 01), date!(2025 - 12 - 31)).is_empty());

        let single = filter(&readings, "Cali", date!(2024 - 03 - 17), date!(2024 - 03 - 17));
        assert_eq!(single, [reading("Cali", date!(2024 - 03 - 17), 30.0)]);
    }

    #[test]
    fn filter_is_idempotent() {
        let readings = dataset();
        let (from, to) = (date!(2024 - 03 - 15), date!(2024 - 03 - 17));
        let once = filter(&readings, "Cali", from, to);
        let twice = filter(&once, "Cali", from, to);
        assert_eq!(once, twice);
    }

    #[test]
    fn statistics_for_a_city() {
        let readings = dataset();
        let stats = statistics(&readings, "Cali", date!(2024 - 03 - 01), date!(2024 - 03 - 31));
        assert_eq!(
            stats,
            Statistics {
                average: 28.333333333333332,
                maximum: 30.0,
                minimum: 27.0
            }
        );
        assert_eq!(
            stats.entries().map(|(name, _)| name),
            ["average", "maximum", "minimum"]
        );
        assert_eq!(
            stats.to_string(),
            "average: 28.3 °C\nmaximum: 30.0 °C\nminimum: 27.0 °C\n"
        );
    }

    #[test]
    fn every_city_gets_an_average() {
        let readings = dataset();
        let averages = average_per_city(&readings, date!(2024 - 03 - 15), date!(2024 - 03 - 16));
        assert_eq!(
            averages.into_iter().collect::<Vec<_>>(),
            [
                ("Bogota".to_string(), 20.0),
                ("Cali".to_string(), 28.0),
                ("Medellin".to_string(), 15.0),
                ("Pasto".to_string(), 0.0),
            ]
        );
        assert!(average_per_city(&[], date!(2024 - 03 - 15), date!(2024 - 03 - 16)).is_empty());
    }

    #[test]
    fn hottest_and_coldest() {
        let readings = dataset();
        let extremes = extremes_on_date(&readings, date!(2024 - 03 - 15)).unwrap();
        assert_eq!(extremes.hottest, &reading("Cali", date!(2024 - 03 - 15), 28.0));
        assert_eq!(extremes.coldest, &reading("Medellin", date!(2024 - 03 - 15), 15.0));
        assert_eq!(
            extremes.to_string(),
            "Date: 2024-03-15\n\nHottest city: Cali (28.0 °C)\nColdest city: Medellin (15.0 °C)"
        );
    }

    #[test]
    fn single_reading_is_both_extremes() {
        let readings = dataset();
        let extremes = extremes_on_date(&readings, date!(2024 - 01 - 01)).unwrap();
        assert_eq!(extremes.hottest.city, "Pasto");
        assert_eq!(extremes.coldest.city, "Pasto");
    }

    #[test]
    fn ties_go_to_the_first_reading() {
        let day = date!(2024 - 06 - 01);
        let readings = vec![
            reading("Neiva", day, 35.0),
            reading("Tunja", day, 12.0),
            reading("Girardot", day, 35.0),
            reading("Ipiales", day, 12.0),
        ];
        let extremes = extremes_on_date(&readings, day).unwrap();
        assert_eq!(extremes.hottest.city, "Neiva");
        assert_eq!(extremes.coldest.city, "Tunja");
    }

    #[test]
    fn no_data_on_date() {
        let readings = dataset();
        assert!(extremes_on_date(&readings, date!(2023 - 03 - 15)).is_none());
        assert!(extremes_on_date(&[], date!(2023 - 03 - 15)).is_none());
    }
}
