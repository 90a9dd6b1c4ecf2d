use std::{
    collections::BTreeMap,
    fmt, io,
    ops::{Range, RangeInclusive},
    path::{Path, PathBuf},
    str::FromStr,
};

use csv::{Reader, ReaderBuilder, StringRecord};
use log::{debug, warn};
use logos::{Lexer, Logos};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use time::{Date, Month};

pub mod query;

pub use query::{Extremes, Statistics};

#[derive(Logos, Debug, PartialEq)]
enum DateToken {
    #[regex("[0-9]+")]
    Number,
    #[token("/")]
    Slash,
}

/// One `(city, date, temperature)` observation, in degrees Celsius.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureReading {
    pub city: String,
    pub date: Date,
    pub temperature: f64,
}

impl TemperatureReading {
    pub fn new(city: impl Into<String>, date: Date, temperature: f64) -> Self {
        Self {
            city: city.into(),
            date,
            temperature,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReadingError {
    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),
    #[error("empty city name")]
    EmptyCity,
    #[error("bad date `{0}`, expected day/month/year")]
    BadDate(String),
    #[error("invalid date: {0}")]
    InvalidDate(#[from] time::error::ComponentRange),
    #[error("bad temperature `{0}`")]
    BadTemperature(String),
    #[error("temperature `{0}` is not a finite number")]
    NonFinite(String),
    #[error("unreadable record: {0}")]
    Malformed(String),
}

impl ReadingError {
    /// Index of the comma separated field this error is about, `None` when
    /// the whole line is to blame.
    pub fn field(&self) -> Option<usize> {
        match self {
            Self::FieldCount(_) | Self::Malformed(_) => None,
            Self::EmptyCity => Some(0),
            Self::BadDate(_) | Self::InvalidDate(_) => Some(1),
            Self::BadTemperature(_) | Self::NonFinite(_) => Some(2),
        }
    }
}

impl TryFrom<&StringRecord> for TemperatureReading {
    type Error = ReadingError;

    fn try_from(record: &StringRecord) -> Result<Self, Self::Error> {
        let (city, date, temperature) = match (record.get(0), record.get(1), record.get(2)) {
            (Some(city), Some(date), Some(temperature)) if record.len() == 3 => {
                (city, date, temperature)
            }
            _ => return Err(ReadingError::FieldCount(record.len())),
        };

        if city.is_empty() {
            return Err(ReadingError::EmptyCity);
        }

        let date = parse_date(date)?;

        let temperature_text = temperature.trim();
        let temperature: f64 = temperature_text
            .parse()
            .map_err(|_| ReadingError::BadTemperature(temperature_text.to_string()))?;
        if !temperature.is_finite() {
            return Err(ReadingError::NonFinite(temperature_text.to_string()));
        }

        Ok(Self {
            city: city.to_string(),
            date,
            temperature,
        })
    }
}

/// Parse a `day/month/year` date as found in the data files, e.g. `5/3/2024`.
/// Day and month take one or two digits, the year exactly four.
pub fn parse_date(s: &str) -> Result<Date, ReadingError> {
    let mut lexer = DateToken::lexer(s);
    let bad = || ReadingError::BadDate(s.to_string());

    let day: u8 = date_number(&mut lexer, 1..=2).ok_or_else(bad)?;
    date_slash(&mut lexer).ok_or_else(bad)?;
    let month: u8 = date_number(&mut lexer, 1..=2).ok_or_else(bad)?;
    date_slash(&mut lexer).ok_or_else(bad)?;
    let year: i32 = date_number(&mut lexer, 4..=4).ok_or_else(bad)?;

    if lexer.next().is_some() {
        return Err(bad());
    }

    let month = Month::try_from(month)?;
    Ok(Date::from_calendar_date(year, month, day)?)
}

fn date_number<T: FromStr>(
    lexer: &mut Lexer<DateToken>,
    digits: RangeInclusive<usize>,
) -> Option<T> {
    match lexer.next() {
        Some(Ok(DateToken::Number)) if digits.contains(&lexer.slice().len()) => {
            lexer.slice().parse().ok()
        }
        _ => None,
    }
}

fn date_slash(lexer: &mut Lexer<DateToken>) -> Option<()> {
    match lexer.next() {
        Some(Ok(DateToken::Slash)) => Some(()),
        _ => None,
    }
}

fn field_span(line: &str, index: usize) -> Range<usize> {
    let mut start = 0;
    for (i, field) in line.split(',').enumerate() {
        if i == index {
            return start..start + field.len();
        }
        start += field.len() + 1;
    }
    0..line.len()
}

/// A line of a data file that could not be turned into a reading.
#[derive(Debug, Error, Diagnostic)]
#[error("{name}:{line}: {kind}")]
#[diagnostic(
    code(city_temps::parse),
    help("every line after the header must read `city,day/month/year,temperature`")
)]
pub struct ParseError {
    pub name: String,
    /// 1-based, the header being line 1.
    pub line: usize,
    pub kind: ReadingError,
    #[source_code]
    src: NamedSource<String>,
    #[label("this field")]
    span: SourceSpan,
}

impl ParseError {
    fn from_record(name: &str, record: &StringRecord, kind: ReadingError) -> Self {
        let line = record.position().map_or(0, |position| position.line() as usize);
        let text = record.iter().collect::<Vec<_>>().join(",");
        Self::new(name, line, &text, kind)
    }

    fn new(name: &str, line: usize, text: &str, kind: ReadingError) -> Self {
        let span = match kind.field() {
            Some(index) => field_span(text, index),
            None => 0..text.len(),
        };
        Self {
            name: name.to_string(),
            line,
            src: NamedSource::new(format!("{name}:{line}"), text.to_string()),
            span: span.into(),
            kind,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("cannot read `{}`", .path.display())]
    #[diagnostic(code(city_temps::file_access))]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
}

/// What to do with a line that does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnMalformed {
    /// Give up on the whole file at the first bad line.
    #[default]
    Abort,
    /// Drop the line, log it and keep going.
    Skip,
}

#[derive(Debug, Default)]
pub struct Loaded {
    pub readings: Vec<TemperatureReading>,
    /// Lines dropped under [`OnMalformed::Skip`], in file order.
    pub skipped: Vec<ParseError>,
}

impl Loaded {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Fields are taken verbatim: no quoting, no escaping, no trimming.
fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(true).quoting(false).flexible(true);
    builder
}

fn csv_failure(path: &Path, error: csv::Error) -> LoadError {
    let line = error.position().map_or(0, |position| position.line() as usize);
    let message = error.to_string();
    match error.into_kind() {
        csv::ErrorKind::Io(source) => LoadError::FileAccess {
            path: path.to_path_buf(),
            source,
        },
        _ => ParseError::new(
            &path.display().to_string(),
            line,
            "",
            ReadingError::Malformed(message),
        )
        .into(),
    }
}

fn collect_readings<R: io::Read>(
    path: &Path,
    mut reader: Reader<R>,
    policy: OnMalformed,
) -> Result<Loaded, LoadError> {
    let name = path.display().to_string();
    let mut loaded = Loaded::default();

    for result in reader.records() {
        let reading = result
            .map_err(|error| csv_failure(path, error))
            .and_then(|record| {
                TemperatureReading::try_from(&record)
                    .map_err(|kind| ParseError::from_record(&name, &record, kind).into())
            });

        match reading {
            Ok(reading) => loaded.readings.push(reading),
            Err(LoadError::Parse(error)) if policy == OnMalformed::Skip => {
                warn!("skipping malformed line: {error}");
                loaded.skipped.push(error);
            }
            Err(error) => return Err(error),
        }
    }

    Ok(loaded)
}

/// Parse the content of a data file. The first line is a header and is
/// ignored, as are empty lines. `name` only shows up in errors.
pub fn parse_readings(
    name: &str,
    input: &str,
    policy: OnMalformed,
) -> Result<Loaded, LoadError> {
    let reader = reader_builder().from_reader(input.as_bytes());
    collect_readings(Path::new(name), reader, policy)
}

/// Read and parse a data file, aborting on the first malformed line.
pub fn load_readings(path: impl AsRef<Path>) -> Result<Vec<TemperatureReading>, LoadError> {
    Ok(load_readings_with(path, OnMalformed::Abort)?.readings)
}

/// Read and parse a data file. The file is read from disk on every call.
pub fn load_readings_with(
    path: impl AsRef<Path>,
    policy: OnMalformed,
) -> Result<Loaded, LoadError> {
    let path = path.as_ref();
    let reader = reader_builder()
        .from_path(path)
        .map_err(|error| csv_failure(path, error))?;

    let loaded = collect_readings(path, reader, policy)?;
    debug!(
        "loaded {} readings from {} ({} skipped)",
        loaded.readings.len(),
        path.display(),
        loaded.skipped_count()
    );

    Ok(loaded)
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("range starts on {from}, after its end on {to}")]
pub struct InvalidRange {
    pub from: Date,
    pub to: Date,
}

/// Closed interval of dates, `from <= to` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: Date,
    to: Date,
}

impl DateRange {
    pub fn new(from: Date, to: Date) -> Result<Self, InvalidRange> {
        if from > to {
            return Err(InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> Date {
        self.from
    }

    pub fn to(&self) -> Date {
        self.to
    }

    pub fn contains(&self, date: Date) -> bool {
        self.from <= date && date <= self.to
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}

/// Average temperature of every city of the dataset over `range`. Cities
/// without any reading in the range get `0.0`.
pub fn averages_for_range_by_city(
    readings: &[TemperatureReading],
    range: DateRange,
) -> BTreeMap<String, f64> {
    query::average_per_city(readings, range.from, range.to)
}

/// Hottest and coldest reading on `date`, `None` when nothing was recorded that day.
pub fn extremes_for_date(readings: &[TemperatureReading], date: Date) -> Option<Extremes<'_>> {
    query::extremes_on_date(readings, date)
}

pub fn statistics_for_city_range(
    readings: &[TemperatureReading],
    city: &str,
    range: DateRange,
) -> Statistics {
    query::statistics(readings, city, range.from, range.to)
}

/// Load `path` and compute [`averages_for_range_by_city`] on it. Nothing is
/// cached, each call reads the file again.
pub fn averages_from_file(
    path: impl AsRef<Path>,
    range: DateRange,
) -> Result<BTreeMap<String, f64>, LoadError> {
    let readings = load_readings(path)?;
    Ok(averages_for_range_by_city(&readings, range))
}
