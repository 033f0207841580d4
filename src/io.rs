// Module for loading and validating the raw NOAA hourly export. It checks
// the header for the required columns before reading any data, then
// deserializes rows, skipping the ones that are malformed.
use std::error::Error;
use std::fs::File;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;

use crate::error::WeatherError;

mod datetime_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer};
    const FMT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn deserialize<'de, D>(d: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&s, FMT).map_err(serde::de::Error::custom)
    }
}

/// The columns the analysis needs, by their names in the NOAA export.
/// The file may carry any number of other columns; they are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "DATE",
    "HOURLYRelativeHumidity",
    "HOURLYDRYBULBTEMPF",
    "HOURLYPrecip",
    "HOURLYWindSpeed",
    "HOURLYStationPressure",
];

/// One raw row. Everything except the timestamp may be absent, and
/// precipitation stays text until `preprocess::normalize_precip` has dealt
/// with its trace/snow markers.
#[derive(Debug, Deserialize)]
pub struct RawObservation {
    #[serde(rename = "DATE", deserialize_with = "datetime_format::deserialize")]
    pub date: NaiveDateTime,
    #[serde(rename = "HOURLYRelativeHumidity")]
    pub relative_humidity: Option<f64>,
    #[serde(rename = "HOURLYDRYBULBTEMPF")]
    pub dry_bulb_temp_f: Option<f64>,
    #[serde(rename = "HOURLYPrecip")]
    pub precip: Option<String>,
    #[serde(rename = "HOURLYWindSpeed")]
    pub wind_speed: Option<f64>,
    #[serde(rename = "HOURLYStationPressure")]
    pub station_pressure: Option<f64>,
    /// 1-based line in the source file, so later drop warnings can point
    /// back at the CSV.
    #[serde(skip)]
    pub line: u64,
}

pub fn load_csv(path: &str) -> Result<Vec<RawObservation>, Box<dyn Error>> {
    let file = File::open(path)?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(b',')
        .flexible(true)
        .has_headers(true)
        .from_reader(file);

    // Grab and own the header row, and check the schema up front so a
    // mismatched file fails before any row is parsed.
    let headers = rdr.headers()?.clone();
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(WeatherError::MissingColumn(required.to_string()).into());
        }
    }
    let expected_len = headers.len();

    let mut out = Vec::new();
    for result in rdr.records() {
        let raw: StringRecord = result?;
        let line = raw.position().map(|p| p.line()).unwrap_or(0);

        // Skip completely empty lines
        if raw.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        // Skip ragged rows rather than misaligning fields
        if raw.len() != expected_len {
            eprintln!(
                "Skipping line {}: expected {} fields, found {}",
                line,
                expected_len,
                raw.len(),
            );
            continue;
        }

        match raw.deserialize::<RawObservation>(Some(&headers)) {
            Ok(mut rec) => {
                rec.line = line;
                out.push(rec);
            }
            Err(e) => {
                eprintln!("Skipping malformed record at line {}: {}", line, e);
            }
        }
    }

    Ok(out)
}
