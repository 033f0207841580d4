// Data cleaning: turn raw NOAA rows into complete numeric observations.
use chrono::NaiveDateTime;

use crate::error::WeatherError;
use crate::io::RawObservation;

/// One cleaned hourly observation. Every field is present and finite, and
/// `precip` is inches with the trace marker already collapsed to zero.
#[derive(Debug, Clone)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub relative_humidity: f64,
    pub dry_bulb_temp_f: f64,
    pub precip: f64,
    pub wind_speed: f64,
    pub station_pressure: f64,
}

/// Normalize the precipitation text field to a number.
///
/// NOAA records trace amounts as "T" (counted as zero, not missing) and tags
/// snowfall with a trailing "s" unit marker. Rules, in order: every "T"
/// becomes "0.0", then one trailing "s" is stripped, a missing field counts
/// as "0.0", and whatever is left must parse as a non-negative float. The
/// ordering matters: "Ts" goes to "0.0", not to the unparseable "0.0s".
pub fn normalize_precip(raw: Option<&str>) -> Result<f64, WeatherError> {
    let text = match raw.map(str::trim) {
        None | Some("") => return Ok(0.0),
        Some(t) => t,
    };

    let replaced = text.replace('T', "0.0");
    let value = replaced.strip_suffix('s').unwrap_or(&replaced);

    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(WeatherError::BadPrecip(text.to_string())),
    }
}

/// Keep only the rows where every analysis column is present, applying the
/// precipitation normalizer on the way through. Returns the cleaned rows and
/// how many were dropped; each drop is warned on stderr with the row's
/// source file line rather than aborting the run.
pub fn prepare(raw: &[RawObservation]) -> (Vec<Observation>, usize) {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut dropped = 0usize;

    for r in raw {
        let precip = match normalize_precip(r.precip.as_deref()) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Dropping line {}: {}", r.line, e);
                dropped += 1;
                continue;
            }
        };

        let (rh, temp, wind, pressure) = match (
            r.relative_humidity,
            r.dry_bulb_temp_f,
            r.wind_speed,
            r.station_pressure,
        ) {
            (Some(rh), Some(t), Some(w), Some(p)) => (rh, t, w, p),
            _ => {
                eprintln!(
                    "Dropping line {}: missing value in a selected column",
                    r.line
                );
                dropped += 1;
                continue;
            }
        };

        if ![rh, temp, wind, pressure].iter().all(|v| v.is_finite()) {
            eprintln!(
                "Dropping line {}: non-finite value in a selected column",
                r.line
            );
            dropped += 1;
            continue;
        }

        cleaned.push(Observation {
            timestamp: r.date,
            relative_humidity: rh,
            dry_bulb_temp_f: temp,
            precip,
            wind_speed: wind,
            station_pressure: pressure,
        });
    }

    (cleaned, dropped)
}
