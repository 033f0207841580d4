// Console summaries of the prepared dataset: per-column statistics and the
// Pearson correlation matrix.
use ndarray::Array2;

use crate::preprocess::Observation;

/// The numeric columns of the prepared dataset, in report order.
pub const NUMERIC_COLUMNS: [&str; 5] = [
    "relative_humidity",
    "dry_bulb_temp_f",
    "precip",
    "wind_speed",
    "station_pressure",
];

fn column(obs: &Observation, idx: usize) -> f64 {
    match idx {
        0 => obs.relative_humidity,
        1 => obs.dry_bulb_temp_f,
        2 => obs.precip,
        3 => obs.wind_speed,
        _ => obs.station_pressure,
    }
}

#[derive(Debug, Clone)]
pub struct ColumnSummary {
    pub name: &'static str,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

pub fn describe(rows: &[Observation]) -> Vec<ColumnSummary> {
    if rows.is_empty() {
        return Vec::new();
    }
    let n = rows.len();

    NUMERIC_COLUMNS
        .iter()
        .enumerate()
        .map(|(idx, &name)| {
            let mut values: Vec<f64> = rows.iter().map(|o| column(o, idx)).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap());

            let mean = values.iter().sum::<f64>() / n as f64;
            let var = if n > 1 {
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
            } else {
                0.0
            };
            let median = if n % 2 == 1 {
                values[n / 2]
            } else {
                (values[n / 2 - 1] + values[n / 2]) / 2.0
            };

            ColumnSummary {
                name,
                count: n,
                mean,
                std: var.sqrt(),
                min: values[0],
                median,
                max: values[n - 1],
            }
        })
        .collect()
}

/// Pearson correlations between the numeric columns. Entries involving a
/// constant column come out NaN.
pub fn correlation_matrix(rows: &[Observation]) -> Array2<f64> {
    let p = NUMERIC_COLUMNS.len();
    let n = rows.len() as f64;
    let mut m = Array2::<f64>::zeros((p, p));

    let means: Vec<f64> = (0..p)
        .map(|idx| rows.iter().map(|o| column(o, idx)).sum::<f64>() / n)
        .collect();

    for i in 0..p {
        for j in 0..p {
            let mut cov = 0.0;
            let mut var_i = 0.0;
            let mut var_j = 0.0;
            for o in rows {
                let di = column(o, i) - means[i];
                let dj = column(o, j) - means[j];
                cov += di * dj;
                var_i += di * di;
                var_j += dj * dj;
            }
            m[(i, j)] = cov / (var_i.sqrt() * var_j.sqrt());
        }
    }

    m
}

pub fn print_summary(summaries: &[ColumnSummary]) {
    println!("\nColumn summary:");
    println!(
        "{:<20} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "column", "count", "mean", "std", "min", "median", "max"
    );
    for s in summaries {
        println!(
            "{:<20} {:>6} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
            s.name, s.count, s.mean, s.std, s.min, s.median, s.max
        );
    }
}

pub fn print_correlations(matrix: &Array2<f64>) {
    println!("\nPearson correlations:");
    print!("{:<18}", "");
    for name in NUMERIC_COLUMNS {
        print!(" {:>17}", name);
    }
    println!();
    for (i, name) in NUMERIC_COLUMNS.iter().enumerate() {
        print!("{:<18}", name);
        for j in 0..NUMERIC_COLUMNS.len() {
            print!(" {:>17.3}", matrix[(i, j)]);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(humidity: f64, temp: f64, precip: f64, wind: f64, pressure: f64) -> Observation {
        Observation {
            timestamp: NaiveDate::from_ymd_opt(2015, 6, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            relative_humidity: humidity,
            dry_bulb_temp_f: temp,
            precip,
            wind_speed: wind,
            station_pressure: pressure,
        }
    }

    #[test]
    fn test_describe_known_values() {
        let rows = vec![
            obs(30.0, 50.0, 0.0, 10.0, 29.8),
            obs(40.0, 60.0, 0.1, 12.0, 29.9),
            obs(80.0, 70.0, 0.3, 8.0, 30.0),
        ];
        let summaries = describe(&rows);
        assert_eq!(summaries.len(), NUMERIC_COLUMNS.len());

        let humidity = &summaries[0];
        assert_eq!(humidity.name, "relative_humidity");
        assert_eq!(humidity.count, 3);
        assert!((humidity.mean - 50.0).abs() < 1e-12);
        assert!((humidity.median - 40.0).abs() < 1e-12);
        assert!((humidity.min - 30.0).abs() < 1e-12);
        assert!((humidity.max - 80.0).abs() < 1e-12);
        assert!((humidity.std - 700.0f64.sqrt()).abs() < 1e-12);

        assert!(describe(&[]).is_empty());
    }

    #[test]
    fn test_correlations() {
        // humidity and temp move together, precip moves against humidity,
        // wind is constant
        let rows = vec![
            obs(30.0, 50.0, 0.3, 10.0, 29.8),
            obs(40.0, 60.0, 0.2, 10.0, 30.1),
            obs(50.0, 70.0, 0.1, 10.0, 29.9),
        ];
        let m = correlation_matrix(&rows);

        assert!((m[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((m[(0, 1)] - 1.0).abs() < 1e-12);
        assert!((m[(0, 2)] + 1.0).abs() < 1e-12);
        assert!((m[(1, 0)] - m[(0, 1)]).abs() < 1e-12);
        // constant column has no defined correlation with anything
        assert!(m[(3, 0)].is_nan());
        assert!(m[(3, 3)].is_nan());
    }
}
