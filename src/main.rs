/// Ties the modules together into the full precipitation modeling run.
use std::error::Error;

use clap::Parser;
use ndarray::Array1;
use plotters::prelude::*;

mod error;
mod explore;
mod io;
mod metrics;
mod model;
mod pipeline;
mod preprocess;
mod split;

use error::WeatherError;
use io::load_csv;
use metrics::Metrics;
use model::{fit_baseline, KnnRegressor};
use pipeline::FeaturePipeline;
use preprocess::prepare;
use split::train_test_split;

#[derive(Parser)]
#[command(about = "Predict hourly precipitation from NOAA weather observations")]
struct Cli {
    /// Path to the NOAA hourly CSV export
    #[arg(default_value = "jfk_weather_sample.csv")]
    input: String,

    /// Seed for the train/test shuffle
    #[arg(long, default_value_t = 1234)]
    seed: u64,

    /// Fraction of rows assigned to the training split
    #[arg(long, default_value_t = 0.75)]
    train_fraction: f64,

    /// Number of neighbors
    #[arg(long, default_value_t = 3)]
    k: usize,

    /// Polynomial degree for the feature pipeline (1 or 2)
    #[arg(long, default_value_t = 2)]
    degree: usize,

    /// Average neighbors uniformly instead of by inverse distance
    #[arg(long)]
    uniform_weights: bool,

    /// Skip writing predicted_vs_actual.png
    #[arg(long)]
    no_plot: bool,
}

/// Scatter of predicted against actual precipitation for the test rows, with
/// the identity line for reference. Saves to `path` as a PNG.
fn plot_predictions(
    predicted: &Array1<f64>,
    actual: &Array1<f64>,
    path: &str,
) -> Result<(), Box<dyn Error>> {
    // shared axis range; the 0.1 floor keeps an all-dry test split plottable
    let hi = predicted
        .iter()
        .chain(actual.iter())
        .cloned()
        .fold(0.0_f64, f64::max)
        .max(0.1)
        * 1.1;

    let root = BitMapBackend::new(path, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Predicted vs actual hourly precipitation", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..hi, 0.0..hi)?;

    chart
        .configure_mesh()
        .x_desc("Actual (in)")
        .y_desc("Predicted (in)")
        .draw()?;

    chart.draw_series(
        actual
            .iter()
            .zip(predicted.iter())
            .map(|(&a, &p)| Circle::new((a, p), 3, BLUE.mix(0.5).filled())),
    )?;
    chart.draw_series(LineSeries::new([(0.0, 0.0), (hi, hi)], &RED))?;

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    if !(cli.train_fraction > 0.0 && cli.train_fraction < 1.0) {
        return Err("--train-fraction must be strictly between 0 and 1".into());
    }
    if cli.k == 0 {
        return Err("--k must be at least 1".into());
    }

    // 1) Load the raw NOAA export
    println!("Loading data from {}...", cli.input);
    let raw = load_csv(&cli.input)?;

    // 2) Normalize precipitation and drop incomplete rows
    let (observations, dropped) = prepare(&raw);
    println!(
        "Prepared {} observations ({} dropped)",
        observations.len(),
        dropped
    );
    if observations.is_empty() {
        return Err(Box::new(WeatherError::EmptyDataset));
    }
    if let (Some(first), Some(last)) = (
        observations.iter().map(|o| o.timestamp).min(),
        observations.iter().map(|o| o.timestamp).max(),
    ) {
        println!("Observations span {} to {}", first, last);
    }

    // 3) Describe what we are working with
    explore::print_summary(&explore::describe(&observations));
    explore::print_correlations(&explore::correlation_matrix(&observations));

    // 4) Seeded train/test split
    let (train, test) = train_test_split(&observations, cli.seed, cli.train_fraction);
    println!(
        "\nSplit into {} train / {} test rows (seed {})",
        train.len(),
        test.len(),
        cli.seed
    );
    if test.is_empty() {
        return Err("test split is empty; provide more rows or a smaller --train-fraction".into());
    }

    // 5) Fit the feature pipeline on the training rows only
    let fitted = FeaturePipeline::new(cli.degree)?.fit(&train)?;
    let x_train = fitted.transform(train.rows());
    let y_train = pipeline::target(train.rows());
    let x_test = fitted.transform(test.rows());
    let y_test = pipeline::target(test.rows());

    // 6) Nearest-neighbor model
    let knn = KnnRegressor::new(cli.k, !cli.uniform_weights).fit(x_train.clone(), y_train.clone())?;
    let knn_pred = knn.predict(&x_test);
    let knn_metrics = metrics::evaluate(&knn_pred, &y_test)?;

    // 7) Linear baseline over the same features
    let baseline = fit_baseline(x_train, y_train)?;
    let base_pred = baseline.predict(&x_test);
    let base_metrics = metrics::evaluate(&base_pred, &y_test)?;

    println!("\nLinear baseline coefficients:");
    for (name, coef) in fitted
        .feature_names()
        .iter()
        .zip(baseline.coefficients().iter())
    {
        println!("{:<30} {:>8.4}", name, coef);
    }
    println!("{:<30} {:>8.4}", "intercept", baseline.intercept());

    // 8) Report both models on the held-out rows
    let table: [(String, Metrics); 2] = [
        (format!("knn (k={})", cli.k), knn_metrics),
        ("linear baseline".to_string(), base_metrics),
    ];
    println!("\n{:<24} {:>10} {:>10} {:>12}", "model", "RMSE", "MAE", "R²");
    for (name, m) in &table {
        let r2 = m
            .r_squared
            .map_or("undefined".to_string(), |v| format!("{:.4}", v));
        println!("{:<24} {:>10.4} {:>10.4} {:>12}", name, m.rmse, m.mae, r2);
    }

    // 9) Plot the kNN predictions
    if !cli.no_plot {
        plot_predictions(&knn_pred, &y_test, "predicted_vs_actual.png")?;
        println!("\nWrote predicted_vs_actual.png");
    }

    Ok(())
}

/// the test functions
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::error::Error;
    use std::{fs::File, io::Write};

    use crate::preprocess::Observation;
    use crate::split::TrainSet;

    fn obs(humidity: f64, temp: f64, precip: f64) -> Observation {
        Observation {
            timestamp: NaiveDate::from_ymd_opt(2015, 7, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            relative_humidity: humidity,
            dry_bulb_temp_f: temp,
            precip,
            wind_speed: 10.0,
            station_pressure: 29.9,
        }
    }

    /// Whole run against a small CSV: load, prepare, split, fit, evaluate.
    #[test]
    fn test_pipeline_end_to_end() -> Result<(), Box<dyn Error>> {
        let path = "test_weather_pipeline.csv";
        let mut f = File::create(path)?;
        writeln!(
            &mut f,
            "STATION,DATE,HOURLYRelativeHumidity,HOURLYDRYBULBTEMPF,HOURLYPrecip,HOURLYWindSpeed,HOURLYStationPressure"
        )?;
        writeln!(&mut f, "72502,2015-01-01 00:51:00,58,43,T,6,29.97")?;
        writeln!(&mut f, "72502,2015-01-01 01:51:00,61,44,0.05s,7,29.95")?;
        writeln!(&mut f, "72502,2015-01-01 02:51:00,64,45,,8,29.93")?;
        writeln!(&mut f, "72502,2015-01-01 03:51:00,67,46,0.02,9,29.90")?;
        writeln!(&mut f, "72502,2015-01-01 04:51:00,70,47,0.10,10,29.88")?;
        writeln!(&mut f, "72502,2015-01-01 05:51:00,73,48,0.15,11,29.85")?;
        writeln!(&mut f, "72502,2015-01-01 06:51:00,76,49,0.20,12,29.83")?;
        writeln!(&mut f, "72502,2015-01-01 07:51:00,79,50,0.25,13,29.80")?;
        writeln!(&mut f, "72502,2015-01-01 08:51:00,82,51,0.30,14,29.78")?;
        writeln!(&mut f, "72502,2015-01-01 09:51:00,85,52,0.18,15,29.75")?;
        writeln!(&mut f, "72502,2015-01-01 10:51:00,88,53,0.12,16,29.73")?;
        writeln!(&mut f, "72502,2015-01-01 11:51:00,91,54,0.08,17,29.70")?;
        // unparseable precipitation, then a missing humidity
        writeln!(&mut f, "72502,2015-01-01 12:51:00,94,55,0.02Ts,18,29.68")?;
        writeln!(&mut f, "72502,2015-01-01 13:51:00,,56,0.01,19,29.65")?;

        let raw = load_csv(path)?;
        assert_eq!(raw.len(), 14);

        let (observations, dropped) = prepare(&raw);
        assert_eq!(observations.len(), 12);
        assert_eq!(dropped, 2);
        assert_eq!(observations[0].precip, 0.0); // trace marker
        assert_eq!(observations[1].precip, 0.05); // suspect suffix stripped
        assert_eq!(observations[2].precip, 0.0); // missing means no rain
        assert_eq!(observations[3].precip, 0.02);

        let (train, test) = train_test_split(&observations, 1234, 0.75);
        assert_eq!(train.len(), 9);
        assert_eq!(test.len(), 3);

        let fitted = FeaturePipeline::new(2)?.fit(&train)?;
        let knn = KnnRegressor::new(3, true).fit(
            fitted.transform(train.rows()),
            pipeline::target(train.rows()),
        )?;
        let predicted = knn.predict(&fitted.transform(test.rows()));
        let actual = pipeline::target(test.rows());

        let m = metrics::evaluate(&predicted, &actual)?;
        assert!(m.rmse.is_finite());
        assert!(m.mae.is_finite());
        assert!(m.rmse >= m.mae);
        assert!(m.mae >= 0.0);

        Ok(())
    }

    /// A humid-but-mild query sitting near two nearly dry training hours
    /// should predict close to their precipitation, not the wet hours'.
    #[test]
    fn test_prediction_leans_toward_nearby_conditions() {
        let train = TrainSet {
            rows: vec![
                obs(50.0, 60.0, 0.0),
                obs(55.0, 62.0, 0.1),
                obs(90.0, 70.0, 0.5),
                obs(85.0, 68.0, 0.4),
            ],
        };
        let fitted = FeaturePipeline::new(1).unwrap().fit(&train).unwrap();
        let knn = KnnRegressor::new(3, true)
            .fit(
                fitted.transform(train.rows()),
                pipeline::target(train.rows()),
            )
            .unwrap();

        let query = fitted.transform(&[obs(60.0, 61.0, 0.0)]);
        let pred = knn.predict(&query)[0];

        assert!(pred > 0.0 && pred < 0.5);
        assert!((pred - 0.0).abs() < (pred - 0.5).abs());
        assert!((pred - 0.1).abs() < (pred - 0.5).abs());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["precip-knn"]).unwrap();
        assert_eq!(cli.input, "jfk_weather_sample.csv");
        assert_eq!(cli.seed, 1234);
        assert_eq!(cli.train_fraction, 0.75);
        assert_eq!(cli.k, 3);
        assert_eq!(cli.degree, 2);
        assert!(!cli.uniform_weights);
        assert!(!cli.no_plot);
    }
}
