use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("model artifact i/o: {0}")]
    Io(#[from] io::Error),
    #[error("model artifact corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Fitted hour-of-day baseline: `energy = slope * hour + intercept`.
///
/// Fitted (or loaded) once at startup and shared read-only thereafter.
/// `predict` does not clamp its input; callers validate the hour range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineModel {
    pub slope: f64,
    pub intercept: f64,
    #[serde(with = "time::serde::timestamp")]
    pub trained_at: OffsetDateTime,
}

impl BaselineModel {
    /// Ordinary least-squares fit of a single-feature line.
    pub fn fit(hours: &[f64], energies: &[f64]) -> Self {
        debug_assert_eq!(hours.len(), energies.len());
        let n = hours.len() as f64;
        let mean_x = hours.iter().sum::<f64>() / n;
        let mean_y = energies.iter().sum::<f64>() / n;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (&x, &y) in hours.iter().zip(energies) {
            sxx += (x - mean_x) * (x - mean_x);
            sxy += (x - mean_x) * (y - mean_y);
        }

        let slope = sxy / sxx;
        Self {
            slope,
            intercept: mean_y - slope * mean_x,
            trained_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn predict(&self, hour: i64) -> f64 {
        self.slope * hour as f64 + self.intercept
    }
}

/// The fixed 24-point hour-to-energy training curve: overnight trough,
/// daytime shoulder, evening peak (17:00 through 21:00).
pub fn synthetic_curve() -> (Vec<f64>, Vec<f64>) {
    let hours: Vec<f64> = (0..24).map(f64::from).collect();
    let energies: Vec<f64> = (0..24)
        .map(|h| {
            if h < 6 || h > 21 {
                1.0
            } else if (17..=21).contains(&h) {
                2.5
            } else {
                1.5
            }
        })
        .collect();
    (hours, energies)
}

/// Loads the persisted baseline model, or fits one on the synthetic curve
/// and writes the artifact if none exists yet.
///
/// Called once by the process entry point. An unreadable or corrupt
/// artifact is fatal; the service never retrains over an existing file.
pub fn load_or_train(path: &Path) -> Result<BaselineModel, ModelError> {
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let model: BaselineModel = serde_json::from_str(&contents)?;
        tracing::info!(
            path = %path.display(),
            slope = model.slope,
            intercept = model.intercept,
            "loaded baseline model artifact"
        );
        return Ok(model);
    }

    let (hours, energies) = synthetic_curve();
    let model = BaselineModel::fit(&hours, &energies);
    fs::write(path, serde_json::to_string_pretty(&model)?)?;
    tracing::info!(
        path = %path.display(),
        slope = model.slope,
        intercept = model.intercept,
        "fitted baseline model and wrote artifact"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use time::macros::datetime;

    fn fitted() -> BaselineModel {
        let (hours, energies) = synthetic_curve();
        BaselineModel::fit(&hours, &energies)
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shems-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn fit_recovers_exact_coefficients() {
        // Closed-form least squares over the synthetic curve.
        let model = fitted();
        assert!((model.slope - 107.0 / 2300.0).abs() < 1e-12);
        assert!((model.intercept - 151.0 / 150.0).abs() < 1e-12);
        assert!(model.trained_at > datetime!(2020-01-01 0:00 UTC));
    }

    #[test]
    fn predict_is_linear_and_unclamped() {
        let model = fitted();
        let low = model.predict(3);
        let high = model.predict(19);
        assert!((low - 1.1462319).abs() < 1e-6);
        assert!((high - 1.8905797).abs() < 1e-6);
        // Out-of-range hours extrapolate rather than clamp.
        assert!(model.predict(48) > model.predict(23));
        assert!(model.predict(-1) < model.predict(0));
    }

    #[test]
    fn load_or_train_persists_then_reloads() {
        let path = scratch_path("artifact-roundtrip");
        let _ = fs::remove_file(&path);

        let trained = load_or_train(&path).unwrap();
        assert!(path.exists());

        let loaded = load_or_train(&path).unwrap();
        assert_eq!(loaded.slope, trained.slope);
        assert_eq!(loaded.intercept, trained.intercept);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_artifact_is_fatal() {
        let path = scratch_path("artifact-corrupt");
        fs::write(&path, "definitely not a model").unwrap();

        let res = load_or_train(&path);
        assert!(matches!(res, Err(ModelError::Corrupt(_))));

        let _ = fs::remove_file(&path);
    }
}
