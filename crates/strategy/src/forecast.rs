use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use tract_onnx::prelude::*;
use tracing::{error, info, warn};

use market_data::ProviderError;

type RunnableModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Closes fed to the model per prediction.
pub const LOOK_BACK: usize = 60;

/// Next-day price forecast from the historical close series (oldest
/// first). Both implementations are interchangeable; which one runs is
/// fixed when the forecaster is constructed.
pub trait Forecaster: Send + Sync {
    fn predict(&self, closes: &[f64]) -> Result<f64, ProviderError>;
}

/// ONNX-backed forecaster running a trained model via tract.
#[derive(Clone)]
pub struct OnnxForecaster {
    model: Arc<RunnableModel>,
    look_back: usize,
}

impl OnnxForecaster {
    pub fn load(model_path: &str) -> Result<Self, ProviderError> {
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| ProviderError::Inference(e.to_string()))?;

        Ok(Self {
            model: Arc::new(model),
            look_back: LOOK_BACK,
        })
    }
}

impl Forecaster for OnnxForecaster {
    fn predict(&self, closes: &[f64]) -> Result<f64, ProviderError> {
        if closes.len() < self.look_back {
            return Err(ProviderError::Inference(format!(
                "need {} closes, got {}",
                self.look_back,
                closes.len()
            )));
        }

        let window: Vec<f32> = closes[closes.len() - self.look_back..]
            .iter()
            .map(|p| *p as f32)
            .collect();

        // Input shape (1, look_back), output a single predicted price.
        let tensor = tract_ndarray::Array::from_shape_vec((1, self.look_back), window)
            .map_err(|e| ProviderError::Inference(e.to_string()))?
            .into_tensor();

        let result = self
            .model
            .run(tvec!(tensor.into()))
            .map_err(|e| ProviderError::Inference(e.to_string()))?;

        let output = result[0]
            .to_array_view::<f32>()
            .map_err(|e| ProviderError::Inference(e.to_string()))?;

        let predicted = output
            .iter()
            .next()
            .copied()
            .ok_or_else(|| ProviderError::Inference("empty model output".to_string()))?
            as f64;

        // Floor out degenerate outputs.
        Ok(predicted.max(1000.0))
    }
}

/// Model-free fallback: the current price with a bounded uniform drift.
#[derive(Debug, Clone)]
pub struct RandomWalkForecaster {
    max_drift: f64,
}

impl Default for RandomWalkForecaster {
    fn default() -> Self {
        Self { max_drift: 0.05 }
    }
}

impl Forecaster for RandomWalkForecaster {
    fn predict(&self, closes: &[f64]) -> Result<f64, ProviderError> {
        let current = closes
            .last()
            .copied()
            .ok_or(ProviderError::EmptySeries {
                service: "forecaster",
            })?;

        let drift = rand::thread_rng().gen_range(-self.max_drift..=self.max_drift);
        Ok(current * (1.0 + drift))
    }
}

/// Pick the forecaster at construction time: the trained model when its
/// file is present and loads, the random walk otherwise.
pub fn forecaster_from_model_path(model_path: &str) -> Box<dyn Forecaster> {
    if Path::new(model_path).exists() {
        match OnnxForecaster::load(model_path) {
            Ok(model) => {
                info!("Loaded ONNX forecaster from {}", model_path);
                return Box::new(model);
            }
            Err(e) => error!("Failed to load model {}: {}", model_path, e),
        }
    } else {
        warn!(
            "Forecast model not found at {}. Using random-walk predictions.",
            model_path
        );
    }

    Box::new(RandomWalkForecaster::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_walk_stays_within_drift_band() {
        let forecaster = RandomWalkForecaster::default();
        let closes = vec![60_000.0, 62_000.0, 64_000.0];

        for _ in 0..200 {
            let predicted = forecaster.predict(&closes).unwrap();
            assert!(predicted >= 64_000.0 * 0.95 - 1e-6);
            assert!(predicted <= 64_000.0 * 1.05 + 1e-6);
        }
    }

    #[test]
    fn random_walk_rejects_an_empty_series() {
        let forecaster = RandomWalkForecaster::default();
        assert!(forecaster.predict(&[]).is_err());
    }

    #[test]
    fn missing_model_file_selects_the_random_walk() {
        let forecaster = forecaster_from_model_path("definitely/not/here.onnx");
        let predicted = forecaster.predict(&[50_000.0]).unwrap();
        assert!(predicted > 0.0);
    }
}
