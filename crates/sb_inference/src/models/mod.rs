use std::sync::Arc;

use sb_core::{Error, Result, TextGenerator};

use crate::Config;

pub mod dummy;
pub mod gemini;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;

/// Build the configured text generator. Without an explicit model name, an API
/// key selects Gemini and its absence selects the offline dummy.
pub fn create_model(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    let name = config
        .model_name
        .clone()
        .unwrap_or_else(|| if config.api_key.is_some() { "gemini" } else { "dummy" }.to_string());

    match name.to_lowercase().as_str() {
        "gemini" => {
            let mut model = GeminiModel::new(config.api_key.clone(), config.model_id.clone())?;
            if let Some(base_url) = &config.base_url {
                model = model.with_base_url(base_url.clone());
            }
            Ok(Arc::new(model))
        }
        "dummy" => Ok(Arc::new(DummyModel::new())),
        other => Err(Error::Inference(format!("Unknown model: {}", other))),
    }
}
