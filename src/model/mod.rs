pub mod openai;
pub mod simulated;

pub use openai::UpstreamClient;
pub use simulated::SimulatedResponder;

use std::fmt;

use crate::web::models::{ModelCatalog, ModelInfo};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Models offered by the model picker. `/api/chat` forwards any id, listed or not.
pub const AVAILABLE_MODELS: &[(&str, &str)] = &[
    ("gpt-3.5-turbo", "GPT-3.5 Turbo"),
    ("gpt-3.5-turbo-16k", "GPT-3.5 Turbo (16K)"),
    ("gpt-4", "GPT-4"),
    ("gpt-4-turbo", "GPT-4 Turbo"),
    ("gpt-4-32k", "GPT-4 (32K)"),
];

pub fn catalog() -> ModelCatalog {
    ModelCatalog {
        default: DEFAULT_MODEL.to_string(),
        models: AVAILABLE_MODELS
            .iter()
            .map(|(id, name)| ModelInfo {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect(),
    }
}

/// Coarse family label used in simulated replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelLabel {
    Gpt4,
    Gpt35,
}

impl ModelLabel {
    pub fn from_model_id(model: &str) -> Self {
        if model.contains("gpt-4") {
            ModelLabel::Gpt4
        } else {
            ModelLabel::Gpt35
        }
    }
}

impl fmt::Display for ModelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelLabel::Gpt4 => write!(f, "GPT-4"),
            ModelLabel::Gpt35 => write!(f, "GPT-3.5"),
        }
    }
}
