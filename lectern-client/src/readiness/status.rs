use serde::{Deserialize, Serialize};

/// Snapshot of `/models/status`. Missing flags read as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessStatus {
    pub transformers_available: bool,
    pub summarizer_ready: bool,
    pub generator_ready: bool,
}

impl ReadinessStatus {
    /// Both models the UI depends on have finished loading.
    pub fn is_ready(&self) -> bool {
        self.summarizer_ready && self.generator_ready
    }

    pub fn models_state(&self) -> ModelsState {
        if self.is_ready() {
            ModelsState::Ready
        } else if self.transformers_available {
            ModelsState::Loading
        } else {
            ModelsState::Disabled
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelsState {
    Ready,
    Loading,
    /// The backend has no model runtime and answers with mock output.
    Disabled,
}

impl ModelsState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelsState::Ready => "ready",
            ModelsState::Loading => "loading",
            ModelsState::Disabled => "disabled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelsState::Ready => "Models ready",
            ModelsState::Loading => "Models loading...",
            ModelsState::Disabled => "Models disabled (mock mode)",
        }
    }
}
