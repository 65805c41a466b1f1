//! Reproducible description of a run.
//!
//! A [`Scene`] captures everything needed to replay a simulation: variant,
//! screen size, parameter overrides, PRNG seed, frame count, startup
//! patterns and scheduled input. Two identical scenes produce bit-identical
//! particle state.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;
use crate::input::ScriptedEvent;
use crate::pattern::PatternSpec;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    pub variant: String,
    pub width: usize,
    pub height: usize,
    #[serde(default = "empty_object")]
    pub params: Value,
    pub seed: u64,
    #[serde(default)]
    pub frames: usize,
    /// Startup patterns. `None` uses the variant's own; `Some(vec![])` starts
    /// with no attractors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<PatternSpec>>,
    #[serde(default)]
    pub events: Vec<ScriptedEvent>,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Scene {
    /// A scene with no overrides, zero frames and no scripted events.
    pub fn new(variant: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            variant: variant.to_owned(),
            width,
            height,
            params: empty_object(),
            seed,
            frames: 0,
            patterns: None,
            events: Vec::new(),
        }
    }

    /// Checks the dimensions, that `params` is an object and that every
    /// pattern stays within its point budget.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(EngineError::InvalidDimensions)?;
        if !self.params.is_object() {
            return Err(EngineError::ParamTypeMismatch {
                name: "params".into(),
                expected: "object".into(),
                got: crate::params::json_type_name(&self.params).into(),
            });
        }
        for pattern in self.patterns.iter().flatten() {
            pattern.validate()?;
        }
        Ok(())
    }

    /// Parses and validates a scene from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, EngineError> {
        let scene: Scene = serde_json::from_str(text)
            .map_err(|e| EngineError::Io(format!("invalid scene: {e}")))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Reads, parses and validates a scene file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }
}
