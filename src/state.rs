//! Kit persistence.
//!
//! A kit is saved as JSON: for each part, the two sample paths and every
//! parameter value keyed by its short id (`s1_lvl`, `env2_a`, ...). Sample
//! audio is never embedded; restoring reloads each file from its path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::StateError,
    io::SampleDecoder,
    params::ParamId,
    synth::engine::EngineHandle,
    NUM_PARTS, PART_NAMES,
};

pub const KIT_STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartState {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sample_paths: [Option<PathBuf>; 2],
    #[serde(default)]
    pub params: BTreeMap<String, f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitState {
    pub version: u32,
    pub parts: Vec<PartState>,
}

impl KitState {
    /// Read the current kit from the control side of an engine.
    pub fn capture(handle: &EngineHandle) -> Self {
        let parts = (0..NUM_PARTS)
            .map(|part| {
                let values = handle.params().part(part);
                PartState {
                    name: PART_NAMES[part].to_string(),
                    sample_paths: [0, 1].map(|slot| {
                        handle.sample_slot(part, slot).and_then(|s| s.file_path())
                    }),
                    params: ParamId::all().map(|id| (id.key(), values.get(id))).collect(),
                }
            })
            .collect();

        Self {
            version: KIT_STATE_VERSION,
            parts,
        }
    }

    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StateError> {
        let state: Self = serde_json::from_str(json)?;
        if state.version == 0 || state.version > KIT_STATE_VERSION {
            return Err(StateError::UnsupportedVersion(state.version));
        }
        Ok(state)
    }

    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("saved kit to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, StateError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Push parameters into the engine, then reload both sample slots of
    /// every part. A missing or unreadable file keeps the current sample.
    pub fn apply(&self, handle: &EngineHandle, decoder: &dyn SampleDecoder) {
        for (part, state) in self.parts.iter().enumerate().take(NUM_PARTS) {
            for (key, &value) in &state.params {
                match ParamId::from_key(key) {
                    Some(id) => handle.set_param(part, id, value),
                    None => log::warn!("ignoring unknown parameter {key} on part {}", part + 1),
                }
            }

            for (slot, path) in state.sample_paths.iter().enumerate() {
                if let Some(path) = path {
                    handle.load_from_path(part, slot, path, decoder);
                }
            }
        }
    }
}

impl EngineHandle {
    pub fn save_state(&self) -> KitState {
        KitState::capture(self)
    }

    pub fn restore_state(&self, state: &KitState, decoder: &dyn SampleDecoder) {
        state.apply(self, decoder);
    }
}
