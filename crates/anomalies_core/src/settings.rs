//! Persisted scope settings.
//!
//! Stored as a small JSON object with the keys `lissajous`, `showstats`,
//! `width` and `height`. Flags are written as the integers 0/1 and read back
//! from either integers or booleans. Missing keys keep their defaults.

use crate::error::AnomaliesError;
use crate::scope::{CaptureMode, Scope};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeSettings {
    #[serde(serialize_with = "write_flag", deserialize_with = "read_flag")]
    pub lissajous: bool,
    #[serde(
        rename = "showstats",
        serialize_with = "write_flag",
        deserialize_with = "read_flag"
    )]
    pub show_stats: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
}

impl Default for ScopeSettings {
    fn default() -> Self {
        Self {
            lissajous: true,
            show_stats: false,
            width: None,
            height: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

fn read_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
    })
}

fn write_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

impl ScopeSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(text)
            .map_err(AnomaliesError::from)
            .context("Failed to decode scope settings.")?;
        log::debug!("loaded scope settings {:?}", settings);
        Ok(settings)
    }

    /// Like [`ScopeSettings::from_json`], but a patch with unreadable settings
    /// still loads, with the scope back at its reset state.
    pub fn from_json_or_default(text: &str) -> Self {
        Self::from_json(text).unwrap_or_else(|err| {
            log::warn!("{err:#}; falling back to defaults");
            Self::default()
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(AnomaliesError::from)
            .context("Failed to encode scope settings.")
    }

    pub fn capture_mode(&self) -> CaptureMode {
        if self.lissajous {
            CaptureMode::Lissajous
        } else {
            CaptureMode::Triggered
        }
    }

    /// Copies the persisted mode back from a running scope.
    pub fn sync_from(&mut self, scope: &Scope) {
        self.lissajous = scope.mode() == CaptureMode::Lissajous;
    }

    pub fn apply_to(&self, scope: &mut Scope) {
        scope.set_mode(self.capture_mode());
    }
}
