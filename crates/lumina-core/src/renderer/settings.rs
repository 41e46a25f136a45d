// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! User-facing configuration for the lighting effect.

use crate::math::{LinearRgba, Vec4};
use serde::{Deserialize, Serialize};

/// How the effect is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Drawing happens on the immediate context; output targets are set elsewhere.
    #[default]
    SingleThread,
    /// Drawing happens on deferred contexts; the effect rebinds output targets each frame.
    MultiThread,
}

/// Settings for the clustered forward effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    /// The render mode.
    pub render_mode: RenderMode,
    /// The initial global ambient color.
    pub ambient: LinearRgba,
    /// The initial clip plane coefficients.
    pub clip_plane: Vec4,
    /// The path of the precompiled shader.
    pub shader_path: String,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::SingleThread,
            ambient: LinearRgba::DEFAULT_AMBIENT,
            clip_plane: Vec4::new(-1.0, -1.0, -1.0, 1000.0),
            shader_path: "shaders/clustered_forward.cso".to_string(),
        }
    }
}

impl EffectSettings {
    /// Parses settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the settings to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let settings = EffectSettings::from_json(r#"{ "render_mode": "multi_thread" }"#)
            .expect("valid settings");
        assert_eq!(settings.render_mode, RenderMode::MultiThread);
        assert_eq!(settings.ambient, LinearRgba::DEFAULT_AMBIENT);
        assert_eq!(settings.clip_plane, Vec4::new(-1.0, -1.0, -1.0, 1000.0));
    }

    #[test]
    fn json_roundtrip_keeps_values() {
        let settings = EffectSettings {
            ambient: LinearRgba::rgb(0.2, 0.3, 0.4),
            shader_path: "forward.cso".to_string(),
            ..Default::default()
        };
        let json = settings.to_json().expect("serializable");
        assert_eq!(EffectSettings::from_json(&json).expect("parsable"), settings);
    }

    #[test]
    fn unknown_render_mode_is_rejected() {
        assert!(EffectSettings::from_json(r#"{ "render_mode": "deferred" }"#).is_err());
    }
}
