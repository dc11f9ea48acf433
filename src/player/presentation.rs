use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    animation::timing::TimingFunction,
    foundation::error::{SoziError, SoziResult},
    view::camera::Layer,
    view::state::{ElementOffset, StoredCameraState},
};

/// Layer key whose frame properties apply to layers added after the frame was saved.
pub const AUTO_LAYER_KEY: &str = "__sozi_auto__";

/// Player-wide defaults and gesture steps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerSettings {
    /// Duration of transitions that do not use frame properties.
    pub default_transition_duration_ms: f64,
    pub default_timing_function: TimingFunction,
    pub default_relative_zoom: f64,
    /// Zoom factor of one wheel notch.
    pub scale_factor: f64,
    /// Rotation of one step, in degrees.
    pub rotate_step: f64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            default_transition_duration_ms: 500.0,
            default_timing_function: TimingFunction::Ease,
            default_relative_zoom: 0.0,
            scale_factor: 1.05,
            rotate_step: 5.0,
        }
    }
}

impl PlayerSettings {
    pub fn validate(&self) -> SoziResult<()> {
        if !(self.default_transition_duration_ms.is_finite()
            && self.default_transition_duration_ms >= 0.0)
        {
            return Err(SoziError::validation(
                "default transition duration must be finite and >= 0",
            ));
        }
        if !self.default_relative_zoom.is_finite() {
            return Err(SoziError::validation("default relative zoom must be finite"));
        }
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(SoziError::validation("scale factor must be finite and > 0"));
        }
        if !self.rotate_step.is_finite() {
            return Err(SoziError::validation("rotate step must be finite"));
        }
        Ok(())
    }
}

/// How one layer enters a frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerProperties {
    pub transition_timing_function: TimingFunction,
    pub transition_relative_zoom: f64,
    /// Path element the camera center follows during the transition.
    pub transition_path_id: Option<String>,
    /// Element the camera state was framed on; the stored offset is relative to it.
    pub reference_element_id: Option<String>,
    pub outline_element_id: Option<String>,
}

impl LayerProperties {
    pub fn transition_path_id(&self) -> Option<&str> {
        non_empty(&self.transition_path_id)
    }

    pub fn reference_element_id(&self) -> Option<&str> {
        non_empty(&self.reference_element_id)
    }

    pub fn outline_element_id(&self) -> Option<&str> {
        non_empty(&self.outline_element_id)
    }
}

fn non_empty(id: &Option<String>) -> Option<&str> {
    id.as_deref().filter(|s| !s.is_empty())
}

/// One step of the presentation: a camera state per layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Frame {
    pub frame_id: String,
    pub title: String,
    /// Duration of the transition that leads into this frame.
    pub transition_duration_ms: f64,
    pub layer_properties: BTreeMap<String, LayerProperties>,
    pub camera_states: BTreeMap<String, StoredCameraState>,
    pub camera_offsets: BTreeMap<String, ElementOffset>,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            frame_id: String::new(),
            title: String::new(),
            transition_duration_ms: 1000.0,
            layer_properties: BTreeMap::new(),
            camera_states: BTreeMap::new(),
            camera_offsets: BTreeMap::new(),
        }
    }
}

impl Frame {
    fn resolve_key<'a>(&self, layer_key: &'a str) -> &'a str {
        if self.layer_properties.contains_key(layer_key)
            || self.camera_states.contains_key(layer_key)
        {
            layer_key
        } else {
            AUTO_LAYER_KEY
        }
    }

    /// Properties of `layer_key`, falling back to the auto layer, then to defaults.
    pub fn properties_for(&self, layer_key: &str) -> LayerProperties {
        self.layer_properties
            .get(self.resolve_key(layer_key))
            .cloned()
            .unwrap_or_default()
    }

    pub fn stored_state_for(&self, layer_key: &str) -> Option<&StoredCameraState> {
        self.camera_states.get(self.resolve_key(layer_key))
    }

    pub fn offset_for(&self, layer_key: &str) -> ElementOffset {
        self.camera_offsets
            .get(self.resolve_key(layer_key))
            .copied()
            .unwrap_or_default()
    }
}

/// Layers and frames of a presentation, as stored next to the SVG.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub layers: Vec<Layer>,
    pub frames: Vec<Frame>,
}

impl Presentation {
    pub fn from_json(text: &str) -> SoziResult<Self> {
        let presentation: Self = serde_json::from_str(text)?;
        presentation.validate()?;
        Ok(presentation)
    }

    pub fn to_json(&self) -> SoziResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> SoziResult<()> {
        if self.layers.is_empty() {
            return Err(SoziError::validation("presentation has no layers"));
        }
        if self.frames.is_empty() {
            return Err(SoziError::validation("presentation has no frames"));
        }

        let mut keys = HashSet::new();
        for layer in &self.layers {
            if layer.key.is_empty() || layer.key == AUTO_LAYER_KEY {
                return Err(SoziError::validation(format!(
                    "invalid layer key '{}'",
                    layer.key
                )));
            }
            if !keys.insert(layer.key.as_str()) {
                return Err(SoziError::validation(format!(
                    "duplicate layer key '{}'",
                    layer.key
                )));
            }
            if layer.node_ids.is_empty() {
                return Err(SoziError::validation(format!(
                    "layer '{}' has no nodes",
                    layer.key
                )));
            }
        }

        let mut frame_ids = HashSet::new();
        for (index, frame) in self.frames.iter().enumerate() {
            if !frame.frame_id.is_empty() && !frame_ids.insert(frame.frame_id.as_str()) {
                return Err(SoziError::validation(format!(
                    "duplicate frame id '{}'",
                    frame.frame_id
                )));
            }
            if !(frame.transition_duration_ms.is_finite() && frame.transition_duration_ms >= 0.0) {
                return Err(SoziError::validation(format!(
                    "frame {index}: transition duration must be finite and >= 0"
                )));
            }
            for (key, props) in &frame.layer_properties {
                if !props.transition_relative_zoom.is_finite() {
                    return Err(SoziError::validation(format!(
                        "frame {index}, layer '{key}': relative zoom must be finite"
                    )));
                }
            }
            for (key, stored) in &frame.camera_states {
                let finite = [
                    stored.cx,
                    stored.cy,
                    stored.width,
                    stored.height,
                    stored.angle,
                    stored.clip_x_offset,
                    stored.clip_y_offset,
                    stored.clip_width_factor,
                    stored.clip_height_factor,
                ]
                .into_iter()
                .flatten()
                .all(f64::is_finite);
                if !finite {
                    return Err(SoziError::validation(format!(
                        "frame {index}, layer '{key}': camera state has non-finite values"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn frame_index(&self, frame_id: &str) -> Option<usize> {
        self.frames.iter().position(|f| f.frame_id == frame_id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/presentation.rs"]
mod tests;
