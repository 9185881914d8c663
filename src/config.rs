use std::path::Path;

use serde::{Deserialize, Serialize};

/// Spacing and sizing constants for the flow layout, in abstract layout
/// units. Callers targeting a different rendering surface tune these rather
/// than the algorithm; partial JSON override files fill the rest from the
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap between adjacent columns.
    pub horizontal_sep: f32,
    /// Gap between stacked siblings in one column.
    pub vertical_sep: f32,
    /// Horizontal offset of an expanded sub-process interior from its
    /// parent box.
    pub child_offset: f32,
    pub node_width: f32,
    pub node_height: f32,
    /// Diameter of the round start/end markers.
    pub event_size: f32,
    /// Diameter of the round gateway nodes.
    pub gateway_size: f32,
    /// Leftward correction applied to gateway x so fan-out/fan-in edges
    /// meet at the gateway center. Empirical rendering constant, not an
    /// algorithmic invariant.
    pub gateway_nudge: f32,
    /// Extra distance keeping the end marker right of everything else.
    pub end_pin_extra: f32,
    /// Row height of one instance line inside a topology role group.
    pub instance_row_height: f32,
    /// Inner padding of a topology role group box.
    pub group_padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_sep: 100.0,
            vertical_sep: 26.0,
            child_offset: 70.0,
            node_width: 280.0,
            node_height: 44.0,
            event_size: 44.0,
            gateway_size: 34.0,
            gateway_nudge: 8.0,
            end_pin_extra: 60.0,
            instance_row_height: 32.0,
            group_padding: 12.0,
        }
    }
}

/// Loads a config override file; `None` yields the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let raw = std::fs::read_to_string(path)?;
    let config = serde_json::from_str(&raw)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let config: LayoutConfig = serde_json::from_str(r#"{ "horizontal_sep": 48.0 }"#).unwrap();
        assert_eq!(config.horizontal_sep, 48.0);
        assert_eq!(config.node_width, LayoutConfig::default().node_width);
    }
}
