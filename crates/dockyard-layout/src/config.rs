//! Global layout configuration (`global` block of the layout document).
//!
//! Every key has a default, so a document may omit the block entirely. Node
//! attributes override these defaults where present. Keys this version does
//! not know about are kept in `extensions` and written back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::node::{CloseType, TabLocation};

/// Model-wide defaults and geometry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalConfig {
    /// Thickness of row and tile splitters in pixels.
    pub splitter_size: f64,
    pub tab_close_type: CloseType,
    pub tab_enable_close: bool,
    pub tab_enable_drag: bool,
    pub tab_enable_rename: bool,
    pub tab_enable_float: bool,
    #[serde(rename = "tabSetEnableDrop")]
    pub tabset_enable_drop: bool,
    #[serde(rename = "tabSetEnableDrag")]
    pub tabset_enable_drag: bool,
    #[serde(rename = "tabSetEnableDivide")]
    pub tabset_enable_divide: bool,
    #[serde(rename = "tabSetEnableMaximize")]
    pub tabset_enable_maximize: bool,
    #[serde(rename = "tabSetEnableTabStrip")]
    pub tabset_enable_tab_strip: bool,
    #[serde(rename = "tabSetEnableDeleteWhenEmpty")]
    pub tabset_enable_delete_when_empty: bool,
    #[serde(rename = "tabSetAutoSelectTab")]
    pub tabset_auto_select_tab: bool,
    #[serde(rename = "tabSetTabLocation")]
    pub tabset_tab_location: TabLocation,
    #[serde(rename = "tabSetTabStripHeight")]
    pub tabset_tab_strip_height: f64,
    #[serde(rename = "tabSetMinWidth")]
    pub tabset_min_width: f64,
    #[serde(rename = "tabSetMinHeight")]
    pub tabset_min_height: f64,
    /// `0` means unbounded.
    #[serde(rename = "tabSetMaxWidth")]
    pub tabset_max_width: f64,
    /// `0` means unbounded.
    #[serde(rename = "tabSetMaxHeight")]
    pub tabset_max_height: f64,
    pub border_size: f64,
    pub border_min_size: f64,
    /// `0` means unbounded.
    pub border_max_size: f64,
    /// Thickness of a border's tab strip.
    pub border_bar_size: f64,
    pub border_enable_drop: bool,
    pub border_auto_select_tab_when_open: bool,
    pub border_enable_auto_hide: bool,
    pub border_max_tiles: usize,
    pub root_orientation_vertical: bool,
    /// Allow drops against the outer edges of the root row.
    pub enable_edge_dock: bool,
    /// Distance from the root edge, in pixels, that counts as an edge drop.
    pub edge_dock_threshold: f64,
    pub float_default_width: f64,
    pub float_default_height: f64,
    /// Forward-compatible extension bag.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            splitter_size: 8.0,
            tab_close_type: CloseType::Always,
            tab_enable_close: true,
            tab_enable_drag: true,
            tab_enable_rename: true,
            tab_enable_float: true,
            tabset_enable_drop: true,
            tabset_enable_drag: true,
            tabset_enable_divide: true,
            tabset_enable_maximize: true,
            tabset_enable_tab_strip: true,
            tabset_enable_delete_when_empty: true,
            tabset_auto_select_tab: true,
            tabset_tab_location: TabLocation::Top,
            tabset_tab_strip_height: 26.0,
            tabset_min_width: 0.0,
            tabset_min_height: 0.0,
            tabset_max_width: 0.0,
            tabset_max_height: 0.0,
            border_size: 200.0,
            border_min_size: 0.0,
            border_max_size: 0.0,
            border_bar_size: 30.0,
            border_enable_drop: true,
            border_auto_select_tab_when_open: true,
            border_enable_auto_hide: false,
            border_max_tiles: 4,
            root_orientation_vertical: false,
            enable_edge_dock: true,
            edge_dock_threshold: 10.0,
            float_default_width: 400.0,
            float_default_height: 300.0,
            extensions: Map::new(),
        }
    }
}

impl GlobalConfig {
    /// Merge a JSON object of camelCase keys into this configuration.
    ///
    /// The merge is all-or-nothing: on a type error `self` is unchanged.
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(target) = &mut value {
            for (key, patch_value) in patch {
                let _ = target.insert(key.clone(), patch_value.clone());
            }
        }
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_keys_take_defaults() {
        let config: GlobalConfig = serde_json::from_value(json!({"splitterSize": 4})).unwrap();
        assert_eq!(config.splitter_size, 4.0);
        assert_eq!(config.border_bar_size, 30.0);
        assert!(config.tabset_enable_divide);
    }

    #[test]
    fn unknown_keys_round_trip() {
        let config: GlobalConfig =
            serde_json::from_value(json!({"futureFlag": {"nested": [1, 2]}})).unwrap();
        assert_eq!(config.extensions.get("futureFlag"), Some(&json!({"nested": [1, 2]})));
        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["futureFlag"], json!({"nested": [1, 2]}));
    }

    #[test]
    fn tabset_keys_use_tab_set_spelling() {
        let value = serde_json::to_value(GlobalConfig::default()).unwrap();
        assert!(value.get("tabSetEnableDrop").is_some());
        assert!(value.get("tabsetEnableDrop").is_none());
    }

    #[test]
    fn merge_is_all_or_nothing() {
        let config = GlobalConfig::default();
        let mut patch = Map::new();
        patch.insert("rootOrientationVertical".into(), json!(true));
        let merged = config.merged(&patch).unwrap();
        assert!(merged.root_orientation_vertical);

        patch.insert("splitterSize".into(), json!("wide"));
        assert!(config.merged(&patch).is_err());
    }
}
