use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Gap kept between content and the canvas edge after framing.
    pub margin: f32,
    /// Fixed row used by the no-edges packer.
    pub row_y: f32,
    /// Horizontal gap between packed nodes.
    pub node_spacing: f32,
    /// Gap between consecutive ranks in layered layout.
    pub rank_spacing: f32,
    /// Gap between nodes sharing a rank.
    pub in_rank_spacing: f32,
    /// Median-ordering sweeps over the rank buckets.
    pub order_passes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 60.0,
            row_y: 120.0,
            node_spacing: 60.0,
            rank_spacing: 40.0,
            in_rank_spacing: 30.0,
            order_passes: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapConfig {
    /// How close an edge/center must be to a guideline before it snaps.
    pub snap_distance: f32,
    /// Cumulative pointer travel required before snap logic engages at all,
    /// so small deliberate nudges are not fought.
    pub movement_threshold: f32,
    /// Only shapes whose center lies within this radius of the dragged shape
    /// contribute guideline candidates.
    pub search_radius: f32,
    pub max_guidelines: usize,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            snap_distance: 10.0,
            movement_threshold: 15.0,
            search_radius: 400.0,
            max_guidelines: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectConfig {
    /// Show corner anchors in addition to the four side midpoints.
    pub include_corners: bool,
    pub marker_size: f32,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            include_corners: false,
            marker_size: 6.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub layout: LayoutConfig,
    pub snap: SnapConfig,
    pub connect: ConnectConfig,
    pub theme: Theme,
}

// Partial overlay file: every field optional, unset values keep defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    theme: Option<String>,
    layout: Option<LayoutSection>,
    snap: Option<SnapSection>,
    connect: Option<ConnectSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LayoutSection {
    margin: Option<f32>,
    row_y: Option<f32>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    in_rank_spacing: Option<f32>,
    order_passes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SnapSection {
    snap_distance: Option<f32>,
    movement_threshold: Option<f32>,
    search_radius: Option<f32>,
    max_guidelines: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConnectSection {
    include_corners: Option<bool>,
    marker_size: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "audit" || theme_name == "default" {
            config.theme = Theme::audit_default();
        }
    }

    if let Some(section) = parsed.layout {
        if let Some(v) = section.margin {
            config.layout.margin = v;
        }
        if let Some(v) = section.row_y {
            config.layout.row_y = v;
        }
        if let Some(v) = section.node_spacing {
            config.layout.node_spacing = v;
        }
        if let Some(v) = section.rank_spacing {
            config.layout.rank_spacing = v;
        }
        if let Some(v) = section.in_rank_spacing {
            config.layout.in_rank_spacing = v;
        }
        if let Some(v) = section.order_passes {
            config.layout.order_passes = v;
        }
    }

    if let Some(section) = parsed.snap {
        if let Some(v) = section.snap_distance {
            config.snap.snap_distance = v;
        }
        if let Some(v) = section.movement_threshold {
            config.snap.movement_threshold = v;
        }
        if let Some(v) = section.search_radius {
            config.snap.search_radius = v;
        }
        if let Some(v) = section.max_guidelines {
            config.snap.max_guidelines = v;
        }
    }

    if let Some(section) = parsed.connect {
        if let Some(v) = section.include_corners {
            config.connect.include_corners = v;
        }
        if let Some(v) = section.marker_size {
            config.connect.marker_size = v;
        }
    }

    Ok(config)
}
