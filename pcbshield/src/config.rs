//! Tool settings
//!
//! Everything a dialog would normally collect, as plain serde structures.
//! All fields have defaults so a partial JSON file is enough.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::ShieldError;
use crate::electrical::net_report::NetReportOptions;
use crate::electrical::{CU_THICKNESS_UM, MAX_TEMP_RISE_C, REFERENCE_CURRENT_A, RHO_CU};
use crate::geometry::Offsets;

pub const DEFAULT_OFFSET_LEFT_MM: f64 = 5.0;
pub const DEFAULT_OFFSET_RIGHT_MM: f64 = 5.0;
pub const DEFAULT_OFFSET_TOP_MM: f64 = 1.0;
pub const DEFAULT_OFFSET_BOTTOM_MM: f64 = 1.0;
pub const DEFAULT_LINE_WIDTH_MM: f64 = 0.3;
pub const DEFAULT_LINE_ANGLE_DEG: f64 = 45.0;
/// Pitch used when none is given, as a multiple of the line width
pub const DEFAULT_PITCH_FACTOR: f64 = 10.0;
pub const DEFAULT_SOURCE_LAYER: &str = "Edge.Cuts";
pub const DEFAULT_TARGET_LAYER: &str = "F.Fab";

/// Where the layer legend starts, in mm
pub const LEGEND_ORIGIN_MM: (f64, f64) = (30.0, 100.0);
pub const LEGEND_SPACING_MM: f64 = 8.0;

/// Hash shielding settings. Lengths are in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldConfig {
    pub offset_left_mm: f64,
    pub offset_right_mm: f64,
    pub offset_top_mm: f64,
    pub offset_bottom_mm: f64,
    pub line_width_mm: f64,
    /// `None` means `DEFAULT_PITCH_FACTOR` times the line width
    pub pitch_mm: Option<f64>,
    pub angle_deg: f64,
    /// Layer whose drawings define the area to shield
    pub source_layer: String,
    pub target_layer: String,
    pub replace_existing: bool,
    pub layer_legend: bool,
    pub label: Option<String>,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            offset_left_mm: DEFAULT_OFFSET_LEFT_MM,
            offset_right_mm: DEFAULT_OFFSET_RIGHT_MM,
            offset_top_mm: DEFAULT_OFFSET_TOP_MM,
            offset_bottom_mm: DEFAULT_OFFSET_BOTTOM_MM,
            line_width_mm: DEFAULT_LINE_WIDTH_MM,
            pitch_mm: None,
            angle_deg: DEFAULT_LINE_ANGLE_DEG,
            source_layer: DEFAULT_SOURCE_LAYER.to_string(),
            target_layer: DEFAULT_TARGET_LAYER.to_string(),
            replace_existing: true,
            layer_legend: false,
            label: None,
        }
    }
}

impl ShieldConfig {
    pub fn effective_pitch_mm(&self) -> f64 {
        self.pitch_mm
            .unwrap_or(self.line_width_mm * DEFAULT_PITCH_FACTOR)
    }

    pub fn offsets_mm(&self) -> Offsets {
        Offsets::new(
            self.offset_left_mm,
            self.offset_right_mm,
            self.offset_top_mm,
            self.offset_bottom_mm,
        )
    }
}

/// Trace report settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceInfoConfig {
    /// Copper thickness in micrometres (18, 35 and 70 are the usual choices)
    pub thickness_um: f64,
    pub internal_layer: bool,
    pub temp_rise_c: f64,
    /// Copper resistivity in ohm metres
    pub rho_ohm_m: f64,
    pub reference_current_a: f64,
}

impl Default for TraceInfoConfig {
    fn default() -> Self {
        Self {
            thickness_um: CU_THICKNESS_UM,
            internal_layer: true,
            temp_rise_c: MAX_TEMP_RISE_C,
            rho_ohm_m: RHO_CU,
            reference_current_a: REFERENCE_CURRENT_A,
        }
    }
}

impl TraceInfoConfig {
    pub fn options(&self) -> NetReportOptions {
        NetReportOptions {
            thickness_mm: self.thickness_um / 1000.0,
            internal_layer: self.internal_layer,
            temp_rise_c: self.temp_rise_c,
            rho_ohm_m: self.rho_ohm_m,
            reference_current_a: self.reference_current_a,
        }
    }
}

/// Settings for both tools.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub shield: ShieldConfig,
    pub trace_info: TraceInfoConfig,
}

impl ToolsConfig {
    pub fn from_json_str(content: &str) -> Result<Self, ShieldError> {
        serde_json::from_str(content).map_err(|e| ShieldError::Config(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ShieldError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
