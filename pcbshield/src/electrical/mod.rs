//! Trace electrical characteristics
//!
//! Resistance from copper geometry, the IPC-2221 current capacity model and
//! the per-net aggregation built on both.

pub mod ipc2221;
pub mod net_report;

pub use ipc2221::*;
pub use net_report::*;

use crate::geometry::{length, Point, Units};

/// Copper resistivity (Ω·m)
pub const RHO_CU: f64 = 1.72e-8;
/// Default copper thickness in µm
pub const CU_THICKNESS_UM: f64 = 18.0;
/// Copper thickness presets offered for the report, in µm
pub const CU_THICKNESS_CHOICES_UM: [f64; 3] = [18.0, 35.0, 70.0];
/// Default allowed temperature rise (°C)
pub const MAX_TEMP_RISE_C: f64 = 20.0;
/// Current used for voltage drop and power loss figures
pub const REFERENCE_CURRENT_A: f64 = 1.0;

/// R = ρL / (W·T), all SI units.
pub fn resistance(length_m: f64, width_m: f64, thickness_m: f64, rho: f64) -> f64 {
    (rho * length_m) / (width_m * thickness_m)
}

/// Resistance of a straight trace between two board points.
///
/// `width_m` and `thickness_m` are in metres; the length comes from the
/// board coordinates through `units`.
pub fn calculate_resistance(
    units: &Units,
    start: Point,
    end: Point,
    width_m: f64,
    thickness_m: f64,
    rho: f64,
) -> f64 {
    let length_m = length(units, start, end) / 1000.0;
    resistance(length_m, width_m, thickness_m, rho)
}

/// Plan-view copper area of a trace in mm². `width` is in board units.
pub fn calculate_area(units: &Units, start: Point, end: Point, width: f64) -> f64 {
    length(units, start, end) * units.to_mm(width)
}
