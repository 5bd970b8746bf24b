//! IPC-2221 Current Carrying Capacity
//!
//! Curve fit from IPC-2221 relating trace current to temperature rise and
//! copper cross-section:
//!
//! I = k × ΔT^b × A^c
//!
//! with A = W × T in square mils. `k` is 0.024 for internal layers and
//! 0.048 for external layers, which dissipate heat better.
//!
//! [`Ipc2221Calculator::calculate_max_current`] and
//! [`Ipc2221Calculator::calculate_required_width`] are exact inverses of
//! each other for fixed thickness, temperature rise and layer type.

use serde::{Deserialize, Serialize};

/// IPC-2221 Constants for internal layers
pub const IPC2221_INTERNAL_K: f64 = 0.024;
/// IPC-2221 Constants for external layers
pub const IPC2221_EXTERNAL_K: f64 = 0.048;
/// Temperature rise exponent
pub const IPC2221_B: f64 = 0.44;
/// Cross-section exponent
pub const IPC2221_C: f64 = 0.725;

const MM_PER_MIL: f64 = 0.0254;

/// Where a trace sits in the stackup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerPosition {
    Internal,
    External,
}

impl LayerPosition {
    pub fn from_internal(internal: bool) -> Self {
        if internal {
            LayerPosition::Internal
        } else {
            LayerPosition::External
        }
    }

    /// Curve-fit scale factor `k`
    pub fn capacity_scale(&self) -> f64 {
        match self {
            LayerPosition::Internal => IPC2221_INTERNAL_K,
            LayerPosition::External => IPC2221_EXTERNAL_K,
        }
    }
}

/// Common copper foil weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopperWeight {
    HalfOz,    // 18 µm
    OneOz,     // 35 µm
    TwoOz,     // 70 µm
    ThreeOz,   // 105 µm
}

impl CopperWeight {
    pub fn thickness_um(&self) -> f64 {
        match self {
            CopperWeight::HalfOz => 18.0,
            CopperWeight::OneOz => 35.0,
            CopperWeight::TwoOz => 70.0,
            CopperWeight::ThreeOz => 105.0,
        }
    }

    pub fn thickness_mm(&self) -> f64 {
        self.thickness_um() / 1000.0
    }

    /// Weight in oz/ft²
    pub fn weight_oz(&self) -> f64 {
        match self {
            CopperWeight::HalfOz => 0.5,
            CopperWeight::OneOz => 1.0,
            CopperWeight::TwoOz => 2.0,
            CopperWeight::ThreeOz => 3.0,
        }
    }

    /// Nearest standard weight for a foil thickness
    pub fn from_um(um: f64) -> Self {
        if um <= 26.5 {
            CopperWeight::HalfOz
        } else if um <= 52.5 {
            CopperWeight::OneOz
        } else if um <= 87.5 {
            CopperWeight::TwoOz
        } else {
            CopperWeight::ThreeOz
        }
    }
}

/// Calculator bound to one allowed temperature rise.
#[derive(Debug, Clone)]
pub struct Ipc2221Calculator {
    /// Allowed temperature rise in °C
    pub temp_rise_c: f64,
}

impl Default for Ipc2221Calculator {
    fn default() -> Self {
        Self {
            temp_rise_c: super::MAX_TEMP_RISE_C,
        }
    }
}

impl Ipc2221Calculator {
    pub fn new(temp_rise_c: f64) -> Self {
        Self { temp_rise_c }
    }

    /// Maximum current in amperes for a trace of the given width and
    /// thickness (both mm).
    pub fn calculate_max_current(
        &self,
        width_mm: f64,
        thickness_mm: f64,
        position: LayerPosition,
    ) -> f64 {
        let area_mils2 = (width_mm / MM_PER_MIL) * (thickness_mm / MM_PER_MIL);
        position.capacity_scale() * self.temp_rise_c.powf(IPC2221_B) * area_mils2.powf(IPC2221_C)
    }

    /// Trace width in mm needed to carry `current_a`.
    pub fn calculate_required_width(
        &self,
        current_a: f64,
        thickness_mm: f64,
        position: LayerPosition,
    ) -> f64 {
        // A = (I / (k × ΔT^b))^(1/c)
        let area_mils2 = (current_a
            / (position.capacity_scale() * self.temp_rise_c.powf(IPC2221_B)))
        .powf(1.0 / IPC2221_C);

        let width_mils = area_mils2 / (thickness_mm / MM_PER_MIL);
        width_mils * MM_PER_MIL
    }

    /// Temperature rise in °C when `current_a` flows through the trace.
    pub fn calculate_temp_rise(
        &self,
        current_a: f64,
        width_mm: f64,
        thickness_mm: f64,
        position: LayerPosition,
    ) -> f64 {
        let area_mils2 = (width_mm / MM_PER_MIL) * (thickness_mm / MM_PER_MIL);

        // ΔT = (I / (k × A^c))^(1/b)
        (current_a / (position.capacity_scale() * area_mils2.powf(IPC2221_C))).powf(1.0 / IPC2221_B)
    }
}

/// Maximum current for a trace, using an explicit temperature rise.
pub fn calculate_max_current(width_mm: f64, thickness_mm: f64, temp_rise_c: f64, internal: bool) -> f64 {
    Ipc2221Calculator::new(temp_rise_c).calculate_max_current(
        width_mm,
        thickness_mm,
        LayerPosition::from_internal(internal),
    )
}

/// Trace width needed for a current; inverse of [`calculate_max_current`].
pub fn calculate_required_width(current_a: f64, thickness_mm: f64, temp_rise_c: f64, internal: bool) -> f64 {
    Ipc2221Calculator::new(temp_rise_c).calculate_required_width(
        current_a,
        thickness_mm,
        LayerPosition::from_internal(internal),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copper_weight_thickness() {
        assert!((CopperWeight::OneOz.thickness_mm() - 0.035).abs() < 1e-12);
        assert!((CopperWeight::TwoOz.thickness_mm() - 0.070).abs() < 1e-12);
        assert_eq!(CopperWeight::from_um(18.0), CopperWeight::HalfOz);
        assert_eq!(CopperWeight::from_um(35.0), CopperWeight::OneOz);
        assert_eq!(CopperWeight::from_um(70.0), CopperWeight::TwoOz);
        assert_eq!(CopperWeight::from_um(18.0).weight_oz(), 0.5);
        assert_eq!(CopperWeight::ThreeOz.weight_oz(), 3.0);
    }

    #[test]
    fn test_max_current_calculation() {
        let calc = Ipc2221Calculator::new(10.0);

        // 10 mil trace, 1 oz copper, 10°C rise, external
        let current = calc.calculate_max_current(0.254, 0.035, LayerPosition::External);
        assert!(current > 0.3 && current < 2.0, "Current: {}", current);
    }

    #[test]
    fn test_width_and_current_are_inverse() {
        for internal in [true, false] {
            for thickness in [0.018, 0.035, 0.070] {
                let mut width = 0.1;
                while width <= 5.0 {
                    let current = calculate_max_current(width, thickness, 20.0, internal);
                    let back = calculate_required_width(current, thickness, 20.0, internal);
                    assert!(
                        ((back - width) / width).abs() < 1e-3,
                        "width {} -> {} A -> {}",
                        width,
                        current,
                        back
                    );
                    width += 0.1;
                }
            }
        }
    }

    #[test]
    fn test_temp_rise_inverse() {
        let calc = Ipc2221Calculator::new(20.0);
        let current = calc.calculate_max_current(0.5, 0.035, LayerPosition::Internal);
        let rise = calc.calculate_temp_rise(current, 0.5, 0.035, LayerPosition::Internal);
        assert!((rise - 20.0).abs() < 1e-9, "Temp rise: {}", rise);
    }

    #[test]
    fn test_internal_vs_external() {
        let external = calculate_max_current(0.5, 0.035, 10.0, false);
        let internal = calculate_max_current(0.5, 0.035, 10.0, true);

        assert!(external > internal);
        assert!((external / internal - 2.0).abs() < 1e-12);
    }
}
