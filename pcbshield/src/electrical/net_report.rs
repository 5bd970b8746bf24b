//! Net Aggregator
//!
//! Walks every copper conductor once and sums resistance, voltage drop and
//! power loss per net. The safe current of a net is bounded by its
//! narrowest trace, so the IPC-2221 figure is kept as a running minimum.

use std::collections::BTreeMap;

use serde::Serialize;

use super::ipc2221::{Ipc2221Calculator, LayerPosition};
use super::{resistance, CU_THICKNESS_UM, MAX_TEMP_RISE_C, REFERENCE_CURRENT_A, RHO_CU};
use crate::board::{Board, Conductor, NetId, DEFAULT_NET_ID, DEFAULT_NET_NAME};
use crate::core::ShieldError;
use crate::format::format_number;
use crate::geometry::{length, Point};

/// Inputs of the report that are not part of the board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetReportOptions {
    /// Copper thickness in mm
    pub thickness_mm: f64,
    pub internal_layer: bool,
    /// Allowed temperature rise in °C
    pub temp_rise_c: f64,
    /// Resistivity in ohm metres
    pub rho_ohm_m: f64,
    /// Current the voltage drop and power loss are computed for. At 1 A the
    /// figures are per ampere.
    pub reference_current_a: f64,
}

impl Default for NetReportOptions {
    fn default() -> Self {
        Self::new(CU_THICKNESS_UM / 1000.0, true)
    }
}

impl NetReportOptions {
    pub fn new(thickness_mm: f64, internal_layer: bool) -> Self {
        Self {
            thickness_mm,
            internal_layer,
            temp_rise_c: MAX_TEMP_RISE_C,
            rho_ohm_m: RHO_CU,
            reference_current_a: REFERENCE_CURRENT_A,
        }
    }

    pub fn validate(&self) -> Result<(), ShieldError> {
        let positive = [
            ("thickness", self.thickness_mm),
            ("temperature rise", self.temp_rise_c),
            ("resistivity", self.rho_ohm_m),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ShieldError::InvalidParameter(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if !self.reference_current_a.is_finite() || self.reference_current_a < 0.0 {
            return Err(ShieldError::InvalidParameter(format!(
                "reference current must not be negative, got {}",
                self.reference_current_a
            )));
        }
        Ok(())
    }

    fn position(&self) -> LayerPosition {
        LayerPosition::from_internal(self.internal_layer)
    }
}

/// Accumulated electrical figures of one net.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetSummary {
    pub net_id: NetId,
    pub name: String,
    pub length_mm: f64,
    pub resistance_ohm: f64,
    pub voltage_drop_v: f64,
    pub power_loss_w: f64,
    /// Smallest IPC-2221 capacity over the net's traces; infinite when the
    /// net has none
    pub max_current_a: f64,
    pub trace_count: usize,
    pub min_width_mm: Option<f64>,
    /// Plan-view copper area in mm²
    pub copper_area_mm2: f64,
}

impl NetSummary {
    pub fn new(net_id: NetId, name: impl Into<String>) -> Self {
        Self {
            net_id,
            name: name.into(),
            length_mm: 0.0,
            resistance_ohm: 0.0,
            voltage_drop_v: 0.0,
            power_loss_w: 0.0,
            max_current_a: f64::INFINITY,
            trace_count: 0,
            min_width_mm: None,
            copper_area_mm2: 0.0,
        }
    }

    fn add_trace(&mut self, length_mm: f64, width_mm: f64, options: &NetReportOptions) {
        let r = resistance(
            length_mm / 1000.0,
            width_mm / 1000.0,
            options.thickness_mm / 1000.0,
            options.rho_ohm_m,
        );
        let v = r * options.reference_current_a;
        let p = v * options.reference_current_a;
        let capacity = Ipc2221Calculator::new(options.temp_rise_c).calculate_max_current(
            width_mm,
            options.thickness_mm,
            options.position(),
        );

        self.length_mm += length_mm;
        self.resistance_ohm += r;
        self.voltage_drop_v += v;
        self.power_loss_w += p;
        self.max_current_a = self.max_current_a.min(capacity);
        self.trace_count += 1;
        self.min_width_mm = Some(self.min_width_mm.map_or(width_mm, |w| w.min(width_mm)));
        self.copper_area_mm2 += length_mm * width_mm;
    }

    /// Count a trace that carries no current figures, e.g. one with zero width.
    fn add_length(&mut self, length_mm: f64) {
        self.length_mm += length_mm;
        self.trace_count += 1;
    }

    /// One table row with every figure passed through `format_number`.
    pub fn formatted_row(&self) -> [String; 6] {
        [
            self.name.clone(),
            format!("{}m", format_number(self.length_mm / 1000.0)),
            format!("{}Ohm", format_number(self.resistance_ohm)),
            format!("{}V", format_number(self.voltage_drop_v)),
            format!("{}W", format_number(self.power_loss_w)),
            format!("{}A", format_number(self.max_current_a)),
        ]
    }
}

/// A via seen during the scan. Vias add no resistance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViaInfo {
    pub net_id: NetId,
    pub position_mm: Point,
    pub drill_mm: f64,
    pub width_mm: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetReport {
    pub options: NetReportOptions,
    pub nets: BTreeMap<NetId, NetSummary>,
    pub vias: Vec<ViaInfo>,
}

impl NetReport {
    pub fn total_length_mm(&self) -> f64 {
        self.nets.values().map(|n| n.length_mm).sum()
    }

    /// Nets that have at least one trace, default net included when it does.
    pub fn routed_nets(&self) -> impl Iterator<Item = &NetSummary> {
        self.nets.values().filter(|n| n.trace_count > 0)
    }
}

/// Aggregate every conductor of `board` by net.
///
/// Net 0 ("default") is always present; conductors without a net are
/// counted there. A trace of zero width adds its length to its net but no
/// electrical figures. Fails when `options` does not validate.
pub fn compute_net_report<B: Board + ?Sized>(
    board: &B,
    options: &NetReportOptions,
) -> Result<NetReport, ShieldError> {
    options.validate()?;
    let units = board.units();
    let mut nets = BTreeMap::new();
    nets.insert(DEFAULT_NET_ID, NetSummary::new(DEFAULT_NET_ID, DEFAULT_NET_NAME));
    let mut vias = Vec::new();

    for conductor in board.tracks() {
        let (net_id, net_name) = match conductor.net() {
            Some(net) => (net.id, net.name.clone()),
            None => (DEFAULT_NET_ID, DEFAULT_NET_NAME.to_string()),
        };

        match conductor {
            Conductor::Via {
                position,
                drill,
                width,
                ..
            } => {
                let via = ViaInfo {
                    net_id,
                    position_mm: units.point_to_mm(position),
                    drill_mm: units.to_mm(drill),
                    width_mm: units.to_mm(width),
                };
                tracing::debug!(
                    "Via on net {} at ({:.3}, {:.3}) mm, drill {:.3} mm",
                    net_id,
                    via.position_mm.x,
                    via.position_mm.y,
                    via.drill_mm
                );
                vias.push(via);
            }
            Conductor::Trace {
                start, end, width, ..
            } => {
                let length_mm = length(&units, start, end);
                let width_mm = units.to_mm(width);
                let summary = nets
                    .entry(net_id)
                    .or_insert_with(|| NetSummary::new(net_id, net_name));
                if width_mm > 0.0 {
                    summary.add_trace(length_mm, width_mm, options);
                } else {
                    tracing::warn!("Zero-width trace on net {}: length only", net_id);
                    summary.add_length(length_mm);
                }
            }
        }
    }

    tracing::info!(
        "Net report: {} nets, {} vias",
        nets.len(),
        vias.len()
    );

    Ok(NetReport {
        options: options.clone(),
        nets,
        vias,
    })
}
