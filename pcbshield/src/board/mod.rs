//! Board Adapter
//!
//! The layout editor owns the board document. The tools only see it through
//! the [`Board`] trait: an ordered list of drawings, the copper conductors,
//! the layer table, unit conversion and a handful of mutation primitives.
//!
//! [`MemoryBoard`] is a self-contained implementation used by the CLI and the
//! tests.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rectangle, Units};

pub use memory::MemoryBoard;

/// Layer identifier as used by the host (KiCad ordinal).
pub type LayerId = u32;

/// Handle of a drawing inside a board document.
pub type DrawingId = u64;

/// Net identifier; 0 is the unconnected/default net.
pub type NetId = u32;

/// Net used for conductors without a net.
pub const DEFAULT_NET_ID: NetId = 0;
pub const DEFAULT_NET_NAME: &str = "default";

/// Layer table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A straight graphic line to be placed on a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub width: f64,
    pub layer: LayerId,
    /// Free-form debug tag, e.g. `border-top` or `hash-a-3`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Segment {
    pub fn new(start: Point, end: Point, width: f64, layer: LayerId) -> Self {
        Self {
            start,
            end,
            width,
            layer,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Geometry of a drawing item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawingKind {
    /// Straight line segment
    Segment {
        start: Point,
        end: Point,
        width: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Text {
        position: Point,
        text: String,
    },
    /// Arcs, circles, polygons and anything else; only the extent matters here
    Shape {
        bounds: Rectangle,
    },
}

/// One item of the board's drawing list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub id: DrawingId,
    pub layer: LayerId,
    pub kind: DrawingKind,
}

impl Drawing {
    pub fn is_segment(&self) -> bool {
        matches!(self.kind, DrawingKind::Segment { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            DrawingKind::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Extent of the item, ignoring line width.
    pub fn bounds(&self) -> Option<Rectangle> {
        match &self.kind {
            DrawingKind::Segment { start, end, .. } => Rectangle::from_points([*start, *end]),
            DrawingKind::Shape { bounds } => Some(*bounds),
            DrawingKind::Text { .. } => None,
        }
    }
}

/// Net membership of a conductor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetRef {
    pub id: NetId,
    pub name: String,
}

impl NetRef {
    pub fn new(id: NetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Copper item on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Conductor {
    Via {
        position: Point,
        drill: f64,
        width: f64,
        #[serde(default)]
        net: Option<NetRef>,
    },
    Trace {
        start: Point,
        end: Point,
        width: f64,
        layer: LayerId,
        #[serde(default)]
        net: Option<NetRef>,
    },
}

impl Conductor {
    pub fn net(&self) -> Option<&NetRef> {
        match self {
            Conductor::Via { net, .. } | Conductor::Trace { net, .. } => net.as_ref(),
        }
    }

    pub fn is_via(&self) -> bool {
        matches!(self, Conductor::Via { .. })
    }
}

/// Board document as seen by the tools.
///
/// Collections are returned as snapshots so callers can mutate the board
/// while walking a previously fetched list.
pub trait Board {
    /// Extent of everything on the board, `None` for an empty board
    fn bounding_box(&self) -> Option<Rectangle>;

    fn drawings(&self) -> Vec<Drawing>;

    fn tracks(&self) -> Vec<Conductor>;

    fn layers(&self) -> Vec<Layer>;

    fn units(&self) -> Units {
        Units::default()
    }

    fn add_segment(&mut self, segment: Segment) -> DrawingId;

    fn add_text(&mut self, position: Point, text: String, layer: LayerId) -> DrawingId;

    /// Remove a drawing; false when the id is unknown
    fn remove(&mut self, id: DrawingId) -> bool;

    /// Replace the content of a text drawing; false when `id` is not a text
    fn set_text(&mut self, id: DrawingId, text: String) -> bool;

    fn to_mm(&self, units: f64) -> f64 {
        self.units().to_mm(units)
    }

    fn from_mm(&self, mm: f64) -> f64 {
        self.units().from_mm(mm)
    }

    fn layer_count(&self) -> usize {
        self.layers().len()
    }

    fn layer_name(&self, layer: LayerId) -> Option<String> {
        self.layers()
            .into_iter()
            .find(|l| l.id == layer)
            .map(|l| l.name)
    }

    /// Case-insensitive lookup of a layer by its name
    fn layer_by_name(&self, name: &str) -> Option<LayerId> {
        self.layers()
            .into_iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
            .map(|l| l.id)
    }
}

/// Standard KiCad layer table (KiCad 6+ ordinals).
pub fn kicad_default_layers() -> Vec<Layer> {
    let mut layers = vec![Layer::new(0, "F.Cu")];
    for i in 1..=30 {
        layers.push(Layer::new(i, format!("In{}.Cu", i)));
    }
    layers.push(Layer::new(31, "B.Cu"));
    let technical = [
        (32, "B.Adhes"),
        (33, "F.Adhes"),
        (34, "B.Paste"),
        (35, "F.Paste"),
        (36, "B.SilkS"),
        (37, "F.SilkS"),
        (38, "B.Mask"),
        (39, "F.Mask"),
        (40, "Dwgs.User"),
        (41, "Cmts.User"),
        (42, "Eco1.User"),
        (43, "Eco2.User"),
        (44, "Edge.Cuts"),
        (45, "Margin"),
        (46, "B.CrtYd"),
        (47, "F.CrtYd"),
        (48, "B.Fab"),
        (49, "F.Fab"),
    ];
    layers.extend(technical.iter().map(|(id, name)| Layer::new(*id, *name)));
    layers
}
