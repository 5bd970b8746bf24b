//! In-memory board document
//!
//! A plain, serde-friendly implementation of [`Board`]. The CLI loads it from
//! JSON or from a `.kicad_pcb` file; tests build it directly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{kicad_default_layers, Board, Conductor, Drawing, DrawingId, DrawingKind, Layer, LayerId, Segment};
use crate::core::ShieldError;
use crate::geometry::{Point, Rectangle, Units};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryBoard {
    #[serde(default)]
    pub units: Units,
    #[serde(default = "kicad_default_layers")]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub drawings: Vec<Drawing>,
    #[serde(default)]
    pub tracks: Vec<Conductor>,
    #[serde(default)]
    next_id: DrawingId,
}

impl Default for MemoryBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBoard {
    /// Empty board with the standard KiCad layer table
    pub fn new() -> Self {
        Self::with_layers(kicad_default_layers())
    }

    pub fn with_layers(layers: Vec<Layer>) -> Self {
        Self {
            units: Units::default(),
            layers,
            drawings: Vec::new(),
            tracks: Vec::new(),
            next_id: 1,
        }
    }

    /// Copy the current contents of any board.
    pub fn from_board<B: Board + ?Sized>(board: &B) -> Self {
        let drawings = board.drawings();
        let next_id = drawings.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        Self {
            units: board.units(),
            layers: board.layers(),
            drawings,
            tracks: board.tracks(),
            next_id,
        }
    }

    /// Load the JSON form written by `serde_json::to_string(&board)`.
    pub fn from_json_str(content: &str) -> Result<Self, ShieldError> {
        let mut board: MemoryBoard =
            serde_json::from_str(content).map_err(|e| ShieldError::Parse(e.to_string()))?;
        board.renumber();
        Ok(board)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ShieldError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load a board by extension: `.json` or `.kicad_pcb`.
    pub fn load(path: &Path) -> Result<Self, ShieldError> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Self::from_json_file(path),
            Some("kicad_pcb") => Ok(crate::parser::pcb::PcbParser::parse_pcb(path)?),
            _ => Err(ShieldError::Parse(format!(
                "Unsupported board file (expected .json or .kicad_pcb): {}",
                path.display()
            ))),
        }
    }

    /// Append a drawing, assigning it a fresh id.
    pub fn push_drawing(&mut self, layer: LayerId, kind: DrawingKind) -> DrawingId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.drawings.push(Drawing { id, layer, kind });
        id
    }

    pub fn push_track(&mut self, conductor: Conductor) {
        self.tracks.push(conductor);
    }

    /// Straight segments currently on `layer`
    pub fn segments_on(&self, layer: LayerId) -> Vec<&Drawing> {
        self.drawings
            .iter()
            .filter(|d| d.layer == layer && d.is_segment())
            .collect()
    }

    /// Keep ids unique after deserializing hand-written documents.
    fn renumber(&mut self) {
        let mut seen = std::collections::HashSet::new();
        let mut next = self
            .drawings
            .iter()
            .map(|d| d.id)
            .max()
            .unwrap_or(0)
            .max(self.next_id)
            + 1;
        for drawing in &mut self.drawings {
            if drawing.id == 0 || !seen.insert(drawing.id) {
                drawing.id = next;
                seen.insert(next);
                next += 1;
            }
        }
        self.next_id = next;
    }
}

impl Board for MemoryBoard {
    fn bounding_box(&self) -> Option<Rectangle> {
        let drawing_bounds = self.drawings.iter().filter_map(|d| d.bounds());
        let track_bounds = self.tracks.iter().filter_map(|t| match t {
            Conductor::Trace { start, end, .. } => Rectangle::from_points([*start, *end]),
            Conductor::Via { position, width, .. } => {
                let r = width / 2.0;
                Some(Rectangle::new(
                    position.x - r,
                    position.y - r,
                    position.x + r,
                    position.y + r,
                ))
            }
        });
        drawing_bounds
            .chain(track_bounds)
            .reduce(|acc, r| acc.union(&r))
    }

    fn drawings(&self) -> Vec<Drawing> {
        self.drawings.clone()
    }

    fn tracks(&self) -> Vec<Conductor> {
        self.tracks.clone()
    }

    fn layers(&self) -> Vec<Layer> {
        self.layers.clone()
    }

    fn units(&self) -> Units {
        self.units
    }

    fn add_segment(&mut self, segment: Segment) -> DrawingId {
        let Segment {
            start,
            end,
            width,
            layer,
            label,
        } = segment;
        self.push_drawing(
            layer,
            DrawingKind::Segment {
                start,
                end,
                width,
                label,
            },
        )
    }

    fn add_text(&mut self, position: Point, text: String, layer: LayerId) -> DrawingId {
        self.push_drawing(layer, DrawingKind::Text { position, text })
    }

    fn remove(&mut self, id: DrawingId) -> bool {
        let before = self.drawings.len();
        self.drawings.retain(|d| d.id != id);
        self.drawings.len() != before
    }

    fn set_text(&mut self, id: DrawingId, text: String) -> bool {
        match self.drawings.iter_mut().find(|d| d.id == id) {
            Some(Drawing {
                kind: DrawingKind::Text { text: current, .. },
                ..
            }) => {
                *current = text;
                true
            }
            _ => false,
        }
    }
}
