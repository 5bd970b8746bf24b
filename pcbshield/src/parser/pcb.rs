//! KiCad PCB Import
//!
//! Reads the parts of a `.kicad_pcb` file the tools care about into a
//! [`MemoryBoard`]:
//! - the layer table
//! - the net table
//! - copper `segment` and `via` items
//! - board graphics (`gr_line`, `gr_text`, `gr_arc`, `gr_circle`,
//!   `gr_rect`, `gr_poly`)
//!
//! KiCad stores every length in millimetres; they are converted to board
//! units on the way in. Footprints and zones are skipped.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::board::{
    kicad_default_layers, Conductor, DrawingKind, Layer, LayerId, MemoryBoard, NetId, NetRef, Segment,
    DEFAULT_NET_ID,
};
use crate::geometry::{Point, Rectangle, Units};
use crate::parser::sexp::{ParseError, SExp, SExpParser};

#[derive(Debug, Error)]
pub enum PcbParseError {
    #[error("S-expression parse error: {0}")]
    SExpParse(#[from] ParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid PCB format: {0}")]
    InvalidFormat(String),
    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Parser for KiCad 6+ board files
pub struct PcbParser;

/// Lookup tables built while walking the file
struct Context {
    units: Units,
    layers: HashMap<String, LayerId>,
    nets: HashMap<NetId, String>,
}

impl Context {
    fn layer(&self, item: &SExp) -> Option<LayerId> {
        let name = item.value("layer")?;
        let id = self.layers.get(name).copied();
        if id.is_none() {
            tracing::warn!("Unknown layer {} in {}", name, item.tag().unwrap_or("item"));
        }
        id
    }

    fn point(&self, node: &SExp) -> Result<Point, PcbParseError> {
        Ok(Point::new(
            self.units.from_mm(node.number_at(1)?),
            self.units.from_mm(node.number_at(2)?),
        ))
    }

    fn point_of(&self, item: &SExp, key: &str) -> Result<Point, PcbParseError> {
        let node = item
            .child(key)
            .ok_or_else(|| PcbParseError::MissingField(format!("{} in {}", key, item.tag().unwrap_or("item"))))?;
        self.point(node)
    }

    /// `(net 3)` or, in newer files, `(net 3 "GND")` / `(net "GND")`
    fn net(&self, item: &SExp) -> Option<NetRef> {
        let node = item.child("net")?;
        let first = node.atom_at(1)?;
        let net = match first.parse::<NetId>() {
            Ok(id) => {
                let name = node
                    .atom_at(2)
                    .map(str::to_string)
                    .or_else(|| self.nets.get(&id).cloned())
                    .unwrap_or_default();
                NetRef::new(id, name)
            }
            Err(_) => {
                let id = self
                    .nets
                    .iter()
                    .find(|(_, name)| name.as_str() == first)
                    .map(|(id, _)| *id)?;
                NetRef::new(id, first)
            }
        };
        (net.id != DEFAULT_NET_ID).then_some(net)
    }

    /// Stroke width from `(width w)` or `(stroke (width w) ...)`
    fn stroke_width(&self, item: &SExp) -> f64 {
        let mm = item
            .number("width")
            .or_else(|| item.child("stroke").and_then(|s| s.number("width")))
            .unwrap_or(0.0);
        self.units.from_mm(mm)
    }
}

impl PcbParser {
    pub fn parse_pcb(path: &Path) -> Result<MemoryBoard, PcbParseError> {
        let content = std::fs::read_to_string(path)?;
        let board = Self::parse_pcb_str(&content)?;
        tracing::debug!(
            "Parsed {}: {} drawings, {} tracks",
            path.display(),
            board.drawings.len(),
            board.tracks.len()
        );
        Ok(board)
    }

    pub fn parse_pcb_str(content: &str) -> Result<MemoryBoard, PcbParseError> {
        let mut parser = SExpParser::new(content);
        let root = parser.parse()?;

        match root.tag() {
            Some("kicad_pcb") => {}
            Some(other) => {
                return Err(PcbParseError::InvalidFormat(format!(
                    "Expected kicad_pcb, found {}",
                    other
                )))
            }
            None => {
                return Err(PcbParseError::InvalidFormat(
                    "Expected kicad_pcb root".to_string(),
                ))
            }
        }

        let layers = match root.child("layers") {
            Some(table) => Self::parse_layers(table),
            None => kicad_default_layers(),
        };

        let mut board = MemoryBoard::with_layers(layers.clone());
        let ctx = Context {
            units: board.units,
            layers: layers.into_iter().map(|l| (l.name, l.id)).collect(),
            nets: root
                .children("net")
                .filter_map(|n| Some((n.atom_at(1)?.parse().ok()?, n.atom_at(2).unwrap_or("").to_string())))
                .collect(),
        };

        for item in root.as_list().unwrap_or(&[]).iter().skip(1) {
            let Some(tag) = item.tag() else {
                continue;
            };
            let result = match tag {
                "segment" => Self::parse_trace(&ctx, item).map(|t| t.map(|t| board.push_track(t))),
                "via" => Self::parse_via(&ctx, item).map(|v| board.push_track(v)).map(Some),
                "arc" => {
                    tracing::debug!("Skipping arc track");
                    Ok(None)
                }
                "gr_line" | "gr_text" | "gr_arc" | "gr_circle" | "gr_rect" | "gr_poly" => {
                    Self::parse_graphic(&ctx, item, tag).map(|g| {
                        g.map(|(layer, kind)| {
                            board.push_drawing(layer, kind);
                        })
                    })
                }
                _ => Ok(None),
            };
            if let Err(e) = result {
                tracing::warn!("Skipping {}: {}", tag, e);
            }
        }

        Ok(board)
    }

    fn parse_layers(table: &SExp) -> Vec<Layer> {
        table
            .as_list()
            .unwrap_or(&[])
            .iter()
            .skip(1)
            .filter_map(|entry| {
                let id = entry.atom_at(0)?.parse().ok()?;
                let name = entry.atom_at(1)?;
                Some(Layer::new(id, name))
            })
            .collect()
    }

    fn parse_trace(ctx: &Context, item: &SExp) -> Result<Option<Conductor>, PcbParseError> {
        let start = ctx.point_of(item, "start")?;
        let end = ctx.point_of(item, "end")?;
        let width = item
            .number("width")
            .ok_or_else(|| PcbParseError::MissingField("trace width".to_string()))?;
        let Some(layer) = ctx.layer(item) else {
            return Ok(None);
        };

        Ok(Some(Conductor::Trace {
            start,
            end,
            width: ctx.units.from_mm(width),
            layer,
            net: ctx.net(item),
        }))
    }

    fn parse_via(ctx: &Context, item: &SExp) -> Result<Conductor, PcbParseError> {
        let position = ctx.point_of(item, "at")?;
        let size = item
            .number("size")
            .ok_or_else(|| PcbParseError::MissingField("via size".to_string()))?;
        let drill = item
            .number("drill")
            .ok_or_else(|| PcbParseError::MissingField("via drill".to_string()))?;

        Ok(Conductor::Via {
            position,
            drill: ctx.units.from_mm(drill),
            width: ctx.units.from_mm(size),
            net: ctx.net(item),
        })
    }

    fn parse_graphic(
        ctx: &Context,
        item: &SExp,
        tag: &str,
    ) -> Result<Option<(LayerId, DrawingKind)>, PcbParseError> {
        let Some(layer) = ctx.layer(item) else {
            return Ok(None);
        };

        let kind = match tag {
            "gr_line" => DrawingKind::Segment {
                start: ctx.point_of(item, "start")?,
                end: ctx.point_of(item, "end")?,
                width: ctx.stroke_width(item),
                label: None,
            },
            "gr_text" => DrawingKind::Text {
                position: ctx.point_of(item, "at")?,
                text: item
                    .atom_at(1)
                    .ok_or_else(|| PcbParseError::MissingField("text".to_string()))?
                    .to_string(),
            },
            "gr_circle" => {
                let center = ctx.point_of(item, "center")?;
                let edge = ctx.point_of(item, "end")?;
                let r = ((edge.x - center.x).powi(2) + (edge.y - center.y).powi(2)).sqrt();
                DrawingKind::Shape {
                    bounds: Rectangle::new(center.x - r, center.y - r, center.x + r, center.y + r),
                }
            }
            "gr_poly" => {
                let pts = item
                    .child("pts")
                    .ok_or_else(|| PcbParseError::MissingField("pts".to_string()))?;
                let points = pts
                    .children("xy")
                    .map(|xy| ctx.point(xy))
                    .collect::<Result<Vec<_>, _>>()?;
                DrawingKind::Shape {
                    bounds: Rectangle::from_points(points)
                        .ok_or_else(|| PcbParseError::InvalidFormat("empty polygon".to_string()))?,
                }
            }
            // gr_rect (start, end) and gr_arc (start, mid, end); arc bulge
            // beyond its three points is ignored
            _ => {
                let points = ["start", "mid", "end"]
                    .iter()
                    .filter(|key| item.child(key).is_some())
                    .map(|key| ctx.point_of(item, key))
                    .collect::<Result<Vec<_>, _>>()?;
                DrawingKind::Shape {
                    bounds: Rectangle::from_points(points)
                        .ok_or_else(|| PcbParseError::MissingField(format!("points of {}", tag)))?,
                }
            }
        };

        Ok(Some((layer, kind)))
    }
}

fn mm_atom(units: &Units, value: f64) -> String {
    let text = format!("{:.6}", units.to_mm(value));
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// A segment as a KiCad `gr_line` item.
pub fn segment_to_sexp(segment: &Segment, layer_name: &str, units: &Units) -> SExp {
    SExp::List(vec![
        SExp::atom("gr_line"),
        SExp::node(
            "start",
            [mm_atom(units, segment.start.x), mm_atom(units, segment.start.y)],
        ),
        SExp::node("end", [mm_atom(units, segment.end.x), mm_atom(units, segment.end.y)]),
        SExp::List(vec![
            SExp::atom("stroke"),
            SExp::node("width", [mm_atom(units, segment.width)]),
            SExp::node("type", ["default"]),
        ]),
        SExp::node("layer", [layer_name]),
    ])
}
