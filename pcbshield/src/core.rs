//! Core API shared by host integrations and the CLI.
//! No UI or host application dependencies.

use std::path::Path;

use chrono::NaiveDate;

use crate::board::{Board, MemoryBoard, Segment};
use crate::config::ToolsConfig;
use crate::electrical::net_report::{compute_net_report, NetReport};
use crate::geometry::Rectangle;
use crate::shielding::{self, HashPatternRequest};

#[derive(Debug, thiserror::Error)]
pub enum ShieldError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("No board document available")]
    MissingBoard,
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<crate::parser::pcb::PcbParseError> for ShieldError {
    fn from(e: crate::parser::pcb::PcbParseError) -> Self {
        match e {
            crate::parser::pcb::PcbParseError::Io(io) => ShieldError::Io(io),
            other => ShieldError::Parse(other.to_string()),
        }
    }
}

impl From<crate::parser::sexp::ParseError> for ShieldError {
    fn from(e: crate::parser::sexp::ParseError) -> Self {
        ShieldError::Parse(e.to_string())
    }
}

/// Result of one shielding run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ShieldOutcome {
    pub request: HashPatternRequest,
    pub working_rect: Rectangle,
    pub segments: Vec<Segment>,
    /// Fraction of the working rectangle covered by the hatch, 0..=1
    pub coverage: f64,
    pub removed: usize,
}

impl ShieldOutcome {
    pub fn border_count(&self) -> usize {
        self.segments.len().min(4)
    }

    pub fn hash_count(&self) -> usize {
        self.segments.len().saturating_sub(4)
    }
}

/// A board document plus the settings the tools run with.
///
/// The board is injected rather than looked up globally; operations on a
/// session without a board fail with [`ShieldError::MissingBoard`].
pub struct ToolSession {
    board: Option<Box<dyn Board>>,
    pub config: ToolsConfig,
}

impl ToolSession {
    pub fn new(config: ToolsConfig) -> Self {
        Self {
            board: None,
            config,
        }
    }

    pub fn with_board<B: Board + 'static>(board: B, config: ToolsConfig) -> Self {
        Self {
            board: Some(Box::new(board)),
            config,
        }
    }

    /// Load a `.json` or `.kicad_pcb` board into a new session.
    pub fn open(path: &Path, config: ToolsConfig) -> Result<Self, ShieldError> {
        let board = MemoryBoard::load(path)?;
        tracing::info!("Loaded board: {}", path.display());
        Ok(Self::with_board(board, config))
    }

    pub fn attach<B: Board + 'static>(&mut self, board: B) {
        self.board = Some(Box::new(board));
    }

    pub fn detach(&mut self) -> Option<Box<dyn Board>> {
        self.board.take()
    }

    pub fn board(&self) -> Result<&dyn Board, ShieldError> {
        self.board.as_deref().ok_or(ShieldError::MissingBoard)
    }

    pub fn board_mut(&mut self) -> Result<&mut (dyn Board + 'static), ShieldError> {
        self.board.as_deref_mut().ok_or(ShieldError::MissingBoard)
    }

    /// Build a request from `config.shield` and run the hash pattern engine.
    pub fn generate_shielding(&mut self) -> Result<ShieldOutcome, ShieldError> {
        let shield_config = self.config.shield.clone();
        let board = self.board_mut()?;

        let request = shielding::request_from_config(&*board, &shield_config)?;
        let working_rect = request.working_rect()?;
        let existing = if request.replace_existing {
            shielding::segments_on_layer(&*board, request.target_layer)
        } else {
            0
        };

        let segments = shielding::generate_hash_pattern(board, &request)?;

        if shield_config.layer_legend {
            let origin = board.from_mm(crate::config::LEGEND_ORIGIN_MM.0);
            let origin_y = board.from_mm(crate::config::LEGEND_ORIGIN_MM.1);
            let spacing = board.from_mm(crate::config::LEGEND_SPACING_MM);
            shielding::draw_layer_legend(
                board,
                crate::geometry::Point::new(origin, origin_y),
                spacing,
                request.target_layer,
            );
        }

        Ok(ShieldOutcome {
            coverage: request.coverage(),
            request,
            working_rect,
            segments,
            removed: existing,
        })
    }

    /// Per-net electrical summary using `config.trace_info`.
    pub fn net_report(&self) -> Result<NetReport, ShieldError> {
        compute_net_report(self.board()?, &self.config.trace_info.options())
    }

    /// Rewrite `$date$` text stamps to `today`.
    pub fn refresh_date_stamps(&mut self, today: NaiveDate) -> Result<usize, ShieldError> {
        Ok(shielding::stamp::refresh_date_stamps(self.board_mut()?, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Conductor, DrawingKind, NetRef};
    use crate::geometry::Point;

    fn outlined_board() -> MemoryBoard {
        let mut board = MemoryBoard::new();
        let mm = |v: f64| v * 1_000_000.0;
        let corners = [
            (0.0, 0.0, 100.0, 0.0),
            (100.0, 0.0, 100.0, 60.0),
            (100.0, 60.0, 0.0, 60.0),
            (0.0, 60.0, 0.0, 0.0),
        ];
        for (x1, y1, x2, y2) in corners {
            board.push_drawing(
                44,
                DrawingKind::Segment {
                    start: Point::new(mm(x1), mm(y1)),
                    end: Point::new(mm(x2), mm(y2)),
                    width: mm(0.1),
                    label: None,
                },
            );
        }
        board
    }

    #[test]
    fn test_session_without_board() {
        let mut session = ToolSession::new(ToolsConfig::default());
        assert!(matches!(session.generate_shielding(), Err(ShieldError::MissingBoard)));
        assert!(matches!(session.net_report(), Err(ShieldError::MissingBoard)));
    }

    #[test]
    fn test_detach_hands_back_the_board() {
        let mut session = ToolSession::new(ToolsConfig::default());
        session.attach(outlined_board());
        let generated = session.generate_shielding().unwrap();

        let board = session.detach().unwrap();
        assert_eq!(
            crate::shielding::segments_on_layer(board.as_ref(), 49),
            generated.segments.len()
        );
        assert!(matches!(session.board(), Err(ShieldError::MissingBoard)));
        assert!(session.detach().is_none());
    }

    #[test]
    fn test_session_generates_with_defaults() {
        let mut session = ToolSession::with_board(outlined_board(), ToolsConfig::default());
        let outcome = session.generate_shielding().unwrap();
        assert_eq!(outcome.border_count(), 4);
        assert!(outcome.hash_count() > 0);
        assert_eq!(outcome.removed, 0);

        let again = session.generate_shielding().unwrap();
        assert_eq!(again.removed, outcome.segments.len());
        assert_eq!(again.segments, outcome.segments);
    }

    #[test]
    fn test_session_net_report() {
        let mut board = outlined_board();
        board.push_track(Conductor::Trace {
            start: Point::new(0.0, 0.0),
            end: Point::new(10_000_000.0, 0.0),
            width: 1_000_000.0,
            layer: 0,
            net: Some(NetRef::new(3, "VCC")),
        });
        let session = ToolSession::with_board(board, ToolsConfig::default());
        let report = session.net_report().unwrap();
        assert!(report.nets.contains_key(&0));
        assert_eq!(report.nets[&3].name, "VCC");
    }
}
