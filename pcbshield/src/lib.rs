//! PcbShield - hash shielding and trace electrical tools for PCB layouts
//!
//! Two tools that work against a board document through the [`Board`]
//! trait:
//!
//! - a **hash shielding** generator that frames a rectangle on one layer and
//!   fills it with two mirrored families of angled lines
//! - a **trace report** that sums length, resistance, voltage drop and power
//!   loss per net and bounds each net's current with IPC-2221
//!
//! # Quick Start
//!
//! ```no_run
//! use pcbshield::{ToolSession, ToolsConfig};
//! use std::path::Path;
//!
//! let mut session = ToolSession::open(Path::new("board.kicad_pcb"), ToolsConfig::default()).unwrap();
//! let outcome = session.generate_shielding().unwrap();
//! println!("{} segments, {:.0}% coverage", outcome.segments.len(), outcome.coverage * 100.0);
//!
//! for net in session.net_report().unwrap().nets.values() {
//!     println!("{}: {}", net.name, pcbshield::format_number(net.resistance_ohm));
//! }
//! ```

pub mod board;
pub mod config;
pub mod core;
pub mod electrical;
pub mod format;
pub mod geometry;
pub mod parser;
pub mod shielding;

// Re-export main types
pub use board::{Board, Conductor, Drawing, DrawingKind, Layer, MemoryBoard, NetRef, Segment};
pub use config::{ShieldConfig, ToolsConfig, TraceInfoConfig};
pub use crate::core::{ShieldError, ShieldOutcome, ToolSession};
pub use electrical::net_report::{compute_net_report, NetReport, NetReportOptions, NetSummary};
pub use format::format_number;
pub use geometry::{Offsets, Point, Rectangle, Units};
pub use shielding::{generate_hash_pattern, HashPatternRequest};

/// Load a `.json` or `.kicad_pcb` board (convenience wrapper).
pub fn load_board(path: &std::path::Path) -> Result<MemoryBoard, ShieldError> {
    MemoryBoard::load(path)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        compute_net_report, format_number, generate_hash_pattern, Board, HashPatternRequest,
        MemoryBoard, NetReportOptions, Offsets, Point, Rectangle, ShieldError, ToolSession,
        ToolsConfig,
    };
}
