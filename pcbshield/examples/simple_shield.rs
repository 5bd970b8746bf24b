//! Simple shielding example: hatch a board outline and print the segments.

use pcbshield::prelude::*;
use std::path::Path;

fn main() -> Result<(), ShieldError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/shield_board.kicad_pcb".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example simple_shield [path/to/board.kicad_pcb]");
        std::process::exit(1);
    }

    let mut session = ToolSession::open(path, ToolsConfig::default())?;
    let outcome = session.generate_shielding()?;
    let board = session.board()?;

    println!("Shielding for: {}", path.display());
    println!(
        "{} border + {} hatch segments, coverage {:.1}%",
        outcome.border_count(),
        outcome.hash_count(),
        outcome.coverage * 100.0
    );
    println!();

    for segment in &outcome.segments {
        let start = board.units().point_to_mm(segment.start);
        let end = board.units().point_to_mm(segment.end);
        println!(
            "  {:<14} ({:>8.3}, {:>8.3}) -> ({:>8.3}, {:>8.3})",
            segment.label.as_deref().unwrap_or(""),
            start.x,
            start.y,
            end.x,
            end.y
        );
    }

    Ok(())
}
