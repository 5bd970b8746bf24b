//! Net report example: per-net electrical figures for a board.

use pcbshield::prelude::*;
use std::path::Path;

fn main() -> Result<(), ShieldError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/shield_board.kicad_pcb".to_string());
    let board = pcbshield::load_board(Path::new(&path))?;

    for thickness_um in pcbshield::electrical::CU_THICKNESS_CHOICES_UM {
        let options = NetReportOptions::new(thickness_um / 1000.0, true);
        let report = compute_net_report(&board, &options)?;

        println!(
            "\n{} um copper, {} mm routed",
            thickness_um,
            format_number(report.total_length_mm())
        );
        for net in report.routed_nets() {
            println!(
                "  {:<12} R = {}Ohm, max {}A",
                net.name,
                format_number(net.resistance_ohm),
                format_number(net.max_current_a)
            );
        }
    }

    Ok(())
}
