//! PcbShield CLI - hash shielding and trace reports from the command line.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pcbshield::board::{Board, MemoryBoard};
use pcbshield::electrical::ipc2221::{CopperWeight, Ipc2221Calculator, LayerPosition};
use pcbshield::electrical::{CU_THICKNESS_UM, MAX_TEMP_RISE_C};
use pcbshield::parser::segment_to_sexp;
use pcbshield::shielding::{pitch_for_coverage, stamp};
use pcbshield::{format_number, NetReport, ShieldOutcome, ToolSession, ToolsConfig};
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;

#[derive(Parser)]
#[command(name = "pcbshield")]
#[command(about = "PCB hash shielding generator and trace calculator", long_about = None)]
#[command(version)]
struct Cli {
    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a hash shielding pattern over the board outline
    Shield(ShieldArgs),

    /// Per-net length, resistance, voltage drop, power loss and max current
    TraceInfo(TraceInfoArgs),

    /// Trace width needed for a current (IPC-2221)
    Width {
        /// Current in amperes
        #[arg(long)]
        current: f64,

        /// Copper thickness in µm
        #[arg(long, default_value_t = CU_THICKNESS_UM)]
        thickness_um: f64,

        /// Allowed temperature rise in °C
        #[arg(long, default_value_t = MAX_TEMP_RISE_C)]
        temp_rise: f64,

        /// Trace on an outer layer
        #[arg(long)]
        external: bool,
    },
}

#[derive(Args)]
struct ShieldArgs {
    /// Path to .kicad_pcb or .json board
    #[arg(value_name = "BOARD")]
    board: PathBuf,

    /// JSON settings file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Line width in mm
    #[arg(long)]
    width: Option<f64>,

    /// Distance between parallel lines in mm
    #[arg(long, conflicts_with = "coverage")]
    pitch: Option<f64>,

    /// Derive the pitch from a target coverage (0..1]
    #[arg(long)]
    coverage: Option<f64>,

    /// Line angle in degrees (0..90, exclusive)
    #[arg(long)]
    angle: Option<f64>,

    #[arg(long, value_name = "MM")]
    offset_left: Option<f64>,

    #[arg(long, value_name = "MM")]
    offset_right: Option<f64>,

    #[arg(long, value_name = "MM")]
    offset_top: Option<f64>,

    #[arg(long, value_name = "MM")]
    offset_bottom: Option<f64>,

    /// Layer whose drawings define the area
    #[arg(long)]
    source_layer: Option<String>,

    /// Layer to draw on
    #[arg(long)]
    target_layer: Option<String>,

    /// Keep segments already on the target layer
    #[arg(long)]
    keep_existing: bool,

    /// Also write a layer legend
    #[arg(long)]
    legend: bool,

    /// Rewrite `$date$` texts to today's date
    #[arg(long)]
    stamp_date: bool,

    /// Write the resulting board as JSON
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: ShieldFormat,
}

#[derive(Args)]
struct TraceInfoArgs {
    /// Path to .kicad_pcb or .json board
    #[arg(value_name = "BOARD")]
    board: PathBuf,

    /// JSON settings file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Copper thickness preset in µm
    #[arg(long, value_enum, conflicts_with = "thickness_um")]
    thickness: Option<Thickness>,

    /// Copper thickness in µm
    #[arg(long)]
    thickness_um: Option<f64>,

    /// Traces on an outer layer
    #[arg(long)]
    external: bool,

    /// Allowed temperature rise in °C
    #[arg(long)]
    temp_rise: Option<f64>,

    /// Current for voltage drop and power loss, in amperes
    #[arg(long)]
    current: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: ReportFormat,
}

#[derive(Clone, ValueEnum)]
enum ShieldFormat {
    /// Human-readable summary
    Human,
    /// JSON outcome
    Json,
    /// KiCad gr_line items
    Sexp,
}

#[derive(Clone, ValueEnum)]
enum ReportFormat {
    Human,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Thickness {
    #[value(name = "18")]
    Um18,
    #[value(name = "35")]
    Um35,
    #[value(name = "70")]
    Um70,
}

impl Thickness {
    fn weight(self) -> CopperWeight {
        match self {
            Thickness::Um18 => CopperWeight::HalfOz,
            Thickness::Um35 => CopperWeight::OneOz,
            Thickness::Um70 => CopperWeight::TwoOz,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Shield(args) => handle_shield(args),
        Commands::TraceInfo(args) => handle_trace_info(args),
        Commands::Width {
            current,
            thickness_um,
            temp_rise,
            external,
        } => handle_width(current, thickness_um, temp_rise, external),
    };

    let exit_code = match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ToolsConfig> {
    match path {
        Some(path) => ToolsConfig::from_json_file(path)
            .with_context(|| format!("reading settings {}", path.display())),
        None => Ok(ToolsConfig::default()),
    }
}

fn handle_shield(args: ShieldArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    let shield = &mut config.shield;
    if let Some(width) = args.width {
        shield.line_width_mm = width;
    }
    if let Some(pitch) = args.pitch {
        shield.pitch_mm = Some(pitch);
    }
    if let Some(coverage) = args.coverage {
        shield.pitch_mm = Some(pitch_for_coverage(shield.line_width_mm, coverage)?);
    }
    if let Some(angle) = args.angle {
        shield.angle_deg = angle;
    }
    for (value, slot) in [
        (args.offset_left, &mut shield.offset_left_mm),
        (args.offset_right, &mut shield.offset_right_mm),
        (args.offset_top, &mut shield.offset_top_mm),
        (args.offset_bottom, &mut shield.offset_bottom_mm),
    ] {
        if let Some(value) = value {
            *slot = value;
        }
    }
    if let Some(layer) = args.source_layer {
        shield.source_layer = layer;
    }
    if let Some(layer) = args.target_layer {
        shield.target_layer = layer;
    }
    if args.keep_existing {
        shield.replace_existing = false;
    }
    if args.legend {
        shield.layer_legend = true;
    }

    let mut session = ToolSession::open(&args.board, config)
        .with_context(|| format!("loading {}", args.board.display()))?;
    let outcome = session.generate_shielding()?;
    let stamped = if args.stamp_date {
        session.refresh_date_stamps(stamp::today())?
    } else {
        0
    };

    if let Some(path) = &args.output {
        let snapshot = MemoryBoard::from_board(session.board()?);
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    let board = session.board()?;
    match args.format {
        ShieldFormat::Human => print_shield_human(board, &outcome, stamped),
        ShieldFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        ShieldFormat::Sexp => {
            let units = board.units();
            let layer_name = board
                .layer_name(outcome.request.target_layer)
                .unwrap_or_else(|| outcome.request.target_layer.to_string());
            for segment in &outcome.segments {
                println!("{}", segment_to_sexp(segment, &layer_name, &units));
            }
        }
    }
    Ok(())
}

fn print_shield_human(board: &dyn Board, outcome: &ShieldOutcome, stamped: usize) {
    let rect = &outcome.working_rect;
    let layer = board
        .layer_name(outcome.request.target_layer)
        .unwrap_or_else(|| outcome.request.target_layer.to_string());

    println!("\nHash shielding on {}", layer);
    println!("{}", "─".repeat(60));
    println!(
        "  Area:     ({:.3}, {:.3}) - ({:.3}, {:.3}) mm",
        board.to_mm(rect.left),
        board.to_mm(rect.top),
        board.to_mm(rect.right),
        board.to_mm(rect.bottom)
    );
    println!(
        "  Lines:    {:.3} mm wide, {:.3} mm pitch, {}°",
        board.to_mm(outcome.request.line_width),
        board.to_mm(outcome.request.pitch),
        outcome.request.angle_deg
    );
    println!("  Border:   {}", outcome.border_count());
    println!("  Hatch:    {}", outcome.hash_count());
    println!("  Removed:  {}", outcome.removed);
    println!("  Coverage: {:.1}%", outcome.coverage * 100.0);
    if stamped > 0 {
        println!("  Date stamps updated: {}", stamped);
    }
}

fn handle_trace_info(args: TraceInfoArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    let trace_info = &mut config.trace_info;
    if let Some(preset) = args.thickness {
        trace_info.thickness_um = preset.weight().thickness_um();
    }
    if let Some(um) = args.thickness_um {
        trace_info.thickness_um = um;
    }
    if args.external {
        trace_info.internal_layer = false;
    }
    if let Some(rise) = args.temp_rise {
        trace_info.temp_rise_c = rise;
    }
    if let Some(current) = args.current {
        trace_info.reference_current_a = current;
    }

    let session = ToolSession::open(&args.board, config)
        .with_context(|| format!("loading {}", args.board.display()))?;
    let report = session.net_report()?;

    match args.format {
        ReportFormat::Human => print_report_human(&report),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn print_report_human(report: &NetReport) {
    let options = &report.options;
    let thickness_um = options.thickness_mm * 1000.0;
    println!(
        "\nCopper {}um (~{} oz), {} layer, {}°C rise, {}A",
        format_number(thickness_um),
        CopperWeight::from_um(thickness_um).weight_oz(),
        if options.internal_layer { "internal" } else { "external" },
        options.temp_rise_c,
        format_number(options.reference_current_a)
    );
    println!("{}", "─".repeat(86));
    println!(
        "  {:<16} {:>12} {:>14} {:>12} {:>12} {:>12}",
        "Net", "Length", "Resistance", "Drop", "Loss", "Max current"
    );
    for net in report.nets.values() {
        let [name, length, resistance, drop, loss, current] = net.formatted_row();
        println!(
            "  {:<16} {:>12} {:>14} {:>12} {:>12} {:>12}",
            name, length, resistance, drop, loss, current
        );
    }
    println!("\n  Total length: {}m", format_number(report.total_length_mm() / 1000.0));
    if !report.vias.is_empty() {
        println!("  Vias: {}", report.vias.len());
    }
}

fn handle_width(current: f64, thickness_um: f64, temp_rise: f64, external: bool) -> Result<()> {
    if !(current > 0.0) || !(thickness_um > 0.0) || !(temp_rise > 0.0) {
        anyhow::bail!("current, thickness and temperature rise must be positive");
    }
    let calc = Ipc2221Calculator::new(temp_rise);
    let position = LayerPosition::from_internal(!external);
    let thickness_mm = thickness_um / 1000.0;
    let width_mm = calc.calculate_required_width(current, thickness_mm, position);
    let capacity = calc.calculate_max_current(width_mm, thickness_mm, position);

    println!("Required width: {:.4} mm", width_mm);
    println!("Capacity:       {}A", format_number(capacity));
    Ok(())
}
