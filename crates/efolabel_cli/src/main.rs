//! `efolabel` operator CLI.
//!
//! # Responsibility
//! - Drive the core use-cases from a terminal or script against either store.
//! - Print plain text by default and JSON with `--json`.
//!
//! # Invariants
//! - Diagnostics go to stderr; stdout only carries command output.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use efolabel_core::db::open_db;
use efolabel_core::{
    checked_quantity, default_log_level, document_file_name_today, init_logging,
    init_stderr_logging, layout_document, parse_batch_id, Anchor, AnchorPoint, BatchRepository,
    BatchService, CoordinateRepository, CoordinateService, CoordinateSource, LabelCoordinates,
    LabelError, LabelService, LabelType, LocalStore, RenderRequest, SequenceAllocator,
    SequenceRepository, SqliteBatchRepository, SqliteCoordinateRepository,
    SqliteSequenceRepository, StatsService, StoreBackend, StoreConfig,
};
use log::debug;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "efolabel", version, about = "Issue and track EFO cable labels")]
struct Cli {
    /// Storage adapter: `sqlite` or `local` (JSON document).
    #[arg(long, global = true, env = "EFOLABEL_STORE")]
    store: Option<String>,

    /// Database or document file; defaults to the system temp directory.
    #[arg(long, global = true, env = "EFOLABEL_DB_PATH")]
    path: Option<String>,

    /// Log level (`trace|debug|info|warn|error`).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Write rotating log files here instead of stderr (absolute path).
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Machine-readable JSON output.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List label types with their prefix and next code.
    Types,

    /// Reserve codes and record them as a new batch.
    Generate {
        /// Label type id, e.g. "PatchCord Duplex".
        label_type: String,
        /// Number of labels (1..=1000).
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
        /// Operator recorded on the batch.
        #[arg(long)]
        by: Option<String>,
    },

    /// Mark a batch and its labels as printed.
    Print {
        batch_id: String,
        #[arg(long)]
        by: Option<String>,
    },

    /// List batches, newest first.
    Batches,

    /// List labels, newest first.
    Labels {
        /// Only labels of this batch, in code order.
        #[arg(long)]
        batch: Option<String>,
    },

    /// Show issuing statistics.
    Stats,

    /// Inspect or calibrate print coordinates.
    #[command(subcommand)]
    Coords(CoordsCmd),

    /// Show the page layout of a batch.
    Layout { batch_id: String },
}

#[derive(Subcommand, Debug)]
enum CoordsCmd {
    /// Effective coordinates for a type.
    Get { label_type: String },
    /// Replace the stored coordinates for a type.
    Set(SetCoords),
    /// Restore the built-in coordinates for a type.
    Reset {
        label_type: String,
        #[arg(long)]
        by: Option<String>,
    },
}

#[derive(Args, Debug)]
struct SetCoords {
    label_type: String,
    /// Font size in points.
    #[arg(long)]
    font_size: f64,
    /// Anchor position as `NAME=x,y` in points, e.g. `ILA1=50,60`. Repeatable;
    /// anchors not given are cleared.
    #[arg(long = "anchor", value_parser = parse_anchor_arg)]
    anchors: Vec<(Anchor, AnchorPoint)>,
    #[arg(long)]
    by: Option<String>,
}

/// Repositories of the selected store.
struct Stores<'a> {
    sequences: &'a dyn SequenceRepository,
    batches: &'a dyn BatchRepository,
    coordinates: &'a dyn CoordinateRepository,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    start_logging(&cli)?;

    let config = StoreConfig::from_values(cli.store.as_deref(), cli.path.as_deref())?;
    debug!(
        "event=cli_start module=cli status=ok backend={} path={}",
        config.backend,
        config.path.display()
    );

    match config.backend {
        StoreBackend::Sqlite => {
            let conn = open_db(&config.path)
                .with_context(|| format!("opening {}", config.path.display()))?;
            let sequences = SqliteSequenceRepository::new(&conn);
            let batches = SqliteBatchRepository::new(&conn);
            let coordinates = SqliteCoordinateRepository::new(&conn);
            run(
                &cli,
                Stores {
                    sequences: &sequences,
                    batches: &batches,
                    coordinates: &coordinates,
                },
            )
        }
        StoreBackend::LocalFile => {
            let store = LocalStore::open(&config.path)
                .with_context(|| format!("opening {}", config.path.display()))?;
            run(
                &cli,
                Stores {
                    sequences: &store,
                    batches: &store,
                    coordinates: &store,
                },
            )
        }
    }
}

fn start_logging(cli: &Cli) -> Result<()> {
    let level = cli.log_level.as_deref().unwrap_or_else(|| match cli.log_dir {
        Some(_) => default_log_level(),
        None => "warn",
    });
    match cli.log_dir.as_deref() {
        Some(dir) => init_logging(level, dir)?,
        None => init_stderr_logging(level)?,
    }
    Ok(())
}

fn run(cli: &Cli, stores: Stores<'_>) -> Result<()> {
    match &cli.cmd {
        Cmd::Types => cmd_types(&stores, cli.json),
        Cmd::Generate {
            label_type,
            quantity,
            by,
        } => cmd_generate(&stores, label_type, *quantity, by.as_deref(), cli.json),
        Cmd::Print { batch_id, by } => cmd_print(&stores, batch_id, by.as_deref(), cli.json),
        Cmd::Batches => cmd_batches(&stores, cli.json),
        Cmd::Labels { batch } => cmd_labels(&stores, batch.as_deref(), cli.json),
        Cmd::Stats => cmd_stats(&stores, cli.json),
        Cmd::Coords(CoordsCmd::Get { label_type }) => cmd_coords_get(&stores, label_type, cli.json),
        Cmd::Coords(CoordsCmd::Set(args)) => cmd_coords_set(&stores, args, cli.json),
        Cmd::Coords(CoordsCmd::Reset { label_type, by }) => {
            cmd_coords_reset(&stores, label_type, by.as_deref(), cli.json)
        }
        Cmd::Layout { batch_id } => cmd_layout(&stores, batch_id, cli.json),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_types(stores: &Stores<'_>, as_json: bool) -> Result<()> {
    let allocator = SequenceAllocator::new(stores.sequences);
    let mut rows = Vec::new();
    for label_type in LabelType::ALL {
        let config = label_type.config();
        rows.push(json!({
            "id": config.id,
            "display_name": config.display_name,
            "code_prefix": config.code_prefix,
            "template_ref": config.template_ref,
            "next_code": allocator.next_code_preview(label_type)?,
        }));
    }

    if as_json {
        return print_json(&rows);
    }
    for row in &rows {
        println!(
            "{:<26} {:<5} next={}",
            row["id"].as_str().unwrap_or_default(),
            row["code_prefix"].as_str().unwrap_or_default(),
            row["next_code"].as_str().unwrap_or_default()
        );
    }
    Ok(())
}

fn cmd_generate(
    stores: &Stores<'_>,
    label_type: &str,
    quantity: i64,
    by: Option<&str>,
    as_json: bool,
) -> Result<()> {
    let quantity = checked_quantity(quantity)?;
    let generated = LabelService::new(stores.sequences, stores.batches)
        .generate(label_type, quantity, by)?;

    if as_json {
        return print_json(&generated.batch);
    }
    let batch = &generated.batch;
    println!("batch {}", batch.id);
    println!(
        "{} x {}: {} .. {}",
        batch.quantity,
        batch.label_type,
        batch.codes.first().map_or("", String::as_str),
        batch.codes.last().map_or("", String::as_str)
    );
    Ok(())
}

fn cmd_print(stores: &Stores<'_>, batch_id: &str, by: Option<&str>, as_json: bool) -> Result<()> {
    let outcome = BatchService::new(stores.batches).mark_printed_str(batch_id, by)?;
    if as_json {
        return print_json(&json!({ "batch_id": batch_id.trim(), "outcome": outcome.as_str() }));
    }
    println!("{} {}", batch_id.trim(), outcome.as_str());
    Ok(())
}

fn cmd_batches(stores: &Stores<'_>, as_json: bool) -> Result<()> {
    let batches = BatchService::new(stores.batches).list_batches()?;
    if as_json {
        return print_json(&batches);
    }
    for batch in &batches {
        println!(
            "{} {:<26} {:>4} {} {}",
            batch.id,
            batch.label_type,
            batch.quantity,
            if batch.printed { "printed" } else { "pending" },
            batch.codes.first().map_or("", String::as_str)
        );
    }
    Ok(())
}

fn cmd_labels(stores: &Stores<'_>, batch: Option<&str>, as_json: bool) -> Result<()> {
    let service = BatchService::new(stores.batches);
    let labels = match batch {
        Some(raw) => service.labels_for_batch(parse_batch_id(raw)?)?,
        None => service.list_labels()?,
    };
    if as_json {
        return print_json(&labels);
    }
    for label in &labels {
        println!(
            "{:<12} {:<26} {}",
            label.code,
            label.label_type,
            if label.printed { "printed" } else { "pending" }
        );
    }
    Ok(())
}

fn cmd_stats(stores: &Stores<'_>, as_json: bool) -> Result<()> {
    let stats = StatsService::new(stores.sequences, stores.batches).compute()?;
    if as_json {
        return print_json(&stats);
    }
    println!(
        "labels: {} total, {} printed, {} pending",
        stats.total_labels, stats.printed_labels, stats.pending_labels
    );
    println!(
        "batches: {} total, {} printed",
        stats.total_batches, stats.printed_batches
    );
    for (label_type, count) in &stats.labels_by_type {
        let last = stats.last_numbers.get(label_type).copied().unwrap_or(0);
        println!("  {label_type:<26} {count:>6} labels, last={last}");
    }
    Ok(())
}

fn cmd_coords_get(stores: &Stores<'_>, label_type: &str, as_json: bool) -> Result<()> {
    let label_type = parse_label_type(label_type)?;
    let (coordinates, source) = CoordinateService::new(stores.coordinates).resolve(label_type)?;
    let source = match source {
        CoordinateSource::Stored => "stored",
        CoordinateSource::BuiltInDefault => "default",
    };
    if as_json {
        return print_json(&json!({ "source": source, "coordinates": coordinates }));
    }
    print_coordinates(&coordinates);
    println!("source: {source}");
    Ok(())
}

fn cmd_coords_set(stores: &Stores<'_>, args: &SetCoords, as_json: bool) -> Result<()> {
    let mut coordinates = LabelCoordinates::empty(parse_label_type(&args.label_type)?, args.font_size);
    for (anchor, point) in &args.anchors {
        coordinates.set_anchor(*anchor, Some(*point));
    }
    CoordinateService::new(stores.coordinates).put(&coordinates, args.by.as_deref())?;
    if as_json {
        return print_json(&coordinates);
    }
    print_coordinates(&coordinates);
    Ok(())
}

fn cmd_coords_reset(
    stores: &Stores<'_>,
    label_type: &str,
    by: Option<&str>,
    as_json: bool,
) -> Result<()> {
    let coordinates =
        CoordinateService::new(stores.coordinates).reset(parse_label_type(label_type)?, by)?;
    if as_json {
        return print_json(&coordinates);
    }
    print_coordinates(&coordinates);
    Ok(())
}

fn cmd_layout(stores: &Stores<'_>, batch_id: &str, as_json: bool) -> Result<()> {
    let id = parse_batch_id(batch_id)?;
    let batch = BatchService::new(stores.batches)
        .get_batch(id)?
        .ok_or(LabelError::BatchNotFound(id))?;
    let (coordinates, _) = CoordinateService::new(stores.coordinates).resolve(batch.label_type)?;
    let document = layout_document(&RenderRequest {
        label_type: batch.label_type,
        codes: &batch.codes,
        coordinates: &coordinates,
        template_ref: batch.label_type.config().template_ref,
    });
    let file_name = document_file_name_today(batch.label_type.prefix(), document.pages.len());

    if as_json {
        return print_json(&json!({ "file_name": file_name, "document": document }));
    }
    println!("{file_name} ({})", document.template_ref);
    for (index, page) in document.pages.iter().enumerate() {
        let anchors: Vec<String> = page
            .placements
            .iter()
            .map(|p| format!("{}@{:.1},{:.1}", p.anchor, p.x, p.y))
            .collect();
        println!("  page {:>4} {:<12} {}", index + 1, page.code, anchors.join(" "));
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn parse_label_type(raw: &str) -> Result<LabelType, LabelError> {
    Ok(raw.trim().parse::<LabelType>()?)
}

fn parse_anchor_arg(raw: &str) -> Result<(Anchor, AnchorPoint), String> {
    let (name, position) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=x,y, got `{raw}`"))?;
    let anchor = Anchor::parse(name).ok_or_else(|| format!("unknown anchor `{name}`"))?;
    let (x, y) = position
        .split_once(',')
        .ok_or_else(|| format!("expected x,y after `{name}=`"))?;
    let x = x.trim().parse::<f64>().map_err(|err| format!("x: {err}"))?;
    let y = y.trim().parse::<f64>().map_err(|err| format!("y: {err}"))?;
    Ok((anchor, AnchorPoint::new(x, y)))
}

fn print_coordinates(coordinates: &LabelCoordinates) {
    println!(
        "{} font_size={}",
        coordinates.label_type, coordinates.font_size
    );
    for anchor in Anchor::ALL {
        match coordinates.anchor(anchor) {
            Some(point) => println!("  {anchor} {:.2},{:.2}", point.x, point.y),
            None => println!("  {anchor} -"),
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_anchor_arg, Cli};
    use clap::Parser;
    use efolabel_core::Anchor;

    #[test]
    fn anchor_args_parse_name_and_point() {
        let (anchor, point) = parse_anchor_arg("rla2=170,75.5").unwrap();
        assert_eq!(anchor, Anchor::Rla2);
        assert_eq!((point.x, point.y), (170.0, 75.5));

        assert!(parse_anchor_arg("ILA1").is_err());
        assert!(parse_anchor_arg("XLA1=1,2").is_err());
        assert!(parse_anchor_arg("ILA1=1").is_err());
    }

    #[test]
    fn command_line_shape_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from([
            "efolabel",
            "--store",
            "local",
            "coords",
            "set",
            "Bobina",
            "--font-size",
            "9",
            "--anchor",
            "ILA1=50,25",
        ])
        .unwrap();
        assert_eq!(cli.store.as_deref(), Some("local"));
    }
}
