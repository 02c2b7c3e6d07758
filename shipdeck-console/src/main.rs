//! Shipdeck console
//!
//! Loads a record grid from a JSON fixture or the REST backend, applies
//! filters, sort and scroll from the command line, optionally performs an
//! inline or bulk edit, and prints the mounted window.

mod error;
mod paths;
mod render;
mod settings;
mod source;

use std::fs;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use shipdeck_grid::RecordGrid;
use shipdeck_grid::column::MonospaceMeasure;
use shipdeck_grid::column::shipment_columns;
use shipdeck_grid::column::transport_columns;
use shipdeck_grid::edit::CommitOutcome;
use shipdeck_grid::edit::EditCapabilities;
use shipdeck_grid::filter::FilterValue;
use shipdeck_grid::filter::SortKey;
use shipdeck_grid::scroll::ScrollRequest;
use shipdeck_lib::model::RecordId;
use shipdeck_lib::model::RecordKind;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

use crate::error::ConsoleError;
use crate::settings::GridPreferences;
use crate::settings::PreferenceStore;
use crate::settings::SqlitePreferences;

#[derive(Parser)]
#[command(name = "shipdeck")]
#[command(about = "Shipment and transport grids from the command line")]
#[command(version)]
struct Cli {
    /// Grid to open
    #[arg(long, value_enum, default_value_t = GridArg::Shipments)]
    grid: GridArg,

    /// JSON fixture to load instead of the REST backend
    #[arg(long, env = "SHIPDECK_FIXTURE")]
    fixture: Option<PathBuf>,

    /// JSON file overriding grid configuration keys
    #[arg(long)]
    config: Option<PathBuf>,

    /// Open the grid read-only
    #[arg(long)]
    read_only: bool,

    /// Neither read nor save grid preferences
    #[arg(long)]
    no_preferences: bool,

    /// Forget saved preferences before opening
    #[arg(long)]
    reset_preferences: bool,

    /// Log level written to the log file
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    #[command(flatten)]
    view: ViewArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Copy, ValueEnum)]
enum GridArg {
    Shipments,
    Transports,
}

impl GridArg {
    fn kind(self) -> RecordKind {
        match self {
            GridArg::Shipments => RecordKind::Shipment,
            GridArg::Transports => RecordKind::Transport,
        }
    }
}

#[derive(Args)]
struct ViewArgs {
    /// Viewport width in pixels
    #[arg(long, default_value_t = 1_280.0)]
    width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Vertical scroll offset in pixels
    #[arg(long, default_value_t = 0.0)]
    scroll: f64,

    /// Horizontal scroll offset in pixels
    #[arg(long, default_value_t = 0.0)]
    scroll_left: f64,

    /// Scroll so that this row is visible
    #[arg(long, value_name = "INDEX")]
    reveal: Option<usize>,

    /// Column filter, repeatable. Comma-separated values match any.
    /// Examples: 'naviera=MSC', 'pol=SAN ANTONIO,VALPARAISO'
    #[arg(long, value_name = "COLUMN=VALUE")]
    filter: Vec<String>,

    /// Status pill
    #[arg(long)]
    status: Option<String>,

    /// Text searched across every filterable column
    #[arg(long)]
    search: Option<String>,

    /// Only rows of this executive
    #[arg(long)]
    executive: Option<String>,

    /// Sort column, repeatable; prefix with '-' for descending
    #[arg(long, value_name = "COLUMN", allow_hyphen_values = true)]
    sort: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the grid (default)
    Show,

    /// Edit one cell. With --select, the edit applies to every selected row.
    Edit {
        id: String,
        field: String,
        value: String,

        /// Select these rows first, repeatable
        #[arg(long, value_name = "ID")]
        select: Vec<String>,
    },

    /// Write one value to several rows
    Bulk {
        field: String,
        value: String,

        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Drag a column's resize handle by DELTA pixels
    Resize {
        column: String,
        #[arg(allow_hyphen_values = true)]
        delta: i32,
    },

    /// Fit a column to its contents
    Fit { column: String },

    /// Show or hide a column
    Toggle { column: String },
}

fn init_logging(level: LevelFilter) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else {
        return;
    };
    match File::create(&path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(level, Config::default(), file) {
                eprintln!("warning: logging disabled: {e}");
            }
        }
        Err(e) => eprintln!("warning: cannot write {}: {e}", path.display()),
    }
}

async fn open_preferences() -> Option<Box<dyn PreferenceStore>> {
    let path = paths::settings_db()?;
    if let Some(dir) = path.parent()
        && let Err(e) = fs::create_dir_all(dir)
    {
        log::warn!("Preferences disabled, cannot create {}: {e}", dir.display());
        return None;
    }
    match SqlitePreferences::open(&path).await {
        Ok(store) => Some(Box::new(store)),
        Err(e) => {
            log::warn!("Preferences disabled: {e}");
            None
        }
    }
}

fn parse_filter(arg: &str) -> Result<(String, FilterValue), ConsoleError> {
    let (column, value) = arg
        .split_once('=')
        .filter(|(column, _)| !column.trim().is_empty())
        .ok_or_else(|| ConsoleError::InvalidFilter(arg.to_string()))?;
    let values: Vec<&str> = value.split(',').map(str::trim).collect();
    let value = match values.as_slice() {
        [single] => FilterValue::from(*single),
        many => FilterValue::one_of(many.iter().copied()),
    };
    Ok((column.trim().to_string(), value))
}

fn parse_sort(arg: &str) -> SortKey {
    match arg.strip_prefix('-') {
        Some(column) => SortKey::desc(column),
        None => SortKey::asc(arg),
    }
}

fn apply_view(grid: &mut RecordGrid, args: &ViewArgs) -> Result<(), ConsoleError> {
    for arg in &args.filter {
        let (column, value) = parse_filter(arg)?;
        grid.set_column_filter(&column, Some(value));
    }
    grid.set_status_filter(args.status.as_deref());
    if let Some(search) = &args.search {
        grid.set_global_filter(search);
    }
    grid.set_executive_filter(args.executive.as_deref());
    if !args.sort.is_empty() {
        grid.set_sort(args.sort.iter().map(|s| parse_sort(s)).collect());
    }

    grid.set_viewport(args.width, args.height);
    grid.scroll(ScrollRequest::ToOffset(args.scroll));
    if let Some(index) = args.reveal {
        grid.scroll_into_view(index);
    }
    grid.scroll_horizontally(args.scroll_left);
    Ok(())
}

async fn run_command(grid: &mut RecordGrid, command: Command) -> Result<(), ConsoleError> {
    match command {
        Command::Show => {}
        Command::Edit {
            id,
            field,
            value,
            select,
        } => {
            for selected in select {
                grid.toggle_selected(&RecordId::new(selected));
            }
            let handoff = grid.request_edit(id, &field).await?;
            if !handoff.options.is_empty() && !handoff.options.iter().any(|o| *o == value) {
                println!("note: '{value}' is not one of {}", handoff.options.join(", "));
            }
            grid.edit_input(&value)?;
            match grid.commit_edit().await? {
                CommitOutcome::Unchanged(target) => println!("{target} unchanged"),
                CommitOutcome::Saved { target, value } => {
                    println!("{target} = {}", value.to_text());
                }
                CommitOutcome::Bulk(report) => print_bulk(&report),
            }
        }
        Command::Bulk { field, value, ids } => {
            for id in ids {
                grid.toggle_selected(&RecordId::new(id));
            }
            let value = grid.parse_input(&field, &value)?;
            let report = grid.bulk_edit(&field, value).await?;
            print_bulk(&report);
        }
        Command::Resize { column, delta } => match grid.resize_column(&column, delta) {
            Some(width) => println!("{column}: {width}px"),
            None => println!("{column} cannot be resized"),
        },
        Command::Fit { column } => match grid.auto_fit_column(&column, &MonospaceMeasure::default()) {
            Some(width) => println!("{column}: {width}px"),
            None => println!("{column} has a fixed width"),
        },
        Command::Toggle { column } => {
            if !grid.toggle_column(&column) {
                println!("{column} is always visible");
            }
        }
    }
    Ok(())
}

fn print_bulk(report: &shipdeck_grid::bulk::BulkReport) {
    println!(
        "{}: {} of {} updated",
        report.field,
        report.updated.len(),
        report.attempted()
    );
    for (id, message) in &report.failed {
        println!("  {id}: {message}");
    }
}

async fn run(cli: Cli) -> Result<(), ConsoleError> {
    let kind = cli.grid.kind();
    let config = source::load_config(cli.config.as_deref(), kind)?;
    let backend = match &cli.fixture {
        Some(path) => source::from_fixture(path)?,
        None => source::from_env()?,
    };

    let columns = match kind {
        RecordKind::Shipment => shipment_columns(),
        RecordKind::Transport => transport_columns(),
    };
    let capabilities = if cli.read_only {
        EditCapabilities::viewer()
    } else {
        EditCapabilities::editor()
    };
    let mut grid = backend.hooks.into_iter().fold(
        RecordGrid::new(kind, config, columns, backend.records, backend.catalogs)
            .with_capabilities(capabilities)
            .with_queue(backend.queue),
        RecordGrid::with_hook,
    );

    let preferences = if cli.no_preferences {
        None
    } else {
        open_preferences().await
    };
    if let Some(preferences) = &preferences {
        if cli.reset_preferences {
            preferences.clear(kind).await?;
        }
        preferences.load(kind).await?.apply(&mut grid);
    } else {
        grid.mount(Default::default());
    }

    grid.reload().await?;
    apply_view(&mut grid, &cli.view)?;
    let command = run_command(&mut grid, cli.command.unwrap_or(Command::Show)).await;
    // transport sync and history must finish before the runtime shuts down
    grid.settle_hooks().await;
    command?;

    print!("{}", render::render(&grid, &grid.view()));

    if let Some(preferences) = &preferences {
        preferences
            .save(kind, &GridPreferences::capture(&grid))
            .await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_arguments() {
        let (column, value) = parse_filter("naviera=MSC").unwrap();
        assert_eq!(column, "naviera");
        assert_eq!(value, FilterValue::from("MSC"));

        let (_, value) = parse_filter("pol = SAN ANTONIO, VALPARAISO").unwrap();
        assert_eq!(value, FilterValue::one_of(["SAN ANTONIO", "VALPARAISO"]));

        assert!(parse_filter("naviera").is_err());
        assert!(parse_filter("=MSC").is_err());
    }

    #[test]
    fn test_sort_arguments() {
        assert_eq!(parse_sort("-etd"), SortKey::desc("etd"));
        assert_eq!(parse_sort("naviera"), SortKey::asc("naviera"));
    }

    #[test]
    fn test_cli_parses_edit_with_selection() {
        let cli = Cli::try_parse_from([
            "shipdeck",
            "--fixture",
            "fleet.json",
            "edit",
            "r1",
            "naviera",
            "HAPAG",
            "--select",
            "r1",
            "--select",
            "r2",
        ])
        .unwrap();
        let Some(Command::Edit { id, select, .. }) = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(id, "r1");
        assert_eq!(select, ["r1", "r2"]);
    }
}
