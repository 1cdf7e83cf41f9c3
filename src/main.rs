//! LayoutView CLI
//!
//! Command-line front end: dump the on-disk layout of a file as a tree,
//! list its allocated ranges, or edit the persisted viewer settings.

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use layoutview::{
    format_size, inspector::status_message, Column, LayoutConfig, LayoutInspector, LayoutTree,
    NodeId, Settings, SortKey, SortOrder,
};
use log::LevelFilter;
use std::time::Instant;

/// LayoutView - NTFS file layout inspector
///
/// Shows the names, streams, extents and metadata counters the filesystem
/// keeps for a single file.
#[derive(Parser)]
#[command(name = "layoutview")]
#[command(author = "LayoutView Contributors")]
#[command(version)]
#[command(about = "NTFS file layout inspector", long_about = None)]
struct Cli {
    /// Log debug detail to layoutview.log
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the file layout tree of a file
    Layout {
        /// File to inspect (must live on a drive-letter volume)
        path: String,

        /// Sort the flattened view by this column
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Sort descending instead of ascending
        #[arg(long, requires = "sort")]
        descending: bool,

        /// Show only the top-level nodes
        #[arg(long)]
        collapsed: bool,

        /// Skip the metadata optimization counters
        #[arg(long)]
        no_metadata: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: String,
    },

    /// List the allocated byte ranges of a file
    Ranges {
        /// File to scan
        path: String,

        /// Stop after this many ranges
        #[arg(short, long)]
        max: Option<u64>,
    },

    /// Show or update the saved column layout
    Settings {
        /// New column layout blob
        #[arg(long)]
        columns: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Index,
    Name,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    layoutview::logging::init(level);
    log::info!("LayoutView {} starting up", layoutview::VERSION);

    let result = match cli.command {
        Commands::Layout {
            path,
            sort,
            descending,
            collapsed,
            no_metadata,
            output,
        } => cmd_layout(&path, sort, descending, collapsed, no_metadata, &output),

        Commands::Ranges { path, max } => cmd_ranges(&path, max),

        Commands::Settings { columns } => cmd_settings(columns),
    };

    layoutview::logging::flush();

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

/// Layout command implementation
fn cmd_layout(
    path: &str,
    sort: Option<SortArg>,
    descending: bool,
    collapsed: bool,
    no_metadata: bool,
    output_format: &str,
) -> layoutview::Result<()> {
    let json = output_format == "json";
    let config = LayoutConfig {
        query_metadata_optimization: !no_metadata,
        show_progress: !json,
        ..Default::default()
    };

    let mut tree = LayoutTree::new();
    let result = LayoutInspector::new(path)
        .with_config(config)
        .inspect(&mut tree);

    if let Some(sort) = sort {
        let key = match sort {
            SortArg::Index => SortKey::Index,
            SortArg::Name => SortKey::Name,
        };
        let order = if descending { SortOrder::Descending } else { SortOrder::Ascending };
        tree.set_sort(key, order);
    }

    if collapsed {
        tree.expand_all(false);
    }

    if json {
        let status = result.as_ref().err().map(status_message);
        println!(
            "{}",
            serde_json::json!({
                "path": path,
                "status": status,
                "nodes": tree.snapshot(),
            })
        );
        return Ok(());
    }

    println!("{} {}", style("→").cyan().bold(), style(path).yellow());
    println!();
    print_level(&tree, None, 0);

    match result {
        Ok(stats) => {
            println!();
            println!(
                "{} {} entries, {} names, {} streams",
                style("✓").green().bold(),
                stats.entries,
                stats.names,
                stats.streams
            );
            Ok(())
        }
        Err(e) => {
            println!();
            println!("{}", style(status_message(&e)).red());
            Err(e)
        }
    }
}

fn print_level(tree: &LayoutTree, parent: Option<NodeId>, depth: usize) {
    for id in tree.children(parent) {
        let name = tree.cell_text(id, Column::Name).unwrap_or_default();
        let value = tree.cell_text(id, Column::Value).unwrap_or_default();
        println!(
            "{}{} {}",
            "  ".repeat(depth + 1),
            style(format!("{}:", name)).bold(),
            value
        );

        let expanded = tree.find(id).map(|node| node.expanded).unwrap_or(false);
        if expanded && !tree.is_leaf(id) {
            print_level(tree, Some(id), depth + 1);
        }
    }
}

/// Ranges command implementation
fn cmd_ranges(path: &str, max: Option<u64>) -> layoutview::Result<()> {
    println!(
        "{} Allocated ranges of {}",
        style("→").cyan().bold(),
        style(path).yellow()
    );

    let start = Instant::now();
    let mut total = 0u64;
    let mut shown = 0u64;

    LayoutInspector::new(path).allocated_ranges(|offset, length| {
        shown += 1;
        total += length;
        println!(
            "  {} {:#014x} .. {:#014x}  {}",
            style(format!("{:4}.", shown)).dim(),
            offset,
            offset.saturating_add(length),
            style(format_size(length)).yellow()
        );
        max.map_or(true, |max| shown < max)
    })?;

    println!();
    println!(
        "{} {} ranges, {} allocated in {:.2}s",
        style("✓").green().bold(),
        shown,
        format_size(total),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Settings command implementation
fn cmd_settings(columns: Option<String>) -> layoutview::Result<()> {
    let mut settings = Settings::load()?;

    if let Some(columns) = columns {
        settings.layout_tree_columns = columns;
        settings.save()?;
        println!("{} Settings saved", style("✓").green().bold());
    }

    println!(
        "  {} {}",
        style("Settings file:").bold(),
        layoutview::settings::settings_file_path().display()
    );
    println!(
        "  {} {}",
        style("Layout tree columns:").bold(),
        if settings.layout_tree_columns.is_empty() {
            "(default)"
        } else {
            settings.layout_tree_columns.as_str()
        }
    );

    Ok(())
}
