//! Tipforge CLI: browse the tip catalogue and run content enrichment.
//!
//! Usage:
//!   tipforge import <seed.yaml> [--db path]
//!   tipforge list [--category c] [--difficulty d] [--search s] [--sort mode] [--page n]
//!   tipforge enhance [ids...] [--out file]

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tipforge::catalogue::{sort_records, Page, DEFAULT_RELATED_COUNT};
use tipforge::config::default_db_path;
use tipforge::enrich::estimate_cost;
use tipforge::llm::generator_from_config;
use tipforge::storage::{export_for_design, parse_seed};
use tipforge::{
    CatalogueEngine, ContentRecord, EnrichedContent, EnrichmentPipeline, OpenStore, Platform,
    SeedFile, SortMode, SqliteTipStore, TipFilter, TipId, TipStore, TipforgeConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "tipforge",
    version,
    about = "Tip catalogue queries and batch content enrichment"
)]
struct Cli {
    /// Path to config file (default: <data dir>/tipforge/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Read the catalogue from a YAML seed file instead of the database
    #[arg(long, global = true, conflicts_with = "db")]
    seed: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import tips from a YAML seed file into the database
    Import {
        /// Seed file to import
        file: PathBuf,
    },
    /// List tips, optionally filtered, sorted and paged
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        search: Option<String>,
        /// Match tips sharing any of these tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// newest, popular, trending or readtime
        #[arg(long)]
        sort: Option<SortMode>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        page_size: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the top tips by a sort order
    Top {
        #[arg(long, default_value = "popular")]
        by: SortMode,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show one tip and count a view
    Show {
        id: String,
        /// Count a download as well
        #[arg(long)]
        download: bool,
    },
    /// List tips related to a tip
    Related {
        id: String,
        #[arg(long, default_value_t = DEFAULT_RELATED_COUNT)]
        count: usize,
    },
    /// Catalogue statistics
    Stats,
    /// Enrich tips through the text-generation service
    Enhance {
        /// Tips to enrich (default: the whole catalogue)
        ids: Vec<String>,
        /// Write artifacts to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate several versions of one tip
    Variations {
        id: String,
        #[arg(long, default_value_t = 3)]
        count: u32,
    },
    /// Enrich one tip and rework it for a platform (pdf, canva, web)
    Optimize {
        id: String,
        #[arg(long)]
        platform: Platform,
    },
    /// Token and cost totals for a file of enrichment artifacts
    Cost {
        /// JSON file written by `enhance --out`
        file: PathBuf,
    },
    /// Design briefs for tips (default: all)
    Export {
        ids: Vec<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tipforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_db(db: Option<PathBuf>) -> Result<SqliteTipStore, String> {
    let db_path = db.unwrap_or_else(default_db_path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    SqliteTipStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))
}

fn open_catalogue(
    db: Option<PathBuf>,
    seed: Option<PathBuf>,
    config: &TipforgeConfig,
) -> Result<CatalogueEngine, String> {
    let store: Arc<dyn TipStore> = match seed {
        Some(path) => Arc::new(SeedFile::new(path)),
        None => Arc::new(open_db(db)?),
    };
    let engine = CatalogueEngine::new(store)
        .with_trending_policy(config.catalogue.trending_policy());
    engine
        .initialize()
        .map_err(|e| format!("Failed to load catalogue: {}", e))?;
    Ok(engine)
}

/// Open the catalogue and run `f` against it
fn with_catalogue<F>(
    db: Option<PathBuf>,
    seed: Option<PathBuf>,
    config: &TipforgeConfig,
    f: F,
) -> i32
where
    F: FnOnce(&CatalogueEngine) -> i32,
{
    match open_catalogue(db, seed, config) {
        Ok(engine) => f(&engine),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Runtime::new().map_err(|e| format!("Failed to start runtime: {}", e))
}

fn pipeline(config: &TipforgeConfig) -> EnrichmentPipeline {
    EnrichmentPipeline::new(
        generator_from_config(&config.llm),
        config.llm.completion_options(),
        config.enrichment.clone(),
    )
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn print_table(records: &[ContentRecord]) {
    println!(
        "{:<10}  {:<10}  {:<9}  {:>6}  {:>6}  TITLE",
        "ID", "CATEGORY", "LEVEL", "VIEWS", "MIN"
    );
    println!("{}", "-".repeat(72));
    for r in records {
        println!(
            "{:<10}  {:<10}  {:<9}  {:>6}  {:>6}  {}",
            r.id.as_str(),
            r.category.as_str(),
            r.difficulty.as_str(),
            r.view_count,
            r.content.read_time,
            r.content.title
        );
    }
}

fn find_tip(engine: &CatalogueEngine, id: &str) -> Result<ContentRecord, i32> {
    engine.get_by_id(&TipId::from(id)).ok_or_else(|| {
        eprintln!("Error: tip '{}' not found", id);
        1
    })
}

fn cmd_import(db: Option<PathBuf>, file: &Path) -> i32 {
    let text = match std::fs::read_to_string(file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", file.display(), e);
            return 1;
        }
    };
    let records = match parse_seed(&text) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let store = match open_db(db) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    match store.import_records(&records) {
        Ok(report) => {
            println!("Imported {} of {} tips", report.imported, records.len());
            for err in &report.errors {
                eprintln!("Batch {} failed: {}", err.batch, err.message);
            }
            if report.is_success() {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_list(
    engine: &CatalogueEngine,
    config: &TipforgeConfig,
    category: Option<String>,
    difficulty: Option<String>,
    search: Option<String>,
    tags: Vec<String>,
    sort: Option<SortMode>,
    page: usize,
    page_size: usize,
    json: bool,
) -> i32 {
    let mut filter = TipFilter::new().with_tags(tags);
    if let Some(c) = category {
        filter = filter.with_category_str(&c);
    }
    if let Some(d) = difficulty {
        filter = filter.with_difficulty_str(&d);
    }
    if let Some(s) = search {
        filter = filter.with_search(s);
    }

    let result = match sort {
        Some(mode) => {
            let mut matches = engine.filter(&filter);
            sort_records(
                &mut matches,
                mode,
                &config.catalogue.trending_policy(),
                Utc::now(),
            );
            Page::slice(matches, page, page_size)
        }
        None => engine.get_paginated(page, page_size, Some(&filter)),
    };

    if json {
        return print_json(&result);
    }
    if result.total_tips == 0 {
        println!("No tips match.");
        return 0;
    }
    print_table(&result.tips);
    println!(
        "Page {} of {} ({} tips)",
        result.current_page, result.total_pages, result.total_tips
    );
    0
}

fn cmd_top(engine: &CatalogueEngine, by: SortMode, limit: usize) -> i32 {
    let sorted = engine.get_sorted_by(by);
    print_table(&sorted[..limit.min(sorted.len())]);
    0
}

fn cmd_show(engine: &CatalogueEngine, id: &str, download: bool) -> i32 {
    let tip_id = TipId::from(id);
    if let Err(code) = find_tip(engine, id) {
        return code;
    }
    engine.increment_view(&tip_id);
    if download {
        engine.increment_download(&tip_id);
    }
    match engine.get_by_id(&tip_id) {
        Some(record) => print_json(&record),
        None => 1,
    }
}

fn cmd_related(engine: &CatalogueEngine, id: &str, count: usize) -> i32 {
    if let Err(code) = find_tip(engine, id) {
        return code;
    }
    let related = engine.get_related(&TipId::from(id), count);
    if related.is_empty() {
        println!("No related tips.");
        return 0;
    }
    print_table(&related);
    0
}

fn cmd_stats(engine: &CatalogueEngine) -> i32 {
    print_json(&engine.get_stats())
}

fn cmd_enhance(
    engine: &CatalogueEngine,
    config: &TipforgeConfig,
    ids: &[String],
    out: Option<&Path>,
) -> i32 {
    let records = if ids.is_empty() {
        engine.get_all()
    } else {
        let mut selected = Vec::with_capacity(ids.len());
        for id in ids {
            match find_tip(engine, id) {
                Ok(r) => selected.push(r),
                Err(code) => return code,
            }
        }
        selected
    };

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let pipeline = pipeline(config);
    let report = rt.block_on(async {
        let token = pipeline.cancellation_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Cancelling after the current tip...");
                token.cancel();
            }
        });
        pipeline
            .enhance_all_with_progress(&records, |done, total| {
                eprintln!("Processed {}/{}", done, total);
            })
            .await
    });

    for failure in &report.failures {
        eprintln!("Failed: {}", failure);
    }
    let estimate = pipeline.estimate_cost(&report.enriched);
    eprintln!(
        "Enriched {} of {} tips, {} tokens, estimated cost ${:.4}",
        report.enriched.len(),
        records.len(),
        estimate.total_tokens,
        estimate.estimated_cost
    );

    let code = match out {
        Some(path) => match serde_json::to_string_pretty(&report.enriched) {
            Ok(text) => match std::fs::write(path, text) {
                Ok(()) => {
                    println!("Wrote {} artifacts to {}", report.enriched.len(), path.display());
                    0
                }
                Err(e) => {
                    eprintln!("Error: cannot write '{}': {}", path.display(), e);
                    1
                }
            },
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        None => print_json(&report.enriched),
    };

    if code == 0 && report.is_complete() {
        0
    } else {
        1
    }
}

fn cmd_variations(engine: &CatalogueEngine, config: &TipforgeConfig, id: &str, count: u32) -> i32 {
    let record = match find_tip(engine, id) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let pipeline = pipeline(config);
    match rt.block_on(pipeline.generate_variations(&record, count)) {
        Ok(variations) => print_json(&variations),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_optimize(engine: &CatalogueEngine, config: &TipforgeConfig, id: &str, platform: Platform) -> i32 {
    let record = match find_tip(engine, id) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let pipeline = pipeline(config);
    let result = rt.block_on(async {
        let enriched = pipeline.enhance(&record).await?;
        pipeline.optimize_for_platform(&enriched, platform).await
    });
    match result {
        Ok(content) => print_json(&content),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_cost(config: &TipforgeConfig, file: &Path) -> i32 {
    let text = match std::fs::read_to_string(file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", file.display(), e);
            return 1;
        }
    };
    match serde_json::from_str::<Vec<EnrichedContent>>(&text) {
        Ok(artifacts) => print_json(&estimate_cost(
            &artifacts,
            config.enrichment.cost_per_1k_tokens,
        )),
        Err(e) => {
            eprintln!("Error: '{}' is not an artifact list: {}", file.display(), e);
            1
        }
    }
}

fn cmd_export(engine: &CatalogueEngine, ids: &[String]) -> i32 {
    let ids: Vec<TipId> = ids.iter().map(|id| TipId::from(id.as_str())).collect();
    print_json(&export_for_design(&engine.get_all(), &ids))
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = match TipforgeConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let (db, seed) = (cli.db, cli.seed);
    let code = match cli.command {
        Commands::Import { file } => cmd_import(db, &file),
        Commands::Cost { file } => cmd_cost(&config, &file),
        Commands::List {
            category,
            difficulty,
            search,
            tags,
            sort,
            page,
            page_size,
            json,
        } => with_catalogue(db, seed, &config, |engine| {
            cmd_list(
                engine, &config, category, difficulty, search, tags, sort, page, page_size, json,
            )
        }),
        Commands::Top { by, limit } => {
            with_catalogue(db, seed, &config, |engine| cmd_top(engine, by, limit))
        }
        Commands::Show { id, download } => {
            with_catalogue(db, seed, &config, |engine| cmd_show(engine, &id, download))
        }
        Commands::Related { id, count } => {
            with_catalogue(db, seed, &config, |engine| cmd_related(engine, &id, count))
        }
        Commands::Stats => with_catalogue(db, seed, &config, cmd_stats),
        Commands::Enhance { ids, out } => with_catalogue(db, seed, &config, |engine| {
            cmd_enhance(engine, &config, &ids, out.as_deref())
        }),
        Commands::Variations { id, count } => with_catalogue(db, seed, &config, |engine| {
            cmd_variations(engine, &config, &id, count)
        }),
        Commands::Optimize { id, platform } => with_catalogue(db, seed, &config, |engine| {
            cmd_optimize(engine, &config, &id, platform)
        }),
        Commands::Export { ids } => {
            with_catalogue(db, seed, &config, |engine| cmd_export(engine, &ids))
        }
    };
    std::process::exit(code);
}
