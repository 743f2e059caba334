//! UCE CLI - structural extraction and call graphs from the command line

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uce::batch::{BatchAnalyzer, FileAnalysis, analyze_file};
use uce::config::{UceConfig, default_config_path, load_config, write_config};
use uce::output::{OutputMode, emit_error, emit_success, is_quiet};
use uce::ui::{self, EntityRow, LanguageRow, ProgressManager, ProgressMessage, ProgressPhase, Spinner};
use uce::walk::collect_source_files;
use uce::{AstTransformer, CallExtractor, ParserManager, SupportedLanguage, detect_language};

#[derive(Parser)]
#[command(name = "uce")]
#[command(version)]
#[command(about = "Universal Code Entity extraction - language-agnostic structure and call graphs")]
#[command(long_about = r#"
UCE parses source files in 20+ languages into one schema of functions,
classes, interfaces, type aliases, variables and imports, and extracts the
calls each function makes.

Example usage:
  uce parse src/server.ts
  uce calls app/models/user.rb --json
  uce scan ./src --jobs 8
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print a JSON envelope instead of human output
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (defaults to ./uce.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract UCE entities from one file
    Parse {
        file: PathBuf,

        /// Leave declaration bodies out of the output
        #[arg(long)]
        no_bodies: bool,
    },

    /// List the calls made in one file
    Calls { file: PathBuf },

    /// Show supported languages and grammar status
    Languages,

    /// Analyze every supported file under a directory
    Scan {
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Worker threads
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Write a default uce.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Parse { .. } => "parse",
            Commands::Calls { .. } => "calls",
            Commands::Languages => "languages",
            Commands::Scan { .. } => "scan",
            Commands::Init { .. } => "init",
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("uce=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mode = OutputMode::from_flag(cli.json);
    let command = cli.command.name();
    if let Err(e) = run(cli, mode) {
        if mode.is_human() {
            ui::error(&format!("{:#}", e));
        } else {
            emit_error(mode, command, &format!("{:#}", e))?;
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run(cli: Cli, mode: OutputMode) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Parse { file, no_bodies } => {
            let mut config = config;
            if no_bodies {
                config.transform.include_bodies = false;
            }
            let analysis = analyze_one(&config, &file)?;
            if mode.is_human() {
                print_entities(&analysis);
            } else {
                emit_success(mode, "parse", &analysis.file)?;
            }
        }

        Commands::Calls { file } => {
            let analysis = analyze_one(&config, &file)?;
            if mode.is_human() {
                print_calls(&analysis);
            } else {
                emit_success(mode, "calls", &analysis.call_graph)?;
            }
        }

        Commands::Languages => {
            let mut manager = ParserManager::new(config.parser.clone());
            manager.initialize();
            let rows: Vec<LanguageRow> = SupportedLanguage::all()
                .iter()
                .map(|lang| LanguageRow::new(*lang, manager.status(*lang)))
                .collect();
            if mode.is_human() {
                println!("{}", ui::render(&rows));
            } else {
                let data: Vec<_> = rows
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "language": r.language,
                            "extensions": r.extensions,
                            "grammar": r.grammar,
                            "status": r.status,
                        })
                    })
                    .collect();
                emit_success(mode, "languages", data)?;
            }
        }

        Commands::Scan { path, jobs } => scan(config, &path, jobs, mode)?,

        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(default_config_path);
            write_config(&path, &UceConfig::default(), force)?;
            if mode.is_human() {
                ui::success(&format!("Wrote {}", path.display()));
            } else {
                emit_success(mode, "init", serde_json::json!({ "path": path.display().to_string() }))?;
            }
        }
    }

    Ok(())
}

fn analyze_one(config: &UceConfig, file: &Path) -> anyhow::Result<FileAnalysis> {
    let language = detect_language(file)
        .ok_or_else(|| anyhow::anyhow!("unsupported file type: {}", file.display()))?;
    let mut manager = ParserManager::new(config.parser.clone());
    manager.initialize();
    let transformer = AstTransformer::new(config.transform.clone());
    let analysis = analyze_file(&mut manager, &transformer, &CallExtractor::new(), file, language)?;
    if analysis.has_errors {
        tracing::warn!("{} has syntax errors; results are best effort", file.display());
    }
    Ok(analysis)
}

fn print_entities(analysis: &FileAnalysis) {
    let file = &analysis.file;
    ui::header(&format!("{} ({})", analysis.path, analysis.language));
    let rows: Vec<EntityRow> = file.entity_summaries().iter().map(EntityRow::from).collect();
    if rows.is_empty() {
        ui::info("Entities", "none");
    } else {
        println!("{}", ui::render(&rows));
    }

    if !file.imports.is_empty() {
        ui::section("Imports");
        for import in &file.imports {
            let names: Vec<_> = import.specifiers.iter().map(|s| s.local.as_str()).collect();
            ui::summary_row(&import.source, &names.join(", "));
        }
    }
    for error in &file.errors {
        ui::warn(&format!("line {}: {}", error.location.start_line, error.message));
    }
    ui::timing(&format!("parsed in {:.1} ms", analysis.parse_time_ms));
}

fn print_calls(analysis: &FileAnalysis) {
    let graph = &analysis.call_graph;
    ui::header(&format!("{} ({} calls)", analysis.path, graph.calls.len()));
    for (caller, callees) in &graph.calls_from {
        ui::section(caller);
        for callee in callees {
            // first site of each edge
            if let Some(call) = graph
                .calls
                .iter()
                .find(|c| &c.caller_name == caller && &c.callee_name == callee)
            {
                ui::call_edge(call);
            }
        }
    }
}

fn scan(config: UceConfig, path: &Path, jobs: Option<usize>, mode: OutputMode) -> anyhow::Result<()> {
    if !path.is_dir() {
        anyhow::bail!("not a directory: {}", path.display());
    }
    let started = Instant::now();
    let show_progress = mode.is_human() && !is_quiet();

    let spinner = show_progress.then(|| Spinner::new("Discovering files"));
    let files = collect_source_files(path, &config.scan.exclude);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    tracing::info!("Found {} source files under {}", files.len(), path.display());

    let mut analyzer = BatchAnalyzer::new(config);
    if let Some(jobs) = jobs {
        analyzer = analyzer.with_jobs(jobs);
    }

    let report = if show_progress {
        let (mut progress, tx) = ProgressManager::new();
        tx.send(ProgressMessage::Finished {
            phase: ProgressPhase::Discovering,
        })
        .ok();
        let report = analyzer.analyze(&files, Some(&tx));
        drop(tx);
        progress.finish_with_summary(started.elapsed(), report.analyses.len(), report.entity_count(), report.call_count());
        report
    } else {
        analyzer.analyze(&files, None)
    };

    if mode.is_human() {
        let mut by_language = std::collections::BTreeMap::<SupportedLanguage, usize>::new();
        for analysis in &report.analyses {
            *by_language.entry(analysis.language).or_default() += 1;
        }
        let mut stats: Vec<(&str, String)> = vec![
            ("Files", report.analyses.len().to_string()),
            ("Entities", report.entity_count().to_string()),
            ("Calls", report.call_count().to_string()),
            ("Failures", report.failures.len().to_string()),
            ("Workers", analyzer.jobs().to_string()),
        ];
        stats.extend(by_language.iter().map(|(lang, count)| (lang.as_str(), count.to_string())));
        println!("{}", ui::stats_table(&stats));
        for failure in &report.failures {
            ui::warn(&format!("{}: {}", failure.path, failure.error));
        }
    } else {
        emit_success(mode, "scan", &report)?;
    }
    Ok(())
}
