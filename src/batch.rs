//! Parallel analysis driver
//!
//! Parsing and transformation are synchronous and single-threaded, so a
//! batch fans files out to worker threads that each own a [`ParserManager`].
//! Workers share nothing but two channels: paths in, [`AnalysisMessage`]s out.

use crate::calls::{CallExtractor, FileCallGraph};
use crate::config::UceConfig;
use crate::parser::ParserManager;
use crate::transform::AstTransformer;
use crate::uce::UceFile;
use crate::ui::{ProgressMessage, ProgressPhase};
use crate::{AnalysisMessage, Result, SupportedLanguage};
use crossbeam::channel::{self, Sender};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Everything produced for one file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalysis {
    pub path: String,
    pub language: SupportedLanguage,
    pub parse_time_ms: f64,
    pub has_errors: bool,
    pub file: UceFile,
    pub call_graph: FileCallGraph,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub analyses: Vec<FileAnalysis>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn entity_count(&self) -> usize {
        self.analyses.iter().map(|a| a.file.entity_count()).sum()
    }

    pub fn call_count(&self) -> usize {
        self.analyses.iter().map(|a| a.call_graph.calls.len()).sum()
    }
}

/// Parse, transform and extract calls for one in-memory source
pub fn analyze_source(
    manager: &mut ParserManager,
    transformer: &AstTransformer,
    extractor: &CallExtractor,
    path: &str,
    source: &str,
    language: SupportedLanguage,
) -> Result<FileAnalysis> {
    let parsed = manager.parse_code(source, language)?;
    let file = transformer.transform_parsed(&parsed, path);
    let calls = extractor.extract_from_uce(&file, &parsed.tree, &parsed.source_code);
    Ok(FileAnalysis {
        path: path.to_string(),
        language,
        parse_time_ms: parsed.parse_time_ms,
        has_errors: parsed.has_errors,
        call_graph: FileCallGraph::from_calls(path, calls),
        file,
    })
}

pub fn analyze_file(
    manager: &mut ParserManager,
    transformer: &AstTransformer,
    extractor: &CallExtractor,
    path: &Path,
    language: SupportedLanguage,
) -> Result<FileAnalysis> {
    let source = std::fs::read_to_string(path)?;
    let display = path.to_string_lossy().replace('\\', "/");
    analyze_source(manager, transformer, extractor, &display, &source, language)
}

fn default_jobs() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
}

pub struct BatchAnalyzer {
    config: UceConfig,
    jobs: usize,
}

impl BatchAnalyzer {
    pub fn new(config: UceConfig) -> Self {
        let jobs = config.scan.jobs.unwrap_or_else(default_jobs).max(1);
        Self { config, jobs }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Analyze `files` on up to `jobs` threads; results are sorted by path
    pub fn analyze(&self, files: &[(PathBuf, SupportedLanguage)], progress: Option<&Sender<ProgressMessage>>) -> BatchReport {
        let mut report = BatchReport::default();
        if files.is_empty() {
            return report;
        }
        if let Some(tx) = progress {
            tx.send(ProgressMessage::Started {
                phase: ProgressPhase::Analyzing,
                total: files.len(),
            })
            .ok();
        }

        let (job_tx, job_rx) = channel::unbounded::<&(PathBuf, SupportedLanguage)>();
        for file in files {
            job_tx.send(file).ok();
        }
        drop(job_tx);

        let (result_tx, result_rx) = channel::unbounded::<AnalysisMessage>();
        let workers = self.jobs.min(files.len());
        tracing::debug!("Analyzing {} files on {} workers", files.len(), workers);

        let scoped = crossbeam::scope(|s| {
            for id in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let progress = progress.cloned();
                s.spawn(move |_| {
                    let mut manager = ParserManager::new(self.config.parser.clone());
                    manager.initialize();
                    let transformer = AstTransformer::new(self.config.transform.clone());
                    let extractor = CallExtractor::new();

                    for (path, language) in job_rx.iter() {
                        let display = path.to_string_lossy().replace('\\', "/");
                        let message = match analyze_file(&mut manager, &transformer, &extractor, path, *language) {
                            Ok(analysis) => {
                                if let Some(tx) = &progress {
                                    tx.send(ProgressMessage::Progress {
                                        phase: ProgressPhase::Analyzing,
                                        file: Some(display),
                                    })
                                    .ok();
                                }
                                AnalysisMessage::Analyzed(Box::new(analysis))
                            }
                            Err(e) => {
                                if let Some(tx) = &progress {
                                    tx.send(ProgressMessage::Failed {
                                        file: display.clone(),
                                        error: e.to_string(),
                                    })
                                    .ok();
                                }
                                AnalysisMessage::Failed {
                                    path: display,
                                    error: e.to_string(),
                                }
                            }
                        };
                        if result_tx.send(message).is_err() {
                            break;
                        }
                    }
                    manager.close();
                    tracing::trace!("Worker {} done", id);
                });
            }
            drop(result_tx);

            for message in result_rx.iter() {
                match message {
                    AnalysisMessage::Analyzed(analysis) => report.analyses.push(*analysis),
                    AnalysisMessage::Failed { path, error } => {
                        tracing::warn!("Failed to analyze {}: {}", path, error);
                        report.failures.push(BatchFailure { path, error });
                    }
                }
            }
        });
        if scoped.is_err() {
            tracing::error!("A batch worker panicked; its remaining files were not analyzed");
        }

        if let Some(tx) = progress {
            tx.send(ProgressMessage::Finished {
                phase: ProgressPhase::Analyzing,
            })
            .ok();
        }
        report.analyses.sort_by(|a, b| a.path.cmp(&b.path));
        report.failures.sort_by(|a, b| a.path.cmp(&b.path));
        report
    }
}
