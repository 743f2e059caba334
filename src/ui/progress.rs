use crate::ui::progress_message::{ProgressMessage, ProgressPhase};
use crate::ui::theme;
use crate::ui::Icons;
use indicatif::{HumanDuration, MultiProgress, ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Progress display for a directory scan, driven over a channel so worker
/// threads never touch the terminal
pub struct ProgressManager {
    mp: MultiProgress,
    discovering: ProgressBar,
    analyzing: ProgressBar,
    failures: Arc<AtomicUsize>,
    handle: Option<thread::JoinHandle<()>>,
}

fn visible(bar: ProgressBar) -> ProgressBar {
    if console::Term::stderr().is_term() {
        bar
    } else {
        ProgressBar::hidden()
    }
}

impl ProgressManager {
    pub fn new() -> (Self, crossbeam::channel::Sender<ProgressMessage>) {
        let (tx, rx) = crossbeam::channel::unbounded::<ProgressMessage>();

        let mp = MultiProgress::new();
        let discovering = visible(mp.add(ProgressBar::new_spinner().with_message("Discovering files")));
        let analyzing = visible(mp.add(ProgressBar::new(0).with_message("Analyzing")));
        if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}") {
            analyzing.set_style(style);
        }

        let failures = Arc::new(AtomicUsize::new(0));
        let failures_clone = failures.clone();
        let discovering_clone = discovering.clone();
        let analyzing_clone = analyzing.clone();

        let handle = thread::spawn(move || {
            for msg in rx {
                match msg {
                    ProgressMessage::Started {
                        phase: ProgressPhase::Discovering,
                        ..
                    } => {
                        discovering_clone.enable_steady_tick(Duration::from_millis(100));
                    }
                    ProgressMessage::Started {
                        phase: ProgressPhase::Analyzing,
                        total,
                    } => {
                        analyzing_clone.set_length(total as u64);
                    }
                    ProgressMessage::Progress {
                        phase: ProgressPhase::Analyzing,
                        file,
                    } => {
                        analyzing_clone.inc(1);
                        if let Some(ref f) = file {
                            analyzing_clone.set_message(f.clone());
                        }
                    }
                    ProgressMessage::Progress { .. } => {}
                    ProgressMessage::Finished {
                        phase: ProgressPhase::Discovering,
                    } => {
                        discovering_clone.finish_and_clear();
                    }
                    ProgressMessage::Finished {
                        phase: ProgressPhase::Analyzing,
                    } => {
                        analyzing_clone.finish_with_message("Done");
                    }
                    ProgressMessage::Failed { file, error } => {
                        failures_clone.fetch_add(1, Ordering::Relaxed);
                        analyzing_clone.inc(1);
                        tracing::debug!("Failed to analyze {}: {}", file, error);
                    }
                }
            }
        });

        (
            Self {
                mp,
                discovering,
                analyzing,
                failures,
                handle: Some(handle),
            },
            tx,
        )
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Wait for the progress thread; every sender must be dropped first
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
        self.discovering.finish_and_clear();
        self.analyzing.finish_and_clear();
        self.mp.clear().ok();
    }

    pub fn finish_with_summary(&mut self, duration: Duration, files: usize, entities: usize, calls: usize) {
        self.join();
        eprintln!();
        eprintln!(
            "{} {}",
            Icons::CHECK.style(theme().success.clone()),
            format!("Complete in {}", HumanDuration(duration)).style(theme().success.clone())
        );
        eprintln!(
            "  {} {} files  {} {} entities  {} {} calls",
            Icons::FILE.style(theme().info.clone()),
            files,
            Icons::PACKAGE.style(theme().info.clone()),
            entities,
            Icons::LINK.style(theme().info.clone()),
            calls
        );
        let failures = self.failures();
        if failures > 0 {
            eprintln!(
                "  {} {}",
                Icons::WARN.style(theme().warn.clone()),
                format!("{} files failed", failures).style(theme().warn.clone())
            );
        }
    }
}

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_message(message.to_string());
        if console::Term::stderr().is_term() {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        Self { pb }
    }

    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}
