#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressPhase {
    Discovering,
    Analyzing,
}

/// Sent from scan workers to the progress thread
#[derive(Clone, Debug)]
pub enum ProgressMessage {
    Started {
        phase: ProgressPhase,
        total: usize,
    },
    Progress {
        phase: ProgressPhase,
        file: Option<String>,
    },
    Finished {
        phase: ProgressPhase,
    },
    Failed {
        file: String,
        error: String,
    },
}
