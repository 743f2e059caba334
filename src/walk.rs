//! Source file discovery for directory scans
//!
//! `.gitignore`/`.ignore` rules come from the `ignore` walker; build output,
//! dependency folders and binary assets are skipped on top of that.

use crate::language::{SupportedLanguage, detect_language};
use ignore::WalkBuilder;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};

/// Patterns skipped in every scan
const NOISE_PATTERNS: &[&str] = &[
    // dependency and build folders
    "target/", "node_modules/", "venv/", ".venv/", "vendor/", "dist/", "build/", "out/", "coverage/",
    "__pycache__/", "*.egg-info/", ".git/", ".vscode/", ".idea/",
    // generated or lock files
    "*.lock", "package-lock.json", "*.min.js", "*.map",
    // binaries and media
    "*.pyc", "*.class", "*.jar", "*.exe", "*.dll", "*.so", "*.dylib", "*.o", "*.a", "*.wasm",
    "*.png", "*.jpg", "*.jpeg", "*.gif", "*.ico", "*.svg", "*.pdf", "*.zip", "*.gz", "*.tar",
];

/// Extra exclusion rules on top of the repository's own ignore files
pub struct NoiseFilter {
    inner: Gitignore,
}

impl NoiseFilter {
    pub fn new(root: &Path, extra_excludes: &[String]) -> Self {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in NOISE_PATTERNS.iter().copied().chain(extra_excludes.iter().map(String::as_str)) {
            if let Err(e) = builder.add_line(None, pattern) {
                tracing::warn!("Ignoring invalid exclude pattern {:?}: {}", pattern, e);
            }
        }
        Self {
            inner: builder.build().unwrap_or_else(|_| Gitignore::empty()),
        }
    }

    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.inner.matched(path, is_dir).is_ignore()
    }
}

/// Every analyzable file under `root`, sorted by path
pub fn collect_source_files(root: &Path, extra_excludes: &[String]) -> Vec<(PathBuf, SupportedLanguage)> {
    let filter = NoiseFilter::new(root, extra_excludes);
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .require_git(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !filter.is_ignored(entry.path(), is_dir)
        })
        .build();

    let mut files: Vec<(PathBuf, SupportedLanguage)> = walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter_map(|entry| {
            let language = detect_language(entry.path())?;
            Some((entry.into_path(), language))
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_collects_known_languages_only() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("src/app.py"), "x = 1").unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(dir.path().join("Rakefile"), "task :x").unwrap();

        let files = collect_source_files(dir.path(), &[]);
        let names: Vec<_> = files
            .iter()
            .map(|(p, l)| (p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"), *l))
            .collect();
        assert_eq!(
            names,
            [
                ("Rakefile".to_string(), SupportedLanguage::Ruby),
                ("src/app.py".to_string(), SupportedLanguage::Python),
                ("src/main.rs".to_string(), SupportedLanguage::Rust),
            ]
        );
    }

    #[test]
    fn test_skips_noise_and_excludes() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::create_dir_all(dir.path().join("generated")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x").unwrap();
        fs::write(dir.path().join("generated/api.ts"), "x").unwrap();
        fs::write(dir.path().join("app.min.js"), "x").unwrap();
        fs::write(dir.path().join("index.ts"), "x").unwrap();

        let files = collect_source_files(dir.path(), &["generated/".to_string()]);
        assert_eq!(files.len(), 1);
        assert!(files[0].0.ends_with("index.ts"));
    }

    #[test]
    fn test_honors_gitignore() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".ignore"), "skip.go\n").unwrap();
        fs::write(dir.path().join("skip.go"), "package x").unwrap();
        fs::write(dir.path().join("keep.go"), "package x").unwrap();

        let files = collect_source_files(dir.path(), &[]);
        assert_eq!(files.len(), 1);
        assert!(files[0].0.ends_with("keep.go"));
    }
}
