//! Content scanning: find the files matched by the `content` globs and
//! collect their class candidates.

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use regex::Regex;
use tokio::fs;
use tracing::{debug, instrument, warn};

use stylebuild_shared::{Result, StyleBuildError};

/// Result of a content scan.
#[derive(Debug, Clone, Default)]
pub struct ContentScan {
    /// Matched files, sorted.
    pub files: Vec<PathBuf>,
    /// Distinct candidates across all files.
    pub candidates: BTreeSet<String>,
}

/// A compiled content glob.
#[derive(Debug)]
struct ContentPattern {
    /// Directory (relative to the root) the walk starts from.
    base: PathBuf,
    regex: Regex,
}

/// Scan every file under `root` matched by `patterns`.
#[instrument(skip_all, fields(root = %root.display(), patterns = patterns.len()))]
pub async fn scan(root: &Path, patterns: &[String]) -> Result<ContentScan> {
    let compiled: Vec<ContentPattern> = patterns
        .iter()
        .flat_map(|p| expand_braces(p))
        .filter_map(|p| compile(&p))
        .collect();

    let mut files = BTreeSet::new();
    for pattern in &compiled {
        let base = root.join(&pattern.base);
        if !fs::try_exists(&base).await.unwrap_or(false) {
            debug!(base = %base.display(), "content base directory missing, skipping");
            continue;
        }
        walk(root, &base, &pattern.regex, &mut files).await?;
    }

    if files.is_empty() {
        warn!(?patterns, "no content files matched, only safelisted utilities will be generated");
    }

    let mut candidates = BTreeSet::new();
    for file in &files {
        let bytes = fs::read(file)
            .await
            .map_err(|e| StyleBuildError::io(file, e))?;
        stylebuild_utilities::extract_into(&String::from_utf8_lossy(&bytes), &mut candidates);
    }

    debug!(
        files = files.len(),
        candidates = candidates.len(),
        "content scan complete"
    );

    Ok(ContentScan {
        files: files.into_iter().collect(),
        candidates,
    })
}

/// Walk `base` and collect files whose root-relative path matches `regex`.
async fn walk(root: &Path, base: &Path, regex: &Regex, out: &mut BTreeSet<PathBuf>) -> Result<()> {
    let mut queue = VecDeque::from([base.to_path_buf()]);

    while let Some(dir) = queue.pop_front() {
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| StyleBuildError::io(&dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StyleBuildError::io(&dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StyleBuildError::io(&path, e))?;

            if file_type.is_dir() {
                queue.push_back(path);
            } else if file_type.is_file() && regex.is_match(&relative_key(root, &path)) {
                out.insert(path);
            }
        }
    }

    Ok(())
}

/// Root-relative path with `/` separators.
fn relative_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn compile(pattern: &str) -> Option<ContentPattern> {
    let pattern = pattern.trim_start_matches("./");
    let base: PathBuf = pattern
        .split('/')
        .take_while(|segment| !segment.contains(['*', '?', '[']))
        .collect();
    // A pattern without wildcards names a single file; walk its directory.
    let base = if base.as_path() == Path::new(pattern) {
        base.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        base
    };

    Some(ContentPattern {
        base,
        regex: glob_to_regex(pattern)?,
    })
}

/// Convert a glob-like pattern to a regex.
fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let escaped = regex::escape(pattern)
        .replace(r"\*\*/", "(?:.*/)?")
        .replace(r"\*\*", ".*")
        .replace(r"\*", "[^/]*")
        .replace(r"\?", "[^/]");
    Regex::new(&format!("^{escaped}$")).ok()
}

/// Expand one level of `{a,b}` alternatives.
fn expand_braces(pattern: &str) -> Vec<String> {
    let (Some(open), Some(close)) = (pattern.find('{'), pattern.find('}')) else {
        return vec![pattern.to_string()];
    };
    if close < open {
        return vec![pattern.to_string()];
    }

    let head = &pattern[..open];
    let tail = &pattern[close + 1..];
    pattern[open + 1..close]
        .split(',')
        .flat_map(|alt| expand_braces(&format!("{head}{alt}{tail}")))
        .collect()
}
