//! End-to-end build: source → content scan → expand → post-process → write.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio::fs;
use tracing::{debug, info, instrument};

use stylebuild_postprocess::ProcessOptions;
use stylebuild_shared::{
    BuildConfig, BuildReport, OutputDocument, Result, SourceDocument, StyleBuildError,
};

use crate::content;
use crate::output;

/// Inputs of a build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Directory the configured paths and content globs are relative to.
    pub root: PathBuf,
    /// Configuration handed to the pipeline stages.
    pub config: BuildConfig,
}

impl BuildOptions {
    pub fn new(root: impl Into<PathBuf>, config: BuildConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Absolute-or-root-relative source stylesheet path.
    pub fn input_path(&self) -> PathBuf {
        self.root.join(&self.config.paths.input)
    }

    /// Absolute-or-root-relative destination stylesheet path.
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.config.paths.output)
    }
}

/// Output of the transform pipeline.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub css: String,
    pub utilities_generated: usize,
}

/// Progress callback for reporting build status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once content files have been scanned.
    fn content_scanned(&self, files: usize, candidates: usize);
    /// Called when the build completes.
    fn done(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn content_scanned(&self, _files: usize, _candidates: usize) {}
    fn done(&self, _report: &BuildReport) {}
}

/// Run the build.
///
/// 1. Read the source stylesheet
/// 2. Scan content files for class candidates
/// 3. Expand utilities, then post-process (off the async executor)
/// 4. Create the destination directory
/// 5. Write the result, replacing any previous output
///
/// Nothing is written unless every earlier step succeeded.
#[instrument(skip_all, fields(root = %opts.root.display()))]
pub async fn build(opts: &BuildOptions, progress: &dyn ProgressReporter) -> Result<BuildReport> {
    let start = Instant::now();
    let output_path = opts.output_path();

    progress.phase("Reading source stylesheet");
    let source = read_source(&opts.input_path()).await?;
    debug!(path = %source.path.display(), len = source.text.len(), "source read");

    progress.phase("Scanning content");
    let scan = content::scan(&opts.root, &opts.config.content).await?;
    progress.content_scanned(scan.files.len(), scan.candidates.len());
    let candidates_scanned = scan.candidates.len();

    progress.phase("Transforming stylesheet");
    let transformed = transform_blocking(
        source,
        scan.candidates,
        opts.config.clone(),
        output_path.clone(),
    )
    .await?;

    progress.phase("Writing output");
    let document = OutputDocument {
        path: output_path,
        text: transformed.css,
    };
    output::write_atomic(&document.path, &document.text).await?;

    let report = BuildReport {
        bytes_written: document.text.len(),
        digest: document.digest(),
        output_path: document.path,
        candidates_scanned,
        utilities_generated: transformed.utilities_generated,
        elapsed: start.elapsed(),
    };

    progress.done(&report);

    info!(
        output = %report.output_path.display(),
        bytes = report.bytes_written,
        utilities = report.utilities_generated,
        digest = %report.digest,
        elapsed_ms = report.elapsed.as_millis(),
        "build complete"
    );

    Ok(report)
}

/// Run both pipeline stages on a source document.
pub fn transform(
    source: &SourceDocument,
    candidates: &BTreeSet<String>,
    config: &BuildConfig,
    to: &Path,
) -> Result<Transformed> {
    let expansion = stylebuild_utilities::expand(&source.text, candidates, config)?;

    let opts = ProcessOptions::new(&config.postprocess, &source.path, to);
    let css = stylebuild_postprocess::process(&expansion.css, &opts)?;

    Ok(Transformed {
        css,
        utilities_generated: expansion.utilities_generated,
    })
}

async fn transform_blocking(
    source: SourceDocument,
    candidates: BTreeSet<String>,
    config: BuildConfig,
    to: PathBuf,
) -> Result<Transformed> {
    tokio::task::spawn_blocking(move || transform(&source, &candidates, &config, &to))
        .await
        .map_err(|e| StyleBuildError::transform(format!("transform task failed: {e}")))?
}

async fn read_source(path: &Path) -> Result<SourceDocument> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|e| StyleBuildError::io(path, e))?;
    Ok(SourceDocument {
        path: path.to_path_buf(),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const INPUT: &str = "@tailwind base;\n@tailwind components;\n@tailwind utilities;\n";

    /// Create a project directory with the default layout.
    fn project(input: Option<&str>, template: &str) -> BuildOptions {
        let root = std::env::temp_dir().join(format!("sb_build_{}", Uuid::now_v7()));
        let opts = BuildOptions::new(&root, BuildConfig::default());

        std::fs::create_dir_all(root.join("templates")).expect("mkdir templates");
        std::fs::write(root.join("templates/index.html"), template).expect("write template");
        if let Some(css) = input {
            let path = opts.input_path();
            std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir input");
            std::fs::write(&path, css).expect("write input");
        }
        opts
    }

    fn cleanup(opts: &BuildOptions) {
        let _ = std::fs::remove_dir_all(&opts.root);
    }

    #[tokio::test]
    async fn builds_into_missing_directory() {
        let opts = project(Some(INPUT), r#"<div class="p-4"></div>"#);
        assert!(!opts.output_path().parent().expect("parent").exists());

        let report = build(&opts, &SilentProgress).await.expect("build");

        let css = std::fs::read_to_string(opts.output_path()).expect("read output");
        assert!(css.contains(".p-4"));
        assert!(css.contains("padding: 1rem"));
        assert_eq!(report.utilities_generated, 1);
        assert_eq!(report.bytes_written, css.len());
        assert_eq!(report.output_path, opts.output_path());

        cleanup(&opts);
    }

    #[tokio::test]
    async fn second_run_is_byte_identical() {
        let opts = project(
            Some(INPUT),
            r#"<nav class="flex md:hidden hover:underline text-gray-700"></nav>"#,
        );

        let first = build(&opts, &SilentProgress).await.expect("first build");
        let first_bytes = std::fs::read(opts.output_path()).expect("read");
        let second = build(&opts, &SilentProgress).await.expect("second build");
        let second_bytes = std::fs::read(opts.output_path()).expect("read");

        assert_eq!(first_bytes, second_bytes);
        assert_eq!(first.digest, second.digest);

        cleanup(&opts);
    }

    #[tokio::test]
    async fn apply_in_source_is_expanded() {
        let opts = project(Some(".btn { @apply p-4; }\n"), "");
        build(&opts, &SilentProgress).await.expect("build");

        let css = std::fs::read_to_string(opts.output_path()).expect("read output");
        assert!(css.contains(".btn"));
        assert!(css.contains("padding: 1rem"));

        cleanup(&opts);
    }

    #[tokio::test]
    async fn missing_source_writes_nothing() {
        let opts = project(None, r#"<div class="p-4"></div>"#);

        let err = build(&opts, &SilentProgress).await.unwrap_err();

        assert!(matches!(err, StyleBuildError::Io { .. }));
        assert!(!opts.output_path().exists());

        cleanup(&opts);
    }

    #[tokio::test]
    async fn transform_error_keeps_previous_output() {
        let opts = project(Some(".a { color: red;\n"), "");
        let out = opts.output_path();
        std::fs::create_dir_all(out.parent().expect("parent")).expect("mkdir output");
        std::fs::write(&out, "/* previous */").expect("seed output");

        let err = build(&opts, &SilentProgress).await.unwrap_err();

        assert!(matches!(err, StyleBuildError::Parse { .. }));
        assert_eq!(std::fs::read_to_string(&out).expect("read"), "/* previous */");
        let entries = std::fs::read_dir(out.parent().expect("parent"))
            .expect("list")
            .count();
        assert_eq!(entries, 1);

        cleanup(&opts);
    }

    #[tokio::test]
    async fn unknown_apply_class_fails_the_build() {
        let opts = project(Some(".btn { @apply btn-base; }\n"), "");
        let err = build(&opts, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, StyleBuildError::Transform { .. }));
        assert!(!opts.output_path().exists());

        cleanup(&opts);
    }

    #[tokio::test]
    async fn malformed_arbitrary_values_are_ignored() {
        let opts = project(
            Some(INPUT),
            r#"<div class="p-4 m-[0}] w-[1px;color:red]"></div>"#,
        );

        let report = build(&opts, &SilentProgress).await.expect("build");

        let css = std::fs::read_to_string(opts.output_path()).expect("read output");
        assert_eq!(report.utilities_generated, 1);
        assert!(css.contains("padding: 1rem"));
        assert!(!css.contains("color: red"));
        assert!(!css.contains("w-\\["));

        cleanup(&opts);
    }

    #[tokio::test]
    async fn minified_output() {
        let mut opts = project(Some("@tailwind utilities;\n"), r#"<b class="p-4"></b>"#);
        opts.config.postprocess.minify = true;

        build(&opts, &SilentProgress).await.expect("build");

        let css = std::fs::read_to_string(opts.output_path()).expect("read output");
        assert_eq!(css, ".p-4{padding:1rem}");

        cleanup(&opts);
    }
}
