//! Post-processing stage.
//!
//! Runs the expanded stylesheet through `lightningcss`: a full syntax check,
//! vendor prefixing and syntax lowering for the configured browser targets,
//! optional minification, and printing.

use std::path::PathBuf;

use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use tracing::{debug, instrument};

use stylebuild_shared::{PostprocessConfig, Result, StyleBuildError};

/// Options for [`process`].
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Source stylesheet path, used in diagnostics.
    pub from: PathBuf,
    /// Destination stylesheet path, used in diagnostics.
    pub to: PathBuf,
    /// Emit minified CSS.
    pub minify: bool,
    /// Browserslist queries.
    pub targets: Vec<String>,
}

impl ProcessOptions {
    pub fn new(
        config: &PostprocessConfig,
        from: impl Into<PathBuf>,
        to: impl Into<PathBuf>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            minify: config.minify,
            targets: config.targets.clone(),
        }
    }
}

/// Post-process `css`, the expanded form of the stylesheet at `opts.from`.
///
/// Error locations point into `css`, not into the source file.
#[instrument(
    skip_all,
    fields(from = %opts.from.display(), to = %opts.to.display(), minify = opts.minify)
)]
pub fn process(css: &str, opts: &ProcessOptions) -> Result<String> {
    let targets = Targets {
        browsers: resolve_browsers(&opts.targets)?,
        ..Targets::default()
    };

    let label = expanded_label(opts);
    let parser_options = ParserOptions {
        filename: label.clone(),
        ..ParserOptions::default()
    };
    let mut sheet = StyleSheet::parse(css, parser_options)
        .map_err(|e| StyleBuildError::transform(format!("{label}: {e}")))?;

    // Prefixing happens in the minify pass, so targets need it too.
    if opts.minify || targets.browsers.is_some() {
        sheet
            .minify(MinifyOptions {
                targets: targets.clone(),
                ..MinifyOptions::default()
            })
            .map_err(|e| StyleBuildError::transform(format!("{label}: {e}")))?;
    }

    let result = sheet
        .to_css(PrinterOptions {
            minify: opts.minify,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| {
            StyleBuildError::transform(format!("{label}, writing {}: {e}", opts.to.display()))
        })?;

    debug!(in_len = css.len(), out_len = result.code.len(), "post-processing complete");

    Ok(result.code)
}

/// Name used for the intermediate stylesheet in diagnostics.
fn expanded_label(opts: &ProcessOptions) -> String {
    format!("expanded stylesheet built from {}", opts.from.display())
}

fn resolve_browsers(queries: &[String]) -> Result<Option<Browsers>> {
    if queries.is_empty() {
        return Ok(None);
    }
    Browsers::from_browserslist(queries.iter().map(String::as_str)).map_err(|e| {
        StyleBuildError::config(format!("invalid browser targets {queries:?}: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(minify: bool, targets: &[&str]) -> ProcessOptions {
        ProcessOptions {
            from: PathBuf::from("assets/css/input.css"),
            to: PathBuf::from("static/css/output.css"),
            minify,
            targets: targets.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn pretty_prints_by_default() {
        let out = process(".a{display:flex}", &opts(false, &[])).expect("process");
        assert_eq!(out, ".a {\n  display: flex;\n}\n");
    }

    #[test]
    fn minifies_when_asked() {
        let out = process(".a {\n  padding: 1rem;\n}\n", &opts(true, &[])).expect("process");
        assert_eq!(out, ".a{padding:1rem}");
    }

    #[test]
    fn invalid_selector_is_transform_error() {
        let err = process("..broken { display: flex }", &opts(false, &[])).unwrap_err();
        assert!(matches!(err, StyleBuildError::Transform { .. }));
        let message = err.to_string();
        assert!(message.contains("expanded stylesheet built from assets/css/input.css"));
    }

    #[test]
    fn targets_add_vendor_prefixes() {
        let out =
            process(".a { user-select: none }", &opts(false, &["safari 12"])).expect("process");
        assert!(out.contains("-webkit-user-select: none"));
    }

    #[test]
    fn bad_target_query_is_rejected() {
        assert!(process(".a { color: red }", &opts(false, &["not a browser at all"])).is_err());
    }

    #[test]
    fn options_from_config() {
        let config = PostprocessConfig {
            minify: true,
            targets: vec!["defaults".into()],
        };
        let o = ProcessOptions::new(&config, "in.css", "out.css");
        assert!(o.minify);
        assert_eq!(o.targets, vec!["defaults".to_string()]);
        assert_eq!(o.to, PathBuf::from("out.css"));
    }
}
