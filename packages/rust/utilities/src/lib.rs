//! Utility-class expansion stage.
//!
//! Turns a source stylesheet that uses `@tailwind`, `@layer`, `@apply`,
//! `@screen` and `theme()` into plain CSS, generating a rule for every class
//! candidate found in content files.
//!
//! ```text
//! source css ─► parse ─► directives ─► print
//!                            ▲
//! candidates ─► generate ────┘
//! ```

pub mod candidates;
pub mod catalogue;
mod directives;
pub mod generator;
pub mod parser;
pub mod theme;

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use stylebuild_shared::{BuildConfig, Result};

pub use candidates::{extract, extract_into};
pub use generator::Generator;
pub use theme::Theme;

/// Output of the expansion stage.
#[derive(Debug, Clone)]
pub struct Expansion {
    /// Expanded stylesheet.
    pub css: String,
    /// Number of utility rules generated from candidates.
    pub utilities_generated: usize,
}

/// Expand `source` using `candidates` (plus the configured safelist).
#[instrument(skip_all, fields(candidates = candidates.len()))]
pub fn expand(
    source: &str,
    candidates: &BTreeSet<String>,
    config: &BuildConfig,
) -> Result<Expansion> {
    let nodes = parser::parse(source)?;
    let generator = Generator::new(config);

    let mut all = candidates.clone();
    all.extend(config.safelist.iter().cloned());

    let rules = generator.generate(&all);
    let utilities_generated = rules.len();
    let expanded = directives::expand(nodes, &generator, generator::to_nodes(&rules))?;
    let css = parser::print(&expanded);

    debug!(utilities_generated, css_len = css.len(), "expansion complete");

    Ok(Expansion {
        css,
        utilities_generated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "@tailwind base;\n@tailwind components;\n@tailwind utilities;\n";

    #[test]
    fn single_utility_from_content() {
        let candidates = extract(r#"<main class="p-4">hello</main>"#);
        let out = expand(INPUT, &candidates, &BuildConfig::default()).expect("expand");
        assert_eq!(out.utilities_generated, 1);
        assert!(out.css.contains(".p-4 {\n  padding: 1rem;\n}\n"));
    }

    #[test]
    fn expansion_is_deterministic() {
        let candidates =
            extract(r#"<div class="md:flex p-2 text-blue-600 hover:underline"></div>"#);
        let config = BuildConfig::default();
        let first = expand(INPUT, &candidates, &config).expect("first");
        let second = expand(INPUT, &candidates, &config).expect("second");
        assert_eq!(first.css, second.css);
        assert_eq!(first.utilities_generated, 4);
    }

    #[test]
    fn safelist_is_always_generated() {
        let config = BuildConfig {
            safelist: vec!["hidden".into()],
            ..BuildConfig::default()
        };
        let out = expand("@tailwind utilities;", &BTreeSet::new(), &config).expect("expand");
        assert_eq!(out.css, ".hidden {\n  display: none;\n}\n");
    }

    #[test]
    fn config_from_toml_drives_generation() {
        let config: BuildConfig = toml::from_str(
            r##"
prefix = "tw-"

[theme.extend.colors]
brand = "#ff6600"
"##,
        )
        .expect("config");
        let candidates = extract(r#"<a class="tw-bg-brand bg-brand"></a>"#);
        let out = expand("@tailwind utilities;", &candidates, &config).expect("expand");
        assert_eq!(out.utilities_generated, 1);
        assert!(out.css.contains(".tw-bg-brand {\n  background-color: #ff6600;\n}"));
    }

    #[test]
    fn malformed_source_fails() {
        let err =
            expand(".a { color: red;", &BTreeSet::new(), &BuildConfig::default()).unwrap_err();
        assert!(matches!(err, stylebuild_shared::StyleBuildError::Parse { .. }));
    }
}
