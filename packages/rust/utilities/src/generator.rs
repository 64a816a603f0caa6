//! Utility rule generation.
//!
//! A candidate such as `md:hover:!bg-blue-500` is split into variants
//! (`md`, `hover`), flags (`!`) and a utility (`bg-blue-500`). The utility is
//! resolved through the catalogue; the variants decide the selector and the
//! media query the rule lands in.

use std::collections::BTreeSet;

use tracing::debug;

use stylebuild_shared::{BuildConfig, DarkMode, Result, StyleBuildError};

use crate::catalogue::{self, Family};
use crate::parser::Node;
use crate::theme::Theme;

/// Pseudo-class variants in emitted order.
const PSEUDO_VARIANTS: &[(&str, &str)] = &[
    ("first", ":first-child"),
    ("last", ":last-child"),
    ("odd", ":nth-child(odd)"),
    ("even", ":nth-child(even)"),
    ("visited", ":visited"),
    ("focus-within", ":focus-within"),
    ("hover", ":hover"),
    ("focus", ":focus"),
    ("focus-visible", ":focus-visible"),
    ("active", ":active"),
    ("disabled", ":disabled"),
];

/// A candidate split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub variants: Vec<&'a str>,
    pub important: bool,
    pub negative: bool,
    pub utility: &'a str,
}

/// Split a candidate. Returns `None` when it cannot name a utility under the
/// configured `prefix`.
pub fn parse_candidate<'a>(raw: &'a str, prefix: &str) -> Option<Candidate<'a>> {
    // `!` may lead the whole candidate or the utility: `!md:p-4`, `md:!p-4`.
    let (leading_important, body) = match raw.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let segments = split_variants(body)?;
    let (last, variants) = segments.split_last()?;

    if leading_important && last.starts_with('!') {
        return None;
    }
    let (important, utility) = match last.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (leading_important, *last),
    };
    let (negative, utility) = match utility.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, utility),
    };
    let utility = utility.strip_prefix(prefix)?;
    if utility.is_empty() {
        return None;
    }

    Some(Candidate {
        variants: variants.to_vec(),
        important,
        negative,
        utility,
    })
}

/// Split on `:` outside of brackets. Empty segments are rejected.
fn split_variants(raw: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in raw.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                segments.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&raw[start..]);

    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments)
}

/// Escape a class name for use in a selector.
pub fn escape_class(class: &str) -> String {
    let mut out = String::with_capacity(class.len() + 4);
    for (i, c) in class.chars().enumerate() {
        if i == 0 && c.is_ascii_digit() {
            out.push_str(&format!("\\3{c} "));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// Ordering key of a generated rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    screen: usize,
    dark: bool,
    group: bool,
    pseudo: u32,
    family: Family,
    raw: String,
}

/// A generated utility rule.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedRule {
    key: SortKey,
    /// Media conditions joined into one `@media` prelude (may be empty).
    pub media: Vec<String>,
    pub selector: String,
    pub declarations: Vec<(String, String)>,
}

/// Generates utility rules from candidates.
#[derive(Debug, Clone)]
pub struct Generator {
    theme: Theme,
    prefix: String,
    important: bool,
    dark_mode: DarkMode,
}

impl Generator {
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            theme: Theme::resolve(&config.theme),
            prefix: config.prefix.clone(),
            important: config.important,
            dark_mode: config.dark_mode,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Generate a rule for every candidate that names a utility, in cascade
    /// order.
    pub fn generate(&self, candidates: &BTreeSet<String>) -> Vec<GeneratedRule> {
        let mut rules: Vec<GeneratedRule> = candidates
            .iter()
            .filter_map(|raw| self.generate_one(raw))
            .collect();
        rules.sort_by(|a, b| a.key.cmp(&b.key));

        debug!(
            candidates = candidates.len(),
            rules = rules.len(),
            "utility generation complete"
        );
        rules
    }

    fn generate_one(&self, raw: &str) -> Option<GeneratedRule> {
        let candidate = parse_candidate(raw, &self.prefix)?;
        let resolved = catalogue::resolve(candidate.utility, candidate.negative, &self.theme)?;

        let mut screen = 0;
        let mut dark = false;
        let mut group = false;
        let mut pseudo_mask = 0u32;
        let mut pseudo_suffix = String::new();

        for variant in &candidate.variants {
            if let Some(idx) = self.theme.screen_index(variant) {
                // Only one breakpoint per rule.
                if screen != 0 {
                    return None;
                }
                screen = idx + 1;
            } else if *variant == "dark" {
                dark = true;
            } else if *variant == "group-hover" {
                group = true;
            } else if let Some(pos) = PSEUDO_VARIANTS.iter().position(|(n, _)| n == variant) {
                pseudo_mask |= 1 << pos;
                pseudo_suffix.push_str(PSEUDO_VARIANTS[pos].1);
            } else {
                return None;
            }
        }

        let mut selector = format!(".{}{pseudo_suffix}", escape_class(raw));
        if group {
            selector = format!(".{}group:hover {selector}", escape_class(&self.prefix));
        }

        let mut media = Vec::new();
        if screen > 0 {
            let (_, width) = &self.theme.screens[screen - 1];
            media.push(format!("(min-width: {width})"));
        }
        if dark {
            match self.dark_mode {
                DarkMode::Media => media.push("(prefers-color-scheme: dark)".to_string()),
                DarkMode::Class => selector = format!(".dark {selector}"),
            }
        }

        let important = candidate.important || self.important;
        let declarations = resolved
            .declarations
            .into_iter()
            .map(|(p, v)| if important { (p, format!("{v} !important")) } else { (p, v) })
            .collect();

        Some(GeneratedRule {
            key: SortKey {
                screen,
                dark,
                group,
                pseudo: pseudo_mask,
                family: resolved.family,
                raw: raw.to_string(),
            },
            media,
            selector,
            declarations,
        })
    }

    /// Declarations for one `@apply` class.
    pub fn apply(&self, class: &str) -> Result<Vec<(String, String)>> {
        let candidate = parse_candidate(class, &self.prefix).ok_or_else(|| {
            StyleBuildError::transform(format!("the `{class}` class does not exist"))
        })?;
        if !candidate.variants.is_empty() {
            return Err(StyleBuildError::transform(format!(
                "`@apply` cannot be used with variants: `{class}`"
            )));
        }

        let resolved = catalogue::resolve(candidate.utility, candidate.negative, &self.theme)
            .ok_or_else(|| {
                StyleBuildError::transform(format!("the `{class}` class does not exist"))
            })?;

        Ok(resolved
            .declarations
            .into_iter()
            .map(|(p, v)| {
                if candidate.important {
                    (p, format!("{v} !important"))
                } else {
                    (p, v)
                }
            })
            .collect())
    }
}

/// Turn generated rules into stylesheet nodes, grouping consecutive rules
/// that share a media query.
pub fn to_nodes(rules: &[GeneratedRule]) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut group: Vec<Node> = Vec::new();
    let mut group_media: Vec<String> = Vec::new();

    for rule in rules {
        if rule.media != group_media {
            flush(&mut nodes, &mut group, &group_media);
            group_media = rule.media.clone();
        }
        group.push(Node::Rule {
            selector: rule.selector.clone(),
            body: rule
                .declarations
                .iter()
                .map(|(p, v)| Node::Declaration(format!("{p}: {v}")))
                .collect(),
        });
    }
    flush(&mut nodes, &mut group, &group_media);

    nodes
}

fn flush(nodes: &mut Vec<Node>, group: &mut Vec<Node>, media: &[String]) {
    if group.is_empty() {
        return;
    }
    let rules = std::mem::take(group);
    if media.is_empty() {
        nodes.extend(rules);
    } else {
        nodes.push(Node::AtRule {
            name: "media".into(),
            prelude: media.join(" and "),
            block: Some(rules),
        });
    }
}
