//! Directive processing: `@tailwind`, `@layer`, `@apply`, `@screen` and
//! `theme()`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use stylebuild_shared::{Result, StyleBuildError};

use crate::generator::Generator;
use crate::parser::{self, Node};

const PREFLIGHT: &str = include_str!("preflight.css");

/// The three injection points of the stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Layer {
    Base,
    Components,
    Utilities,
}

impl Layer {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "base" => Some(Self::Base),
            "components" => Some(Self::Components),
            "utilities" => Some(Self::Utilities),
            _ => None,
        }
    }
}

enum Item {
    Node(Node),
    Directive(Layer),
}

/// Expand every directive in `nodes`. `utilities` are the generated utility
/// rules, injected at `@tailwind utilities`.
pub(crate) fn expand(
    nodes: Vec<Node>,
    generator: &Generator,
    utilities: Vec<Node>,
) -> Result<Vec<Node>> {
    let directives = collect_directives(&nodes)?;

    let mut lifted: BTreeMap<Layer, Vec<Node>> = BTreeMap::new();
    let mut items = Vec::with_capacity(nodes.len());

    for node in nodes {
        match node {
            Node::AtRule {
                name,
                prelude,
                block: None,
            } if name == "tailwind" => {
                // `variants` and `screens` are accepted and produce nothing.
                if let Some(layer) = Layer::parse(prelude.trim()) {
                    items.push(Item::Directive(layer));
                }
            }
            Node::AtRule {
                name,
                prelude,
                block: Some(body),
            } if name == "layer" => {
                let body = rewrite_nodes(body, generator)?;
                match Layer::parse(prelude.trim()) {
                    Some(layer) if directives.contains(&layer) => {
                        lifted.entry(layer).or_default().extend(body);
                    }
                    Some(_) => items.extend(body.into_iter().map(Item::Node)),
                    // A native cascade layer.
                    None => items.push(Item::Node(Node::AtRule {
                        name,
                        prelude,
                        block: Some(body),
                    })),
                }
            }
            other => {
                for node in rewrite(other, generator, false)? {
                    items.push(Item::Node(node));
                }
            }
        }
    }

    let mut utilities = Some(utilities);
    let mut out = Vec::new();
    for item in items {
        match item {
            Item::Node(node) => out.push(node),
            Item::Directive(layer) => {
                if layer == Layer::Base {
                    out.extend(parser::parse(PREFLIGHT)?);
                }
                if let Some(nodes) = lifted.remove(&layer) {
                    out.extend(nodes);
                }
                if layer == Layer::Utilities {
                    out.extend(utilities.take().unwrap_or_default());
                }
            }
        }
    }

    Ok(out)
}

fn collect_directives(nodes: &[Node]) -> Result<BTreeSet<Layer>> {
    let mut directives = BTreeSet::new();
    for node in nodes {
        if let Node::AtRule {
            name,
            prelude,
            block: None,
        } = node
        {
            if name != "tailwind" {
                continue;
            }
            let prelude = prelude.trim();
            match Layer::parse(prelude) {
                Some(layer) => {
                    directives.insert(layer);
                }
                None if prelude == "variants" || prelude == "screens" => {}
                None => {
                    return Err(StyleBuildError::transform(format!(
                        "`@tailwind {prelude}` is not a valid directive"
                    )));
                }
            }
        }
    }
    Ok(directives)
}

fn rewrite_nodes(nodes: Vec<Node>, generator: &Generator) -> Result<Vec<Node>> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        out.extend(rewrite(node, generator, false)?);
    }
    Ok(out)
}

/// Rewrite one node. `in_rule` is true inside a style rule, where `@apply`
/// is allowed.
fn rewrite(node: Node, generator: &Generator, in_rule: bool) -> Result<Vec<Node>> {
    match node {
        Node::Rule { selector, body } => {
            let mut new_body = Vec::with_capacity(body.len());
            for child in body {
                new_body.extend(rewrite(child, generator, true)?);
            }
            Ok(vec![Node::Rule {
                selector,
                body: new_body,
            }])
        }
        Node::AtRule {
            name,
            prelude,
            block: None,
        } if name == "apply" => {
            if !in_rule {
                return Err(StyleBuildError::transform(format!(
                    "`@apply {prelude}` must be used inside a rule"
                )));
            }
            apply(&prelude, generator)
        }
        Node::AtRule {
            name,
            prelude,
            block: Some(body),
        } if name == "screen" => {
            let screen = prelude.trim();
            let width = generator.theme().screen(screen).ok_or_else(|| {
                StyleBuildError::transform(format!("no screen named `{screen}`"))
            })?;
            let prelude = format!("(min-width: {width})");
            let mut new_body = Vec::with_capacity(body.len());
            for child in body {
                new_body.extend(rewrite(child, generator, in_rule)?);
            }
            Ok(vec![Node::AtRule {
                name: "media".into(),
                prelude,
                block: Some(new_body),
            }])
        }
        Node::AtRule {
            name,
            prelude,
            block,
        } => {
            let prelude = resolve_theme_calls(&prelude, generator)?;
            let block = match block {
                Some(body) => {
                    let mut new_body = Vec::with_capacity(body.len());
                    for child in body {
                        new_body.extend(rewrite(child, generator, in_rule)?);
                    }
                    Some(new_body)
                }
                None => None,
            };
            Ok(vec![Node::AtRule {
                name,
                prelude,
                block,
            }])
        }
        Node::Declaration(text) => Ok(vec![Node::Declaration(resolve_theme_calls(
            &text, generator,
        )?)]),
        comment @ Node::Comment(_) => Ok(vec![comment]),
    }
}

fn apply(prelude: &str, generator: &Generator) -> Result<Vec<Node>> {
    let mut classes: Vec<&str> = prelude.split_whitespace().collect();
    let important = classes.last() == Some(&"!important");
    if important {
        classes.pop();
    }
    if classes.is_empty() {
        return Err(StyleBuildError::transform("`@apply` without classes"));
    }

    let mut declarations = Vec::new();
    for class in classes {
        for (property, value) in generator.apply(class)? {
            let value = if important && !value.ends_with("!important") {
                format!("{value} !important")
            } else {
                value
            };
            declarations.push(Node::Declaration(format!("{property}: {value}")));
        }
    }
    Ok(declarations)
}

/// Replace `theme(path)` calls with theme values.
fn resolve_theme_calls(text: &str, generator: &Generator) -> Result<String> {
    static THEME_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"theme\(\s*['"]?([^'")]+?)['"]?\s*\)"#).expect("valid regex")
    });

    if !text.contains("theme(") {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in THEME_RE.captures_iter(text) {
        let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = generator.theme().lookup(path.as_str()).ok_or_else(|| {
            StyleBuildError::transform(format!(
                "`{}` does not exist in the theme",
                path.as_str().trim()
            ))
        })?;
        out.push_str(&text[last..whole.start()]);
        out.push_str(&value);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylebuild_shared::BuildConfig;

    fn run(css: &str) -> Result<String> {
        let generator = Generator::new(&BuildConfig::default());
        let nodes = parser::parse(css)?;
        let utilities = vec![Node::Rule {
            selector: ".flex".into(),
            body: vec![Node::Declaration("display: flex".into())],
        }];
        Ok(parser::print(&expand(nodes, &generator, utilities)?))
    }

    #[test]
    fn injects_preflight_and_utilities() {
        let out = run("@tailwind base;\n@tailwind components;\n@tailwind utilities;")
            .expect("expand");
        assert!(out.contains("box-sizing: border-box"));
        assert!(out.contains(".flex {\n  display: flex;\n}"));

        let nodes = parser::parse(&out).expect("reparse");
        assert!(!nodes.iter().any(|n| matches!(
            n,
            Node::AtRule { name, .. } if name == "tailwind"
        )));
    }

    #[test]
    fn layers_are_lifted_to_their_directive() {
        let css = "@layer components { .card { @apply p-4; } }\n\
                   @tailwind components;\n\
                   @tailwind utilities;\n\
                   .late { color: red }";
        let out = run(css).expect("expand");
        let card = out.find(".card").expect("card rule");
        let flex = out.find(".flex").expect("utilities");
        let late = out.find(".late").expect("late rule");
        assert!(card < flex && flex < late);
        assert!(out.contains("padding: 1rem;"));
        assert!(!out.contains("@layer"));
    }

    #[test]
    fn layer_without_directive_stays_in_place() {
        let out = run("@layer components { .card { color: red } }").expect("expand");
        assert!(out.starts_with(".card {"));
    }

    #[test]
    fn native_cascade_layers_are_kept() {
        let out = run("@layer reset { .a { margin: 0 } }").expect("expand");
        assert!(out.starts_with("@layer reset {"));
    }

    #[test]
    fn apply_with_important() {
        let out = run(".btn { @apply font-bold underline !important; }").expect("expand");
        assert!(out.contains("font-weight: 700 !important;"));
        assert!(out.contains("text-decoration-line: underline !important;"));
    }

    #[test]
    fn apply_unknown_class_fails() {
        let err = run(".btn { @apply px-4 btn-ghost; }").unwrap_err();
        assert!(err.to_string().contains("`btn-ghost`"));
    }

    #[test]
    fn apply_outside_rule_fails() {
        assert!(run("@apply p-4;").is_err());
    }

    #[test]
    fn screen_and_theme_functions() {
        let css = "@screen md { .a { padding: theme('spacing.4'); color: theme(colors.red.500) } }";
        let out = run(css).expect("expand");
        assert!(out.contains("@media (min-width: 768px) {"));
        assert!(out.contains("padding: 1rem;"));
        assert!(out.contains("color: #ef4444;"));

        assert!(run("@screen huge { .a { color: red } }").is_err());
        assert!(run(".a { margin: theme('spacing.nope') }").is_err());
    }

    #[test]
    fn unknown_tailwind_directive_fails() {
        let err = run("@tailwind everything;").unwrap_err();
        assert!(err.to_string().contains("`@tailwind everything`"));
    }
}
