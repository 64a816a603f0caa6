//! Utility catalogue: maps a bare utility name (no variants, no prefix) to
//! its declarations.
//!
//! [`Family`] order is cascade order: families declared later win over
//! earlier ones when both apply to an element (`p-4 pt-2` pads the top by
//! `0.5rem`).

use crate::theme::{Theme, split_font_size};

/// Utility family, in emitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    Accessibility,
    Position,
    ZIndex,
    Margin,
    MarginAxis,
    MarginSide,
    Display,
    Height,
    MinHeight,
    Width,
    MinWidth,
    MaxWidth,
    Flex,
    FlexDirection,
    FlexWrap,
    AlignItems,
    JustifyContent,
    Gap,
    GapAxis,
    Overflow,
    Truncate,
    BorderRadius,
    BorderWidth,
    BorderColor,
    Background,
    Padding,
    PaddingAxis,
    PaddingSide,
    TextAlign,
    FontSize,
    FontWeight,
    TextTransform,
    FontStyle,
    TextColor,
    TextDecoration,
    Opacity,
    Shadow,
    Cursor,
}

/// A resolved utility.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub family: Family,
    pub declarations: Vec<(String, String)>,
}

type Decls = &'static [(&'static str, &'static str)];

const STATIC: &[(&str, Family, Decls)] = &[
    (
        "sr-only",
        Family::Accessibility,
        &[
            ("position", "absolute"),
            ("width", "1px"),
            ("height", "1px"),
            ("padding", "0"),
            ("margin", "-1px"),
            ("overflow", "hidden"),
            ("clip", "rect(0, 0, 0, 0)"),
            ("white-space", "nowrap"),
            ("border-width", "0"),
        ],
    ),
    ("static", Family::Position, &[("position", "static")]),
    ("fixed", Family::Position, &[("position", "fixed")]),
    ("absolute", Family::Position, &[("position", "absolute")]),
    ("relative", Family::Position, &[("position", "relative")]),
    ("sticky", Family::Position, &[("position", "sticky")]),
    ("block", Family::Display, &[("display", "block")]),
    ("inline-block", Family::Display, &[("display", "inline-block")]),
    ("inline", Family::Display, &[("display", "inline")]),
    ("flex", Family::Display, &[("display", "flex")]),
    ("inline-flex", Family::Display, &[("display", "inline-flex")]),
    ("grid", Family::Display, &[("display", "grid")]),
    ("inline-grid", Family::Display, &[("display", "inline-grid")]),
    ("table", Family::Display, &[("display", "table")]),
    ("contents", Family::Display, &[("display", "contents")]),
    ("hidden", Family::Display, &[("display", "none")]),
    ("flex-1", Family::Flex, &[("flex", "1 1 0%")]),
    ("flex-auto", Family::Flex, &[("flex", "1 1 auto")]),
    ("flex-initial", Family::Flex, &[("flex", "0 1 auto")]),
    ("flex-none", Family::Flex, &[("flex", "none")]),
    ("grow", Family::Flex, &[("flex-grow", "1")]),
    ("grow-0", Family::Flex, &[("flex-grow", "0")]),
    ("shrink", Family::Flex, &[("flex-shrink", "1")]),
    ("shrink-0", Family::Flex, &[("flex-shrink", "0")]),
    ("flex-row", Family::FlexDirection, &[("flex-direction", "row")]),
    (
        "flex-row-reverse",
        Family::FlexDirection,
        &[("flex-direction", "row-reverse")],
    ),
    ("flex-col", Family::FlexDirection, &[("flex-direction", "column")]),
    (
        "flex-col-reverse",
        Family::FlexDirection,
        &[("flex-direction", "column-reverse")],
    ),
    ("flex-wrap", Family::FlexWrap, &[("flex-wrap", "wrap")]),
    ("flex-nowrap", Family::FlexWrap, &[("flex-wrap", "nowrap")]),
    ("items-start", Family::AlignItems, &[("align-items", "flex-start")]),
    ("items-end", Family::AlignItems, &[("align-items", "flex-end")]),
    ("items-center", Family::AlignItems, &[("align-items", "center")]),
    ("items-baseline", Family::AlignItems, &[("align-items", "baseline")]),
    ("items-stretch", Family::AlignItems, &[("align-items", "stretch")]),
    (
        "justify-start",
        Family::JustifyContent,
        &[("justify-content", "flex-start")],
    ),
    (
        "justify-end",
        Family::JustifyContent,
        &[("justify-content", "flex-end")],
    ),
    (
        "justify-center",
        Family::JustifyContent,
        &[("justify-content", "center")],
    ),
    (
        "justify-between",
        Family::JustifyContent,
        &[("justify-content", "space-between")],
    ),
    (
        "justify-around",
        Family::JustifyContent,
        &[("justify-content", "space-around")],
    ),
    (
        "justify-evenly",
        Family::JustifyContent,
        &[("justify-content", "space-evenly")],
    ),
    ("overflow-auto", Family::Overflow, &[("overflow", "auto")]),
    ("overflow-hidden", Family::Overflow, &[("overflow", "hidden")]),
    ("overflow-visible", Family::Overflow, &[("overflow", "visible")]),
    ("overflow-scroll", Family::Overflow, &[("overflow", "scroll")]),
    ("overflow-x-auto", Family::Overflow, &[("overflow-x", "auto")]),
    ("overflow-x-hidden", Family::Overflow, &[("overflow-x", "hidden")]),
    ("overflow-y-auto", Family::Overflow, &[("overflow-y", "auto")]),
    ("overflow-y-hidden", Family::Overflow, &[("overflow-y", "hidden")]),
    (
        "truncate",
        Family::Truncate,
        &[
            ("overflow", "hidden"),
            ("text-overflow", "ellipsis"),
            ("white-space", "nowrap"),
        ],
    ),
    ("border", Family::BorderWidth, &[("border-width", "1px")]),
    ("text-left", Family::TextAlign, &[("text-align", "left")]),
    ("text-center", Family::TextAlign, &[("text-align", "center")]),
    ("text-right", Family::TextAlign, &[("text-align", "right")]),
    ("text-justify", Family::TextAlign, &[("text-align", "justify")]),
    ("uppercase", Family::TextTransform, &[("text-transform", "uppercase")]),
    ("lowercase", Family::TextTransform, &[("text-transform", "lowercase")]),
    ("capitalize", Family::TextTransform, &[("text-transform", "capitalize")]),
    ("normal-case", Family::TextTransform, &[("text-transform", "none")]),
    ("italic", Family::FontStyle, &[("font-style", "italic")]),
    ("not-italic", Family::FontStyle, &[("font-style", "normal")]),
    (
        "underline",
        Family::TextDecoration,
        &[("text-decoration-line", "underline")],
    ),
    (
        "overline",
        Family::TextDecoration,
        &[("text-decoration-line", "overline")],
    ),
    (
        "line-through",
        Family::TextDecoration,
        &[("text-decoration-line", "line-through")],
    ),
    (
        "no-underline",
        Family::TextDecoration,
        &[("text-decoration-line", "none")],
    ),
    (
        "shadow-sm",
        Family::Shadow,
        &[("box-shadow", "0 1px 2px 0 rgb(0 0 0 / 0.05)")],
    ),
    (
        "shadow",
        Family::Shadow,
        &[(
            "box-shadow",
            "0 1px 3px 0 rgb(0 0 0 / 0.1), 0 1px 2px -1px rgb(0 0 0 / 0.1)",
        )],
    ),
    (
        "shadow-md",
        Family::Shadow,
        &[(
            "box-shadow",
            "0 4px 6px -1px rgb(0 0 0 / 0.1), 0 2px 4px -2px rgb(0 0 0 / 0.1)",
        )],
    ),
    (
        "shadow-lg",
        Family::Shadow,
        &[(
            "box-shadow",
            "0 10px 15px -3px rgb(0 0 0 / 0.1), 0 4px 6px -4px rgb(0 0 0 / 0.1)",
        )],
    ),
    ("shadow-none", Family::Shadow, &[("box-shadow", "0 0 #0000")]),
    ("cursor-auto", Family::Cursor, &[("cursor", "auto")]),
    ("cursor-default", Family::Cursor, &[("cursor", "default")]),
    ("cursor-pointer", Family::Cursor, &[("cursor", "pointer")]),
    ("cursor-wait", Family::Cursor, &[("cursor", "wait")]),
    ("cursor-text", Family::Cursor, &[("cursor", "text")]),
    ("cursor-move", Family::Cursor, &[("cursor", "move")]),
    ("cursor-not-allowed", Family::Cursor, &[("cursor", "not-allowed")]),
];

/// Spacing-driven families: `(name, family, properties, negatable)`.
const SPACING: &[(&str, Family, &[&str], bool)] = &[
    ("p", Family::Padding, &["padding"], false),
    ("px", Family::PaddingAxis, &["padding-left", "padding-right"], false),
    ("py", Family::PaddingAxis, &["padding-top", "padding-bottom"], false),
    ("pt", Family::PaddingSide, &["padding-top"], false),
    ("pr", Family::PaddingSide, &["padding-right"], false),
    ("pb", Family::PaddingSide, &["padding-bottom"], false),
    ("pl", Family::PaddingSide, &["padding-left"], false),
    ("m", Family::Margin, &["margin"], true),
    ("mx", Family::MarginAxis, &["margin-left", "margin-right"], true),
    ("my", Family::MarginAxis, &["margin-top", "margin-bottom"], true),
    ("mt", Family::MarginSide, &["margin-top"], true),
    ("mr", Family::MarginSide, &["margin-right"], true),
    ("mb", Family::MarginSide, &["margin-bottom"], true),
    ("ml", Family::MarginSide, &["margin-left"], true),
    ("gap", Family::Gap, &["gap"], false),
    ("gap-x", Family::GapAxis, &["column-gap"], false),
    ("gap-y", Family::GapAxis, &["row-gap"], false),
];

/// Sizing families: `(name, family, property, viewport unit for "screen")`.
const SIZING: &[(&str, Family, &str, &str)] = &[
    ("w", Family::Width, "width", "100vw"),
    ("min-w", Family::MinWidth, "min-width", "100vw"),
    ("h", Family::Height, "height", "100vh"),
    ("min-h", Family::MinHeight, "min-height", "100vh"),
];

/// Resolve a bare utility name against the catalogue and theme.
pub fn resolve(utility: &str, negative: bool, theme: &Theme) -> Option<Resolved> {
    if !negative {
        if let Some((_, family, decls)) = STATIC.iter().find(|(name, ..)| *name == utility) {
            return Some(Resolved {
                family: *family,
                declarations: decls
                    .iter()
                    .map(|(p, v)| ((*p).to_string(), (*v).to_string()))
                    .collect(),
            });
        }
    }

    for (name, family, properties, negatable) in SPACING {
        let Some(value) = family_value(utility, name) else {
            continue;
        };
        if negative && !negatable {
            continue;
        }
        let allow_auto = *negatable;
        if let Some(v) = spacing_value(value, theme, allow_auto) {
            let v = if negative { negate(&v) } else { v };
            return Some(with_properties(*family, properties, &v));
        }
    }

    if negative {
        return family_value(utility, "z")
            .and_then(z_index_value)
            .map(|v| single(Family::ZIndex, "z-index", &negate(&v)));
    }

    for (name, family, property, screen) in SIZING {
        if let Some(value) = family_value(utility, name) {
            if let Some(v) = sizing_value(value, theme, screen) {
                return Some(single(*family, property, &v));
            }
        }
    }

    if let Some(value) = family_value(utility, "max-w") {
        let v = arbitrary(value).or_else(|| theme.max_width.get(value).cloned())?;
        return Some(single(Family::MaxWidth, "max-width", &v));
    }

    if let Some(value) = family_value(utility, "text") {
        return text_utility(value, theme);
    }

    if let Some(value) = family_value(utility, "bg") {
        if let Some(v) = arbitrary(value) {
            let property = if v.starts_with("url(") {
                "background-image"
            } else {
                "background-color"
            };
            return Some(single(Family::Background, property, &v));
        }
        let v = theme.colors.get(value)?;
        return Some(single(Family::Background, "background-color", v));
    }

    if let Some(value) = family_value(utility, "border") {
        return border_utility(value, theme);
    }

    if utility == "rounded" {
        let v = theme.border_radius.get("DEFAULT")?;
        return Some(single(Family::BorderRadius, "border-radius", v));
    }
    if let Some(value) = family_value(utility, "rounded") {
        let v = arbitrary(value).or_else(|| theme.border_radius.get(value).cloned())?;
        return Some(single(Family::BorderRadius, "border-radius", &v));
    }

    if let Some(value) = family_value(utility, "font") {
        let v = arbitrary(value).or_else(|| theme.font_weight.get(value).cloned())?;
        return Some(single(Family::FontWeight, "font-weight", &v));
    }

    if let Some(value) = family_value(utility, "opacity") {
        let v = arbitrary(value).or_else(|| {
            let n: u32 = value.parse().ok()?;
            (n <= 100).then(|| format_number(f64::from(n) / 100.0))
        })?;
        return Some(single(Family::Opacity, "opacity", &v));
    }

    if let Some(value) = family_value(utility, "z") {
        let v = z_index_value(value)?;
        return Some(single(Family::ZIndex, "z-index", &v));
    }

    None
}

/// `name-value` → `value`.
fn family_value<'a>(utility: &'a str, name: &str) -> Option<&'a str> {
    let value = utility.strip_prefix(name)?.strip_prefix('-')?;
    (!value.is_empty()).then_some(value)
}

/// Decode a bracketed arbitrary value: `[1_2px]` → `1 2px`.
///
/// Values that could end the declaration or rule they land in are rejected:
/// a `;` outside parentheses, any brace, or unbalanced brackets.
pub fn arbitrary(value: &str) -> Option<String> {
    let inner = value.strip_prefix('[')?.strip_suffix(']')?;
    if inner.is_empty() || !is_contained_value(inner) {
        return None;
    }
    Some(inner.replace('_', " "))
}

fn is_contained_value(value: &str) -> bool {
    let mut stack = Vec::new();
    for c in value.chars() {
        match c {
            '(' | '[' => stack.push(c),
            ')' if stack.pop() != Some('(') => return false,
            ']' if stack.pop() != Some('[') => return false,
            '{' | '}' => return false,
            ';' if stack.is_empty() => return false,
            _ => {}
        }
    }
    stack.is_empty()
}

fn spacing_value(value: &str, theme: &Theme, allow_auto: bool) -> Option<String> {
    if let Some(v) = arbitrary(value) {
        return Some(v);
    }
    if allow_auto && value == "auto" {
        return Some("auto".into());
    }
    theme.spacing.get(value).cloned()
}

fn sizing_value(value: &str, theme: &Theme, screen: &str) -> Option<String> {
    if let Some(v) = arbitrary(value) {
        return Some(v);
    }
    match value {
        "auto" => return Some("auto".into()),
        "full" => return Some("100%".into()),
        "screen" => return Some(screen.into()),
        "min" => return Some("min-content".into()),
        "max" => return Some("max-content".into()),
        "fit" => return Some("fit-content".into()),
        _ => {}
    }
    if let Some((n, d)) = value.split_once('/') {
        let n: u32 = n.parse().ok()?;
        let d: u32 = d.parse().ok()?;
        if d == 0 {
            return None;
        }
        return Some(format!("{}%", format_number(f64::from(n) / f64::from(d) * 100.0)));
    }
    theme.spacing.get(value).cloned()
}

fn z_index_value(value: &str) -> Option<String> {
    if value == "auto" {
        return Some("auto".into());
    }
    arbitrary(value).or_else(|| value.parse::<u32>().ok().map(|n| n.to_string()))
}

fn text_utility(value: &str, theme: &Theme) -> Option<Resolved> {
    if let Some(v) = arbitrary(value) {
        return Some(if looks_like_color(&v) {
            single(Family::TextColor, "color", &v)
        } else {
            single(Family::FontSize, "font-size", &v)
        });
    }
    if let Some(size) = theme.font_size.get(value) {
        let (font_size, line_height) = split_font_size(size);
        let mut declarations = vec![("font-size".to_string(), font_size.to_string())];
        if let Some(lh) = line_height {
            declarations.push(("line-height".to_string(), lh.to_string()));
        }
        return Some(Resolved {
            family: Family::FontSize,
            declarations,
        });
    }
    let color = theme.colors.get(value)?;
    Some(single(Family::TextColor, "color", color))
}

fn border_utility(value: &str, theme: &Theme) -> Option<Resolved> {
    if let Some(v) = arbitrary(value) {
        return Some(if looks_like_color(&v) {
            single(Family::BorderColor, "border-color", &v)
        } else {
            single(Family::BorderWidth, "border-width", &v)
        });
    }
    if let Ok(n) = value.parse::<u32>() {
        return Some(single(Family::BorderWidth, "border-width", &format!("{n}px")));
    }
    let color = theme.colors.get(value)?;
    Some(single(Family::BorderColor, "border-color", color))
}

fn looks_like_color(value: &str) -> bool {
    value.starts_with('#')
        || ["rgb", "hsl", "hwb", "lab", "lch", "oklab", "oklch", "color("]
            .iter()
            .any(|p| value.starts_with(p))
        || value == "currentColor"
        || value == "transparent"
}

fn negate(value: &str) -> String {
    if value == "0" || value == "0px" || value == "auto" {
        return value.to_string();
    }
    if value.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        format!("-{value}")
    } else {
        format!("calc({value} * -1)")
    }
}

/// Format a number with at most six decimals and no trailing zeros.
fn format_number(n: f64) -> String {
    let s = format!("{n:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

fn single(family: Family, property: &str, value: &str) -> Resolved {
    Resolved {
        family,
        declarations: vec![(property.to_string(), value.to_string())],
    }
}

fn with_properties(family: Family, properties: &[&str], value: &str) -> Resolved {
    Resolved {
        family,
        declarations: properties
            .iter()
            .map(|p| ((*p).to_string(), value.to_string()))
            .collect(),
    }
}
