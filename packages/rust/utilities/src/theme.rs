//! Resolved theme: default scales, then `[theme]` replacements, then
//! `[theme.extend]` merges.

use std::collections::BTreeMap;

use stylebuild_shared::{ColorValue, ThemeConfig, ThemeScales};

const DEFAULT_SCREENS: &[(&str, &str)] = &[
    ("sm", "640px"),
    ("md", "768px"),
    ("lg", "1024px"),
    ("xl", "1280px"),
    ("2xl", "1536px"),
];

/// Spacing keys; numeric keys map to `key * 0.25rem`.
const DEFAULT_SPACING_KEYS: &[&str] = &[
    "0.5", "1", "1.5", "2", "2.5", "3", "3.5", "4", "5", "6", "7", "8", "9", "10", "11", "12",
    "14", "16", "20", "24", "28", "32", "36", "40", "44", "48", "52", "56", "60", "64", "72",
    "80", "96",
];

const SHADE_KEYS: [&str; 11] = [
    "50", "100", "200", "300", "400", "500", "600", "700", "800", "900", "950",
];

const DEFAULT_PALETTE: &[(&str, [&str; 11])] = &[
    (
        "gray",
        [
            "#f9fafb", "#f3f4f6", "#e5e7eb", "#d1d5db", "#9ca3af", "#6b7280", "#4b5563",
            "#374151", "#1f2937", "#111827", "#030712",
        ],
    ),
    (
        "red",
        [
            "#fef2f2", "#fee2e2", "#fecaca", "#fca5a5", "#f87171", "#ef4444", "#dc2626",
            "#b91c1c", "#991b1b", "#7f1d1d", "#450a0a",
        ],
    ),
    (
        "yellow",
        [
            "#fefce8", "#fef9c3", "#fef08a", "#fde047", "#facc15", "#eab308", "#ca8a04",
            "#a16207", "#854d0e", "#713f12", "#422006",
        ],
    ),
    (
        "green",
        [
            "#f0fdf4", "#dcfce7", "#bbf7d0", "#86efac", "#4ade80", "#22c55e", "#16a34a",
            "#15803d", "#166534", "#14532d", "#052e16",
        ],
    ),
    (
        "blue",
        [
            "#eff6ff", "#dbeafe", "#bfdbfe", "#93c5fd", "#60a5fa", "#3b82f6", "#2563eb",
            "#1d4ed8", "#1e40af", "#1e3a8a", "#172554",
        ],
    ),
    (
        "indigo",
        [
            "#eef2ff", "#e0e7ff", "#c7d2fe", "#a5b4fc", "#818cf8", "#6366f1", "#4f46e5",
            "#4338ca", "#3730a3", "#312e81", "#1e1b4b",
        ],
    ),
];

const DEFAULT_FLAT_COLORS: &[(&str, &str)] = &[
    ("inherit", "inherit"),
    ("current", "currentColor"),
    ("transparent", "transparent"),
    ("black", "#000"),
    ("white", "#fff"),
];

/// Font sizes as `size/line-height`.
const DEFAULT_FONT_SIZE: &[(&str, &str)] = &[
    ("xs", "0.75rem/1rem"),
    ("sm", "0.875rem/1.25rem"),
    ("base", "1rem/1.5rem"),
    ("lg", "1.125rem/1.75rem"),
    ("xl", "1.25rem/1.75rem"),
    ("2xl", "1.5rem/2rem"),
    ("3xl", "1.875rem/2.25rem"),
    ("4xl", "2.25rem/2.5rem"),
    ("5xl", "3rem/1"),
    ("6xl", "3.75rem/1"),
];

const DEFAULT_FONT_WEIGHT: &[(&str, &str)] = &[
    ("thin", "100"),
    ("extralight", "200"),
    ("light", "300"),
    ("normal", "400"),
    ("medium", "500"),
    ("semibold", "600"),
    ("bold", "700"),
    ("extrabold", "800"),
    ("black", "900"),
];

const DEFAULT_BORDER_RADIUS: &[(&str, &str)] = &[
    ("none", "0px"),
    ("sm", "0.125rem"),
    ("DEFAULT", "0.25rem"),
    ("md", "0.375rem"),
    ("lg", "0.5rem"),
    ("xl", "0.75rem"),
    ("2xl", "1rem"),
    ("3xl", "1.5rem"),
    ("full", "9999px"),
];

const DEFAULT_MAX_WIDTH: &[(&str, &str)] = &[
    ("none", "none"),
    ("xs", "20rem"),
    ("sm", "24rem"),
    ("md", "28rem"),
    ("lg", "32rem"),
    ("xl", "36rem"),
    ("2xl", "42rem"),
    ("3xl", "48rem"),
    ("4xl", "56rem"),
    ("5xl", "64rem"),
    ("6xl", "72rem"),
    ("7xl", "80rem"),
    ("full", "100%"),
    ("prose", "65ch"),
];

/// Theme values the generator draws from.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Breakpoints ordered by ascending min-width.
    pub screens: Vec<(String, String)>,
    pub spacing: BTreeMap<String, String>,
    /// Colors flattened to `name` / `name-shade` keys.
    pub colors: BTreeMap<String, String>,
    pub font_size: BTreeMap<String, String>,
    pub font_weight: BTreeMap<String, String>,
    pub border_radius: BTreeMap<String, String>,
    pub max_width: BTreeMap<String, String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::resolve(&ThemeConfig::default())
    }
}

impl Theme {
    /// Build the effective theme from the configured overrides and extensions.
    pub fn resolve(config: &ThemeConfig) -> Self {
        let overrides = &config.overrides;
        let extend = &config.extend;

        let screens = layer(default_table(DEFAULT_SCREENS), &overrides.screens, &extend.screens);
        let colors = layer_colors(overrides, extend);

        Self {
            screens: order_screens(screens),
            spacing: layer(default_spacing(), &overrides.spacing, &extend.spacing),
            colors,
            font_size: layer(
                default_table(DEFAULT_FONT_SIZE),
                &overrides.font_size,
                &extend.font_size,
            ),
            font_weight: layer(
                default_table(DEFAULT_FONT_WEIGHT),
                &overrides.font_weight,
                &extend.font_weight,
            ),
            border_radius: layer(
                default_table(DEFAULT_BORDER_RADIUS),
                &overrides.border_radius,
                &extend.border_radius,
            ),
            max_width: layer(
                default_table(DEFAULT_MAX_WIDTH),
                &overrides.max_width,
                &extend.max_width,
            ),
        }
    }

    /// Min-width of a named screen.
    pub fn screen(&self, name: &str) -> Option<&str> {
        self.screens
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Position of a named screen in ascending breakpoint order.
    pub fn screen_index(&self, name: &str) -> Option<usize> {
        self.screens.iter().position(|(n, _)| n == name)
    }

    /// Look up a dotted theme path such as `spacing.4`, `colors.blue.500`
    /// or `spacing[0.5]`.
    pub fn lookup(&self, path: &str) -> Option<String> {
        let path = path.trim();
        let (scale, rest) = match path.find(['.', '[']) {
            Some(idx) => (&path[..idx], &path[idx..]),
            None => return None,
        };

        let key = if let Some(inner) = rest.strip_prefix('[') {
            inner.strip_suffix(']')?.to_string()
        } else {
            let rest = rest.strip_prefix('.')?;
            if scale == "colors" {
                rest.replace('.', "-")
            } else {
                rest.to_string()
            }
        };

        match scale {
            "screens" => self.screen(&key).map(str::to_string),
            "spacing" => self.spacing.get(&key).cloned(),
            "colors" => self.colors.get(&key).cloned(),
            "fontSize" | "font_size" => self
                .font_size
                .get(&key)
                .map(|v| split_font_size(v).0.to_string()),
            "fontWeight" | "font_weight" => self.font_weight.get(&key).cloned(),
            "borderRadius" | "border_radius" => self.border_radius.get(&key).cloned(),
            "maxWidth" | "max_width" => self.max_width.get(&key).cloned(),
            _ => None,
        }
    }
}

/// Split a `size/line-height` font-size entry.
pub fn split_font_size(value: &str) -> (&str, Option<&str>) {
    match value.split_once('/') {
        Some((size, line_height)) => (size.trim(), Some(line_height.trim())),
        None => (value.trim(), None),
    }
}

fn default_table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn default_spacing() -> BTreeMap<String, String> {
    let mut spacing = BTreeMap::new();
    spacing.insert("0".to_string(), "0px".to_string());
    spacing.insert("px".to_string(), "1px".to_string());
    for key in DEFAULT_SPACING_KEYS {
        if let Ok(n) = key.parse::<f64>() {
            spacing.insert((*key).to_string(), format!("{}rem", n / 4.0));
        }
    }
    spacing
}

fn layer(
    defaults: BTreeMap<String, String>,
    replacement: &Option<BTreeMap<String, String>>,
    extension: &Option<BTreeMap<String, String>>,
) -> BTreeMap<String, String> {
    let mut table = replacement.clone().unwrap_or(defaults);
    if let Some(extra) = extension {
        table.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    table
}

fn layer_colors(overrides: &ThemeScales, extend: &ThemeScales) -> BTreeMap<String, String> {
    let mut colors = match &overrides.colors {
        Some(replacement) => flatten_colors(replacement),
        None => {
            let mut table = default_table(DEFAULT_FLAT_COLORS);
            for (name, shades) in DEFAULT_PALETTE {
                for (shade, value) in SHADE_KEYS.iter().zip(shades.iter()) {
                    table.insert(format!("{name}-{shade}"), (*value).to_string());
                }
            }
            table
        }
    };
    if let Some(extra) = &extend.colors {
        colors.extend(flatten_colors(extra));
    }
    colors
}

fn flatten_colors(colors: &BTreeMap<String, ColorValue>) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    for (name, value) in colors {
        match value {
            ColorValue::Flat(v) => {
                flat.insert(name.clone(), v.clone());
            }
            ColorValue::Shades(shades) => {
                for (shade, v) in shades {
                    // `DEFAULT` makes the bare name usable: `bg-brand`.
                    let key = if shade == "DEFAULT" {
                        name.clone()
                    } else {
                        format!("{name}-{shade}")
                    };
                    flat.insert(key, v.clone());
                }
            }
        }
    }
    flat
}

fn order_screens(screens: BTreeMap<String, String>) -> Vec<(String, String)> {
    let mut ordered: Vec<(String, String)> = screens.into_iter().collect();
    ordered.sort_by(|a, b| {
        leading_number(&a.1)
            .total_cmp(&leading_number(&b.1))
            .then_with(|| a.0.cmp(&b.0))
    });
    ordered
}

fn leading_number(value: &str) -> f64 {
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    value[..end].parse().unwrap_or(f64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spacing_scale() {
        let theme = Theme::default();
        assert_eq!(theme.spacing.get("4").map(String::as_str), Some("1rem"));
        assert_eq!(theme.spacing.get("0.5").map(String::as_str), Some("0.125rem"));
        assert_eq!(theme.spacing.get("px").map(String::as_str), Some("1px"));
        assert_eq!(theme.spacing.get("96").map(String::as_str), Some("24rem"));
    }

    #[test]
    fn screens_sorted_by_width() {
        let mut config = ThemeConfig::default();
        let mut extra = BTreeMap::new();
        extra.insert("xs".to_string(), "480px".to_string());
        extra.insert("3xl".to_string(), "1920px".to_string());
        config.extend.screens = Some(extra);

        let theme = Theme::resolve(&config);
        let names: Vec<&str> = theme.screens.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["xs", "sm", "md", "lg", "xl", "2xl", "3xl"]);
        assert_eq!(theme.screen_index("md"), Some(2));
    }

    #[test]
    fn override_replaces_and_extend_merges() {
        let mut config = ThemeConfig::default();
        let mut spacing = BTreeMap::new();
        spacing.insert("sm".to_string(), "2px".to_string());
        config.overrides.spacing = Some(spacing);
        let mut extra = BTreeMap::new();
        extra.insert("lg".to_string(), "8px".to_string());
        config.extend.spacing = Some(extra);

        let theme = Theme::resolve(&config);
        assert_eq!(theme.spacing.len(), 2);
        assert!(theme.spacing.get("4").is_none());
        assert_eq!(theme.spacing.get("lg").map(String::as_str), Some("8px"));
    }

    #[test]
    fn nested_colors_flatten() {
        let mut config = ThemeConfig::default();
        let mut shades = BTreeMap::new();
        shades.insert("DEFAULT".to_string(), "#123".to_string());
        shades.insert("700".to_string(), "#012".to_string());
        let mut colors = BTreeMap::new();
        colors.insert("brand".to_string(), ColorValue::Shades(shades));
        config.extend.colors = Some(colors);

        let theme = Theme::resolve(&config);
        assert_eq!(theme.colors.get("brand").map(String::as_str), Some("#123"));
        assert_eq!(theme.colors.get("brand-700").map(String::as_str), Some("#012"));
        assert_eq!(theme.colors.get("blue-500").map(String::as_str), Some("#3b82f6"));
    }

    #[test]
    fn theme_path_lookup() {
        let theme = Theme::default();
        assert_eq!(theme.lookup("spacing.4").as_deref(), Some("1rem"));
        assert_eq!(theme.lookup("spacing[0.5]").as_deref(), Some("0.125rem"));
        assert_eq!(theme.lookup("colors.blue.500").as_deref(), Some("#3b82f6"));
        assert_eq!(theme.lookup("fontSize.lg").as_deref(), Some("1.125rem"));
        assert_eq!(theme.lookup("screens.md").as_deref(), Some("768px"));
        assert!(theme.lookup("colors.nope.500").is_none());
        assert!(theme.lookup("spacing").is_none());
    }
}
