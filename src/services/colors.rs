//! Type label to display color mapping.
//!
//! Lookup order: school overrides, then the built-in table of common German
//! type labels, then [`FALLBACK_COLOR`]. Labels compare case-insensitively.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

pub const RED: &str = "#F44336";
pub const BLUE: &str = "#2196F3";
pub const YELLOW: &str = "#FFEB3B";
pub const GREEN: &str = "#4CAF50";
pub const BROWN: &str = "#795548";
pub const ORANGE: &str = "#FF9800";
pub const GRAY: &str = "#9E9E9E";
pub const PURPLE: &str = "#9C27B0";

/// Color for labels nobody knows.
pub const FALLBACK_COLOR: &str = PURPLE;

const NAMED_COLORS: &[(&str, &str)] = &[
    ("red", RED),
    ("pink", "#E91E63"),
    ("purple", PURPLE),
    ("deeppurple", "#673AB7"),
    ("indigo", "#3F51B5"),
    ("blue", BLUE),
    ("lightblue", "#03A9F4"),
    ("cyan", "#00BCD4"),
    ("teal", "#009688"),
    ("green", GREEN),
    ("lightgreen", "#8BC34A"),
    ("lime", "#CDDC39"),
    ("yellow", YELLOW),
    ("amber", "#FFC107"),
    ("orange", ORANGE),
    ("deeporange", "#FF5722"),
    ("brown", BROWN),
    ("grey", GRAY),
    ("gray", GRAY),
    ("bluegrey", "#607D8B"),
    ("bluegray", "#607D8B"),
    ("black", "#000000"),
    ("white", "#FFFFFF"),
];

const DEFAULT_TYPES: &[(&[&str], &str)] = &[
    (
        &[
            "entfall",
            "entf.",
            "entfällt",
            "fällt aus",
            "fällt aus!",
            "ausfall",
            "freistunde",
            "klasse frei",
            "frei",
            "unterrichtsfrei",
            "auflösung",
            "studientag",
            "eva",
            "selbst.",
            "selbst. arb.",
            "selbstlernen",
            "selbstständig",
            "aufgaben",
            "aufg.",
        ],
        RED,
    ),
    (
        &[
            "vertretung",
            "vertr.",
            "v",
            "statt-vertretung",
            "betreuung",
            "mitbetreuung",
            "sondereinsatz",
        ],
        BLUE,
    ),
    (
        &[
            "verlegung",
            "verlegt",
            "verschoben",
            "vorverlegt",
            "tausch",
            "stundentausch",
            "unterricht geändert",
            "zusammenlegung",
        ],
        YELLOW,
    ),
    (
        &[
            "raumänderung",
            "raum",
            "raumtausch",
            "raumverlegung",
            "raumwechsel",
            "raum-vtr.",
            "geänderter raum",
        ],
        GREEN,
    ),
    (
        &[
            "veranstaltung",
            "veranst.",
            "exkursion",
            "wandertag",
            "sondertermin",
            "projekt",
        ],
        BROWN,
    ),
    (&["klausur", "prüfung"], ORANGE),
    (&["pausenaufsicht", "aufsicht"], GRAY),
];

fn default_table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| {
        DEFAULT_TYPES
            .iter()
            .flat_map(|(labels, color)| labels.iter().map(move |label| (*label, *color)))
            .collect()
    })
}

/// Maps type labels to hex colors.
#[derive(Debug, Clone, Default)]
pub struct ColorProvider {
    overrides: HashMap<String, String>,
}

impl ColorProvider {
    /// Create a provider with school-specific overrides.
    ///
    /// Override values may be color names ("orange", "deep purple") or
    /// `#RRGGBB`; unusable values are skipped with a warning.
    pub fn new(overrides: &BTreeMap<String, String>) -> Self {
        let overrides = overrides
            .iter()
            .filter_map(|(kind, value)| match Self::resolve_color_value(value) {
                Some(color) => Some((kind.trim().to_lowercase(), color)),
                None => {
                    log::warn!("Ignoring color override {kind} = '{value}'");
                    None
                }
            })
            .collect();
        Self { overrides }
    }

    /// Color for an optional type label. No label, no color.
    pub fn get_color(&self, kind: Option<&str>) -> Option<String> {
        kind.map(|k| self.color_for(k))
    }

    /// Color for a type label.
    pub fn color_for(&self, kind: &str) -> String {
        let key = kind.trim().to_lowercase();
        if let Some(color) = self.overrides.get(&key) {
            return color.clone();
        }
        default_table()
            .get(key.as_str())
            .copied()
            .unwrap_or(FALLBACK_COLOR)
            .to_string()
    }

    /// Turn a color name or hex string into `#RRGGBB`.
    pub fn resolve_color_value(value: &str) -> Option<String> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            let valid = hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit());
            return valid.then(|| format!("#{}", hex.to_uppercase()));
        }

        let name: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, hex)| hex.to_string())
    }
}
