//! Presentation adapters: labels, percentages and colors for table rows and charts.

/// Colors for the categories the extraction service is known to emit.
const KNOWN_CATEGORY_COLORS: &[(&str, &str)] = &[
    ("programming_languages", "#3b82f6"),
    ("frameworks", "#10b981"),
    ("databases", "#f59e0b"),
    ("cloud_platforms", "#8b5cf6"),
    ("devops_tools", "#ef4444"),
    ("web_technologies", "#06b6d4"),
    ("data_science", "#ec4899"),
    ("mobile_development", "#14b8a6"),
    ("design_tools", "#f97316"),
    ("methodologies", "#6366f1"),
    ("security", "#84cc16"),
    ("blockchain", "#a855f7"),
    ("game_development", "#eab308"),
    ("business_intelligence", "#22c55e"),
    ("soft_skills", "#64748b"),
    ("other", FALLBACK_COLOR),
];

/// Palette for categories outside the known table, picked by a stable hash of the key.
const PALETTE: &[&str] = &[
    "#3b82f6", "#10b981", "#f59e0b", "#8b5cf6", "#ef4444", "#06b6d4", "#ec4899", "#14b8a6",
    "#f97316", "#6366f1", "#84cc16", "#a855f7", "#eab308", "#22c55e", "#64748b",
];

pub const FALLBACK_COLOR: &str = "#9ca3af";

/// `programming_languages` → `Programming Languages`.
///
/// Underscores become spaces and the first character of every word is
/// upper-cased; the rest of each word is left as-is.
pub fn category_label(category: &str) -> String {
    let mut label = String::with_capacity(category.len());
    let mut at_word_start = true;

    for c in category.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphanumeric() {
            if at_word_start {
                label.extend(c.to_uppercase());
            } else {
                label.push(c);
            }
            at_word_start = false;
        } else {
            label.push(c);
            at_word_start = true;
        }
    }

    label
}

/// Confidence in 0.0 – 1.0 as a rounded whole percentage.
pub fn confidence_percent(confidence: f64) -> u32 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Whole-number percentage label, e.g. `66.67` → `"67%"`. Halves round up.
pub fn percent_label(percentage: f64) -> String {
    format!("{:.0}%", percentage.round())
}

/// Same category always maps to the same color, known or not.
pub fn category_color(category: &str) -> &'static str {
    if category.is_empty() {
        return FALLBACK_COLOR;
    }
    KNOWN_CATEGORY_COLORS
        .iter()
        .find(|(known, _)| *known == category)
        .map(|(_, color)| *color)
        .unwrap_or_else(|| PALETTE[(fnv1a(category) % PALETTE.len() as u64) as usize])
}

fn fnv1a(key: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in key.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_label_snake_case() {
        assert_eq!(category_label("programming_languages"), "Programming Languages");
        assert_eq!(category_label("frameworks"), "Frameworks");
    }

    #[test]
    fn test_category_label_keeps_inner_case() {
        assert_eq!(category_label("devOps_tools"), "DevOps Tools");
    }

    #[test]
    fn test_category_label_hyphen_starts_word() {
        assert_eq!(category_label("ci-cd"), "Ci-Cd");
    }

    #[test]
    fn test_category_label_empty() {
        assert_eq!(category_label(""), "");
    }

    #[test]
    fn test_confidence_percent_rounds() {
        assert_eq!(confidence_percent(0.926), 93);
        assert_eq!(confidence_percent(0.924), 92);
        assert_eq!(confidence_percent(1.0), 100);
        assert_eq!(confidence_percent(0.0), 0);
    }

    #[test]
    fn test_percent_label() {
        assert_eq!(percent_label(66.666), "67%");
        assert_eq!(percent_label(100.0), "100%");
    }

    #[test]
    fn test_percent_label_rounds_halves_up() {
        // one job of eight
        assert_eq!(percent_label(12.5), "13%");
        assert_eq!(percent_label(62.5), "63%");
        assert_eq!(percent_label(0.0), "0%");
    }

    #[test]
    fn test_known_category_color() {
        assert_eq!(category_color("frameworks"), "#10b981");
        assert_eq!(category_color("other"), FALLBACK_COLOR);
    }

    #[test]
    fn test_unknown_category_color_is_stable() {
        let first = category_color("quantum_computing");
        let second = category_color("quantum_computing");
        assert_eq!(first, second);
        assert!(PALETTE.contains(&first));
    }

    #[test]
    fn test_empty_category_uses_fallback() {
        assert_eq!(category_color(""), FALLBACK_COLOR);
    }
}
