//! Expense-category classification.

/// Category assigned when no keyword set matches.
pub const DEFAULT_CATEGORY: &str = "Outros";

/// Fixed taxonomy in priority order: when several categories match,
/// the one listed first wins. Keywords are substrings of normalized
/// text, so a keyword embedded in a longer token still counts.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Internet",
        &[
            "internet",
            "telecom",
            "fibra",
            "banda larga",
            "vivo",
            "claro",
            "tim",
            "oi",
            "algar",
            "brisanet",
        ],
    ),
    (
        "Energia",
        &[
            "energia",
            "eletrica",
            "eletrobras",
            "neoenergia",
            "enel",
            "cpfl",
            "equatorial",
            "cemig",
            "light",
        ],
    ),
    (
        "Água",
        &[
            "agua", "saneamento", "sabesp", "copasa", "sanepar", "casan", "aegea", "igua",
            "corsan", "embasa",
        ],
    ),
    ("Condomínio", &["condominio"]),
    ("Imposto", &["iptu", "imposto predial", "tributo"]),
];

/// Classifies normalized document text into the fixed taxonomy.
pub fn classify(text: &str) -> &'static str {
    for (label, keywords) in CATEGORIES {
        if keywords.iter().any(|keyword| text.contains(keyword)) {
            return label;
        }
    }
    DEFAULT_CATEGORY
}
