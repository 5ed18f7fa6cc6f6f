//! Rule-based keyword classifier
//!
//! The deterministic cascade tier: a fixed category → keyword-set table
//! scanned with case-insensitive substring matching. Among all matching
//! keywords the longest wins; equal lengths break toward table declaration
//! order. Crude, but it never times out and never surprises.

use crate::models::Category;

/// Category → keyword table, in tie-break order
const KEYWORD_TABLE: &[(Category, &[&str])] = &[
    (
        Category::FoodDining,
        &[
            "restaurant",
            "grocery",
            "groceries",
            "supermarket",
            "coffee",
            "cafe",
            "lunch",
            "dinner",
            "breakfast",
            "pizza",
            "burger",
            "meal",
            "food",
            "dining",
            "starbucks",
            "mcdonald",
            "doordash",
            "uber eats",
        ],
    ),
    (
        Category::Transportation,
        &[
            "uber",
            "lyft",
            "taxi",
            "gas station",
            "fuel",
            "parking",
            "metro",
            "bus",
            "train",
            "toll",
            "transit",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "movie",
            "cinema",
            "netflix",
            "spotify",
            "concert",
            "theater",
            "gaming",
            "streaming",
            "entertainment",
        ],
    ),
    (
        Category::Shopping,
        &[
            "amazon",
            "walmart",
            "target",
            "shopping",
            "store",
            "mall",
            "clothing",
            "shoes",
            "electronics",
            "retail",
        ],
    ),
    (
        Category::Utilities,
        &[
            "electric",
            "electricity",
            "water bill",
            "internet",
            "phone",
            "cable",
            "utility",
            "utilities",
        ],
    ),
    (
        Category::Healthcare,
        &[
            "doctor",
            "hospital",
            "pharmacy",
            "medical",
            "dentist",
            "medicine",
            "prescription",
            "clinic",
        ],
    ),
    (
        Category::Housing,
        &[
            "rent",
            "mortgage",
            "landlord",
            "hoa",
            "property tax",
            "home repair",
        ],
    ),
];

/// Match a description against the keyword table
///
/// Returns the winning category and the keyword that matched, or None when
/// nothing in the table applies (the resolver then takes the `Other` floor).
pub fn keyword_match(description: &str) -> Option<(Category, &'static str)> {
    let text = description.to_lowercase();

    let mut best: Option<(Category, &'static str)> = None;
    for (category, keywords) in KEYWORD_TABLE {
        for keyword in *keywords {
            if text.contains(keyword) {
                // Strictly-longer wins; ties keep the earlier table entry
                let is_better = best.map_or(true, |(_, prev)| keyword.len() > prev.len());
                if is_better {
                    best = Some((*category, keyword));
                }
            }
        }
    }
    best
}
