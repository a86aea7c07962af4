use crate::model::CategoryAssignment;

pub const OTHER: &str = "Other";

type Subcategories = &'static [(&'static str, &'static [&'static str])];

/// Two-level taxonomy. Declaration order is precedence: the first keyword hit
/// walking primary, then subcategory, then keyword order decides the result.
pub const TAXONOMY: &[(&str, Subcategories)] = &[
    (
        "Shoes",
        &[
            ("Heels", &["heel", "heels", "stiletto", "kitten heel", "platform heel"]),
            ("Flats", &["flat", "ballet flat", "loafers"]),
            ("Sneakers", &["sneaker", "running shoe", "trainers"]),
            ("Boots", &["boot", "boots", "ankle boot", "knee boot"]),
            ("Sandals", &["sandal", "slides", "flip flop", "flip flops"]),
            (
                "Wide-calf boot",
                &["wide calf boot", "wide calf boots", "wide-calf boot", "wide-calf boots"],
            ),
        ],
    ),
    (
        "Bottoms",
        &[
            (
                "Jeans",
                &[
                    "jean", "jeans", "denim", "straight jean", "flare", "bootcut",
                    "wide leg jean", "skinny jean",
                ],
            ),
            (
                "Pants",
                &[
                    "pant", "pants", "trouser", "slacks", "chino", "cargo pant", "jogger",
                    "leggings",
                ],
            ),
            ("Shorts", &["short", "shorts", "bermuda short", "biker short"]),
            ("Skirts", &["skirt", "mini skirt", "midi skirt", "maxi skirt"]),
        ],
    ),
    (
        "Tops",
        &[
            ("Blouses", &["blouse", "peasant top", "ruffle top"]),
            ("Shirts", &["shirt", "button-down", "button up", "oxford"]),
            ("T-Shirts", &["t-shirt", "tee", "graphic tee", "graphic t-shirt"]),
            ("Tanks", &["tank", "tank top", "camisole", "cami"]),
            ("Sweaters", &["sweater", "pullover", "cardigan", "knit"]),
        ],
    ),
    (
        "Dresses",
        &[
            ("Maxi", &["maxi dress"]),
            ("Mini", &["mini dress"]),
            ("Midi", &["midi dress"]),
            ("Bodycon", &["bodycon"]),
            ("Wrap", &["wrap dress"]),
            ("Slip", &["slip dress"]),
            ("Shirt Dress", &["shirt dress"]),
        ],
    ),
    (
        "Outerwear",
        &[
            ("Jackets", &["jacket", "blazer", "bomber"]),
            ("Coats", &["coat", "trench", "puffer", "parka"]),
        ],
    ),
    (
        "Accessories",
        &[
            ("Belts", &["belt"]),
            ("Hats", &["hat", "beanie", "cap"]),
            ("Bags", &["bag", "purse", "tote", "clutch"]),
        ],
    ),
];

/// Assigns a (primary, subcategory) pair from title, product type and tags.
pub fn map_category(title: &str, product_type: &str, tags: &[String]) -> CategoryAssignment {
    let haystack = format!(
        "{} {} {}",
        title.to_lowercase(),
        product_type.to_lowercase(),
        tags.iter()
            .map(|t| t.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    );

    for &(primary, subcategories) in TAXONOMY {
        for &(subcategory, keywords) in subcategories {
            if keywords.iter().any(|kw| haystack.contains(kw)) {
                return CategoryAssignment {
                    primary,
                    subcategory: Some(subcategory),
                };
            }
        }
    }

    CategoryAssignment {
        primary: OTHER,
        subcategory: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: CategoryAssignment) -> (&'static str, Option<&'static str>) {
        (a.primary, a.subcategory)
    }

    #[test]
    fn maps_known_titles() {
        assert_eq!(pair(map_category("Black Skinny Jean", "", &[])), ("Bottoms", Some("Jeans")));
        assert_eq!(pair(map_category("Wool Peacoat", "", &[])), ("Outerwear", Some("Coats")));
        assert_eq!(pair(map_category("Random Gadget", "", &[])), ("Other", None));
    }

    #[test]
    fn first_declared_primary_wins() {
        // "jean" (Bottoms) is declared before "jacket" (Outerwear)
        assert_eq!(pair(map_category("Jean Jacket", "", &[])), ("Bottoms", Some("Jeans")));
        // Shoes precede Bottoms, so a boot beats the bootcut
        assert_eq!(pair(map_category("Bootcut Boot", "", &[])), ("Shoes", Some("Boots")));
    }

    #[test]
    fn product_type_and_tags_feed_the_haystack() {
        assert_eq!(pair(map_category("The Classic", "Blazers", &[])), ("Outerwear", Some("Jackets")));
        let tags = vec!["New Arrival".to_string(), "BEANIE".to_string()];
        assert_eq!(pair(map_category("The Classic", "", &tags)), ("Accessories", Some("Hats")));
    }

    #[test]
    fn mapping_is_repeatable() {
        let first = map_category("Ruffle Top", "Tops", &[]);
        assert_eq!(first, map_category("Ruffle Top", "Tops", &[]));
        assert_eq!(pair(first), ("Tops", Some("Blouses")));
    }
}
