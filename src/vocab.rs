//! Reference vocabulary for attribute inference.
//!
//! Every table is lower-case, deduplicated and kept in declared order. The
//! size table is generated once from its families on first use and is never
//! mutated afterwards.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Color terms, scanned in this order.
pub const COLORS: &[&str] = &[
    "black", "white", "red", "blue", "green", "yellow", "pink", "purple", "beige", "brown",
    "gray", "navy", "olive", "burgundy", "plaid", "stripe", "sage", "sand", "stone", "slate",
    "gold",
];

/// Length and fit descriptors, scanned in this order.
pub const LENGTH_TERMS: &[&str] = &[
    "tall", "extra tall", "short", "petite", "regular", "big", "big and tall", "med", "medium",
    "xlong", "long", "portly regular", "portly long", "wide-2e", "wide-3e", "wide-5e",
    "xwide-3e", "xwide-5e", "xxwide-3e", "xxwide-5e",
];

/// Inseam phrases. The number embedded in each phrase is the inseam it implies.
pub const INSEAM_PATTERNS: &[&str] = &[
    "/ 28\" inseam", "/ 30\" inseam", "/ 32\" inseam", "/ 34\" inseam", "/ 35\" inseam",
    "/ 36\" inseam", "/ 37\" inseam", "/ 38\" inseam",
    "28\" inseam", "30\" inseam", "32\" inseam", "34\" inseam", "35\" inseam", "36\" inseam",
    "37\" inseam", "38\" inseam",
    "28\"", "30\"", "34\"", "35\"", "36\"", "37\"", "38\"",
    "28 inch", "30 inch", "32 inch", "34 inch", "35 inch", "36 inch", "37 inch", "38 inch",
    "28 in", "30 in", "32 in", "34 in", "36 in", "38 in",
    "inseam 28", "inseam 30", "inseam 32", "inseam 34", "inseam 35", "inseam: 36", "inseam 37",
    "38 inseam",
];

const ALPHA_SIZES: &[&str] = &[
    "xxxs", "xxs", "xs", "s", "m", "l", "xl", "xxl", "xxxl", "xxxxl", "xxxxxl",
    "2xs", "3xs", "4xs", "5xs", "1xl", "2xl", "3xl", "4xl", "5xl", "6xl", "7xl", "8xl",
    // big and tall
    "slt", "mt", "lt", "xt", "xlt", "1xlt", "2xlt", "3xlt", "4xlt", "5xlt", "6xlt", "7xlt",
    "8xlt", "mxt", "lxt", "xlxt", "1xlxt", "2xlxt", "3xlxt", "4xlxt", "5xlxt", "6xlxt",
    "7xlxt", "8xlxt", "1xb", "2xb", "3xb", "4xb", "5xb", "6xb", "7xb", "8xb", "9xb", "1xt",
    "2xt", "3xt", "4xt", "5xt", "6xt", "7xt", "8xt", "lmt", "xlmt", "2xmt", "3xmt", "4xmt",
    "5xmt",
    // plus
    "0x", "1x", "2x", "3x", "4x", "5x", "6x", "7x", "8x", "9x",
    // between sizes
    "xxs/xs", "xs/s", "s/m", "m/l", "l/xl", "xl/1x", "1x/2x", "2x/3x", "3x/4x", "4x/5x",
    "5x/6x",
    "000", "00",
];

const NECK_SLEEVE: &[&str] = &[
    "14x32", "15x32", "15x33", "15x34", "15.5x33", "15.5x34", "16x34", "16x35", "16.5x35",
    "17x34", "17x35", "17.5x34", "17.5x35", "18x34", "18.5x35", "19x36",
];

/// Suffixes applied to every waist from 26 to 80 for regular/long/tall/big/short cuts.
const CUT_SUFFIXES: &[&str] = &[
    "r", " regular", " reg", "-reg", "l", " long", "-long", "t", " t", " tall", "-tall", "b",
    " b", " big", "-big", "s", "xt", " extra tall", "xlt",
];

/// Shoe width suffixes applied to the decimal shoe-size run.
const SHOE_WIDTHS: &[&str] = &[" w", " 3e", " 5e"];

/// Size tokens with set membership plus a longest-first scan order.
pub struct SizeTable {
    declared: Vec<String>,
    members: HashSet<String>,
    longest_first: Vec<String>,
}

impl SizeTable {
    fn build() -> Self {
        let mut declared: Vec<String> = Vec::new();
        let mut members = HashSet::new();
        let mut push = |token: String| {
            if members.insert(token.clone()) {
                declared.push(token);
            }
        };

        for s in ALPHA_SIZES {
            push(s.to_string());
        }
        // US women's numeric
        for n in (0..=36).step_by(2) {
            push(n.to_string());
        }
        // shoe sizes 2..18 in half steps, plus the "2 1/2" spelling and width variants
        for half in 4..=36 {
            push(half_step(half));
        }
        for half in 4..=36 {
            let whole = half / 2;
            push(if half % 2 == 0 { whole.to_string() } else { format!("{} 1/2", whole) });
        }
        for width in SHOE_WIDTHS {
            for half in 4..=36 {
                push(format!("{}{}", half_step(half), width));
            }
        }
        // EU shoe sizes 36..50 in half steps, with and without prefix
        for half in 72..=100 {
            push(format!("eu {}", half_step(half)));
        }
        for half in 72..=100 {
            push(half_step(half));
        }
        for waist in mens_waists() {
            push(waist.to_string());
        }
        for waist in mens_waists().chain([37]) {
            push(format!("size {}", waist));
            push(format!("size {} /", waist));
        }
        // waist x inseam
        for pattern in ["{w}x{i}", "{w} x {i}", "{w} x {i} length"] {
            for waist in (28..=80).step_by(2) {
                for inseam in (30..=50).step_by(2) {
                    push(
                        pattern
                            .replace("{w}", &waist.to_string())
                            .replace("{i}", &inseam.to_string()),
                    );
                }
            }
        }
        for suffix in CUT_SUFFIXES {
            for waist in 26..=80 {
                push(format!("{}{}", waist, suffix));
            }
        }
        for waist in (28..=54).step_by(2) {
            push(format!("{}w", waist));
        }
        // neck sizes 14..20
        for half in 28..=40 {
            push(half_step(half));
        }
        for s in NECK_SLEEVE {
            push(s.to_string());
        }
        for n in (32..=50).step_by(2) {
            push(format!("eu{}", n));
        }
        for n in (4..=30).step_by(2) {
            push(format!("uk{}", n));
        }

        let mut longest_first = declared.clone();
        // stable: equal lengths keep declared order
        longest_first.sort_by(|a, b| b.len().cmp(&a.len()));

        Self {
            declared,
            members,
            longest_first,
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.members.contains(token)
    }

    pub fn longest_first(&self) -> &[String] {
        &self.longest_first
    }

    pub fn len(&self) -> usize {
        self.declared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }
}

/// Renders `half / 2` as `"7"` or `"7.5"`.
fn half_step(half: u32) -> String {
    if half % 2 == 0 {
        (half / 2).to_string()
    } else {
        format!("{}.5", half / 2)
    }
}

fn mens_waists() -> impl Iterator<Item = u32> {
    (24..=36).chain([38, 39, 40]).chain((42..=56).step_by(2))
}

pub static SIZES: Lazy<SizeTable> = Lazy::new(SizeTable::build);
