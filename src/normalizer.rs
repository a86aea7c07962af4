// Text normalization shared by the classifier and the category mapper

/// Lower-cases, trims and replaces `&` with `and`.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase().replace('&', "and")
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest,
/// so `"chic thread"` becomes `"Chic Thread"` and `"x-large"` becomes `"X-Large"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
