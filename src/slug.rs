/// Turn display text into a slug: `"Mountain's Stoutness"` -> `"mountains-stoutness"`,
/// `"alchemicalCrafting"` -> `"alchemical-crafting"`.
#[must_use]
pub fn sluggify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut prev_lower = false;
    let mut pending_dash = false;

    for c in text.chars() {
        if c == '\'' || c == '\u{2019}' {
            continue;
        }
        if c.is_alphanumeric() {
            if c.is_uppercase() && prev_lower {
                pending_dash = true;
            }
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            prev_lower = c.is_lowercase() || c.is_numeric();
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
            prev_lower = false;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_words() {
        assert_eq!(sluggify("Alchemy"), "alchemy");
        assert_eq!(sluggify("Snare Crafting"), "snare-crafting");
    }

    #[test]
    fn apostrophes_are_dropped() {
        assert_eq!(sluggify("Mountain's Stoutness"), "mountains-stoutness");
        assert_eq!(sluggify("Mountain\u{2019}s Stoutness"), "mountains-stoutness");
    }

    #[test]
    fn camel_case_splits() {
        assert_eq!(sluggify("alchemicalCrafting"), "alchemical-crafting");
        assert_eq!(sluggify("dailyPrep2"), "daily-prep2");
    }

    #[test]
    fn punctuation_runs_collapse_and_trim() {
        assert_eq!(sluggify("  --Hello,   World!-- "), "hello-world");
        assert_eq!(sluggify(""), "");
        assert_eq!(sluggify("!!!"), "");
    }
}
