string_enum! {
    #[derive(Default)]
    ShopCategory ("shop category") {
        Kirana => "kirana",
        Salon => "salon",
        Tailor => "tailor",
        Tiffin => "tiffin",
        Tuition => "tuition",
        Repair => "repair",
        Medical => "medical",
        Bakery => "bakery",
        #[default]
        Other => "other",
    }
}

string_enum! {
    #[derive(Default)]
    Language ("language") {
        #[default]
        En => "en",
        Hi => "hi",
    }
}

/// Upper bound on numeric suffixes tried before giving up on a slug.
pub const MAX_SLUG_SUFFIX: u32 = 1_000;

/// Derives the URL-safe base slug for a shop name.
///
/// Characters outside `[a-z0-9]` after lowercasing act as separators, runs of
/// separators collapse to one hyphen, and edge hyphens are trimmed.
/// `"Rahul's Kirana Store!!"` becomes `"rahul-s-kirana-store"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("shop");
    }
    slug
}

/// Candidate slugs in the order they are tried: `base`, `base-1`, `base-2`, ...
pub fn slug_candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string())
        .chain((1..=MAX_SLUG_SUFFIX).map(move |n| format!("{base}-{n}")))
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
