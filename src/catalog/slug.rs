//! URL-safe slugs for catalog colors.

use std::collections::HashSet;

/// Lowercase ASCII slug: non-ASCII characters are transliterated, every run
/// of non-alphanumeric characters becomes a single `-`, and leading or
/// trailing dashes are trimmed.
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    // Starts with true to avoid leading -
    let mut prev_is_dash = true;
    let mut push_char = |c: char| {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_is_dash = false;
        } else if !prev_is_dash {
            slug.push('-');
            prev_is_dash = true;
        }
    };

    for c in s.chars() {
        if c.is_ascii() {
            push_char(c);
        } else {
            for cx in deunicode::deunicode_char(c).unwrap_or("-").chars() {
                push_char(cx);
            }
        }
    }

    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Hands out slugs unique within one brand.
///
/// The first claimant of a slug keeps it; later ones get the lowest unused
/// numeric suffix starting at `-2`.
#[derive(Debug, Default)]
pub struct SlugAllocator {
    taken: HashSet<String>,
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{base}-{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_collapses_separators() {
        assert_eq!(slugify("Misty Blue"), "misty-blue");
        assert_eq!(slugify("Misty Blue N502"), "misty-blue-n502");
        assert_eq!(slugify("  --Sea   Salt!!"), "sea-salt");
        assert_eq!(slugify("You & Me"), "you-me");
        assert_eq!(slugify("SW 7005 / Pure_White"), "sw-7005-pure-white");
    }

    #[test]
    fn transliterates_unicode() {
        assert_eq!(slugify("Crème Brûlée"), "creme-brulee");
        assert_eq!(slugify("Æúű--cool?"), "aeuu-cool");
    }

    #[test]
    fn empty_when_nothing_alphanumeric() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn allocator_suffixes_collisions_in_order() {
        let mut slugs = SlugAllocator::new();
        assert_eq!(slugs.allocate("white"), "white");
        assert_eq!(slugs.allocate("white"), "white-2");
        assert_eq!(slugs.allocate("white"), "white-3");
        assert_eq!(slugs.allocate("ivory"), "ivory");
    }

    #[test]
    fn allocator_skips_suffixes_already_taken() {
        let mut slugs = SlugAllocator::new();
        assert_eq!(slugs.allocate("white-2"), "white-2");
        assert_eq!(slugs.allocate("white"), "white");
        assert_eq!(slugs.allocate("white"), "white-3");
    }
}
