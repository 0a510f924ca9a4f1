//! Title → URL slug normalization
//!
//! Best-effort only: sites disambiguate remakes with suffixes ("heat-1995")
//! that cannot be derived from the title, so a slug miss is routine.

/// Word separator used by a site's URL scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugStyle {
    /// `the_matrix` (Rotten Tomatoes); hyphens in the title are dropped
    Underscore,
    /// `the-matrix` (Letterboxd); hyphens in the title are kept
    Hyphen,
}

impl SlugStyle {
    fn separator(&self) -> &'static str {
        match self {
            SlugStyle::Underscore => "_",
            SlugStyle::Hyphen => "-",
        }
    }

    fn keeps(&self, c: char) -> bool {
        c.is_ascii_alphanumeric()
            || c == '_'
            || c.is_whitespace()
            || (c == '-' && *self == SlugStyle::Hyphen)
    }
}

/// Lower-case, drop a trailing "(YYYY)", strip punctuation, join words
pub fn slugify(title: &str, style: SlugStyle) -> String {
    let lowered = title.to_lowercase();
    let cleaned: String = strip_trailing_year(&lowered)
        .chars()
        .filter(|c| style.keeps(*c))
        .collect();

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(style.separator())
}

fn strip_trailing_year(title: &str) -> &str {
    let trimmed = title.trim_end();
    let Some(inner) = trimmed.strip_suffix(')') else {
        return trimmed;
    };
    let Some(split) = inner.len().checked_sub(5) else {
        return trimmed;
    };
    if !inner.is_char_boundary(split) {
        return trimmed;
    }

    let (head, tail) = inner.split_at(split);
    match tail.strip_prefix('(') {
        Some(year) if year.chars().all(|c| c.is_ascii_digit()) => head.trim_end(),
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_suffix_removed_per_scheme() {
        assert_eq!(slugify("The Matrix (1999)", SlugStyle::Underscore), "the_matrix");
        assert_eq!(slugify("The Matrix (1999)", SlugStyle::Hyphen), "the-matrix");
    }

    #[test]
    fn test_punctuation_and_whitespace() {
        assert_eq!(
            slugify("Spider-Man: No Way Home", SlugStyle::Hyphen),
            "spider-man-no-way-home"
        );
        assert_eq!(
            slugify("Spider-Man: No Way Home", SlugStyle::Underscore),
            "spiderman_no_way_home"
        );
        assert_eq!(slugify("  Se7en  ", SlugStyle::Hyphen), "se7en");
        assert_eq!(slugify("Ocean's   Eleven", SlugStyle::Underscore), "oceans_eleven");
    }

    #[test]
    fn test_only_trailing_year_is_stripped() {
        assert_eq!(slugify("2001: A Space Odyssey", SlugStyle::Hyphen), "2001-a-space-odyssey");
        assert_eq!(slugify("(500) Days of Summer", SlugStyle::Hyphen), "500-days-of-summer");
        assert_eq!(
            slugify("Blade Runner (Final Cut)", SlugStyle::Hyphen),
            "blade-runner-final-cut"
        );
    }

    #[test]
    fn test_degenerate_titles() {
        assert_eq!(slugify("", SlugStyle::Hyphen), "");
        assert_eq!(slugify("(1999)", SlugStyle::Hyphen), "");
        assert_eq!(slugify("Amélie (2001)", SlugStyle::Hyphen), "amlie");
    }
}
