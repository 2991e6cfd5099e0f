//! URL slug derivation.

/// Derives a URL-safe slug from a tour name.
///
/// Lowercases the input, maps runs of non-alphanumeric characters to a single
/// hyphen, and trims leading/trailing hyphens.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("The Forest Hiker"), "the-forest-hiker");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_simple_name() {
        assert_eq!(slugify("The Forest Hiker"), "the-forest-hiker");
    }

    #[test]
    fn test_slugify_collapses_separator_runs() {
        assert_eq!(slugify("The  Sea --- Explorer"), "the-sea-explorer");
    }

    #[test]
    fn test_slugify_trims_edges() {
        assert_eq!(slugify("  The Snow Adventurer  "), "the-snow-adventurer");
    }

    #[test]
    fn test_slugify_lowercases() {
        assert_eq!(slugify("THE CITY WANDERER"), "the-city-wanderer");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
    }
}
