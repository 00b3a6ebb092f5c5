use uuid::Uuid;

/// Number of id characters appended to keep slugs unique for duplicate titles.
const SLUG_SUFFIX_LEN: usize = 8;

/// Derives a URL slug from an event title and its id, e.g.
/// `"Rust Meetup!" -> "rust-meetup-1f9e2c3a"`.
pub fn event_slug(title: &str, id: Uuid) -> String {
    let id_hex = id.simple().to_string();
    format!("{}-{}", slugify(title), &id_hex[..SLUG_SUFFIX_LEN])
}

fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_was_dash = true;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("Rust Meetup 2026!"), "rust-meetup-2026");
        assert_eq!(slugify("  --hello--  world--  "), "hello-world");
    }

    #[test]
    fn duplicate_titles_produce_distinct_slugs() {
        let a = event_slug("Launch Party", Uuid::new_v4());
        let b = event_slug("Launch Party", Uuid::new_v4());
        assert_ne!(a, b);
        assert!(a.starts_with("launch-party-"));
    }

    #[test]
    fn non_ascii_titles_still_yield_a_suffix() {
        let slug = event_slug("北京 2026", Uuid::new_v4());
        // The numeric fragment and the id suffix survive.
        assert!(slug.contains("2026-"));
    }
}
