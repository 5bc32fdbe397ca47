//! Picks the representative box-art URL out of a detail page's raw markup.

use std::sync::LazyLock;

use regex::Regex;

static CDN_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://cf\.geekdo-images\.com[^\s"'<>]+"#).expect("valid regex")
});

static EXCLUDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)crop100|square30|100x100|150x150|_thumb|_avatar|_micro").expect("valid regex")
});

static ITEM_REP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)_itemrep").expect("valid regex"));
static IMAGE_PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)_imagepage").expect("valid regex"));

fn rank(url: &str) -> u8 {
    if ITEM_REP.is_match(url) {
        0
    } else if IMAGE_PAGE.is_match(url) {
        1
    } else {
        2
    }
}

/// Candidate image URLs, best first. De-duplicated by first occurrence and
/// stable within a rank.
pub fn ranked_images(html: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut images: Vec<String> = CDN_IMAGE
        .find_iter(html)
        .map(|m| m.as_str())
        .filter(|url| seen.insert(*url))
        .filter(|url| !EXCLUDED.is_match(url))
        .map(str::to_string)
        .collect();
    images.sort_by_key(|url| rank(url));
    images
}

pub fn primary_image(html: &str) -> Option<String> {
    ranked_images(html).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_representation_wins_over_earlier_gallery_images() {
        let html = r#"
            <img src="https://cf.geekdo-images.com/abc__imagepage/img/x.jpg">
            <img src="https://cf.geekdo-images.com/def__itemrep/img/y.jpg">
            <img src="https://cf.geekdo-images.com/ghi__original/img/z.jpg">
        "#;
        assert_eq!(
            ranked_images(html),
            vec![
                "https://cf.geekdo-images.com/def__itemrep/img/y.jpg",
                "https://cf.geekdo-images.com/abc__imagepage/img/x.jpg",
                "https://cf.geekdo-images.com/ghi__original/img/z.jpg",
            ]
        );
    }

    #[test]
    fn thumbnails_and_avatars_are_excluded() {
        let html = r#"
            "https://cf.geekdo-images.com/a__thumb/img/a.jpg"
            "https://cf.geekdo-images.com/b__AVATAR/img/b.jpg"
            "https://cf.geekdo-images.com/c/fit-in/100x100/c.jpg"
            'https://cf.geekdo-images.com/d__micro/img/d.jpg'
            <https://cf.geekdo-images.com/e__square30/e.jpg>
        "#;
        assert!(ranked_images(html).is_empty());
        assert_eq!(primary_image(html), None);
    }

    #[test]
    fn duplicates_collapse_and_order_is_stable() {
        let html = "https://cf.geekdo-images.com/one.jpg https://cf.geekdo-images.com/two.jpg https://cf.geekdo-images.com/one.jpg";
        assert_eq!(
            ranked_images(html),
            vec![
                "https://cf.geekdo-images.com/one.jpg",
                "https://cf.geekdo-images.com/two.jpg",
            ]
        );
    }

    #[test]
    fn other_hosts_are_ignored() {
        let html = r#"<img src="https://example.com/cover__itemrep.jpg">"#;
        assert_eq!(primary_image(html), None);
    }
}
