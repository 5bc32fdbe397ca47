//! Structural extraction from BGG XML documents.
//!
//! These are pattern matches, not an XML parse: collection exports can be large
//! and are occasionally truncated, and a partial document should still yield
//! every complete item it contains.

use std::sync::LazyLock;

use quick_xml::escape::unescape;
use regex::Regex;

use crate::types::CollectionItem;

static COLLECTION_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<item[^>]*objectid="(\d+)"[^>]*>.*?<name[^>]*>([^<]+)</name>.*?</item>"#)
        .unwrap()
});
static SEARCH_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<item[^>]*id="(\d+)""#).unwrap());
static LINK_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"boardgame/(\d+)").unwrap());

/// Items of a collection export in document order. Duplicates are kept.
pub fn parse_collection(xml: &str) -> Vec<CollectionItem> {
    COLLECTION_ITEM_RE
        .captures_iter(xml)
        .map(|caps| CollectionItem {
            id: caps[1].to_string(),
            name: decode_entities(caps[2].trim()),
        })
        .collect()
}

/// The id of the first `<item>` in a search response.
pub fn first_search_id(xml: &str) -> Option<String> {
    SEARCH_ITEM_RE.captures(xml).map(|caps| caps[1].to_string())
}

/// The numeric game id embedded in a `…/boardgame/{id}/…` link.
pub fn bgg_id_from_link(link: &str) -> Option<String> {
    LINK_ID_RE.captures(link).map(|caps| caps[1].to_string())
}

/// Resolves named and numeric character references. Malformed references leave
/// the text as it was.
fn decode_entities(text: &str) -> String {
    match unescape(text) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<items totalitems="3" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
  <item objecttype="thing" objectid="13" subtype="boardgame" collid="1">
    <name sortindex="1">Catan</name>
    <yearpublished>1995</yearpublished>
  </item>
  <item objecttype="thing" objectid="9209" subtype="boardgame" collid="2">
    <name sortindex="1">Ticket to Ride</name>
  </item>
  <item objecttype="thing" objectid="13" subtype="boardgame" collid="3">
    <name sortindex="1">Catan</name>
  </item>
  <item objecttype="thing" objectid="822" subtype="boardgame" collid="4">
    <name sortindex="1">Carcass"#;

    #[test]
    fn collection_items_in_document_order_with_duplicates() {
        let items = parse_collection(COLLECTION);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["13", "9209", "13"]);
        assert_eq!(items[1].name, "Ticket to Ride");
    }

    #[test]
    fn truncated_trailing_item_is_ignored() {
        let items = parse_collection(COLLECTION);
        assert!(items.iter().all(|i| i.id != "822"));
    }

    #[test]
    fn collection_names_are_entity_decoded() {
        let xml = r#"<item objectid="1"><name>Dungeons &amp; Dragons</name></item>"#;
        assert_eq!(parse_collection(xml)[0].name, "Dungeons & Dragons");
    }

    #[test]
    fn numeric_character_references_are_decoded() {
        let xml = r#"<item objectid="2"><name>Tzolk&#8217;in</name></item><item objectid="3"><name>King&#039;s Dilemma</name></item>"#;
        let items = parse_collection(xml);
        assert_eq!(items[0].name, "Tzolk\u{2019}in");
        assert_eq!(items[1].name, "King's Dilemma");
    }

    #[test]
    fn malformed_reference_keeps_raw_text() {
        let xml = r#"<item objectid="4"><name>Fish &amp Chips</name></item>"#;
        assert_eq!(parse_collection(xml)[0].name, "Fish &amp Chips");
    }

    #[test]
    fn empty_collection_yields_nothing() {
        assert!(parse_collection(r#"<items totalitems="0"></items>"#).is_empty());
    }

    #[test]
    fn first_search_id_takes_first_item() {
        let xml = r#"<items total="2"><item type="boardgame" id="13"><name value="Catan"/></item><item type="boardgame" id="27710"/></items>"#;
        assert_eq!(first_search_id(xml).as_deref(), Some("13"));
        assert_eq!(first_search_id(r#"<items total="0"></items>"#), None);
    }

    #[test]
    fn link_ids() {
        assert_eq!(
            bgg_id_from_link("https://boardgamegeek.com/boardgame/13/catan").as_deref(),
            Some("13")
        );
        assert_eq!(
            bgg_id_from_link("https://boardgamegeek.com/boardgame/174430").as_deref(),
            Some("174430")
        );
        assert_eq!(bgg_id_from_link("https://boardgamegeek.com/user/someone"), None);
    }
}
