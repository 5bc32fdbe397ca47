use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScrapeRequest<'a> {
    pub url: &'a str,
    pub formats: [&'static str; 2],
    pub only_main_content: bool,
}

/// `/scrape` response. Depending on API version the page fields are either
/// nested under `data` or returned at the top level.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScrapeResponse {
    #[serde(default)]
    pub data: Option<ScrapeData>,
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub raw_html: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScrapeData {
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub raw_html: Option<String>,
}

/// A scraped page: readable markdown plus the raw markup it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedPage {
    pub markdown: String,
    pub raw_html: String,
}

impl ScrapeResponse {
    pub fn into_page(self) -> ScrapedPage {
        let (nested_md, nested_html) = match self.data {
            Some(data) => (data.markdown, data.raw_html),
            None => (None, None),
        };
        ScrapedPage {
            markdown: nested_md.or(self.markdown).unwrap_or_default(),
            raw_html: nested_html.or(self.raw_html).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_data_wins() {
        let resp: ScrapeResponse = serde_json::from_value(serde_json::json!({
            "success": true,
            "data": { "markdown": "# Catan", "rawHtml": "<h1>Catan</h1>" },
            "markdown": "ignored"
        }))
        .unwrap();
        let page = resp.into_page();
        assert_eq!(page.markdown, "# Catan");
        assert_eq!(page.raw_html, "<h1>Catan</h1>");
    }

    #[test]
    fn top_level_fields_are_accepted() {
        let resp: ScrapeResponse = serde_json::from_value(serde_json::json!({
            "markdown": "text",
            "rawHtml": "<p>text</p>"
        }))
        .unwrap();
        let page = resp.into_page();
        assert_eq!(page.markdown, "text");
        assert_eq!(page.raw_html, "<p>text</p>");
    }

    #[test]
    fn missing_fields_become_empty() {
        let resp: ScrapeResponse = serde_json::from_value(serde_json::json!({ "success": true })).unwrap();
        assert_eq!(resp.into_page(), ScrapedPage::default());
    }

    #[test]
    fn request_uses_camel_case_wire_names() {
        let req = ScrapeRequest {
            url: "https://example.com",
            formats: ["markdown", "rawHtml"],
            only_main_content: true,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["onlyMainContent"], true);
        assert_eq!(json["formats"][1], "rawHtml");
    }
}
