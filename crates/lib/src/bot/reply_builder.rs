//! Location replies: run the restaurant search and turn the outcome into one reply payload.
//!
//! Every failure ends in a text reply; nothing here returns an error to the caller.

use crate::channels::{CarouselColumn, ReplyPayload, ReplyTarget, Replier, UriAction};
use crate::config::ReplyFormat;
use crate::search::{truncate_chars, HotPepperClient, SearchError, Shop, ADDRESS_MAX_CHARS};

pub const KEY_NOT_CONFIGURED_TEXT: &str = "search API key is not configured";
pub const FETCH_FAILED_TEXT: &str = "failed to retrieve restaurant information";
pub const PARSE_FAILED_TEXT: &str = "failed to parse restaurant information";
pub const NO_RESULTS_TEXT: &str = "no restaurants found nearby";
pub const LISTING_HEADER: &str = "restaurant info near you:\n\n";
pub const CAROUSEL_ALT_TEXT: &str = "restaurant list";

const CAROUSEL_MAX_COLUMNS: usize = 10;
const CAROUSEL_TITLE_MAX_CHARS: usize = 40;
const OPEN_ACTION_LABEL: &str = "open in Hot Pepper";
/// Placeholder for shops without an address; column text is required.
const EMPTY_COLUMN_TEXT: &str = "-";
/// Used when a shop has no URL; every column needs one action.
const PROVIDER_TOP_URL: &str = "https://www.hotpepper.jp/";

/// Builds replies for location messages.
#[derive(Clone)]
pub struct ReplyBuilder {
    search: HotPepperClient,
    format: ReplyFormat,
}

impl ReplyBuilder {
    pub fn new(search: HotPepperClient, format: ReplyFormat) -> Self {
        Self { search, format }
    }

    /// Build the reply for a location and send it. Send failures are logged.
    pub async fn handle_location(
        &self,
        replier: &dyn Replier,
        target: &ReplyTarget,
        latitude: f64,
        longitude: f64,
    ) {
        let payload = self.location_reply(latitude, longitude).await;
        if let Err(e) = replier.reply(target, payload).await {
            log::warn!("location reply failed: {}", e);
        }
    }

    /// The reply for a location. Makes at most one search call, none when the key is missing.
    pub async fn location_reply(&self, latitude: f64, longitude: f64) -> ReplyPayload {
        if !self.search.has_api_key() {
            log::warn!("location received but HOTPEPPER_API_KEY is not set");
            return ReplyPayload::text(KEY_NOT_CONFIGURED_TEXT);
        }
        let query = self.search.query(latitude, longitude);
        let shops = match self.search.search(&query).await {
            Ok(shops) => shops,
            Err(e) => {
                log::warn!("gourmet search failed: {}", e);
                return ReplyPayload::text(failure_text(&e));
            }
        };
        if shops.is_empty() {
            return ReplyPayload::text(NO_RESULTS_TEXT);
        }
        match self.format {
            ReplyFormat::Text => ReplyPayload::text(render_text_listing(&shops)),
            ReplyFormat::Carousel => render_carousel(&shops),
        }
    }
}

fn failure_text(err: &SearchError) -> &'static str {
    match err {
        SearchError::MissingKey => KEY_NOT_CONFIGURED_TEXT,
        SearchError::Request(_) | SearchError::Status(_) | SearchError::Upstream(_) => FETCH_FAILED_TEXT,
        SearchError::Body(_) | SearchError::Decode(_) => PARSE_FAILED_TEXT,
    }
}

/// Header followed by `name: ..\naddress: ..\n\n` per shop, in the given order.
pub fn render_text_listing(shops: &[Shop]) -> String {
    let mut out = String::from(LISTING_HEADER);
    for shop in shops {
        out.push_str("name: ");
        out.push_str(&shop.name);
        out.push_str("\naddress: ");
        out.push_str(&shop.address);
        out.push_str("\n\n");
    }
    out
}

/// Carousel with one column per shop (at most 10). Columns must share the same fields, so
/// thumbnails and titles are set only when every shown shop has one. Column text is never empty.
pub fn render_carousel(shops: &[Shop]) -> ReplyPayload {
    let shown = &shops[..shops.len().min(CAROUSEL_MAX_COLUMNS)];
    let with_thumbnails = shown.iter().all(|s| s.photo_url.is_some());
    let with_titles = shown.iter().all(|s| !s.name.trim().is_empty());
    let columns = shown
        .iter()
        .map(|shop| CarouselColumn {
            thumbnail_image_url: if with_thumbnails { shop.photo_url.clone() } else { None },
            title: if with_titles {
                Some(truncate_chars(&shop.name, CAROUSEL_TITLE_MAX_CHARS))
            } else {
                None
            },
            text: column_text(shop),
            actions: vec![UriAction {
                label: OPEN_ACTION_LABEL.to_string(),
                uri: shop.url.clone().unwrap_or_else(|| PROVIDER_TOP_URL.to_string()),
            }],
        })
        .collect();
    ReplyPayload::carousel(CAROUSEL_ALT_TEXT, columns)
}

fn column_text(shop: &Shop) -> String {
    let text = truncate_chars(&shop.address, ADDRESS_MAX_CHARS);
    if text.trim().is_empty() {
        EMPTY_COLUMN_TEXT.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::Template;
    use crate::config::SearchConfig;

    fn shop(name: &str, address: &str, photo: Option<&str>, url: Option<&str>) -> Shop {
        Shop {
            name: name.to_string(),
            address: address.to_string(),
            photo_url: photo.map(String::from),
            url: url.map(String::from),
        }
    }

    fn columns(payload: &ReplyPayload) -> &[CarouselColumn] {
        match payload {
            ReplyPayload::Template {
                template: Template::Carousel { columns },
                ..
            } => columns,
            other => panic!("expected carousel, got {:?}", other),
        }
    }

    #[test]
    fn text_listing_matches_expected_layout() {
        let shops = vec![shop("ShopA", "AddrA", None, None), shop("ShopB", "AddrB", None, None)];
        assert_eq!(
            render_text_listing(&shops),
            "restaurant info near you:\n\nname: ShopA\naddress: AddrA\n\nname: ShopB\naddress: AddrB\n\n"
        );
    }

    #[test]
    fn carousel_builds_one_card_per_shop() {
        let shops = vec![
            shop("ShopA", "AddrA", Some("https://img/a"), Some("https://shop/a")),
            shop("ShopB", "AddrB", Some("https://img/b"), None),
        ];
        let payload = render_carousel(&shops);
        match &payload {
            ReplyPayload::Template { alt_text, .. } => assert_eq!(alt_text, CAROUSEL_ALT_TEXT),
            other => panic!("expected template, got {:?}", other),
        }
        let cols = columns(&payload);
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0].thumbnail_image_url.as_deref(), Some("https://img/a"));
        assert_eq!(cols[0].title.as_deref(), Some("ShopA"));
        assert_eq!(cols[0].text, "AddrA");
        assert_eq!(cols[0].actions[0].uri, "https://shop/a");
        assert_eq!(cols[1].actions[0].uri, PROVIDER_TOP_URL);
    }

    #[test]
    fn carousel_caps_columns_and_lengths() {
        let long_name = "n".repeat(50);
        let long_addr = "a".repeat(80);
        let shops: Vec<Shop> = (0..12)
            .map(|_| shop(&long_name, &long_addr, Some("https://img"), Some("https://u")))
            .collect();
        let payload = render_carousel(&shops);
        let cols = columns(&payload);
        assert_eq!(cols.len(), 10);
        assert_eq!(cols[0].title.as_ref().map(|t| t.chars().count()), Some(40));
        assert_eq!(cols[0].text, "a".repeat(60));
    }

    #[test]
    fn carousel_drops_thumbnails_unless_all_have_photos() {
        let shops = vec![
            shop("A", "x", Some("https://img/a"), None),
            shop("B", "y", None, None),
        ];
        let payload = render_carousel(&shops);
        assert!(columns(&payload).iter().all(|c| c.thumbnail_image_url.is_none()));
    }

    #[test]
    fn carousel_columns_stay_uniform_for_blank_shops() {
        let shops = vec![
            shop("ShopA", "AddrA", None, None),
            shop("", "", None, None),
        ];
        let payload = render_carousel(&shops);
        let cols = columns(&payload);
        assert_eq!(cols.len(), 2);
        assert!(cols.iter().all(|c| c.title.is_none()));
        assert_eq!(cols[0].text, "AddrA");
        assert_eq!(cols[1].text, EMPTY_COLUMN_TEXT);
        let v = serde_json::to_value(&payload).unwrap();
        for col in v["template"]["columns"].as_array().unwrap() {
            assert!(!col["text"].as_str().unwrap().is_empty());
            assert!(col.get("title").is_none());
        }
    }

    #[test]
    fn failures_map_to_distinct_texts() {
        assert_eq!(failure_text(&SearchError::MissingKey), KEY_NOT_CONFIGURED_TEXT);
        assert_eq!(
            failure_text(&SearchError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)),
            FETCH_FAILED_TEXT
        );
        assert_eq!(failure_text(&SearchError::Upstream("x".to_string())), FETCH_FAILED_TEXT);
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(failure_text(&SearchError::Decode(decode)), PARSE_FAILED_TEXT);
    }

    #[tokio::test]
    async fn missing_key_replies_not_configured() {
        let config = SearchConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..SearchConfig::default()
        };
        let builder = ReplyBuilder::new(
            HotPepperClient::new(&config, reqwest::Client::new()),
            ReplyFormat::Carousel,
        );
        let payload = builder.location_reply(35.0, 139.0).await;
        assert_eq!(payload.as_text(), Some(KEY_NOT_CONFIGURED_TEXT));
    }
}
