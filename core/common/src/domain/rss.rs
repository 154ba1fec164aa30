//! RSS フィード fragment の購読結果

use serde::{Deserialize, Serialize};

/// フィードの 1 記事
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "pubDate")]
    pub pub_date: Option<String>,
    /// 取得元のフィード URL
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssChannel {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub items: Vec<RssItem>,
}

impl RssChannel {
    /// 取得元ごとにまとめる（API はフラットな記事列を返す）
    pub fn group_by_source(items: Vec<RssItem>) -> Vec<RssChannel> {
        let mut channels: Vec<RssChannel> = Vec::new();
        for item in items {
            let source = item.source.clone().unwrap_or_default();
            match channels.iter_mut().find(|c| c.link == source) {
                Some(channel) => channel.items.push(item),
                None => channels.push(RssChannel {
                    title: source.clone(),
                    link: source,
                    items: vec![item],
                }),
            }
        }
        channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_accepts_pub_date_alias_and_missing_fields() {
        let json = r#"{"title": "hello", "pubDate": "Mon, 01 Jan 2024 00:00:00 GMT"}"#;
        let item: RssItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.title, "hello");
        assert_eq!(item.pub_date.as_deref(), Some("Mon, 01 Jan 2024 00:00:00 GMT"));
        assert!(item.link.is_empty());
        assert!(item.source.is_none());
    }

    #[test]
    fn test_group_by_source_keeps_first_seen_order() {
        let item = |title: &str, source: &str| RssItem {
            title: title.to_string(),
            link: String::new(),
            description: String::new(),
            pub_date: None,
            source: Some(source.to_string()),
        };
        let channels = RssChannel::group_by_source(vec![
            item("a1", "https://a.example/feed"),
            item("b1", "https://b.example/feed"),
            item("a2", "https://a.example/feed"),
        ]);
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].link, "https://a.example/feed");
        assert_eq!(channels[0].items.len(), 2);
        assert_eq!(channels[1].items[0].title, "b1");
    }
}
