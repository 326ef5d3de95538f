use crate::resolve::FeedItem;
use crate::util::clean_text;
use anyhow::Result;
use chrono::{DateTime, Utc};
use feed_rs::parser;

/// RSS `pubDate` layout with a two-digit day, as feeds conventionally write it.
const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Feed metadata plus its items in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub items: Vec<FeedItem>,
}

/// Parses RSS/Atom bytes.
///
/// Entries without a link are kept with an empty `link` so item positions
/// match the source document; the resolver reports them as failed.
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed> {
    let feed = parser::parse(bytes)?;

    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let link = entry
                .links
                .first()
                .map(|l| l.href.trim().to_owned())
                .unwrap_or_default();
            let publication_date = entry
                .published
                .or(entry.updated)
                .map(|dt| format_pub_date(&dt));
            let title = entry.title.and_then(|t| clean_text(&t.content));

            FeedItem {
                title,
                publication_date,
                link,
            }
        })
        .collect();

    Ok(ParsedFeed {
        title: feed.title.and_then(|t| clean_text(&t.content)),
        description: feed.description.and_then(|d| clean_text(&d.content)),
        items,
    })
}

/// Renders a parsed entry date back into `pubDate` form, normalized to UTC.
fn format_pub_date(date: &DateTime<Utc>) -> String {
    date.format(PUB_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GOOGLE_NEWS_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
    <title>Top stories - Google News</title>
    <description>Google News</description>
    <item>
        <title>First story - Example Times</title>
        <link>https://news.google.com/rss/articles/CBMiAA?oc=5</link>
        <pubDate>Tue, 01 Oct 2024 10:00:00 GMT</pubDate>
    </item>
    <item>
        <title>Second story</title>
        <link>https://example.com/second</link>
    </item>
</channel></rss>"#;

    #[test]
    fn test_parses_rss_items_in_order() {
        let feed = parse_feed(GOOGLE_NEWS_RSS.as_bytes()).unwrap();

        assert_eq!(feed.title.as_deref(), Some("Top stories - Google News"));
        assert_eq!(feed.description.as_deref(), Some("Google News"));
        assert_eq!(feed.items.len(), 2);
        assert_eq!(
            feed.items[0],
            FeedItem {
                title: Some("First story - Example Times".into()),
                publication_date: Some("Tue, 01 Oct 2024 10:00:00 +0000".into()),
                link: "https://news.google.com/rss/articles/CBMiAA?oc=5".into(),
            }
        );
        assert_eq!(feed.items[1].link, "https://example.com/second");
        assert!(feed.items[1].publication_date.is_none());
    }

    #[test]
    fn test_parses_atom_entries() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Atom Feed</title>
    <id>urn:feed</id>
    <updated>2024-10-01T10:00:00Z</updated>
    <entry>
        <title>Entry</title>
        <id>urn:entry:1</id>
        <link href="https://example.com/entry"/>
        <updated>2024-10-02T08:30:00Z</updated>
    </entry>
</feed>"#;

        let feed = parse_feed(atom.as_bytes()).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Atom Feed"));
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].link, "https://example.com/entry");
        assert_eq!(
            feed.items[0].publication_date.as_deref(),
            Some("Wed, 02 Oct 2024 08:30:00 +0000")
        );
    }

    #[test]
    fn test_pub_date_normalized_to_utc() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><link>https://example.com/a</link><pubDate>Sat, 05 Oct 2024 01:15:00 +0200</pubDate></item>
    <item><link>https://example.com/b</link><pubDate>sometime last week</pubDate></item>
</channel></rss>"#;

        let feed = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(
            feed.items[0].publication_date.as_deref(),
            Some("Fri, 04 Oct 2024 23:15:00 +0000")
        );
        // Unparseable dates are dropped rather than passed through
        assert!(feed.items[1].publication_date.is_none());
    }

    #[test]
    fn test_item_without_link_keeps_position() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><title>No link</title></item>
    <item><title>Linked</title><link>https://example.com/a</link></item>
</channel></rss>"#;

        let feed = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].link, "");
        assert_eq!(feed.items[1].link, "https://example.com/a");
    }

    #[test]
    fn test_blank_title_is_none() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>  </title>
    <item><title></title><link>https://example.com/a</link></item>
</channel></rss>"#;

        let feed = parse_feed(rss.as_bytes()).unwrap();
        assert!(feed.title.is_none());
        assert!(feed.items[0].title.is_none());
    }

    #[test]
    fn test_empty_channel() {
        let rss = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;
        let feed = parse_feed(rss.as_bytes()).unwrap();
        assert!(feed.items.is_empty());
    }

    #[test]
    fn test_malformed_input_is_error() {
        assert!(parse_feed(b"<not valid xml").is_err());
        assert!(parse_feed(b"").is_err());
    }
}
