// src/services/extractor.rs

//! Record extraction: one feed item to one flat episode record.

use quick_xml::events::Event;

use crate::models::EpisodeRecord;
use crate::services::document::ItemNode;

/// A child element whose text is being collected.
struct OpenField {
    name: String,
    text: String,
}

/// Build an episode record from the direct children of an item.
///
/// Namespace prefixes are stripped (`itunes:duration` becomes `duration`),
/// values are trimmed, and a repeated field name keeps the later value.
/// Extraction never fails; an absent field is simply not in the record.
pub fn extract_record(item: ItemNode<'_>) -> EpisodeRecord {
    let mut record = EpisodeRecord::new();
    let events = item.events();
    if events.len() < 2 {
        return record;
    }

    let mut depth = 0usize;
    let mut current: Option<OpenField> = None;

    for event in &events[1..events.len() - 1] {
        match event {
            Event::Start(e) => {
                if depth == 0 {
                    current = Some(OpenField {
                        name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                        text: String::new(),
                    });
                }
                depth += 1;
            }
            Event::Empty(e) if depth == 0 => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                store(&mut record, name, String::new());
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(field) = current.take() {
                        let value = field.text.trim().to_string();
                        store(&mut record, field.name, value);
                    }
                }
            }
            Event::Text(text) if depth == 1 => {
                if let Some(field) = current.as_mut() {
                    match text.unescape() {
                        Ok(s) => field.text.push_str(&s),
                        Err(_) => field.text.push_str(&String::from_utf8_lossy(text)),
                    }
                }
            }
            Event::CData(data) if depth == 1 => {
                if let Some(field) = current.as_mut() {
                    field.text.push_str(&String::from_utf8_lossy(data));
                }
            }
            _ => {}
        }
    }

    record
}

fn store(record: &mut EpisodeRecord, name: String, value: String) {
    if let Some(previous) = record.get(&name) {
        log::warn!(
            "Field '{}' defined more than once in item '{}' ('{}' replaced by '{}')",
            name,
            record.label(),
            previous,
            value
        );
    }
    record.insert(name, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::FeedDocument;

    fn first_record(xml: &str) -> EpisodeRecord {
        let doc = FeedDocument::parse(xml.as_bytes()).unwrap();
        let item = doc.items().next().unwrap();
        extract_record(item)
    }

    #[test]
    fn test_strips_namespace_prefix() {
        let record = first_record(
            r#"<rss xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd"><channel>
                <item>
                  <title>Episode 12</title>
                  <itunes:duration>1820</itunes:duration>
                  <guid isPermaLink="false">ep-12</guid>
                </item>
            </channel></rss>"#,
        );
        assert_eq!(record.get("title"), Some("Episode 12"));
        assert_eq!(record.get("duration"), Some("1820"));
        assert_eq!(record.get("guid"), Some("ep-12"));
        assert!(!record.contains("itunes:duration"));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_duplicate_field_last_value_wins() {
        let record = first_record(
            r#"<rss><channel><item>
                <title>Feed title</title>
                <itunes:title>iTunes title</itunes:title>
            </item></channel></rss>"#,
        );
        assert_eq!(record.get("title"), Some("iTunes title"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_text_is_trimmed_and_unescaped() {
        let record = first_record(
            "<rss><channel><item><title>\n   Fish &amp; Chips  \n</title></item></channel></rss>",
        );
        assert_eq!(record.get("title"), Some("Fish & Chips"));
    }

    #[test]
    fn test_cdata_content() {
        let record = first_record(
            "<rss><channel><item><description><![CDATA[<p>Book Club</p>]]></description></item></channel></rss>",
        );
        assert_eq!(record.get("description"), Some("<p>Book Club</p>"));
    }

    #[test]
    fn test_empty_and_nested_children() {
        let record = first_record(
            r#"<rss><channel><item>
                <enclosure url="https://example.com/a.mp3" length="1" type="audio/mpeg"/>
                <author></author>
                <group>outer<content>inner</content></group>
            </item></channel></rss>"#,
        );
        assert_eq!(record.get("enclosure"), Some(""));
        assert_eq!(record.get("author"), Some(""));
        assert_eq!(record.get("group"), Some("outer"));
        assert!(!record.contains("content"));
    }

    #[test]
    fn test_empty_item_yields_empty_record() {
        assert!(first_record("<rss><channel><item/></channel></rss>").is_empty());
        assert!(first_record("<rss><channel><item></item></channel></rss>").is_empty());
    }
}
