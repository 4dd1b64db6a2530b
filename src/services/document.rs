// src/services/document.rs

//! Event-preserving RSS document.
//!
//! The document keeps every XML event it was parsed from, so serializing it
//! reproduces the source (declaration, comments, whitespace, CDATA, channel
//! metadata) except for the items that were removed.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::{AppError, Result};

/// Position of one channel item in the event list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ItemSpan {
    /// Whitespace preceding the item, removed together with it
    lead: usize,
    /// Index of the item's start (or self-closing) event
    start: usize,
    /// Index of the item's end event, inclusive
    end: usize,
}

impl ItemSpan {
    fn len_with_lead(&self) -> usize {
        self.end - self.lead + 1
    }

    fn shifted(&self, by: usize) -> Self {
        Self {
            lead: self.lead - by,
            start: self.start - by,
            end: self.end - by,
        }
    }
}

/// Read-only view of one `<item>` element.
#[derive(Debug, Clone, Copy)]
pub struct ItemNode<'a> {
    events: &'a [Event<'static>],
}

impl<'a> ItemNode<'a> {
    /// Events from the item's start tag to its end tag, inclusive.
    pub(crate) fn events(&self) -> &'a [Event<'static>] {
        self.events
    }
}

/// A parsed feed: one root, one channel, and the channel's items.
#[derive(Debug, Clone)]
pub struct FeedDocument {
    events: Vec<Event<'static>>,
    items: Vec<ItemSpan>,
}

impl FeedDocument {
    /// Parse raw feed bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();

        let mut events: Vec<Event<'static>> = Vec::new();
        let mut items = Vec::new();

        let mut depth = 0usize;
        let mut root_seen = false;
        let mut has_channel = false;
        let mut in_channel = false;
        let mut open_item: Option<(usize, usize)> = None;

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                AppError::parse(format!("byte {}", reader.buffer_position()), e)
            })?;

            match &event {
                Event::Start(e) => {
                    if depth == 0 {
                        if root_seen {
                            return Err(AppError::parse("document", "multiple root elements"));
                        }
                        root_seen = true;
                    }
                    let local = e.local_name();
                    if depth == 1 && !has_channel && local.as_ref() == b"channel" {
                        has_channel = true;
                        in_channel = true;
                    } else if in_channel && depth == 2 && local.as_ref() == b"item" {
                        open_item = Some((lead_index(&events), events.len()));
                    }
                    depth += 1;
                }
                Event::Empty(e) => {
                    if depth == 0 {
                        if root_seen {
                            return Err(AppError::parse("document", "multiple root elements"));
                        }
                        root_seen = true;
                    }
                    let local = e.local_name();
                    if depth == 1 && !has_channel && local.as_ref() == b"channel" {
                        has_channel = true;
                    } else if in_channel && depth == 2 && local.as_ref() == b"item" {
                        let index = events.len();
                        items.push(ItemSpan {
                            lead: lead_index(&events),
                            start: index,
                            end: index,
                        });
                    }
                }
                Event::End(_) => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        AppError::parse(
                            format!("byte {}", reader.buffer_position()),
                            "unmatched end tag",
                        )
                    })?;
                    if in_channel && depth == 2 {
                        if let Some((lead, start)) = open_item.take() {
                            items.push(ItemSpan {
                                lead,
                                start,
                                end: events.len(),
                            });
                        }
                    } else if in_channel && depth == 1 {
                        in_channel = false;
                    }
                }
                Event::Eof => break,
                _ => {}
            }

            events.push(event.into_owned());
            buf.clear();
        }

        if depth != 0 {
            return Err(AppError::parse(
                "document",
                format!("unexpected end of document with {depth} unclosed element(s)"),
            ));
        }
        if !root_seen {
            return Err(AppError::parse("document", "no root element"));
        }
        if !has_channel {
            return Err(AppError::parse(
                "document",
                "no <channel> element under the root",
            ));
        }

        Ok(Self { events, items })
    }

    /// Number of items currently in the channel.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Items in document order.
    pub fn items(&self) -> impl Iterator<Item = ItemNode<'_>> {
        self.items.iter().map(|span| self.node(span))
    }

    fn node(&self, span: &ItemSpan) -> ItemNode<'_> {
        ItemNode {
            events: &self.events[span.start..=span.end],
        }
    }

    /// Keep only the items for which `keep` returns true.
    ///
    /// The predicate sees every item of a snapshot taken before any removal,
    /// in document order. Returns the number of removed items.
    pub fn retain_items<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(ItemNode<'_>) -> bool,
    {
        let snapshot = self.items.clone();
        let verdicts: Vec<bool> = snapshot.iter().map(|span| keep(self.node(span))).collect();

        let removed: Vec<ItemSpan> = snapshot
            .iter()
            .zip(&verdicts)
            .filter(|(_, kept)| !**kept)
            .map(|(span, _)| *span)
            .collect();
        if removed.is_empty() {
            return 0;
        }

        let old = std::mem::take(&mut self.events);
        let mut events = Vec::with_capacity(old.len());
        let mut pending = removed.iter().peekable();
        for (index, event) in old.into_iter().enumerate() {
            while pending.peek().is_some_and(|span| index > span.end) {
                pending.next();
            }
            let dropped = pending
                .peek()
                .is_some_and(|span| (span.lead..=span.end).contains(&index));
            if !dropped {
                events.push(event);
            }
        }

        let mut shift = 0;
        let mut items = Vec::with_capacity(snapshot.len() - removed.len());
        for (span, kept) in snapshot.iter().zip(&verdicts) {
            if *kept {
                items.push(span.shifted(shift));
            } else {
                shift += span.len_with_lead();
            }
        }

        self.events = events;
        self.items = items;
        removed.len()
    }

    /// Serialize the document back to XML bytes.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for event in &self.events {
            writer
                .write_event(event.borrow())
                .map_err(|e| AppError::parse("serialization", e))?;
        }
        Ok(writer.into_inner())
    }

    /// Serialize the document to an XML string.
    pub fn to_xml_string(&self) -> Result<String> {
        String::from_utf8(self.to_xml()?).map_err(|e| AppError::parse("serialization", e))
    }
}

/// Index where a new channel child starts, including its leading whitespace.
fn lead_index(events: &[Event<'static>]) -> usize {
    match events.last() {
        Some(Event::Text(text)) if text.iter().all(u8::is_ascii_whitespace) => events.len() - 1,
        _ => events.len(),
    }
}
