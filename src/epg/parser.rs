//! Streaming XMLTV parser.
//!
//! One forward-only pass over the document with quick-xml. No DOM is built, so
//! guides of tens of megabytes stay cheap. Only `<programme>` elements and
//! their `<title>` are read; everything else is skipped.

use super::schedule::{Program, ScheduleTable};
use crate::errors::GuideError;
use crate::xmltv_time::parse_xmltv_datetime;
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::borrow::Cow;
use tracing::debug;

/// Progress never reaches 1.0 until the scan has fully completed
pub const MAX_PARTIAL_PROGRESS: f64 = 0.99;

/// Where the scanner currently is, as far as programme extraction cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Element {
    #[default]
    Outside,
    Programme,
    Title,
    /// A second `<title>` (usually another language) after one was already read
    ExtraTitle,
}

/// Event-callback state carried between the three handlers
#[derive(Debug, Default)]
struct ProgrammeState {
    current_element: Element,
    channel_key: String,
    title: String,
    start: Option<DateTime<Utc>>,
    stop: Option<DateTime<Utc>>,
}

impl ProgrammeState {
    fn element_start(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"programme" => {
                self.current_element = Element::Programme;
                self.channel_key = attribute(e, b"channel").unwrap_or_default();
                self.start = attribute(e, b"start").and_then(|s| parse_xmltv_datetime(&s));
                self.stop = attribute(e, b"stop").and_then(|s| parse_xmltv_datetime(&s));
                self.title.clear();
            }
            b"title" if self.current_element == Element::Programme => {
                self.current_element = if self.title.trim().is_empty() {
                    Element::Title
                } else {
                    Element::ExtraTitle
                };
            }
            _ => {}
        }
    }

    fn character_data(&mut self, text: &str) {
        if self.current_element == Element::Title {
            self.title.push_str(text);
        }
    }

    /// Returns a finished program when a well-formed `</programme>` closes
    fn element_end(&mut self, name: &[u8]) -> Option<Program> {
        match name {
            b"title" if matches!(self.current_element, Element::Title | Element::ExtraTitle) => {
                self.current_element = Element::Programme;
                None
            }
            b"programme" if self.current_element != Element::Outside => {
                let program = self.finish();
                self.reset();
                program
            }
            _ => None,
        }
    }

    fn finish(&mut self) -> Option<Program> {
        let title = self.title.trim();
        if self.channel_key.is_empty() || title.is_empty() {
            return None;
        }
        let (start, stop) = (self.start?, self.stop?);
        Some(Program {
            channel_key: std::mem::take(&mut self.channel_key),
            title: title.to_string(),
            start,
            stop,
        })
    }

    fn reset(&mut self) {
        self.current_element = Element::Outside;
        self.channel_key.clear();
        self.title.clear();
        self.start = None;
        self.stop = None;
    }
}

/// Byte-count progress, clamped and never decreasing
struct ProgressMeter<'a> {
    total: u64,
    last: f64,
    report: &'a dyn Fn(f64),
}

impl<'a> ProgressMeter<'a> {
    fn new(total: u64, report: &'a dyn Fn(f64)) -> Self {
        Self {
            total: total.max(1),
            last: 0.0,
            report,
        }
    }

    fn update(&mut self, bytes_read: u64) {
        let fraction = (bytes_read as f64 / self.total as f64).min(MAX_PARTIAL_PROGRESS);
        if fraction > self.last {
            self.last = fraction;
            (self.report)(fraction);
        }
    }
}

/// Parse an XMLTV document held in memory.
///
/// `expected_len` is the size the server announced; when absent the actual
/// length is used. Progress is reported per character-data event and stays
/// at or below [`MAX_PARTIAL_PROGRESS`]; reporting 1.0 is the caller's job
/// once it has taken ownership of the table.
///
/// Malformed `<programme>` entries are skipped. An XML syntax error, or a
/// document without a `<tv>` root, rejects the whole document.
pub fn parse_document(
    bytes: &[u8],
    expected_len: Option<u64>,
    progress: &dyn Fn(f64),
) -> Result<ScheduleTable, GuideError> {
    let total = expected_len
        .filter(|len| *len > 0)
        .unwrap_or(bytes.len() as u64);

    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::with_capacity(8192);
    let mut meter = ProgressMeter::new(total, progress);
    let mut state = ProgrammeState::default();
    let mut table = ScheduleTable::new();
    let mut saw_root = false;
    let mut skipped = 0usize;

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                saw_root |= e.name().as_ref() == b"tv";
                state.element_start(e);
            }
            Ok(Event::Empty(ref e)) => {
                saw_root |= e.name().as_ref() == b"tv";
                state.element_start(e);
                if let Some(program) = state.element_end(e.name().as_ref()) {
                    table.push(program);
                } else if e.name().as_ref() == b"programme" {
                    skipped += 1;
                }
            }
            Ok(Event::End(ref e)) => {
                let closing_programme = e.name().as_ref() == b"programme";
                match state.element_end(e.name().as_ref()) {
                    Some(program) => table.push(program),
                    None if closing_programme => skipped += 1,
                    None => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                state.character_data(&String::from_utf8_lossy(e));
                meter.update(reader.buffer_position() as u64);
            }
            Ok(Event::CData(ref e)) => {
                state.character_data(&String::from_utf8_lossy(e));
                meter.update(reader.buffer_position() as u64);
            }
            Ok(Event::GeneralRef(ref e)) => {
                if let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e)) {
                    state.character_data(resolved.encode_utf8(&mut [0u8; 4]));
                }
                meter.update(reader.buffer_position() as u64);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(GuideError::Parse {
                    position,
                    message: e.to_string(),
                })
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(GuideError::Parse {
            position: 0,
            message: "document has no <tv> root element".to_string(),
        });
    }

    debug!(
        programs = table.program_count(),
        channels = table.channel_count(),
        skipped,
        "XMLTV scan finished"
    );
    Ok(table)
}

/// Get an attribute value with entities decoded
fn attribute(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name)
        .map(|attr| {
            let raw = String::from_utf8_lossy(&attr.value).into_owned();
            match quick_xml::escape::unescape(&raw) {
                Ok(Cow::Owned(decoded)) => decoded,
                _ => raw,
            }
        })
}

/// Resolve `&name;` / `&#NN;` / `&#xHH;` references delivered as separate events
fn resolve_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}
