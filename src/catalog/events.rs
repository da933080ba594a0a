use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{AuditError, Result};

/// Attributes of an element being entered, looked up lazily by local name.
pub(crate) struct ElementAttrs<'a> {
    start: &'a BytesStart<'a>,
}

impl<'a> ElementAttrs<'a> {
    pub(crate) fn get(&self, key: &str) -> std::result::Result<Option<String>, quick_xml::Error> {
        for attr in self.start.attributes() {
            let attr = attr?;
            if attr.key.local_name().as_ref() == key.as_bytes() {
                return Ok(Some(attr.unescape_value()?.into_owned()));
            }
        }
        Ok(None)
    }

    /// Like [`get`](Self::get) but treats an empty value as absent.
    pub(crate) fn get_non_empty(
        &self,
        key: &str,
    ) -> std::result::Result<Option<String>, quick_xml::Error> {
        Ok(self.get(key)?.filter(|v| !v.is_empty()))
    }
}

/// Element-level events with namespace prefixes removed.
///
/// `depth` counts open elements including the one being entered or left, so
/// the document root sits at depth 1.
pub(crate) enum XmlEvent<'a> {
    Open {
        name: &'a str,
        depth: usize,
        attrs: ElementAttrs<'a>,
    },
    Text(&'a str),
    Close {
        name: &'a str,
        depth: usize,
    },
}

pub(crate) trait XmlHandler {
    fn on_event(&mut self, event: XmlEvent<'_>) -> std::result::Result<(), quick_xml::Error>;
}

/// How a [`drive`] call ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DriveOutcome {
    /// The whole document was read and is well formed.
    Finished,
    /// `stop` was raised; the rest of the document was not read.
    Stopped,
}

/// Pull events from `input` and feed them to `handler` until the document
/// ends or `stop` is raised.
///
/// Memory use is bounded by the largest single element, not the document.
pub(crate) fn drive<R: BufRead, H: XmlHandler>(
    input: R,
    document: &str,
    handler: &mut H,
    stop: &AtomicBool,
) -> Result<DriveOutcome> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::with_capacity(8 * 1024);
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        if stop.load(Ordering::Relaxed) {
            return Ok(DriveOutcome::Stopped);
        }
        let outcome = match reader.read_event_into(&mut buf) {
            Err(e) => Err(e),
            Ok(Event::Start(ref start)) => {
                depth += 1;
                saw_root = true;
                let name = local_name(start, document)?;
                handler.on_event(XmlEvent::Open {
                    name: &name,
                    depth,
                    attrs: ElementAttrs { start },
                })
            }
            Ok(Event::Empty(ref start)) => {
                saw_root = true;
                let name = local_name(start, document)?;
                handler
                    .on_event(XmlEvent::Open {
                        name: &name,
                        depth: depth + 1,
                        attrs: ElementAttrs { start },
                    })
                    .and_then(|_| {
                        handler.on_event(XmlEvent::Close {
                            name: &name,
                            depth: depth + 1,
                        })
                    })
            }
            Ok(Event::End(ref end)) => {
                let name = String::from_utf8_lossy(end.local_name().as_ref()).into_owned();
                let outcome = handler.on_event(XmlEvent::Close { name: &name, depth });
                depth = depth.saturating_sub(1);
                outcome
            }
            Ok(Event::Text(ref text)) => match text.unescape() {
                Ok(text) => handler.on_event(XmlEvent::Text(&text)),
                Err(e) => Err(e),
            },
            Ok(Event::CData(ref data)) => {
                let text = String::from_utf8_lossy(data.as_ref()).into_owned();
                handler.on_event(XmlEvent::Text(&text))
            }
            Ok(Event::Eof) => break,
            Ok(_) => Ok(()),
        };

        if let Err(e) = outcome {
            return Err(parse_error(document, &reader, e));
        }
        buf.clear();
    }

    if !saw_root {
        return Err(AuditError::parse(document, "document has no root element"));
    }
    if depth != 0 {
        return Err(AuditError::parse(
            document,
            format!("unexpected end of document ({depth} unclosed element(s))"),
        ));
    }
    Ok(DriveOutcome::Finished)
}

fn local_name(start: &BytesStart<'_>, document: &str) -> Result<String> {
    std::str::from_utf8(start.local_name().as_ref())
        .map(str::to_owned)
        .map_err(|e| AuditError::parse(document, format!("element name is not UTF-8: {e}")))
}

fn parse_error<R>(document: &str, reader: &Reader<R>, err: quick_xml::Error) -> AuditError {
    AuditError::parse(
        document,
        format!("{err} (near byte {})", reader.buffer_position()),
    )
}
