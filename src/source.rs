//! Streaming record source.
//!
//! Scans a byte stream of concatenated, namespace-qualified XML for compound
//! record elements (`tmk:TrademarkBag`) and materializes exactly one record
//! subtree at a time. The subtree is dropped by the consumer once its rows are
//! emitted, so peak retained memory is bounded by record size, not file size.
//! The input may be a naive string-level concatenation of well-formed
//! fragments; everything between record elements is skipped without being
//! retained.

use crate::error::SourceError;
use crate::ns;
use crate::tree::{Attribute, Element, Node};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Pull-based iterator over compound record subtrees.
pub struct RecordSource<R: BufRead> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    records_read: u64,
    done: bool,
}

impl RecordSource<BufReader<File>> {
    /// Open an XML collection file with a large read buffer.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::with_capacity(1024 * 1024, file)))
    }
}

impl<R: BufRead> RecordSource<R> {
    pub fn from_reader(reader: R) -> Self {
        RecordSource {
            reader: NsReader::from_reader(reader),
            buf: Vec::with_capacity(8192),
            records_read: 0,
            done: false,
        }
    }

    /// Number of compound records yielded so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    fn next_record(&mut self) -> Result<Option<Element>, SourceError> {
        loop {
            self.buf.clear();
            let (resolve, event) = self.reader.read_resolved_event_into(&mut self.buf)?;
            let elem_ns = owned_ns(resolve);

            match event {
                Event::Start(ref e) => {
                    if is_record(elem_ns.as_deref(), e) {
                        let root = element_from_start(&self.reader, e, elem_ns)?;
                        let record = self.read_subtree(root)?;
                        self.records_read += 1;
                        return Ok(Some(record));
                    }
                }
                Event::Empty(ref e) => {
                    if is_record(elem_ns.as_deref(), e) {
                        let record = element_from_start(&self.reader, e, elem_ns)?;
                        self.records_read += 1;
                        return Ok(Some(record));
                    }
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Consume events until the record's matching end tag, building the
    /// subtree depth-first.
    fn read_subtree(&mut self, root: Element) -> Result<Element, SourceError> {
        let mut stack: Vec<Element> = vec![root];

        loop {
            self.buf.clear();
            let (resolve, event) = self.reader.read_resolved_event_into(&mut self.buf)?;
            let elem_ns = owned_ns(resolve);

            match event {
                Event::Start(ref e) => {
                    let el = element_from_start(&self.reader, e, elem_ns)?;
                    stack.push(el);
                }
                Event::Empty(ref e) => {
                    let el = element_from_start(&self.reader, e, elem_ns)?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::Element(el));
                    }
                }
                Event::Text(ref e) => {
                    let text = e.unescape()?;
                    if !text.trim().is_empty() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(Node::Text(text.into_owned()));
                        }
                    }
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    if !text.trim().is_empty() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(Node::Text(text));
                        }
                    }
                }
                Event::End(_) => {
                    let Some(finished) = stack.pop() else {
                        return Err(SourceError::TruncatedRecord);
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Element(finished)),
                        None => return Ok(finished),
                    }
                }
                Event::Eof => return Err(SourceError::TruncatedRecord),
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordSource<R> {
    type Item = Result<Element, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn is_record(elem_ns: Option<&str>, e: &BytesStart) -> bool {
    elem_ns == Some(ns::RECORD_NS) && e.local_name().as_ref() == ns::RECORD_LOCAL.as_bytes()
}

fn owned_ns(resolve: ResolveResult<'_>) -> Option<String> {
    match resolve {
        ResolveResult::Bound(namespace) => {
            Some(String::from_utf8_lossy(namespace.as_ref()).into_owned())
        }
        _ => None,
    }
}

fn element_from_start<R: BufRead>(
    reader: &NsReader<R>,
    e: &BytesStart,
    elem_ns: Option<String>,
) -> Result<Element, SourceError> {
    let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let mut element = Element::new(elem_ns, local);

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        let (resolve, local_name) = reader.resolve_attribute(attr.key);
        let attr_ns = owned_ns(resolve);
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push(Attribute {
            ns: attr_ns,
            local: String::from_utf8_lossy(local_name.as_ref()).into_owned(),
            value,
        });
    }

    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_RECORDS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tmk:TrademarkBag xmlns:tmk="http://www.wipo.int/standards/XMLSchema/ST96/Trademark"
                  xmlns:com="http://www.wipo.int/standards/XMLSchema/ST96/Common">
  <tmk:Trademark>
    <com:ApplicationNumber>
      <com:ST13ApplicationNumber>CA5000012340101</com:ST13ApplicationNumber>
    </com:ApplicationNumber>
  </tmk:Trademark>
</tmk:TrademarkBag>
<tmk:TrademarkBag xmlns:tmk="http://www.wipo.int/standards/XMLSchema/ST96/Trademark"
                  xmlns:com="http://www.wipo.int/standards/XMLSchema/ST96/Common">
  <tmk:Trademark>
    <com:ApplicationNumber>
      <com:ST13ApplicationNumber>CA5000056780102</com:ST13ApplicationNumber>
    </com:ApplicationNumber>
  </tmk:Trademark>
</tmk:TrademarkBag>
"#;

    #[test]
    fn yields_each_concatenated_record() {
        let source = RecordSource::from_reader(Cursor::new(TWO_RECORDS.as_bytes()));
        let records: Vec<_> = source.map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_named(ns::TMK, "TrademarkBag"));
    }

    #[test]
    fn resolves_namespaces_and_text() {
        let mut source = RecordSource::from_reader(Cursor::new(TWO_RECORDS.as_bytes()));
        let record = source.next().unwrap().unwrap();
        let st13 = record
            .descendants()
            .find(|e| e.is_named(ns::COM, "ST13ApplicationNumber"))
            .unwrap();
        let text: Vec<&str> = st13.text_nodes().collect();
        assert_eq!(text, vec!["CA5000012340101"]);
    }

    #[test]
    fn resolves_qualified_attributes() {
        let xml = r#"<tmk:TrademarkBag
              xmlns:tmk="http://www.wipo.int/standards/XMLSchema/ST96/Trademark"
              xmlns:com="http://www.wipo.int/standards/XMLSchema/ST96/Common">
            <tmk:GoodsServicesDescriptionText com:sequenceNumber="3">shoes</tmk:GoodsServicesDescriptionText>
        </tmk:TrademarkBag>"#;
        let mut source = RecordSource::from_reader(Cursor::new(xml.as_bytes()));
        let record = source.next().unwrap().unwrap();
        let goods = record
            .descendants()
            .find(|e| e.is_named(ns::TMK, "GoodsServicesDescriptionText"))
            .unwrap();
        assert_eq!(goods.attribute(Some(ns::COM), "sequenceNumber"), Some("3"));
    }

    #[test]
    fn truncated_record_is_an_error() {
        let xml = r#"<tmk:TrademarkBag xmlns:tmk="http://www.wipo.int/standards/XMLSchema/ST96/Trademark"><tmk:Trademark>"#;
        let mut source = RecordSource::from_reader(Cursor::new(xml.as_bytes()));
        assert!(source.next().unwrap().is_err());
    }

    #[test]
    fn skips_bytes_between_records() {
        let xml = r#"<wrapper><noise>x</noise><tmk:TrademarkBag xmlns:tmk="http://www.wipo.int/standards/XMLSchema/ST96/Trademark"/></wrapper>"#;
        let mut source = RecordSource::from_reader(Cursor::new(xml.as_bytes()));
        let record = source.next().unwrap().unwrap();
        assert!(record.children.is_empty());
        assert!(source.next().is_none());
    }
}
