//! XML codec for the notebook file.
//!
//! The document is a single root element holding `<memo>` records, each with
//! `<name>`, `<date>`, `<content>` and `<tags>` children:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <memos>
//!     <memo>
//!         <name>Shopping</name>
//!         <date>2024/01/01</date>
//!         <content>Buy milk</content>
//!         <tags>errands,home</tags>
//!     </memo>
//! </memos>
//! ```
//!
//! Both directions are pure: no file system access happens here.

use crate::error::{MemoError, Result};
use crate::types::{Memo, MemoDate};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

const ROOT: &str = "memos";
const RECORD: &str = "memo";
const INDENT: usize = 4;

/// Values used for fields a record leaves out.
#[derive(Debug, Clone)]
pub struct RecordDefaults {
    pub title: String,
    pub date: MemoDate,
}

// =============================================================================
// Serialization
// =============================================================================

/// Serialize memos, in the given order, to an indented XML document.
pub fn write_document<'a>(memos: impl IntoIterator<Item = &'a Memo>) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emit(&mut writer, Event::Start(BytesStart::new(ROOT)))?;
    for memo in memos {
        emit(&mut writer, Event::Start(BytesStart::new(RECORD)))?;
        write_field(&mut writer, "name", memo.title())?;
        write_field(&mut writer, "date", memo.date().as_str())?;
        write_field(&mut writer, "content", memo.content())?;
        write_field(&mut writer, "tags", &memo.joined_tags(","))?;
        emit(&mut writer, Event::End(BytesEnd::new(RECORD)))?;
    }
    emit(&mut writer, Event::End(BytesEnd::new(ROOT)))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(MemoError::serialize)
}

fn write_field(writer: &mut Writer<Vec<u8>>, name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return emit(writer, Event::Empty(BytesStart::new(name)));
    }
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(value)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(MemoError::serialize)
}

// =============================================================================
// Parsing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Date,
    Content,
    Tags,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"name" => Some(Self::Name),
            b"date" => Some(Self::Date),
            b"content" => Some(Self::Content),
            b"tags" => Some(Self::Tags),
            _ => None,
        }
    }
}

/// Raw field values of one `<memo>` element. `None` means the field was absent.
#[derive(Debug, Default)]
struct RawRecord {
    name: Option<String>,
    date: Option<String>,
    content: Option<String>,
    tags: Option<String>,
}

impl RawRecord {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::Date => &mut self.date,
            Field::Content => &mut self.content,
            Field::Tags => &mut self.tags,
        }
    }

    /// Store a field value unless an earlier occurrence already set it.
    fn fill(&mut self, field: Field, value: String) {
        let slot = self.slot(field);
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    fn into_memo(self, defaults: &RecordDefaults) -> Result<Memo> {
        let title = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => defaults.title.clone(),
        };
        let date = match self.date {
            Some(date) if !date.is_empty() => MemoDate::parse(&date).map_err(|_| {
                MemoError::MalformedDocument(format!("invalid date `{}` in record", date))
            })?,
            _ => defaults.date.clone(),
        };
        let tags: Vec<String> = self
            .tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::to_string)
            .collect();

        Ok(Memo::new(title, date, self.content.unwrap_or_default(), tags))
    }
}

/// Where the parser currently is relative to the record structure.
struct Cursor {
    /// Open element names, outermost first
    path: Vec<Vec<u8>>,
    seen_root: bool,
    record: Option<RawRecord>,
    field: Option<(Field, String)>,
}

impl Cursor {
    /// Depth at which `<memo>` records live (inside the root)
    const RECORD_DEPTH: usize = 1;
    /// Depth at which record fields live
    const FIELD_DEPTH: usize = 2;

    fn open(&mut self, tag: &[u8]) -> Result<()> {
        if self.path.is_empty() {
            if self.seen_root {
                return Err(MemoError::malformed("more than one root element"));
            }
            self.seen_root = true;
        } else if self.path.len() == Self::RECORD_DEPTH && tag == RECORD.as_bytes() {
            self.record = Some(RawRecord::default());
        } else if self.path.len() == Self::FIELD_DEPTH && self.record.is_some() {
            self.field = Field::from_tag(tag).map(|f| (f, String::new()));
        }
        self.path.push(tag.to_vec());
        Ok(())
    }

    fn close(&mut self, tag: &[u8], records: &mut Vec<RawRecord>) -> Result<()> {
        match self.path.pop() {
            Some(open) if open == tag => {}
            Some(open) => {
                return Err(MemoError::MalformedDocument(format!(
                    "expected </{}>, found </{}>",
                    String::from_utf8_lossy(&open),
                    String::from_utf8_lossy(tag)
                )))
            }
            None => {
                return Err(MemoError::MalformedDocument(format!(
                    "unexpected </{}>",
                    String::from_utf8_lossy(tag)
                )))
            }
        }

        if self.path.len() == Self::FIELD_DEPTH {
            if let (Some(record), Some((field, value))) = (self.record.as_mut(), self.field.take()) {
                record.fill(field, value);
            }
        } else if self.path.len() == Self::RECORD_DEPTH && tag == RECORD.as_bytes() {
            if let Some(record) = self.record.take() {
                records.push(record);
            }
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        if self.path.is_empty() && !text.trim().is_empty() {
            return Err(MemoError::malformed("text outside the root element"));
        }
        if self.path.len() == Self::FIELD_DEPTH + 1 {
            if let Some((_, value)) = self.field.as_mut() {
                value.push_str(text);
            }
        }
        Ok(())
    }
}

/// Parse a notebook document into memos, in document order.
///
/// Any root element name is accepted. Elements other than `<memo>` records
/// and their four fields are skipped.
pub fn parse_document(text: &str, defaults: &RecordDefaults) -> Result<Vec<Memo>> {
    let mut reader = Reader::from_str(text);
    let mut cursor = Cursor {
        path: Vec::new(),
        seen_root: false,
        record: None,
        field: None,
    };
    let mut records = Vec::new();

    loop {
        match reader.read_event().map_err(MemoError::malformed)? {
            Event::Start(e) => cursor.open(e.name().as_ref())?,
            Event::End(e) => cursor.close(e.name().as_ref(), &mut records)?,
            Event::Empty(e) => {
                let tag = e.name().as_ref().to_vec();
                cursor.open(&tag)?;
                cursor.close(&tag, &mut records)?;
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(MemoError::malformed)?;
                cursor.text(&text)?;
            }
            Event::CData(e) => {
                let bytes = e.into_inner();
                let text = std::str::from_utf8(&bytes).map_err(MemoError::malformed)?;
                cursor.text(text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !cursor.seen_root {
        return Err(MemoError::malformed("no root element"));
    }
    if let Some(open) = cursor.path.last() {
        return Err(MemoError::MalformedDocument(format!(
            "unclosed element <{}>",
            String::from_utf8_lossy(open)
        )));
    }

    records
        .into_iter()
        .map(|record| record.into_memo(defaults))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> RecordDefaults {
        RecordDefaults {
            title: "untitled".to_string(),
            date: MemoDate::parse("2030/06/15").unwrap(),
        }
    }

    fn memo(title: &str, date: &str, content: &str, tags: &[&str]) -> Memo {
        Memo::new(
            title,
            MemoDate::parse(date).unwrap(),
            content,
            tags.iter().map(|t| t.to_string()),
        )
    }

    #[test]
    fn writes_indented_document() {
        let memos = vec![memo("First", "2024/01/01", "Alpha", &["b", "a"])];
        let xml = write_document(&memos).unwrap();
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                        <memos>\n\
                        \x20   <memo>\n\
                        \x20       <name>First</name>\n\
                        \x20       <date>2024/01/01</date>\n\
                        \x20       <content>Alpha</content>\n\
                        \x20       <tags>a,b</tags>\n\
                        \x20   </memo>\n\
                        </memos>\n";
        assert_eq!(xml, expected);
    }

    #[test]
    fn empty_fields_are_self_closing() {
        let memos = vec![memo("Bare", "2024/01/01", "", &[])];
        let xml = write_document(&memos).unwrap();
        assert!(xml.contains("<content/>"));
        assert!(xml.contains("<tags/>"));
    }

    #[test]
    fn escapes_and_preserves_markup_characters() {
        let memos = vec![memo("a < b & c", "2024/01/01", "line one\n  <line two>\n", &["x&y"])];
        let xml = write_document(&memos).unwrap();
        assert!(!xml.contains("<line two>"));

        let parsed = parse_document(&xml, &defaults()).unwrap();
        assert_eq!(parsed, memos);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let xml = "<memos><memo><content>only content</content></memo><memo/></memos>";
        let parsed = parse_document(xml, &defaults()).unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].title(), "untitled");
        assert_eq!(parsed[0].date().as_str(), "2030/06/15");
        assert_eq!(parsed[0].content(), "only content");
        assert!(parsed[0].tags().is_empty());
        assert_eq!(parsed[1].content(), "");
    }

    #[test]
    fn empty_name_and_date_count_as_absent() {
        let xml = "<memos><memo><name></name><date/><content/><tags/></memo></memos>";
        let parsed = parse_document(xml, &defaults()).unwrap();
        assert_eq!(parsed[0].title(), "untitled");
        assert_eq!(parsed[0].date().as_str(), "2030/06/15");
    }

    #[test]
    fn tags_split_on_comma_dropping_empty_tokens() {
        let xml = "<memos><memo><tags>,work,,home,</tags></memo></memos>";
        let parsed = parse_document(xml, &defaults()).unwrap();
        let tags: Vec<&str> = parsed[0].tags().iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["home", "work"]);
    }

    #[test]
    fn accepts_any_root_and_skips_unknown_elements() {
        let xml = r#"<?xml version="1.0" ?>
<notebook>
    <meta><memo><name>nested, ignored</name></memo></meta>
    <memo>
        <extra>ignored</extra>
        <name>Kept</name>
        <name>second name ignored</name>
        <content><![CDATA[<raw>]]> text</content>
    </memo>
</notebook>"#;
        let parsed = parse_document(xml, &defaults()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].title(), "Kept");
        assert_eq!(parsed[0].content(), "<raw> text");
    }

    #[test]
    fn rejects_malformed_documents() {
        for xml in [
            "",
            "   ",
            "<memos><memo></memos>",
            "<memos><memo>",
            "<memos></memos><memos></memos>",
            "stray<memos></memos>",
            "<memos><memo><date>15.06.2030</date></memo></memos>",
        ] {
            let err = parse_document(xml, &defaults()).unwrap_err();
            assert!(
                matches!(err, MemoError::MalformedDocument(_)),
                "expected malformed for {:?}, got {:?}",
                xml,
                err
            );
        }
    }

    #[test]
    fn empty_root_yields_no_memos() {
        assert!(parse_document("<memos/>", &defaults()).unwrap().is_empty());
        assert!(parse_document("<memos>\n</memos>", &defaults()).unwrap().is_empty());
    }
}
