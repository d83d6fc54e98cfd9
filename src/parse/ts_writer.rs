use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::io::Write;
use std::path::Path;

use super::translation::{Catalog, Message};
use super::ts_parser::LENGTH_VARIANT_SEPARATOR;
use crate::error::{Result, TsError};

/// Serializer producing the same layout lupdate writes
pub struct TsWriter<W: Write> {
    inner: Writer<W>,
}

impl TsWriter<Vec<u8>> {
    /// Serialize a catalog into a string
    pub fn to_string(catalog: &Catalog) -> Result<String> {
        let mut writer = TsWriter::new(Vec::new());
        writer.write_catalog(catalog)?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| TsError::Write(format!("output is not UTF-8: {}", e)))
    }

    /// Serialize a catalog into `path`, replacing its content
    pub fn write_file(catalog: &Catalog, path: &Path) -> Result<()> {
        let content = Self::to_string(catalog)?;
        fs::write(path, content)?;
        Ok(())
    }
}

impl<W: Write> TsWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            inner: Writer::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }

    pub fn write_catalog(&mut self, catalog: &Catalog) -> Result<()> {
        self.event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        self.newline()?;
        self.event(Event::DocType(BytesText::from_escaped("TS")))?;
        self.newline()?;

        let mut root = BytesStart::new("TS");
        if !catalog.version.is_empty() {
            root.push_attribute(("version", catalog.version.as_str()));
        }
        if let Some(language) = &catalog.language {
            root.push_attribute(("language", language.as_str()));
        }
        if let Some(source_language) = &catalog.source_language {
            root.push_attribute(("sourcelanguage", source_language.as_str()));
        }
        self.event(Event::Start(root))?;
        self.newline()?;

        for context in &catalog.contexts {
            self.event(Event::Start(BytesStart::new("context")))?;
            self.newline()?;
            self.text_element(1, BytesStart::new("name"), &context.name)?;
            for message in &context.messages {
                self.write_message(message)?;
            }
            self.event(Event::End(BytesEnd::new("context")))?;
            self.newline()?;
        }

        self.event(Event::End(BytesEnd::new("TS")))?;
        self.newline()
    }

    fn write_message(&mut self, message: &Message) -> Result<()> {
        let mut start = BytesStart::new("message");
        if let Some(id) = &message.id {
            start.push_attribute(("id", id.as_str()));
        }
        if message.numerus {
            start.push_attribute(("numerus", "yes"));
        }
        self.indent(1)?;
        self.event(Event::Start(start))?;
        self.newline()?;

        for location in &message.locations {
            let mut tag = BytesStart::new("location");
            tag.push_attribute(("filename", location.filename.as_str()));
            if let Some(line) = location.line {
                tag.push_attribute(("line", line.to_string().as_str()));
            }
            self.indent(2)?;
            self.event(Event::Empty(tag))?;
            self.newline()?;
        }

        self.text_element(2, BytesStart::new("source"), &message.source)?;
        self.optional_element(2, "oldsource", message.old_source.as_deref())?;
        self.optional_element(2, "comment", message.comment.as_deref())?;
        self.optional_element(2, "oldcomment", message.old_comment.as_deref())?;
        self.optional_element(2, "extracomment", message.extra_comment.as_deref())?;
        self.optional_element(
            2,
            "translatorcomment",
            message.translator_comment.as_deref(),
        )?;
        self.write_translation(message)?;
        self.optional_element(2, "userdata", message.userdata.as_deref())?;

        self.indent(1)?;
        self.event(Event::End(BytesEnd::new("message")))?;
        self.newline()
    }

    fn write_translation(&mut self, message: &Message) -> Result<()> {
        let mut start = BytesStart::new("translation");
        if let Some(kind) = message.status.type_attr() {
            start.push_attribute(("type", kind));
        }

        if message.numerus {
            self.indent(2)?;
            self.event(Event::Start(start))?;
            if !message.numerus_forms.is_empty() {
                self.newline()?;
                for form in &message.numerus_forms {
                    self.text_element(3, BytesStart::new("numerusform"), form)?;
                }
                self.indent(2)?;
            }
            self.event(Event::End(BytesEnd::new("translation")))?;
            return self.newline();
        }

        if message.translation.contains(LENGTH_VARIANT_SEPARATOR) {
            start.push_attribute(("variants", "yes"));
            self.indent(2)?;
            self.event(Event::Start(start))?;
            self.newline()?;
            for variant in message.translation.split(LENGTH_VARIANT_SEPARATOR) {
                self.text_element(3, BytesStart::new("lengthvariant"), variant)?;
            }
            self.indent(2)?;
            self.event(Event::End(BytesEnd::new("translation")))?;
            return self.newline();
        }

        self.text_element(2, start, &message.translation)
    }

    fn optional_element(&mut self, depth: usize, name: &str, text: Option<&str>) -> Result<()> {
        match text {
            Some(text) => self.text_element(depth, BytesStart::new(name), text),
            None => Ok(()),
        }
    }

    /// Write `<tag>text</tag>` on its own line
    fn text_element(&mut self, depth: usize, start: BytesStart<'_>, text: &str) -> Result<()> {
        let end = start.to_end().into_owned();
        self.indent(depth)?;
        self.event(Event::Start(start))?;
        if !text.is_empty() {
            self.event(Event::Text(BytesText::from_escaped(protect(text))))?;
        }
        self.event(Event::End(end))?;
        self.newline()
    }

    fn indent(&mut self, depth: usize) -> Result<()> {
        if depth == 0 {
            return Ok(());
        }
        self.event(Event::Text(BytesText::from_escaped(" ".repeat(depth * 4))))
    }

    fn newline(&mut self) -> Result<()> {
        self.event(Event::Text(BytesText::from_escaped("\n")))
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.inner
            .write_event(event)
            .map_err(|e| TsError::Write(e.to_string()))
    }
}

/// Escape text content the way lupdate does: markup characters become
/// entities and control characters become `<byte value="xN"/>` elements.
pub fn protect(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push('\n'),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("<byte value=\"x{:x}\"/>", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}
