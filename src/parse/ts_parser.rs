use hashbrown::HashMap;
use log::debug;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

use super::translation::{Catalog, Context, Location, Message, TranslationStatus};
use crate::error::{Result, TsError};

/// Parser for Qt Linguist translation source (`.ts`) files
pub struct TsParser;

impl TsParser {
    pub fn parse_file(path: &Path) -> Result<Catalog> {
        let content = fs::read_to_string(path)?;
        Self::parse_named(&content, path)
    }

    pub fn parse_str(content: &str) -> Result<Catalog> {
        Self::parse_named(content, Path::new("<memory>"))
    }

    /// Parse `content`, reporting errors against `file`
    pub fn parse_named(content: &str, file: &Path) -> Result<Catalog> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut reader = Reader::from_str(content);
        let mut builder = CatalogBuilder::new(file, content);

        loop {
            let event = reader.read_event().map_err(|e| {
                TsError::xml(file, reader.error_position() as u64, e.to_string())
            })?;
            let position = reader.buffer_position() as usize;

            match event {
                Event::Start(e) => {
                    if !builder.open(&e, position)? {
                        debug!(
                            "{}: skipping <{}>",
                            file.display(),
                            String::from_utf8_lossy(e.name().as_ref())
                        );
                        reader.read_to_end(e.name()).map_err(|err| {
                            TsError::xml(file, reader.error_position() as u64, err.to_string())
                        })?;
                    }
                }
                Event::Empty(e) => {
                    if builder.open(&e, position)? {
                        builder.close(e.name().as_ref())?;
                    }
                }
                Event::End(e) => builder.close(e.name().as_ref())?,
                Event::Text(e) => builder.text(&e)?,
                Event::CData(e) => builder.push_raw(&String::from_utf8_lossy(&e)),
                Event::DocType(e) => {
                    let doctype = String::from_utf8_lossy(&e).trim().to_string();
                    if doctype.split_whitespace().next() != Some("TS") {
                        return Err(TsError::format(
                            file,
                            format!("unexpected DOCTYPE '{}'", doctype),
                        ));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let catalog = builder.finish(reader.buffer_position() as u64)?;
        debug!(
            "{}: {} contexts, {} messages",
            file.display(),
            catalog.contexts.len(),
            catalog.message_count()
        );
        Ok(catalog)
    }
}

/// Element whose character data is being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ContextName,
    Source,
    Comment,
    OldSource,
    OldComment,
    ExtraComment,
    TranslatorComment,
    Userdata,
    Translation,
    NumerusForm,
    LengthVariant,
}

/// Qt joins length variants of one translation with this character
pub(crate) const LENGTH_VARIANT_SEPARATOR: &str = "\u{9c}";

struct CatalogBuilder<'a> {
    file: &'a Path,
    content: &'a str,
    catalog: Option<Catalog>,
    context: Option<Context>,
    message: Option<Message>,
    has_source: bool,
    field: Option<Field>,
    text: String,
    variants: Vec<String>,
    closed: bool,
    // Relative locations (`line="+3"`) are offsets from the last line seen in the same file
    last_file: String,
    last_lines: HashMap<String, u64>,
    line_offset: usize,
    line: usize,
}

impl<'a> CatalogBuilder<'a> {
    fn new(file: &'a Path, content: &'a str) -> Self {
        Self {
            file,
            content,
            catalog: None,
            context: None,
            message: None,
            has_source: false,
            field: None,
            text: String::new(),
            variants: Vec::new(),
            closed: false,
            last_file: String::new(),
            last_lines: HashMap::new(),
            line_offset: 0,
            line: 1,
        }
    }

    /// Handle an opening tag. Returns `false` for elements the caller should skip.
    fn open(&mut self, e: &BytesStart<'_>, position: usize) -> Result<bool> {
        let name = e.name();
        let name = name.as_ref();

        if self.catalog.is_none() {
            if name != b"TS" {
                return Err(TsError::format(
                    self.file,
                    format!(
                        "root element is <{}>, expected <TS>",
                        String::from_utf8_lossy(name)
                    ),
                ));
            }
            self.catalog = Some(Catalog {
                version: self.attr(e, "version")?.unwrap_or_default(),
                language: self.attr(e, "language")?,
                source_language: self.attr(e, "sourcelanguage")?,
                contexts: Vec::new(),
            });
            return Ok(true);
        }

        match name {
            b"context" if self.context.is_none() => {
                self.context = Some(Context::new(""));
            }
            b"name" if self.context.is_some() && self.message.is_none() => {
                self.start_field(Field::ContextName);
            }
            b"message" if self.context.is_some() && self.message.is_none() => {
                let line = self.line_at(position);
                self.message = Some(Message {
                    id: self.attr(e, "id")?,
                    numerus: self.attr(e, "numerus")?.as_deref() == Some("yes"),
                    file_line: line,
                    ..Default::default()
                });
                self.has_source = false;
            }
            b"location" if self.message.is_some() => self.location(e)?,
            b"source" if self.message.is_some() => self.start_field(Field::Source),
            b"comment" if self.message.is_some() => self.start_field(Field::Comment),
            b"oldsource" if self.message.is_some() => self.start_field(Field::OldSource),
            b"oldcomment" if self.message.is_some() => self.start_field(Field::OldComment),
            b"extracomment" if self.message.is_some() => self.start_field(Field::ExtraComment),
            b"translatorcomment" if self.message.is_some() => {
                self.start_field(Field::TranslatorComment)
            }
            b"userdata" if self.message.is_some() => self.start_field(Field::Userdata),
            b"translation" if self.message.is_some() => {
                let raw = self.attr(e, "type")?;
                let line = self.line_at(position);
                let status = TranslationStatus::from_type_attr(raw.as_deref()).ok_or_else(|| {
                    TsError::format(
                        self.file,
                        format!(
                            "unknown translation type '{}' on line {}",
                            raw.as_deref().unwrap_or_default(),
                            line
                        ),
                    )
                })?;
                if let Some(message) = self.message.as_mut() {
                    message.status = status;
                }
                self.variants.clear();
                self.start_field(Field::Translation);
            }
            b"numerusform" if self.field == Some(Field::Translation) => {
                if let Some(message) = self.message.as_mut() {
                    message.numerus = true;
                }
                self.start_field(Field::NumerusForm);
            }
            b"lengthvariant" if self.field == Some(Field::Translation) => {
                self.start_field(Field::LengthVariant);
            }
            b"byte" if self.field.is_some() => self.byte(e)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn close(&mut self, name: &[u8]) -> Result<()> {
        match name {
            b"name" if self.field == Some(Field::ContextName) => {
                let text = self.take_text();
                if let Some(context) = self.context.as_mut() {
                    context.name = text;
                }
            }
            b"source" if self.field == Some(Field::Source) => {
                let text = self.take_text();
                if let Some(message) = self.message.as_mut() {
                    message.source = text;
                }
                self.has_source = true;
            }
            b"comment" if self.field == Some(Field::Comment) => {
                let text = self.take_text();
                if let Some(message) = self.message.as_mut() {
                    message.comment = Some(text);
                }
            }
            b"oldsource" if self.field == Some(Field::OldSource) => {
                let text = self.take_text();
                if let Some(message) = self.message.as_mut() {
                    message.old_source = Some(text);
                }
            }
            b"oldcomment" if self.field == Some(Field::OldComment) => {
                let text = self.take_text();
                if let Some(message) = self.message.as_mut() {
                    message.old_comment = Some(text);
                }
            }
            b"extracomment" if self.field == Some(Field::ExtraComment) => {
                let text = self.take_text();
                if let Some(message) = self.message.as_mut() {
                    message.extra_comment = Some(text);
                }
            }
            b"translatorcomment" if self.field == Some(Field::TranslatorComment) => {
                let text = self.take_text();
                if let Some(message) = self.message.as_mut() {
                    message.translator_comment = Some(text);
                }
            }
            b"userdata" if self.field == Some(Field::Userdata) => {
                let text = self.take_text();
                if let Some(message) = self.message.as_mut() {
                    message.userdata = Some(text);
                }
            }
            b"numerusform" if self.field == Some(Field::NumerusForm) => {
                let text = self.take_text();
                if let Some(message) = self.message.as_mut() {
                    message.numerus_forms.push(text);
                }
                self.start_field(Field::Translation);
            }
            b"lengthvariant" if self.field == Some(Field::LengthVariant) => {
                let text = self.take_text();
                self.variants.push(text);
                self.start_field(Field::Translation);
            }
            b"translation" if self.field == Some(Field::Translation) => {
                let text = self.take_text();
                let variants = std::mem::take(&mut self.variants);
                if let Some(message) = self.message.as_mut() {
                    // Whitespace between <numerusform> elements is layout, not content
                    if message.numerus {
                        message.translation.clear();
                    } else if !variants.is_empty() {
                        message.translation = variants.join(LENGTH_VARIANT_SEPARATOR);
                    } else {
                        message.translation = text;
                    }
                }
            }
            b"message" => {
                if let Some(message) = self.message.take() {
                    if !self.has_source {
                        return Err(TsError::format(
                            self.file,
                            format!("<message> on line {} has no <source>", message.file_line),
                        ));
                    }
                    if let Some(context) = self.context.as_mut() {
                        context.messages.push(message);
                    }
                }
            }
            b"context" if self.message.is_none() => {
                if let (Some(context), Some(catalog)) = (self.context.take(), self.catalog.as_mut())
                {
                    catalog.contexts.push(context);
                }
            }
            b"TS" if self.context.is_none() => self.closed = true,
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, e: &BytesText<'_>) -> Result<()> {
        if self.field.is_none() {
            return Ok(());
        }
        let text = e.unescape().map_err(|err| {
            TsError::format(self.file, format!("bad entity near line {}: {}", self.line, err))
        })?;
        self.text.push_str(&text);
        Ok(())
    }

    fn push_raw(&mut self, text: &str) {
        if self.field.is_some() {
            self.text.push_str(text);
        }
    }

    fn finish(self, position: u64) -> Result<Catalog> {
        let Some(catalog) = self.catalog else {
            return Err(TsError::format(self.file, "missing <TS> root element"));
        };
        if self.message.is_some() || self.context.is_some() || !self.closed {
            return Err(TsError::xml(
                self.file,
                position,
                "unexpected end of file: unclosed <TS>, <context> or <message>",
            ));
        }
        Ok(catalog)
    }

    fn start_field(&mut self, field: Field) {
        self.field = Some(field);
        self.text.clear();
    }

    fn take_text(&mut self) -> String {
        self.field = None;
        std::mem::take(&mut self.text)
    }

    /// `<byte value="x9"/>` encodes a control character; hex with an `x` prefix, decimal otherwise
    fn byte(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let raw = self.attr(e, "value")?.unwrap_or_default();
        let code = match raw.strip_prefix('x').or_else(|| raw.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        let ch = code.and_then(char::from_u32).ok_or_else(|| {
            TsError::format(
                self.file,
                format!("invalid <byte value=\"{}\"/> near line {}", raw, self.line),
            )
        })?;
        self.text.push(ch);
        Ok(())
    }

    fn location(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let filename = match self.attr(e, "filename")? {
            Some(name) => {
                self.last_file = name.clone();
                name
            }
            None => self.last_file.clone(),
        };
        let line = match self.attr(e, "line")? {
            None => None,
            Some(raw) => {
                let previous = self.last_lines.get(&filename).copied();
                let value = resolve_line(&raw, previous).ok_or_else(|| {
                    TsError::format(
                        self.file,
                        format!("invalid location line '{}' near line {}", raw, self.line),
                    )
                })?;
                self.last_lines.insert(filename.clone(), value);
                Some(value)
            }
        };
        if let Some(message) = self.message.as_mut() {
            message.locations.push(Location::new(filename, line));
        }
        Ok(())
    }

    fn attr(&self, e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
        let attribute = e
            .try_get_attribute(name)
            .map_err(|err| TsError::xml(self.file, self.line_offset as u64, err.to_string()))?;
        match attribute {
            Some(a) => a
                .unescape_value()
                .map(|v| Some(v.into_owned()))
                .map_err(|err| {
                    TsError::format(
                        self.file,
                        format!("bad value for attribute '{}': {}", name, err),
                    )
                }),
            None => Ok(None),
        }
    }

    fn line_at(&mut self, position: usize) -> usize {
        let end = position.min(self.content.len());
        if end > self.line_offset {
            self.line += self.content.as_bytes()[self.line_offset..end]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.line_offset = end;
        }
        self.line
    }
}

/// Resolve an absolute (`"12"`) or relative (`"+3"`, `"-2"`) line number
fn resolve_line(raw: &str, previous: Option<u64>) -> Option<u64> {
    let raw = raw.trim();
    if raw.starts_with('+') || raw.starts_with('-') {
        let delta: i64 = raw.parse().ok()?;
        let base = i64::try_from(previous.unwrap_or(0)).ok()?;
        u64::try_from(base.checked_add(delta)?).ok()
    } else {
        raw.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::translation::SENTINEL_LINE;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="1.1" language="fr">
<context>
    <name>ApplicationWindow</name>
    <message>
        <location filename="../src/ApplicationWindow.cpp" line="120"/>
        <source>&amp;Next</source>
        <comment>next window</comment>
        <translation>&amp;Suivante</translation>
    </message>
    <message>
        <location filename="" line="2107488"/>
        <source>Col&lt;b&gt;1&lt;/b&gt;</source>
        <translation type="unfinished"></translation>
    </message>
    <message>
        <source>Tab<byte value="x9"/>separated</source>
        <translation type="obsolete">Tabulation<byte value="x9"/>séparée</translation>
    </message>
</context>
</TS>
"#;

    #[test]
    fn test_parse_header() {
        let catalog = TsParser::parse_str(SAMPLE).unwrap();
        assert_eq!(catalog.version, "1.1");
        assert_eq!(catalog.language.as_deref(), Some("fr"));
        assert_eq!(catalog.source_language, None);
        assert_eq!(catalog.contexts.len(), 1);
        assert_eq!(catalog.contexts[0].name, "ApplicationWindow");
    }

    #[test]
    fn test_parse_entities_and_comment() {
        let catalog = TsParser::parse_str(SAMPLE).unwrap();
        let msg = &catalog.contexts[0].messages[0];
        assert_eq!(msg.source, "&Next");
        assert_eq!(msg.comment.as_deref(), Some("next window"));
        assert_eq!(msg.translation, "&Suivante");
        assert_eq!(msg.status, TranslationStatus::Finished);
        assert_eq!(
            msg.locations,
            vec![Location::new("../src/ApplicationWindow.cpp", Some(120))]
        );
        assert_eq!(msg.file_line, 6);
    }

    #[test]
    fn test_parse_sentinel_and_markup() {
        let catalog = TsParser::parse_str(SAMPLE).unwrap();
        let msg = &catalog.contexts[0].messages[1];
        assert_eq!(msg.source, "Col<b>1</b>");
        assert_eq!(msg.status, TranslationStatus::Unfinished);
        assert!(msg.translation.is_empty());
        assert!(msg.locations[0].is_unlinked());
        assert_eq!(msg.locations[0].line, Some(SENTINEL_LINE));
    }

    #[test]
    fn test_parse_byte_elements() {
        let catalog = TsParser::parse_str(SAMPLE).unwrap();
        let msg = &catalog.contexts[0].messages[2];
        assert_eq!(msg.source, "Tab\tseparated");
        assert_eq!(msg.translation, "Tabulation\tséparée");
        assert_eq!(msg.status, TranslationStatus::Obsolete);
        assert!(msg.locations.is_empty());
    }

    #[test]
    fn test_parse_relative_locations() {
        let xml = r#"<TS version="2.1" language="de">
<context><name>Graph3D</name>
<message><location filename="../src/Graph3D.cpp" line="+40"/><source>a</source><translation>A</translation></message>
<message><location line="+10"/><location filename="../src/Graph3D.h" line="+3"/><source>b</source><translation>B</translation></message>
<message><location filename="../src/Graph3D.cpp" line="-5"/><source>c</source><translation>C</translation></message>
</context>
</TS>"#;
        let catalog = TsParser::parse_str(xml).unwrap();
        let msgs = &catalog.contexts[0].messages;
        assert_eq!(msgs[0].locations[0], Location::new("../src/Graph3D.cpp", Some(40)));
        assert_eq!(msgs[1].locations[0], Location::new("../src/Graph3D.cpp", Some(50)));
        assert_eq!(msgs[1].locations[1], Location::new("../src/Graph3D.h", Some(3)));
        assert_eq!(msgs[2].locations[0], Location::new("../src/Graph3D.cpp", Some(45)));
    }

    #[test]
    fn test_parse_numerus_message() {
        let xml = r#"<TS version="2.1" language="fr">
<context>
    <name>Matrix</name>
    <message numerus="yes">
        <source>%n row(s)</source>
        <translation>
            <numerusform>%n ligne</numerusform>
            <numerusform>%n lignes</numerusform>
        </translation>
    </message>
</context>
</TS>"#;
        let catalog = TsParser::parse_str(xml).unwrap();
        let msg = &catalog.contexts[0].messages[0];
        assert!(msg.numerus);
        assert_eq!(msg.numerus_forms, vec!["%n ligne", "%n lignes"]);
        assert!(msg.translation.is_empty());
    }

    #[test]
    fn test_parse_self_closing_translation() {
        let xml = r#"<TS version="2.1"><context><name>Fit</name>
<message><source>Fit</source><comment/><translation type="unfinished"/></message>
</context></TS>"#;
        let catalog = TsParser::parse_str(xml).unwrap();
        let msg = &catalog.contexts[0].messages[0];
        assert_eq!(msg.comment.as_deref(), Some(""));
        assert_eq!(msg.status, TranslationStatus::Unfinished);
    }

    #[test]
    fn test_unknown_elements_are_skipped() {
        let xml = r#"<TS version="2.1"><defaultcodec>UTF-8</defaultcodec>
<context><name>Fit</name><comment>legacy</comment>
<message><source>Fit</source><extra-po-flags>c-format</extra-po-flags><translation>Ajuster</translation></message>
</context></TS>"#;
        let catalog = TsParser::parse_str(xml).unwrap();
        assert_eq!(catalog.contexts[0].name, "Fit");
        assert_eq!(catalog.contexts[0].messages[0].translation, "Ajuster");
    }

    #[test]
    fn test_wrong_root_is_format_error() {
        let err = TsParser::parse_str("<html><body/></html>").unwrap_err();
        assert!(matches!(err, TsError::Format { .. }));
        assert!(err.to_string().contains("<html>"));
    }

    #[test]
    fn test_missing_source_is_format_error() {
        let xml = "<TS><context><name>A</name><message><translation>x</translation></message></context></TS>";
        let err = TsParser::parse_str(xml).unwrap_err();
        assert!(err.to_string().contains("no <source>"));
    }

    #[test]
    fn test_mismatched_tags_are_xml_errors() {
        let xml = "<TS><context><name>A</name></message></TS>";
        let err = TsParser::parse_str(xml).unwrap_err();
        assert!(matches!(err, TsError::Xml { .. }));
    }

    #[test]
    fn test_truncated_file_is_xml_error() {
        let xml = "<TS><context><name>A</name><message><source>x</source>";
        let err = TsParser::parse_str(xml).unwrap_err();
        assert!(matches!(err, TsError::Xml { .. }));
    }

    #[test]
    fn test_unknown_translation_type() {
        let xml = r#"<TS><context><name>A</name><message><source>x</source><translation type="done">y</translation></message></context></TS>"#;
        let err = TsParser::parse_str(xml).unwrap_err();
        assert!(err.to_string().contains("done"));
    }

    #[test]
    fn test_parse_file_with_bom() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "\u{feff}{}", SAMPLE).unwrap();
        let catalog = TsParser::parse_file(file.path()).unwrap();
        assert_eq!(catalog.message_count(), 3);
    }

    #[test]
    fn test_resolve_line() {
        assert_eq!(resolve_line("12", None), Some(12));
        assert_eq!(resolve_line("+3", Some(10)), Some(13));
        assert_eq!(resolve_line("-4", Some(10)), Some(6));
        assert_eq!(resolve_line("-4", Some(2)), None);
        assert_eq!(resolve_line("abc", None), None);
    }
}
