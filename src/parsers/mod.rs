pub mod jacoco;

use quick_xml::events::BytesStart;
use quick_xml::reader::Reader;

use crate::error::{KoverError, Result};
use crate::model::Report;

/// Every report format parser implements this trait.
pub trait Parser {
    /// Parse the input bytes into the report tree.
    fn parse(&self, input: &[u8]) -> Result<Report>;
}

/// Build an XML reader over raw bytes with whitespace-only text trimmed.
pub(crate) fn xml_reader(input: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);
    reader
}

/// Wrap a quick-xml error with the reader's current byte position.
pub(crate) fn xml_err(source: quick_xml::Error, reader: &Reader<&[u8]>) -> KoverError {
    KoverError::Xml {
        source,
        position: reader.buffer_position(),
    }
}

/// Look up a single attribute by name, unescaped. Invalid attribute syntax
/// is reported rather than skipped.
pub(crate) fn get_attr(
    e: &BytesStart<'_>,
    name: &[u8],
    reader: &Reader<&[u8]>,
) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| xml_err(err.into(), reader))?;
        if attr.key.as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|err| xml_err(err, reader))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
