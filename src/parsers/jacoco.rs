/// Parser for Kover / JaCoCo XML coverage reports.
///
/// Report structure:
///   <report name="...">
///     <sessioninfo id="..." start="..." dump="..."/>
///     <package name="com/example">
///       <class name="com/example/Foo" sourcefilename="Foo.kt">
///         <method name="doStuff" desc="()V" line="10">
///           <counter type="LINE" missed="0" covered="3"/>
///         </method>
///         <counter type="LINE" missed="1" covered="5"/>
///       </class>
///       <sourcefile name="Foo.kt">
///         <line nr="10" mi="0" ci="3" mb="0" cb="2"/>
///         <counter type="INSTRUCTION" missed="2" covered="10"/>
///         <counter type="LINE" missed="1" covered="5"/>
///       </sourcefile>
///       <counter type="LINE" missed="1" covered="5"/>
///     </package>
///     <counter type="LINE" missed="1" covered="5"/>
///   </report>
///
/// Only the report → package → sourcefile/class nesting is modelled. A
/// `<counter>` belongs to its direct parent when that parent is one of
/// report, package, sourcefile or class; counters under `<method>` (or any
/// other element) are skipped, as is everything below an element we do not
/// recognise at that depth.
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::{get_attr, xml_err, xml_reader, Parser};
use crate::error::{KoverError, Result};
use crate::model::{Class, Counter, CounterKind, Package, Report, SourceFile};

/// Kover / JaCoCo XML report parser.
pub struct JacocoParser;

impl Parser for JacocoParser {
    fn parse(&self, input: &[u8]) -> Result<Report> {
        parse(input)
    }
}

/// An open element on the parse stack.
enum Frame {
    Report(Report),
    Package(Package),
    SourceFile(SourceFile),
    Class(Class),
    Ignored,
}

impl Frame {
    fn counters_mut(&mut self) -> Option<&mut Vec<Counter>> {
        match self {
            Frame::Report(r) => Some(&mut r.counters),
            Frame::Package(p) => Some(&mut p.counters),
            Frame::SourceFile(s) => Some(&mut s.counters),
            Frame::Class(c) => Some(&mut c.counters),
            Frame::Ignored => None,
        }
    }
}

/// Parse a Kover / JaCoCo XML report from raw bytes.
pub fn parse(input: &[u8]) -> Result<Report> {
    let mut xml = xml_reader(input);
    let mut buf = Vec::new();

    let mut stack: Vec<Frame> = Vec::new();
    let mut report: Option<Report> = None;
    let mut seen_root = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Err(e) => return Err(xml_err(e, &xml)),
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) => {
                let frame = open(e, &mut stack, &mut seen_root, &xml)?;
                stack.push(frame);
            }
            Ok(Event::Empty(ref e)) => {
                let frame = open(e, &mut stack, &mut seen_root, &xml)?;
                stack.push(frame);
                close(&mut stack, &mut report, &xml)?;
            }
            Ok(Event::End(_)) => close(&mut stack, &mut report, &xml)?,
            Ok(Event::Text(_) | Event::CData(_)) if stack.is_empty() => {
                return Err(malformed("content outside the root element", &xml));
            }
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(malformed("unexpected end of document", &xml));
    }
    report.ok_or_else(|| malformed("document has no <report> element", &xml))
}

fn malformed(reason: impl Into<String>, xml: &Reader<&[u8]>) -> KoverError {
    KoverError::MalformedReport {
        reason: reason.into(),
        position: xml.buffer_position(),
    }
}

/// Decide which frame an opening tag starts, attaching counters to their
/// parent as a side effect.
fn open(
    e: &BytesStart<'_>,
    stack: &mut [Frame],
    seen_root: &mut bool,
    xml: &Reader<&[u8]>,
) -> Result<Frame> {
    let name = e.name();
    let name = name.as_ref();

    let Some(parent) = stack.last_mut() else {
        if *seen_root {
            return Err(malformed("more than one root element", xml));
        }
        *seen_root = true;
        if name != b"report" {
            return Err(malformed(
                format!(
                    "expected <report> root element, found <{}>",
                    String::from_utf8_lossy(name)
                ),
                xml,
            ));
        }
        return Ok(Frame::Report(Report {
            name: get_attr(e, b"name", xml)?.unwrap_or_default(),
            ..Default::default()
        }));
    };

    let frame = match name {
        b"counter" => {
            if let Some(counters) = parent.counters_mut() {
                counters.push(parse_counter(e, xml)?);
            }
            Frame::Ignored
        }
        b"package" if matches!(parent, Frame::Report(_)) => Frame::Package(Package {
            name: required_attr(e, b"name", "package", xml)?,
            ..Default::default()
        }),
        b"sourcefile" if matches!(parent, Frame::Package(_)) => Frame::SourceFile(SourceFile {
            name: required_attr(e, b"name", "sourcefile", xml)?,
            ..Default::default()
        }),
        b"class" if matches!(parent, Frame::Package(_)) => Frame::Class(Class {
            name: get_attr(e, b"name", xml)?.unwrap_or_default(),
            source_file_name: get_attr(e, b"sourcefilename", xml)?,
            ..Default::default()
        }),
        _ => Frame::Ignored,
    };
    Ok(frame)
}

/// Pop the innermost frame and attach it to its parent.
fn close(stack: &mut Vec<Frame>, report: &mut Option<Report>, xml: &Reader<&[u8]>) -> Result<()> {
    let Some(frame) = stack.pop() else {
        return Err(malformed("closing tag without matching opening tag", xml));
    };
    match (frame, stack.last_mut()) {
        (Frame::Report(r), None) => *report = Some(r),
        (Frame::Package(p), Some(Frame::Report(r))) => r.packages.push(p),
        (Frame::SourceFile(s), Some(Frame::Package(p))) => p.source_files.push(s),
        (Frame::Class(c), Some(Frame::Package(p))) => p.classes.push(c),
        _ => {}
    }
    Ok(())
}

fn required_attr(
    e: &BytesStart<'_>,
    name: &[u8],
    element: &str,
    xml: &Reader<&[u8]>,
) -> Result<String> {
    get_attr(e, name, xml)?.ok_or_else(|| {
        malformed(
            format!(
                "<{element}> is missing the `{}` attribute",
                String::from_utf8_lossy(name)
            ),
            xml,
        )
    })
}

fn parse_counter(e: &BytesStart<'_>, xml: &Reader<&[u8]>) -> Result<Counter> {
    let kind = CounterKind::from_report_attr(&required_attr(e, b"type", "counter", xml)?);
    let count = |attr: &[u8]| -> Result<u64> {
        let raw = required_attr(e, attr, "counter", xml)?;
        raw.trim().parse::<u64>().map_err(|_| {
            malformed(
                format!(
                    "invalid `{}` value '{raw}' on <counter>",
                    String::from_utf8_lossy(attr)
                ),
                xml,
            )
        })
    };
    Ok(Counter {
        missed: count(b"missed")?,
        covered: count(b"covered")?,
        kind,
    })
}
