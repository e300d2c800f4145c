//! Adapter between [`Schema`] and the `<pc:PointCloudSchema>` XML document
//! described in SPEC_FULL.md §6. Gated behind the `xml` feature: the core
//! tree, codec and filter have no XML dependency at all, only this
//! surface does.
//!
//! Unknown elements are ignored, matching the "thin adapter over a pull
//! parser" contract: this module does not attempt to validate a document
//! against a schema, only to pull the handful of elements it understands.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{PcError, PcResult};
use crate::schema::{Dimension, PrimitiveType, Schema};

#[derive(Default)]
struct PendingDimension {
    position: Option<usize>,
    name: Option<String>,
    description: String,
    interpretation: Option<String>,
    scale: f64,
    offset: f64,
}

/// Parses a `<pc:PointCloudSchema>` document into a [`Schema`].
///
/// XML `<pc:position>` values are 1-based; this function subtracts one so
/// the resulting [`Dimension::position`] matches the 0-based convention used
/// everywhere else in this crate.
pub fn schema_from_xml(xml: &str) -> PcResult<Schema> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text = true;

    let mut schema = Schema::new();
    let mut current: Option<PendingDimension> = None;
    let mut current_tag: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            xml_error(&reader, format!("XML parse error: {e}"))
        })?;
        match event {
            Event::Eof => break,
            Event::Start(e) => {
                let name = local_name(e.name().as_ref());
                if name == "dimension" {
                    current = Some(PendingDimension::default());
                } else {
                    current_tag = Some(name);
                }
            }
            Event::Text(t) => {
                let Some(dim) = current.as_mut() else { continue };
                let Some(tag) = current_tag.as_deref() else { continue };
                let text = t.unescape().map_err(|e| {
                    xml_error(&reader, format!("invalid text content: {e}"))
                })?;
                match tag {
                    "position" => {
                        dim.position = Some(text.trim().parse::<usize>().map_err(
                            |e| xml_error(&reader, format!("bad <pc:position>: {e}")),
                        )?);
                    }
                    "name" => dim.name = Some(text.trim().to_string()),
                    "description" => dim.description = text.trim().to_string(),
                    "interpretation" => dim.interpretation = Some(text.trim().to_string()),
                    "scale" => {
                        dim.scale = text.trim().parse::<f64>().map_err(|e| {
                            xml_error(&reader, format!("bad <pc:scale>: {e}"))
                        })?;
                    }
                    "offset" => {
                        dim.offset = text.trim().parse::<f64>().map_err(|e| {
                            xml_error(&reader, format!("bad <pc:offset>: {e}"))
                        })?;
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                let name = local_name(e.name().as_ref());
                if name == "dimension" {
                    let dim = current.take().ok_or_else(|| {
                        xml_error(&reader, "</pc:dimension> without matching start")
                    })?;
                    schema.add_dimension(finish_dimension(&reader, dim)?)?;
                } else {
                    current_tag = None;
                }
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(schema)
}

fn finish_dimension(reader: &Reader<&[u8]>, dim: PendingDimension) -> PcResult<Dimension> {
    let position = dim
        .position
        .ok_or_else(|| xml_error(reader, "<pc:dimension> missing <pc:position>"))?
        .checked_sub(1)
        .ok_or_else(|| xml_error(reader, "<pc:position> must be 1-based, got 0"))?;
    let name = dim
        .name
        .ok_or_else(|| xml_error(reader, "<pc:dimension> missing <pc:name>"))?;
    let interpretation = dim
        .interpretation
        .ok_or_else(|| xml_error(reader, "<pc:dimension> missing <pc:interpretation>"))?;
    let primitive_type = PrimitiveType::from_xml_name(&interpretation)?;
    let scale = if dim.scale == 0.0 { 1.0 } else { dim.scale };
    Dimension::new(position, name, dim.description, primitive_type, scale, dim.offset)
}

fn local_name(qualified: &[u8]) -> String {
    let s = String::from_utf8_lossy(qualified);
    match s.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => s.to_string(),
    }
}

fn xml_error(reader: &Reader<&[u8]>, detail: impl Into<String>) -> PcError {
    PcError::malformed(format!(
        "{} (byte offset {})",
        detail.into(),
        reader.buffer_position()
    ))
}

/// Serializes `schema` back to a `<pc:PointCloudSchema>` document.
pub fn schema_to_xml(schema: &Schema) -> String {
    let mut out = String::from("<pc:PointCloudSchema xmlns:pc=\"https://github.com/PDAL/PDAL/wiki/GSoC-2013-Point-Cloud-Schema\">\n");
    for dim in schema.dimensions() {
        out.push_str("  <pc:dimension>\n");
        out.push_str(&format!("    <pc:position>{}</pc:position>\n", dim.position() + 1));
        out.push_str(&format!("    <pc:name>{}</pc:name>\n", escape(dim.name())));
        out.push_str(&format!(
            "    <pc:description>{}</pc:description>\n",
            escape(dim.description())
        ));
        out.push_str(&format!(
            "    <pc:interpretation>{}</pc:interpretation>\n",
            dim.primitive_type().xml_name()
        ));
        out.push_str(&format!("    <pc:scale>{}</pc:scale>\n", dim.scale()));
        out.push_str(&format!("    <pc:offset>{}</pc:offset>\n", dim.offset()));
        out.push_str("  </pc:dimension>\n");
    }
    out.push_str("</pc:PointCloudSchema>\n");
    out
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
