//! Frontmatter codec and the `---` framed document layout.
//!
//! A record file looks like:
//!
//! ```text
//! ---
//! <serialized frontmatter mapping>
//! ---
//! <raw body text>
//! ```
//!
//! The codec only deals with the block between the delimiter lines; framing
//! is handled by [`render_document`] and [`split_document`].

use crate::error::CodecError;
use crate::types::{fields_from_mapping, mapping_from_fields, Frontmatter};
use serde_yaml::Value;

/// Delimiter line bracketing the frontmatter block.
pub const DELIMITER: &str = "---";

/// Encodes and decodes a frontmatter block.
pub trait FrontmatterCodec: Send + Sync {
    fn encode(&self, frontmatter: &Frontmatter) -> Result<String, CodecError>;
    fn decode(&self, block: &str) -> Result<Frontmatter, CodecError>;
}

/// YAML frontmatter codec backed by `serde_yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl FrontmatterCodec for YamlCodec {
    fn encode(&self, frontmatter: &Frontmatter) -> Result<String, CodecError> {
        let mapping = mapping_from_fields(frontmatter.clone());
        serde_yaml::to_string(&mapping).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, block: &str) -> Result<Frontmatter, CodecError> {
        if block.trim().is_empty() {
            return Ok(Frontmatter::new());
        }
        let value: Value =
            serde_yaml::from_str(block).map_err(|e| CodecError::Decode(e.to_string()))?;
        match value {
            Value::Mapping(map) => fields_from_mapping(map),
            Value::Null => Ok(Frontmatter::new()),
            Value::Bool(_) => Err(CodecError::NotAMapping("bool")),
            Value::Number(_) => Err(CodecError::NotAMapping("number")),
            Value::String(_) => Err(CodecError::NotAMapping("string")),
            Value::Sequence(_) => Err(CodecError::NotAMapping("sequence")),
            Value::Tagged(_) => Err(CodecError::NotAMapping("tagged value")),
        }
    }
}

/// Frame an encoded frontmatter block and a body into file content.
pub fn render_document(block: &str, body: &str) -> String {
    let mut out = String::with_capacity(block.len() + body.len() + 2 * DELIMITER.len() + 3);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(block);
    if !block.is_empty() && !block.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(body);
    out
}

/// Split file content into `(frontmatter block, body)`.
///
/// The body is everything after the closing delimiter line, byte for byte.
/// A trailing `\r` on delimiter lines is tolerated.
pub fn split_document(content: &str) -> Result<(&str, &str), CodecError> {
    let mut lines = content.split_inclusive('\n');
    let opening = lines.next().ok_or(CodecError::MissingOpeningDelimiter)?;
    if !is_delimiter_line(opening) {
        return Err(CodecError::MissingOpeningDelimiter);
    }

    let block_start = opening.len();
    let mut offset = block_start;
    for line in lines {
        if is_delimiter_line(line) {
            let block = &content[block_start..offset];
            let body = &content[offset + line.len()..];
            return Ok((block, body));
        }
        offset += line.len();
    }

    Err(CodecError::MissingClosingDelimiter)
}

fn is_delimiter_line(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == DELIMITER
}
