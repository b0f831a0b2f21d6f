//! Position map serialization
//!
//! The map is written as a standard source map: version, file list, embedded
//! source contents, and the per-line mapping segments packed as base64 VLQ.
//! Each segment carries four fields (generated column, source index,
//! original line, original column); columns are always zero here, and no
//! name table is populated.

use std::path::Path;

use serde::Serialize;

use crate::offset::OffsetTable;

const BASE64_CHARS: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE_MASK: i64 = 0b1_1111;
const VLQ_CONTINUATION_BIT: i64 = 0b10_0000;

/// A source map v3 document, serialized as-is.
#[derive(Debug, Serialize)]
pub struct SourceMap {
    pub version: u32,
    pub file: String,
    pub sources: Vec<String>,
    #[serde(rename = "sourcesContent")]
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

/// Build the map for a consolidated document from the synthesizer's output.
///
/// Source paths are written relative to the scan root where possible.
/// Mapping rows arrive one per generated line, strictly increasing, so each
/// `;`-separated line holds at most one segment.
pub fn build(doc_file: &str, root: &Path, table: &OffsetTable) -> SourceMap {
    let sources: Vec<String> = table
        .sources
        .iter()
        .map(|(path, _)| relative_display(path, root))
        .collect();
    let sources_content: Vec<String> = table
        .sources
        .iter()
        .map(|(_, content)| content.clone())
        .collect();

    let mut mappings = String::new();
    let mut prev_source = 0i64;
    let mut prev_line = 0i64;
    let mut line = 1usize;
    for row in &table.rows {
        while line < row.generated_line {
            mappings.push(';');
            line += 1;
        }
        let source_index = table
            .sources
            .iter()
            .position(|(path, _)| *path == row.source_file)
            .unwrap_or(0) as i64;
        let original_line = row.original_line as i64 - 1;
        encode_vlq(0, &mut mappings);
        encode_vlq(source_index - prev_source, &mut mappings);
        encode_vlq(original_line - prev_line, &mut mappings);
        encode_vlq(0, &mut mappings);
        prev_source = source_index;
        prev_line = original_line;
    }

    SourceMap {
        version: 3,
        file: doc_file.to_string(),
        sources,
        sources_content,
        names: Vec::new(),
        mappings,
    }
}

fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Append one signed value in base64 VLQ form.
fn encode_vlq(value: i64, out: &mut String) {
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };
    loop {
        let mut digit = vlq & VLQ_BASE_MASK;
        vlq >>= VLQ_BASE_SHIFT;
        if vlq > 0 {
            digit |= VLQ_CONTINUATION_BIT;
        }
        out.push(BASE64_CHARS[digit as usize] as char);
        if vlq == 0 {
            break;
        }
    }
}
