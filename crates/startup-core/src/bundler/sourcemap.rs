//! Version 3 source maps for plugin transforms.
//!
//! Transforms in this crate only ever add text after the original source, so
//! maps are line-level: every original line gets one segment at column 0
//! pointing at the same line of the original file.

use serde::{Deserialize, Serialize};

/// A V3 source map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub sources: Vec<String>,
    #[serde(default)]
    pub sources_content: Vec<Option<String>>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    /// Serialize to the JSON form hosts expect.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Number of generated lines the `mappings` field describes.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.mappings.split(';').count()
    }
}

/// Encode a signed integer as a Base64 VLQ.
fn vlq_encode(value: i64, out: &mut String) {
    const B64: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    #[allow(clippy::cast_sign_loss)]
    let mut v = (if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    }) as u64;
    loop {
        let mut digit = (v & 0x1f) as u8;
        v >>= 5;
        if v > 0 {
            digit |= 0x20; // continuation bit
        }
        out.push(B64[digit as usize] as char);
        if v == 0 {
            break;
        }
    }
}

/// Collects line mappings for a single source file.
#[derive(Debug)]
pub struct SourceMapBuilder {
    source: String,
    content: Option<String>,
    /// (generated_line, original_line), both zero-based.
    lines: Vec<(u32, u32)>,
}

impl SourceMapBuilder {
    /// Start a map for the module `source`.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: None,
            lines: Vec::new(),
        }
    }

    /// Embed the original text as `sourcesContent`.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Map the start of `generated_line` to the start of `original_line`.
    pub fn add_line_mapping(&mut self, generated_line: u32, original_line: u32) {
        self.lines.push((generated_line, original_line));
    }

    /// Map every line of `original` onto itself.
    ///
    /// The empty remainder after a trailing newline is not a line of the
    /// original, so text appended there stays unmapped.
    pub fn add_identity_lines(&mut self, original: &str) {
        let count = original.lines().count() as u32;
        for line in 0..count {
            self.add_line_mapping(line, line);
        }
    }

    /// Produce the finished map.
    #[must_use]
    pub fn build(mut self) -> SourceMap {
        self.lines.sort_unstable();
        self.lines.dedup_by_key(|m| m.0);

        let mut mappings = String::new();
        let mut generated_line = 0u32;
        let mut prev_original_line = 0i64;

        for &(line, original_line) in &self.lines {
            while generated_line < line {
                mappings.push(';');
                generated_line += 1;
            }
            // Fields: generated column, source index, original line, original column.
            // All but the generated column are relative to the previous segment.
            vlq_encode(0, &mut mappings);
            vlq_encode(0, &mut mappings);
            vlq_encode(i64::from(original_line) - prev_original_line, &mut mappings);
            vlq_encode(0, &mut mappings);
            prev_original_line = i64::from(original_line);
        }

        SourceMap {
            version: 3,
            file: None,
            sources: vec![self.source],
            sources_content: vec![self.content],
            names: Vec::new(),
            mappings,
        }
    }
}
