//! Overlay definitions: one line type standing for several real ones
//!
//! The format only has a few line types, more can be simulated by drawing
//! lines on top of each other. A definition such as
//!
//! ```text
//! 0x123: 0x12, 0x14, 0x15   # comment
//! ```
//!
//! replaces every line of type `0x123` by three lines of types `0x12`, `0x14`
//! and `0x15` sharing the same coordinates.

use crate::{MapLine, Result, TilingError};
use std::collections::HashMap;
use std::path::Path;

/// Parsed overlay definitions keyed by the type they replace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlays {
    replacements: HashMap<u32, Vec<u32>>,
}

impl Overlays {
    /// Parse definitions from text
    pub fn parse(text: &str) -> Result<Self> {
        let mut replacements = HashMap::new();

        for (index, raw_line) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw_line.split('#').next().unwrap_or_default();
            let Some((kind, rest)) = line.split_once(':') else {
                continue;
            };

            let kind = parse_type(kind.trim()).ok_or_else(|| TilingError::OverlaySyntax {
                line: line_number,
                message: "Expecting a number".to_string(),
            })?;

            let types = rest
                .split([' ', ','])
                .filter(|n| !n.is_empty())
                .map(|n| {
                    parse_type(n.trim()).ok_or_else(|| TilingError::OverlaySyntax {
                        line: line_number,
                        message: "List of numbers expected".to_string(),
                    })
                })
                .collect::<Result<Vec<u32>>>()?;

            if types.is_empty() {
                return Err(TilingError::OverlaySyntax {
                    line: line_number,
                    message: "List of numbers expected".to_string(),
                });
            }
            replacements.insert(kind, types);
        }

        tracing::debug!("read {} overlay definitions", replacements.len());
        Ok(Self { replacements })
    }

    /// Read definitions from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Replacement types for `kind`, if it is an overlay type
    pub fn get(&self, kind: u32) -> Option<&[u32]> {
        self.replacements.get(&kind).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// The lines to add in place of `line`
    ///
    /// Lines without an overlay come back unchanged. Otherwise one copy per
    /// replacement type is produced, all sharing the original coordinates.
    pub fn expand(&self, line: MapLine) -> Vec<MapLine> {
        match self.get(line.info.kind) {
            Some(types) => types.iter().map(|&kind| line.with_kind(kind)).collect(),
            None => vec![line],
        }
    }
}

/// Decimal, or hex with a `0x` prefix
fn parse_type(text: &str) -> Option<u32> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
