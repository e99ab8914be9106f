//! Splitting a raw trace into command blocks
//!
//! Blocks are cut, never repaired: a block with a truncated status line goes
//! to the expression constructor exactly as it appears in the trace.

use crate::catalog::PatternCatalog;
use crate::config::BlockBoundary;
use crate::types::CommandTag;
use crate::variants::TIME_PATTERN;

/// One command block cut from a trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    /// Position of the block in the trace
    pub index: usize,
    /// Block text, untouched
    pub text: String,
}

impl RawBlock {
    /// Create a block at `index`
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Command tag of this block
    pub fn command(&self) -> CommandTag {
        CommandTag::classify(&self.text)
    }
}

/// Cuts trace text into [`RawBlock`]s
pub struct LogSplitter<'c> {
    catalog: &'c PatternCatalog,
    boundary: BlockBoundary,
}

impl<'c> LogSplitter<'c> {
    /// Create a splitter that finds command headers with `catalog`
    pub fn new(catalog: &'c PatternCatalog, boundary: BlockBoundary) -> Self {
        Self { catalog, boundary }
    }

    /// Split `log` into blocks in source order
    pub fn split(&self, log: &str) -> Vec<RawBlock> {
        let pieces: Vec<&str> = match self.boundary {
            BlockBoundary::Separator(separator) => log
                .split(separator)
                .filter(|piece| !piece.trim().is_empty())
                .collect(),
            BlockBoundary::CommandHeader => self.split_at_headers(log),
        };

        log::debug!("Split trace into {} blocks", pieces.len());

        pieces
            .into_iter()
            .enumerate()
            .map(|(index, text)| RawBlock::new(index, text))
            .collect()
    }

    fn split_at_headers<'t>(&self, log: &'t str) -> Vec<&'t str> {
        // without a header pattern there is nothing to cut on
        let Some(time) = self.catalog.lookup(TIME_PATTERN) else {
            log::warn!("Pattern '{}' not found, treating the trace as one block", TIME_PATTERN);
            return if log.trim().is_empty() { Vec::new() } else { vec![log] };
        };

        let mut starts: Vec<usize> = time
            .regex()
            .find_iter(log)
            .map(|m| line_start(log, m.start()))
            .collect();
        starts.dedup();

        // text before the first header is kept as its own block
        let mut pieces = Vec::with_capacity(starts.len() + 1);
        let first = starts.first().copied().unwrap_or(log.len());
        if !log[..first].trim().is_empty() {
            pieces.push(&log[..first]);
        }

        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(log.len());
            pieces.push(&log[start..end]);
        }

        pieces
    }
}

/// Byte offset of the start of the line containing `offset`
fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |newline| newline + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogRecord;

    const TRACE: &str = "0.100s ++ PTOpen(, 0x0012FE1C)\n\
                         \x20 returning DeviceID: 1\n\
                         0.101s 0:STATUS_NOERROR\n\
                         0.200s ++ PTConnect(1, ISO15765, 0x00000000, 500000, 0x0012FE00)\n\
                         \x20 returning ChannelID: 2\n\
                         0.201s 0:STATUS_NOERROR\n";

    #[test]
    fn test_split_at_headers() {
        let catalog = PatternCatalog::builtin().unwrap();
        let blocks = LogSplitter::new(&catalog, BlockBoundary::CommandHeader).split(TRACE);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].index, 0);
        assert!(blocks[0].text.starts_with("0.100s ++ PTOpen"));
        assert!(blocks[0].text.ends_with("0.101s 0:STATUS_NOERROR\n"));
        assert_eq!(blocks[1].command(), CommandTag::Connect);
    }

    #[test]
    fn test_leading_text_is_its_own_block() {
        let catalog = PatternCatalog::builtin().unwrap();
        let trace = format!("Shim started\n{}", TRACE);
        let blocks = LogSplitter::new(&catalog, BlockBoundary::CommandHeader).split(&trace);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].text, "Shim started\n");
        assert_eq!(blocks[0].command(), CommandTag::None);

        let blocks = LogSplitter::new(&catalog, BlockBoundary::CommandHeader)
            .split(&format!("\n\n{}", TRACE));
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_catalog_without_header_pattern_keeps_one_block() {
        let records = vec![CatalogRecord::new(
            "PTClose",
            r"PTClose\(\s*(\d+)\s*\) *GROUPS_(1)*",
            CommandTag::Close,
        )];
        let catalog = PatternCatalog::load(&records).unwrap();
        let blocks = LogSplitter::new(&catalog, BlockBoundary::CommandHeader).split(TRACE);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].index, 0);
        assert_eq!(blocks[0].text, TRACE);
        assert_eq!(blocks[0].command(), CommandTag::Open);

        assert!(LogSplitter::new(&catalog, BlockBoundary::CommandHeader)
            .split("  \n")
            .is_empty());
    }

    #[test]
    fn test_split_on_separator_ignores_blank_segments() {
        let catalog = PatternCatalog::builtin().unwrap();
        let trace = "A PTClose(1)\u{1e}\u{1e}  \n\u{1e}B PTDisconnect(2)\u{1e}";
        let blocks = LogSplitter::new(&catalog, BlockBoundary::Separator('\u{1e}')).split(trace);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].index, 1);
        assert_eq!(blocks[1].command(), CommandTag::Disconnect);
    }

    #[test]
    fn test_empty_trace() {
        let catalog = PatternCatalog::builtin().unwrap();
        assert!(LogSplitter::new(&catalog, BlockBoundary::CommandHeader).split("").is_empty());
        assert!(LogSplitter::new(&catalog, BlockBoundary::Separator('|')).split(" | ").is_empty());
    }
}
