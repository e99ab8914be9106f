//! Log parser API
//!
//! [`LogParser`] is the entry point for turning a whole trace into
//! expressions. It splits the trace, classifies each block and builds its
//! expression, either one block at a time or on a rayon worker pool.

use crate::catalog::PatternCatalog;
use crate::config::ParserConfig;
use crate::expression::Expression;
use crate::splitter::{LogSplitter, RawBlock};
use crate::types::{CommandTag, DecoderError, Result};
use once_cell::sync::OnceCell;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

/// Parses traces against a shared, read-only pattern catalog
pub struct LogParser<'c> {
    catalog: &'c PatternCatalog,
    config: ParserConfig,
    /// Dedicated pool for a pinned worker count, built on first parallel parse
    pool: OnceCell<rayon::ThreadPool>,
}

impl<'c> LogParser<'c> {
    /// Create a new parser over `catalog`
    ///
    /// # Example
    /// ```
    /// use passthru_log_decoder::{LogParser, ParserConfig, PatternCatalog};
    ///
    /// let catalog = PatternCatalog::builtin().unwrap();
    /// let parser = LogParser::new(&catalog, ParserConfig::new());
    /// let report = parser
    ///     .parse_log("0.1s -- PTClose(1)\n0.2s 0:STATUS_NOERROR\n")
    ///     .unwrap();
    /// assert_eq!(report.expressions.len(), 1);
    /// assert!(report.expressions[0].passed());
    /// ```
    pub fn new(catalog: &'c PatternCatalog, config: ParserConfig) -> Self {
        Self {
            catalog,
            config,
            pool: OnceCell::new(),
        }
    }

    /// Settings this parser was created with
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Catalog shared by every parse
    pub fn catalog(&self) -> &'c PatternCatalog {
        self.catalog
    }

    /// Cut `log` into blocks, honoring the block limit
    pub fn split(&self, log: &str) -> Vec<RawBlock> {
        let mut blocks = LogSplitter::new(self.catalog, self.config.boundary).split(log);
        if let Some(max) = self.config.max_blocks {
            if blocks.len() > max {
                log::info!("Limiting parse to the first {} of {} blocks", max, blocks.len());
                blocks.truncate(max);
            }
        }
        blocks
    }

    /// Classify one block and build its expression
    pub fn parse_block(&self, block: &RawBlock) -> Result<Expression> {
        Expression::build(&block.text, block.command(), self.catalog)
    }

    /// Parse every block of `log`
    ///
    /// Expressions come back in source order whether or not the blocks were
    /// parsed in parallel. A block that fails construction is recorded in
    /// [`ParseReport::failures`] and the rest of the trace is still parsed.
    pub fn parse_log(&self, log: &str) -> Result<ParseReport> {
        let blocks = self.split(log);
        log::info!(
            "Parsing {} blocks ({})",
            blocks.len(),
            if self.config.parallel { "parallel" } else { "sequential" }
        );

        let outcomes = if self.config.parallel && blocks.len() > 1 {
            self.parse_parallel(&blocks)?
        } else {
            blocks.iter().map(|block| self.parse_block(block)).collect()
        };

        let mut report = ParseReport {
            total_blocks: blocks.len(),
            ..ParseReport::default()
        };

        for (block, outcome) in blocks.iter().zip(outcomes) {
            match outcome {
                Ok(expression) => report.expressions.push(expression),
                Err(error) => {
                    log::debug!("Dropping block {}: {}", block.index, error);
                    report.failures.push(BlockFailure {
                        index: block.index,
                        command: block.command(),
                        error,
                    });
                }
            }
        }

        Ok(report)
    }

    /// Lazily parse `log` one block at a time
    pub fn iter_log<'p>(&'p self, log: &str) -> ParseIterator<'p, 'c> {
        ParseIterator {
            parser: self,
            blocks: self.split(log).into_iter(),
        }
    }

    fn parse_parallel(&self, blocks: &[RawBlock]) -> Result<Vec<Result<Expression>>> {
        // indexed collect keeps source order
        let run = || {
            blocks
                .par_iter()
                .map(|block| self.parse_block(block))
                .collect::<Vec<_>>()
        };

        match self.worker_pool()? {
            Some(pool) => Ok(pool.install(run)),
            None => Ok(run()),
        }
    }

    /// The pinned-size pool, or `None` when rayon's global pool is used
    ///
    /// The pool is built once and reused by every later parse.
    fn worker_pool(&self) -> Result<Option<&rayon::ThreadPool>> {
        let Some(threads) = self.config.worker_threads else {
            return Ok(None);
        };

        self.pool
            .get_or_try_init(|| {
                log::debug!("Building worker pool with {} threads", threads);
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| DecoderError::InvalidConfig(e.to_string()))
            })
            .map(Some)
    }
}

/// Iterator that parses one block per call to `next`
pub struct ParseIterator<'p, 'c> {
    parser: &'p LogParser<'c>,
    blocks: std::vec::IntoIter<RawBlock>,
}

impl Iterator for ParseIterator<'_, '_> {
    type Item = Result<Expression>;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.blocks.next()?;
        Some(self.parser.parse_block(&block))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.blocks.size_hint()
    }
}

/// A block that could not be turned into an expression
#[derive(Debug, Clone, PartialEq)]
pub struct BlockFailure {
    pub index: usize,
    pub command: CommandTag,
    pub error: DecoderError,
}

/// Everything a full parse produced
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    /// Built expressions, in source order
    pub expressions: Vec<Expression>,
    /// Blocks dropped during construction
    pub failures: Vec<BlockFailure>,
    pub total_blocks: usize,
}

impl ParseReport {
    pub fn summary(&self) -> ParseSummary {
        let mut per_command = BTreeMap::new();
        for expression in &self.expressions {
            *per_command.entry(expression.command()).or_insert(0) += 1;
        }

        let passed = self.expressions.iter().filter(|e| e.passed()).count();

        ParseSummary {
            total_blocks: self.total_blocks,
            parsed: self.expressions.len(),
            passed,
            failed: self.expressions.len() - passed,
            dropped: self.failures.len(),
            per_command,
        }
    }
}

/// Counts over a [`ParseReport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSummary {
    pub total_blocks: usize,
    pub parsed: usize,
    pub passed: usize,
    pub failed: usize,
    pub dropped: usize,
    pub per_command: BTreeMap<CommandTag, usize>,
}

impl fmt::Display for ParseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Blocks:  {}", self.total_blocks)?;
        writeln!(f, "Parsed:  {} ({} passed, {} failed)", self.parsed, self.passed, self.failed)?;
        writeln!(f, "Dropped: {}", self.dropped)?;
        for (command, count) in &self.per_command {
            writeln!(f, "  {:<18} {}", command.name(), count)?;
        }
        Ok(())
    }
}
