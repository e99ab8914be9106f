//! Command expressions
//!
//! An [`Expression`] is the structured form of one command block: its tag,
//! every declared field with the value extracted for it, and any nested
//! content. Construction is all-or-nothing; a block whose extracted value
//! count does not match its declared field count is rejected.

use crate::catalog::PatternCatalog;
use crate::extractor::{evaluate_named, select, Extraction};
use crate::nested;
use crate::types::{
    CommandTag, DecoderError, FieldValue, NestedContent, NestedRecord, Result, STATUS_NOERROR,
};
use crate::variants::{NestedKind, Step, STATUS_PATTERN, TIME_PATTERN};
use serde_json::{json, Value};

/// One parsed command block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    raw_text: String,
    lines: Vec<String>,
    command: CommandTag,
    fields: Vec<FieldValue>,
    nested: NestedContent,
}

impl Expression {
    /// Build the expression for `text`, which the classifier tagged `command`
    pub fn build(text: &str, command: CommandTag, catalog: &PatternCatalog) -> Result<Self> {
        let definition = command.definition();

        // parameter lists feed the Parameter Count field, so parse them first
        let parameters = (definition.nested == NestedKind::Ioctl)
            .then(|| nested::ioctl::parse_parameters(text, catalog));

        let mut values = base_values(text, catalog);
        for step in definition.steps {
            values.extend(run_step(text, catalog, step, parameters.as_deref()));
        }

        let expected = definition.declared_len();
        if values.len() != expected {
            log::warn!(
                "{} block yielded {} values for {} declared fields",
                command,
                values.len(),
                expected
            );
            return Err(DecoderError::FieldArityMismatch {
                command,
                expected,
                found: values.len(),
            });
        }

        // declared fields take the values positionally
        let fields: Vec<FieldValue> = definition
            .all_fields()
            .zip(values)
            .map(|(descriptor, value)| FieldValue::new(*descriptor, value))
            .collect();

        let nested = match parameters {
            Some(parameters) => NestedContent::Ioctl(parameters),
            None => nested::parse(definition.nested, text, &fields, catalog),
        };

        log::trace!("Built {} expression with {} fields", command, fields.len());

        Ok(Self {
            raw_text: text.to_string(),
            lines: text.lines().map(str::to_string).collect(),
            command,
            fields,
            nested,
        })
    }

    /// Classify `text` and build its expression
    pub fn parse(text: &str, catalog: &PatternCatalog) -> Result<Self> {
        Self::build(text, CommandTag::classify(text), catalog)
    }

    /// Command the block was classified as
    pub fn command(&self) -> CommandTag {
        self.command
    }

    /// The block text exactly as it was split from the trace
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The block text, one entry per line
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All fields, base fields first
    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    /// Field by display name, ignoring case
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name().eq_ignore_ascii_case(name))
    }

    /// Displayed value of a field (extracted text or its fallback)
    pub fn value(&self, name: &str) -> Option<&str> {
        self.field(name).map(FieldValue::display)
    }

    /// Displayed Time Issued value
    pub fn execution_time(&self) -> &str {
        self.fields[0].display()
    }

    /// Displayed J2534 Status value
    pub fn status_code(&self) -> &str {
        self.fields[1].display()
    }

    pub fn nested(&self) -> &NestedContent {
        &self.nested
    }

    /// True when every field passed
    pub fn passed(&self) -> bool {
        self.fields.iter().all(FieldValue::passed)
    }

    /// JSON form: tag, verdict, fields and nested records
    pub fn to_json(&self) -> Value {
        let fields: Vec<Value> = self
            .fields
            .iter()
            .map(|field| {
                json!({
                    "name": field.name(),
                    "value": field.display(),
                    "passed": field.passed(),
                    "verdict": field.verdict(),
                })
            })
            .collect();

        let nested: Vec<Value> = self
            .nested
            .records()
            .iter()
            .map(|record| {
                let map: serde_json::Map<String, Value> = record
                    .iter()
                    .map(|(name, value)| (name.to_string(), Value::from(value)))
                    .collect();
                Value::Object(map)
            })
            .collect();

        json!({
            "command": self.command,
            "passed": self.passed(),
            "lines": self.lines,
            "fields": fields,
            "nested": nested,
        })
    }
}

/// Values for the two base fields, time then status
///
/// When the status line is missing but a command time was found, the status
/// is taken as `0:STATUS_NOERROR` stamped with that time. This covers blocks
/// where the driver returned before printing its status line and nothing else.
fn base_values(text: &str, catalog: &PatternCatalog) -> Vec<Option<String>> {
    let time = evaluate_named(text, catalog, TIME_PATTERN);
    let status = evaluate_named(text, catalog, STATUS_PATTERN);

    let mut values = step_values(&time);

    // a block cut off before its status line still carries the command time
    match (status.matched, time.last_group(), catalog.lookup(STATUS_PATTERN)) {
        (false, Some(stamp), Some(status_pattern)) if time.matched => {
            log::debug!("No status line found, assuming {} at {}", STATUS_NOERROR, stamp);
            let synthesized = vec![
                format!("{} {}", stamp, STATUS_NOERROR),
                stamp.to_string(),
                STATUS_NOERROR.to_string(),
            ];
            values.extend(
                select(status_pattern.selectors(), &synthesized)
                    .into_iter()
                    .map(Some),
            );
        }
        _ => values.extend(step_values(&status)),
    }

    values
}

/// Values one step contributes
fn run_step(
    text: &str,
    catalog: &PatternCatalog,
    step: &Step,
    parameters: Option<&[NestedRecord]>,
) -> Vec<Option<String>> {
    match step {
        Step::Whole(name) => vec![evaluate_named(text, catalog, name).whole],
        Step::Groups(name) => step_values(&evaluate_named(text, catalog, name)),
        Step::ParameterCount => {
            let count = parameters.map_or(0, <[NestedRecord]>::len);
            vec![Some(nested::ioctl::parameter_count(count))]
        }
    }
}

/// Selected values of a match, or a single absent value on failure
fn step_values(extraction: &Extraction) -> Vec<Option<String>> {
    if extraction.matched {
        extraction.values.iter().cloned().map(Some).collect()
    } else {
        vec![None]
    }
}
