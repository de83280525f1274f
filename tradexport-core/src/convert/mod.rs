//! Cross-format conversion driven by declarative mapping tables.
//!
//! A `MappingTable` lists the rules turning a record of one format into a
//! record of another. The `Converter` looks tables up by (source,
//! destination) and applies them record by record: one output per input, in
//! input order, no I/O.

pub mod kucoin_cointracking;

use crate::format::{Field, Format, Record, RecordError, Value};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("no mapping table from {from} to {to}")]
    UnsupportedFormatPair { from: Format, to: Format },

    #[error("record {record} is missing field {field}")]
    MissingField { field: Field, record: usize },

    #[error("record {record} has an invalid {field}: {reason}")]
    InvalidValue {
        field: Field,
        record: usize,
        reason: String,
    },

    #[error("record {record} is tagged {actual}, expected {expected}")]
    FormatMismatch {
        record: usize,
        expected: Format,
        actual: Format,
    },

    #[error("record {record}: {source}")]
    Record {
        record: usize,
        #[source]
        source: RecordError,
    },
}

/// Failure inside a single rule, before the record index is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    Missing(Field),
    Invalid { field: Field, reason: String },
}

impl RuleError {
    fn at(self, record: usize) -> ConvertError {
        match self {
            RuleError::Missing(field) => ConvertError::MissingField { field, record },
            RuleError::Invalid { field, reason } => ConvertError::InvalidValue {
                field,
                record,
                reason,
            },
        }
    }
}

/// Computes destination values from a whole source record.
pub type DeriveFn = fn(&Record) -> Result<Vec<(Field, Value)>, RuleError>;

/// Rewrites one value's representation.
pub type ReformatFn = fn(&Value) -> Result<Value, String>;

/// One mapping instruction.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Copy a value under a new field.
    Rename { from: Field, to: Field },
    /// Compute fields from several source fields; all of `requires` must be present.
    Derive {
        requires: Vec<Field>,
        derive: DeriveFn,
    },
    /// Inject a fixed value.
    Constant { to: Field, value: Value },
    /// Same meaning, different textual form.
    Reformat {
        from: Field,
        to: Field,
        reformat: ReformatFn,
    },
}

impl Rule {
    fn apply(&self, source: &Record, out: &mut Vec<(Field, Value)>) -> Result<(), RuleError> {
        match self {
            Rule::Rename { from, to } => {
                let value = source.get(*from).ok_or(RuleError::Missing(*from))?;
                out.push((*to, value.clone()));
            }
            Rule::Derive { requires, derive } => {
                if let Some(missing) = source.first_missing(requires) {
                    return Err(RuleError::Missing(missing));
                }
                out.extend(derive(source)?);
            }
            Rule::Constant { to, value } => out.push((*to, value.clone())),
            Rule::Reformat { from, to, reformat } => {
                let value = source.get(*from).ok_or(RuleError::Missing(*from))?;
                let value = reformat(value).map_err(|reason| RuleError::Invalid {
                    field: *from,
                    reason,
                })?;
                out.push((*to, value));
            }
        }
        Ok(())
    }
}

/// Rules converting `source` records into `destination` records.
#[derive(Debug, Clone)]
pub struct MappingTable {
    pub source: Format,
    pub destination: Format,
    pub rules: Vec<Rule>,
}

impl MappingTable {
    pub fn new(source: Format, destination: Format) -> Self {
        Self {
            source,
            destination,
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rename(self, from: impl Into<Field>, to: impl Into<Field>) -> Self {
        self.rule(Rule::Rename {
            from: from.into(),
            to: to.into(),
        })
    }

    pub fn constant(self, to: impl Into<Field>, value: impl Into<Value>) -> Self {
        self.rule(Rule::Constant {
            to: to.into(),
            value: value.into(),
        })
    }

    pub fn derive(self, requires: &[Field], derive: DeriveFn) -> Self {
        self.rule(Rule::Derive {
            requires: requires.to_vec(),
            derive,
        })
    }

    pub fn reformat(
        self,
        from: impl Into<Field>,
        to: impl Into<Field>,
        reformat: ReformatFn,
    ) -> Self {
        self.rule(Rule::Reformat {
            from: from.into(),
            to: to.into(),
            reformat,
        })
    }

    /// Convert one record. `index` only labels errors.
    fn apply(&self, index: usize, source: &Record) -> Result<Record, ConvertError> {
        if source.format() != self.source {
            return Err(ConvertError::FormatMismatch {
                record: index,
                expected: self.source,
                actual: source.format(),
            });
        }

        let mut values = Vec::new();
        for rule in &self.rules {
            rule.apply(source, &mut values).map_err(|e| e.at(index))?;
        }

        let mut builder = Record::builder(self.destination);
        for (field, value) in values {
            builder.insert(field, value);
        }
        let record = builder.build().map_err(|source| ConvertError::Record {
            record: index,
            source,
        })?;

        if let Some(field) = record.first_missing(&self.destination.required_fields()) {
            return Err(ConvertError::MissingField {
                field,
                record: index,
            });
        }
        Ok(record)
    }
}

/// Registry of mapping tables keyed by (source, destination).
#[derive(Debug, Clone, Default)]
pub struct Converter {
    tables: BTreeMap<(Format, Format), MappingTable>,
}

impl Converter {
    /// A converter with no tables; every pair is unsupported until registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A converter with every built-in table.
    pub fn new() -> Self {
        let mut converter = Self::empty();
        converter.register(kucoin_cointracking::table());
        converter
    }

    /// Install `table`, replacing any table for the same pair.
    pub fn register(&mut self, table: MappingTable) {
        self.tables
            .insert((table.source, table.destination), table);
    }

    pub fn supports(&self, source: Format, destination: Format) -> bool {
        self.tables.contains_key(&(source, destination))
    }

    /// Convert `records` from `source` to `destination`.
    ///
    /// Exactly one output per input, in input order. Fails on the first
    /// record a rule cannot handle.
    pub fn convert(
        &self,
        source: Format,
        destination: Format,
        records: &[Record],
    ) -> Result<Vec<Record>, ConvertError> {
        let table = self
            .tables
            .get(&(source, destination))
            .ok_or(ConvertError::UnsupportedFormatPair {
                from: source,
                to: destination,
            })?;

        let converted = records
            .iter()
            .enumerate()
            .map(|(i, r)| table.apply(i, r))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(%source, %destination, records = converted.len(), "converted records");
        Ok(converted)
    }
}
