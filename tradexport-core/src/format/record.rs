//! Record — one trade event as field→value data tagged with its format.

use super::{Field, Format, Value};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("field {field} does not belong to format {format}")]
    ForeignField { field: Field, format: Format },
}

/// One trade event. Immutable once built; conversion produces new records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    format: Format,
    values: BTreeMap<Field, Value>,
}

impl Record {
    pub fn builder(format: Format) -> RecordBuilder {
        RecordBuilder {
            format,
            values: BTreeMap::new(),
            error: None,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn get(&self, field: impl Into<Field>) -> Option<&Value> {
        self.values.get(&field.into())
    }

    pub fn contains(&self, field: impl Into<Field>) -> bool {
        self.values.contains_key(&field.into())
    }

    /// Present fields in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&Field, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First field of `required` this record lacks.
    pub fn first_missing(&self, required: &[Field]) -> Option<Field> {
        required.iter().copied().find(|f| !self.values.contains_key(f))
    }
}

/// Accumulates values for a [`Record`], rejecting fields from other formats.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    format: Format,
    values: BTreeMap<Field, Value>,
    error: Option<RecordError>,
}

impl RecordBuilder {
    /// Set a field, replacing any earlier value for it.
    pub fn set(mut self, field: impl Into<Field>, value: impl Into<Value>) -> Self {
        self.insert(field.into(), value.into());
        self
    }

    /// In-place variant of [`RecordBuilder::set`] for loops.
    pub fn insert(&mut self, field: Field, value: Value) {
        if field.format() != self.format {
            self.error.get_or_insert(RecordError::ForeignField {
                field,
                format: self.format,
            });
            return;
        }
        self.values.insert(field, value);
    }

    pub fn build(self) -> Result<Record, RecordError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(Record {
                format: self.format,
                values: self.values,
            }),
        }
    }
}
