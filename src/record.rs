//! Record mapping
//!
//! A [`Record`] is one row of a managed table. Its values line up with the
//! fields of its [`Schema`], so building from JSON, binding parameters and
//! looking up the unique key all work off the same declaration.

use chrono::{DateTime, Utc};

use crate::storage::{Schema, Value};
use crate::{Error, Result};

/// A typed row of one record kind.
pub trait Record: Sized {
    /// Table layout shared by every record of this kind
    fn schema() -> &'static Schema;

    /// Wrap values that are already in declaration order
    fn from_values(values: Vec<Value>) -> Self;

    /// Values in declaration order, ready for parameter binding
    fn to_row(&self) -> &[Value];

    fn into_values(self) -> Vec<Value>;

    /// Build a record from an API object.
    ///
    /// Only declared fields are read. Unknown keys are ignored and missing
    /// fields become `Null`. No type checking happens here.
    fn from_json(input: &serde_json::Value) -> Self {
        let values = Self::schema()
            .fields
            .iter()
            .map(|field| {
                input
                    .get(field.name)
                    .map(Value::from_json)
                    .unwrap_or(Value::Null)
            })
            .collect();
        Self::from_values(values)
    }

    /// Value of the unique-key field, if the kind declares one
    fn unique_value(&self) -> Option<&Value> {
        Self::schema()
            .unique_index()
            .and_then(|i| self.to_row().get(i))
    }

    fn get(&self, field: &str) -> Option<&Value> {
        Self::schema()
            .index_of(field)
            .and_then(|i| self.to_row().get(i))
    }

    fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    fn integer(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    fn timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get(field).and_then(Value::as_timestamp)
    }

    /// Coerce every value to its declared type before it is bound.
    ///
    /// Coercion is best-effort: values that do not convert are kept as they
    /// are. Only a row whose length disagrees with the schema is an error.
    fn sanitize(self) -> Result<Self> {
        let schema = Self::schema();
        let values = self.into_values();
        if values.len() != schema.fields.len() {
            return Err(Error::ColumnMismatch {
                table: schema.table,
                expected: schema.fields.len(),
                found: values.len(),
            });
        }
        let values = values
            .into_iter()
            .zip(schema.fields)
            .map(|(value, field)| value.coerce(field))
            .collect();
        Ok(Self::from_values(values))
    }
}

/// Implements [`Record`] for a struct wrapping `values: Vec<Value>`
macro_rules! impl_record {
    ($kind:ty, $schema:path) => {
        impl $crate::record::Record for $kind {
            fn schema() -> &'static $crate::storage::Schema {
                &$schema
            }

            fn from_values(values: Vec<$crate::storage::Value>) -> Self {
                Self { values }
            }

            fn to_row(&self) -> &[$crate::storage::Value] {
                &self.values
            }

            fn into_values(self) -> Vec<$crate::storage::Value> {
                self.values
            }
        }
    };
}

pub(crate) use impl_record;
