//! In-memory datasets: identifiers plus a feature matrix restricted to a
//! [`FeatureSpace`].

pub mod loader;

pub use loader::{parse_number, Table};

use crate::core::float::ForelFloat;
use crate::distances::{FeatureSpace, FieldSelector};
use crate::error::{ForelError, ForelResult};
use log::warn;
use ndarray::{Array2, ArrayView1, ArrayView2};

/// How unparseable feature values are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// Unparseable values become zero and a warning is logged.
    #[default]
    Lenient,
    /// Unparseable values fail the load with [`ForelError::MalformedRecord`].
    Strict,
}

/// Ordered records, each a row of `values` over the fields of `space`.
#[derive(Debug, Clone)]
pub struct Dataset<F: ForelFloat> {
    identifiers: Vec<String>,
    space: FeatureSpace,
    values: Array2<F>,
}

impl<F: ForelFloat> Dataset<F> {
    /// Wraps an in-memory feature matrix whose columns are `fields`.
    pub fn from_array<S: AsRef<str>>(
        identifiers: Vec<String>,
        fields: &[S],
        values: Array2<F>,
    ) -> ForelResult<Self> {
        let space = FeatureSpace::from_fields(fields)?;
        if values.ncols() != space.dimension() {
            return Err(ForelError::Configuration(format!(
                "feature matrix has {} columns but {} fields were named",
                values.ncols(),
                space.dimension()
            )));
        }
        if identifiers.len() != values.nrows() {
            return Err(ForelError::Configuration(format!(
                "{} identifiers for {} records",
                identifiers.len(),
                values.nrows()
            )));
        }
        Ok(Self {
            identifiers,
            space,
            values,
        })
    }

    /// Like [`Dataset::from_array`], numbering records from 1 as their identifiers.
    pub fn from_unnamed<S: AsRef<str>>(fields: &[S], values: Array2<F>) -> ForelResult<Self> {
        let identifiers = (1..=values.nrows()).map(|i| i.to_string()).collect();
        Self::from_array(identifiers, fields, values)
    }

    /// Extracts the selected feature columns from a raw table.
    pub fn from_table(
        table: &Table,
        selector: &FieldSelector,
        identifier_column: Option<&str>,
        policy: ParsePolicy,
    ) -> ForelResult<Self> {
        let space = FeatureSpace::from_headers(&table.headers, selector)?;

        let id_column = identifier_column.and_then(|name| {
            let column = table.column(name);
            if column.is_none() {
                warn!(
                    "Identifier column `{}` not found, numbering records instead",
                    name
                );
            }
            column
        });

        let mut values = Array2::<F>::zeros((table.len(), space.dimension()));
        for (row, mut out) in values.rows_mut().into_iter().enumerate() {
            for (slot, (&column, field)) in space.columns().iter().zip(space.fields()).enumerate() {
                let raw = table.cell(row, column);
                let parsed = match parse_number(raw) {
                    Some(v) => v,
                    None if policy == ParsePolicy::Strict => {
                        return Err(ForelError::MalformedRecord {
                            row,
                            field: field.clone(),
                            value: raw.to_string(),
                        })
                    }
                    None => {
                        warn!(
                            "Record {}: field `{}` value {:?} is not numeric, using 0",
                            row, field, raw
                        );
                        0.0
                    }
                };
                out[slot] = F::from_f64(parsed).unwrap_or_else(F::zero);
            }
        }

        let identifiers = (0..table.len())
            .map(|row| match id_column {
                Some(column) => table.cell(row, column).to_string(),
                None => (row + 1).to_string(),
            })
            .collect();

        Ok(Self {
            identifiers,
            space,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    pub fn space(&self) -> &FeatureSpace {
        &self.space
    }

    pub fn fields(&self) -> &[String] {
        self.space.fields()
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn identifier(&self, index: usize) -> &str {
        &self.identifiers[index]
    }

    pub fn record(&self, index: usize) -> ArrayView1<'_, F> {
        self.values.row(index)
    }

    pub fn values(&self) -> ArrayView2<'_, F> {
        self.values.view()
    }

    pub fn value(&self, index: usize, field: &str) -> Option<F> {
        self.space.position(field).map(|col| self.values[[index, col]])
    }
}
