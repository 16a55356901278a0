use crate::core::float::ForelFloat;
use crate::distances::{DistanceMetric, EuclideanDistance};
use crate::error::{ForelError, ForelResult};
use ndarray::ArrayView1;
use serde::Deserialize;

/// Policy deciding which table columns form the feature vector.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldSelector {
    /// An explicit, ordered list of column names.
    Explicit { fields: Vec<String> },
    /// Every column whose name starts with `prefix`, in table order, minus `exclude`.
    Prefix {
        prefix: String,
        #[serde(default)]
        exclude: Vec<String>,
    },
}

impl FieldSelector {
    pub fn explicit<S: AsRef<str>>(fields: &[S]) -> Self {
        FieldSelector::Explicit {
            fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
        }
    }

    pub fn prefix(prefix: &str, exclude: &[&str]) -> Self {
        FieldSelector::Prefix {
            prefix: prefix.to_string(),
            exclude: exclude.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Picks the feature columns out of `headers`, returning `(column index, name)` pairs.
    pub fn select(&self, headers: &[String]) -> ForelResult<Vec<(usize, String)>> {
        let selected: Vec<(usize, String)> = match self {
            FieldSelector::Explicit { fields } => fields
                .iter()
                .map(|field| {
                    headers
                        .iter()
                        .position(|h| h == field)
                        .map(|idx| (idx, field.clone()))
                        .ok_or_else(|| {
                            ForelError::Configuration(format!(
                                "feature field `{}` is not a column of the dataset",
                                field
                            ))
                        })
                })
                .collect::<ForelResult<_>>()?,
            FieldSelector::Prefix { prefix, exclude } => headers
                .iter()
                .enumerate()
                .filter(|(_, h)| h.starts_with(prefix.as_str()) && !exclude.contains(h))
                .map(|(idx, h)| (idx, h.clone()))
                .collect(),
        };

        if selected.is_empty() {
            return Err(ForelError::Configuration(format!(
                "feature selection {:?} matched no fields",
                self
            )));
        }
        Ok(selected)
    }
}

/// The vector space records live in: an ordered set of feature fields and the
/// Euclidean distance restricted to them.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSpace {
    fields: Vec<String>,
    columns: Vec<usize>,
}

impl FeatureSpace {
    /// Builds the feature space for a table with the given column names.
    pub fn from_headers(headers: &[String], selector: &FieldSelector) -> ForelResult<Self> {
        let (columns, fields) = selector.select(headers)?.into_iter().unzip();
        Ok(Self { fields, columns })
    }

    /// Feature space over an already extracted feature matrix whose columns are `fields`.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> ForelResult<Self> {
        if fields.is_empty() {
            return Err(ForelError::Configuration(
                "feature field set is empty".to_string(),
            ));
        }
        Ok(Self {
            fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
            columns: (0..fields.len()).collect(),
        })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Column positions of the feature fields in the source table.
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn dimension(&self) -> usize {
        self.fields.len()
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// Euclidean distance between two feature vectors of this space.
    pub fn distance<F: ForelFloat>(&self, a: &ArrayView1<F>, b: &ArrayView1<F>) -> ForelResult<F> {
        if a.len() != self.dimension() {
            return Err(ForelError::Configuration(format!(
                "record has {} features, space has {}",
                a.len(),
                self.dimension()
            )));
        }
        Ok(EuclideanDistance.compute(a, b)?)
    }
}
