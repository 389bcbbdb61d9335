//! Reshaping of assay store rows into dense, identifier aligned [ndarray] arrays.

use crate::error::AssayError;
use crate::models::{Category, WholeCrudeRow, YieldRow, WHOLE_CRUDE};

use ndarray::prelude::*;
use std::collections::HashMap;

/// Returns a map from crude ID to row index.
fn row_index(crude_ids: &[i64]) -> HashMap<i64, usize> {
    crude_ids
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index))
        .collect()
}

/// Returns the crude IDs whose row contains an empty cell.
fn incomplete_rows(crude_ids: &[i64], cells: &Array2<Option<f64>>) -> Vec<i64> {
    crude_ids
        .iter()
        .zip(cells.rows())
        .filter(|(_, row)| row.iter().any(Option::is_none))
        .map(|(id, _)| *id)
        .collect()
}

/// Yields of a set of crudes
///
/// One row per crude, in the order of the crude IDs given to [YieldMatrix::from_rows], and one
/// column per [Category] in [Category::ALL] order. Every cell holds a value.
#[derive(Clone, Debug, PartialEq)]
pub struct YieldMatrix {
    crude_ids: Vec<i64>,
    names: Vec<String>,
    yields: Array2<f64>,
}

impl YieldMatrix {
    /// Pivot yield rows into a matrix.
    ///
    /// Rows for products outside [Category::ALL] or for crudes that were not requested are
    /// ignored. A crude without a yield for every category is reported in
    /// [AssayError::IdentifiersNotFound].
    ///
    /// # Arguments
    ///
    /// * `crude_ids`: Unique crude IDs, defining the row order
    /// * `rows`: Yield rows returned by the assay store
    pub fn from_rows(crude_ids: &[i64], rows: &[YieldRow]) -> Result<Self, AssayError> {
        let index = row_index(crude_ids);
        let mut cells = Array2::<Option<f64>>::from_elem((crude_ids.len(), Category::ALL.len()), None);
        let mut seen = Array2::<bool>::from_elem(cells.raw_dim(), false);
        let mut names = vec![String::new(); crude_ids.len()];

        for row in rows {
            let Some(&i) = index.get(&row.crude_id) else {
                continue;
            };
            let Some(category) = Category::from_product_name(&row.product_name) else {
                tracing::trace!(crude_id = row.crude_id, product = %row.product_name, "ignoring yield");
                continue;
            };
            let j = category.index();
            if seen[[i, j]] {
                return Err(AssayError::InconsistentAssay {
                    crude_id: row.crude_id,
                    product: row.product_name.clone(),
                });
            }
            seen[[i, j]] = true;
            cells[[i, j]] = row.yield_percent;
            if names[i].is_empty() {
                names[i].clone_from(&row.name);
            }
        }

        let not_found = incomplete_rows(crude_ids, &cells);
        if !not_found.is_empty() {
            return Err(AssayError::IdentifiersNotFound(not_found));
        }

        Ok(YieldMatrix {
            crude_ids: crude_ids.to_vec(),
            names,
            yields: cells.mapv(Option::unwrap_or_default),
        })
    }

    /// Crude IDs, one per row.
    pub fn crude_ids(&self) -> &[i64] {
        &self.crude_ids
    }

    /// Crude names, one per row.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Yields in weight %, shape `(crudes, categories)`.
    pub fn yields(&self) -> ArrayView2<f64> {
        self.yields.view()
    }
}

/// Whole crude attributes of a set of crudes
///
/// One row per crude, aligned like [YieldMatrix]. Column 0 holds the API gravity and column 1
/// the total sulphur %.
#[derive(Clone, Debug, PartialEq)]
pub struct WholeCrudeTable {
    crude_ids: Vec<i64>,
    names: Vec<String>,
    attributes: Array2<f64>,
}

impl WholeCrudeTable {
    /// Column of the API gravity.
    pub const API: usize = 0;
    /// Column of the total sulphur %.
    pub const SULPHUR_TOTAL: usize = 1;

    /// Align whole crude rows with the given crude IDs.
    ///
    /// A crude without a row, or with a missing attribute, is reported in
    /// [AssayError::IdentifiersNotFound].
    pub fn from_rows(crude_ids: &[i64], rows: &[WholeCrudeRow]) -> Result<Self, AssayError> {
        let index = row_index(crude_ids);
        let mut cells = Array2::<Option<f64>>::from_elem((crude_ids.len(), 2), None);
        let mut seen = vec![false; crude_ids.len()];
        let mut names = vec![String::new(); crude_ids.len()];

        for row in rows {
            let Some(&i) = index.get(&row.crude_id) else {
                continue;
            };
            if seen[i] {
                return Err(AssayError::InconsistentAssay {
                    crude_id: row.crude_id,
                    product: WHOLE_CRUDE.to_string(),
                });
            }
            seen[i] = true;
            cells[[i, Self::API]] = row.api;
            cells[[i, Self::SULPHUR_TOTAL]] = row.sulphur_total;
            names[i].clone_from(&row.name);
        }

        let not_found = incomplete_rows(crude_ids, &cells);
        if !not_found.is_empty() {
            return Err(AssayError::IdentifiersNotFound(not_found));
        }

        Ok(WholeCrudeTable {
            crude_ids: crude_ids.to_vec(),
            names,
            attributes: cells.mapv(Option::unwrap_or_default),
        })
    }

    pub fn crude_ids(&self) -> &[i64] {
        &self.crude_ids
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Attributes, shape `(crudes, 2)`.
    pub fn attributes(&self) -> ArrayView2<f64> {
        self.attributes.view()
    }
}
