//! Volumetric blending of crude assays.

use crate::conversion::api_to_conversion_factor;
use crate::error::AssayError;
use crate::models::{BlendInputs, BlendResult, Category};
use crate::store::AssayStore;
use crate::yields::{WholeCrudeTable, YieldMatrix};

use ndarray::prelude::*;

/// Returns the weighted mean of each column of `values`.
///
/// Row `i` of `values` is weighted by `weights[i]`. Weights are scaled to sum to one before
/// they are applied, so each mean stays within the range of its column for any finite weights.
///
/// # Arguments
///
/// * `values`: Array of shape `(rows, columns)`
/// * `weights`: One non-negative weight per row
pub fn weighted_average(
    values: ArrayView2<f64>,
    weights: ArrayView1<f64>,
) -> Result<Array1<f64>, AssayError> {
    if values.nrows() != weights.len() {
        return Err(AssayError::Misaligned {
            weights: weights.len(),
            rows: values.nrows(),
        });
    }
    let total = weights.sum();
    if total == 0.0 {
        return Err(AssayError::AllWeightsZero);
    }
    if !total.is_finite() {
        return Err(AssayError::VolumeOverflow(total));
    }
    let normalised = &weights / total;
    Ok(normalised.dot(&values))
}

/// Check that two crude ID sequences are index aligned.
fn check_aligned(crude_ids: &[i64], rows: &[i64]) -> Result<(), AssayError> {
    if crude_ids != rows {
        return Err(AssayError::MisalignedIdentifiers {
            expected: crude_ids.to_vec(),
            found: rows.to_vec(),
        });
    }
    Ok(())
}

/// Blend yields and whole crude attributes by volume.
///
/// # Arguments
///
/// * `inputs`: Crude IDs and volumes
/// * `matrix`: Yields aligned with `inputs.crude_ids`
/// * `whole_crude`: Whole crude attributes aligned with `inputs.crude_ids`
pub fn blend(
    inputs: &BlendInputs,
    matrix: &YieldMatrix,
    whole_crude: &WholeCrudeTable,
) -> Result<BlendResult, AssayError> {
    check_aligned(&inputs.crude_ids, matrix.crude_ids())?;
    check_aligned(&inputs.crude_ids, whole_crude.crude_ids())?;
    if inputs.volumes.len() != inputs.crude_ids.len() {
        return Err(AssayError::Misaligned {
            weights: inputs.volumes.len(),
            rows: inputs.crude_ids.len(),
        });
    }

    let weights = ArrayView1::from(&inputs.volumes[..]);
    let blended_yields = weighted_average(matrix.yields(), weights)?;
    let attributes = weighted_average(whole_crude.attributes(), weights)?;
    let api = attributes[WholeCrudeTable::API];
    let sulphur_total = attributes[WholeCrudeTable::SULPHUR_TOTAL];
    let conversion_factor = api_to_conversion_factor(api)?;

    let yields: [f64; Category::ALL.len()] = blended_yields
        .to_vec()
        .try_into()
        .map_err(|found: Vec<f64>| AssayError::MisalignedColumns {
            expected: Category::ALL.len(),
            found: found.len(),
        })?;
    Ok(BlendResult::new(yields, api, sulphur_total, conversion_factor))
}

/// Blend the recommended assays of a set of crudes.
///
/// The yield and whole crude queries are issued concurrently. The blend fails as a whole if
/// either query fails or any crude lacks complete data.
///
/// # Arguments
///
/// * `store`: Assay store to query
/// * `inputs`: Validated crude IDs and volumes
#[tracing::instrument(level = "DEBUG", skip(store))]
pub async fn blend_crudes(
    store: &dyn AssayStore,
    inputs: &BlendInputs,
) -> Result<BlendResult, AssayError> {
    let (yield_rows, whole_crude_rows) = tokio::try_join!(
        store.query_yields(&inputs.crude_ids, true, true),
        store.query_whole_attributes(&inputs.crude_ids, true),
    )?;
    let matrix = YieldMatrix::from_rows(&inputs.crude_ids, &yield_rows)?;
    let whole_crude = WholeCrudeTable::from_rows(&inputs.crude_ids, &whole_crude_rows)?;
    tracing::debug!(
        crudes = ?matrix.names(),
        whole_crudes = ?whole_crude.names(),
        "blending assays"
    );
    blend(inputs, &matrix, &whole_crude)
}
