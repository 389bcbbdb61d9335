//! Parsing and normalisation of blend request parameters.

use crate::error::AssayError;
use crate::models::BlendInputs;

use std::collections::BTreeMap;

/// Separator between tokens of a list parameter.
const SEPARATOR: char = ',';

/// Split a list parameter into tokens.
///
/// Surrounding whitespace is removed from each token, but empty tokens are kept so that they
/// fail numeric parsing.
fn tokens(list: &str) -> impl Iterator<Item = &str> {
    list.split(SEPARATOR).map(str::trim)
}

/// Parse a comma separated list of volumes.
///
/// Every volume must be a finite, non-negative number.
pub fn parse_volumes(volumes: &str) -> Result<Vec<f64>, AssayError> {
    tokens(volumes)
        .map(|token| match token.parse::<f64>() {
            Ok(volume) if volume.is_finite() && volume >= 0.0 => Ok(volume),
            _ => Err(AssayError::InvalidVolume(token.to_string())),
        })
        .collect()
}

/// Parse a comma separated list of crude IDs.
///
/// Every crude ID must be a positive integer.
pub fn parse_ids(ids: &str) -> Result<Vec<i64>, AssayError> {
    tokens(ids)
        .map(|token| match token.parse::<i64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(AssayError::InvalidIdentifier(token.to_string())),
        })
        .collect()
}

/// Merge duplicate crude IDs by summing their volumes.
///
/// The result is sorted by ascending crude ID, regardless of input order.
pub fn aggregate(ids: &[i64], volumes: &[f64]) -> BlendInputs {
    let mut totals = BTreeMap::<i64, f64>::new();
    for (id, volume) in ids.iter().zip(volumes) {
        *totals.entry(*id).or_insert(0.0) += volume;
    }
    let (crude_ids, volumes) = totals.into_iter().unzip();
    BlendInputs { crude_ids, volumes }
}

/// Validate raw `ids` and `volumes` query parameters and turn them into [BlendInputs].
///
/// Checks are applied in a fixed order: presence, volumes, zero or overflowing total volume,
/// crude IDs, and finally matching lengths. A finite total also keeps every aggregated volume
/// finite.
///
/// # Arguments
///
/// * `ids`: Comma separated crude IDs
/// * `volumes`: Comma separated volumes, one per crude ID
pub fn parse_blend_inputs(
    ids: Option<&str>,
    volumes: Option<&str>,
) -> Result<BlendInputs, AssayError> {
    let (ids, volumes) = match (ids, volumes) {
        (Some(ids), Some(volumes)) => (ids, volumes),
        (None, Some(_)) => return Err(AssayError::MissingField("ids".to_string())),
        (Some(_), None) => return Err(AssayError::MissingField("volumes".to_string())),
        (None, None) => return Err(AssayError::MissingField("ids, volumes".to_string())),
    };

    let volumes = parse_volumes(volumes)?;
    let total: f64 = volumes.iter().sum();
    if total == 0.0 {
        return Err(AssayError::AllWeightsZero);
    }
    if !total.is_finite() {
        return Err(AssayError::VolumeOverflow(total));
    }

    let ids = parse_ids(ids)?;
    if ids.len() != volumes.len() {
        return Err(AssayError::LengthMismatch {
            ids: ids.len(),
            volumes: volumes.len(),
        });
    }

    Ok(aggregate(&ids, &volumes))
}
