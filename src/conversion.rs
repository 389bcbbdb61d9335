//! Unit conversions for crude oil properties.

use crate::error::AssayError;

/// Barrels per cubic metre.
const BARRELS_PER_M3: f64 = 6.28981;

/// Returns the volume to mass conversion factor (barrels per tonne) of a crude with the given
/// API gravity.
///
/// The specific gravity is `141.5 / (api + 131.5)`, so the factor is only defined for
/// `api > -131.5`.
///
/// # Arguments
///
/// * `api`: API gravity in degrees
pub fn api_to_conversion_factor(api: f64) -> Result<f64, AssayError> {
    if !api.is_finite() || api <= -131.5 {
        return Err(AssayError::InvalidGravityDomain(api));
    }
    Ok(BARRELS_PER_M3 / (141.5 / (api + 131.5)))
}
