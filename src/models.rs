//! Data types and associated functions and methods

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{Display, IntoStaticStr};
use validator::Validate;

/// Product name of the pseudo-category holding whole crude attributes.
pub const WHOLE_CRUDE: &str = "whole_crude";

/// Yield categories (distillation cuts) reported by a blend
///
/// Variants are declared lightest cut first; this order is the column order of
/// the yield matrix and the field order of a [BlendResult].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, IntoStaticStr, Ord, PartialEq, PartialOrd)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    LightGasoline,
    LightNaphtha,
    HeavyNaphtha,
    Kerosene,
    AtmGasOil,
    LightVacGasOil,
    HeavyVacGasOil,
    VacResidue,
}

impl Category {
    /// All categories, in output order.
    pub const ALL: [Category; 8] = [
        Category::LightGasoline,
        Category::LightNaphtha,
        Category::HeavyNaphtha,
        Category::Kerosene,
        Category::AtmGasOil,
        Category::LightVacGasOil,
        Category::HeavyVacGasOil,
        Category::VacResidue,
    ];

    /// Returns the product name used by the assay store for this category.
    pub fn product_name(self) -> &'static str {
        self.into()
    }

    /// Returns the category with the given product name, if any.
    pub fn from_product_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.product_name() == name)
    }

    /// Returns the column index of this category.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Query parameters of the crude blend endpoint
#[derive(Debug, Default, Deserialize, PartialEq, Validate)]
pub struct BlendQuery {
    /// Comma separated crude IDs
    #[validate(required)]
    pub ids: Option<String>,
    /// Comma separated volumes (or ratios), one per crude ID
    #[validate(required)]
    pub volumes: Option<String>,
}

/// Query parameters of the crude reference endpoint
#[derive(Debug, Default, Deserialize, PartialEq, Validate)]
pub struct CrudeQuery {
    /// Optional comma separated crude IDs
    pub ids: Option<String>,
}

/// Validated blend inputs
///
/// Crude IDs are unique and sorted ascending; `volumes[i]` is the total volume
/// requested for `crude_ids[i]`.
#[derive(Clone, Debug, PartialEq)]
pub struct BlendInputs {
    pub crude_ids: Vec<i64>,
    pub volumes: Vec<f64>,
}

/// One categorised yield row from the assay store
#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct YieldRow {
    pub crude_id: i64,
    pub name: String,
    pub product_name: String,
    /// Yield in weight %
    pub yield_percent: Option<f64>,
    /// Cut start temperature in °C, used for ordering
    pub cut_start: Option<f64>,
}

/// Whole crude attributes from the assay store
#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct WholeCrudeRow {
    pub crude_id: i64,
    pub name: String,
    /// API gravity in degrees
    pub api: Option<f64>,
    /// Total sulphur in weight %
    pub sulphur_total: Option<f64>,
}

/// Result of a crude blend
///
/// Serialises to a flat JSON object: one field per [Category] in
/// [Category::ALL] order, followed by `api`, `sulphur_total_%` and
/// `conversion_factor`.
#[derive(Clone, Debug, PartialEq)]
pub struct BlendResult {
    /// Blended yield per category, indexed by [Category::index]
    pub yields: [f64; 8],
    /// Blended API gravity
    pub api: f64,
    /// Blended total sulphur in weight %
    pub sulphur_total: f64,
    /// Volume to mass conversion factor derived from the blended API gravity
    pub conversion_factor: f64,
}

impl BlendResult {
    /// Return a new BlendResult.
    pub fn new(yields: [f64; 8], api: f64, sulphur_total: f64, conversion_factor: f64) -> Self {
        BlendResult {
            yields,
            api,
            sulphur_total,
            conversion_factor,
        }
    }

    /// Returns the blended yield of a category.
    pub fn yield_of(&self, category: Category) -> f64 {
        self.yields[category.index()]
    }
}

impl Serialize for BlendResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(Category::ALL.len() + 3))?;
        for category in Category::ALL {
            map.serialize_entry(category.product_name(), &self.yield_of(category))?;
        }
        map.serialize_entry("api", &self.api)?;
        map.serialize_entry("sulphur_total_%", &self.sulphur_total)?;
        map.serialize_entry("conversion_factor", &self.conversion_factor)?;
        map.end()
    }
}
