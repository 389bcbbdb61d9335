use crate::error::AssayError;
use crate::models::*;
use crate::store::AssayStore;

use async_trait::async_trait;
use serde_json::{json, Value};

/// Cut start temperatures in °C, one per [Category].
const CUT_STARTS: [f64; 8] = [20.0, 70.0, 100.0, 150.0, 230.0, 350.0, 450.0, 550.0];

/// Recommended yields of crude 3 in the fixture store.
pub(crate) const CHARLIE_YIELDS: [f64; 8] = [3.0, 7.0, 12.0, 15.0, 20.0, 10.0, 8.0, 25.0];

/// Create yield rows for every category, in cut order.
pub(crate) fn yield_rows(crude_id: i64, name: &str, yields: [f64; 8]) -> Vec<YieldRow> {
    Category::ALL
        .into_iter()
        .zip(yields)
        .zip(CUT_STARTS)
        .map(|((category, yield_percent), cut_start)| YieldRow {
            crude_id,
            name: name.to_string(),
            product_name: category.product_name().to_string(),
            yield_percent: Some(yield_percent),
            cut_start: Some(cut_start),
        })
        .collect()
}

/// Create a whole crude row.
pub(crate) fn whole_crude_row(crude_id: i64, name: &str, api: f64, sulphur: f64) -> WholeCrudeRow {
    WholeCrudeRow {
        crude_id,
        name: name.to_string(),
        api: Some(api),
        sulphur_total: Some(sulphur),
    }
}

/// One row of the assay table joined with its product.
#[derive(Clone, Debug)]
pub(crate) struct AssayRecord {
    pub crude_id: i64,
    pub name: &'static str,
    pub product_name: &'static str,
    pub recommended: bool,
    pub include_in_sum_yields: bool,
    pub cut_start: f64,
    pub yield_percent: Option<f64>,
    pub api: Option<f64>,
    pub sulphur_total: Option<f64>,
}

/// Create the assay records of one complete assay.
fn assay(
    crude_id: i64,
    name: &'static str,
    recommended: bool,
    yields: [f64; 8],
    api: f64,
    sulphur: f64,
) -> Vec<AssayRecord> {
    let mut records: Vec<AssayRecord> = Category::ALL
        .into_iter()
        .zip(yields)
        .zip(CUT_STARTS)
        .map(|((category, yield_percent), cut_start)| AssayRecord {
            crude_id,
            name,
            product_name: category.product_name(),
            recommended,
            include_in_sum_yields: true,
            cut_start,
            yield_percent: Some(yield_percent),
            api: None,
            sulphur_total: None,
        })
        .collect();
    records.push(AssayRecord {
        crude_id,
        name,
        product_name: WHOLE_CRUDE,
        recommended,
        include_in_sum_yields: false,
        cut_start: -200.0,
        yield_percent: Some(100.0),
        api: Some(api),
        sulphur_total: Some(sulphur),
    });
    records
}

/// In-memory assay store emulating the joins and filters of the assay database.
#[derive(Debug, Default)]
pub(crate) struct MemoryAssayStore {
    pub records: Vec<AssayRecord>,
    /// `(crude, location)` rows
    pub crudes: Vec<(Value, Value)>,
    /// Fail every query as if the database could not be reached
    pub unavailable: bool,
}

impl MemoryAssayStore {
    fn check_available(&self) -> Result<(), AssayError> {
        if self.unavailable {
            return Err(AssayError::UpstreamUnavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl AssayStore for MemoryAssayStore {
    async fn crudes(&self) -> Result<Vec<Value>, AssayError> {
        self.check_available()?;
        Ok(self.crudes.iter().map(|(crude, _)| crude.clone()).collect())
    }

    async fn crudes_by_id(&self, crude_ids: &[i64]) -> Result<Vec<Value>, AssayError> {
        self.check_available()?;
        Ok(self
            .crudes
            .iter()
            .filter(|(crude, _)| {
                crude["crude_id"]
                    .as_i64()
                    .is_some_and(|id| crude_ids.contains(&id))
            })
            .map(|(crude, location)| {
                let mut record = crude.clone();
                if let (Some(object), Some(location)) = (record.as_object_mut(), location.as_object())
                {
                    for key in ["region", "region_short", "country", "country_iso"] {
                        object.insert(key.to_string(), location[key].clone());
                    }
                }
                record
            })
            .collect())
    }

    async fn query_yields(
        &self,
        crude_ids: &[i64],
        recommended_only: bool,
        summable_only: bool,
    ) -> Result<Vec<YieldRow>, AssayError> {
        self.check_available()?;
        let mut records: Vec<&AssayRecord> = self
            .records
            .iter()
            .filter(|r| crude_ids.contains(&r.crude_id))
            .filter(|r| !recommended_only || r.recommended)
            .filter(|r| !summable_only || r.include_in_sum_yields)
            .collect();
        records.sort_by(|a, b| {
            a.crude_id
                .cmp(&b.crude_id)
                .then(a.cut_start.total_cmp(&b.cut_start))
        });
        Ok(records
            .into_iter()
            .map(|r| YieldRow {
                crude_id: r.crude_id,
                name: r.name.to_string(),
                product_name: r.product_name.to_string(),
                yield_percent: r.yield_percent,
                cut_start: Some(r.cut_start),
            })
            .collect())
    }

    async fn query_whole_attributes(
        &self,
        crude_ids: &[i64],
        recommended_only: bool,
    ) -> Result<Vec<WholeCrudeRow>, AssayError> {
        self.check_available()?;
        let mut rows: Vec<WholeCrudeRow> = self
            .records
            .iter()
            .filter(|r| crude_ids.contains(&r.crude_id))
            .filter(|r| !recommended_only || r.recommended)
            .filter(|r| r.product_name == WHOLE_CRUDE)
            .map(|r| WholeCrudeRow {
                crude_id: r.crude_id,
                name: r.name.to_string(),
                api: r.api,
                sulphur_total: r.sulphur_total,
            })
            .collect();
        rows.sort_by_key(|row| row.crude_id);
        Ok(rows)
    }
}

/// Create an assay store holding the test crudes.
///
/// * 1 Alpha: all yields 10, API 30, sulphur 1
/// * 2 Bravo: all yields 20, API 40, sulphur 2
/// * 3 Charlie: [CHARLIE_YIELDS], API 35, sulphur 0.5, plus an older unrecommended assay
/// * 4 Delta: no vacuum residue yield
/// * 5 Echo: no whole crude record
pub(crate) fn fixture_store() -> MemoryAssayStore {
    let mut records = Vec::new();
    records.extend(assay(1, "Alpha", true, [10.0; 8], 30.0, 1.0));
    records.push(AssayRecord {
        crude_id: 1,
        name: "Alpha",
        product_name: "butanes",
        recommended: true,
        include_in_sum_yields: false,
        cut_start: -10.0,
        yield_percent: Some(1.5),
        api: None,
        sulphur_total: None,
    });
    records.extend(assay(2, "Bravo", true, [20.0; 8], 40.0, 2.0));
    records.extend(assay(3, "Charlie", true, CHARLIE_YIELDS, 35.0, 0.5));
    records.extend(assay(3, "Charlie", false, [99.0; 8], 10.0, 9.0));
    records.extend(
        assay(4, "Delta", true, [12.5; 8], 28.0, 1.2)
            .into_iter()
            .filter(|r| r.product_name != Category::VacResidue.product_name()),
    );
    records.extend(
        assay(5, "Echo", true, [12.5; 8], 28.0, 1.2)
            .into_iter()
            .filter(|r| r.product_name != WHOLE_CRUDE),
    );

    let crudes = [
        (1, "Alpha", "ME", "Saudi Arabia", "SA"),
        (2, "Bravo", "NSEA", "Norway", "NO"),
        (3, "Charlie", "AFR", "Nigeria", "NG"),
    ]
    .into_iter()
    .map(|(crude_id, name, region, country, country_iso)| {
        (
            json!({"crude_id": crude_id, "name": name, "location_id": crude_id}),
            json!({
                "location_id": crude_id,
                "region": region,
                "region_short": region,
                "country": country,
                "country_iso": country_iso,
            }),
        )
    })
    .collect();

    MemoryAssayStore {
        records,
        crudes,
        unavailable: false,
    }
}

/// Create an assay store whose queries always fail.
pub(crate) fn unavailable_store() -> MemoryAssayStore {
    MemoryAssayStore {
        unavailable: true,
        ..Default::default()
    }
}
