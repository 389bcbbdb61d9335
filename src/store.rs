//! Access to the crude assay database.

use crate::cli::CommandLineArgs;
use crate::error::AssayError;
use crate::models::{WholeCrudeRow, YieldRow, WHOLE_CRUDE};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Assay store trait.
///
/// Defines the read-only queries the server issues against the assay database. Crude ID
/// arguments are bound as a set; their order does not matter.
#[async_trait]
pub trait AssayStore: Send + Sync {
    /// Return every row of the crude table, one JSON object per crude.
    async fn crudes(&self) -> Result<Vec<Value>, AssayError>;

    /// Return the crude rows for the given crude IDs, joined with their location.
    ///
    /// # Arguments
    ///
    /// * `crude_ids`: Crude IDs to look up
    async fn crudes_by_id(&self, crude_ids: &[i64]) -> Result<Vec<Value>, AssayError>;

    /// Return categorised yield rows, ordered by crude ID then by cut start temperature.
    ///
    /// # Arguments
    ///
    /// * `crude_ids`: Crude IDs to look up
    /// * `recommended_only`: Only return rows of the recommended assay of each crude
    /// * `summable_only`: Only return rows of products included in the sum of yields
    async fn query_yields(
        &self,
        crude_ids: &[i64],
        recommended_only: bool,
        summable_only: bool,
    ) -> Result<Vec<YieldRow>, AssayError>;

    /// Return the whole crude attributes (API gravity, total sulphur) of each crude.
    ///
    /// # Arguments
    ///
    /// * `crude_ids`: Crude IDs to look up
    /// * `recommended_only`: Only return rows of the recommended assay of each crude
    async fn query_whole_attributes(
        &self,
        crude_ids: &[i64],
        recommended_only: bool,
    ) -> Result<Vec<WholeCrudeRow>, AssayError>;
}

const CRUDES: &str = r#"
    SELECT to_jsonb(c) AS record
    FROM crude AS c
    ORDER BY c.crude_id
"#;

const CRUDES_BY_ID: &str = r#"
    SELECT to_jsonb(c) || jsonb_build_object(
               'region', l.region,
               'region_short', l.region_short,
               'country', l.country,
               'country_iso', l.country_iso
           ) AS record
    FROM crude AS c
    INNER JOIN location AS l ON c.location_id = l.location_id
    WHERE c.crude_id = ANY($1::BIGINT[])
    ORDER BY c.crude_id
"#;

const YIELDS: &str = r#"
    SELECT c.crude_id::BIGINT AS crude_id,
           COALESCE(c.name, '') AS name,
           p.product_name,
           a."yield_w_%"::DOUBLE PRECISION AS yield_percent,
           p."cut_start_C"::DOUBLE PRECISION AS cut_start
    FROM crude AS c
    INNER JOIN assay AS a ON c.crude_id = a.crude_id
    INNER JOIN product AS p ON a.product_id = p.product_id
    WHERE c.crude_id = ANY($1::BIGINT[])
        AND (NOT $2::BOOLEAN OR a.recommended IS TRUE)
        AND (NOT $3::BOOLEAN OR p.include_in_sum_yields IS TRUE)
    ORDER BY c.crude_id, p."cut_start_C" ASC
"#;

const WHOLE_ATTRIBUTES: &str = r#"
    SELECT c.crude_id::BIGINT AS crude_id,
           COALESCE(c.name, '') AS name,
           a.api::DOUBLE PRECISION AS api,
           a."sulphur_total_%"::DOUBLE PRECISION AS sulphur_total
    FROM crude AS c
    INNER JOIN assay AS a ON c.crude_id = a.crude_id
    INNER JOIN product AS p ON a.product_id = p.product_id
    WHERE c.crude_id = ANY($1::BIGINT[])
        AND (NOT $2::BOOLEAN OR a.recommended IS TRUE)
        AND p.product_name = $3
    ORDER BY c.crude_id
"#;

/// PostgreSQL assay store.
///
/// Implements [AssayStore] on top of a connection pool. Each query checks a connection out of
/// the pool for its own duration only.
#[derive(Clone, Debug)]
pub struct PgAssayStore {
    pool: PgPool,
}

impl PgAssayStore {
    /// Create a new PostgreSQL assay store from an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new PostgreSQL assay store from command line arguments.
    ///
    /// Connections are opened on first use, so an unreachable database surfaces as an error of
    /// the first request rather than at startup.
    ///
    /// # Arguments
    ///
    /// * `args`: Command line arguments
    pub fn connect_lazy(args: &CommandLineArgs) -> Result<Self, AssayError> {
        let pool = PgPoolOptions::new()
            .max_connections(args.database_max_connections)
            .acquire_timeout(Duration::from_secs(args.database_acquire_timeout))
            .connect_lazy(&args.database_url)?;
        Ok(Self::new(pool))
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await
    }
}

#[async_trait]
impl AssayStore for PgAssayStore {
    #[tracing::instrument(level = "DEBUG", skip(self))]
    async fn crudes(&self) -> Result<Vec<Value>, AssayError> {
        let records = sqlx::query_scalar::<_, Value>(CRUDES)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    #[tracing::instrument(level = "DEBUG", skip(self))]
    async fn crudes_by_id(&self, crude_ids: &[i64]) -> Result<Vec<Value>, AssayError> {
        let records = sqlx::query_scalar::<_, Value>(CRUDES_BY_ID)
            .bind(crude_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    #[tracing::instrument(level = "DEBUG", skip(self))]
    async fn query_yields(
        &self,
        crude_ids: &[i64],
        recommended_only: bool,
        summable_only: bool,
    ) -> Result<Vec<YieldRow>, AssayError> {
        let rows = sqlx::query_as::<_, YieldRow>(YIELDS)
            .bind(crude_ids)
            .bind(recommended_only)
            .bind(summable_only)
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!(rows = rows.len(), "fetched yields");
        Ok(rows)
    }

    #[tracing::instrument(level = "DEBUG", skip(self))]
    async fn query_whole_attributes(
        &self,
        crude_ids: &[i64],
        recommended_only: bool,
    ) -> Result<Vec<WholeCrudeRow>, AssayError> {
        let rows = sqlx::query_as::<_, WholeCrudeRow>(WHOLE_ATTRIBUTES)
            .bind(crude_ids)
            .bind(recommended_only)
            .bind(WHOLE_CRUDE)
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!(rows = rows.len(), "fetched whole crude attributes");
        Ok(rows)
    }
}
