//! PostgreSQL/PostGIS write side.
//!
//! Two statements per imported row: a conflict-tolerant device upsert by
//! natural key, and an unconditional observation append. Locations are
//! stored as WGS84 geography points built with
//! `ST_SetSRID(ST_MakePoint(lon, lat), 4326)`.

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::NormalizedSighting;

/// Source tag written on every observation from this importer.
const SOURCE_TAG: &str = "wigle";

/// Outcome of resolving a device identity after the upsert.
#[derive(Debug, Clone, Copy)]
pub struct DeviceHandle {
    /// Generated identifier of the device row.
    pub id: Uuid,
    /// Whether this run's upsert created the row.
    pub created: bool,
}

/// The destination database, holding one connection for the run.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the destination.
    ///
    /// The importer is strictly sequential, so the pool is capped at a
    /// single connection held for the lifetime of the run.
    pub async fn connect(dsn: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new().max_connections(1).connect(dsn).await?;
        Ok(Self { pool })
    }

    /// Upsert a device by natural key and resolve its generated id.
    ///
    /// First-write-wins: a conflicting insert changes nothing. The primary
    /// path is the atomic `RETURNING id`; when the insert was a conflict
    /// no-op, a follow-up select resolves the existing row. `None` means
    /// the identity could not be resolved at all, in which case the caller
    /// skips the observation silently.
    pub async fn upsert_device(
        &self,
        sighting: &NormalizedSighting,
    ) -> StoreResult<Option<DeviceHandle>> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO devices (device_type, device_id, name, location, first_seen, last_seen)
            VALUES ($1::device_type, $2, $3,
                    ST_SetSRID(ST_MakePoint($4, $5), 4326)::geography, $6, $7)
            ON CONFLICT (device_type, device_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(sighting.device_type.as_str())
        .bind(&sighting.device_id)
        .bind(&sighting.name)
        .bind(sighting.longitude)
        .bind(sighting.latitude)
        .bind(sighting.timestamp)
        .bind(sighting.timestamp)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(Some(DeviceHandle {
                id: row.try_get("id")?,
                created: true,
            }));
        }

        let existing = sqlx::query(
            "SELECT id FROM devices WHERE device_type = $1::device_type AND device_id = $2",
        )
        .bind(sighting.device_type.as_str())
        .bind(&sighting.device_id)
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            Some(row) => Ok(Some(DeviceHandle {
                id: row.try_get("id")?,
                created: false,
            })),
            None => Ok(None),
        }
    }

    /// Append one observation for a resolved device.
    pub async fn insert_observation(
        &self,
        device: Uuid,
        sighting: &NormalizedSighting,
    ) -> StoreResult<()> {
        let raw_json = serde_json::Value::Object(sighting.raw.clone()).to_string();

        sqlx::query(
            r#"
            INSERT INTO device_observations (device_id, timestamp, location, signal, source, raw_json)
            VALUES ($1, $2, ST_SetSRID(ST_MakePoint($3, $4), 4326)::geography, $5, $6, $7::json)
            "#,
        )
        .bind(device)
        .bind(sighting.timestamp)
        .bind(sighting.longitude)
        .bind(sighting.latitude)
        .bind(sighting.signal)
        .bind(SOURCE_TAG)
        .bind(raw_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Release the connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
