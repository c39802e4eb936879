//! Calibration coordinate repository contract and SQLite implementation.
//!
//! # Invariants
//! - One record per label type; `put_coordinates` replaces the whole record,
//!   unset anchors included.
//! - Records are validated before persistence. Bulk writes validate every
//!   record before writing any, and apply all of them or none.
//! - A missing record is `Ok(None)`; default fallback is the caller's job.

use crate::model::coordinates::{AnchorPoint, LabelCoordinates};
use crate::model::label_type::LabelType;
use crate::repo::{parse_label_type, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

const COORDINATES_SELECT_SQL: &str = "SELECT
    label_type,
    ila1_x, ila1_y,
    ila2_x, ila2_y,
    rla1_x, rla1_y,
    rla2_x, rla2_y,
    font_size,
    updated_at,
    updated_by
FROM label_coordinates";

/// Persisted calibration plus audit metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRecord {
    pub coordinates: LabelCoordinates,
    pub updated_at: i64,
    pub updated_by: Option<String>,
}

/// Repository interface for calibration records.
pub trait CoordinateRepository {
    fn get_coordinates(&self, label_type: LabelType) -> RepoResult<Option<CoordinateRecord>>;
    /// Upserts the record keyed by `coordinates.label_type`.
    fn put_coordinates(
        &self,
        coordinates: &LabelCoordinates,
        updated_at: i64,
        updated_by: Option<&str>,
    ) -> RepoResult<()>;
    /// Upserts every record atomically. A later record for the same type
    /// replaces an earlier one.
    fn put_all_coordinates(
        &self,
        records: &[LabelCoordinates],
        updated_at: i64,
        updated_by: Option<&str>,
    ) -> RepoResult<()>;
    /// All stored records in registry order.
    fn list_coordinates(&self) -> RepoResult<Vec<CoordinateRecord>>;
}

impl<T: CoordinateRepository + ?Sized> CoordinateRepository for &T {
    fn get_coordinates(&self, label_type: LabelType) -> RepoResult<Option<CoordinateRecord>> {
        (**self).get_coordinates(label_type)
    }

    fn put_coordinates(
        &self,
        coordinates: &LabelCoordinates,
        updated_at: i64,
        updated_by: Option<&str>,
    ) -> RepoResult<()> {
        (**self).put_coordinates(coordinates, updated_at, updated_by)
    }

    fn put_all_coordinates(
        &self,
        records: &[LabelCoordinates],
        updated_at: i64,
        updated_by: Option<&str>,
    ) -> RepoResult<()> {
        (**self).put_all_coordinates(records, updated_at, updated_by)
    }

    fn list_coordinates(&self) -> RepoResult<Vec<CoordinateRecord>> {
        (**self).list_coordinates()
    }
}

/// SQLite-backed coordinate repository.
pub struct SqliteCoordinateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCoordinateRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CoordinateRepository for SqliteCoordinateRepository<'_> {
    fn get_coordinates(&self, label_type: LabelType) -> RepoResult<Option<CoordinateRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COORDINATES_SELECT_SQL} WHERE label_type = ?1;"))?;
        let mut rows = stmt.query([label_type.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_coordinates_row(row)?));
        }
        Ok(None)
    }

    fn put_coordinates(
        &self,
        coordinates: &LabelCoordinates,
        updated_at: i64,
        updated_by: Option<&str>,
    ) -> RepoResult<()> {
        coordinates.validate()?;
        upsert_coordinates(self.conn, coordinates, updated_at, updated_by)
    }

    fn put_all_coordinates(
        &self,
        records: &[LabelCoordinates],
        updated_at: i64,
        updated_by: Option<&str>,
    ) -> RepoResult<()> {
        for coordinates in records {
            coordinates.validate()?;
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for coordinates in records {
            upsert_coordinates(&tx, coordinates, updated_at, updated_by)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn list_coordinates(&self) -> RepoResult<Vec<CoordinateRecord>> {
        let mut stmt = self.conn.prepare(&format!("{COORDINATES_SELECT_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_coordinates_row(row)?);
        }
        records.sort_by_key(|record| record.coordinates.label_type);
        Ok(records)
    }
}

fn upsert_coordinates(
    conn: &Connection,
    coordinates: &LabelCoordinates,
    updated_at: i64,
    updated_by: Option<&str>,
) -> RepoResult<()> {
    let (ila1_x, ila1_y) = split_point(coordinates.ila1);
    let (ila2_x, ila2_y) = split_point(coordinates.ila2);
    let (rla1_x, rla1_y) = split_point(coordinates.rla1);
    let (rla2_x, rla2_y) = split_point(coordinates.rla2);

    conn.execute(
        "INSERT INTO label_coordinates (
            label_type,
            ila1_x, ila1_y,
            ila2_x, ila2_y,
            rla1_x, rla1_y,
            rla2_x, rla2_y,
            font_size,
            updated_at,
            updated_by
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT (label_type) DO UPDATE SET
            ila1_x = excluded.ila1_x,
            ila1_y = excluded.ila1_y,
            ila2_x = excluded.ila2_x,
            ila2_y = excluded.ila2_y,
            rla1_x = excluded.rla1_x,
            rla1_y = excluded.rla1_y,
            rla2_x = excluded.rla2_x,
            rla2_y = excluded.rla2_y,
            font_size = excluded.font_size,
            updated_at = excluded.updated_at,
            updated_by = excluded.updated_by;",
        params![
            coordinates.label_type.as_str(),
            ila1_x,
            ila1_y,
            ila2_x,
            ila2_y,
            rla1_x,
            rla1_y,
            rla2_x,
            rla2_y,
            coordinates.font_size,
            updated_at,
            updated_by,
        ],
    )?;
    Ok(())
}

fn split_point(point: Option<AnchorPoint>) -> (Option<f64>, Option<f64>) {
    match point {
        Some(point) => (Some(point.x), Some(point.y)),
        None => (None, None),
    }
}

fn join_point(x: Option<f64>, y: Option<f64>, column: &str) -> RepoResult<Option<AnchorPoint>> {
    match (x, y) {
        (Some(x), Some(y)) => Ok(Some(AnchorPoint::new(x, y))),
        (None, None) => Ok(None),
        _ => Err(RepoError::InvalidData(format!(
            "half-set anchor in label_coordinates.{column}"
        ))),
    }
}

fn parse_coordinates_row(row: &Row<'_>) -> RepoResult<CoordinateRecord> {
    let type_text: String = row.get("label_type")?;
    let coordinates = LabelCoordinates {
        label_type: parse_label_type(&type_text, "label_coordinates.label_type")?,
        ila1: join_point(row.get("ila1_x")?, row.get("ila1_y")?, "ila1")?,
        ila2: join_point(row.get("ila2_x")?, row.get("ila2_y")?, "ila2")?,
        rla1: join_point(row.get("rla1_x")?, row.get("rla1_y")?, "rla1")?,
        rla2: join_point(row.get("rla2_x")?, row.get("rla2_y")?, "rla2")?,
        font_size: row.get("font_size")?,
    };

    Ok(CoordinateRecord {
        coordinates,
        updated_at: row.get("updated_at")?,
        updated_by: row.get("updated_by")?,
    })
}
