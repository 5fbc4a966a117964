//! Equipment repository.

use rusqlite::{params, Connection, Row};

use crate::model::{Equipment, EquipmentRole};

use super::{Database, DatabaseError};

fn from_row(row: &Row<'_>) -> Result<Equipment, DatabaseError> {
    let role: String = row.get("role")?;
    Ok(Equipment {
        id: row.get("id")?,
        system_id: row.get("system_id")?,
        role: EquipmentRole::parse(&role).ok_or_else(|| DatabaseError::Decode {
            table: "equipment",
            reason: format!("unknown role '{role}'"),
        })?,
        manufacturer: row.get("manufacturer")?,
        model: row.get("model")?,
        serial: row.get("serial")?,
        tonnage: row.get("tonnage")?,
        refrigerant_type: row.get("refrigerant_type")?,
        notes: row.get("notes")?,
    })
}

pub(crate) fn insert_with_conn(conn: &Connection, item: &Equipment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO equipment (id, system_id, role, manufacturer, model, serial, tonnage,
         refrigerant_type, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            item.id,
            item.system_id,
            item.role.as_str(),
            item.manufacturer,
            item.model,
            item.serial,
            item.tonnage,
            item.refrigerant_type,
            item.notes,
        ],
    )?;
    Ok(())
}

pub fn insert(db: &Database, item: &Equipment) -> Result<(), DatabaseError> {
    db.with_conn(|conn| insert_with_conn(conn, item))
}

pub fn find_by_id(db: &Database, id: &str) -> Result<Option<Equipment>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM equipment WHERE id = ?1")?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(from_row(row)?)),
            None => Ok(None),
        }
    })
}

pub fn find_by_system(db: &Database, system_id: &str) -> Result<Vec<Equipment>, DatabaseError> {
    db.with_conn(|conn| find_by_system_with_conn(conn, system_id))
}

pub(crate) fn find_by_system_with_conn(
    conn: &Connection,
    system_id: &str,
) -> Result<Vec<Equipment>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM equipment WHERE system_id = ?1 ORDER BY role ASC")?;
    let mut rows = stmt.query(params![system_id])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(from_row(row)?);
    }
    Ok(items)
}

pub fn delete(db: &Database, id: &str) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute("DELETE FROM equipment WHERE id = ?1", params![id])?;
        Ok(())
    })
}

pub fn count_by_system(db: &Database, system_id: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM equipment WHERE system_id = ?1",
            params![system_id],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

/// Largest rated tonnage across a system's equipment; the evaluator's
/// fallback when the form leaves tonnage blank.
pub fn max_tonnage_for_system(db: &Database, system_id: &str) -> Result<Option<f64>, DatabaseError> {
    db.with_conn(|conn| {
        let tonnage: Option<f64> = conn.query_row(
            "SELECT MAX(tonnage) FROM equipment WHERE system_id = ?1",
            params![system_id],
            |r| r.get(0),
        )?;
        Ok(tonnage)
    })
}
