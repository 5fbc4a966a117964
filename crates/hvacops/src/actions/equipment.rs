//! Equipment and system management.

use tracing::{debug, info};

use crate::db::{equipment_repo, job_repo, system_repo, test_run_repo, Database};
use crate::error::{DomainError, Result, ValidationError};
use crate::form::{self, FormData};
use crate::model::{new_id, Equipment, EquipmentRole, System};

/// Adds an equipment item from a form. The system label is a hard domain
/// requirement; a new label creates the system, an existing one reuses it
/// (names are unique within a job).
pub fn add_equipment_from_form(
    db: &Database,
    form: &FormData,
    _actor: Option<&str>,
) -> Result<Equipment> {
    let job_id = form::require(form, "job_id")?;
    let job = job_repo::find_by_id(db, &job_id)?.ok_or_else(|| ValidationError::NotFound {
        entity: "job",
        id: job_id.clone(),
    })?;

    let system_label = form::text(form, "system_label").ok_or(DomainError::EquipmentWithoutSystem)?;

    let system = match system_repo::find_by_name(db, &job.id, &system_label)? {
        Some(system) => system,
        None => {
            let system = System {
                id: new_id(),
                job_id: job.id.clone(),
                name: system_label,
            };
            system_repo::insert(db, &system)?;
            system
        }
    };

    let role_raw = form::require(form, "role")?;
    let role = EquipmentRole::parse(&role_raw).ok_or(ValidationError::InvalidField {
        field: "role",
        value: role_raw,
    })?;

    let item = Equipment {
        id: new_id(),
        system_id: system.id.clone(),
        role,
        manufacturer: form::text(form, "manufacturer"),
        model: form::text(form, "model"),
        serial: form::text(form, "serial"),
        tonnage: form::number(form, "tonnage"),
        refrigerant_type: form::text(form, "refrigerant_type"),
        notes: form::text(form, "notes"),
    };
    equipment_repo::insert(db, &item)?;

    info!(job_id = %job.id, system = %system.name, role = role.as_str(), "equipment added");
    Ok(item)
}

/// Removes an equipment item, then cleans up its system if orphaned.
pub fn remove_equipment(db: &Database, equipment_id: &str) -> Result<()> {
    let item =
        equipment_repo::find_by_id(db, equipment_id)?.ok_or_else(|| ValidationError::NotFound {
            entity: "equipment",
            id: equipment_id.to_string(),
        })?;
    equipment_repo::delete(db, &item.id)?;
    cleanup_orphan_system(db, &item.system_id)?;
    Ok(())
}

/// Deletes a system once it holds zero equipment and zero test runs.
pub(crate) fn cleanup_orphan_system(db: &Database, system_id: &str) -> Result<()> {
    if equipment_repo::count_by_system(db, system_id)? == 0
        && test_run_repo::count_by_system(db, system_id)? == 0
    {
        system_repo::delete(db, system_id)?;
        debug!(system_id, "orphaned system removed");
    }
    Ok(())
}
