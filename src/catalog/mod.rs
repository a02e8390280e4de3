//! Lectura del catálogo de ramos (oferta académica) desde JSON.
//!
//! El scraper deja un JSON con los ramos y sus secciones. Las franjas pueden
//! venir estructuradas (`{"days": ["LU","MI"], "start_hour": 8, "end_hour": 10}`)
//! o en el formato compacto de la universidad (`"LU MI 08:00-10:00"`).
//! Las entradas "Sin horario" se descartan: la sección queda sin franjas y el
//! filtro de elegibilidad la saca de la búsqueda.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::algorithm::conflict::parse_slot;
use crate::error::{Result, ScheduleError};
use crate::models::{Catalog, Group, Subject, TimeSlot};

pub use crate::models::normalize_name;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Wrapped { subjects: Vec<SubjectRecord> },
    Bare(Vec<SubjectRecord>),
}

#[derive(Debug, Deserialize)]
struct SubjectRecord {
    #[serde(alias = "codigo")]
    code: String,
    #[serde(default, alias = "nombre")]
    name: String,
    #[serde(default, alias = "secciones")]
    groups: Vec<GroupRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Label {
    Text(String),
    Number(u64),
}

impl Label {
    fn into_string(self) -> String {
        match self {
            Label::Text(s) => s.trim().to_string(),
            Label::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GroupRecord {
    #[serde(alias = "seccion")]
    number: Label,
    #[serde(default)]
    capacity_max: u32,
    #[serde(default, alias = "cupos")]
    capacity_available: u32,
    #[serde(default, alias = "profesor")]
    professor: Option<String>,
    #[serde(default, alias = "horario")]
    slots: Vec<SlotRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SlotRecord {
    Compact(String),
    // validado por `TimeSlot::new` vía `try_from`
    Structured(TimeSlot),
}

fn is_unscheduled(text: &str) -> bool {
    let t = text.trim().to_lowercase();
    t.is_empty() || t.contains("sin horario")
}

fn convert_slot(record: SlotRecord) -> Result<Option<TimeSlot>> {
    match record {
        SlotRecord::Compact(text) if is_unscheduled(&text) => Ok(None),
        SlotRecord::Compact(text) => parse_slot(&text).map(Some),
        SlotRecord::Structured(slot) => Ok(Some(slot)),
    }
}

fn convert_group(subject_code: &str, record: GroupRecord) -> Result<Group> {
    let number = record.number.into_string();
    let mut slots = Vec::with_capacity(record.slots.len());
    for raw in record.slots {
        let slot = convert_slot(raw).map_err(|e| {
            ScheduleError::InvalidInput(format!("subject {} group {}: {}", subject_code, number, e))
        })?;
        slots.extend(slot);
    }
    let professor = record
        .professor
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());
    Ok(Group {
        number,
        capacity_max: record.capacity_max,
        capacity_available: record.capacity_available,
        professor,
        slots,
    })
}

/// Parsea un catálogo desde texto JSON.
pub fn parse_catalog(json: &str) -> Result<Catalog> {
    let records = match serde_json::from_str::<CatalogDocument>(json)? {
        CatalogDocument::Wrapped { subjects } => subjects,
        CatalogDocument::Bare(subjects) => subjects,
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut subjects = Vec::with_capacity(records.len());
    for record in records {
        let code = record.code.trim().to_string();
        if code.is_empty() {
            return Err(ScheduleError::InvalidInput("subject without code".into()));
        }
        if !seen.insert(code.clone()) {
            warn!(code = %code, "duplicate subject code in catalog, keeping the first one");
            continue;
        }
        let groups = record
            .groups
            .into_iter()
            .map(|g| convert_group(&code, g))
            .collect::<Result<Vec<_>>>()?;
        subjects.push(Subject { code, name: record.name.trim().to_string(), groups });
    }
    debug!(subjects = subjects.len(), "catalog parsed");
    Ok(Catalog::new(subjects))
}

/// Lee el catálogo desde un archivo JSON en disco.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let catalog = parse_catalog(&text)?;
    debug!(path = %path.as_ref().display(), subjects = catalog.len(), "catalog loaded");
    Ok(catalog)
}
