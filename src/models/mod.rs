// Estructuras de datos principales
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

mod weekday;

pub use weekday::{DaySet, Weekday};

/// Franja semanal recurrente: conjunto de días + hora inicio/fin (horas enteras).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TimeSlotRecord")]
pub struct TimeSlot {
    pub room: Option<String>,
    pub days: DaySet,
    pub start_hour: u8,
    pub end_hour: u8,
}

impl TimeSlot {
    /// Construye una franja validando `start < end <= 24` y al menos un día.
    pub fn new(days: DaySet, start_hour: u8, end_hour: u8, room: Option<String>) -> Result<Self, ScheduleError> {
        let describe = || format!("{} {:02}-{:02}", days, start_hour, end_hour);
        if days.is_empty() {
            return Err(ScheduleError::InvalidSlot { slot: describe(), reason: "no weekdays".into() });
        }
        if start_hour >= end_hour {
            return Err(ScheduleError::InvalidSlot { slot: describe(), reason: "start hour must precede end hour".into() });
        }
        if end_hour > 24 {
            return Err(ScheduleError::InvalidSlot { slot: describe(), reason: "end hour past midnight".into() });
        }
        Ok(TimeSlot { room, days, start_hour, end_hour })
    }

    pub fn duration_hours(&self) -> u32 {
        u32::from(self.end_hour - self.start_hour)
    }
}

#[derive(Debug, Deserialize)]
struct TimeSlotRecord {
    #[serde(default)]
    room: Option<String>,
    days: DaySet,
    start_hour: u8,
    end_hour: u8,
}

impl TryFrom<TimeSlotRecord> for TimeSlot {
    type Error = ScheduleError;

    fn try_from(r: TimeSlotRecord) -> Result<Self, Self::Error> {
        TimeSlot::new(r.days, r.start_hour, r.end_hour, r.room)
    }
}

/// Una sección ofertada de un ramo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub number: String,
    #[serde(default)]
    pub capacity_max: u32,
    pub capacity_available: u32,
    #[serde(default)]
    pub professor: Option<String>,
    pub slots: Vec<TimeSlot>,
}

impl Group {
    /// Elegible para la búsqueda: con cupos y con al menos una franja.
    pub fn is_open(&self) -> bool {
        self.capacity_available > 0 && !self.slots.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub code: String,
    pub name: String,
    pub groups: Vec<Group>,
}

/// Normaliza un nombre de ramo para comparar: minúsculas, sin acentos ni signos.
pub fn normalize_name(s: &str) -> String {
    let folded: String = s
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'Á' | 'À' | 'Ä' | 'Â' => 'a',
            'é' | 'è' | 'ë' | 'ê' | 'É' | 'È' | 'Ë' | 'Ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' | 'Í' | 'Ì' | 'Ï' | 'Î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'Ó' | 'Ò' | 'Ö' | 'Ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' | 'Ú' | 'Ù' | 'Ü' | 'Û' => 'u',
            'ñ' | 'Ñ' => 'n',
            c if c.is_alphanumeric() => c.to_ascii_lowercase(),
            _ => ' ',
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Catálogo de ramos de solo lectura durante una llamada a `generate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub subjects: Vec<Subject>,
}

impl Catalog {
    pub fn new(subjects: Vec<Subject>) -> Self {
        Catalog { subjects }
    }

    pub fn subject(&self, code: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.code == code)
    }

    /// Búsqueda por nombre normalizado (sin acentos, mayúsculas ni espacios extra).
    pub fn subject_by_name(&self, name: &str) -> Option<&Subject> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        self.subjects.iter().find(|s| normalize_name(&s.name) == wanted)
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// Firma canónica de una combinación: pares "CODE-GROUP" ordenados por código y unidos con '|'.
pub fn canonical_key<'s, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'s str, &'s str)>,
{
    let mut pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(code, group)| format!("{}-{}", code, group))
        .collect::<Vec<_>>()
        .join("|")
}

/// Sección elegida para un ramo dentro de una combinación.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChosenGroup {
    pub subject_code: String,
    pub group_number: String,
    pub time_slots: Vec<TimeSlot>,
    pub professor: Option<String>,
    pub capacity_available: u32,
}

impl ChosenGroup {
    pub fn from_group(subject_code: &str, group: &Group) -> Self {
        ChosenGroup {
            subject_code: subject_code.to_string(),
            group_number: group.number.clone(),
            time_slots: group.slots.clone(),
            professor: group.professor.clone(),
            capacity_available: group.capacity_available,
        }
    }
}

/// Un horario candidato completo: exactamente una sección por ramo.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combination {
    pub groups: Vec<ChosenGroup>,
}

impl Combination {
    /// Firma canónica "CODE-GROUP" ordenada por código de ramo.
    pub fn dedup_key(&self) -> String {
        canonical_key(self.groups.iter().map(|g| (g.subject_code.as_str(), g.group_number.as_str())))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Clase concreta en un día, usada en el detalle por día.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySlot {
    pub subject_code: String,
    pub group_number: String,
    pub start_hour: u8,
    pub end_hour: u8,
    pub room: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreDetails {
    pub days_used: usize,
    pub total_hours: u32,
    pub earliest_hour: Option<u8>,
    pub latest_hour: Option<u8>,
    pub per_day: BTreeMap<Weekday, Vec<DaySlot>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCombination {
    pub combination: Combination,
    pub score: i64,
    pub details: ScoreDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(list: &[Weekday]) -> DaySet {
        list.iter().copied().collect()
    }

    #[test]
    fn test_timeslot_validacion() {
        assert!(TimeSlot::new(days(&[Weekday::Mon]), 8, 10, None).is_ok());
        assert!(TimeSlot::new(days(&[]), 8, 10, None).is_err());
        assert!(TimeSlot::new(days(&[Weekday::Mon]), 10, 10, None).is_err());
        assert!(TimeSlot::new(days(&[Weekday::Mon]), 20, 25, None).is_err());
        // el JSON estructurado pasa por la misma validación
        let bad = r#"{"days": ["LU"], "start_hour": 12, "end_hour": 9}"#;
        assert!(serde_json::from_str::<TimeSlot>(bad).is_err());
    }

    #[test]
    fn test_dedup_key_independiente_del_orden() {
        let chosen = |code: &str, n: &str| ChosenGroup {
            subject_code: code.into(),
            group_number: n.into(),
            time_slots: Vec::new(),
            professor: None,
            capacity_available: 1,
        };
        let a = Combination { groups: vec![chosen("MAT1", "2"), chosen("FIS1", "1")] };
        let b = Combination { groups: vec![chosen("FIS1", "1"), chosen("MAT1", "2")] };
        assert_eq!(a.dedup_key(), "FIS1-1|MAT1-2");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Cálculo   II "), "calculo ii");
        assert_eq!(normalize_name("MECÁNICA"), normalize_name("Mecánica"));
    }

    #[test]
    fn test_busqueda_por_nombre() {
        let catalog = Catalog::new(vec![Subject { code: "MAT1".into(), name: "Cálculo  I".into(), groups: Vec::new() }]);
        assert_eq!(catalog.subject_by_name("calculo i").map(|s| s.code.as_str()), Some("MAT1"));
        assert!(catalog.subject_by_name("Cálculo II").is_none());
        assert!(catalog.subject_by_name("  ").is_none());
        assert!(catalog.subject("MAT1").is_some());
    }
}
