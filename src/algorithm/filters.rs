//! Filtro de elegibilidad de secciones.
//!
//! Se aplica antes de la búsqueda: descarta secciones sin cupo, sin franjas,
//! que empiezan antes de la hora mínima o dictadas por profesores a evitar.
//! Si un ramo queda sin secciones, la búsqueda no produce combinaciones.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::{Group, Subject};

/// Ramo con sus secciones elegibles, en el orden original del catálogo.
#[derive(Debug, Clone)]
pub struct EligibleSubject<'a> {
    pub subject: &'a Subject,
    pub groups: Vec<&'a Group>,
}

/// Resumen por ramo de cuántas secciones sobrevivieron al filtro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityReport {
    pub subject_code: String,
    pub offered: usize,
    pub eligible: usize,
}

fn normalize_professor(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// True si la sección puede participar en la búsqueda.
pub fn group_is_eligible(group: &Group, min_start_hour: u8, excluded_professors: &HashSet<String>) -> bool {
    if !group.is_open() {
        return false;
    }
    if !group.slots.iter().all(|s| s.start_hour >= min_start_hour) {
        return false;
    }
    match group.professor.as_deref() {
        Some(p) if !excluded_professors.is_empty() => !excluded_professors.contains(&normalize_professor(p)),
        _ => true,
    }
}

/// Aplica el filtro a los ramos seleccionados, conservando el orden.
pub fn filter_eligible<'a>(
    subjects: &[&'a Subject],
    min_start_hour: u8,
    excluded_professors: &[String],
) -> Vec<EligibleSubject<'a>> {
    let excluded: HashSet<String> = excluded_professors
        .iter()
        .map(|p| normalize_professor(p))
        .filter(|p| !p.is_empty())
        .collect();

    subjects
        .iter()
        .map(|subject| {
            let groups: Vec<&Group> = subject
                .groups
                .iter()
                .filter(|g| group_is_eligible(g, min_start_hour, &excluded))
                .collect();
            tracing::debug!(
                subject = %subject.code,
                offered = subject.groups.len(),
                eligible = groups.len(),
                "eligibility filter"
            );
            EligibleSubject { subject, groups }
        })
        .collect()
}

pub fn report(eligible: &[EligibleSubject<'_>]) -> Vec<EligibilityReport> {
    eligible
        .iter()
        .map(|e| EligibilityReport {
            subject_code: e.subject.code.clone(),
            offered: e.subject.groups.len(),
            eligible: e.groups.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::conflict::parse_slot;

    fn group(number: &str, cupos: u32, prof: Option<&str>, slots: &[&str]) -> Group {
        Group {
            number: number.to_string(),
            capacity_max: 40,
            capacity_available: cupos,
            professor: prof.map(str::to_string),
            slots: slots.iter().map(|s| parse_slot(s).unwrap()).collect(),
        }
    }

    #[test]
    fn test_descarta_sin_cupo_y_sin_franjas() {
        let none = HashSet::new();
        assert!(!group_is_eligible(&group("1", 0, None, &["LU 08-10"]), 6, &none));
        assert!(!group_is_eligible(&group("2", 10, None, &[]), 6, &none));
        assert!(group_is_eligible(&group("3", 10, None, &["LU 08-10"]), 6, &none));
    }

    #[test]
    fn test_todas_las_franjas_deben_cumplir_hora_minima() {
        let none = HashSet::new();
        let g = group("1", 10, None, &["LU 10-12", "MI 07-09"]);
        assert!(group_is_eligible(&g, 7, &none));
        assert!(!group_is_eligible(&g, 8, &none));
    }

    #[test]
    fn test_profesores_excluidos() {
        let subject = Subject {
            code: "CIT1000".into(),
            name: "Programación".into(),
            groups: vec![
                group("1", 10, Some("Ana  Pérez"), &["LU 08-10"]),
                group("2", 10, Some("Luis Soto"), &["MA 08-10"]),
                group("3", 10, None, &["JU 08-10"]),
            ],
        };
        let out = filter_eligible(&[&subject], 6, &["ana pérez".to_string()]);
        let kept: Vec<&str> = out[0].groups.iter().map(|g| g.number.as_str()).collect();
        assert_eq!(kept, vec!["2", "3"]);
        assert_eq!(report(&out)[0], EligibilityReport { subject_code: "CIT1000".into(), offered: 3, eligible: 2 });
    }
}
