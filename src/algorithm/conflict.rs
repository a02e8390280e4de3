// Funciones para detectar conflictos y parsear franjas horarias.
use serde::Serialize;

use crate::error::{Result, ScheduleError};
use crate::models::{ChosenGroup, DaySet, Group, TimeSlot, Weekday};

/// True si las franjas comparten algún día y sus rangos `[inicio, fin)` se solapan.
#[inline]
pub fn conflicts(a: &TimeSlot, b: &TimeSlot) -> bool {
    a.days.intersects(b.days) && a.start_hour < b.end_hour && b.start_hour < a.end_hour
}

/// True si cualquiera de las franjas de `a` choca con cualquiera de `b`.
pub fn slots_conflict(a: &[TimeSlot], b: &[TimeSlot]) -> bool {
    a.iter().any(|sa| b.iter().any(|sb| conflicts(sa, sb)))
}

pub fn groups_conflict(a: &Group, b: &Group) -> bool {
    slots_conflict(&a.slots, &b.slots)
}

/// True si la sección candidata choca con alguna sección ya elegida.
pub fn conflicts_with_combination<'a, I>(candidate: &[TimeSlot], partial: I) -> bool
where
    I: IntoIterator<Item = &'a [TimeSlot]>,
{
    partial.into_iter().any(|chosen| slots_conflict(candidate, chosen))
}

/// Par de clases en conflicto dentro de un horario armado a mano.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictPair {
    pub first: (String, String),
    pub second: (String, String),
    pub days: Vec<Weekday>,
    pub overlap_start: u8,
    pub overlap_end: u8,
}

/// Lista todos los choques entre secciones distintas (chequeo manual, celda a celda).
pub fn conflict_report(chosen: &[ChosenGroup]) -> Vec<ConflictPair> {
    let mut out = Vec::new();
    for (i, g1) in chosen.iter().enumerate() {
        for g2 in chosen.iter().skip(i + 1) {
            for s1 in g1.time_slots.iter() {
                for s2 in g2.time_slots.iter() {
                    if !conflicts(s1, s2) {
                        continue;
                    }
                    out.push(ConflictPair {
                        first: (g1.subject_code.clone(), g1.group_number.clone()),
                        second: (g2.subject_code.clone(), g2.group_number.clone()),
                        days: s1.days.intersection(s2.days).iter().collect(),
                        overlap_start: s1.start_hour.max(s2.start_hour),
                        overlap_end: s1.end_hour.min(s2.end_hour),
                    });
                }
            }
        }
    }
    out
}

fn invalid(text: &str, reason: &str) -> ScheduleError {
    ScheduleError::InvalidSlot { slot: text.to_string(), reason: reason.to_string() }
}

/// "08", "8", "08:00", "08.00" -> 8. Los minutos deben ser 00.
fn parse_hour(tok: &str, text: &str) -> Result<u8> {
    let tok = tok.trim().replace('.', ":");
    let (hh, mm) = match tok.split_once(':') {
        Some((h, m)) => (h, Some(m)),
        None => (tok.as_str(), None),
    };
    let hour = hh.parse::<u8>().map_err(|_| invalid(text, "hour is not a number"))?;
    if let Some(m) = mm {
        let minutes = m.parse::<u8>().map_err(|_| invalid(text, "minutes are not a number"))?;
        if minutes != 0 {
            return Err(invalid(text, "only whole hours are supported"));
        }
    }
    Ok(hour)
}

fn looks_like_range(tok: &str) -> bool {
    match tok.split_once('-') {
        Some((a, b)) => {
            a.starts_with(|c: char| c.is_ascii_digit()) && b.starts_with(|c: char| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Parsea una franja en formato compacto.
/// Ejemplos: "LU MI 08:00-10:00", "LU:08:00-10:00", "MA 8-10 Sala 201".
/// Lo que viene después del rango horario se toma como sala.
pub fn parse_slot(text: &str) -> Result<TimeSlot> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.is_empty() {
        return Err(invalid(text, "empty schedule"));
    }

    let mut days = DaySet::empty();
    let mut range: Option<&str> = None;
    let mut room_parts: Vec<&str> = Vec::new();

    for part in parts {
        if range.is_some() {
            room_parts.push(part);
            continue;
        }
        if looks_like_range(part) {
            range = Some(part);
            continue;
        }
        // forma compacta "LU:08:00-10:00"
        if let Some((day_tok, rest)) = part.split_once(':') {
            if looks_like_range(rest) {
                days.insert(day_tok.parse()?);
                range = Some(rest);
                continue;
            }
        }
        days.insert(part.parse()?);
    }

    let range = range.ok_or_else(|| invalid(text, "missing HH-HH range"))?;
    let (start, end) = range.split_once('-').ok_or_else(|| invalid(text, "missing HH-HH range"))?;
    let start_hour = parse_hour(start, text)?;
    let end_hour = parse_hour(end, text)?;
    let room = if room_parts.is_empty() { None } else { Some(room_parts.join(" ")) };

    TimeSlot::new(days, start_hour, end_hour, room).map_err(|e| match e {
        ScheduleError::InvalidSlot { reason, .. } => invalid(text, &reason),
        other => other,
    })
}
