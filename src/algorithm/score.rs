//! Puntaje heurístico de una combinación.
//!
//! Base 1000 y ajustes por: hora media de inicio tardía, ventanas largas entre
//! clases (opcional), días libres y jornadas compactas. Cada franja cuenta una
//! vez por cada día en que se dicta.

use std::collections::BTreeMap;

use crate::models::{Combination, DaySlot, ScoreDetails, ScoredCombination, Weekday};

const BASE_SCORE: f64 = 1000.0;
const LATE_START_BONUS: f64 = 40.0;
const MID_START_BONUS: f64 = 20.0;
const GAP_TOLERANCE_HOURS: i32 = 2;
const GAP_PENALTY_PER_HOUR: f64 = 20.0;
const FREE_DAY_BONUS: f64 = 50.0;
const COMPACT_DAY_BONUS: f64 = 30.0;
const MODERATE_DAY_BONUS: f64 = 15.0;

/// Agrupa las clases por día, ordenadas por hora de inicio.
fn per_day_slots(combination: &Combination) -> BTreeMap<Weekday, Vec<DaySlot>> {
    let mut per_day: BTreeMap<Weekday, Vec<DaySlot>> = BTreeMap::new();
    for chosen in combination.groups.iter() {
        for slot in chosen.time_slots.iter() {
            for day in slot.days.iter() {
                per_day.entry(day).or_default().push(DaySlot {
                    subject_code: chosen.subject_code.clone(),
                    group_number: chosen.group_number.clone(),
                    start_hour: slot.start_hour,
                    end_hour: slot.end_hour,
                    room: slot.room.clone(),
                });
            }
        }
    }
    for classes in per_day.values_mut() {
        // sort estable: empates conservan el orden de la combinación
        classes.sort_by_key(|c| c.start_hour);
    }
    per_day
}

/// Horas de ventana que exceden la tolerancia, sumadas sobre todos los días.
fn excess_gap_hours(per_day: &BTreeMap<Weekday, Vec<DaySlot>>) -> i32 {
    per_day
        .values()
        .flat_map(|classes| classes.windows(2))
        .map(|pair| i32::from(pair[1].start_hour) - i32::from(pair[0].end_hour))
        .filter(|gap| *gap > GAP_TOLERANCE_HOURS)
        .map(|gap| gap - GAP_TOLERANCE_HOURS)
        .sum()
}

pub fn score_combination(combination: &Combination, avoid_gaps: bool) -> ScoredCombination {
    let per_day = per_day_slots(combination);
    let mut total = BASE_SCORE;

    // hora media de inicio ponderada por cantidad de días de cada franja
    let (weighted_sum, instances) = combination
        .groups
        .iter()
        .flat_map(|g| g.time_slots.iter())
        .fold((0u32, 0u32), |(sum, n), slot| {
            let days = slot.days.len() as u32;
            (sum + u32::from(slot.start_hour) * days, n + days)
        });
    if instances > 0 {
        let mean_start = f64::from(weighted_sum) / f64::from(instances);
        if mean_start >= 10.0 {
            total += LATE_START_BONUS;
        } else if mean_start >= 8.0 {
            total += MID_START_BONUS;
        }
    }

    if avoid_gaps {
        total -= GAP_PENALTY_PER_HOUR * f64::from(excess_gap_hours(&per_day));
    }

    let free_days = Weekday::ALL.iter().filter(|d| !per_day.contains_key(d)).count();
    total += FREE_DAY_BONUS * free_days as f64;

    for classes in per_day.values() {
        let first = classes.iter().map(|c| c.start_hour).min().unwrap_or(0);
        let last = classes.iter().map(|c| c.end_hour).max().unwrap_or(0);
        let span = last.saturating_sub(first);
        if span <= 4 {
            total += COMPACT_DAY_BONUS;
        } else if span <= 6 {
            total += MODERATE_DAY_BONUS;
        }
    }

    let details = ScoreDetails {
        days_used: per_day.len(),
        total_hours: combination
            .groups
            .iter()
            .flat_map(|g| g.time_slots.iter())
            .map(|s| s.duration_hours() * s.days.len() as u32)
            .sum(),
        earliest_hour: per_day.values().flatten().map(|c| c.start_hour).min(),
        latest_hour: per_day.values().flatten().map(|c| c.end_hour).max(),
        per_day,
    };

    ScoredCombination { combination: combination.clone(), score: total.round() as i64, details }
}
