// pipeline.rs - Orquestador del generador de horarios
//
// PHASE 1: resolver la selección contra el catálogo (códigos repetidos se
//          colapsan; códigos desconocidos se ignoran o rechazan según política)
// PHASE 2: filtro de elegibilidad (hora mínima, cupos, profesores excluidos)
// PHASE 3: búsqueda de combinaciones sin choques (secuencial o paralela)
// PHASE 4: puntaje + ranking top-K
//
// No hay estado entre llamadas: todo lo que usa la búsqueda vive en esta función.
use std::collections::HashSet;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::algorithm::filters::{self, EligibilityReport};
use crate::algorithm::parallel::search_combinations_parallel;
use crate::algorithm::rank::rank;
use crate::algorithm::score::score_combination;
use crate::algorithm::search::{
    CancelToken, SearchLimits, SearchStats, StopReason, search_combinations,
};
use crate::error::{Result, ScheduleError};
use crate::models::{Catalog, ScoredCombination, Subject};

pub const DEFAULT_MIN_START_HOUR: u8 = 6;
pub const DEFAULT_MAX_COMBINATIONS: usize = 10_000;
pub const DEFAULT_TIME_BUDGET_MS: u64 = 3_000;
pub const DEFAULT_TOP_K: usize = 10;

/// Qué hacer con códigos seleccionados que no existen en el catálogo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCodePolicy {
    #[default]
    Ignore,
    Reject,
}

impl FromStr for UnknownCodePolicy {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ignore" => Ok(UnknownCodePolicy::Ignore),
            "reject" => Ok(UnknownCodePolicy::Reject),
            other => Err(ScheduleError::Config(format!("unknown-code policy must be 'ignore' or 'reject', got '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    pub min_start_hour: u8,
    pub avoid_gaps: bool,
    pub max_combinations: usize,
    pub time_budget_ms: u64,
    pub top_k: usize,
    /// 1 = secuencial, 0 = un hilo por CPU
    pub workers: usize,
    pub excluded_professors: Vec<String>,
    pub unknown_codes: UnknownCodePolicy,
    #[serde(skip)]
    pub cancel: Option<CancelToken>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            min_start_hour: DEFAULT_MIN_START_HOUR,
            avoid_gaps: false,
            max_combinations: DEFAULT_MAX_COMBINATIONS,
            time_budget_ms: DEFAULT_TIME_BUDGET_MS,
            top_k: DEFAULT_TOP_K,
            workers: 1,
            excluded_professors: Vec::new(),
            unknown_codes: UnknownCodePolicy::Ignore,
            cancel: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateOutcome {
    /// Mejores horarios, de mayor a menor puntaje
    pub schedules: Vec<ScoredCombination>,
    /// True si la búsqueda se cortó por un guarda (no exhaustiva)
    pub partial: bool,
    pub stop_reason: Option<StopReason>,
    pub unknown_codes: Vec<String>,
    pub eligibility: Vec<EligibilityReport>,
    pub combinations_found: usize,
    pub stats: SearchStats,
    pub elapsed_ms: u64,
}

/// Resuelve los códigos seleccionados contra el catálogo, en orden y sin repetir.
fn resolve_selection<'c, S: AsRef<str>>(
    catalog: &'c Catalog,
    selected_codes: &[S],
    policy: UnknownCodePolicy,
) -> Result<(Vec<&'c Subject>, Vec<String>)> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut subjects = Vec::new();
    let mut unknown = Vec::new();
    for code in selected_codes.iter().map(|c| c.as_ref().trim()) {
        if !seen.insert(code) {
            debug!(code, "duplicate selection collapsed");
            continue;
        }
        match catalog.subject(code) {
            Some(s) => subjects.push(s),
            None => unknown.push(code.to_string()),
        }
    }
    if !unknown.is_empty() {
        match policy {
            UnknownCodePolicy::Reject => return Err(ScheduleError::UnknownSubject(unknown)),
            UnknownCodePolicy::Ignore => warn!(codes = ?unknown, "ignoring subject codes absent from catalog"),
        }
    }
    Ok((subjects, unknown))
}

/// Genera los mejores horarios sin choques para la selección dada.
///
/// Selección vacía o un ramo sin secciones elegibles => lista vacía (no es error).
/// Si un guarda corta la búsqueda, `partial` queda en true y el ranking se
/// hace sobre lo encontrado hasta ese momento.
pub fn generate<S: AsRef<str>>(
    catalog: &Catalog,
    selected_codes: &[S],
    options: &GenerateOptions,
) -> Result<GenerateOutcome> {
    let start = Instant::now();

    info!(selected = selected_codes.len(), catalog = catalog.len(), "PHASE 1: resolve selection");
    let (subjects, unknown_codes) = resolve_selection(catalog, selected_codes, options.unknown_codes)?;
    if subjects.is_empty() {
        info!("empty selection, nothing to schedule");
        return Ok(GenerateOutcome { unknown_codes, ..GenerateOutcome::default() });
    }

    info!(min_start_hour = options.min_start_hour, "PHASE 2: eligibility filter");
    let eligible = filters::filter_eligible(&subjects, options.min_start_hour, &options.excluded_professors);
    let eligibility = filters::report(&eligible);
    if let Some(empty) = eligible.iter().find(|e| e.groups.is_empty()) {
        info!(subject = %empty.subject.code, "subject has no eligible groups, no schedule possible");
        return Ok(GenerateOutcome {
            unknown_codes,
            eligibility,
            elapsed_ms: start.elapsed().as_millis() as u64,
            ..GenerateOutcome::default()
        });
    }

    let limits = SearchLimits {
        max_combinations: options.max_combinations,
        time_budget: Duration::from_millis(options.time_budget_ms),
        cancel: options.cancel.clone(),
    };
    info!(
        subjects = eligible.len(),
        max_combinations = limits.max_combinations,
        time_budget_ms = options.time_budget_ms,
        workers = options.workers,
        "PHASE 3: combination search"
    );
    let result = if options.workers == 1 {
        search_combinations(&eligible, &limits)
    } else {
        search_combinations_parallel(&eligible, &limits, options.workers)
    };
    if let Some(reason) = result.stop_reason {
        warn!(?reason, found = result.combinations.len(), "search stopped early, result is partial");
    }
    debug!(stats = ?result.stats, "search finished");

    info!(found = result.combinations.len(), top_k = options.top_k, "PHASE 4: score and rank");
    let combinations_found = result.combinations.len();
    let scored: Vec<ScoredCombination> = result
        .combinations
        .iter()
        .map(|c| score_combination(c, options.avoid_gaps))
        .collect();
    let schedules = rank(scored, options.top_k);

    let outcome = GenerateOutcome {
        schedules,
        partial: result.stop_reason.is_some(),
        stop_reason: result.stop_reason,
        unknown_codes,
        eligibility,
        combinations_found,
        stats: result.stats,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    info!(schedules = outcome.schedules.len(), partial = outcome.partial, elapsed_ms = outcome.elapsed_ms, "generate finished");
    Ok(outcome)
}
