use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::algorithm::conflict::{conflict_report, ConflictPair};
use crate::algorithm::filters::EligibilityReport;
use crate::algorithm::pipeline::{generate, GenerateOptions, UnknownCodePolicy};
use crate::algorithm::search::StopReason;
use crate::catalog::normalize_name;
use crate::error::{Result, ScheduleError};
use crate::models::{Catalog, ChosenGroup, ScoredCombination};

/// Similitud mínima (Jaro-Winkler sobre nombres normalizados) para aceptar un match difuso.
pub const FUZZY_NAME_THRESHOLD: f64 = 0.92;

/// Petición de generación de horarios
///
/// # Estructura del JSON esperado:
/// ```json
/// {
///   "selected": ["CIT1000", "Cálculo II"],
///   "options": {
///     "min_start_hour": 8,
///     "avoid_gaps": true,
///     "top_k": 5,
///     "excluded_professors": ["Dr. García"]
///   }
/// }
/// ```
///
/// # Campos:
/// - `selected`: códigos o nombres de ramos (los nombres se resuelven contra el catálogo)
/// - `options`: opcional; cada campo ausente toma el valor configurado por entorno
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(alias = "selected_codes", alias = "ramos")]
    pub selected: Vec<String>,
    #[serde(default)]
    pub options: RequestOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestOptions {
    pub min_start_hour: Option<u8>,
    pub avoid_gaps: Option<bool>,
    pub max_combinations: Option<usize>,
    pub time_budget_ms: Option<u64>,
    pub top_k: Option<usize>,
    pub workers: Option<usize>,
    pub excluded_professors: Option<Vec<String>>,
    pub unknown_codes: Option<UnknownCodePolicy>,
}

impl RequestOptions {
    /// Combina con las opciones base y valida rangos.
    pub fn merge_into(&self, mut base: GenerateOptions) -> Result<GenerateOptions> {
        if let Some(h) = self.min_start_hour {
            if h > 23 {
                return Err(ScheduleError::InvalidInput(format!("min_start_hour must be 0-23, got {}", h)));
            }
            base.min_start_hour = h;
        }
        if let Some(v) = self.avoid_gaps {
            base.avoid_gaps = v;
        }
        if let Some(v) = self.max_combinations {
            if v == 0 {
                return Err(ScheduleError::InvalidInput("max_combinations must be positive".into()));
            }
            base.max_combinations = v;
        }
        if let Some(v) = self.time_budget_ms {
            base.time_budget_ms = v;
        }
        if let Some(v) = self.top_k {
            if v == 0 {
                return Err(ScheduleError::InvalidInput("top_k must be positive".into()));
            }
            base.top_k = v;
        }
        if let Some(v) = self.workers {
            base.workers = v;
        }
        if let Some(v) = &self.excluded_professors {
            base.excluded_professors = v.clone();
        }
        if let Some(v) = self.unknown_codes {
            base.unknown_codes = v;
        }
        Ok(base)
    }
}

/// Cómo se llegó al código de una entrada de la selección.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Code,
    Name,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameMatch {
    pub code: String,
    pub kind: MatchKind,
    pub similarity: f64,
}

/// Entrada de la selección que se reemplazó por un código del catálogo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEntry {
    pub entry: String,
    pub code: String,
    pub kind: MatchKind,
    pub similarity: f64,
}

/// Respuesta serializada para el cliente.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResponse {
    pub generated_at: DateTime<Utc>,
    pub schedules_count: usize,
    pub combinations_found: usize,
    pub partial: bool,
    pub stop_reason: Option<StopReason>,
    pub selected: Vec<String>,
    pub resolved: Vec<ResolvedEntry>,
    pub unknown_codes: Vec<String>,
    pub eligibility: Vec<EligibilityReport>,
    pub schedules: Vec<ScoredCombination>,
}

pub fn parse_request(json_str: &str) -> Result<GenerateRequest> {
    serde_json::from_str::<GenerateRequest>(json_str)
        .map_err(|e| ScheduleError::InvalidInput(format!("malformed request: {}", e)))
}

// "calculo 2" -> 2, "fisica iii" -> 3
fn trailing_ordinal(normalized: &str) -> Option<u32> {
    let last = normalized.rsplit(' ').next()?;
    if let Ok(n) = last.parse::<u32>() {
        return Some(n);
    }
    const ROMAN: [&str; 10] = ["i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x"];
    ROMAN.iter().position(|r| *r == last).map(|i| i as u32 + 1)
}

/// Resuelve una entrada de la selección a un código del catálogo:
/// código exacto, nombre normalizado exacto o, por último, un único nombre
/// parecido sobre `FUZZY_NAME_THRESHOLD`. El match difuso nunca cruza
/// ramos con distinto número final ("Cálculo II" no es "Cálculo III").
pub fn resolve_in_catalog(catalog: &Catalog, entry: &str) -> Option<NameMatch> {
    let entry = entry.trim();
    if catalog.subject(entry).is_some() {
        return Some(NameMatch { code: entry.to_string(), kind: MatchKind::Code, similarity: 1.0 });
    }
    let wanted = normalize_name(entry);
    if wanted.is_empty() {
        return None;
    }
    if let Some(s) = catalog.subject_by_name(entry) {
        return Some(NameMatch { code: s.code.clone(), kind: MatchKind::Name, similarity: 1.0 });
    }
    let wanted_ordinal = trailing_ordinal(&wanted);
    let candidates: Vec<(f64, &str)> = catalog
        .subjects
        .iter()
        .filter_map(|s| {
            let name = normalize_name(&s.name);
            if trailing_ordinal(&name) != wanted_ordinal {
                return None;
            }
            let sim = strsim::jaro_winkler(&wanted, &name);
            (sim >= FUZZY_NAME_THRESHOLD).then_some((sim, s.code.as_str()))
        })
        .collect();
    match candidates.as_slice() {
        [(sim, code)] => {
            debug!(entry, code, similarity = sim, "fuzzy subject name match");
            Some(NameMatch { code: code.to_string(), kind: MatchKind::Fuzzy, similarity: *sim })
        }
        [] => None,
        many => {
            debug!(entry, candidates = many.len(), "ambiguous subject name, left unresolved");
            None
        }
    }
}

/// Versión parametrizable para pruebas: recibe un `resolver` que intenta
/// mapear un nombre a código. Las entradas que no se resuelven quedan como
/// estaban y el motor las trata según la política de códigos desconocidos;
/// con `Reject` un match sólo difuso también queda sin resolver.
pub fn resolve_selection_with_resolver<F>(
    selected: Vec<String>,
    policy: UnknownCodePolicy,
    resolver: F,
) -> (Vec<String>, Vec<ResolvedEntry>)
where
    F: Fn(&str) -> Option<NameMatch>,
{
    let mut codes = Vec::with_capacity(selected.len());
    let mut resolved = Vec::new();
    for entry in selected {
        match resolver(&entry) {
            Some(m) if m.kind == MatchKind::Fuzzy && policy == UnknownCodePolicy::Reject => {
                warn!(entry = %entry, code = %m.code, "fuzzy match not accepted under reject policy");
                codes.push(entry);
            }
            Some(m) if m.kind == MatchKind::Code => codes.push(m.code),
            Some(m) => {
                codes.push(m.code.clone());
                resolved.push(ResolvedEntry { entry, code: m.code, kind: m.kind, similarity: m.similarity });
            }
            None => codes.push(entry),
        }
    }
    (codes, resolved)
}

/// Parsea la petición, resuelve nombres, ejecuta `generate` y arma la respuesta.
pub fn handle_request(catalog: &Catalog, json_str: &str, base: GenerateOptions) -> Result<ScheduleResponse> {
    let request = parse_request(json_str)?;
    let options = request.options.merge_into(base)?;
    let (selected, resolved) =
        resolve_selection_with_resolver(request.selected, options.unknown_codes, |e| resolve_in_catalog(catalog, e));
    let outcome = generate(catalog, &selected, &options)?;
    Ok(ScheduleResponse {
        generated_at: Utc::now(),
        schedules_count: outcome.schedules.len(),
        combinations_found: outcome.combinations_found,
        partial: outcome.partial,
        stop_reason: outcome.stop_reason,
        selected,
        resolved,
        unknown_codes: outcome.unknown_codes,
        eligibility: outcome.eligibility,
        schedules: outcome.schedules,
    })
}

/// Resultado del chequeo manual de un horario armado a mano.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    pub ok: bool,
    pub conflicts: Vec<ConflictPair>,
}

/// Chequea choques entre secciones elegidas a mano, en formato "CODIGO:SECCION".
pub fn check_picks<S: AsRef<str>>(catalog: &Catalog, picks: &[S]) -> Result<CheckResponse> {
    let mut chosen: Vec<ChosenGroup> = Vec::with_capacity(picks.len());
    let mut seen: HashSet<String> = HashSet::new();
    for pick in picks.iter().map(|p| p.as_ref()) {
        let (code, number) = pick
            .split_once(':')
            .ok_or_else(|| ScheduleError::InvalidInput(format!("pick '{}' must look like CODE:GROUP", pick)))?;
        let subject = catalog
            .subject(code.trim())
            .ok_or_else(|| ScheduleError::UnknownSubject(vec![code.trim().to_string()]))?;
        // un horario lleva una sola sección por ramo
        if !seen.insert(subject.code.clone()) {
            return Err(ScheduleError::InvalidInput(format!("subject {} picked more than once", subject.code)));
        }
        let group = subject
            .groups
            .iter()
            .find(|g| g.number == number.trim())
            .ok_or_else(|| ScheduleError::InvalidInput(format!("subject {} has no group {}", subject.code, number.trim())))?;
        chosen.push(ChosenGroup::from_group(&subject.code, group));
    }
    let conflicts = conflict_report(&chosen);
    Ok(CheckResponse { ok: conflicts.is_empty(), conflicts })
}
