//! Configuración del motor leída desde el entorno (con soporte para `.env`).
//!
//! Variables reconocidas (todas opcionales):
//! - `QUICKSLOT_MIN_START_HOUR`
//! - `QUICKSLOT_MAX_COMBINATIONS`
//! - `QUICKSLOT_TIME_BUDGET_MS`
//! - `QUICKSLOT_TOP_K`
//! - `QUICKSLOT_WORKERS` (0 = un hilo por CPU)
//! - `QUICKSLOT_UNKNOWN_CODES` (`ignore` | `reject`)

use std::env;
use std::str::FromStr;

use crate::algorithm::pipeline::{GenerateOptions, UnknownCodePolicy};
use crate::error::{Result, ScheduleError};

// carga .env si existe; no es error que falte
fn load_dotenv() {
    let _ = dotenv::dotenv();
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ScheduleError::Config(format!("{} has an invalid value '{}'", name, raw)))
}

// 0 dejaría el resultado vacío sin marcarlo como parcial
fn parse_positive(name: &str, raw: &str) -> Result<usize> {
    let value: usize = parse_var(name, raw)?;
    if value == 0 {
        return Err(ScheduleError::Config(format!("{} must be positive", name)));
    }
    Ok(value)
}

/// Aplica sobre `base` las variables presentes en `lookup`.
/// Separado de `env::var` para poder probarlo sin tocar el entorno del proceso.
pub fn apply_overrides<F>(mut base: GenerateOptions, lookup: F) -> Result<GenerateOptions>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("QUICKSLOT_MIN_START_HOUR") {
        let hour: u8 = parse_var("QUICKSLOT_MIN_START_HOUR", &v)?;
        if hour > 23 {
            return Err(ScheduleError::Config(format!("QUICKSLOT_MIN_START_HOUR must be 0-23, got {}", hour)));
        }
        base.min_start_hour = hour;
    }
    if let Some(v) = lookup("QUICKSLOT_MAX_COMBINATIONS") {
        base.max_combinations = parse_positive("QUICKSLOT_MAX_COMBINATIONS", &v)?;
    }
    if let Some(v) = lookup("QUICKSLOT_TIME_BUDGET_MS") {
        base.time_budget_ms = parse_var("QUICKSLOT_TIME_BUDGET_MS", &v)?;
    }
    if let Some(v) = lookup("QUICKSLOT_TOP_K") {
        base.top_k = parse_positive("QUICKSLOT_TOP_K", &v)?;
    }
    if let Some(v) = lookup("QUICKSLOT_WORKERS") {
        base.workers = parse_var("QUICKSLOT_WORKERS", &v)?;
    }
    if let Some(v) = lookup("QUICKSLOT_UNKNOWN_CODES") {
        base.unknown_codes = v.parse::<UnknownCodePolicy>()?;
    }
    Ok(base)
}

/// Opciones por defecto del motor, ajustadas con las variables de entorno.
pub fn options_from_env() -> Result<GenerateOptions> {
    load_dotenv();
    apply_overrides(GenerateOptions::default(), |name| env::var(name).ok())
}
