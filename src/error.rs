//! Tipos de error comunes del generador de horarios.

use thiserror::Error;

/// Resultado estándar de las operaciones del crate
pub type Result<T> = std::result::Result<T, ScheduleError>;

#[derive(Error, Debug)]
pub enum ScheduleError {
    /// Un código seleccionado no existe en el catálogo (política `reject`)
    #[error("unknown subject code(s): {}", .0.join(", "))]
    UnknownSubject(Vec<String>),

    /// Petición o catálogo con forma inválida
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Franja horaria mal formada o con horas fuera de rango
    #[error("invalid time slot '{slot}': {reason}")]
    InvalidSlot { slot: String, reason: String },

    #[error("invalid weekday '{0}'")]
    InvalidWeekday(String),

    /// Error al leer la configuración desde el entorno
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
