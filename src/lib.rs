// Biblioteca raíz del crate `quickslot`.
// Reexporta los módulos principales y las funciones de conveniencia que usa
// el binario: cargar el catálogo y generar horarios sin choques.
pub mod algorithm;
pub mod api_json;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;

pub use algorithm::{generate, GenerateOptions, GenerateOutcome, UnknownCodePolicy};
pub use catalog::{load_catalog, parse_catalog};
pub use error::{Result, ScheduleError};
