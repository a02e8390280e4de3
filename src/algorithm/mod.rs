// Motor de generación de horarios.
// Submódulos (archivos en la carpeta `src/algorithm`), de las hojas hacia arriba:
// conflict -> filters -> search/parallel -> score -> rank -> pipeline
pub mod conflict;
pub mod filters;
pub mod parallel;
pub mod pipeline;
pub mod rank;
pub mod score;
pub mod search;

pub use conflict::{conflict_report, conflicts, conflicts_with_combination, groups_conflict, parse_slot, ConflictPair};
pub use filters::{filter_eligible, EligibilityReport, EligibleSubject};
pub use parallel::search_combinations_parallel;
pub use pipeline::{generate, GenerateOptions, GenerateOutcome, UnknownCodePolicy};
pub use rank::rank;
pub use score::score_combination;
pub use search::{search_combinations, CancelToken, SearchLimits, SearchResult, SearchStats, StopReason};
