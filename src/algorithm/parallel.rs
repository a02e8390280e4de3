// Versión paralela de la búsqueda de combinaciones.
//
// Reparte las secciones del primer ramo en bloques contiguos, uno por hilo.
// Los hilos comparten los guardas (contador global de combinaciones, flag de
// parada y deadline), así el total queda acotado por `max_combinations`.
// Los resultados se unen en el orden de los bloques: sin guardas activados,
// el orden es idéntico al de la versión secuencial.
use std::collections::HashSet;

use crate::algorithm::filters::EligibleSubject;
use crate::algorithm::search::{
    Guards, SearchContext, SearchLimits, SearchResult, SearchStats, search_combinations,
};
use crate::models::Combination;

/// 0 significa "un hilo por CPU".
pub fn resolve_workers(requested: usize) -> usize {
    if requested == 0 { num_cpus::get().max(1) } else { requested }
}

pub fn search_combinations_parallel(
    subjects: &[EligibleSubject<'_>],
    limits: &SearchLimits,
    workers: usize,
) -> SearchResult {
    if subjects.is_empty() || subjects.iter().any(|s| s.groups.is_empty()) {
        return SearchResult::default();
    }
    let first = &subjects[0].groups;
    let workers = resolve_workers(workers).min(first.len());
    if workers <= 1 {
        return search_combinations(subjects, limits);
    }

    let guards = Guards::new(limits);
    let chunk_size = first.len().div_ceil(workers);
    tracing::debug!(workers, chunk_size, first_level = first.len(), "parallel search fan-out");

    let partials: Vec<(Vec<Combination>, SearchStats)> = std::thread::scope(|scope| {
        let handles: Vec<_> = first
            .chunks(chunk_size)
            .map(|chunk| {
                let guards = &guards;
                scope.spawn(move || SearchContext::new(subjects, guards).run(chunk))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|payload| std::panic::resume_unwind(payload)))
            .collect()
    });

    let mut seen: HashSet<String> = HashSet::new();
    let mut combinations = Vec::new();
    let mut stats = SearchStats::default();
    for (found, worker_stats) in partials {
        stats.absorb(&worker_stats);
        for combination in found {
            if seen.insert(combination.dedup_key()) {
                combinations.push(combination);
            } else {
                stats.duplicates_discarded += 1;
            }
        }
    }

    SearchResult { combinations, stop_reason: guards.stop_reason(), stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::conflict::parse_slot;
    use crate::models::{Group, Subject};
    use std::time::Duration;

    fn subject(code: &str, n: usize, day: &str) -> Subject {
        Subject {
            code: code.to_string(),
            name: code.to_string(),
            groups: (0..n)
                .map(|i| Group {
                    number: format!("{}", i + 1),
                    capacity_max: 30,
                    capacity_available: 5,
                    professor: None,
                    slots: vec![parse_slot(&format!("{} {}-{}", day, 8 + i, 9 + i)).unwrap()],
                })
                .collect(),
        }
    }

    fn limits(max: usize) -> SearchLimits {
        SearchLimits { max_combinations: max, time_budget: Duration::from_secs(30), cancel: None }
    }

    #[test]
    fn test_paralelo_igual_a_secuencial() {
        let subjects = vec![subject("A", 7, "LU"), subject("B", 4, "LU"), subject("C", 3, "MA")];
        let el: Vec<EligibleSubject<'_>> = subjects
            .iter()
            .map(|s| EligibleSubject { subject: s, groups: s.groups.iter().collect() })
            .collect();
        let seq = search_combinations(&el, &limits(10_000));
        let par = search_combinations_parallel(&el, &limits(10_000), 3);
        assert!(!par.partial());
        assert_eq!(seq.combinations, par.combinations);
    }

    #[test]
    fn test_paralelo_respeta_limite_global() {
        let subjects = vec![subject("A", 8, "LU"), subject("B", 8, "MA")];
        let el: Vec<EligibleSubject<'_>> = subjects
            .iter()
            .map(|s| EligibleSubject { subject: s, groups: s.groups.iter().collect() })
            .collect();
        let par = search_combinations_parallel(&el, &limits(5), 4);
        assert!(par.combinations.len() <= 5);
        assert!(par.partial());
    }

    #[test]
    fn test_resolve_workers() {
        assert_eq!(resolve_workers(3), 3);
        assert!(resolve_workers(0) >= 1);
    }
}
