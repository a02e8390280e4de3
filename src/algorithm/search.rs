// Búsqueda de combinaciones: una sección por ramo, sin choques de horario.
//
// Estrategia: backtracking en el orden de la selección. Cada rama lleva la
// combinación parcial como una lista enlazada prestada desde la pila (`Trail`),
// así no hay push/pop sobre un vector compartido. Las secciones que chocan con
// la parcial se podan sin expandirse. En cada llamada recursiva se revisan los
// guardas (cancelación, máximo de combinaciones, presupuesto de tiempo); si
// alguno salta se devuelve lo acumulado y el resultado queda marcado parcial.
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::algorithm::conflict::conflicts_with_combination;
use crate::algorithm::filters::EligibleSubject;
use crate::models::{ChosenGroup, Combination, Group, Subject, canonical_key};

/// Token de cancelación compartible entre hilos.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Motivo por el que la búsqueda se detuvo antes de agotar el espacio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Cancelled = 1,
    CombinationLimit = 2,
    TimeBudget = 3,
}

impl StopReason {
    fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(StopReason::Cancelled),
            2 => Some(StopReason::CombinationLimit),
            3 => Some(StopReason::TimeBudget),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchLimits {
    pub max_combinations: usize,
    pub time_budget: Duration,
    pub cancel: Option<CancelToken>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub nodes_visited: u64,
    pub branches_pruned: u64,
    pub duplicates_discarded: u64,
}

impl SearchStats {
    pub(crate) fn absorb(&mut self, other: &SearchStats) {
        self.nodes_visited += other.nodes_visited;
        self.branches_pruned += other.branches_pruned;
        self.duplicates_discarded += other.duplicates_discarded;
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Combinaciones en orden de descubrimiento, sin duplicados
    pub combinations: Vec<Combination>,
    pub stop_reason: Option<StopReason>,
    pub stats: SearchStats,
}

impl SearchResult {
    /// True si algún guarda cortó la búsqueda (resultado no exhaustivo).
    pub fn partial(&self) -> bool {
        self.stop_reason.is_some()
    }
}

/// Guardas de una llamada; en la versión paralela se comparten entre hilos.
#[derive(Debug)]
pub(crate) struct Guards {
    max_combinations: usize,
    deadline: Option<Instant>,
    cancel: Option<CancelToken>,
    recorded: AtomicUsize,
    stop: AtomicU8,
}

impl Guards {
    pub(crate) fn new(limits: &SearchLimits) -> Self {
        Guards {
            max_combinations: limits.max_combinations,
            deadline: Instant::now().checked_add(limits.time_budget),
            cancel: limits.cancel.clone(),
            recorded: AtomicUsize::new(0),
            stop: AtomicU8::new(0),
        }
    }

    pub(crate) fn stop_reason(&self) -> Option<StopReason> {
        StopReason::from_u8(self.stop.load(Ordering::Acquire))
    }

    /// El primer motivo registrado gana.
    fn trip(&self, reason: StopReason) {
        let _ = self.stop.compare_exchange(0, reason as u8, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Revisa los guardas; devuelve true si la búsqueda debe detenerse.
    pub(crate) fn should_stop(&self) -> bool {
        if self.stop_reason().is_some() {
            return true;
        }
        let reason = if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            StopReason::Cancelled
        } else if self.recorded.load(Ordering::Relaxed) >= self.max_combinations {
            StopReason::CombinationLimit
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            StopReason::TimeBudget
        } else {
            return false;
        };
        self.trip(reason);
        true
    }

    /// Reserva un cupo del máximo global de combinaciones.
    fn try_reserve(&self) -> bool {
        let ok = self
            .recorded
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                if n < self.max_combinations { Some(n + 1) } else { None }
            })
            .is_ok();
        if !ok {
            self.trip(StopReason::CombinationLimit);
        }
        ok
    }
}

/// Nodo de la combinación parcial; apunta al nodo del nivel anterior.
struct Trail<'t, 'a> {
    subject: &'a Subject,
    group: &'a Group,
    parent: Option<&'t Trail<'t, 'a>>,
}

fn walk<'t, 'a>(trail: Option<&'t Trail<'t, 'a>>) -> impl Iterator<Item = &'t Trail<'t, 'a>> {
    std::iter::successors(trail, |node| node.parent)
}

/// Estado de búsqueda acotado a una invocación (o a un hilo en la versión paralela).
pub(crate) struct SearchContext<'g, 'a> {
    subjects: &'g [EligibleSubject<'a>],
    guards: &'g Guards,
    seen: HashSet<String>,
    found: Vec<Combination>,
    stats: SearchStats,
    halted: bool,
}

impl<'g, 'a> SearchContext<'g, 'a> {
    pub(crate) fn new(subjects: &'g [EligibleSubject<'a>], guards: &'g Guards) -> Self {
        SearchContext {
            subjects,
            guards,
            seen: HashSet::new(),
            found: Vec::new(),
            stats: SearchStats::default(),
            halted: false,
        }
    }

    /// Explora el primer nivel restringido a `first_groups` (todas en la versión secuencial).
    pub(crate) fn run(mut self, first_groups: &[&'a Group]) -> (Vec<Combination>, SearchStats) {
        if self.enter() {
            self.expand(0, first_groups, None);
        }
        (self.found, self.stats)
    }

    /// Entrada a una llamada recursiva: guardas + contador de nodos.
    fn enter(&mut self) -> bool {
        if self.halted || self.guards.should_stop() {
            self.halted = true;
            return false;
        }
        self.stats.nodes_visited += 1;
        true
    }

    fn descend<'t>(&mut self, depth: usize, trail: Option<&'t Trail<'t, 'a>>) {
        if !self.enter() {
            return;
        }
        let subjects = self.subjects;
        if depth == subjects.len() {
            self.record(trail);
            return;
        }
        self.expand(depth, &subjects[depth].groups, trail);
    }

    fn expand<'t>(&mut self, depth: usize, candidates: &[&'a Group], trail: Option<&'t Trail<'t, 'a>>) {
        let subject = self.subjects[depth].subject;
        for &group in candidates {
            let chosen = walk(trail).map(|node| node.group.slots.as_slice());
            if conflicts_with_combination(&group.slots, chosen) {
                self.stats.branches_pruned += 1;
                continue;
            }
            let node = Trail { subject, group, parent: trail };
            self.descend(depth + 1, Some(&node));
            if self.halted {
                return;
            }
        }
    }

    fn record<'t>(&mut self, trail: Option<&'t Trail<'t, 'a>>) {
        let key = canonical_key(walk(trail).map(|n| (n.subject.code.as_str(), n.group.number.as_str())));
        if self.seen.contains(&key) {
            self.stats.duplicates_discarded += 1;
            return;
        }
        if !self.guards.try_reserve() {
            self.halted = true;
            return;
        }
        let mut groups: Vec<ChosenGroup> = walk(trail)
            .map(|n| ChosenGroup::from_group(&n.subject.code, n.group))
            .collect();
        groups.reverse();
        self.seen.insert(key);
        self.found.push(Combination { groups });
    }
}

/// Enumera las combinaciones válidas de los ramos elegibles.
///
/// Si no hay ramos o alguno quedó sin secciones, devuelve un resultado vacío
/// (no parcial).
pub fn search_combinations(subjects: &[EligibleSubject<'_>], limits: &SearchLimits) -> SearchResult {
    if subjects.is_empty() || subjects.iter().any(|s| s.groups.is_empty()) {
        return SearchResult::default();
    }
    let guards = Guards::new(limits);
    let (combinations, stats) = SearchContext::new(subjects, &guards).run(&subjects[0].groups);
    SearchResult { combinations, stop_reason: guards.stop_reason(), stats }
}
