use crate::models::ScoredCombination;

/// Ordena de mayor a menor puntaje y deja sólo las `top_k` primeras.
/// El sort es estable: los empates conservan el orden de descubrimiento.
pub fn rank(mut scored: Vec<ScoredCombination>, top_k: usize) -> Vec<ScoredCombination> {
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(top_k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChosenGroup, Combination, ScoreDetails};

    fn make(code: &str, score: i64) -> ScoredCombination {
        ScoredCombination {
            combination: Combination {
                groups: vec![ChosenGroup {
                    subject_code: code.to_string(),
                    group_number: "1".to_string(),
                    time_slots: Vec::new(),
                    professor: None,
                    capacity_available: 1,
                }],
            },
            score,
            details: ScoreDetails::default(),
        }
    }

    fn codes(v: &[ScoredCombination]) -> Vec<&str> {
        v.iter().map(|s| s.combination.groups[0].subject_code.as_str()).collect()
    }

    #[test]
    fn test_rank_desc_y_estable() {
        let v = vec![make("A", 10), make("B", 30), make("C", 10), make("D", 30)];
        let ranked = rank(v, 10);
        assert_eq!(codes(&ranked), vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn test_rank_trunca() {
        let v = vec![make("A", 1), make("B", 2), make("C", 3)];
        let ranked = rank(v, 2);
        assert_eq!(codes(&ranked), vec!["C", "B"]);
        assert!(rank(vec![make("A", 1)], 0).is_empty());
    }
}
