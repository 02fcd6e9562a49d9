use crate::index::{term_frequency, Index, Position, TermVector};
use crate::tokenizer::tokenize;
use serde::Serialize;

/// Best local candidate for a query. `position` is `None` when no document
/// scored above zero ("no relevant answer found").
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredMatch {
    pub position: Option<Position>,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hit {
    pub position: Position,
    pub score: f64,
}

/// TF-IDF vector of a query, weighted by the index's IDF table.
/// The query never changes the index's document frequencies.
pub fn vectorize_query(text: &str, index: &Index) -> TermVector {
    let tokens = tokenize(text);
    let tf = term_frequency(&tokens);
    tf.into_iter().map(|(t, w)| {
        let idf = index.idf(&t);
        (t, w * idf)
    }).collect()
}

/// Cosine similarity; 0 when either vector has zero norm.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let mut dot = 0.0;
    for (t, wa) in a {
        if let Some(wb) = b.get(t) {
            dot += wa * wb;
        }
    }
    let norm_a = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = b.values().map(|w| w * w).sum::<f64>().sqrt();
    let denom = norm_a * norm_b;
    if denom == 0.0 { 0.0 } else { dot / denom }
}

/// Scan every document and keep the strictly highest score; ties keep the
/// lowest position.
pub fn score(query: &str, index: &Index) -> ScoredMatch {
    let q = vectorize_query(query, index);
    let mut best = ScoredMatch { position: None, score: 0.0 };
    for (pos, doc) in index.vectors().iter().enumerate() {
        let s = cosine_similarity(&q, doc);
        tracing::trace!(position = pos, score = s, "scored document");
        if s > best.score {
            best = ScoredMatch { position: Some(pos), score: s };
        }
    }
    tracing::debug!(position = ?best.position, score = best.score, "best local match");
    best
}

/// Every document ranked by descending similarity, corpus order on ties, first `k` kept.
pub fn rank(query: &str, index: &Index, k: usize) -> Vec<Hit> {
    let q = vectorize_query(query, index);
    let mut scored: Vec<Hit> = index
        .vectors()
        .iter()
        .enumerate()
        .map(|(position, doc)| Hit { position, score: cosine_similarity(&q, doc) })
        .collect();
    // sort_by is stable
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::QaRecord;

    fn corpus() -> Index {
        Index::build(vec![
            QaRecord::new("How do I stake ALGO?", "Use a participation key."),
            QaRecord::new("What is an ASA?", "An Algorand Standard Asset."),
            QaRecord::new("How do I stake ALGO?", "Duplicate entry."),
            QaRecord::new("What are atomic transfers?", "Grouped transactions."),
            QaRecord::new("Explain rekeying", "Changing the authorized spending key."),
        ])
        .unwrap()
    }

    #[test]
    fn empty_query_scores_zero_everywhere() {
        let index = corpus();
        let q = vectorize_query("", &index);
        assert!(q.values().all(|w| *w == 0.0));
        for doc in index.vectors() {
            assert_eq!(cosine_similarity(&q, doc), 0.0);
        }
        assert_eq!(score("", &index), ScoredMatch { position: None, score: 0.0 });
    }

    #[test]
    fn unseen_tokens_weigh_zero() {
        let index = corpus();
        let q = vectorize_query("xyzzy rekeying", &index);
        assert_eq!(q["xyzzy"], 0.0);
        assert!(q["rekeying"] > 0.0);
    }

    #[test]
    fn zero_norm_is_zero_similarity() {
        let zero: TermVector = [("a".to_string(), 0.0)].into_iter().collect();
        let other: TermVector = [("a".to_string(), 1.0)].into_iter().collect();
        assert_eq!(cosine_similarity(&zero, &other), 0.0);
        assert_eq!(cosine_similarity(&TermVector::new(), &TermVector::new()), 0.0);
    }

    #[test]
    fn ties_keep_lowest_position() {
        let index = corpus();
        let best = score("stake algo", &index);
        assert_eq!(best.position, Some(0));
        let hits = rank("stake algo", &index, 2);
        assert_eq!(hits[0].position, 0);
        assert_eq!(hits[1].position, 2);
        assert!((hits[0].score - hits[1].score).abs() < 1e-12);
    }

    #[test]
    fn rank_respects_k() {
        let index = corpus();
        assert_eq!(rank("rekeying", &index, 3).len(), 3);
        assert_eq!(rank("rekeying", &index, 100).len(), 5);
        assert_eq!(rank("rekeying", &index, 1)[0].position, 4);
    }

    #[test]
    fn gibberish_has_no_match() {
        let index = corpus();
        let best = score("completely unrelated gibberish xyzzy", &index);
        assert_eq!(best.position, None);
        assert_eq!(best.score, 0.0);
    }
}
