use proptest::prelude::*;
use qamatch::tokenizer::tokenize;
use qamatch::{cosine_similarity, vectorize_query, Index, QaRecord};

fn record() -> impl Strategy<Value = QaRecord> {
    ("[a-zA-Z0-9 ,.?!'-]{0,60}", "[a-z ]{1,20}").prop_map(|(q, a)| QaRecord::new(q, a))
}

proptest! {
    #[test]
    fn tokenize_is_deterministic(s in ".{0,200}") {
        prop_assert_eq!(tokenize(&s), tokenize(&s));
    }

    #[test]
    fn tokenized_text_is_a_fixed_point(s in "[a-zA-Z0-9 \t,.?!'()-]{0,120}") {
        let toks = tokenize(&s);
        prop_assert_eq!(tokenize(&toks.join(" ")), toks);
    }

    #[test]
    fn vectors_align_with_corpus_and_vocabulary(corpus in prop::collection::vec(record(), 1..12)) {
        let index = Index::build(corpus.clone()).unwrap();
        prop_assert_eq!(index.vectors().len(), corpus.len());
        for v in index.vectors() {
            for key in v.keys() {
                prop_assert!(index.contains_term(key), "{} missing from vocabulary", key);
            }
        }
        let vocab: std::collections::HashSet<&str> = index.vocabulary().collect();
        prop_assert_eq!(vocab.len(), index.stats().vocabulary);
    }

    #[test]
    fn similarity_is_bounded(corpus in prop::collection::vec(record(), 1..12), q in "[a-z ]{0,40}") {
        let index = Index::build(corpus).unwrap();
        let qv = vectorize_query(&q, &index);
        for doc in index.vectors() {
            let s = cosine_similarity(&qv, doc);
            prop_assert!(s.is_finite());
            prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&s));
        }
    }
}
