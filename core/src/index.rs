use crate::corpus::{load_corpus, QaRecord};
use crate::error::IndexError;
use crate::tokenizer::tokenize;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// Zero-based position of a record in the corpus.
pub type Position = usize;

/// Sparse token -> weight map. Absent tokens weigh 0. Ordered so that sums
/// over identical vectors are bit-identical.
pub type TermVector = BTreeMap<String, f64>;

/// Immutable TF-IDF index over the questions of a corpus.
///
/// The IDF table, document vectors and corpus are built together and never
/// mutated; a new corpus means a new `Index`.
#[derive(Debug, Clone)]
pub struct Index {
    corpus: Arc<[QaRecord]>,
    idf: HashMap<String, f64>,
    vectors: Vec<TermVector>, // aligned with corpus
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub documents: usize,
    pub vocabulary: usize,
    /// Questions that tokenize to nothing and can never match.
    pub empty_documents: usize,
}

impl Index {
    /// Build the index. Fails with [`IndexError::EmptyCorpus`] when there are no records.
    pub fn build(corpus: Vec<QaRecord>) -> Result<Self, IndexError> {
        if corpus.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }
        let documents: Vec<Vec<String>> = corpus.iter().map(|qa| tokenize(&qa.question)).collect();
        let idf = inverse_document_frequency(&documents);
        let vectors: Vec<TermVector> = documents
            .iter()
            .enumerate()
            .map(|(pos, doc)| {
                if doc.is_empty() {
                    tracing::debug!(position = pos, "question has no indexable tokens");
                }
                weigh(&term_frequency(doc), &idf)
            })
            .collect();

        let index = Self { corpus: corpus.into(), idf, vectors };
        let stats = index.stats();
        tracing::info!(documents = stats.documents, vocabulary = stats.vocabulary, empty = stats.empty_documents, "built tf-idf index");
        Ok(index)
    }

    /// Load a corpus file and build its index in one step.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        let corpus = load_corpus(path)?;
        Self::build(corpus)
    }

    pub fn len(&self) -> usize { self.corpus.len() }

    pub fn is_empty(&self) -> bool { self.corpus.is_empty() }

    pub fn records(&self) -> &[QaRecord] { &self.corpus }

    pub fn record(&self, pos: Position) -> Option<&QaRecord> { self.corpus.get(pos) }

    pub fn vectors(&self) -> &[TermVector] { &self.vectors }

    /// IDF of a token; tokens never seen in the corpus score 0.
    pub fn idf(&self, token: &str) -> f64 { self.idf.get(token).copied().unwrap_or(0.0) }

    pub fn vocabulary(&self) -> impl Iterator<Item = &str> { self.idf.keys().map(String::as_str) }

    pub fn contains_term(&self, token: &str) -> bool { self.idf.contains_key(token) }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            documents: self.corpus.len(),
            vocabulary: self.idf.len(),
            empty_documents: self.vectors.iter().filter(|v| v.is_empty()).count(),
        }
    }
}

/// Relative term frequency; an empty token list gives an empty map.
pub(crate) fn term_frequency(tokens: &[String]) -> TermVector {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_insert(0) += 1;
    }
    let total = tokens.len() as f64;
    counts.into_iter().map(|(t, c)| (t, c as f64 / total)).collect()
}

/// Smoothed IDF `ln(N / (1 + df))`. Ubiquitous tokens go negative and stay negative.
fn inverse_document_frequency(documents: &[Vec<String>]) -> HashMap<String, f64> {
    let n = documents.len() as f64;
    let mut df: HashMap<&str, u32> = HashMap::new();
    for doc in documents {
        let seen: HashSet<&str> = doc.iter().map(String::as_str).collect();
        for token in seen {
            *df.entry(token).or_insert(0) += 1;
        }
    }
    df.into_iter()
        .map(|(t, df_t)| (t.to_string(), (n / (1.0 + df_t as f64)).ln()))
        .collect()
}

fn weigh(tf: &TermVector, idf: &HashMap<String, f64>) -> TermVector {
    tf.iter()
        .map(|(t, w)| (t.clone(), w * idf.get(t).copied().unwrap_or(0.0)))
        .collect()
}
