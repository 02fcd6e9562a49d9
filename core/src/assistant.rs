use crate::cancel::CancelToken;
use crate::config::EngineConfig;
use crate::error::{AnswerError, ConfigError, IndexError};
use crate::fallback::{FallbackPolicy, Route};
use crate::index::{Index, IndexStats};
use crate::query::{score, ScoredMatch};
use crate::remote::{fetch_with_deadline, AnswerProvider};
use parking_lot::RwLock;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub source: AnswerSource,
    pub answer: String,
    /// Best local score, also reported for remote answers.
    pub score: f64,
    /// Best local question, if any document scored above zero.
    pub matched_question: Option<String>,
}

/// Outcome of the local half of a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lookup {
    pub generation: u64,
    pub best: ScoredMatch,
    pub route: Route,
}

/// A published index together with its generation number.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    pub generation: u64,
    pub index: Arc<Index>,
}

/// Answers questions against the current index snapshot and routes
/// low-confidence queries to a remote provider.
///
/// Queries clone the current `Arc<Index>` and work on it without further
/// locking; reloads build a complete index first and then swap the pointer.
pub struct Assistant {
    current: RwLock<IndexSnapshot>,
    policy: FallbackPolicy,
    remote_timeout: Duration,
    provider: Arc<dyn AnswerProvider>,
}

impl Assistant {
    pub fn new(index: Index, config: EngineConfig, provider: Arc<dyn AnswerProvider>) -> Result<Self, ConfigError> {
        let policy = config.validate()?;
        Ok(Self {
            current: RwLock::new(IndexSnapshot { generation: 1, index: Arc::new(index) }),
            policy,
            remote_timeout: config.remote_timeout,
            provider,
        })
    }

    pub fn snapshot(&self) -> IndexSnapshot { self.current.read().clone() }

    pub fn policy(&self) -> FallbackPolicy { self.policy }

    /// Publish `index` as the new generation and return its number.
    pub fn replace(&self, index: Index) -> u64 {
        let index = Arc::new(index);
        let mut slot = self.current.write();
        let generation = slot.generation + 1;
        *slot = IndexSnapshot { generation, index };
        generation
    }

    /// Rebuild from a corpus file. On error the current index stays active.
    pub fn reload<P: AsRef<Path>>(&self, path: P) -> Result<(u64, IndexStats), IndexError> {
        let path = path.as_ref();
        let index = match Index::from_path(path) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corpus reload failed; keeping current index");
                return Err(e);
            }
        };
        let stats = index.stats();
        let generation = self.replace(index);
        tracing::info!(generation, documents = stats.documents, "corpus reloaded");
        Ok((generation, stats))
    }

    /// Score locally and decide the route without contacting the provider.
    pub fn lookup(&self, query: &str) -> Lookup {
        let snap = self.snapshot();
        let best = score(query, &snap.index);
        Lookup { generation: snap.generation, best, route: self.policy.decide(best.score) }
    }

    /// Query API: a trusted local answer, or the remote provider's answer.
    pub async fn answer(&self, query: &str, cancel: &CancelToken) -> Result<Answer, AnswerError> {
        let snap = self.snapshot();
        let best = score(query, &snap.index);
        let matched = best.position.and_then(|pos| snap.index.record(pos));
        let matched_question = matched.map(|qa| qa.question.clone());

        if let (Route::LocalMatch, Some(qa)) = (self.policy.decide(best.score), matched) {
            return Ok(Answer {
                source: AnswerSource::Local,
                answer: qa.answer.clone(),
                score: best.score,
                matched_question,
            });
        }

        tracing::debug!(score = best.score, threshold = self.policy.threshold(), "local match below threshold, asking remote");
        let answer = fetch_with_deadline(self.provider.as_ref(), query, self.remote_timeout, cancel).await?;
        Ok(Answer { source: AnswerSource::Remote, answer, score: best.score, matched_question })
    }
}
