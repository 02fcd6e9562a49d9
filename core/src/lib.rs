//! Question matching over a curated question/answer corpus: TF-IDF vectors,
//! cosine ranking and a confidence gate that falls back to a remote provider.

pub mod assistant;
pub mod cancel;
pub mod config;
pub mod corpus;
pub mod error;
pub mod fallback;
pub mod index;
pub mod query;
pub mod remote;
pub mod tokenizer;

pub use assistant::{Answer, AnswerSource, Assistant, IndexSnapshot, Lookup};
pub use cancel::CancelToken;
pub use config::EngineConfig;
pub use corpus::{load_corpus, QaRecord};
pub use error::{AnswerError, ConfigError, CorpusLoadError, IndexError, RemoteProviderError};
pub use fallback::{FallbackPolicy, Route, DEFAULT_THRESHOLD};
pub use index::{Index, IndexStats, Position, TermVector};
pub use query::{cosine_similarity, rank, score, vectorize_query, Hit, ScoredMatch};
pub use remote::{AnswerProvider, DisabledProvider, HttpAnswerProvider};
