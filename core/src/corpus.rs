use crate::error::CorpusLoadError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// A curated question/answer pair. Its position in the corpus is its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    pub question: String,
    pub answer: String,
}

impl QaRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self { question: question.into(), answer: answer.into() }
    }
}

/// Load an ordered corpus from disk. `.jsonl` files hold one record per line,
/// anything else is read as a JSON array of records.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<QaRecord>, CorpusLoadError> {
    let path = path.as_ref();
    let io_err = |source| CorpusLoadError::Io { path: path.to_path_buf(), source };
    let f = File::open(path).map_err(io_err)?;
    let records = if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        read_jsonl(BufReader::new(f), path)?
    } else {
        let mut buf = String::new();
        BufReader::new(f).read_to_string(&mut buf).map_err(io_err)?;
        parse_json(&buf)?
    };
    tracing::debug!(path = %path.display(), records = records.len(), "loaded corpus");
    Ok(records)
}

pub fn parse_json(text: &str) -> Result<Vec<QaRecord>, CorpusLoadError> {
    serde_json::from_str(text).map_err(|source| CorpusLoadError::Malformed { source })
}

pub fn parse_jsonl<R: BufRead>(reader: R) -> Result<Vec<QaRecord>, CorpusLoadError> {
    read_jsonl(reader, Path::new("<jsonl>"))
}

/// JSONL records from `reader`; read errors are reported against `origin`.
fn read_jsonl<R: BufRead>(reader: R, origin: &Path) -> Result<Vec<QaRecord>, CorpusLoadError> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CorpusLoadError::Io { path: origin.to_path_buf(), source })?;
        if line.trim().is_empty() { continue; }
        let record: QaRecord = serde_json::from_str(&line)
            .map_err(|source| CorpusLoadError::MalformedLine { line: idx + 1, source })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_json_array_in_order() {
        let recs = parse_json(r#"[{"question":"q1","answer":"a1"},{"question":"q2","answer":"a2"}]"#).unwrap();
        assert_eq!(recs, vec![QaRecord::new("q1", "a1"), QaRecord::new("q2", "a2")]);
    }

    #[test]
    fn rejects_missing_answer() {
        let err = parse_json(r#"[{"question":"q1"}]"#).unwrap_err();
        assert!(matches!(err, CorpusLoadError::Malformed { .. }));
    }

    #[test]
    fn rejects_non_array() {
        assert!(parse_json(r#"{"question":"q","answer":"a"}"#).is_err());
        assert!(parse_json("not json").is_err());
    }

    #[test]
    fn jsonl_skips_blank_lines_and_reports_line_numbers() {
        let input = "{\"question\":\"q1\",\"answer\":\"a1\"}\n\n{\"question\":2}\n";
        let err = parse_jsonl(Cursor::new(input)).unwrap_err();
        match err {
            CorpusLoadError::MalformedLine { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }

        let ok = parse_jsonl(Cursor::new("{\"question\":\"q1\",\"answer\":\"a1\"}\n\n")).unwrap();
        assert_eq!(ok.len(), 1);
    }

    #[test]
    fn jsonl_read_errors_name_the_corpus_file() {
        let mut f = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        std::io::Write::write_all(&mut f, b"\xff\xfe not utf-8\n").unwrap();
        match load_corpus(f.path()).unwrap_err() {
            CorpusLoadError::Io { path, .. } => assert_eq!(path, f.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_corpus("/definitely/not/here/qa_pairs.json").unwrap_err();
        assert!(matches!(err, CorpusLoadError::Io { .. }));
    }
}
