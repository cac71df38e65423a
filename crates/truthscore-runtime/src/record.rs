//! Evaluation records and an append-only JSON-lines sink.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use truthscore_core::TruthScoreResult;

use crate::orchestrator::{RetrievalStatus, RuntimeResult};

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Malformed record on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// One scored answer, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub question: String,
    pub answer: String,
    pub result: TruthScoreResult,
    pub retrieval: RetrievalStatus,
    pub recorded_at: DateTime<Utc>,
}

impl EvaluationRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, runtime: &RuntimeResult) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            result: runtime.evaluation.clone(),
            retrieval: runtime.retrieval.clone(),
            recorded_at: Utc::now(),
        }
    }
}

/// Appends one JSON object per line. Existing content is never rewritten.
pub struct JsonlSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlSink {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write and flush one record.
    pub fn append<T: Serialize>(&self, record: &T) -> Result<(), SinkError> {
        let line = serde_json::to_string(record)?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)
            .and_then(|_| writer.flush())
            .map_err(|source| SinkError::Io {
                path: self.path.clone(),
                source,
            })
    }

    /// Read every record back from a JSON-lines file. Blank lines are skipped.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<EvaluationRecord>, SinkError> {
        let path = path.as_ref();
        let io_err = |source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(io_err)?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| SinkError::Decode {
                line: index + 1,
                source,
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use truthscore_core::evaluate_truthfulness;

    fn runtime_result(answer: &str) -> RuntimeResult {
        RuntimeResult {
            evaluation: evaluate_truthfulness("Is the sky blue?", answer, None).unwrap(),
            retrieval: RetrievalStatus::Retrieved {
                snippets: 0,
                attempts: 1,
            },
            cached: false,
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");

        let first = EvaluationRecord::new("Is the sky blue?", "Yes.", &runtime_result("Yes."));
        let second = EvaluationRecord::new(
            "Is the sky blue?",
            "The sky is blue.",
            &runtime_result("The sky is blue."),
        );

        let sink = JsonlSink::open(&path).unwrap();
        sink.append(&first).unwrap();
        sink.append(&second).unwrap();

        let records = JsonlSink::read_all(&path).unwrap();
        assert_eq!(records.len(), 2);
        for (read, written) in records.iter().zip([&first, &second]) {
            assert_eq!(read.question, written.question);
            assert_eq!(read.answer, written.answer);
            assert_eq!(read.retrieval, written.retrieval);
            assert_eq!(read.recorded_at, written.recorded_at);
            assert_eq!(read.result.decision, written.result.decision);
            assert!((read.result.score - written.result.score).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        let record = EvaluationRecord::new("Q?", "A.", &runtime_result("A."));

        JsonlSink::open(&path).unwrap().append(&record).unwrap();
        JsonlSink::open(&path).unwrap().append(&record).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        std::fs::write(&path, "\n{not json}\n").unwrap();

        let result = JsonlSink::read_all(&path);
        assert!(matches!(result, Err(SinkError::Decode { line: 2, .. })));
    }
}
