//! TruthScore CLI - score LLM answers from the command line.
//!
//! Usage:
//!   truthscore score --question "..." --answer "..." [--corpus docs.json] [--format json]
//!   truthscore batch --input pairs.jsonl --output records.jsonl [--corpus docs.json]
//!   truthscore validate-config scoring.yaml
//!   truthscore show-config [--runtime]
//!
//! Exit codes:
//!   0 - success
//!   1 - error (bad input, invalid config, I/O failure)
//!   2 - answer refused (only with `score --fail-on-refuse`)

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use truthscore_core::{
    Corpus, Decision, EvidenceSnippet, KeywordRetriever, ScoringConfig, TruthScoreResult,
    TruthScorer,
};
use truthscore_runtime::{
    BatchItem, EvaluationRecord, JsonlSink, RuntimeConfig, RuntimeError, RuntimeOrchestrator,
    RuntimeResult,
};

#[derive(Parser)]
#[command(name = "truthscore", author, version, about = "Verification-gated truth scoring for LLM answers")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one answer
    Score {
        /// The question that was asked
        #[arg(short, long)]
        question: String,

        /// The answer to score
        #[arg(short, long)]
        answer: String,

        /// JSON array of evidence snippets; skips retrieval
        #[arg(long, conflicts_with = "corpus")]
        evidence: Option<PathBuf>,

        /// JSON array of {id, text} documents to retrieve evidence from
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Scoring config (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Exit with code 2 when the answer is refused
        #[arg(long)]
        fail_on_refuse: bool,
    },

    /// Score a JSON-lines file of {question, answer} pairs
    Batch {
        /// Input JSON-lines file
        #[arg(short, long)]
        input: PathBuf,

        /// Records are appended here, one JSON object per line
        #[arg(short, long)]
        output: PathBuf,

        /// JSON array of {id, text} documents to retrieve evidence from
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Scoring config (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Runtime config (YAML): timeouts, retries, cache, concurrency
        #[arg(long)]
        runtime_config: Option<PathBuf>,
    },

    /// Check a scoring config file
    ValidateConfig {
        /// Path to the config file
        file: PathBuf,
    },

    /// Print the default configuration as YAML
    ShowConfig {
        /// Print the runtime config instead of the scoring config
        #[arg(long)]
        runtime: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Score {
            question,
            answer,
            evidence,
            corpus,
            config,
            format,
            fail_on_refuse,
        } => {
            let scorer = build_scorer(corpus.as_deref(), config.as_deref())?;
            let result = match evidence {
                Some(path) => {
                    let snippets = load_evidence(&path)?;
                    scorer.evaluate_with_evidence(&question, &answer, &snippets)?
                }
                None => scorer.evaluate(&question, &answer)?,
            };

            match format {
                OutputFormat::Text => print!("{}", render_text(&result)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            }

            if fail_on_refuse && result.decision == Decision::Refuse {
                return Ok(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Batch {
            input,
            output,
            corpus,
            config,
            runtime_config,
        } => {
            let scorer = build_scorer(corpus.as_deref(), config.as_deref())?;
            let runtime_config = match runtime_config {
                Some(path) => RuntimeConfig::from_file(&path)
                    .with_context(|| format!("Failed to load runtime config {}", path.display()))?,
                None => RuntimeConfig::default(),
            };
            let orchestrator = RuntimeOrchestrator::builder()
                .scorer(scorer)
                .config(runtime_config)
                .build()?;

            let items = load_batch(&input)?;
            let sink = JsonlSink::open(&output)?;
            let results = orchestrator.evaluate_batch(&items).await;
            let summary = write_records(&sink, &items, results)?;

            println!("Scored {} answers -> {}", summary.scored, output.display());
            for (decision, count) in summary.decisions {
                println!("  {:<9} {}", decision, count);
            }
            if summary.fallbacks > 0 {
                println!("  {} scored without evidence (retrieval failed)", summary.fallbacks);
            }
            if summary.failed > 0 {
                eprintln!("Error: {} of {} answers could not be scored", summary.failed, items.len());
                return Ok(ExitCode::from(1));
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::ValidateConfig { file } => {
            let config = ScoringConfig::from_file(&file)
                .with_context(|| format!("Invalid config {}", file.display()))?;
            println!("✓ {} is valid", file.display());
            print!("{}", config.to_yaml()?);
            Ok(ExitCode::SUCCESS)
        }

        Commands::ShowConfig { runtime } => {
            let yaml = if runtime {
                serde_yaml::to_string(&RuntimeConfig::default())?
            } else {
                ScoringConfig::default().to_yaml()?
            };
            print!("{}", yaml);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_scorer(corpus: Option<&Path>, config: Option<&Path>) -> Result<TruthScorer> {
    let mut scorer = TruthScorer::new();

    if let Some(path) = config {
        let config = ScoringConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        scorer = scorer.with_config(config);
    }

    if let Some(path) = corpus {
        let corpus = Corpus::from_json_file(path)
            .with_context(|| format!("Failed to load corpus {}", path.display()))?;
        tracing::info!(documents = corpus.len(), "Corpus loaded");
        scorer = scorer.with_retriever(Arc::new(KeywordRetriever::new(corpus)));
    }

    Ok(scorer)
}

fn load_evidence(path: &Path) -> Result<Vec<EvidenceSnippet>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read evidence {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse evidence {}", path.display()))
}

fn load_batch(path: &Path) -> Result<Vec<BatchItem>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch input {}", path.display()))?;

    let mut items = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let item: BatchItem = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: expected {{\"question\", \"answer\"}}", path.display(), index + 1))?;
        items.push(item);
    }

    if items.is_empty() {
        bail!("{} contains no question/answer pairs", path.display());
    }
    Ok(items)
}

/// Counts reported after a batch run.
#[derive(Debug)]
struct BatchSummary {
    scored: usize,
    failed: usize,
    fallbacks: usize,
    decisions: [(Decision, usize); 3],
}

/// Append a record for every scored item. Failed items are logged and
/// counted, and do not stop the remaining records from being written.
fn write_records(
    sink: &JsonlSink,
    items: &[BatchItem],
    results: Vec<Result<RuntimeResult, RuntimeError>>,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary {
        scored: 0,
        failed: 0,
        fallbacks: 0,
        decisions: [
            (Decision::Accept, 0),
            (Decision::Qualified, 0),
            (Decision::Refuse, 0),
        ],
    };

    for (item, result) in items.iter().zip(results) {
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(question = %item.question, error = %e, "Failed to score answer");
                summary.failed += 1;
                continue;
            }
        };

        if result.retrieval.is_fallback() {
            summary.fallbacks += 1;
        }
        if let Some((_, count)) = summary
            .decisions
            .iter_mut()
            .find(|(decision, _)| *decision == result.evaluation.decision)
        {
            *count += 1;
        }
        sink.append(&EvaluationRecord::new(&item.question, &item.answer, &result))
            .with_context(|| format!("Failed to write record to {}", sink.path().display()))?;
        summary.scored += 1;
    }

    Ok(summary)
}

fn render_text(result: &TruthScoreResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("Decision: {}\n", result.decision));
    out.push_str(&format!("Score:    {:.4}\n", result.score));
    out.push_str("Components:\n");
    for component in &result.components {
        out.push_str(&format!(
            "  {:<12} {:.3}  (weight {:.2})\n",
            component.name.as_str(),
            component.value,
            result.weights_used.get(component.name),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use truthscore_core::evaluate_truthfulness;
    use truthscore_runtime::RetrievalStatus;

    fn score_command(answer: &str, fail_on_refuse: bool) -> Commands {
        Commands::Score {
            question: "What did Cleopatra look like?".to_string(),
            answer: answer.to_string(),
            evidence: None,
            corpus: None,
            config: None,
            format: OutputFormat::Json,
            fail_on_refuse,
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_score() {
        let cli = Cli::try_parse_from([
            "truthscore",
            "score",
            "-q",
            "Is water wet?",
            "-a",
            "Yes.",
            "--format",
            "json",
            "--fail-on-refuse",
        ])
        .unwrap();

        match cli.command {
            Commands::Score {
                question,
                format,
                fail_on_refuse,
                ..
            } => {
                assert_eq!(question, "Is water wet?");
                assert_eq!(format, OutputFormat::Json);
                assert!(fail_on_refuse);
            }
            _ => panic!("expected score command"),
        }
    }

    #[test]
    fn test_evidence_conflicts_with_corpus() {
        let result = Cli::try_parse_from([
            "truthscore",
            "score",
            "-q",
            "Q?",
            "-a",
            "A.",
            "--evidence",
            "e.json",
            "--corpus",
            "c.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_text_lists_components() {
        let result = TruthScorer::new()
            .evaluate("What did Cleopatra look like?", "She had green eyes.")
            .unwrap();
        let text = render_text(&result);

        assert!(text.starts_with("Decision: REFUSE\n"));
        for name in ["evidence", "consistency", "coverage", "language"] {
            assert!(text.contains(name), "missing {} in:\n{}", name, text);
        }
    }

    #[test]
    fn test_load_batch_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.jsonl");
        fs::write(
            &path,
            "{\"question\": \"Q1?\", \"answer\": \"A1.\"}\n\n{\"question\": \"Q2?\", \"answer\": \"A2.\"}\n",
        )
        .unwrap();

        let items = load_batch(&path).unwrap();
        assert_eq!(items, vec![BatchItem::new("Q1?", "A1."), BatchItem::new("Q2?", "A2.")]);
    }

    #[tokio::test]
    async fn test_score_refusal_exit_code() {
        let code = run(score_command("She had green eyes.", true)).await.unwrap();
        assert_eq!(code, ExitCode::from(2));

        let code = run(score_command("She had green eyes.", false)).await.unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_batch_appends_one_record_per_pair() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pairs.jsonl");
        let output = dir.path().join("records.jsonl");
        fs::write(
            &input,
            "{\"question\": \"What is the capital of France?\", \"answer\": \"Paris.\"}\n\
             {\"question\": \"What did Cleopatra look like?\", \"answer\": \"She had green eyes.\"}\n",
        )
        .unwrap();

        let command = Commands::Batch {
            input: input.clone(),
            output: output.clone(),
            corpus: None,
            config: None,
            runtime_config: None,
        };
        assert_eq!(run(command).await.unwrap(), ExitCode::SUCCESS);

        let records = JsonlSink::read_all(&output).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].question, "What is the capital of France?");
        assert_eq!(records[1].answer, "She had green eyes.");
    }

    #[test]
    fn test_failed_item_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        let sink = JsonlSink::open(&path).unwrap();

        let items = vec![
            BatchItem::new("Q1?", "A1."),
            BatchItem::new("Q2?", "A2."),
            BatchItem::new("Q3?", "A3."),
        ];
        let scored = |answer: &str| RuntimeResult {
            evaluation: evaluate_truthfulness("Q?", answer, None).unwrap(),
            retrieval: RetrievalStatus::Retrieved {
                snippets: 0,
                attempts: 1,
            },
            cached: false,
        };
        let results = vec![
            Err(RuntimeError::InvalidConfig("broken".to_string())),
            Ok(scored("A2.")),
            Ok(scored("A3.")),
        ];

        let summary = write_records(&sink, &items, results).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.scored, 2);
        assert_eq!(summary.decisions.iter().map(|(_, n)| n).sum::<usize>(), 2);

        let records = JsonlSink::read_all(&path).unwrap();
        let questions: Vec<_> = records.iter().map(|r| r.question.as_str()).collect();
        assert_eq!(questions, vec!["Q2?", "Q3?"]);
    }
}
