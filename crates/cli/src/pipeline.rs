//! CSV in, split workbook and evaluation workbook out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use splitscore_agent::prompts::{self, EVALUATOR_INSTRUCTIONS, SPLITTER_INSTRUCTIONS};
use splitscore_agent::{Chunker, EvaluatorAgent, ScoreSummary, SplitterAgent, TiktokenCounter};
use splitscore_config::{AppConfig, ConfigError};
use splitscore_core::{Error, Provider, Result};
use splitscore_sheets::{read_messages, write_evaluation_workbook, write_split_workbook};
use tracing::info;

/// Workbook file names derived from an input file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    pub split: String,
    pub evaluation: String,
}

impl OutputNames {
    /// `split_<stem>.xlsx` and `evaluation_<stem>.xlsx`. A trailing `.csv`
    /// is replaced; any other name just gets `.xlsx` appended.
    pub fn for_input(input: &Path) -> Self {
        let file_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file_name.strip_suffix(".csv").unwrap_or(&file_name);

        Self {
            split: format!("split_{stem}.xlsx"),
            evaluation: format!("evaluation_{stem}.xlsx"),
        }
    }
}

/// What a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub processed: usize,
    pub split_path: PathBuf,
    pub evaluation_path: PathBuf,
    pub summary: ScoreSummary,
}

pub struct Pipeline {
    splitter: SplitterAgent,
    evaluator: EvaluatorAgent,
}

impl Pipeline {
    pub fn new(splitter: SplitterAgent, evaluator: EvaluatorAgent) -> Self {
        Self {
            splitter,
            evaluator,
        }
    }

    /// Build both processors from config, sharing one provider.
    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Result<Self> {
        let counter = TiktokenCounter::for_model(&config.splitter.model)?;
        let chunker = Chunker::from_config(Arc::new(counter), &config.chunking);

        let splitter_instructions = prompts::resolve(
            SPLITTER_INSTRUCTIONS,
            config.splitter.load_instructions().map_err(config_error)?,
        );
        let evaluator_instructions = prompts::resolve(
            EVALUATOR_INSTRUCTIONS,
            config.evaluator.load_instructions().map_err(config_error)?,
        );

        let splitter = SplitterAgent::new(provider.clone(), config.splitter.model.as_str(), chunker)
            .with_temperature(config.splitter.temperature)
            .with_instructions(splitter_instructions);
        let evaluator = EvaluatorAgent::new(provider, config.evaluator.model.as_str())
            .with_temperature(config.evaluator.temperature)
            .with_instructions(evaluator_instructions);

        info!(
            splitter = splitter.model(),
            evaluator = evaluator.model(),
            max_tokens = config.chunking.max_tokens,
            "Pipeline ready"
        );
        Ok(Self::new(splitter, evaluator))
    }

    /// Split and evaluate every message in `input`, writing both workbooks
    /// into `output_dir`.
    pub async fn run(&self, input: &Path, output_dir: &Path) -> Result<RunReport> {
        let messages = read_messages(input)?;
        info!(count = messages.len(), input = %input.display(), "Loaded messages");

        let names = OutputNames::for_input(input);
        let split_path = output_dir.join(&names.split);
        let evaluation_path = output_dir.join(&names.evaluation);

        let results = self.splitter.process_all(&messages).await;
        write_split_workbook(&results, &split_path)?;

        info!("Evaluating results...");
        let evaluations = self.evaluator.evaluate_all(&results).await;
        write_evaluation_workbook(&evaluations, &evaluation_path)?;

        Ok(RunReport {
            processed: results.len(),
            split_path,
            evaluation_path,
            summary: ScoreSummary::from_results(&evaluations),
        })
    }
}

/// Resolve the input argument: an existing path is used as given, anything
/// else is looked up in the configured input directory.
pub fn resolve_input(config: &AppConfig, input: &Path) -> PathBuf {
    if input.is_file() {
        input.to_path_buf()
    } else {
        config.input_dir().join(input)
    }
}

pub fn config_error(err: ConfigError) -> Error {
    Error::Config {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_suffix_is_replaced() {
        let names = OutputNames::for_input(Path::new("data/input/messages.csv"));
        assert_eq!(names.split, "split_messages.xlsx");
        assert_eq!(names.evaluation, "evaluation_messages.xlsx");
    }

    #[test]
    fn other_names_get_xlsx_appended() {
        let names = OutputNames::for_input(Path::new("notes.txt"));
        assert_eq!(names.split, "split_notes.txt.xlsx");

        let names = OutputNames::for_input(Path::new("inbox"));
        assert_eq!(names.evaluation, "evaluation_inbox.xlsx");
    }

    #[test]
    fn only_a_trailing_csv_is_replaced() {
        let names = OutputNames::for_input(Path::new("a.csv.bak"));
        assert_eq!(names.split, "split_a.csv.bak.xlsx");
    }

    #[test]
    fn missing_input_falls_back_to_input_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..AppConfig::default()
        };

        let resolved = resolve_input(&config, Path::new("messages.csv"));
        assert_eq!(resolved, dir.path().join("input").join("messages.csv"));

        let existing = dir.path().join("here.csv");
        std::fs::write(&existing, "text\nhola\n").unwrap();
        assert_eq!(resolve_input(&config, &existing), existing);
    }

    #[test]
    fn config_errors_convert() {
        let err = config_error(ConfigError::ValidationError("bad".into()));
        assert!(err.to_string().contains("Configuration error"));
    }
}
