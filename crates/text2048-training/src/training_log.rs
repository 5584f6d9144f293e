//! Training log: one JSON object per line, one line per generation.
//!
//! The format is meant for external plotting tools, so it keeps to flat
//! numbers and string-keyed maps:
//!
//! ```text
//! {"generation":0,"phase":"exploration","fitness_min":120.0,"fitness_mean":480.5,"fitness_max":1020.0,"best_fitness":1020.0,"best_weights":{...},"weight_mean":{...},"weight_std_dev":{...}}
//! {"generation":9,...,"evaluation":{"mean_score":1843.2,"max_tile_histogram":{"128":3,"256":14,"512":3}}}
//! ```

use std::{
    collections::BTreeMap,
    io::{self, BufRead, Write},
};

use serde::{Deserialize, Serialize};
use text2048_agent::evaluation::EvaluationReport;
use text2048_engine::tile_value;

use crate::{config::EvolutionPhase, trainer::GenerationReport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingLogRecord {
    pub generation: usize,
    pub phase: EvolutionPhase,
    pub fitness_min: f32,
    pub fitness_mean: f32,
    pub fitness_max: f32,
    pub best_fitness: f32,
    pub best_weights: BTreeMap<String, f32>,
    /// Population mean of each feature weight.
    #[serde(default)]
    pub weight_mean: BTreeMap<String, f32>,
    #[serde(default)]
    pub weight_std_dev: BTreeMap<String, f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub mean_score: f32,
    /// Episodes per maximum tile value.
    pub max_tile_histogram: BTreeMap<u64, usize>,
}

impl From<&EvaluationReport> for EvaluationRecord {
    fn from(report: &EvaluationReport) -> Self {
        Self {
            mean_score: report.score.mean,
            max_tile_histogram: report
                .max_tile_histogram
                .iter()
                .map(|(exponent, count)| (tile_value(*exponent), *count))
                .collect(),
        }
    }
}

impl TrainingLogRecord {
    #[must_use]
    pub fn from_report(report: &GenerationReport) -> Self {
        Self {
            generation: report.generation,
            phase: report.phase,
            fitness_min: report.fitness.min,
            fitness_mean: report.fitness.mean,
            fitness_max: report.fitness.max,
            best_fitness: report.best.fitness(),
            best_weights: report.best_weights.clone(),
            weight_mean: report
                .weight_summaries
                .iter()
                .map(|(id, s)| (id.clone(), s.mean))
                .collect(),
            weight_std_dev: report
                .weight_summaries
                .iter()
                .map(|(id, s)| (id.clone(), s.std_dev))
                .collect(),
            evaluation: report.evaluation.as_ref().map(EvaluationRecord::from),
        }
    }
}

#[derive(Debug)]
pub struct TrainingLogWriter<W> {
    writer: W,
}

impl<W> TrainingLogWriter<W>
where
    W: Write,
{
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Appends one record and flushes, so the log can be tailed while
    /// training runs.
    pub fn write_record(&mut self, record: &TrainingLogRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From, derive_more::IsVariant)]
pub enum TrainingLogError {
    #[display("failed to read training log")]
    Io(io::Error),
    #[display("invalid training log record on line {line}")]
    #[from(ignore)]
    Json {
        line: usize,
        source: serde_json::Error,
    },
}

/// Reads every record of a training log. Blank lines are skipped.
pub fn read_training_log<R>(reader: R) -> Result<Vec<TrainingLogRecord>, TrainingLogError>
where
    R: BufRead,
{
    let mut records = vec![];
    for (index, line) in reader.lines().enumerate() {
        let line_text = line?;
        if line_text.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line_text).map_err(|source| TrainingLogError::Json {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use text2048_agent::summary::Summary;

    use super::*;
    use crate::genetic::Individual;

    fn report(generation: usize, evaluation: Option<EvaluationReport>) -> GenerationReport {
        let best = Individual::from_weights(vec![1.0, 3.0]);
        GenerationReport {
            generation,
            phase: EvolutionPhase::Transition,
            fitness: Summary::new([10.0, 30.0]).unwrap(),
            best_weights: [("a".to_owned(), 0.25), ("b".to_owned(), 0.75)].into(),
            best,
            weight_summaries: [
                ("a".to_owned(), Summary::new([0.2, 0.3]).unwrap()),
                ("b".to_owned(), Summary::new([0.7, 0.8]).unwrap()),
            ]
            .into(),
            evaluation,
            checkpoint: false,
        }
    }

    #[test]
    fn test_record_from_report() {
        let evaluation = EvaluationReport {
            episodes: 3,
            score: Summary::new([100.0, 200.0, 300.0]).unwrap(),
            mean_moves: 50.0,
            max_tile_histogram: [(6, 2), (7, 1)].into(),
        };
        let record = TrainingLogRecord::from_report(&report(4, Some(evaluation)));
        assert_eq!(record.generation, 4);
        assert_eq!(record.phase, EvolutionPhase::Transition);
        assert!((record.fitness_mean - 20.0).abs() < 1e-6);
        assert!((record.best_weights["b"] - 0.75).abs() < f32::EPSILON);
        assert!((record.weight_mean["a"] - 0.25).abs() < 1e-6);
        assert!((record.weight_std_dev["b"] - 0.05).abs() < 1e-6);

        let evaluation = record.evaluation.unwrap();
        assert!((evaluation.mean_score - 200.0).abs() < 1e-3);
        assert_eq!(evaluation.max_tile_histogram, [(64, 2), (128, 1)].into());
    }

    #[test]
    fn test_write_then_read() {
        let records = [
            TrainingLogRecord::from_report(&report(0, None)),
            TrainingLogRecord::from_report(&report(1, None)),
        ];
        let mut writer = TrainingLogWriter::new(vec![]);
        for record in &records {
            writer.write_record(record).unwrap();
        }
        let bytes = writer.into_inner();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|l| l.starts_with(r#"{"generation":"#)));
        assert!(!text.contains("evaluation"));
        assert!(text.contains(r#""phase":"transition""#));

        assert_eq!(read_training_log(Cursor::new(bytes)).unwrap(), records);
    }

    #[test]
    fn test_read_reports_bad_line() {
        let line = serde_json::to_string(&TrainingLogRecord::from_report(&report(0, None))).unwrap();
        let input = format!("{line}\n\nnot json\n");
        let err = read_training_log(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, TrainingLogError::Json { line: 3, .. }));
        assert_eq!(err.to_string(), "invalid training log record on line 3");
    }
}
