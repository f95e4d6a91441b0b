use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::api::dto::{BatchEntryDto, ErrorDto, ProgramDto, ResponseDto};
use crate::domain::extract;
use crate::domain::options::ExtractOptions;
use crate::ports::{OutputExporter, TypeGraphSource};

/// Loads type graphs, runs extraction and hands the documents to the
/// exporter.
pub struct ExtractUsecase<'a> {
    pub source: &'a dyn TypeGraphSource,
    pub exporter: &'a dyn OutputExporter,
    pub options: &'a ExtractOptions,
}

impl<'a> ExtractUsecase<'a> {
    /// Extraction of one file. Load failures are reported in the same error
    /// document shape as extraction failures.
    pub fn extract_file(&self, input: &Path) -> ResponseDto {
        let graph = match self.source.load(input) {
            Ok(graph) => graph,
            Err(e) => {
                warn!(input = %input.display(), "cannot load type graph: {:#}", e);
                return ResponseDto::Error(ErrorDto::message(format!("{:#}", e)));
            }
        };
        match extract(&graph, self.options) {
            Ok(program) => ResponseDto::Program(ProgramDto::from(program)),
            Err(e) => {
                warn!(input = %input.display(), "extraction failed: {}", e);
                ResponseDto::Error(ErrorDto::from(&e))
            }
        }
    }

    /// Writes the program, or the error document, for one input. Returns
    /// whether extraction succeeded.
    pub fn run(&self, input: &Path, output: Option<&Path>) -> Result<bool> {
        let response = self.extract_file(input);
        self.exporter.export(&serde_json::to_value(&response)?, output)?;
        Ok(!response.is_error())
    }

    /// Extracts every input on `pool` and writes one array in input order.
    /// Returns whether all inputs succeeded.
    pub fn run_batch(&self, pool: &rayon::ThreadPool, inputs: &[PathBuf], output: Option<&Path>) -> Result<bool> {
        let entries: Vec<BatchEntryDto> = pool.install(|| {
            inputs
                .par_iter()
                .map(|input| BatchEntryDto {
                    input: input.display().to_string(),
                    result: self.extract_file(input),
                })
                .collect()
        });

        let failed = entries.iter().filter(|e| e.result.is_error()).count();
        info!(inputs = entries.len(), failed, "batch finished");

        self.exporter.export(&serde_json::to_value(&entries)?, output)?;
        Ok(failed == 0)
    }
}
