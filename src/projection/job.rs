//! Import Job
//!
//! One job imports one or more documents into a single column tree, so
//! every document shares the allocator and the output has one column model.
//! Diagnostics go to the `log::Log` sink passed to each call.

use std::fmt;

use log::{Level, Log, Metadata, Record as LogRecord};

use crate::core::walker;
use crate::tree::json;

use super::candidates::RecordElementScorer;
use super::error::{ImportError, ImportResult};
use super::options::ImportOptions;
use super::projector::Projector;
use super::selector::RecordSelector;
use super::table::Projection;
use super::value::ValueParser;

/// Target of every record this module emits
pub const LOG_TARGET: &str = "rustytable::import";

/// Input document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Xml,
    Json,
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl Log for DiscardSink {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        false
    }

    fn log(&self, _record: &LogRecord<'_>) {}

    fn flush(&self) {}
}

fn emit(sink: &dyn Log, level: Level, args: fmt::Arguments<'_>) {
    let metadata = Metadata::builder().level(level).target(LOG_TARGET).build();
    if !sink.enabled(&metadata) {
        return;
    }
    sink.log(
        &LogRecord::builder()
            .metadata(metadata)
            .args(args)
            .module_path_static(Some(module_path!()))
            .file_static(Some(file!()))
            .build(),
    );
}

pub struct ImportJob {
    options: ImportOptions,
    projector: Projector,
    /// Records started across all documents, counted against the limit
    started: usize,
    documents: usize,
}

impl ImportJob {
    pub fn new(options: ImportOptions) -> Self {
        let projector = Projector::new(&options);
        ImportJob {
            options,
            projector,
            started: 0,
            documents: 0,
        }
    }

    /// Job with a custom collaborator for `guess_cell_value_types`
    pub fn with_value_parser(options: ImportOptions, parser: Box<dyn ValueParser + Send>) -> Self {
        let projector = Projector::with_value_parser(&options, parser);
        ImportJob {
            options,
            projector,
            started: 0,
            documents: 0,
        }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn record_count(&self) -> usize {
        self.projector.record_count()
    }

    pub fn column_count(&self) -> usize {
        self.projector.tree().column_count()
    }

    /// Import one XML document, returns the number of records added
    pub fn import_xml(&mut self, input: &[u8], sink: &dyn Log) -> ImportResult<usize> {
        let path = match &self.options.record_path {
            Some(path) => path.clone(),
            None => {
                let mut scorer = RecordElementScorer::new();
                walker::walk(input, &mut scorer);
                resolve_record_path(scorer, sink)?
            }
        };
        self.run(&path, sink, |selector| walker::walk(input, selector))
    }

    /// Import one JSON document, returns the number of records added
    pub fn import_json(&mut self, input: &[u8], sink: &dyn Log) -> ImportResult<usize> {
        let document = json::parse(input)?;
        let path = match &self.options.record_path {
            Some(path) => path.clone(),
            None => {
                let mut scorer = RecordElementScorer::new();
                json::walk(&document, &mut scorer);
                resolve_record_path(scorer, sink)?
            }
        };
        self.run(&path, sink, |selector| json::walk(&document, selector))
    }

    pub fn import(&mut self, format: DocumentFormat, input: &[u8], sink: &dyn Log) -> ImportResult<usize> {
        match format {
            DocumentFormat::Xml => self.import_xml(input, sink),
            DocumentFormat::Json => self.import_json(input, sink),
        }
    }

    fn run<F>(&mut self, path: &[String], sink: &dyn Log, drive: F) -> ImportResult<usize>
    where
        F: FnOnce(&mut RecordSelector<'_>),
    {
        if path.is_empty() {
            return Err(ImportError::EmptyRecordPath);
        }

        let before = self.projector.record_count();
        let remaining = self.options.limit.map(|limit| limit.saturating_sub(self.started));

        let mut selector = RecordSelector::new(&mut self.projector, path, remaining);
        drive(&mut selector);
        let started = selector.started();
        let limit_reached = selector.limit_reached();

        self.started += started;
        self.documents += 1;
        if limit_reached {
            if let Some(limit) = self.options.limit {
                emit(sink, Level::Warn, format_args!("record limit of {} reached", limit));
            }
        }

        let added = self.projector.record_count() - before;
        emit(
            sink,
            Level::Debug,
            format_args!(
                "document {} imported: {} records, {} columns so far",
                self.documents,
                added,
                self.projector.tree().column_count()
            ),
        );
        Ok(added)
    }

    /// Materialize the columns and hand out the records
    pub fn finish(self) -> Projection {
        self.projector.into_projection()
    }
}

fn resolve_record_path(scorer: RecordElementScorer, sink: &dyn Log) -> ImportResult<Vec<String>> {
    match scorer.candidate() {
        Some(candidate) => emit(
            sink,
            Level::Debug,
            format_args!(
                "detected record path /{} ({} occurrences)",
                candidate.path.join("/"),
                candidate.count
            ),
        ),
        None => {
            if let Some(fallback) = scorer.fallback_path() {
                emit(
                    sink,
                    Level::Debug,
                    format_args!("no repeating element, importing /{} as one record", fallback.join("/")),
                );
            }
        }
    }
    scorer.into_record_path().ok_or(ImportError::NoRecordElement)
}

/// Detect the record element of an XML document
///
/// `None` when no element repeats enough to look like a record.
pub fn detect_record_path(input: &[u8]) -> Option<Vec<String>> {
    let mut scorer = RecordElementScorer::new();
    walker::walk(input, &mut scorer);
    scorer.record_path().map(<[String]>::to_vec)
}

/// Detect the record element of a JSON document
pub fn detect_json_record_path(input: &[u8]) -> ImportResult<Option<Vec<String>>> {
    let document = json::parse(input)?;
    let mut scorer = RecordElementScorer::new();
    json::walk(&document, &mut scorer);
    Ok(scorer.record_path().map(<[String]>::to_vec))
}

/// Import a single XML document
pub fn project_xml(input: &[u8], options: &ImportOptions, sink: &dyn Log) -> ImportResult<Projection> {
    let mut job = ImportJob::new(options.clone());
    job.import_xml(input, sink)?;
    Ok(job.finish())
}

/// Import a single JSON document
pub fn project_json(input: &[u8], options: &ImportOptions, sink: &dyn Log) -> ImportResult<Projection> {
    let mut job = ImportJob::new(options.clone());
    job.import_json(input, sink)?;
    Ok(job.finish())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Capturing log sink

    use std::sync::Mutex;

    use log::{Level, Log, Metadata, Record};

    #[derive(Default)]
    pub struct CaptureSink {
        pub entries: Mutex<Vec<(Level, String)>>,
    }

    impl CaptureSink {
        pub fn messages(&self, level: Level) -> Vec<String> {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, m)| m.clone())
                .collect()
        }
    }

    impl Log for CaptureSink {
        fn enabled(&self, metadata: &Metadata<'_>) -> bool {
            metadata.target() == super::LOG_TARGET
        }

        fn log(&self, record: &Record<'_>) {
            self.entries
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }
}
