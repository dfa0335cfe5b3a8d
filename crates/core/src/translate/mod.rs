//! Translation orchestration utilities.
//! This module wires subtitle parsing, the translator backend and
//! entry-by-entry output writing.

use crate::error::{PipelineError, TranslationError};
use crate::srt::{self, Encoding};
use indicatif::ProgressBar;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

pub mod model;
pub mod web;

/// Source and target language codes as understood by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Auto-detected source, Arabic target (web service codes).
    pub fn web() -> Self {
        Self::new("auto", "ar")
    }

    /// English to Modern Standard Arabic (model codes).
    pub fn model() -> Self {
        Self::new("eng", "arb")
    }
}

/// Translates one subtitle text at a time.
pub trait Translator {
    /// Translate `text` from `source` to `target`.
    fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, TranslationError>;

    /// Short backend name used in logs.
    fn name(&self) -> &str;
}

/// Result of translating a single entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Translated(String),
    /// The translator failed; carries the original text.
    PassedThrough(String),
}

impl Outcome {
    pub fn text(&self) -> &str {
        match self {
            Outcome::Translated(t) | Outcome::PassedThrough(t) => t,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Outcome::Translated(t) | Outcome::PassedThrough(t) => t,
        }
    }
}

/// Translate `text`, falling back to the original on any failure.
/// An empty translation of non-empty input counts as a failure.
pub fn translate_or_original<T: Translator + ?Sized>(
    translator: &T,
    text: &str,
    langs: &LanguagePair,
) -> Outcome {
    match translator.translate(text, &langs.source, &langs.target) {
        Ok(translated) if !translated.trim().is_empty() || text.trim().is_empty() => {
            Outcome::Translated(translated)
        }
        Ok(_) => {
            warn!("{} returned an empty translation, keeping original text", translator.name());
            Outcome::PassedThrough(text.to_string())
        }
        Err(err) => {
            warn!("{} translation error: {err}", translator.name());
            Outcome::PassedThrough(text.to_string())
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub output: PathBuf,
    pub entries: usize,
    pub failed: usize,
}

/// Translate the subtitle file `input` into `output`.
///
/// The input is fully parsed before the output file is created, so a
/// malformed file leaves nothing behind. Each entry is then translated once
/// and written (and flushed) before the next one starts.
pub fn process_file<T: Translator + ?Sized>(
    input: &Path,
    encoding: Encoding,
    output: &Path,
    translator: &T,
    langs: &LanguagePair,
    progress: &ProgressBar,
) -> Result<Report, PipelineError> {
    trace!(
        "process_file input={} output={}",
        input.display(),
        output.display()
    );
    let blocks = srt::read(input, encoding)?;
    info!(
        "translating {} subtitles with {} ({} -> {})",
        blocks.len(),
        translator.name(),
        langs.source,
        langs.target
    );
    let write_err = |source| PipelineError::Output {
        path: output.to_path_buf(),
        source,
    };
    let mut file = File::create(output).map_err(write_err)?;
    progress.set_length(blocks.len() as u64);

    let mut failed = 0;
    for mut block in blocks.iter().cloned() {
        let outcome = translate_or_original(translator, &block.text, langs);
        if let Outcome::PassedThrough(_) = outcome {
            failed += 1;
        }
        debug!("entry {} translated", block.index);
        block.text = outcome.into_text();
        if let Err(err) = srt::write_block(&mut file, &block) {
            progress.abandon();
            return Err(write_err(err));
        }
        progress.inc(1);
    }
    progress.finish();

    if failed > 0 {
        warn!("{failed} of {} entries kept their original text", blocks.len());
    }
    info!("wrote {}", output.display());
    Ok(Report {
        output: output.to_path_buf(),
        entries: blocks.len(),
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SrtError;
    use std::cell::Cell;
    use std::fs;
    use tempfile::tempdir;

    const THREE: &str = "1\n00:00:00,000 --> 00:00:01,000\none\n\n\
                         2\n00:00:01,000 --> 00:00:02,000\ntwo\n\n\
                         3\n00:00:02,000 --> 00:00:03,500\nthree\n\n";

    /// Prefixes text with `ar:` and fails on the call numbers in `fail_on`.
    struct MockTr {
        calls: Cell<usize>,
        fail_on: Vec<usize>,
    }

    impl MockTr {
        fn failing_on(fail_on: &[usize]) -> Self {
            Self {
                calls: Cell::new(0),
                fail_on: fail_on.to_vec(),
            }
        }
    }

    impl Translator for MockTr {
        fn translate(
            &self,
            text: &str,
            _source: &str,
            target: &str,
        ) -> Result<String, TranslationError> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if self.fail_on.contains(&call) {
                return Err(TranslationError::Response("boom".into()));
            }
            Ok(format!("{target}:{text}"))
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    /// Always answers with whitespace.
    struct BlankTr;

    impl Translator for BlankTr {
        fn translate(&self, _: &str, _: &str, _: &str) -> Result<String, TranslationError> {
            Ok("  ".into())
        }

        fn name(&self) -> &str {
            "blank"
        }
    }

    #[test]
    fn failed_entry_keeps_source_text() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("movie.srt");
        let output = dir.path().join("movie-AR.srt");
        fs::write(&input, THREE).unwrap();

        let tr = MockTr::failing_on(&[2]);
        let report = process_file(
            &input,
            Encoding::Utf8,
            &output,
            &tr,
            &LanguagePair::web(),
            &ProgressBar::hidden(),
        )
        .unwrap();
        assert_eq!(report.entries, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(tr.calls.get(), 3);

        let written = srt::parse(&fs::read_to_string(&output).unwrap()).unwrap();
        let original = srt::parse(THREE).unwrap();
        assert_eq!(written.len(), 3);
        for (w, o) in written.iter().zip(&original) {
            assert_eq!(w.index, o.index);
            assert_eq!(w.start, o.start);
            assert_eq!(w.end, o.end);
        }
        assert_eq!(written[0].text, "ar:one");
        assert_eq!(written[1].text, "two");
        assert_eq!(written[2].text, "ar:three");
    }

    #[test]
    fn output_matches_block_layout() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.srt");
        let output = dir.path().join("b.srt");
        fs::write(&input, "5\n00:00:01,000 --> 00:00:02,000\nhi\nthere\n").unwrap();
        process_file(
            &input,
            Encoding::Utf8,
            &output,
            &MockTr::failing_on(&[]),
            &LanguagePair::model(),
            &ProgressBar::hidden(),
        )
        .unwrap();
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "5\n00:00:01,000 --> 00:00:02,000\narb:hi\nthere\n\n"
        );
    }

    #[test]
    fn parse_error_creates_no_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bad.srt");
        let output = dir.path().join("bad-AR.srt");
        fs::write(&input, "x\n00:00:00,000 --> 00:00:01,000\nhi\n").unwrap();
        let err = process_file(
            &input,
            Encoding::Utf8,
            &output,
            &MockTr::failing_on(&[]),
            &LanguagePair::web(),
            &ProgressBar::hidden(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Srt(SrtError::Parse { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn unwritable_output_is_fatal() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.srt");
        fs::write(&input, THREE).unwrap();
        let output = dir.path().join("missing").join("a-AR.srt");
        let err = process_file(
            &input,
            Encoding::Utf8,
            &output,
            &MockTr::failing_on(&[]),
            &LanguagePair::web(),
            &ProgressBar::hidden(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Output { .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_write_abandons_progress() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.srt");
        fs::write(&input, THREE).unwrap();
        let progress = ProgressBar::hidden();
        let err = process_file(
            &input,
            Encoding::Utf8,
            Path::new("/dev/full"),
            &MockTr::failing_on(&[]),
            &LanguagePair::web(),
            &progress,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Output { .. }));
        assert!(progress.is_finished());
        assert_eq!(progress.position(), 0);
    }

    #[test]
    fn empty_translation_falls_back() {
        let langs = LanguagePair::web();
        assert_eq!(
            translate_or_original(&BlankTr, "hello", &langs),
            Outcome::PassedThrough("hello".into())
        );
        assert_eq!(
            translate_or_original(&MockTr::failing_on(&[]), "hello", &langs).text(),
            "ar:hello"
        );
    }

    #[test]
    fn progress_tracks_entries() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.srt");
        let output = dir.path().join("a-AR.srt");
        fs::write(&input, THREE).unwrap();
        let progress = ProgressBar::hidden();
        process_file(
            &input,
            Encoding::Utf8,
            &output,
            &MockTr::failing_on(&[1, 2, 3]),
            &LanguagePair::web(),
            &progress,
        )
        .unwrap();
        assert_eq!(progress.position(), 3);
        assert_eq!(progress.length(), Some(3));
    }
}
