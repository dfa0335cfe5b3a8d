//! Binary entry point for the subtitle translator.

use anyhow::Result;
use arsub_core::output::resolve_output_path;
use arsub_core::srt::Encoding;
use arsub_core::translate::model::{GenerationConfig, ModelConfig, ModelTranslator};
use arsub_core::translate::web::{WebConfig, WebTranslator};
use arsub_core::translate::{process_file, LanguagePair, Translator};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Translation backend, chosen once per run.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Engine {
    /// Online translation service, source language auto-detected.
    Web,
    /// Local sequence-to-sequence model with Arabic reshaping.
    Model,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InputEncoding {
    #[value(name = "utf-8")]
    Utf8,
    #[value(name = "latin-1")]
    Latin1,
}

impl From<InputEncoding> for Encoding {
    fn from(e: InputEncoding) -> Self {
        match e {
            InputEncoding::Utf8 => Encoding::Utf8,
            InputEncoding::Latin1 => Encoding::Latin1,
        }
    }
}

/// Translate SRT subtitles to Arabic.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Path to the .srt file to be translated.
    file: PathBuf,

    /// Folder or full path and filename for the translated output file.
    /// If only a folder or '.' is provided, saves with original filename and '-AR' suffix.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Translation backend.
    #[arg(long, value_enum, default_value_t = Engine::Web)]
    engine: Engine,

    /// Source language code (defaults: web `auto`, model `eng`).
    #[arg(long)]
    source_lang: Option<String>,

    /// Target language code (defaults: web `ar`, model `arb`).
    #[arg(long)]
    target_lang: Option<String>,

    /// Encoding of the input file.
    #[arg(long, value_enum, default_value_t = InputEncoding::Utf8)]
    encoding: InputEncoding,

    /// Base URL of the web translation service.
    #[arg(long, env = "ARSUB_SERVICE_URL")]
    service_url: Option<String>,

    /// Address of the local model server.
    #[arg(long, env = "ARSUB_MODEL_ENDPOINT")]
    endpoint: Option<String>,

    /// Model the local server is expected to run.
    #[arg(long, env = "ARSUB_MODEL")]
    model: Option<String>,

    /// Beam width used for decoding.
    #[arg(long, default_value_t = 5)]
    num_beams: u32,

    /// Sampling temperature.
    #[arg(long, default_value_t = 0.7)]
    temperature: f32,

    /// Upper bound on generated tokens per entry.
    #[arg(long, default_value_t = 256)]
    max_new_tokens: u32,

    /// Disable stochastic sampling.
    #[arg(long)]
    no_sample: bool,

    /// HTTP timeout in seconds for each backend call.
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable verbose debug and trace logs.
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn languages(&self) -> LanguagePair {
        let defaults = match self.engine {
            Engine::Web => LanguagePair::web(),
            Engine::Model => LanguagePair::model(),
        };
        LanguagePair {
            source: self.source_lang.clone().unwrap_or(defaults.source),
            target: self.target_lang.clone().unwrap_or(defaults.target),
        }
    }

    /// Build the selected backend. The model backend loads its model here,
    /// before any entry is processed.
    fn translator(&self) -> Result<Box<dyn Translator>> {
        match self.engine {
            Engine::Web => {
                let mut config = WebConfig::default();
                if let Some(url) = &self.service_url {
                    config.base_url = url.clone();
                }
                if let Some(secs) = self.timeout {
                    config.timeout = Duration::from_secs(secs);
                }
                Ok(Box::new(WebTranslator::new(config)?))
            }
            Engine::Model => {
                let mut config = ModelConfig {
                    generation: GenerationConfig {
                        max_new_tokens: self.max_new_tokens,
                        num_beams: self.num_beams,
                        do_sample: !self.no_sample,
                        temperature: self.temperature,
                    },
                    ..ModelConfig::default()
                };
                if let Some(endpoint) = &self.endpoint {
                    config.endpoint = endpoint.clone();
                }
                if let Some(model) = &self.model {
                    config.model = model.clone();
                }
                if let Some(secs) = self.timeout {
                    config.timeout = Duration::from_secs(secs);
                }
                info!("loading model {} from {}", config.model, config.endpoint);
                Ok(Box::new(ModelTranslator::connect(config)?))
            }
        }
    }
}

/// Log sink that hides the progress bar while a log line is written, so
/// warnings land above the bar instead of on top of it.
struct BarWriter<W> {
    bar: ProgressBar,
    inner: W,
}

impl<W: Write> Write for BarWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let inner = &mut self.inner;
        self.bar.suspend(|| inner.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// The bar stays hidden until the run starts drawing it.
fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
    let style = ProgressStyle::with_template(
        "{msg}: {percent:>3}% [{bar:40.cyan/blue}] {pos}/{len} subtitles [{elapsed_precise}<{eta_precise}]",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message("Translating subtitles");
    bar
}

/// Application entry point which parses CLI args and performs actions.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.debug {
        EnvFilter::default()
            .add_directive("arsub=trace".parse().unwrap())
            .add_directive("arsub_core=trace".parse().unwrap())
            .add_directive("info".parse().unwrap())
    } else {
        EnvFilter::default()
            .add_directive("arsub=info".parse().unwrap())
            .add_directive("arsub_core=info".parse().unwrap())
            .add_directive("warn".parse().unwrap())
    };
    let progress = progress_bar();
    let log_bar = progress.clone();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(move || BarWriter {
            bar: log_bar.clone(),
            inner: io::stderr(),
        })
        .init();

    let translator = cli.translator()?;
    let output = resolve_output_path(&cli.file, cli.output.as_deref());
    println!("Translating and saving to: {}", output.display());

    progress.set_draw_target(ProgressDrawTarget::stderr());
    let report = process_file(
        &cli.file,
        cli.encoding.into(),
        &output,
        translator.as_ref(),
        &cli.languages(),
        &progress,
    )?;
    if report.failed > 0 {
        println!(
            "{} of {} subtitles could not be translated and were kept as is",
            report.failed, report.entries
        );
    }
    println!("Translation completed and saved to: {}", report.output.display());
    Ok(())
}
