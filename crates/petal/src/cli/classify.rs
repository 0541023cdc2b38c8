//! The `petal classify` command.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use petal_core::{
    CameraSource, ClassificationRecord, Config, GallerySource, ImageSource, LabelScore,
    MemorySource, OutputFormat as CoreOutputFormat, OutputWriter, Petal,
};

/// Arguments for the `classify` command.
#[derive(Args, Debug, Default)]
pub struct ClassifyArgs {
    /// Image file to classify, or `-` to read from stdin
    #[arg(required_unless_present = "capture", conflicts_with = "capture")]
    pub input: Option<PathBuf>,

    /// Take the photo with the configured camera command instead
    #[arg(long)]
    pub capture: bool,

    /// Output format (defaults to `output.format` from config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Include every class score in the output
    #[arg(long)]
    pub scores: bool,

    /// Use this ONNX model instead of the configured one
    #[arg(long, env = "PETAL_MODEL")]
    pub model: Option<PathBuf>,

    /// Use this label file instead of the configured one
    #[arg(long, env = "PETAL_LABELS")]
    pub labels: Option<PathBuf>,
}

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Two-line "Prediction / Confidence" text
    Text,
    /// Single JSON object
    Json,
    /// One JSON object per line
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => CoreOutputFormat::Text,
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Where the photo comes from.
#[derive(Debug, Clone)]
enum Input {
    File(PathBuf),
    Stdin,
    Camera,
}

impl Input {
    fn from_args(args: &ClassifyArgs) -> anyhow::Result<Self> {
        match (&args.input, args.capture) {
            (_, true) => Ok(Input::Camera),
            (Some(path), false) if path.as_os_str() == "-" => Ok(Input::Stdin),
            (Some(path), false) => Ok(Input::File(path.clone())),
            (None, false) => anyhow::bail!("No input given. Pass an image path, `-` or --capture."),
        }
    }

    fn open(&self, config: &Config) -> anyhow::Result<Box<dyn ImageSource>> {
        Ok(match self {
            Input::File(path) => Box::new(GallerySource::new(path, &config.limits)),
            Input::Stdin => Box::new(
                MemorySource::from_reader("stdin", std::io::stdin().lock())
                    .context("Failed to read image from stdin")?,
            ),
            Input::Camera => Box::new(CameraSource::from_config(&config.capture).context(
                "No camera command configured. Set `capture.command` in the config file.",
            )?),
        })
    }
}

/// Apply `--model` / `--labels` overrides on top of the loaded config.
///
/// Relative override paths are taken from the current directory, not the
/// model directory.
pub(crate) fn apply_overrides(
    config: &mut Config,
    model: Option<&Path>,
    labels: Option<&Path>,
) -> anyhow::Result<()> {
    if let Some(model) = model {
        config.model.file = absolute(model)?.to_string_lossy().into_owned();
    }
    if let Some(labels) = labels {
        config.labels.file = absolute(labels)?.to_string_lossy().into_owned();
    }
    Ok(())
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(std::env::current_dir()?.join(expanded))
    }
}

/// Execute the classify command.
pub async fn execute(args: ClassifyArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&mut config, args.model.as_deref(), args.labels.as_deref())?;

    let input = Input::from_args(&args)?;
    let format = match args.format {
        Some(format) => format.into(),
        None => CoreOutputFormat::parse(&config.output.format).unwrap_or(CoreOutputFormat::Text),
    };
    let include_scores = args.scores || config.output.include_scores;
    let pretty = config.output.pretty;

    let spinner = create_spinner()?;
    let pb = spinner.clone();
    let result = tokio::task::spawn_blocking(move || {
        classify_blocking(Petal::new(config), &input, include_scores, &pb)
    })
    .await;
    spinner.finish_and_clear();
    let record = result??;

    match args.output {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("Cannot create output file {}", path.display()))?;
            let mut writer = OutputWriter::new(BufWriter::new(file), format, pretty);
            write_record(&mut writer, &record, format)?;
            writer.flush()?;
            tracing::info!("Output written to {:?}", path);
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = OutputWriter::new(stdout.lock(), format, pretty);
            write_record(&mut writer, &record, format)?;
            writer.flush()?;
        }
    }

    Ok(())
}

/// Load the model, acquire the image and classify it.
fn classify_blocking(
    petal: Petal,
    input: &Input,
    include_scores: bool,
    pb: &ProgressBar,
) -> anyhow::Result<ClassificationRecord> {
    pb.set_message("Loading model...");
    let mut session = petal.open_session()?;

    let source = input.open(petal.config())?;
    pb.set_message(format!("Reading {}...", source.describe()));
    if session.acquire(source.as_ref())?.is_none() {
        tracing::warn!("No image from {}", source.describe());
    }

    pb.set_message("Classifying...");
    Ok(session.classify_record(include_scores)?)
}

/// In text mode, scores are listed under the two result lines, best first.
fn write_record<W: Write>(
    writer: &mut OutputWriter<W>,
    record: &ClassificationRecord,
    format: CoreOutputFormat,
) -> anyhow::Result<()> {
    writer.write(record)?;
    if let (CoreOutputFormat::Text, Some(scores)) = (format, &record.scores) {
        let mut out = Vec::new();
        for s in LabelScore::ranked(scores) {
            writeln!(
                out,
                "  {:<16} {}",
                s.label,
                petal_core::classifier::format_confidence(s.score)
            )?;
        }
        writer.write(&TextBlock(String::from_utf8_lossy(&out).trim_end().to_string()))?;
    }
    Ok(())
}

/// Preformatted text passed straight through the writer.
#[derive(serde::Serialize)]
struct TextBlock(String);

impl std::fmt::Display for TextBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn create_spinner() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}
