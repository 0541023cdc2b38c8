//! The `petal models` command for inspecting the classifier model.

use clap::{Args, Subcommand};
use petal_core::pipeline::Hasher;
use petal_core::{Config, Petal};
use std::path::{Path, PathBuf};

use super::classify::apply_overrides;

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Show model directory path
    Path,

    /// List ONNX models in the model directory
    List,

    /// Print the label table in model output order
    Labels,

    /// Load the model and verify it against the label table and checksum
    Check {
        /// Check this ONNX model instead of the configured one
        #[arg(long)]
        model: Option<PathBuf>,

        /// Check against this label file instead of the configured one
        #[arg(long)]
        labels: Option<PathBuf>,
    },
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        ModelsCommand::Path => {
            println!("{}", config.model_dir().display());
        }

        ModelsCommand::List => {
            let model_dir = config.model_dir();
            let selected = config.model_path();
            println!("Models in {}:", model_dir.display());

            let models = list_models(&model_dir)?;
            if models.is_empty() {
                println!("    (none installed)");
            }
            for path in models {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let marker = if path == selected { " (configured)" } else { "" };
                println!("    - {:40}{}", name, marker);
            }
            if !selected.exists() {
                println!("\n  Configured model not found: {}", selected.display());
            }
        }

        ModelsCommand::Labels => {
            let labels = Petal::new(config.clone()).load_labels()?;
            let source = config
                .labels_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "bundled".to_string());
            println!("{} labels ({}):", labels.len(), source);
            for (index, label) in labels.iter().enumerate() {
                println!("  {:>3}  {}", index, label);
            }
        }

        ModelsCommand::Check { model, labels } => {
            let mut config = config.clone();
            apply_overrides(&mut config, model.as_deref(), labels.as_deref())?;
            check(config).await?;
        }
    }

    Ok(())
}

/// ONNX files in the model directory, sorted by name.
///
/// A missing directory lists as empty.
fn list_models(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut models: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"))
        })
        .collect();
    models.sort();
    Ok(models)
}

/// Verify checksum, then load the model and compare its output length with
/// the label table.
async fn check(config: Config) -> anyhow::Result<()> {
    let model_path = config.model_path();
    println!("Model:  {}", model_path.display());

    if config.model.blake3.trim().is_empty() {
        println!("  checksum: not configured (set model.blake3 to verify)");
    } else {
        verify_blake3(&model_path, &config.model.blake3)?;
        println!("  checksum: ok");
    }

    let petal = Petal::new(config);
    let classifier = tokio::task::spawn_blocking(move || petal.load_classifier()).await??;

    println!(
        "  loaded:   {}",
        classifier.model().model_path().display()
    );
    println!(
        "  input:    {:?} ({:?}, {:?})",
        classifier.preprocessor().shape(),
        classifier.preprocessor().layout(),
        classifier.preprocessor().normalization()
    );
    println!(
        "  classes:  {} (matches label table)",
        classifier.labels().len()
    );
    Ok(())
}

/// Verify a model file's BLAKE3 checksum.
fn verify_blake3(path: &Path, expected: &str) -> anyhow::Result<()> {
    let verdict = Hasher::verify(path, expected)
        .map_err(|e| anyhow::anyhow!("Checksum computation failed for {}: {e}", path.display()))?;

    if let Err(actual) = verdict {
        anyhow::bail!(
            "Checksum mismatch for {}:\n  expected: {}\n  actual:   {}",
            path.display(),
            expected.trim(),
            actual
        );
    }

    tracing::debug!("Checksum verified for {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_blake3_correct_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"hello petal").unwrap();
        let expected = Hasher::content_hash(&path).unwrap();

        assert!(verify_blake3(&path, &expected).is_ok());
        assert!(verify_blake3(&path, &expected.to_uppercase()).is_ok());
        assert!(path.exists(), "verification must not touch the model");
    }

    #[test]
    fn verify_blake3_wrong_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"hello petal").unwrap();

        let err = verify_blake3(&path, &"0".repeat(64)).unwrap_err();
        assert!(err.to_string().contains("Checksum mismatch"));
        assert!(path.exists());
    }

    #[test]
    fn verify_blake3_missing_file() {
        let result = verify_blake3(Path::new("/nonexistent/file.onnx"), &"0".repeat(64));
        assert!(result.is_err());
    }

    #[test]
    fn list_models_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.onnx"), b"").unwrap();
        std::fs::write(dir.path().join("a.ONNX"), b"").unwrap();
        std::fs::write(dir.path().join("labels.txt"), b"").unwrap();
        std::fs::create_dir(dir.path().join("sub.onnx")).unwrap();

        let names: Vec<String> = list_models(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.ONNX", "b.onnx"]);
    }

    #[test]
    fn list_models_missing_dir_is_empty() {
        assert!(list_models(Path::new("/nonexistent/petal/models"))
            .unwrap()
            .is_empty());
    }
}
