//! Interactive classification screen for bare `petal` on a TTY.
//!
//! One current image, one result. Picking or capturing replaces the image;
//! "Classify" runs the model on whatever is loaded and shows the two-line
//! result (or "No image selected!").

use std::path::PathBuf;

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use petal_core::{
    CameraSource, Config, GallerySource, ImageSource, OnnxClassifier, Petal, Session,
};

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Main menu options.
const MENU_ITEMS: &[&str] = &[
    "Pick image from gallery",
    "Capture from camera",
    "Classify",
    "Show configuration",
    "Exit",
];

/// What the screen shows besides the menu.
struct Screen {
    session: Session<OnnxClassifier>,
    result: Option<String>,
}

/// Prompts in rose, answers in leaf green.
fn petal_theme() -> ColorfulTheme {
    let rose = Style::new().for_stderr().color256(204);
    let leaf = Style::new().for_stderr().color256(71);

    ColorfulTheme {
        prompt_prefix: rose.apply_to("✿".to_string()),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("".to_string()).for_stderr(),
        active_item_prefix: rose.apply_to("❯".to_string()),
        active_item_style: rose.clone(),
        inactive_item_prefix: style(" ".to_string()).for_stderr(),
        success_prefix: leaf.apply_to("✿".to_string()),
        success_suffix: style("→".to_string()).for_stderr().dim(),
        values_style: leaf,
        error_prefix: style("!".to_string()).for_stderr().red().bold(),
        ..ColorfulTheme::default()
    }
}

fn print_banner() {
    let rose = Style::new().for_stderr().color256(204).bold();
    let dim = Style::new().for_stderr().dim();
    eprintln!();
    eprintln!(
        "  {} {}",
        rose.apply_to(format!("✿ Petal {}", petal_core::VERSION)),
        dim.apply_to("· what flower is this?")
    );
}

/// Entry point for interactive mode.
///
/// The model is loaded on the first "Classify" with an image present, so a
/// missing model shows up as a result message instead of ending the screen.
pub async fn run(config: Config) -> anyhow::Result<()> {
    print_banner();
    let theme = petal_theme();

    let petal = Petal::new(config);
    let mut screen = Screen {
        session: Session::detached(petal.config()),
        result: None,
    };

    loop {
        print_status(&screen);

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => pick(&mut screen, petal.config())?,
            Some(1) => capture(&mut screen, petal.config()),
            Some(2) => {
                let text = with_spinner("Classifying...", || {
                    classify_text(&mut screen.session, &petal)
                });
                screen.result = Some(text);
            }
            Some(3) => show_config(petal.config()),
            Some(4) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// Result text for the current image, loading the model on first use.
fn classify_text(session: &mut Session<OnnxClassifier>, petal: &Petal) -> String {
    if session.current().is_some() && session.classifier().is_none() {
        match petal.load_classifier() {
            Ok(classifier) => session.attach(classifier),
            Err(e) => {
                tracing::error!("Failed to load classifier: {e}");
                return e.to_string();
            }
        }
    }
    session.result_text()
}

/// Prompt for a file path and load it. An empty answer or Esc cancels.
fn pick(screen: &mut Screen, config: &Config) -> anyhow::Result<()> {
    let Some(raw_path) = handle_interrupt(
        Input::<String>::with_theme(&petal_theme())
            .with_prompt("Path to image (empty to cancel)")
            .allow_empty(true)
            .interact_text(),
    )?
    else {
        return Ok(());
    };

    let raw_path = raw_path.trim();
    if raw_path.is_empty() {
        return Ok(());
    }

    let path = PathBuf::from(shellexpand::tilde(raw_path).into_owned());
    load(screen, &GallerySource::new(path, &config.limits));
    Ok(())
}

fn capture(screen: &mut Screen, config: &Config) {
    match CameraSource::from_config(&config.capture) {
        Some(camera) => load(screen, &camera),
        None => {
            let warn = Style::new().for_stderr().yellow();
            eprintln!(
                "  {}",
                warn.apply_to("No camera command configured. Set `capture.command` in the config file.")
            );
        }
    }
}

/// Acquire from `source`. Failures are shown and leave the screen unchanged.
fn load(screen: &mut Screen, source: &dyn ImageSource) {
    let outcome = with_spinner("Loading image...", || {
        screen.session.acquire(source).map(|loaded| loaded.is_some())
    });

    match outcome {
        Ok(true) => screen.result = None,
        Ok(false) => {
            let dim = Style::new().for_stderr().dim();
            eprintln!("  {}", dim.apply_to("Cancelled."));
        }
        Err(e) => {
            tracing::debug!("Load from {} failed: {e}", source.describe());
            let err = Style::new().for_stderr().red();
            eprintln!("  {} {e}", err.apply_to("✗"));
        }
    }
}

fn print_status(screen: &Screen) {
    let label = Style::new().for_stderr().bold();
    let dim = Style::new().for_stderr().dim();

    eprintln!();
    match screen.session.current() {
        Some(image) => eprintln!(
            "  {:<8} {} {}",
            label.apply_to("Image:"),
            image.source_name,
            dim.apply_to(format!(
                "({}x{}, {})",
                image.width,
                image.height,
                petal_core::pipeline::format_to_string(image.format)
            ))
        ),
        None => eprintln!("  {:<8} {}", label.apply_to("Image:"), dim.apply_to("none")),
    }

    if let Some(ref result) = screen.result {
        let green = Style::new().for_stderr().green().bold();
        eprintln!();
        for line in result.lines() {
            eprintln!("  {}", green.apply_to(line));
        }
    }
    eprintln!();
}

/// Summary of the settings that affect classification.
fn show_config(config: &Config) {
    let dim = Style::new().for_stderr().dim();
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();

    let config_path = Config::default_path();
    let path_note = if config_path.exists() {
        "(exists)"
    } else {
        "(using defaults)"
    };

    eprintln!();
    eprintln!("  {}", cyan.apply_to("Current configuration:"));
    eprintln!();
    eprintln!(
        "    {:<16} {} {}",
        label.apply_to("Config file:"),
        config_path.display(),
        dim.apply_to(path_note)
    );
    eprintln!(
        "    {:<16} {}",
        label.apply_to("Model:"),
        config.model_path().display()
    );
    eprintln!(
        "    {:<16} {}px {:?} {:?}",
        label.apply_to("Input:"),
        config.model.input_size,
        config.model.layout,
        config.model.normalization
    );
    eprintln!(
        "    {:<16} {}",
        label.apply_to("Labels:"),
        config
            .labels_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "bundled".to_string())
    );
    eprintln!(
        "    {:<16} {}",
        label.apply_to("Camera:"),
        if config.capture.is_configured() {
            config.capture.command.join(" ")
        } else {
            "not configured".to_string()
        }
    );
    eprintln!(
        "    {:<16} {}",
        label.apply_to("Log level:"),
        config.logging.level
    );
}

/// Run blocking work on this worker thread with a spinner on stderr.
fn with_spinner<T>(message: &'static str, work: impl FnOnce() -> T) -> T {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.magenta} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = tokio::task::block_in_place(work);
    pb.finish_and_clear();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_becomes_none() {
        let interrupted: dialoguer::Result<u32> = Err(dialoguer::Error::IO(
            std::io::Error::from(std::io::ErrorKind::Interrupted),
        ));
        assert!(handle_interrupt(interrupted).unwrap().is_none());
    }

    #[test]
    fn other_io_errors_propagate() {
        let broken: dialoguer::Result<u32> = Err(dialoguer::Error::IO(std::io::Error::from(
            std::io::ErrorKind::BrokenPipe,
        )));
        assert!(handle_interrupt(broken).is_err());
    }

    #[test]
    fn success_passes_through() {
        assert_eq!(handle_interrupt(Ok(7)).unwrap(), Some(7));
    }

    #[test]
    fn model_is_loaded_only_when_an_image_is_classified() {
        let mut config = Config::default();
        config.general.model_dir = PathBuf::from("/nonexistent/petal/models");
        let petal = Petal::new(config);
        let mut session = Session::detached(petal.config());

        assert_eq!(classify_text(&mut session, &petal), "No image selected!");

        let mut png = Vec::new();
        image::DynamicImage::new_rgb8(8, 8)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        session.load_bytes("daisy.png", png).unwrap();

        let text = classify_text(&mut session, &petal);
        assert!(text.contains("Model not found"), "unexpected result: {text}");
        assert!(session.classifier().is_none());
        assert_eq!(session.current().unwrap().source_name, "daisy.png");
    }

    #[test]
    fn prompts_carry_the_flower_mark() {
        let theme = petal_theme();
        assert!(theme.prompt_prefix.to_string().contains('✿'));
        assert!(theme.success_prefix.to_string().contains('✿'));
        assert!(theme.active_item_prefix.to_string().contains('❯'));
    }

    #[test]
    fn menu_has_exit_last() {
        assert_eq!(MENU_ITEMS.last(), Some(&"Exit"));
        assert_eq!(MENU_ITEMS.len(), 5);
    }
}
