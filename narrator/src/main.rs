//! audiobook-director - Turn EPUB, PDF and MOBI books into narrated audio

mod audio;
mod config;
mod error;
mod ingest;
mod pipeline;
mod report;
mod structure;
mod synthesis;
mod text;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use config::NarratorConfig;
use model_client::{ModelPreset, ProviderKind, VoiceSelector};
use pipeline::BookPipeline;
use report::RunReport;
use std::path::{Path, PathBuf};
use std::time::Duration;
use synthesis::SynthesisDriver;
use tempfile::TempDir;
use text::Utterance;

#[derive(Parser, Debug)]
#[command(name = "audiobook-director")]
#[command(about = "Turn EPUB, PDF and MOBI books into emotion-tagged narrated audio", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the book (.epub, .pdf, .mobi, .azw3)
    book: Option<PathBuf>,

    /// Output WAV path (default: <book-name>.wav)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only synthesize the first N utterances
    #[arg(long)]
    limit: Option<usize>,

    /// Maximum characters per synthesis chunk
    #[arg(long)]
    max_chunk_chars: Option<usize>,

    /// Number of processed utterances to print before synthesis
    #[arg(long, default_value_t = 5)]
    preview: usize,

    /// Stop after classification and print utterances as JSON
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Pipeline config file (default: ~/.config/audiobook-director/narrator.toml);
    /// models.toml is read from the same directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the narration voice
    SetNarrationVoice {
        /// Preset id, reference audio path, or style prompt
        value: String,
        #[arg(long, value_enum, default_value_t = VoiceKind::Preset)]
        kind: VoiceKind,
    },
    /// Set the dialogue voice
    SetDialogueVoice {
        /// Preset id, reference audio path, or style prompt
        value: String,
        #[arg(long, value_enum, default_value_t = VoiceKind::Preset)]
        kind: VoiceKind,
    },
    /// Set the maximum synthesis chunk length
    SetMaxChunk {
        /// Characters
        value: usize,
    },
    /// Set the silence between utterances
    SetSilenceGap {
        /// Milliseconds
        value: u64,
    },
    /// Set the emotion classifier (huggingface, mock)
    SetClassifier {
        provider: String,
        model: String,
    },
    /// Set the speech synthesizer (speech-server, mock)
    SetSynthesizer {
        provider: String,
        model: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum VoiceKind {
    Preset,
    Reference,
    Prompt,
}

impl VoiceKind {
    fn selector(self, value: &str) -> VoiceSelector {
        match self {
            Self::Preset => VoiceSelector::Preset(value.to_string()),
            Self::Reference => VoiceSelector::Reference(PathBuf::from(value)),
            Self::Prompt => VoiceSelector::Prompt(value.to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action, args.config.as_deref());
    }

    let book_path = args.book.clone().ok_or_else(|| {
        anyhow::anyhow!("Book path is required. Run 'audiobook-director --help' for usage.")
    })?;

    if !book_path.exists() {
        anyhow::bail!("Book not found: {}", book_path.display());
    }

    let mut config = load_config(args.config.as_deref())?;
    if let Some(max) = args.max_chunk_chars {
        config.max_chunk_chars = max;
    }

    let output_path = args.output.clone().unwrap_or_else(|| {
        let stem = book_path.file_stem().unwrap_or_default();
        book_path.with_file_name(format!("{}.wav", stem.to_string_lossy()))
    });

    if args.debug {
        eprintln!("Book: {}", book_path.display());
        eprintln!("Output: {}", output_path.display());
        eprintln!("Max chunk chars: {}", config.max_chunk_chars);
        eprintln!("Voices: {:?}", config.voices);
    }

    // Text stages
    eprintln!("Processing book: {}", book_path.display());
    let book_pipeline = BookPipeline::from_config(&config).context("Failed to set up text pipeline")?;
    let mut utterances = book_pipeline
        .utterances(&book_path)
        .with_context(|| format!("Failed to process {}", book_path.display()))?;

    if utterances.is_empty() {
        anyhow::bail!("No sentences found in {}", book_path.display());
    }
    eprintln!("Utterances: {}", utterances.len());

    if let Some(limit) = args.limit {
        utterances.truncate(limit);
        eprintln!("Limiting to the first {} utterances", utterances.len());
    }

    // Models are constructed once and passed by reference
    let models = load_models(args.config.as_deref())?;

    let classifier = model_client::get_classifier(
        &models.classifier,
        models.get_provider_config(&models.classifier.provider),
    )
    .context("Failed to create emotion classifier")?;
    classifier.is_available()?;

    eprintln!("Classifying emotions with {}...", classifier.name());
    let summary = pipeline::classify(
        classifier.as_ref(),
        &mut utterances,
        config.classify_batch_size,
        Duration::from_secs(config.unit_timeout_secs),
    )
    .await;
    if summary.failed_batches > 0 {
        eprintln!(
            "Warning: {} classifier batch(es) failed; {} of {} utterances classified",
            summary.failed_batches,
            summary.classified,
            utterances.len()
        );
    }

    print_preview(&utterances, args.preview);

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&utterances)?);
        return Ok(());
    }

    let synthesizer = model_client::get_synthesizer(
        &models.synthesizer,
        models.get_provider_config(&models.synthesizer.provider),
    )
    .context("Failed to create speech synthesizer")?;
    synthesizer.is_available()?;

    let chunks = pipeline::plan_chunks(&utterances, config.max_chunk_chars);
    eprintln!(
        "\nSynthesizing {} chunks with {}...",
        chunks.len(),
        synthesizer.name()
    );

    let book_hash = report::compute_book_hash(&book_path)?;
    let mut run_report = RunReport::new(book_path.clone(), book_hash);
    run_report.utterances = utterances.len();
    run_report.classified = summary.classified;

    // Removed with every rendered chunk when it goes out of scope
    let scratch = TempDir::new().context("Failed to create scratch directory")?;

    let driver = SynthesisDriver::new(
        synthesizer.as_ref(),
        &config.voices,
        Duration::from_secs(config.unit_timeout_secs),
    )
    .with_progress(true);
    let results = driver.render_all(&chunks, scratch.path()).await;
    run_report.record_results(&results);

    eprintln!(
        "Rendered: {}, Skipped: {}",
        run_report.rendered,
        run_report.skipped.len()
    );

    eprintln!("\nAssembling audiobook...");
    let segments = synthesis::rendered_segments(&results);
    let assembled = audio::assemble_wav(&segments, &output_path, config.silence_gap_ms);

    let report_path = report::report_path(&output_path);
    match assembled {
        Ok(summary) => {
            run_report.finish(Some(output_path.clone()), Some(summary.duration_ms));
            report::save_report(&run_report, &report_path)?;

            let metadata = std::fs::metadata(&output_path)?;
            let size_mb = metadata.len() as f64 / (1024.0 * 1024.0);
            if summary.segments_skipped > 0 {
                eprintln!(
                    "Warning: {} of {} rendered chunks could not be assembled",
                    summary.segments_skipped,
                    summary.segments_skipped + summary.segments_written
                );
            }
            eprintln!(
                "Output: {} ({:.1} MB, {:.1} min)",
                output_path.display(),
                size_mb,
                summary.duration_ms as f64 / 60_000.0
            );
            eprintln!("Report: {}", report_path.display());
            Ok(())
        }
        Err(e) => {
            run_report.finish(None, None);
            report::save_report(&run_report, &report_path)?;
            Err(e.context(format!(
                "No audiobook written; see {}",
                report_path.display()
            )))
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<NarratorConfig> {
    match path {
        Some(path) => NarratorConfig::load_from(path),
        None => NarratorConfig::load(),
    }
    .context("Failed to load configuration")
}

fn save_config(config: &NarratorConfig, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => config.save_to(path),
        None => config.save(),
    }
}

/// models.toml lives beside an explicit pipeline config, or in the default
/// config directory.
fn models_path(config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.with_file_name("models.toml")),
        None => Ok(model_client::Config::config_path()?),
    }
}

fn load_models(config_path: Option<&Path>) -> Result<model_client::Config> {
    let path = models_path(config_path)?;
    model_client::Config::load_from(&path)
        .with_context(|| format!("Failed to load model configuration from {:?}", path))
}

fn save_models(models: &model_client::Config, config_path: Option<&Path>) -> Result<()> {
    let path = models_path(config_path)?;
    models
        .save_to(&path)
        .with_context(|| format!("Failed to save model configuration to {:?}", path))
}

fn model_preset(provider: &str, model: &str) -> Result<ModelPreset> {
    ProviderKind::from_str(provider)?;
    Ok(ModelPreset {
        provider: provider.to_string(),
        model: model.to_string(),
    })
}

fn print_preview(utterances: &[Utterance], count: usize) {
    if count == 0 {
        return;
    }

    eprintln!("\n--- First {} Processed Sentences ---", count.min(utterances.len()));
    for utterance in utterances.iter().take(count) {
        eprintln!("  Type: {}", utterance.kind);
        eprintln!("  Sentence: \"{}\"", utterance.text);
        match (utterance.emotion, utterance.score) {
            (Some(emotion), Some(score)) => {
                eprintln!("  Emotion: {} (Score: {:.2})", emotion, score)
            }
            _ => eprintln!("  Emotion: (unclassified)"),
        }
        eprintln!("{}", "-".repeat(20));
    }
}

fn describe_voice(voice: &VoiceSelector) -> String {
    match voice {
        VoiceSelector::Preset(id) => format!("preset \"{}\"", id),
        VoiceSelector::Reference(path) => format!("reference \"{}\"", path.display()),
        VoiceSelector::Prompt(prompt) => format!("prompt \"{}\"", prompt),
    }
}

fn handle_config_command(action: &ConfigAction, path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(path)?;
            match path {
                Some(p) => println!("Configuration file: {:?}", p),
                None => println!("Configuration file: {:?}", NarratorConfig::config_path()?),
            }
            println!();
            println!("max_chunk_chars = {}", config.max_chunk_chars);
            println!("silence_gap_ms = {}", config.silence_gap_ms);
            println!("unit_timeout_secs = {}", config.unit_timeout_secs);
            println!("classify_batch_size = {}", config.classify_batch_size);
            println!("narration voice = {}", describe_voice(&config.voices.narration));
            println!("dialogue voice = {}", describe_voice(&config.voices.dialogue));
            if config.boundary.extra_patterns.is_empty() {
                println!("boundary.extra_patterns = (none)");
            } else {
                println!("boundary.extra_patterns = {:?}", config.boundary.extra_patterns);
            }
            println!(
                "pdf.content_filter = {} (min_words = {}, min_alnum_ratio = {})",
                config.pdf.content_filter, config.pdf.min_words, config.pdf.min_alnum_ratio
            );

            let models = load_models(path)?;
            println!();
            println!("Model configuration: {:?}", models_path(path)?);
            println!(
                "classifier = {} ({})",
                models.classifier.model, models.classifier.provider
            );
            println!(
                "synthesizer = {} ({})",
                models.synthesizer.model, models.synthesizer.provider
            );
        }
        ConfigAction::SetNarrationVoice { value, kind } => {
            let mut config = load_config(path)?;
            config.voices.narration = kind.selector(value);
            save_config(&config, path)?;
            println!("Narration voice set to: {}", describe_voice(&config.voices.narration));
        }
        ConfigAction::SetDialogueVoice { value, kind } => {
            let mut config = load_config(path)?;
            config.voices.dialogue = kind.selector(value);
            save_config(&config, path)?;
            println!("Dialogue voice set to: {}", describe_voice(&config.voices.dialogue));
        }
        ConfigAction::SetMaxChunk { value } => {
            if *value == 0 {
                anyhow::bail!("Maximum chunk length must be at least 1 character");
            }
            let mut config = load_config(path)?;
            config.max_chunk_chars = *value;
            save_config(&config, path)?;
            println!("Maximum chunk length set to: {} characters", value);
        }
        ConfigAction::SetSilenceGap { value } => {
            let mut config = load_config(path)?;
            config.silence_gap_ms = *value;
            save_config(&config, path)?;
            println!("Silence gap set to: {} ms", value);
        }
        ConfigAction::SetClassifier { provider, model } => {
            let mut models = load_models(path)?;
            models.classifier = model_preset(provider, model)?;
            save_models(&models, path)?;
            println!("Classifier set to: {} ({})", model, provider);
        }
        ConfigAction::SetSynthesizer { provider, model } => {
            let mut models = load_models(path)?;
            models.synthesizer = model_preset(provider, model)?;
            save_models(&models, path)?;
            println!("Synthesizer set to: {} ({})", model, provider);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_conversion_flags() {
        let args = Args::try_parse_from([
            "audiobook-director",
            "book.epub",
            "--limit",
            "20",
            "--max-chunk-chars",
            "120",
            "--dry-run",
            "-d",
        ])
        .unwrap();

        assert_eq!(args.book, Some(PathBuf::from("book.epub")));
        assert_eq!(args.limit, Some(20));
        assert_eq!(args.max_chunk_chars, Some(120));
        assert_eq!(args.preview, 5);
        assert!(args.dry_run);
        assert!(args.debug);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_parses_config_subcommand() {
        let args = Args::try_parse_from([
            "audiobook-director",
            "config",
            "set-dialogue-voice",
            "/voices/alice.wav",
            "--kind",
            "reference",
        ])
        .unwrap();

        match args.command {
            Some(Commands::Config {
                action: ConfigAction::SetDialogueVoice { value, kind },
            }) => {
                assert_eq!(
                    kind.selector(&value),
                    VoiceSelector::Reference(PathBuf::from("/voices/alice.wav"))
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_config_commands_write_given_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("narrator.toml");

        handle_config_command(&ConfigAction::SetMaxChunk { value: 99 }, Some(&path)).unwrap();
        handle_config_command(&ConfigAction::SetSilenceGap { value: 250 }, Some(&path)).unwrap();
        handle_config_command(
            &ConfigAction::SetNarrationVoice {
                value: "[calm]".to_string(),
                kind: VoiceKind::Prompt,
            },
            Some(&path),
        )
        .unwrap();

        let config = NarratorConfig::load_from(&path).unwrap();
        assert_eq!(config.max_chunk_chars, 99);
        assert_eq!(config.silence_gap_ms, 250);
        assert_eq!(config.voices.narration, VoiceSelector::Prompt("[calm]".to_string()));

        assert!(handle_config_command(&ConfigAction::SetMaxChunk { value: 0 }, Some(&path)).is_err());
    }

    #[test]
    fn test_model_commands_write_models_beside_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("narrator.toml");

        handle_config_command(
            &ConfigAction::SetSynthesizer {
                provider: "mock".to_string(),
                model: "silence".to_string(),
            },
            Some(&path),
        )
        .unwrap();

        let models = model_client::Config::load_from(&dir.path().join("models.toml")).unwrap();
        assert_eq!(models.synthesizer.provider, "mock");
        assert_eq!(models.synthesizer.model, "silence");
        assert_eq!(load_models(Some(&path)).unwrap().synthesizer, models.synthesizer);

        let unknown = handle_config_command(
            &ConfigAction::SetClassifier {
                provider: "nowhere".to_string(),
                model: "x".to_string(),
            },
            Some(&path),
        );
        assert!(unknown.is_err());
    }
}
