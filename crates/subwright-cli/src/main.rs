//! Subwright CLI
//!
//! Headless driver for the subtitle engine: transcribe media into SRT,
//! translate or dub existing subtitle files, shift timings, and convert
//! between the interchange formats.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use subwright_core::core::ai::{GeminiConfig, GeminiProvider};
use subwright_core::core::export;
use subwright_core::core::project::Project;
use subwright_core::core::settings::AppSettings;

#[derive(Parser)]
#[command(
    name = "subwright",
    about = "AI-assisted subtitle transcription, translation, and dubbing",
    version
)]
struct Cli {
    /// Gemini API key (falls back to $GEMINI_API_KEY, then settings)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transcribe a media file into SRT
    Transcribe {
        /// Input media file (audio payload is sent as-is)
        input: PathBuf,
        /// MIME type override (guessed from the extension otherwise)
        #[arg(long)]
        mime: Option<String>,
        /// Output file (defaults to `<name>_subs.srt` next to the input)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Translate the cues of an SRT file
    Translate {
        /// Input SRT file
        input: PathBuf,
        /// Target language (e.g. "Spanish")
        #[arg(long)]
        to: String,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Shift every cue by a signed number of seconds
    Shift {
        /// Input SRT file
        input: PathBuf,
        /// Offset in seconds (negative shifts earlier; times clamp at 0)
        #[arg(long, allow_hyphen_values = true)]
        by: f64,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Convert an SRT file to another export format
    Export {
        /// Input SRT file
        input: PathBuf,
        /// Output format: srt or json
        #[arg(long, default_value = "json")]
        format: String,
        /// Output file (defaults to `<name>_subs.<format>`)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Synthesize a dub track from an SRT file's text
    Dub {
        /// Input SRT file
        input: PathBuf,
        /// Voice name
        #[arg(long)]
        voice: Option<String>,
        /// Output WAV file
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    subwright_core::init_logging(&AppSettings::default_dir().join("logs"));
    let cli = Cli::parse();
    let settings = AppSettings::load(&AppSettings::default_dir());

    match cli.command {
        Command::Transcribe { input, mime, out } => {
            let provider = build_provider(cli.api_key, &settings)?;
            let audio = std::fs::read(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let mime = mime.unwrap_or_else(|| guess_mime(&input));
            tracing::info!("transcribing {} ({} bytes)", input.display(), audio.len());

            let mut project = Project::new();
            project.load_media(&file_name_of(&input), &mime);
            project
                .run_transcription(&provider, &audio, &mime)
                .await
                .context("transcription")?;

            let out = out.unwrap_or_else(|| {
                input.with_file_name(project.export_file_name("srt"))
            });
            std::fs::write(&out, project.export_srt())?;
            println!("wrote {} cue(s) to {}", project.store().len(), out.display());
        }

        Command::Translate { input, to, out } => {
            let provider = build_provider(cli.api_key, &settings)?;
            let mut project = load_project(&input)?;
            project
                .run_translation(&provider, &to)
                .await
                .context("translation")?;
            write_output(out.as_deref(), &project.export_srt())?;
        }

        Command::Shift { input, by, out } => {
            let mut project = load_project(&input)?;
            project.shift_all(by);
            write_output(out.as_deref(), &project.export_srt())?;
        }

        Command::Export { input, format, out } => {
            let project = load_project(&input)?;
            let content = match format.as_str() {
                "srt" => project.export_srt(),
                "json" => project.export_json()?,
                other => bail!("unsupported format: {} (expected srt or json)", other),
            };
            let out =
                out.unwrap_or_else(|| input.with_file_name(project.export_file_name(&format)));
            std::fs::write(&out, content)?;
            println!("wrote {}", out.display());
        }

        Command::Dub { input, voice, out } => {
            let provider = build_provider(cli.api_key, &settings)?;
            let voice = voice.unwrap_or_else(|| settings.ai.voice.clone());
            let mut project = load_project(&input)?;

            let progress = |_generation: u64, percent: f64| {
                eprint!("\rsynthesizing… {:>5.1}%", percent);
            };
            project
                .run_dub(&provider, &voice, Some(&progress))
                .await
                .context("dubbing")?;
            eprintln!();

            let dub = project
                .dub()
                .context("pipeline finished without a dub resource")?;
            std::fs::write(&out, &dub.wav_bytes)?;
            println!(
                "wrote {:.2}s of audio ({} chunk(s), {} skipped) to {}",
                dub.duration_sec,
                dub.synthesized_chunks,
                dub.skipped_chunks,
                out.display()
            );
        }
    }

    Ok(())
}

/// Loads an SRT file into a fresh project named after it
fn load_project(input: &Path) -> Result<Project> {
    let content =
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let cues = export::parse_srt(&content).context("parsing SRT")?;

    let mut project = Project::new();
    project.load_media(&file_name_of(input), "application/x-subrip");
    project.load_cues(cues);
    Ok(project)
}

fn build_provider(api_key: Option<String>, settings: &AppSettings) -> Result<GeminiProvider> {
    let api_key = api_key
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .or_else(|| settings.ai.api_key.clone())
        .context("no API key: pass --api-key, set $GEMINI_API_KEY, or add it to settings")?;

    let mut config = GeminiConfig::with_api_key(api_key);
    config.model = settings.ai.model.clone();
    GeminiProvider::new(config).map_err(Into::into)
}

fn write_output(out: Option<&Path>, content: &str) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, content)?;
            println!("wrote {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn guess_mime(path: &Path) -> String {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
        .as_str()
    {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "mp4" | "m4a" => "audio/mp4",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
    .to_string()
}
