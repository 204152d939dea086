// WildLens CLI - species lookups, quizzes and wildlife images from the terminal

mod exit_codes;
mod render;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use wildlens_config::{ConfigError, Diagnostics, ResolvedConfig, Settings};
use wildlens_core::{detect_mime, ImageArtifact};
use wildlens_genai::{GeminiClient, GenAiError};
use wildlens_normalizer::{
    NormalizeError, NormalizerOptions, ResponseNormalizer, DEFAULT_QUIZ_TOPIC,
};

use exit_codes::{
    genai_exit_code, normalize_exit_code, EXIT_EMPTY_QUIZ, EXIT_ERROR, EXIT_KEYCHAIN,
    EXIT_MISSING_KEY, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "wildlens")]
#[command(about = "Wildlife explorer: species profiles, quizzes and images")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/wildlens/settings.json)
    #[arg(long, global = true, env = "WILDLENS_SETTINGS", value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Override the model service base URL
    #[arg(long, global = true, env = "WILDLENS_API_BASE", value_name = "URL")]
    api_base: Option<String>,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a species profile with cited sources
    #[command(after_help = "\
Examples:
  wildlens species \"Snow Leopard\"
  wildlens species pangolin --json > pangolin.json")]
    Species {
        /// Common or scientific name
        name: String,

        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a three-question quiz
    #[command(after_help = "\
Exit code 14 means the quiz could not be loaded.

Examples:
  wildlens quiz
  wildlens quiz \"Coral reefs\" --answers")]
    Quiz {
        /// Quiz topic
        #[arg(default_value = DEFAULT_QUIZ_TOPIC)]
        topic: String,

        /// Show the correct answer and explanation after each question
        #[arg(long)]
        answers: bool,

        /// Print the questions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create or edit images
    #[command(subcommand)]
    Image(ImageCommands),

    /// Show configuration and credential status
    Doctor {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the API key
    #[command(subcommand)]
    Key(KeyCommands),
}

#[derive(Subcommand)]
enum ImageCommands {
    /// Generate an image from a text prompt
    #[command(after_help = "\
Examples:
  wildlens image create \"a red fox in the snow\" -o fox.png
  wildlens image create \"a sea turtle\" --data-uri")]
    Create {
        prompt: String,

        #[command(flatten)]
        output: ImageOutput,
    },

    /// Edit an existing image with a text instruction
    #[command(after_help = "\
The input may be an image file (PNG, JPEG, WebP) or a text file holding
a base64 payload or data URI. Use - to read from stdin.

Examples:
  wildlens image edit fox.png \"add a sunset\" -o fox-sunset.png")]
    Edit {
        /// Source image
        input: PathBuf,

        /// What to change
        instruction: String,

        #[command(flatten)]
        output: ImageOutput,
    },
}

#[derive(clap::Args)]
struct ImageOutput {
    /// Output file (default: wildlens-image.<ext>)
    #[arg(long, short = 'o', value_name = "PATH")]
    out: Option<PathBuf>,

    /// Print a data URI on stdout instead of writing a file
    #[arg(long, conflicts_with = "out")]
    data_uri: bool,
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Store the API key in the system keychain (reads stdin when omitted)
    Set { key: Option<String> },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("WILDLENS_COMMIT"), ")",
        "\ntarget:  ", env!("WILDLENS_TARGET"),
    )
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    // stdout is reserved for command output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context::load(cli.settings.as_deref(), cli.api_base);
    tracing::debug!(api_base = %ctx.settings.api_base, "settings loaded");

    let result = match cli.command {
        Commands::Species { name, json } => cmd_species(&ctx, &name, json),
        Commands::Quiz { topic, answers, json } => cmd_quiz(&ctx, &topic, answers, json),
        Commands::Image(ImageCommands::Create { prompt, output }) => {
            cmd_image_create(&ctx, &prompt, &output)
        }
        Commands::Image(ImageCommands::Edit { input, instruction, output }) => {
            cmd_image_edit(&ctx, &input, &instruction, &output)
        }
        Commands::Doctor { json } => cmd_doctor(&ctx, json),
        Commands::Key(KeyCommands::Set { key }) => cmd_key_set(key),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingKey => Self {
                code: EXIT_MISSING_KEY,
                message: err.to_string(),
                hint: Some("run `wildlens doctor` to see where keys are looked up".to_string()),
            },
            ConfigError::Keychain(_) => Self { code: EXIT_KEYCHAIN, message: err.to_string(), hint: None },
        }
    }
}

impl From<GenAiError> for CliError {
    fn from(err: GenAiError) -> Self {
        let hint = if err.is_auth() {
            Some("check that the API key is valid for the Gemini API".to_string())
        } else {
            None
        };
        Self { code: genai_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<NormalizeError> for CliError {
    fn from(err: NormalizeError) -> Self {
        let code = normalize_exit_code(&err);
        let message = err.to_string();
        match err {
            NormalizeError::Transport(e) => e.into(),
            NormalizeError::UpstreamFormat { raw, .. } => {
                log::debug!("Raw model response: {}", raw);
                Self {
                    code,
                    message,
                    hint: Some("try again; rerun with -v to see the raw response".to_string()),
                }
            }
            _ => Self { code, message, hint: None },
        }
    }
}

// ============================================================================
// Shared setup
// ============================================================================

struct Context {
    settings: Settings,
    settings_path: Option<PathBuf>,
}

impl Context {
    fn load(settings_path: Option<&Path>, api_base: Option<String>) -> Self {
        let mut settings = match settings_path {
            Some(path) => Settings::load_from(path),
            None => Settings::load(),
        };
        if let Some(base) = api_base {
            settings.api_base = base;
        }
        Self {
            settings,
            settings_path: settings_path.map(Path::to_path_buf),
        }
    }

    /// Settings plus the API key lookup.
    fn resolve(&self) -> ResolvedConfig {
        ResolvedConfig::from_settings(&self.settings)
    }

    /// Fails fast when no key was found.
    fn normalizer(&self) -> Result<ResponseNormalizer<GeminiClient>, CliError> {
        let config = self.resolve();
        config.require_key()?;
        let client = GeminiClient::from_config(&config)?;
        let s = &config.settings;
        let options = NormalizerOptions {
            text_model: s.text_model.clone(),
            edit_model: s.edit_model.clone(),
            create_model: s.create_model.clone(),
            species_temperature: s.temperature,
            image_aspect_ratio: s.image_aspect_ratio.clone(),
            image_size: s.image_size.clone(),
        };
        Ok(ResponseNormalizer::new(client, options))
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CliError::io(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

// ============================================================================
// species
// ============================================================================

fn cmd_species(ctx: &Context, name: &str, json: bool) -> Result<(), CliError> {
    if name.trim().is_empty() {
        return Err(CliError::args("species name must not be empty"));
    }
    let normalizer = ctx.normalizer()?;
    let profile = normalizer.fetch_species_profile(name)?;

    if json {
        print_json(&profile)
    } else {
        print!("{}", render::species_profile(&profile));
        Ok(())
    }
}

// ============================================================================
// quiz
// ============================================================================

fn cmd_quiz(ctx: &Context, topic: &str, answers: bool, json: bool) -> Result<(), CliError> {
    if topic.trim().is_empty() {
        return Err(CliError::args("quiz topic must not be empty"));
    }
    let normalizer = ctx.normalizer()?;
    let questions = normalizer.fetch_quiz(topic);

    if questions.is_empty() {
        return Err(CliError {
            code: EXIT_EMPTY_QUIZ,
            message: format!("could not load a quiz about {:?}", topic.trim()),
            hint: Some("rerun with -v for details".to_string()),
        });
    }

    if json {
        print_json(&questions)
    } else {
        print!("{}", render::quiz(&questions, answers));
        Ok(())
    }
}

// ============================================================================
// image
// ============================================================================

fn cmd_image_create(ctx: &Context, prompt: &str, output: &ImageOutput) -> Result<(), CliError> {
    if prompt.trim().is_empty() {
        return Err(CliError::args("image prompt must not be empty"));
    }
    let normalizer = ctx.normalizer()?;
    let image = normalizer.create_image(prompt)?;
    write_image(&image, output)
}

fn cmd_image_edit(
    ctx: &Context,
    input: &Path,
    instruction: &str,
    output: &ImageOutput,
) -> Result<(), CliError> {
    if instruction.trim().is_empty() {
        return Err(CliError::args("edit instruction must not be empty"));
    }
    let source = read_source_image(input)?;
    let normalizer = ctx.normalizer()?;
    let image = normalizer.edit_image_artifact(&source, instruction)?;
    write_image(&image, output)
}

/// Raw image bytes are sniffed; anything else is treated as base64 text.
fn read_source_image(input: &Path) -> Result<ImageArtifact, CliError> {
    let bytes = if input == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| CliError::io(format!("reading stdin: {}", e)))?;
        buf
    } else {
        fs::read(input).map_err(|e| CliError::io(format!("{}: {}", input.display(), e)))?
    };

    if bytes.is_empty() {
        return Err(CliError::args(format!("{}: source image is empty", input.display())));
    }

    if let Some(mime) = detect_mime(&bytes) {
        return Ok(ImageArtifact::from_bytes(mime, bytes));
    }

    let text = String::from_utf8(bytes)
        .map_err(|_| CliError::args(format!("{}: not a PNG, JPEG or WebP image", input.display())))?;
    ImageArtifact::from_encoded(&text).map_err(|e| {
        CliError::args(format!("{}: {}", input.display(), e))
            .with_hint("pass an image file or a file holding base64 / a data URI")
    })
}

fn write_image(image: &ImageArtifact, output: &ImageOutput) -> Result<(), CliError> {
    if output.data_uri {
        println!("{}", image.to_data_uri());
        return Ok(());
    }

    let path = output
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("wildlens-image.{}", image.extension())));
    fs::write(&path, image.bytes()).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
    eprintln!("wrote {} ({}, {} bytes)", path.display(), image.mime_type(), image.bytes().len());
    Ok(())
}

// ============================================================================
// doctor / key
// ============================================================================

fn cmd_doctor(ctx: &Context, json: bool) -> Result<(), CliError> {
    let mut diag = Diagnostics::from_resolved(&ctx.resolve());
    if let Some(path) = &ctx.settings_path {
        diag.settings_path = path.display().to_string();
    }

    if json {
        let s = &diag.settings;
        let report = serde_json::json!({
            "schema_version": 1,
            "status": diag.status.as_str(),
            "key": if diag.key_present { "present" } else { "missing" },
            "key_source": diag.key_source.as_str(),
            "keychain": if diag.keychain_available { "ok" } else { "unavailable" },
            "settings_path": diag.settings_path,
            "api_base": s.api_base,
            "timeout_secs": s.timeout_secs,
            "models": {
                "text": s.text_model,
                "edit": s.edit_model,
                "create": s.create_model,
            },
        });
        print_json(&report)?;
    } else {
        print!("{}", diag);
        if !diag.key_present {
            println!();
            println!("Fix: set {} or run `wildlens key set`", wildlens_config::API_KEY_ENV);
        }
    }
    Ok(())
}

fn cmd_key_set(key: Option<String>) -> Result<(), CliError> {
    let key = match key {
        Some(k) => k,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CliError::io(format!("reading stdin: {}", e)))?;
            buf
        }
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::args("API key must not be empty"));
    }

    wildlens_config::set_api_key(key)?;
    eprintln!("API key stored in the system keychain");
    Ok(())
}
