//! Writer Pro - guided content creation for social platforms.
//!
//! Walks a description through outline generation and platform adaptation,
//! and manages the model, credential and instruction settings used to do it.

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use writer_pro::core::{
    char_count, get_or_warn, Config, ConfigStore, ContentType, FallbackGenerator, FileStore,
    InstructionKind, InstructionStore, Platform, PlatformConstraints, WarningLevel,
    WorkflowEngine, API_KEY_KEY, DEFAULT_PLATFORM_KEY, MODEL_KEY,
};
use writer_pro::{GenerationChain, APP_NAME};

/// Guided content creation for social platforms
#[derive(Parser)]
#[command(name = "writer-pro")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an outline and a platform-ready draft
    Create {
        /// What the content is about (optional when --type is given)
        description: Option<String>,

        /// Content preset (latest-news, motivation, info, vibe-check, surprise-me)
        #[arg(short = 't', long = "type")]
        content_type: Option<ContentType>,

        /// Target platform (twitter, linkedin, instagram, blog)
        #[arg(short, long)]
        platform: Option<Platform>,

        /// Use local templates only
        #[arg(long)]
        offline: bool,

        /// Instruction for this outline only
        #[arg(long)]
        outline_instruction: Option<String>,

        /// Instruction for this draft only
        #[arg(long)]
        optimize_instruction: Option<String>,
    },

    /// Check text against platform character budgets
    Count {
        /// Text to measure
        text: String,

        /// Only check this platform
        #[arg(short, long)]
        platform: Option<Platform>,
    },

    /// Manage system instructions
    Instructions {
        #[command(subcommand)]
        operation: InstructionsOperation,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        operation: Option<ConfigOperation>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum InstructionsOperation {
    /// Show the effective instruction
    Show {
        /// outline, optimize or persona
        kind: InstructionKind,
    },

    /// Save a custom instruction
    Set {
        /// outline, optimize or persona
        kind: InstructionKind,

        /// Instruction text
        text: String,
    },

    /// Go back to the built-in instruction
    Reset {
        /// outline, optimize or persona
        kind: InstructionKind,
    },
}

#[derive(Subcommand)]
enum ConfigOperation {
    /// Show configuration and stored settings
    Show,

    /// Show the config directory
    Path,

    /// Set the model used by the standard tier
    SetModel {
        /// Model identifier
        model: String,
    },

    /// Store the OpenAI API key
    SetKey {
        /// API key
        key: String,
    },

    /// Remove the stored API key
    ClearKey,

    /// Set the default platform
    SetPlatform {
        /// twitter, linkedin, instagram or blog
        platform: Platform,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    match cli.command {
        Commands::Create {
            description,
            content_type,
            platform,
            offline,
            outline_instruction,
            optimize_instruction,
        } => {
            let options = CreateOptions {
                description: description.unwrap_or_default(),
                content_type,
                platform,
                offline,
                outline_instruction,
                optimize_instruction,
            };
            cmd_create(&options)?;
        }
        Commands::Count { text, platform } => {
            cmd_count(&text, platform)?;
        }
        Commands::Instructions { operation } => {
            cmd_instructions(operation)?;
        }
        Commands::Config { operation } => {
            cmd_config(operation.unwrap_or(ConfigOperation::Show))?;
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
        }
    }

    Ok(())
}

struct CreateOptions {
    description: String,
    content_type: Option<ContentType>,
    platform: Option<Platform>,
    offline: bool,
    outline_instruction: Option<String>,
    optimize_instruction: Option<String>,
}

/// Open the persisted settings store.
fn open_store() -> Result<Arc<dyn ConfigStore>> {
    let store = FileStore::default_location()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(Arc::new(store))
}

fn build_chain(
    config: &Config,
    store: Arc<dyn ConfigStore>,
    constraints: &PlatformConstraints,
    offline: bool,
) -> GenerationChain {
    let fallback = FallbackGenerator::new(constraints.clone());
    if offline {
        return GenerationChain::offline(fallback);
    }
    remote_chain(config, store, fallback, constraints)
}

#[cfg(feature = "ai")]
fn remote_chain(
    config: &Config,
    store: Arc<dyn ConfigStore>,
    fallback: FallbackGenerator,
    constraints: &PlatformConstraints,
) -> GenerationChain {
    GenerationChain::from_config(config, store, fallback, constraints.clone())
}

#[cfg(not(feature = "ai"))]
fn remote_chain(
    _config: &Config,
    _store: Arc<dyn ConfigStore>,
    fallback: FallbackGenerator,
    _constraints: &PlatformConstraints,
) -> GenerationChain {
    GenerationChain::offline(fallback)
}

/// Run the whole workflow once and print the results.
fn cmd_create(options: &CreateOptions) -> Result<()> {
    let config = Config::load()?;
    let store = open_store()?;
    let constraints = PlatformConstraints::from_limits(&config.platforms);
    let chain = build_chain(&config, store.clone(), &constraints, options.offline);

    let engine = WorkflowEngine::new(Arc::new(chain), store)
        .with_default_platform(config.general.default_platform());

    match options.content_type {
        Some(preset) if options.description.trim().is_empty() => engine.select_preset(preset)?,
        content_type => engine.submit_description(&options.description, content_type)?,
    }

    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let tier = engine
            .generate_outline_with_instruction(options.outline_instruction.as_deref())
            .await?;
        report_warning(&engine);

        println!("Outline ({tier}):\n");
        println!("{}", engine.state().outline.trim_end());

        engine.continue_to_platforms()?;
        let platform = match options.platform {
            Some(platform) => {
                engine.select_platform(platform)?;
                platform
            }
            None => match engine.default_platform() {
                Some(_) => engine.select_default_platform()?,
                None => {
                    println!("\nNo platform given. Pass --platform or run `{APP_NAME} config set-platform`.");
                    return Ok::<(), anyhow::Error>(());
                }
            },
        };

        let tier = engine
            .optimize_for_platform_with_instruction(options.optimize_instruction.as_deref())
            .await?;
        report_warning(&engine);

        let draft = engine.state().draft;
        println!("\nDraft for {} ({tier}):\n", platform.label());
        println!("{}", draft.trim_end());
        println!();
        print_usage(&draft, platform, &constraints);

        Ok::<(), anyhow::Error>(())
    })
}

fn report_warning(engine: &WorkflowEngine) {
    if let Some(error) = engine.last_error() {
        eprintln!("Warning: {error}. Used local templates instead.");
    }
}

fn print_usage(text: &str, platform: Platform, constraints: &PlatformConstraints) {
    let count = char_count(text);
    let limit = constraints.limit_for(platform.id());
    let level = constraints.warning_level(count, platform.id());

    let marker = match level {
        WarningLevel::Ok => "✓",
        WarningLevel::Near => "!",
        WarningLevel::Over => "✗",
    };
    print!("{marker} {:<10} {count}/{limit} ({level})", platform.label());
    match constraints.overage(count, platform.id()) {
        Some(over) => println!(" - {over} over the limit"),
        None => println!(),
    }
}

/// Show character usage for one or all platforms.
fn cmd_count(text: &str, platform: Option<Platform>) -> Result<()> {
    let config = Config::load()?;
    let constraints = PlatformConstraints::from_limits(&config.platforms);

    println!("{} characters\n", char_count(text));

    let platforms = platform.map_or_else(|| Platform::ALL.to_vec(), |p| vec![p]);
    for platform in platforms {
        print_usage(text, platform, &constraints);
    }

    if let Some(platform) = platform {
        let hints = constraints.style_hints(platform.id());
        if !hints.is_empty() {
            println!("\nTips for {}:", platform.label());
            for hint in hints {
                println!("  - {hint}");
            }
        }
    }

    Ok(())
}

/// Handle instruction commands.
fn cmd_instructions(operation: InstructionsOperation) -> Result<()> {
    let instructions = InstructionStore::new(open_store()?);

    match operation {
        InstructionsOperation::Show { kind } => {
            let source = if instructions.user_override(kind).is_some() { "custom" } else { "default" };
            println!("{kind} instruction ({source}):\n");
            println!("{}", instructions.resolve(kind, None));
        }
        InstructionsOperation::Set { kind, text } => {
            if text.trim().is_empty() {
                anyhow::bail!("Instruction text cannot be empty. Use `reset` to restore the default.");
            }
            instructions.save(kind, &text)?;
            println!("Saved {kind} instruction");
        }
        InstructionsOperation::Reset { kind } => {
            instructions.reset_to_default(kind)?;
            println!("Reset {kind} instruction to default");
        }
    }

    Ok(())
}

/// Show or change configuration.
fn cmd_config(operation: ConfigOperation) -> Result<()> {
    match operation {
        ConfigOperation::Show => {
            let config = Config::load()?;
            let store = open_store()?;

            println!("{}", toml::to_string_pretty(&config)?);
            println!("[settings]");
            let model = get_or_warn(store.as_ref(), MODEL_KEY);
            println!("model = {}", model.as_deref().unwrap_or("(from config)"));
            let key = get_or_warn(store.as_ref(), API_KEY_KEY);
            println!("api_key = {}", key.as_deref().map_or_else(|| "(not set)".to_string(), mask_key));
            let platform = get_or_warn(store.as_ref(), DEFAULT_PLATFORM_KEY);
            println!("default_platform = {}", platform.as_deref().unwrap_or("(not set)"));
        }
        ConfigOperation::Path => {
            if let Some(path) = Config::config_dir() {
                println!("{}", path.display());
            }
        }
        ConfigOperation::SetModel { model } => {
            if model.trim().is_empty() {
                anyhow::bail!("Model cannot be empty");
            }
            open_store()?.set(MODEL_KEY, model.trim())?;
            println!("Model set to {}", model.trim());
        }
        ConfigOperation::SetKey { key } => {
            if key.trim().is_empty() {
                anyhow::bail!("API key cannot be empty");
            }
            open_store()?.set(API_KEY_KEY, key.trim())?;
            println!("API key saved");
        }
        ConfigOperation::ClearKey => {
            open_store()?.remove(API_KEY_KEY)?;
            println!("API key removed");
        }
        ConfigOperation::SetPlatform { platform } => {
            open_store()?.set(DEFAULT_PLATFORM_KEY, platform.id())?;
            println!("Default platform set to {}", platform.label());
        }
    }

    Ok(())
}

/// Keep the first three and last four characters of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 10 {
        return "****".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
}
