//! Mindmapper - terminal UI for exploring AI-generated mind maps
//!
//! Run with `mindmapper` or `mindmapper --help` for usage.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mindmapper::{
    config::Config,
    generation::HttpGenerationClient,
    session::SessionController,
    tree::Node,
    tui::App,
    APP_NAME, VERSION,
};

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(version = VERSION)]
#[command(about = "A terminal UI for iteratively exploring AI-generated mind maps")]
#[command(long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive TUI (default)
    Tui,

    /// Generate a single map and print it as a text tree
    Ask {
        /// The prompt to generate a map for
        prompt: String,
    },

    /// Show configuration
    Config {
        /// Initialize config file with defaults
        #[arg(long)]
        init: bool,
    },
}

fn setup_logging(config: &Config, debug: bool, to_file: bool) -> Result<()> {
    let filter = if debug || config.debug {
        EnvFilter::new("debug")
    } else {
        // Use info level for our crate, warn for dependencies
        EnvFilter::new("info")
            .add_directive("reqwest=warn".parse()?)
            .add_directive("tokio=warn".parse()?)
    };

    if to_file {
        // Log to file when running TUI (so logs don't interfere with display)
        let log_path = config.tui_log_file()?;
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(file).with_target(false))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false))
            .with(filter)
            .init();
    }

    Ok(())
}

/// Print a node and its subtree as an indented text tree
fn print_node(node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match &node.description {
        Some(description) => println!("{indent}{} - {}", node.label, description),
        None => println!("{indent}{}", node.label),
    }
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install color-eyre error hooks
    color_eyre::install()?;

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config, using defaults: {}", e);
        Config::default()
    });

    // Ensure required directories exist
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Failed to create directories: {}", e);
    }

    match cli.command {
        None | Some(Commands::Tui) => {
            // Setup logging to file for TUI mode
            setup_logging(&config, cli.debug, true)?;

            info!("Starting Mindmapper TUI v{}", VERSION);

            let mut app = App::new(config)?;
            app.run().await?;
        }

        Some(Commands::Ask { prompt }) => {
            setup_logging(&config, cli.debug, false)?;

            let client = HttpGenerationClient::new(&config)?;
            let (controller, _events) = SessionController::new(client);

            controller.submit(&prompt).await?;

            let view = controller.view().await;
            if let Some(tree) = view.tree {
                print_node(&tree.root, 0);
                println!();
                println!("{} nodes", tree.node_count());
            }
        }

        Some(Commands::Config { init }) => {
            setup_logging(&config, cli.debug, false)?;

            if init {
                config.save()?;
                println!(
                    "Configuration initialized at {:?}",
                    Config::config_file_path()?
                );
            } else {
                println!("Configuration:");
                println!("{}", toml::to_string_pretty(&config)?);
                println!("\nConfig file: {:?}", Config::config_file_path()?);
                println!("Data dir: {:?}", Config::data_dir()?);
            }
        }
    }

    Ok(())
}
