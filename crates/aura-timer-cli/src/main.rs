use clap::{Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "aura-timer", version, about = "Aura Timer CLI")]
pub(crate) struct Cli {
    /// Verbose logging (honours RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the countdown until Ctrl-C
    Run(commands::run::RunArgs),
    /// Ask the duration service how long a text means
    Ask {
        /// Free text, e.g. "twenty minutes for review"
        text: String,
    },
    /// Render one frame and print its draw operations as JSON
    Render(commands::render::RenderArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Ask { text } => commands::ask::run(&text),
        Commands::Render(args) => commands::render::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
