//! storyflow binary: parse the subcommand, run its workflow, print the result.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use storyflow::Language;
use storyflow_cli::{
    exit_code, init_logging, outcome_lines, run_with_options, LlmBackend, Request, RunOptions,
};

#[derive(Parser, Debug)]
#[command(name = "storyflow")]
#[command(about = "Narrative workflows: create worlds and characters, then play")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Model backend: openai or mock (overrides LLM_BACKEND)
    #[arg(long, global = true, value_parser = parse_backend)]
    backend: Option<LlmBackend>,

    /// Model name (overrides OPENAI_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Sampling temperature 0-2
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Maximum node invocations per run (overrides RECURSION_LIMIT)
    #[arg(long, global = true)]
    recursion_limit: Option<usize>,

    /// Output language: en or fr (overrides LANGUAGE)
    #[arg(long, global = true, value_parser = parse_language)]
    language: Option<Language>,

    /// Per-call budget in USD used to size prompts (overrides LLM_BUDGET_USD)
    #[arg(long, global = true)]
    budget: Option<f64>,

    /// JSON file holding the document store between runs (overrides STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Print each node as it completes
    #[arg(long, global = true)]
    stream: bool,

    /// Debug logs and a config summary on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session in the terminal
    Play,
    /// Create a world, one piece of lore and a summary
    CreateWorld {
        name: String,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        directives: Option<String>,
    },
    /// Create a character in an existing world
    CreateCharacter { world_id: String, name: String },
    /// Join a world with an existing character (both by name)
    Join { world: String, character: String },
    /// Ask the game master for the next question
    NextPrompt { world_id: String, character_id: String },
    /// Record an answer and narrate what happens next
    Act {
        world_id: String,
        character_id: String,
        answer: String,
        #[arg(long)]
        question: Option<String>,
    },
    /// Summarise a world and its characters
    Synopsis { world_id: String },
}

fn parse_backend(s: &str) -> Result<LlmBackend, String> {
    s.parse().map_err(|e: storyflow_cli::ConfigError| e.to_string())
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse()
}

fn request(command: Command) -> Request {
    match command {
        Command::Play => Request::Interactive,
        Command::CreateWorld {
            name,
            genre,
            directives,
        } => Request::CreateWorld {
            world_name: name,
            genre,
            directives,
        },
        Command::CreateCharacter { world_id, name } => Request::CreateCharacter {
            world_id,
            character_name: name,
        },
        Command::Join { world, character } => Request::JoinGame {
            world_name: world,
            character_name: character,
        },
        Command::NextPrompt {
            world_id,
            character_id,
        } => Request::NextPrompt {
            world_id,
            character_id,
        },
        Command::Act {
            world_id,
            character_id,
            answer,
            question,
        } => Request::RegisterAction {
            world_id,
            character_id,
            question,
            answer,
        },
        Command::Synopsis { world_id } => Request::WorldSynopsis { world_id },
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = RunOptions {
        backend: args.backend,
        model: args.model,
        temperature: args.temperature,
        recursion_limit: args.recursion_limit,
        language: args.language,
        budget_usd: args.budget,
        store_path: args.store,
        stream: args.stream,
        verbose: args.verbose,
    };

    let request = request(args.command);
    let operation = request.operation();
    match run_with_options(request, &options).await {
        Ok(state) => {
            for line in outcome_lines(operation, &state) {
                println!("{}", line);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code(&e));
        }
    }
}
