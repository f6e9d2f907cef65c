use std::env;
use std::io::{self, Read};

use textback_core::config::{credential_from, Config, Settings};
use textback_core::corpus::{CorpusLoader, LoadOutcome};
use textback_core::traits::VectorIndex;
use textback_provider::{get_default_chat, get_default_embedder};
use textback_reply::{ChatSession, RandomDelay, ReplyGenerator, ThreadReplier};
use textback_vector::LanceCollection;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Chat,
    Ingest,
    Query(String),
    Reply,
}

const USAGE: &str = "[ingest | query \"<text>\" | reply < request.json]";

/// Parse a full argv. The `Err` carries the usage message to print.
fn parse_command<I: IntoIterator<Item = String>>(argv: I) -> Result<Command, String> {
    let mut argv = argv.into_iter();
    let prog = argv.next().unwrap_or_else(|| "textback".to_string());
    let args: Vec<String> = argv.collect();
    match args.first().map(String::as_str) {
        None => Ok(Command::Chat),
        Some("ingest") => Ok(Command::Ingest),
        Some("reply") => Ok(Command::Reply),
        Some("query") => match args.get(1) {
            Some(text) => Ok(Command::Query(text.clone())),
            None => Err(format!("Usage: {} query \"<text>\"", prog)),
        },
        Some(other) => Err(format!("Unknown command: {}\nUsage: {} {}", other, prog, USAGE)),
    }
}

fn parse_args() -> Command {
    parse_command(env::args()).unwrap_or_else(|usage| {
        eprintln!("{}", usage);
        std::process::exit(1);
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("textback=info,lance=warn,lance_datafusion=error,datafusion=error,warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Opened once per process and shared by every command.
struct AppContext {
    settings: Settings,
    api_key: Option<String>,
    collection: LanceCollection,
}

impl AppContext {
    fn build(config: &Config) -> anyhow::Result<Self> {
        let settings = config.settings()?;
        let api_key = config.api_key().ok();
        let embedder = get_default_embedder(&settings, api_key.as_deref())?;
        let collection = LanceCollection::open(&settings.index_dir(), &settings.data.collection, embedder)?
            .with_batch_size(settings.embedding.batch_size);
        tracing::info!(
            env = config.env_name(),
            collection = collection.name(),
            embedder = collection.embedder_id(),
            "index opened"
        );
        Ok(Self { settings, api_key, collection })
    }

    fn ensure_loaded(&self) -> anyhow::Result<LoadOutcome> {
        let loader = CorpusLoader::new(self.settings.data.window);
        Ok(loader.load_if_empty(&self.collection, &self.settings.dataset_path())?)
    }
}

fn run_chat(ctx: &AppContext) -> anyhow::Result<()> {
    let key = credential_from(ctx.api_key.clone())?;
    let chat = get_default_chat(&ctx.settings, &key)?;
    let generator = ReplyGenerator::from_settings(&ctx.collection, &chat, &ctx.settings);
    let session_settings = ctx.settings.session.clone();
    let delay = RandomDelay::new(session_settings.min_delay_secs, session_settings.delay_spread);
    let mut session = ChatSession::new(generator, Box::new(delay), session_settings);

    let stdin = io::stdin();
    let stats = session.run(stdin.lock(), io::stdout(), io::stderr())?;
    tracing::info!(turns = stats.turns, failed = stats.failed, double_texts = stats.double_texts, "session ended");
    Ok(())
}

/// One JSON request on stdin, one JSON response on stdout.
fn run_reply(ctx: &AppContext) -> anyhow::Result<()> {
    let key = credential_from(ctx.api_key.clone())?;
    let chat = get_default_chat(&ctx.settings, &key)?.with_max_tokens(Some(ctx.settings.thread.max_tokens));
    let replier = ThreadReplier::new(&ctx.collection, &chat, ctx.settings.thread.clone());

    let mut body = String::new();
    io::stdin().read_to_string(&mut body)?;
    let response = replier.respond_json(&body);
    println!("{}", serde_json::to_string(&response)?);
    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_query(ctx: &AppContext, text: &str) -> anyhow::Result<()> {
    let result = ctx.collection.query(text, ctx.settings.retrieval.k)?;
    if result.is_empty() {
        println!("No matches.");
        return Ok(());
    }
    for (rank, hit) in result.hits.iter().enumerate() {
        println!("#{} {} (distance {:.4})", rank + 1, hit.id, hit.distance);
        println!("{}", hit.document);
        println!();
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let command = parse_args();
    let ctx = AppContext::build(&config)?;

    match ctx.ensure_loaded()? {
        LoadOutcome::Skipped { existing } => tracing::info!(existing, "using existing index"),
        LoadOutcome::Loaded { inserted } => tracing::info!(inserted, "corpus loaded"),
    }

    match command {
        Command::Ingest => {
            println!("Index ready: {} entries in '{}'", ctx.collection.count()?, ctx.collection.name());
            Ok(())
        }
        Command::Query(text) => run_query(&ctx, &text),
        Command::Chat => run_chat(&ctx),
        Command::Reply => run_reply(&ctx),
    }
}
