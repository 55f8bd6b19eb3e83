use crate::{
    config::Settings,
    server::{self, AppState},
    tools::{unsplash::DEFAULT_PER_PAGE, FunctionFactory, Tool, UnsplashTool},
    types::ParseRequestResponse,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn command() -> Command {
    Command::new("trip-agent")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Natural-language trip request parser backed by an LLM")
        .subcommand_required(false)
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .global(true)
                .help("Model id to request (or set LLM_MODEL_ID)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .global(true)
                .help("LLM API key (or set LLM_API_KEY / OPENAI_API_KEY)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .global(true)
                .help("OpenAI-compatible base URL (or set LLM_BASE_URL / OPENAI_BASE_URL)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .global(true)
                .help("Give up on the LLM call after this many seconds (default: wait)"),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the /request HTTP API")
                .arg(
                    Arg::new("host")
                        .long("host")
                        .value_name("HOST")
                        .help("Interface to bind (or set HOST)"),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help("Port to bind (or set PORT)"),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse one request and print the API response body")
                .arg(
                    Arg::new("text")
                        .help("The trip request in natural language")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("photo")
                .about("Look up a photo URL with the image search tool")
                .arg(
                    Arg::new("query")
                        .help("Place, dish or hotel to search for")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("list")
                        .short('l')
                        .long("list")
                        .action(ArgAction::SetTrue)
                        .help("Print every hit as JSON instead of the first URL"),
                )
                .arg(
                    Arg::new("per-page")
                        .short('n')
                        .long("per-page")
                        .value_name("COUNT")
                        .requires("list")
                        .help("Number of hits to list (default: 5)"),
                ),
        )
}

/// Apply command-line overrides on top of environment settings
fn apply_overrides(
    mut settings: Settings,
    matches: &ArgMatches,
) -> Result<Settings, Box<dyn std::error::Error>> {
    if let Some(model) = matches.get_one::<String>("model") {
        settings.llm_model = model.clone();
    }
    if let Some(api_key) = matches.get_one::<String>("api-key") {
        settings.llm_api_key = Some(api_key.clone());
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        settings.llm_base_url = base_url.clone();
    }
    if let Some(timeout) = matches.get_one::<String>("timeout") {
        settings.llm_timeout = Some(Duration::from_secs(timeout.parse()?));
    }

    if let Some(("serve", serve)) = matches.subcommand() {
        if let Some(host) = serve.get_one::<String>("host") {
            settings.host = host.clone();
        }
        if let Some(port) = serve.get_one::<String>("port") {
            settings.port = port.parse()?;
        }
    }

    Ok(settings)
}

fn photo_page_size(matches: &ArgMatches) -> Result<u32, Box<dyn std::error::Error>> {
    match matches.get_one::<String>("per-page") {
        Some(count) => Ok(count.parse()?),
        None => Ok(DEFAULT_PER_PAGE),
    }
}

/// CLI entry point for the trip-agent binary
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let matches = command().get_matches();
    let settings = apply_overrides(Settings::from_env()?, &matches)?;

    match matches.subcommand() {
        Some(("parse", sub)) => {
            let text = sub
                .get_one::<String>("text")
                .ok_or("missing request text")?;
            let state = AppState::from_settings(&settings);
            let parser = state.parser()?;
            let outcome = parser.parse(text).await;
            let response = ParseRequestResponse::from_outcome(outcome)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Some(("photo", sub)) => {
            let query = sub.get_one::<String>("query").ok_or("missing query")?;
            let access_key = settings
                .unsplash_access_key
                .clone()
                .ok_or("UNSPLASH_ACCESS_KEY environment variable must be set")?;

            let tool = UnsplashTool::new(access_key);
            if sub.get_flag("list") {
                let per_page = photo_page_size(sub)?;
                let photos = tool.search_photos(query, per_page).await;
                println!("{}", serde_json::to_string_pretty(&photos)?);
                return Ok(());
            }

            let mut factory = FunctionFactory::new();
            let tool_name = tool.name();
            factory.register_tool(tool);

            let result = factory
                .execute_function(tool_name, serde_json::json!({ "query": query }))
                .await?;
            match result.as_str() {
                Some(text) => println!("{}", text),
                None => println!("{}", result),
            }
        }
        _ => {
            let address = settings.bind_address();
            let state = AppState::from_settings(&settings);
            info!("Using model: {}", settings.llm_model);
            info!("Base URL: {}", settings.llm_base_url);
            if let Err(err) = server::serve(&address, state).await {
                error!("Server stopped: {}", err);
                return Err(err.into());
            }
        }
    }

    Ok(())
}
