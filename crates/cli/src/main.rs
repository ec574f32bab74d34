// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use museu_config::ConfigManager;
use std::path::PathBuf;

mod commands;

fn id_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).required(true).value_name("ID").help(help)
}

fn password_arg() -> Arg {
    Arg::new("password")
        .short('p')
        .long("password")
        .value_name("PASSWORD")
        .help("Password (prompted for when omitted)")
}

fn build_cli() -> Command {
    Command::new("museu")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Museu Literário Team")
        .about("Browse the Museu Literário catalog and manage your reading list")
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml and the session file")
                .global(true),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in and store the session")
                .arg(Arg::new("email").required(true).value_name("EMAIL"))
                .arg(password_arg()),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account")
                .arg(Arg::new("name").required(true).value_name("NAME"))
                .arg(Arg::new("email").required(true).value_name("EMAIL"))
                .arg(password_arg()),
        )
        .subcommand(Command::new("logout").about("Forget the stored session"))
        .subcommand(Command::new("whoami").about("Show who is signed in"))
        .subcommand(
            Command::new("book")
                .about("Show a book and your status for it")
                .arg(id_arg("id", "Book ID")),
        )
        .subcommand(Command::new("genres").about("List genres"))
        .subcommand(
            Command::new("by-genre")
                .about("List books of a genre")
                .arg(Arg::new("genre").required(true).value_name("GENRE")),
        )
        .subcommand(Command::new("authors").about("List authors"))
        .subcommand(
            Command::new("author")
                .about("Show an author and their books")
                .arg(id_arg("id", "Author ID")),
        )
        .subcommand(Command::new("ranking").about("Show the most favorited books"))
        .subcommand(
            Command::new("favorites")
                .about("List your favorites")
                .arg(
                    Arg::new("status")
                        .short('s')
                        .long("status")
                        .value_name("STATUS")
                        .help("Only books with this status (want, reading, finished)"),
                ),
        )
        .subcommand(
            Command::new("favorite")
                .about("Add a book to favorites or remove it")
                .arg(id_arg("id", "Book ID"))
                .arg(
                    Arg::new("remove")
                        .short('r')
                        .long("remove")
                        .help("Remove from favorites")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("status")
                .about("Set the reading status of a book")
                .arg(id_arg("id", "Book ID"))
                .arg(
                    Arg::new("status")
                        .required(true)
                        .value_name("STATUS")
                        .help("want, reading, finished or clear"),
                ),
        )
        .subcommand(
            Command::new("progress")
                .about("Record reading progress")
                .arg(id_arg("id", "Book ID"))
                .arg(
                    Arg::new("percent")
                        .required(true)
                        .value_name("PERCENT")
                        .value_parser(clap::value_parser!(u8)),
                ),
        )
        .subcommand(
            Command::new("follow")
                .about("Follow an author or stop following")
                .arg(id_arg("id", "Author ID"))
                .arg(
                    Arg::new("remove")
                        .short('r')
                        .long("remove")
                        .help("Stop following")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Write the default config if missing"))
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("path").about("Print the config file location"))
                .subcommand(Command::new("reset").about("Overwrite the config with defaults")),
        )
}

fn config_manager(dir: Option<&String>) -> Result<ConfigManager> {
    let manager = match dir {
        Some(dir) => ConfigManager::with_directory(PathBuf::from(dir)),
        None => ConfigManager::new(),
    };
    manager.context("Failed to locate the config directory")
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let manager = config_manager(matches.get_one::<String>("config-dir"))?;
    let config = manager
        .load_with_env_overrides()
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    env_logger::Builder::new()
        .filter_level(config.app.log_level.as_filter())
        .parse_default_env()
        .init();
    console::set_colors_enabled(config.app.color_output);
    log::debug!("Using config at {}", manager.config_path().display());

    if let Some(("config", sub_matches)) = matches.subcommand() {
        return commands::config_command(&manager, &config, sub_matches);
    }

    let app = commands::App::open(&manager, config)?;

    match matches.subcommand() {
        Some(("login", sub_matches)) => commands::login(&app, sub_matches).await,
        Some(("register", sub_matches)) => commands::register(&app, sub_matches).await,
        Some(("logout", _)) => commands::logout(&app),
        Some(("whoami", _)) => commands::whoami(&app),
        Some(("book", sub_matches)) => commands::show_book(&app, sub_matches).await,
        Some(("genres", _)) => commands::list_genres(&app).await,
        Some(("by-genre", sub_matches)) => commands::books_by_genre(&app, sub_matches).await,
        Some(("authors", _)) => commands::list_authors(&app).await,
        Some(("author", sub_matches)) => commands::show_author(&app, sub_matches).await,
        Some(("ranking", _)) => commands::show_ranking(&app).await,
        Some(("favorites", sub_matches)) => commands::list_favorites(&app, sub_matches).await,
        Some(("favorite", sub_matches)) => commands::toggle_favorite(&app, sub_matches).await,
        Some(("status", sub_matches)) => commands::set_status(&app, sub_matches).await,
        Some(("progress", sub_matches)) => commands::set_progress(&app, sub_matches).await,
        Some(("follow", sub_matches)) => commands::follow_author(&app, sub_matches).await,
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
