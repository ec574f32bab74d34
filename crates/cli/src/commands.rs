// FILE: crates/cli/src/commands.rs

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use console::style;
use museu_config::{Config, ConfigManager};
use museu_core::{AuthorId, Book, BookId, ReadingStatus};
use museu_network::{ApiClient, ClientConfig, FileSessionStore, Session};
use museu_resilience::RetryPolicy;
use museu_sync_engine::{
    BookCard, BookDetail, ControlState, ErrorKind, FavoriteIcon, FavoritesList, MutationOutcome,
    StatusChoice, StatusStore, SyncConfig, SyncEngine, SyncError,
};
use std::io::Write;
use std::sync::Arc;

/// Everything a command needs: settings, the backend client and the engine
pub struct App {
    pub config: Config,
    pub client: ApiClient,
    pub engine: Arc<SyncEngine>,
}

impl App {
    /// Wires the client to the session file and the engine to the client
    pub fn open(manager: &ConfigManager, config: Config) -> Result<Self> {
        let sessions = Arc::new(FileSessionStore::new(manager.session_path(&config)));
        let client_config = client_config(&config);
        let sync = SyncConfig {
            mutation_timeout: config.sync.mutation_timeout(),
            read_timeout: client_config.read_budget(),
        };
        let client = ApiClient::new(client_config, sessions)
            .context("Invalid backend configuration")?
            .on_session_ended(Arc::new(|session: &Session| {
                eprintln!(
                    "{} Session for {} has ended. Run `museu login` to sign in again.",
                    style("!").yellow().bold(),
                    session.display_name()
                );
            }));

        let engine = SyncEngine::new(StatusStore::new(), Arc::new(client.clone()), sync)
            .with_reporter(Arc::new(report_failure));

        Ok(Self {
            config,
            client,
            engine: Arc::new(engine),
        })
    }

    fn require_session(&self) -> Result<Session> {
        match self.client.current_session()? {
            Some(session) => Ok(session),
            None => bail!("Not signed in. Run `museu login <email>` first."),
        }
    }

    /// Loads the reader's favorites into the store before a mutation
    async fn sync_favorites(&self) -> Result<()> {
        if self.config.sync.hydrate_on_start {
            self.engine
                .refresh_favorites()
                .await
                .context("Failed to load your favorites")?;
        }
        Ok(())
    }
}

fn client_config(config: &Config) -> ClientConfig {
    ClientConfig {
        base_url: config.api.base_url.clone(),
        timeout: config.api.request_timeout(),
        user_agent: config.api.user_agent.clone(),
        read_retry: RetryPolicy::new(config.api.max_read_attempts),
    }
}

/// Adds a hint for failures the reader can act on
fn report_failure(book: Option<&BookId>, error: &SyncError) {
    let hint = match error.kind() {
        ErrorKind::Network => "Nothing was changed. Check your connection and try again.",
        ErrorKind::Auth => "Run `museu login` to sign in again.",
        _ => return,
    };
    match book {
        Some(book) => eprintln!("{} Book {}: {}", style("!").yellow().bold(), book, hint),
        None => eprintln!("{} {}", style("!").yellow().bold(), hint),
    }
}

/// Sign in
pub async fn login(app: &App, matches: &ArgMatches) -> Result<()> {
    let email = required(matches, "email")?;
    let password = password_or_prompt(matches)?;

    let session = app
        .client
        .login(email, &password)
        .await
        .context("Login failed")?;

    println!(
        "{} Signed in as {}",
        style("✓").green().bold(),
        style(session.display_name()).bold()
    );
    Ok(())
}

/// Create an account
pub async fn register(app: &App, matches: &ArgMatches) -> Result<()> {
    let name = required(matches, "name")?;
    let email = required(matches, "email")?;
    let password = password_or_prompt(matches)?;

    match app
        .client
        .register(name, email, &password)
        .await
        .context("Registration failed")?
    {
        Some(session) => println!(
            "{} Account created, signed in as {}",
            style("✓").green().bold(),
            session.display_name()
        ),
        None => println!(
            "{} Account created. Run `museu login {}` to sign in.",
            style("✓").green().bold(),
            email
        ),
    }
    Ok(())
}

/// Forget the stored session
pub fn logout(app: &App) -> Result<()> {
    app.client.logout().context("Failed to clear the session")?;
    println!("{} Signed out", style("✓").green().bold());
    Ok(())
}

pub fn whoami(app: &App) -> Result<()> {
    match app.client.current_session()? {
        Some(session) => {
            println!("Signed in as {}", style(session.display_name()).bold());
            if let Some(user) = &session.user {
                println!("  Email: {}", user.email);
            }
            println!("  Since: {}", session.created_at.format("%Y-%m-%d %H:%M"));
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

/// Show a book, plus the reader's controls when signed in
pub async fn show_book(app: &App, matches: &ArgMatches) -> Result<()> {
    let id = BookId::from(required(matches, "id")?);
    let book = app
        .client
        .book(&id)
        .await
        .with_context(|| format!("Failed to fetch book {}", id))?;

    println!("\n{}", style(&book.title).bold().cyan());
    println!("{}", "=".repeat(80));
    println!("ID: {}", book.id);
    if let Some(author) = &book.author {
        println!("Author: {}", author);
    }
    if let Some(genre) = &book.genre {
        println!("Genre: {}", genre);
    }
    if let Some(year) = book.published_year {
        println!("Published: {}", year);
    }
    if let Some(pages) = book.page_count {
        println!("Pages: {}", pages);
    }
    if let Some(rating) = book.average_rating {
        println!("Rating: {}", format_rating(rating));
    }
    if let Some(synopsis) = &book.synopsis {
        println!("\n{}", synopsis);
    }

    if app.client.current_session()?.is_some() {
        app.sync_favorites().await?;
        let detail = BookDetail::new(app.engine.clone(), book)?;
        println!("\n{}", controls_line(&detail.controls()));
    }
    Ok(())
}

pub async fn list_genres(app: &App) -> Result<()> {
    let genres = app.client.genres().await.context("Failed to list genres")?;

    println!("\n{} Genres", style(genres.len()).bold().cyan());
    println!("{}", "=".repeat(80));
    for genre in genres {
        match genre.book_count {
            Some(count) => println!("  {} ({})", genre.name, count),
            None => println!("  {}", genre.name),
        }
    }
    Ok(())
}

pub async fn books_by_genre(app: &App, matches: &ArgMatches) -> Result<()> {
    let genre = required(matches, "genre")?;
    let books = app
        .client
        .books_by_genre(genre)
        .await
        .with_context(|| format!("Failed to list books of genre '{}'", genre))?;

    if books.is_empty() {
        println!("No books found for genre '{}'", genre);
        return Ok(());
    }

    println!("\n{} Books in '{}'", style(books.len()).bold().cyan(), genre);
    println!("{}", "=".repeat(80));
    for book in &books {
        print_book_summary(book);
    }
    Ok(())
}

pub async fn list_authors(app: &App) -> Result<()> {
    let authors = app.client.authors().await.context("Failed to list authors")?;

    println!("\n{} Authors", style(authors.len()).bold().cyan());
    println!("{}", "=".repeat(80));
    for author in authors {
        print!("  {} {}", style(format!("[{}]", author.id)).dim(), author.name);
        if let Some(nationality) = &author.nationality {
            print!(" ({})", nationality);
        }
        println!();
    }
    Ok(())
}

pub async fn show_author(app: &App, matches: &ArgMatches) -> Result<()> {
    let id = AuthorId::from(required(matches, "id")?);
    let author = app
        .client
        .author(&id)
        .await
        .with_context(|| format!("Failed to fetch author {}", id))?;

    println!("\n{}", style(&author.name).bold().cyan());
    println!("{}", "=".repeat(80));
    if let Some(nationality) = &author.nationality {
        println!("Nationality: {}", nationality);
    }
    if let Some(followers) = author.follower_count {
        println!("Followers: {}", followers);
    }
    if author.followed == Some(true) {
        println!("{}", style("You follow this author").green());
    }
    if let Some(biography) = &author.biography {
        println!("\n{}", biography);
    }
    if !author.books.is_empty() {
        println!("\nBooks:");
        for book in &author.books {
            print_book_summary(book);
        }
    }
    Ok(())
}

pub async fn show_ranking(app: &App) -> Result<()> {
    let ranking = app.client.ranking().await.context("Failed to load ranking")?;

    println!("\n{}", style("Most favorited books").bold().cyan());
    println!("{}", "=".repeat(80));
    for entry in ranking {
        print!(
            "{:>3}. {}",
            entry.position,
            truncate(&entry.book.display_title(), 60)
        );
        if let Some(count) = entry.favorite_count {
            print!("  {}", style(format!("♥ {}", count)).red());
        }
        println!();
    }
    Ok(())
}

/// List favorites, optionally filtered by status
pub async fn list_favorites(app: &App, matches: &ArgMatches) -> Result<()> {
    app.require_session()?;
    let filter = parse_filter(matches.get_one::<String>("status").map(String::as_str))?;

    let mut list = FavoritesList::new(app.engine.clone());
    list.load().await.context("Failed to load your favorites")?;
    list.set_filter(filter);

    let rows = list.rows();
    if rows.is_empty() {
        println!("No favorites yet. Use `museu favorite <id>` to add one.");
        return Ok(());
    }

    println!("\n{} Favorites", style(rows.len()).bold().cyan());
    println!("{}", "=".repeat(80));
    for row in rows {
        println!("\n{}", style(truncate(&row.title, 70)).bold());
        println!("  ID: {} | {}", row.book_id, controls_line(&row.controls));
    }

    let summary = list.summary();
    println!(
        "\n{} total | {} want to read | {} reading | {} finished",
        summary.total, summary.want_to_read, summary.reading, summary.finished
    );
    Ok(())
}

/// Add a book to favorites or remove it
pub async fn toggle_favorite(app: &App, matches: &ArgMatches) -> Result<()> {
    app.require_session()?;
    let id = BookId::from(required(matches, "id")?);
    let remove = matches.get_flag("remove");

    app.sync_favorites().await?;
    let card = BookCard::for_id(app.engine.clone(), id.clone())?;

    if card.entry().is_favorite != remove {
        let state = if remove { "not" } else { "already" };
        println!("Book {} is {} in your favorites", id, state);
        return Ok(());
    }

    let outcome = card
        .click_favorite()
        .await
        .with_context(|| format!("Failed to update favorite for book {}", id))?;
    print_outcome(&outcome, &card.controls());
    Ok(())
}

/// Set or clear the reading status
pub async fn set_status(app: &App, matches: &ArgMatches) -> Result<()> {
    app.require_session()?;
    let id = BookId::from(required(matches, "id")?);
    let choice = parse_choice(required(matches, "status")?)?;

    app.sync_favorites().await?;
    let mut card = BookCard::for_id(app.engine.clone(), id.clone())?;
    let outcome = card
        .choose(choice)
        .await
        .with_context(|| format!("Failed to set status for book {}", id))?;
    print_outcome(&outcome, &card.controls());
    Ok(())
}

/// Record reading progress
pub async fn set_progress(app: &App, matches: &ArgMatches) -> Result<()> {
    app.require_session()?;
    let id = BookId::from(required(matches, "id")?);
    let percent = matches
        .get_one::<u8>("percent")
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Percent is required"))?;

    let book = app
        .client
        .book(&id)
        .await
        .with_context(|| format!("Failed to fetch book {}", id))?;
    app.sync_favorites().await?;

    let detail = BookDetail::new(app.engine.clone(), book)?;
    let outcome = detail
        .set_progress(percent)
        .await
        .with_context(|| format!("Failed to record progress for book {}", id))?;
    print_outcome(&outcome, &detail.controls());
    Ok(())
}

/// Follow or unfollow an author
pub async fn follow_author(app: &App, matches: &ArgMatches) -> Result<()> {
    app.require_session()?;
    let id = AuthorId::from(required(matches, "id")?);

    if matches.get_flag("remove") {
        app.client
            .unfollow_author(&id)
            .await
            .with_context(|| format!("Failed to unfollow author {}", id))?;
        println!("{} Stopped following author {}", style("✓").green().bold(), id);
    } else {
        app.client
            .follow_author(&id)
            .await
            .with_context(|| format!("Failed to follow author {}", id))?;
        println!("{} Following author {}", style("✓").green().bold(), id);
    }
    Ok(())
}

/// `config init|show|path|reset`
pub fn config_command(manager: &ConfigManager, config: &Config, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("init", _)) => {
            if manager.initialize().context("Failed to write config")? {
                println!(
                    "{} Config written to {}",
                    style("✓").green().bold(),
                    manager.config_path().display()
                );
            } else {
                println!("Config already exists at {}", manager.config_path().display());
            }
        }
        Some(("show", _)) => {
            let rendered =
                toml::to_string_pretty(config).context("Failed to render configuration")?;
            println!("{}", rendered);
        }
        Some(("path", _)) => println!("{}", manager.config_path().display()),
        Some(("reset", _)) => {
            manager.reset().context("Failed to reset config")?;
            println!("{} Config reset to defaults", style("✓").green().bold());
        }
        _ => bail!("Unknown config command"),
    }
    Ok(())
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("{} is required", name))
}

fn password_or_prompt(matches: &ArgMatches) -> Result<String> {
    if let Some(password) = matches.get_one::<String>("password") {
        return Ok(password.clone());
    }

    print!("Password: ");
    std::io::stdout().flush().context("Failed to write prompt")?;
    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read password")?;

    let password = input.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password is required");
    }
    Ok(password)
}

/// Dropdown choice from a command-line word
pub(crate) fn parse_choice(value: &str) -> Result<StatusChoice> {
    match value.trim().to_ascii_lowercase().as_str() {
        "clear" | "none" => Ok(StatusChoice::Clear),
        _ => value
            .parse::<ReadingStatus>()
            .map(StatusChoice::Status)
            .context("Expected want, reading, finished or clear"),
    }
}

pub(crate) fn parse_filter(value: Option<&str>) -> Result<Option<ReadingStatus>> {
    value
        .map(|v| {
            v.parse::<ReadingStatus>()
                .context("Expected want, reading or finished")
        })
        .transpose()
}

/// One-line rendering of the favorite toggle and status dropdown
pub(crate) fn controls_line(controls: &ControlState) -> String {
    let heart = match controls.favorite_icon {
        FavoriteIcon::Filled => style("♥ Favorite").red().to_string(),
        FavoriteIcon::Outline => style("♡ Not a favorite").dim().to_string(),
    };
    let mut line = format!("{} | {}", heart, controls.status_label);
    if controls.busy {
        line.push_str(" (saving...)");
    }
    line
}

fn print_outcome(outcome: &MutationOutcome, controls: &ControlState) {
    match outcome {
        MutationOutcome::Confirmed(_) => {
            println!("{} {}", style("✓").green().bold(), controls_line(controls));
        }
        MutationOutcome::Rejected => println!(
            "{} Another change for book {} is still in progress",
            style("!").yellow().bold(),
            controls.book_id
        ),
    }
}

fn print_book_summary(book: &Book) {
    println!("\n{}", style(&book.title).bold());
    if let Some(author) = &book.author {
        println!("  by {}", author);
    }
    print!("  ID: {}", book.id);
    if let Some(year) = book.published_year {
        print!(" | {}", year);
    }
    if let Some(rating) = book.average_rating {
        print!(" | {}", format_rating(rating));
    }
    println!();
}

fn format_rating(rating: f32) -> String {
    let stars = rating.clamp(0.0, 5.0).round() as usize;
    format!("{}{} {:.1}", "★".repeat(stars), "☆".repeat(5 - stars), rating)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
