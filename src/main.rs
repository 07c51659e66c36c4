use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

mod app;
mod tui;

use app::App;
use clinic_blog::models::{Article, ArticleQuery, Locale};
use clinic_blog::{ArticleDetail, ArticleList, Config, ContentResolver, Result};
use tui::{draw, handle_key_event};

#[derive(Debug, Parser)]
#[command(name = "clinic-blog", version, about = "Browse the clinic blog from the terminal")]
struct Cli {
    /// Content language (en or es)
    #[arg(long, global = true)]
    locale: Option<Locale>,

    /// CMS root URL, overriding the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print one page of articles
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "all")]
        category: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
        #[arg(long)]
        featured: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print a single article
    Show {
        slug: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the available categories
    Categories {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    config.validate()?;

    let resolver = Arc::new(ContentResolver::from_config(&config)?);

    match cli.command {
        Some(Command::List {
            search,
            category,
            page,
            page_size,
            featured,
            json,
        }) => {
            let query = ArticleQuery {
                search,
                category,
                page,
                page_size: page_size.unwrap_or(config.page_size),
                featured,
            };
            let mut list = ArticleList::new(resolver, query);
            let state = list.load().await;

            if json {
                println!("{}", serde_json::to_string_pretty(&state.articles)?);
                return Ok(());
            }
            if let Some(advisory) = &state.error {
                eprintln!("note: {advisory}");
            }
            for article in &state.articles {
                println!(
                    "{}  [{}]  {}  ({})",
                    article.publish_date.format("%Y-%m-%d"),
                    article.category,
                    article.title,
                    article.id
                );
            }
            println!(
                "page {} · {} of {} articles{}",
                state.page,
                state.articles.len(),
                state.total,
                if state.has_next_page { " · more available" } else { "" }
            );
            return Ok(());
        }

        Some(Command::Show { slug, json }) => {
            let mut detail = ArticleDetail::new(resolver);
            let state = detail.load(&slug).await;

            if let Some(advisory) = &state.error {
                eprintln!("note: {advisory}");
            }
            match &state.article {
                Some(article) if json => println!("{}", serde_json::to_string_pretty(article)?),
                Some(article) => print_article(article),
                None => eprintln!("No article found for {slug}"),
            }
            return Ok(());
        }

        Some(Command::Categories { json }) => {
            let categories = resolver.categories().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&categories.data)?);
            } else {
                for category in &categories.data {
                    println!("{} {:<14} {}", category.icon, category.key, category.label);
                }
            }
            return Ok(());
        }

        None => {}
    }

    let mut app = App::new(&config, resolver);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn print_article(article: &Article) {
    println!("{}", article.title);
    let mut byline = vec![article.publish_date.format("%Y-%m-%d").to_string()];
    if let Some(author) = &article.author {
        byline.push(author.clone());
    }
    byline.push(format!("{} min read", article.reading_time));
    println!("{}  [{}]", byline.join(" · "), article.category);
    println!();
    println!("{}", textwrap::fill(&tui::body_text(article, 80), 80));
    if !article.tags.is_empty() {
        println!("\n#{}", article.tags.join(" #"));
    }
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        // Apply finished content requests
        app.poll();

        // Poll for events with timeout so results land without a keypress
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) =
                        handle_key_event(key, app.search_input_active, app.show_help)
                    {
                        if app.handle_action(action) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
