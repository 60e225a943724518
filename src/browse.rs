//! Interactive one-story-at-a-time browsing.
//!
//! Reads commands line by line and redraws the current story after each one.
//! Switching filters or refreshing fetches a new page and always restarts at
//! the first story.

use crate::api::ChatCompletion;
use crate::cursor::Cursor;
use crate::fetcher::{Page, SummarizingFetcher};
use crate::models::{Category, Country, HeadlineQuery};
use crate::news::NewsSource;
use crate::outputs::markdown::article_to_markdown;
use clap::ValueEnum;
use std::error::Error;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

const HELP: &str = "commands: n/next, p/prev, l/reload, r/refresh, country <us|gb|in|au>, \
category <general|business|technology|sports|science>, h/help, q/quit";

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    /// Refetch the current filters only.
    Reload,
    /// Clear every cached page, then refetch.
    Refresh,
    Country(Country),
    Category(Category),
    Help,
    Quit,
}

/// Parse a command line. Blank input means "next".
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or("n").to_lowercase();
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(format!("too many arguments in {line:?}"));
    }

    match (verb.as_str(), arg) {
        ("n" | "next", None) => Ok(Command::Next),
        ("p" | "prev" | "previous", None) => Ok(Command::Previous),
        ("l" | "reload", None) => Ok(Command::Reload),
        ("r" | "refresh", None) => Ok(Command::Refresh),
        ("h" | "help" | "?", None) => Ok(Command::Help),
        ("q" | "quit" | "exit", None) => Ok(Command::Quit),
        ("country", Some(c)) => Country::from_str(c, true).map(Command::Country),
        ("category", Some(c)) => Category::from_str(c, true).map(Command::Category),
        ("country" | "category", None) => Err(format!("{verb} needs a value")),
        _ => Err(format!("unknown command {line:?}")),
    }
}

/// Browsing state: the active filters, their page, and the position in it.
struct Browser<'f, N, C> {
    fetcher: &'f SummarizingFetcher<N, C>,
    query: HeadlineQuery,
    page: Page,
    cursor: Cursor,
}

impl<'f, N: NewsSource, C: ChatCompletion> Browser<'f, N, C> {
    async fn open(fetcher: &'f SummarizingFetcher<N, C>, query: HeadlineQuery) -> Self {
        let mut browser = Self {
            fetcher,
            query,
            page: Arc::new(Vec::new()),
            cursor: Cursor::Empty,
        };
        browser.reload().await;
        browser
    }

    /// Fetch the page for the current filters and restart at its top.
    async fn reload(&mut self) {
        self.page = match self.fetcher.fetch(&self.query).await {
            Ok(page) => page,
            Err(e) => {
                error!(error = %e, query = %self.query, "Could not load headlines");
                Arc::new(Vec::new())
            }
        };
        self.cursor = Cursor::reset(self.page.len());
    }

    async fn apply(&mut self, command: Command) {
        let len = self.page.len();
        match command {
            Command::Next => self.cursor = self.cursor.next(len),
            Command::Previous => self.cursor = self.cursor.previous(len),
            Command::Reload => {
                self.fetcher.invalidate(&self.query).await;
                self.reload().await;
            }
            Command::Refresh => {
                self.fetcher.clear_cache().await;
                self.reload().await;
            }
            Command::Country(country) => {
                self.query.country = country;
                self.reload().await;
            }
            Command::Category(category) => {
                self.query.category = category;
                self.reload().await;
            }
            Command::Help | Command::Quit => {}
        }
    }

    fn render(&self) -> String {
        match self.cursor.index().and_then(|i| self.page.get(i).map(|item| (i, item))) {
            Some((i, item)) => format!(
                "[{}/{}] {}\n{}",
                i + 1,
                self.page.len(),
                self.query,
                article_to_markdown(item)
            ),
            None => format!("No stories for {}.\n", self.query),
        }
    }
}

/// Run the browser over `input`, writing screens to `output`, until `quit`
/// or end of input.
pub async fn run<N, C, R, W>(
    fetcher: &SummarizingFetcher<N, C>,
    query: HeadlineQuery,
    input: R,
    output: &mut W,
) -> Result<(), Box<dyn Error>>
where
    N: NewsSource,
    C: ChatCompletion,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!(%query, "Starting interactive browser");
    let mut browser = Browser::open(fetcher, query).await;
    output.write_all(browser.render().as_bytes()).await?;
    output.write_all(format!("{HELP}\n> ").as_bytes()).await?;
    output.flush().await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let screen = match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => format!("{HELP}\n"),
            Ok(command) => {
                browser.apply(command).await;
                browser.render()
            }
            Err(e) => format!("{e}\n{HELP}\n"),
        };
        output.write_all(screen.as_bytes()).await?;
        output.write_all(b"> ").await?;
        output.flush().await?;
    }
    Ok(())
}
