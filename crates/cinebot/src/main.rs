//! A terminal host for the cinema chat widget.

#[macro_use]
extern crate tracing;

use std::collections::HashSet;
use std::env;
use std::io::Write as _;
use std::time::Duration;

use cinebot::WidgetBuilder;
use cinebot::core::message::{Message, MessageId, Sender};
use cinebot::core::navigation::NavigationState;
use cinebot::core::{DisplayTimeZone, WidgetSnapshot};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

enum HostEvent {
    Focus,
    Navigate(String, NavigationState),
}

const BAR_CHAR: &str = "▎";

const HELP: &str = "\
/new           start a new conversation
/book          continue to seat selection for the latest suggestion
/login TOKEN   sign in
/logout        sign out
/quit          leave";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let mut builder = match env::var("CINEBOT_BASE_URL") {
        Ok(base_url) => WidgetBuilder::with_base_url(base_url),
        Err(_) => WidgetBuilder::new(),
    };
    if let Ok(token) = env::var("CINEBOT_TOKEN") {
        builder = builder.with_token(token);
    }
    let widget = builder
        .with_time_zone(DisplayTimeZone::Local)
        .on_focus_input({
            let event_tx = event_tx.clone();
            move || {
                event_tx.send(HostEvent::Focus).ok();
            }
        })
        .with_navigator({
            let event_tx = event_tx.clone();
            move |route: &str, state: &NavigationState| {
                event_tx
                    .send(HostEvent::Navigate(route.to_owned(), state.clone()))
                    .ok();
            }
        })
        .build();

    println!("{}", "Type /help for commands.".dimmed());
    let mut printed = HashSet::new();

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    'outer: loop {
        print_new_messages(&widget.snapshot().await, &mut printed);

        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();

        match line.split_once(' ').unwrap_or((line, "")) {
            ("", _) => continue,
            ("/quit", _) => break,
            ("/help", _) => {
                println!("{HELP}");
                continue;
            }
            ("/new", _) => {
                widget.reset();
                printed.clear();
                continue;
            }
            ("/login", token) if !token.trim().is_empty() => {
                widget.sign_in(token.trim());
                // Let the stored conversation arrive before prompting.
                sleep(Duration::from_millis(300)).await;
                continue;
            }
            ("/logout", _) => {
                widget.sign_out();
                printed.clear();
                continue;
            }
            ("/book", _) => {
                let snapshot = widget.snapshot().await;
                let Some(suggestion) = latest_suggestion(&snapshot) else {
                    println!("{}", "Nothing to book yet.".yellow());
                    continue;
                };
                let result = widget.navigate_to_booking(&suggestion).await;
                if let Err(err) = result {
                    println!("{}", format!("Cannot book: {err}").red());
                    continue;
                }
                // The navigator has posted its event by now.
                while let Ok(event) = event_rx.try_recv() {
                    if let HostEvent::Navigate(route, state) = event {
                        print_navigation(&route, &state);
                    }
                }
                continue;
            }
            _ if line.starts_with('/') => {
                println!("{}", "Unknown command, try /help.".yellow());
                continue;
            }
            _ => {}
        }

        widget.send_message(line);

        let mut progress_bar = None;

        loop {
            // Create a new progress bar if it has been finished.
            progress_bar
                .get_or_insert_with(|| {
                    let progress_bar = ProgressBar::new_spinner();
                    progress_bar.set_style(progress_style.clone());
                    progress_bar.set_message("🍿 Looking it up...");
                    progress_bar
                })
                .inc(1);

            let sleep = sleep(Duration::from_millis(100));
            let event = select! {
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        break 'outer;
                    };
                    event
                },
                _ = sleep => {
                    continue;
                }
            };

            match event {
                HostEvent::Focus => {
                    // Focus also follows a reset, so make sure the reply is
                    // really in.
                    if widget.snapshot().await.is_composing {
                        continue;
                    }
                    break;
                }
                HostEvent::Navigate(route, state) => {
                    if let Some(progress_bar) = &progress_bar {
                        progress_bar.finish_and_clear();
                    }
                    progress_bar = None;
                    print_navigation(&route, &state);
                }
            }
        }

        if let Some(progress_bar) = &progress_bar {
            progress_bar.finish_and_clear();
        }
    }
}

fn print_new_messages(
    snapshot: &WidgetSnapshot,
    printed: &mut HashSet<MessageId>,
) {
    for message in &snapshot.messages {
        if printed.insert(message.id().clone()) {
            print_message(message);
        }
    }
}

fn print_message(message: &Message) {
    let time = message.display_time(&DisplayTimeZone::Local);
    match message.sender() {
        Sender::User => {
            println!(
                "{}🙂 {} {}",
                BAR_CHAR.bright_green(),
                message.text(),
                time.dimmed()
            );
        }
        Sender::Assistant => {
            println!(
                "{}🤖 {} {}",
                BAR_CHAR.bright_cyan(),
                render_markdown(message.text()),
                time.dimmed()
            );
            if message.offers_booking() {
                println!(
                    "{}🎟️  {}",
                    BAR_CHAR.bright_yellow(),
                    "/book to continue to seat selection".bright_yellow()
                );
            }
        }
    }
}

fn print_navigation(route: &str, state: &NavigationState) {
    let bar = BAR_CHAR.bright_yellow();
    println!("{bar}➡️  Navigating to {}", route.bright_white().bold());
    match serde_json::to_string_pretty(state) {
        Ok(state) => {
            for line in state.lines() {
                println!("{bar}{}", line.dimmed());
            }
        }
        Err(err) => error!("failed to render navigation state: {err}"),
    }
}

fn latest_suggestion(snapshot: &WidgetSnapshot) -> Option<MessageId> {
    snapshot
        .messages
        .iter()
        .rev()
        .find(|m| m.offers_booking())
        .map(|m| m.id().clone())
}

/// Renders `**bold**` spans, the only markup replies use.
fn render_markdown(text: &str) -> String {
    text.split("**")
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 1 {
                part.bold().to_string()
            } else {
                part.bright_white().to_string()
            }
        })
        .collect()
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
