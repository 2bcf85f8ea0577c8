use super::binding::{Event, Session, View};
use super::render::render;
use super::ui::{self, StyleType};
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Enter <amount> <from> <to> to convert, e.g. `100 USD EUR`.
  :list      show available currencies
  :offline   use cached rates only
  :online    allow network requests again
  :help      show this message
  :quit      leave";

#[derive(Debug, PartialEq)]
pub enum Command {
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    Event(Event),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    match line {
        "" => Command::Empty,
        ":q" | ":quit" | ":exit" => Command::Quit,
        ":h" | ":help" | "?" => Command::Help,
        ":list" => Command::Event(Event::Load),
        ":offline" => Command::Event(Event::ConnectivityChanged(false)),
        ":online" => Command::Event(Event::ConnectivityChanged(true)),
        _ => {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [amount, from, to] => Command::Convert {
                    amount: amount.to_string(),
                    from: from.to_string(),
                    to: to.to_string(),
                },
                // Same layout as the form: amount, then `from to` or `from -> to`
                [amount, from, "to" | "->", to] => Command::Convert {
                    amount: amount.to_string(),
                    from: from.to_string(),
                    to: to.to_string(),
                },
                _ => Command::Unknown(line.to_string()),
            }
        }
    }
}

async fn submit(session: &mut Session, amount: String, from: String, to: String) {
    // The amount is cleaned as it would be while typing, then submitted.
    let amount = match session.handle(Event::AmountInput(amount.clone())).await.view {
        View::Sanitized(clean) if clean != amount => {
            println!(
                "{}",
                ui::style_text(&format!("Amount adjusted to {clean}"), StyleType::Subtle)
            );
            clean
        }
        _ => amount,
    };

    let states = session.subscribe();
    let rendered = ui::with_conversion_spinner(
        "Converting...",
        states,
        session.handle(Event::Submit { amount, from, to }),
    )
    .await;
    println!("{}", render(&rendered));
}

pub async fn run(session: &mut Session) -> Result<()> {
    let rendered = ui::with_spinner("Loading currencies...", session.handle(Event::Load)).await;
    if let View::Currencies(codes) = &rendered.view {
        println!(
            "{}",
            ui::style_text(&format!("{} currencies available", codes.len()), StyleType::Subtle)
        );
        if let Some(banner) = &rendered.banner {
            println!("{}", ui::style_text(&banner.message(), StyleType::Banner));
        }
    } else {
        println!("{}", render(&rendered));
    }
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_line(&line) {
            Command::Quit => break,
            Command::Empty => {}
            Command::Help => println!("{HELP}"),
            Command::Unknown(input) => println!(
                "{}",
                ui::style_text(&format!("Unrecognized input: {input}. Try :help"), StyleType::Error)
            ),
            Command::Convert { amount, from, to } => submit(session, amount, from, to).await,
            Command::Event(event) => {
                let rendered = ui::with_spinner("Loading...", session.handle(event)).await;
                println!("{}", render(&rendered));
            }
        }
    }
    Ok(())
}
