use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use crate::core::ConversionState;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Result,
    Error,
    Banner,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Result => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Banner => style(text).yellow(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates the loading indicator shown while a request is pending.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Runs `fut` with a spinner visible until it completes.
pub async fn with_spinner<F, T>(message: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    let pb = new_spinner(message);
    let out = fut.await;
    pb.finish_and_clear();
    out
}

/// Spinner text for a conversion state, if it has one.
pub fn state_message(state: ConversionState) -> Option<&'static str> {
    match state {
        ConversionState::Loading => Some("Looking up rates..."),
        ConversionState::CacheHit => Some("Using cached rates..."),
        ConversionState::Fetching => Some("Fetching latest rates..."),
        ConversionState::Formatting => Some("Formatting result..."),
        _ => None,
    }
}

/// Runs a conversion `fut` with a spinner that follows `states`.
pub async fn with_conversion_spinner<F, T>(
    message: &str,
    states: watch::Receiver<ConversionState>,
    fut: F,
) -> T
where
    F: Future<Output = T>,
{
    let pb = new_spinner(message);
    let out = follow_states(&pb, states, fut).await;
    pb.finish_and_clear();
    out
}

async fn follow_states<F, T>(
    pb: &ProgressBar,
    mut states: watch::Receiver<ConversionState>,
    fut: F,
) -> T
where
    F: Future<Output = T>,
{
    tokio::pin!(fut);
    loop {
        tokio::select! {
            biased;
            Ok(()) = states.changed() => {
                let state = *states.borrow_and_update();
                if state.is_terminal() {
                    continue;
                }
                if let Some(message) = state_message(state) {
                    pb.set_message(message);
                }
            }
            out = &mut fut => return out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spinner_follows_conversion_state() {
        let (tx, rx) = watch::channel(ConversionState::Idle);
        let pb = ProgressBar::hidden();
        pb.set_message("Converting...");

        let out = follow_states(&pb, rx, async {
            tx.send_replace(ConversionState::Fetching);
            tokio::task::yield_now().await;
            tx.send_replace(ConversionState::Done);
            tokio::task::yield_now().await;
            42
        })
        .await;

        assert_eq!(out, 42);
        assert_eq!(pb.message(), "Fetching latest rates...");
    }

    #[test]
    fn test_state_messages() {
        assert_eq!(
            state_message(ConversionState::CacheHit),
            Some("Using cached rates...")
        );
        assert_eq!(state_message(ConversionState::Done), None);
        assert_eq!(state_message(ConversionState::Idle), None);
    }
}
