use super::binding::{Rendered, View};
use super::ui::{self, StyleType};
use comfy_table::Cell;

/// Codes per row of the currency table.
const CURRENCY_COLUMNS: usize = 8;

pub fn currency_table(codes: &[String]) -> String {
    let mut table = ui::new_styled_table();
    for row in codes.chunks(CURRENCY_COLUMNS) {
        table.add_row(row.iter().map(Cell::new).collect::<Vec<_>>());
    }
    format!(
        "{}\n\n{}\n{}",
        ui::style_text("Available currencies", StyleType::Title),
        table,
        ui::style_text(&format!("{} currencies", codes.len()), StyleType::Subtle)
    )
}

/// Renders a view and its banner as terminal text.
pub fn render(rendered: &Rendered) -> String {
    let mut lines = Vec::new();
    if let Some(banner) = &rendered.banner {
        lines.push(ui::style_text(&banner.message(), StyleType::Banner));
    }

    let body = match &rendered.view {
        View::Currencies(codes) => currency_table(codes),
        View::Converted(display) => ui::style_text(display, StyleType::Result),
        View::Error(message) => ui::style_text(message, StyleType::Error),
        View::Sanitized(text) => ui::style_text(&format!("Amount: {text}"), StyleType::Subtle),
        View::Connectivity { online: true } => {
            ui::style_text("Back online", StyleType::Banner)
        }
        View::Connectivity { online: false } => ui::style_text(
            "You are offline. Only cached rates can be used.",
            StyleType::Banner,
        ),
    };
    lines.push(body);
    lines.join("\n")
}
