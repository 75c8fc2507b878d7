//! Terminal output primitives for the dalgen CLI.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

pub mod colors {
    use console::Color;

    pub const CYAN: Color = Color::Color256(51);
    pub const MAGENTA: Color = Color::Color256(201);
    pub const YELLOW: Color = Color::Color256(221);
    pub const GREEN: Color = Color::Color256(82);
    pub const DIM: Color = Color::Color256(240);
}

pub mod symbols {
    pub const DIAMOND: &str = "\u{25C6}"; // ◆
    pub const DIAMOND_OUTLINE: &str = "\u{25C7}"; // ◇
    pub const TARGET_FILLED: &str = "\u{25C9}"; // ◉
    pub const TRIANGLE: &str = "\u{25B8}"; // ▸
    pub const DOT: &str = "\u{00B7}"; // ·
}

/// Box inner width in columns.
const BOX_WIDTH: usize = 53;

pub fn success(msg: &str) {
    println!("  {} {}", style(symbols::TARGET_FILLED).fg(colors::GREEN), msg);
}

pub fn info(msg: &str) {
    println!("  {} {}", style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN), msg);
}

pub fn warning(msg: &str) {
    println!(
        "  {} {}",
        style(symbols::TRIANGLE).fg(colors::YELLOW),
        style(msg).fg(colors::YELLOW)
    );
}

pub fn dim(msg: &str) {
    println!("  {}", style(msg).fg(colors::DIM));
}

/// Spinner shown while a run is in progress. Hidden when stdout is not a
/// terminal.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("\u{25CE}\u{25C9}\u{25CE}\u{25C9}")
        .template("  {spinner:.cyan} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub fn box_header(title: &str) {
    let title_padded = format!(" {} ", title);
    let dashes = (BOX_WIDTH + 2).saturating_sub(title_padded.chars().count() + 4);

    println!(
        "  {}{}{}{}",
        style("\u{256D}\u{2500}").fg(colors::CYAN),
        style(title_padded).fg(colors::CYAN).bold(),
        style("\u{2500}".repeat(dashes)).fg(colors::CYAN),
        style("\u{256E}").fg(colors::CYAN)
    );
}

pub fn box_line(content: &str) {
    let padding = BOX_WIDTH.saturating_sub(content.chars().count());
    println!(
        "  {} {}{}{}",
        style("\u{2502}").fg(colors::CYAN),
        content,
        " ".repeat(padding),
        style("\u{2502}").fg(colors::CYAN)
    );
}

pub fn box_footer() {
    println!(
        "  {}{}{}",
        style("\u{2570}").fg(colors::CYAN),
        style("\u{2500}".repeat(BOX_WIDTH)).fg(colors::CYAN),
        style("\u{256F}").fg(colors::CYAN)
    );
}

/// One `name · N methods` row inside a box.
pub fn model_line(name: &str, methods: usize) -> String {
    format!(
        "{} {:<30} {} {} method{}",
        symbols::DIAMOND,
        name,
        symbols::DOT,
        methods,
        if methods == 1 { "" } else { "s" }
    )
}

pub fn timing(label: &str, duration_ms: u128) {
    println!(
        "  {} {} in {}ms",
        style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN),
        label,
        duration_ms
    );
}

/// Header printed before a failed run's diagnostic.
pub fn failure_header() {
    println!();
    println!(
        "  {} {}",
        style(symbols::DIAMOND).fg(colors::MAGENTA).bold(),
        style("Generation aborted. No files were written.")
            .fg(colors::MAGENTA)
            .bold()
    );
    println!();
}

pub fn check_passed() {
    println!(
        "  {} {}",
        style(symbols::TARGET_FILLED).fg(colors::GREEN),
        style("Models are valid.").bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_line_pluralizes() {
        assert!(model_line("Product", 1).ends_with("1 method"));
        assert!(model_line("Product", 3).ends_with("3 methods"));
    }
}
