use crate::resolver::Diagnostic;
use crate::ui::theme;
use owo_colors::OwoColorize;

pub fn success(label: &str) {
    println!("✔ {}", label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("✘ {}", label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("⚠ {}", label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!("{}: {}", label.style(theme().dim.clone()), value);
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

/// Render one resolution failure the way a compiler error reads:
/// declaration first, message after.
pub fn diagnostic(diagnostic: &Diagnostic) {
    eprintln!(
        "✘ {} {}",
        format!("[{}]", diagnostic.scope).style(theme().dim.clone()),
        format!("{}: {}", diagnostic.declaration, diagnostic.message).style(theme().error.clone())
    );
}
