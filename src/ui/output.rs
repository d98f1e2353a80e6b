use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;
use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);

/// Suppress decorative output (headers, info lines, summaries)
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// True when `FRIENDSTORE_QUIET` is `1` or `true`
pub fn quiet_from_env() -> bool {
    std::env::var("FRIENDSTORE_QUIET")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::ROCKET, text.style(theme().heading));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().ok));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().caution));
}

pub fn info(label: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}: {}", Icons::INFO, label.style(theme().label), value);
}

pub fn summary_row(label: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!("  {} {}", label.style(theme().label), value);
}
