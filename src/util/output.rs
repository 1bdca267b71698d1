use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

use console::style;

const QUIET: u8 = 0;
const NORMAL: u8 = 1;
const VERBOSE: u8 = 2;

static LEVEL: AtomicU8 = AtomicU8::new(NORMAL);

pub fn configure(verbose: bool, quiet: bool, no_color: bool) {
    let level = if quiet {
        QUIET
    } else if verbose {
        VERBOSE
    } else {
        NORMAL
    };
    LEVEL.store(level, Ordering::Relaxed);
    if no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}

pub fn is_quiet() -> bool {
    LEVEL.load(Ordering::Relaxed) == QUIET
}

pub fn is_verbose() -> bool {
    LEVEL.load(Ordering::Relaxed) >= VERBOSE
}

pub fn info(message: &str) {
    if is_quiet() {
        return;
    }
    let _ = writeln!(io::stderr(), "{}", message);
}

pub fn trace(message: &str) {
    if !is_verbose() {
        return;
    }
    let _ = writeln!(io::stderr(), "{}", style(message).dim());
}

pub fn warn(message: &str) {
    let _ = writeln!(io::stderr(), "{}", style(message).yellow());
}

pub fn error(message: &str) {
    let _ = writeln!(io::stderr(), "{}", style(message).red());
}
