//! User-facing output for the CLI.

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Plain progress line on stdout.
pub fn status(message: &str) {
    println!("{message}");
}

/// Bold green completion line on stdout.
pub fn done(message: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    println!("{message}");
    let _ = stdout.reset();
}

/// One-line warning on stderr.
pub fn warning(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    eprint!("WARNING");
    let _ = stderr.reset();
    eprintln!(": {message}");
}
