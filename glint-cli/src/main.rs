//! Illustrative front-end for `glint-core`: resolves a language for a
//! path, highlights the whole file, and writes it back out with ANSI
//! color escapes. Not part of the core library — see `glint_core`'s own
//! crate docs for the engine this drives.

mod languages;

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use crossterm::{
    execute,
    style::{ResetColor, SetForegroundColor},
};
use glint_core::{highlight, Cache, RopeInput, Theme};

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (path, theme_name) = match (args.next(), args.next()) {
        (Some(path), theme) => (path, theme),
        (None, _) => {
            eprintln!("usage: glint <path> [theme]");
            return ExitCode::from(1);
        }
    };

    let loader = match languages::build_loader() {
        Ok(loader) => loader,
        Err(err) => {
            eprintln!("error: failed to build language registry: {err}");
            return ExitCode::from(1);
        }
    };

    let Some(language) = loader.language_for_filename(Path::new(&path)) else {
        eprintln!(
            "error: no language recognizes '{path}' (known: {})",
            languages::describe_file_types(&loader)
        );
        return ExitCode::from(1);
    };
    log::info!("highlighting '{path}' as '{}'", language.id());

    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("error: failed to read '{path}': {err}");
            return ExitCode::from(1);
        }
    };

    let theme = glint_core::get_theme(theme_name.as_deref().unwrap_or("default"));

    let rope = ropey::Rope::from_str(&text);
    let input = RopeInput::new(rope.slice(..));
    let mut cache = Cache::new();
    let spans = highlight(language, &input, &mut cache, 0..text.len());

    if let Err(err) = write_highlighted(&text, &spans, &theme) {
        eprintln!("error: failed to write output: {err}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

fn write_highlighted(text: &str, spans: &[glint_core::Span], theme: &Theme) -> io::Result<()> {
    let bytes = text.as_bytes();
    let mut stdout = io::stdout().lock();
    let mut pos = 0usize;

    for span in spans {
        if span.start > pos {
            stdout.write_all(&bytes[pos..span.start])?;
        }
        if let Some(glint_core::Rgb(r, g, b)) = theme.color(span.style) {
            execute!(stdout, SetForegroundColor(crossterm::style::Color::Rgb { r, g, b }))?;
            stdout.write_all(&bytes[span.start..span.end])?;
            execute!(stdout, ResetColor)?;
        } else {
            stdout.write_all(&bytes[span.start..span.end])?;
        }
        pos = span.end;
    }
    if pos < bytes.len() {
        stdout.write_all(&bytes[pos..])?;
    }
    stdout.flush()
}
