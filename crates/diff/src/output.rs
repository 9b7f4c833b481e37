//! Writing unified diffs to a terminal, optionally highlighted.
//!
//! Highlighting runs each line through syntect's `diff` syntax and converts the
//! resulting styles to ANSI escapes, the way bat's terminal.rs does.

use std::{io::Write, sync::OnceLock};

use nu_ansi_term::{Color, Style};
use syntect::{
	easy::HighlightLines,
	highlighting::{self, FontStyle, Theme, ThemeSet},
	parsing::{SyntaxReference, SyntaxSet},
};
use thiserror::Error;
use tracing::instrument;

const THEME: &str = "base16-ocean.dark";

#[derive(Debug, Error)]
pub enum OutputError {
	#[error("writing diff output")]
	Write(#[from] std::io::Error),

	#[error("syntax highlighting not available: {0}")]
	SyntaxNotFound(String),
}

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
	SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
	THEME_SET.get_or_init(ThemeSet::load_defaults)
}

/// Map a theme color to a terminal color.
///
/// Alpha 0 encodes a palette index in the red channel, alpha 1 means the
/// terminal's default color.
fn ansi_color(color: highlighting::Color) -> Option<Color> {
	match color.a {
		0 => Some(match color.r {
			0x00 => Color::Black,
			0x01 => Color::Red,
			0x02 => Color::Green,
			0x03 => Color::Yellow,
			0x04 => Color::Blue,
			0x05 => Color::Purple,
			0x06 => Color::Cyan,
			0x07 => Color::White,
			n => Color::Fixed(n),
		}),
		1 => None,
		_ => Some(Color::Rgb(color.r, color.g, color.b)),
	}
}

fn paint(style: highlighting::Style, text: &str) -> String {
	if text.is_empty() {
		return String::new();
	}

	let mut ansi = Style {
		foreground: ansi_color(style.foreground),
		..Style::default()
	};
	if style.font_style.contains(FontStyle::BOLD) {
		ansi = ansi.bold();
	}
	if style.font_style.contains(FontStyle::UNDERLINE) {
		ansi = ansi.underline();
	}
	if style.font_style.contains(FontStyle::ITALIC) {
		ansi = ansi.italic();
	}
	ansi.paint(text).to_string()
}

/// Writes unified diffs, highlighted when color is enabled.
pub struct DiffOutput<W: Write> {
	writer: W,
	highlight: Option<(&'static SyntaxReference, Theme)>,
}

impl<W: Write> DiffOutput<W> {
	pub fn new(writer: W, use_color: bool) -> Result<Self, OutputError> {
		let highlight = if use_color {
			let syntax = syntax_set()
				.find_syntax_by_extension("diff")
				.ok_or_else(|| OutputError::SyntaxNotFound("diff".to_string()))?;
			let theme = theme_set()
				.themes
				.get(THEME)
				.cloned()
				.ok_or_else(|| OutputError::SyntaxNotFound(THEME.to_string()))?;
			Some((syntax, theme))
		} else {
			None
		};
		Ok(Self { writer, highlight })
	}

	#[instrument(skip_all, fields(bytes = diff.len()))]
	pub fn write_diff(&mut self, diff: &str) -> Result<(), OutputError> {
		let Some((syntax, theme)) = &self.highlight else {
			write!(self.writer, "{}", diff)?;
			return Ok(());
		};

		let ss = syntax_set();
		let mut highlighter = HighlightLines::new(syntax, theme);
		for line in diff.lines() {
			match highlighter.highlight_line(line, ss) {
				Ok(regions) => {
					for (style, text) in regions {
						write!(self.writer, "{}", paint(style, text))?;
					}
					writeln!(self.writer)?;
				}
				Err(_) => writeln!(self.writer, "{}", line)?,
			}
		}
		Ok(())
	}

	pub fn flush(&mut self) -> Result<(), OutputError> {
		self.writer.flush()?;
		Ok(())
	}
}
