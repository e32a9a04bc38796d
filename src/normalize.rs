use once_cell::sync::Lazy;
use regex::Regex;

use crate::Mode;

static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\x0B\x0C\r]").unwrap());
static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static TRAILING_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+\n").unwrap());
static LEADING_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]+").unwrap());
static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Turns vertical tab, form feed and carriage return into line feeds and
/// keeps at most one blank line between paragraphs.
///
/// In [`Mode::Extended`] spaces around a line feed are dropped and longer
/// runs of spaces are squeezed into one. Horizontal space is handled before
/// blank lines so that applying this twice changes nothing.
pub fn normalize(text: &str, mode: Mode) -> String {
    let text = LINE_BREAK_RE.replace_all(text, "\n");
    let text = match mode {
        Mode::Standard => text,
        Mode::Extended => {
            let text = TRAILING_SPACE_RE.replace_all(&text, "\n").into_owned();
            let text = LEADING_SPACE_RE.replace_all(&text, "\n").into_owned();
            SPACE_RUN_RE.replace_all(&text, " ").into_owned().into()
        }
    };
    BLANK_LINES_RE.replace_all(&text, "\n\n").into_owned()
}
