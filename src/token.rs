use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Match, Regex};
use tracing::trace;

use crate::{
    datetime::{Clock, Timestamp},
    lookup::{LookupTable, LookupTag},
    Mode,
};

const DATE_TIME_TOKENS: &str =
    r"|D\((?P<date>[^)]+)\)|T12\((?P<time12>[^)]+)\)|T24\((?P<time24>[^)]+)\)";

static STANDARD_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"##(?P<icao_name>[A-Z]{{4}})|#(?P<iata_name>[A-Z]{{3}}){DATE_TIME_TOKENS}"
    ))
    .unwrap()
});

static EXTENDED_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\*##(?P<icao_city>[A-Z]{{4}})|\*#(?P<iata_city>[A-Z]{{3}})|##(?P<icao_name>[A-Z]{{4}})|#(?P<iata_name>[A-Z]{{3}}){DATE_TIME_TOKENS}"
    ))
    .unwrap()
});

const CODE_GROUPS: [(&str, LookupTag); 4] = [
    ("icao_city", LookupTag::CityByIcao),
    ("iata_city", LookupTag::CityByIata),
    ("icao_name", LookupTag::NameByIcao),
    ("iata_name", LookupTag::NameByIata),
];

const TIMESTAMP_GROUPS: [(&str, Option<Clock>); 3] = [
    ("date", None),
    ("time12", Some(Clock::TwelveHour)),
    ("time24", Some(Clock::TwentyFourHour)),
];

/// Replaces airport and timestamp tokens within a single line.
///
/// Tokens that do not resolve, either because the code is unknown or the
/// timestamp is malformed, are kept verbatim.
#[derive(Clone, Copy, Debug)]
pub struct TokenSubstitutor<'a> {
    table: &'a LookupTable,
    tokens: &'static Regex,
}

impl<'a> TokenSubstitutor<'a> {
    pub fn new(table: &'a LookupTable, mode: Mode) -> Self {
        let tokens = match mode {
            Mode::Standard => &*STANDARD_TOKENS,
            Mode::Extended => &*EXTENDED_TOKENS,
        };
        Self { table, tokens }
    }

    pub fn substitute<'l>(&self, line: &'l str) -> Cow<'l, str> {
        self.tokens
            .replace_all(line, |caps: &Captures| self.render(line, caps))
    }

    fn render(&self, line: &str, caps: &Captures) -> String {
        let token = caps.get(0).map_or("", |m| m.as_str());

        let rendered = if let Some((tag, code)) = CODE_GROUPS
            .iter()
            .find_map(|(group, tag)| caps.name(group).map(|code| (*tag, code)))
        {
            caps.get(0)
                .filter(|m| is_isolated(line, m))
                .and_then(|_| self.table.get(tag, code.as_str()))
                .map(str::to_string)
        } else {
            TIMESTAMP_GROUPS.iter().find_map(|(group, clock)| {
                caps.name(group).and_then(|payload| {
                    let timestamp = payload.as_str().parse::<Timestamp>().ok()?;
                    Some(clock.map_or_else(|| timestamp.date(), |clock| timestamp.time(clock)))
                })
            })
        };

        rendered.unwrap_or_else(|| {
            trace!(token, "leaving unresolved token");
            token.to_string()
        })
    }
}

/// A code token must not extend, or be extended by, a longer run of letters
/// and digits. A leading `#` or `*` would make it part of another token.
fn is_isolated(line: &str, token: &Match) -> bool {
    let before = line[..token.start()].chars().next_back();
    let after = line[token.end()..].chars().next();

    !before.is_some_and(|c| c.is_alphanumeric() || c == '#' || c == '*')
        && !after.is_some_and(char::is_alphanumeric)
}
