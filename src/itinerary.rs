use std::{io, path::Path};

use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::{
    lookup::{Columns, LookupBuilder, LookupError, LookupTable},
    normalize::normalize,
    read_to_string,
    token::TokenSubstitutor,
    Mode, Options,
};

#[derive(Error, Debug)]
pub enum ItineraryError {
    #[error("airport lookup not found: {0}")]
    LookupUnreadable(#[source] io::Error),
    #[error(transparent)]
    MalformedLookupData(#[from] LookupError),
    #[error("input not found: {0}")]
    DocumentUnreadable(#[source] io::Error),
    #[error("failed to write output: {0}")]
    OutputUnwritable(#[source] io::Error),
}

pub type ItineraryResult<T> = Result<T, ItineraryError>;

/// A built lookup table paired with the token set to apply.
#[derive(Clone, Debug)]
pub struct Itinerary {
    table: LookupTable,
    mode: Mode,
}

impl Itinerary {
    pub fn new(table: LookupTable, mode: Mode) -> Self {
        Self { table, mode }
    }

    pub fn from_lookup(lookup: &str, options: &Options) -> ItineraryResult<Self> {
        let table = LookupBuilder::new(options.columns).build(lookup)?;
        Ok(Self::new(table, options.mode))
    }

    /// Substitutes every line, then normalizes and trims the joined text.
    pub fn render(&self, document: &str) -> String {
        let substitutor = TokenSubstitutor::new(&self.table, self.mode);
        let substituted = document
            .lines()
            .map(|line| substitutor.substitute(line))
            .join("\n");

        let mut text = normalize(&substituted, self.mode);
        text.truncate(text.trim_end().len());
        text
    }
}

/// Reads and builds the airport lookup at `path`.
pub fn load_lookup(path: &Path, columns: Columns) -> ItineraryResult<LookupTable> {
    let contents = fs_err::read(path).map_err(ItineraryError::LookupUnreadable)?;
    Ok(LookupBuilder::new(columns).build(&read_to_string(&contents))?)
}

/// Reads `lookup` and `input`, renders the itinerary and writes it to `output`.
///
/// Nothing is created or written unless both sources were read and the
/// lookup was valid. Missing parent directories of `output` are created.
pub fn process_files(
    input: &Path,
    output: &Path,
    lookup: &Path,
    options: &Options,
) -> ItineraryResult<String> {
    let itinerary = Itinerary::new(load_lookup(lookup, options.columns)?, options.mode);

    let document = fs_err::read(input).map_err(ItineraryError::DocumentUnreadable)?;
    let rendered = itinerary.render(&read_to_string(&document));

    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent).map_err(ItineraryError::OutputUnwritable)?;
    }
    fs_err::write(output, &rendered).map_err(ItineraryError::OutputUnwritable)?;
    debug!(output = %output.display(), bytes = rendered.len(), "wrote itinerary");

    Ok(rendered)
}

#[cfg(test)]
mod test {
    use crate::{Mode, Options};

    use super::Itinerary;

    const LOOKUP: &str = "name,iso_country,municipality,icao_code,iata_code,coordinates
Honiara International Airport,SB,Honiara,AGGH,HIR,\"160.05499267578, -9.4280004501343\"
Buka Airport,PG,Buka Island,AYBK,BUA,\"154.67300415039062, -5.4223198890686035\"";

    fn itinerary(mode: Mode) -> Itinerary {
        Itinerary::from_lookup(
            LOOKUP,
            &Options {
                mode,
                ..Options::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(itinerary(Mode::Standard).render(""), "");
    }

    #[test]
    fn test_render_document() {
        let document = "Flight from #HIR to *##AYBK\r\n\r\n\r\n\r\nDeparts D(2024-02-01T08:00-08:00) at T12(2024-02-01T08:00-08:00)  \n\n";

        assert_eq!(
            itinerary(Mode::Standard).render(document),
            "Flight from Honiara International Airport to *##AYBK\n\nDeparts 01 Feb 2024 at 08:00AM (-08:00)"
        );
        assert_eq!(
            itinerary(Mode::Extended).render(document),
            "Flight from Honiara International Airport to Buka Island\n\nDeparts 01 Feb 2024 at 08:00AM (-08:00)"
        );
    }

    #[test]
    fn test_lone_carriage_returns() {
        assert_eq!(
            itinerary(Mode::Standard).render("#BUA\r\r\r#HIR\rend"),
            "Buka Airport\n\nHoniara International Airport\nend"
        );
    }

    #[test]
    fn test_malformed_lookup() {
        let result = Itinerary::from_lookup("Buka Airport,PG,,AYBK,BUA", &Options::default());
        assert!(result.is_err());
    }
}
