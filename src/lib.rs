use tracing::warn;

pub mod datetime;
pub mod itinerary;
pub mod lookup;
pub mod normalize;
pub mod token;

pub use itinerary::{load_lookup, process_files, Itinerary, ItineraryError};
pub use lookup::{Columns, LookupBuilder, LookupTable, LookupTag};
pub use token::TokenSubstitutor;

fn read_to_string(contents: &[u8]) -> String {
    String::from_utf8(contents.to_vec()).unwrap_or_else(|_| {
        let (string, _, errors) = encoding_rs::WINDOWS_1252.decode(contents);
        if errors {
            warn!("errors while decoding win-1252");
        }
        string.to_string()
    })
}

/// Which token set is recognised and how much whitespace is collapsed.
///
/// `Extended` is the "bonus" mode: it adds the `*#`/`*##` city tokens and
/// squeezes runs of spaces in the final text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Standard,
    Extended,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub mode: Mode,
    pub columns: Columns,
}

#[cfg(test)]
mod test {
    use super::read_to_string;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(read_to_string("Zürich".as_bytes()), "Zürich");
    }

    #[test]
    fn test_decode_win1252_fallback() {
        // "Zürich" with 0xFC for ü
        let bytes = b"Z\xfcrich Airport";
        assert_eq!(read_to_string(bytes), "Zürich Airport");
    }
}
