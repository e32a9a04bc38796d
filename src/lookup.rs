use std::collections::HashMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use bevy_derive::Deref;
use itertools::Itertools;
use pest::{iterators::Pair, Parser};
use pest_derive::Parser;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, trace};

/// name, iso_country, municipality, icao_code, iata_code
const REQUIRED_FIELDS: usize = 5;

#[derive(Parser)]
#[grammar = "pest/lookup.pest"]
pub struct LookupParser;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("failed to parse airport lookup: {0}")]
    Parse(#[from] pest::error::Error<Rule>),
    #[error("malformed airport lookup data on line {line}: {reason}")]
    Malformed { line: usize, reason: MalformedReason },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("expected at least 5 fields, found {0}")]
    TooFewFields(usize),
    #[error("field {0} is empty")]
    EmptyField(usize),
    #[error("column {0} does not exist")]
    MissingColumn(usize),
}

pub type LookupResult = Result<LookupTable, LookupError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColumnsError {
    #[error("invalid column index {0:?}")]
    InvalidIndex(String),
    #[error("expected 4 column indices (name,city,iata,icao), found {0}")]
    Count(usize),
}

/// Positions of the consumed fields within a lookup row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Columns {
    pub name: usize,
    pub city: usize,
    pub iata: usize,
    pub icao: usize,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            name: 0,
            city: 2,
            iata: 4,
            icao: 3,
        }
    }
}

impl FromStr for Columns {
    type Err = ColumnsError;

    /// Parses `name,city,iata,icao`, e.g. `0,2,4,3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let indices = s
            .split(',')
            .map(str::trim)
            .map(|index| {
                index
                    .parse::<usize>()
                    .map_err(|_| ColumnsError::InvalidIndex(index.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let count = indices.len();
        let (name, city, iata, icao) = indices
            .into_iter()
            .collect_tuple()
            .ok_or(ColumnsError::Count(count))?;

        Ok(Self {
            name,
            city,
            iata,
            icao,
        })
    }
}

impl Display for Columns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.name, self.city, self.iata, self.icao)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LookupTag {
    NameByIata,
    NameByIcao,
    CityByIata,
    CityByIcao,
}

impl Display for LookupTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NameByIata => "name-by-iata",
            Self::NameByIcao => "name-by-icao",
            Self::CityByIata => "city-by-iata",
            Self::CityByIcao => "city-by-icao",
        })
    }
}

/// Airport names and cities keyed by tag and code.
///
/// Only [`LookupBuilder`] inserts; afterwards the table is read-only.
/// Serializes as a map keyed by `tag:code`, e.g. `name-by-iata:HIR`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deref)]
pub struct LookupTable(HashMap<(LookupTag, String), String>);

impl Serialize for LookupTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(
            self.0
                .iter()
                .map(|((tag, code), value)| (format!("{tag}:{code}"), value))
                .sorted_by(|a, b| a.0.cmp(&b.0)),
        )
    }
}

impl LookupTable {
    pub fn get(&self, tag: LookupTag, code: &str) -> Option<&str> {
        self.0.get(&(tag, code.to_string())).map(String::as_str)
    }

    fn insert(&mut self, tag: LookupTag, code: &str, value: &str) {
        self.0.insert((tag, code.to_string()), value.to_string());
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct LookupBuilder {
    columns: Columns,
}

impl LookupBuilder {
    pub fn new(columns: Columns) -> Self {
        Self { columns }
    }

    /// Builds the table from comma separated airport rows.
    ///
    /// Any malformed row fails the whole build. Duplicate codes keep the value
    /// of the last row that mentions them.
    pub fn build(&self, content: &str) -> LookupResult {
        let table = LookupParser::parse(Rule::lookup, content)?
            .flat_map(Pair::into_inner)
            .filter(|pair| matches!(pair.as_rule(), Rule::row))
            .try_fold(LookupTable::default(), |mut acc, row| {
                self.insert_row(&mut acc, row)?;
                Ok::<_, LookupError>(acc)
            })?;

        debug!(entries = table.len(), "built airport lookup");
        Ok(table)
    }

    fn insert_row(&self, table: &mut LookupTable, row: Pair<Rule>) -> Result<(), LookupError> {
        let (line, _) = row.line_col();
        if row.as_str().trim().is_empty() {
            trace!(line, "skipping blank lookup line");
            return Ok(());
        }

        let malformed = |reason| LookupError::Malformed { line, reason };
        let fields = row.into_inner().map(|field| field.as_str()).collect_vec();

        if fields.len() < REQUIRED_FIELDS {
            return Err(malformed(MalformedReason::TooFewFields(fields.len())));
        }
        if let Some(index) = fields[..REQUIRED_FIELDS].iter().position(|f| f.is_empty()) {
            return Err(malformed(MalformedReason::EmptyField(index)));
        }

        let column = |index: usize| {
            fields
                .get(index)
                .copied()
                .ok_or_else(|| malformed(MalformedReason::MissingColumn(index)))
        };
        let name = column(self.columns.name)?;
        let city = column(self.columns.city)?;
        let iata = column(self.columns.iata)?;
        let icao = column(self.columns.icao)?;

        if !iata.is_empty() {
            table.insert(LookupTag::NameByIata, iata, name);
            table.insert(LookupTag::CityByIata, iata, city);
        }
        if !icao.is_empty() {
            table.insert(LookupTag::NameByIcao, icao, name);
            table.insert(LookupTag::CityByIcao, icao, city);
        }

        Ok(())
    }
}
