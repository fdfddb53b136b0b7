//! Load batches of loans from CSV
//!
//! Expected columns: Name, Principal, AnnualRatePct, TermMonths and the
//! optional ExtraPayment, ExtraFrequency, StartDate.

use chrono::NaiveDate;
use csv::Reader;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use super::{ExtraFrequency, LoanTerms};
use crate::error::{CalcError, CalcResult};

/// A loan row tagged with the caller's identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLoan {
    pub name: String,
    pub terms: LoanTerms,
}

/// Raw CSV row
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Principal")]
    principal: f64,
    #[serde(rename = "AnnualRatePct")]
    annual_rate_pct: f64,
    #[serde(rename = "TermMonths")]
    term_months: u32,
    #[serde(rename = "ExtraPayment", default)]
    extra_payment: Option<f64>,
    #[serde(rename = "ExtraFrequency", default)]
    extra_frequency: Option<String>,
    #[serde(rename = "StartDate", default)]
    start_date: Option<NaiveDate>,
}

impl CsvRow {
    fn into_loan(self) -> CalcResult<NamedLoan> {
        let extra_frequency = match self.extra_frequency.as_deref() {
            Some(raw) => raw
                .parse::<ExtraFrequency>()
                .map_err(|reason| CalcError::invalid("ExtraFrequency", reason))?,
            None => ExtraFrequency::None,
        };

        let terms = LoanTerms {
            principal: self.principal,
            annual_rate_pct: self.annual_rate_pct,
            term_periods: self.term_months,
            extra_payment: self.extra_payment.unwrap_or(0.0),
            extra_frequency,
            lump_sums: Vec::new(),
            start_date: self.start_date,
        };

        Ok(NamedLoan {
            name: self.name,
            terms,
        })
    }
}

/// Load all loans from a CSV file
pub fn load_loans<P: AsRef<Path>>(path: P) -> CalcResult<Vec<NamedLoan>> {
    let mut reader = Reader::from_path(path)?;
    collect_rows(&mut reader)
}

/// Load loans from any reader (string buffer, stdin, ...)
pub fn load_loans_from_reader<R: Read>(reader: R) -> CalcResult<Vec<NamedLoan>> {
    let mut csv_reader = Reader::from_reader(reader);
    collect_rows(&mut csv_reader)
}

fn collect_rows<R: Read>(reader: &mut Reader<R>) -> CalcResult<Vec<NamedLoan>> {
    let mut loans = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        loans.push(row.into_loan()?);
    }

    Ok(loans)
}
