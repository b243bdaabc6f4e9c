use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::domain::{BillBreakdownRecord, BillRecord, BillingConfigRecord};

#[derive(Debug)]
pub enum BillImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl fmt::Display for BillImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillImportError::Io(err) => write!(f, "failed to read bill export: {}", err),
            BillImportError::Csv(err) => write!(f, "invalid bill CSV data: {}", err),
        }
    }
}

impl std::error::Error for BillImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BillImportError::Io(err) => Some(err),
            BillImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for BillImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for BillImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads a landlord's bill export, one bill per row with its property's billing columns.
pub struct BillCsvImporter;

impl BillCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<BillRecord>, BillImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<BillRecord>, BillImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in csv_reader.deserialize::<BillRow>() {
            records.push(row?.into_record());
        }

        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct BillRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    bill_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    unit_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    base_rent: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    billing_due_day: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    grace_period_days: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    late_fee_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    late_fee_amount: Option<String>,
}

impl BillRow {
    fn into_record(self) -> BillRecord {
        let has_config = self.billing_due_day.is_some()
            || self.grace_period_days.is_some()
            || self.late_fee_type.is_some()
            || self.late_fee_amount.is_some();

        let property_config = has_config.then(|| BillingConfigRecord {
            billing_due_day: self.billing_due_day.map(Value::String),
            grace_period_days: self.grace_period_days.map(Value::String),
            late_fee_type: self.late_fee_type.map(Value::String),
            late_fee_amount: self.late_fee_amount.map(Value::String),
        });

        BillRecord {
            id: self.bill_id,
            unit_id: self.unit_id,
            status: self.status,
            breakdown: Some(BillBreakdownRecord {
                base_rent: self.base_rent.map(Value::String),
            }),
            property_config,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
