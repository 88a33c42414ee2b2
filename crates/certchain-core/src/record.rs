//! Record: a certificate issuance.
//!
//! A record is immutable once created. It lives in the pending buffer until a
//! seal moves it into exactly one block.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::validation::validate_record;

/// Wire format of `expiration_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A certificate issued by a certifier to a recipient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Identifier of the issuing authority.
    pub certifier: String,
    /// Display name of the issuer.
    pub certifier_name: String,
    /// Identifier of the certificate holder.
    pub recipient: String,
    /// Identifier within the issuer's namespace. Uniqueness is not enforced.
    pub certificate_id: u64,
    /// Human-readable label.
    pub certificate_name: String,
    /// Calendar date the certificate expires.
    pub expiration_date: NaiveDate,
}

impl Record {
    pub fn new(
        certifier: impl Into<String>,
        certifier_name: impl Into<String>,
        recipient: impl Into<String>,
        certificate_id: u64,
        certificate_name: impl Into<String>,
        expiration_date: NaiveDate,
    ) -> Self {
        Self {
            certifier: certifier.into(),
            certifier_name: certifier_name.into(),
            recipient: recipient.into(),
            certificate_id,
            certificate_name: certificate_name.into(),
            expiration_date,
        }
    }

    /// `expiration_date` in its canonical text form.
    pub fn expiration_date_string(&self) -> String {
        self.expiration_date.format(DATE_FORMAT).to_string()
    }
}

/// `certificate_id` as submitted: a JSON number or a decimal string.
///
/// Any other JSON value lands in `Other` so that it fails validation with
/// [`ValidationError::InvalidCertificateId`] instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CertificateIdField {
    Number(u64),
    Text(String),
    Other(Value),
}

impl From<u64> for CertificateIdField {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

/// A text field as submitted. Non-string JSON values land in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextField {
    Text(String),
    Other(Value),
}

impl From<String> for TextField {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for TextField {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Untyped submission form of a record, as handed over by a transport.
///
/// Every field may be absent or carry the wrong JSON type;
/// [`Record::try_from`] is the validation gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    #[serde(default)]
    pub certifier: Option<TextField>,
    #[serde(default)]
    pub certifier_name: Option<TextField>,
    #[serde(default)]
    pub recipient: Option<TextField>,
    #[serde(default)]
    pub certificate_id: Option<CertificateIdField>,
    #[serde(default)]
    pub certificate_name: Option<TextField>,
    #[serde(default)]
    pub expiration_date: Option<TextField>,
}

impl RecordFields {
    /// Fields with every value present.
    pub fn new(
        certifier: impl Into<String>,
        certifier_name: impl Into<String>,
        recipient: impl Into<String>,
        certificate_id: impl Into<CertificateIdField>,
        certificate_name: impl Into<String>,
        expiration_date: impl Into<String>,
    ) -> Self {
        Self {
            certifier: Some(TextField::Text(certifier.into())),
            certifier_name: Some(TextField::Text(certifier_name.into())),
            recipient: Some(TextField::Text(recipient.into())),
            certificate_id: Some(certificate_id.into()),
            certificate_name: Some(TextField::Text(certificate_name.into())),
            expiration_date: Some(TextField::Text(expiration_date.into())),
        }
    }
}

impl From<&Record> for RecordFields {
    fn from(record: &Record) -> Self {
        Self::new(
            record.certifier.clone(),
            record.certifier_name.clone(),
            record.recipient.clone(),
            record.certificate_id,
            record.certificate_name.clone(),
            record.expiration_date_string(),
        )
    }
}

impl TryFrom<RecordFields> for Record {
    type Error = ValidationError;

    fn try_from(fields: RecordFields) -> Result<Self, Self::Error> {
        let certifier = required_text(fields.certifier, "certifier")?;
        let certifier_name = required_text(fields.certifier_name, "certifier_name")?;
        let recipient = required_text(fields.recipient, "recipient")?;
        let certificate_id = parse_certificate_id(
            fields
                .certificate_id
                .ok_or(ValidationError::MissingField("certificate_id"))?,
        )?;
        let certificate_name = required_text(fields.certificate_name, "certificate_name")?;
        let expiration_date = parse_date(
            fields
                .expiration_date
                .ok_or(ValidationError::MissingField("expiration_date"))?,
        )?;

        let record = Record {
            certifier,
            certifier_name,
            recipient,
            certificate_id,
            certificate_name,
            expiration_date,
        };
        validate_record(&record)?;
        Ok(record)
    }
}

fn required_text(
    value: Option<TextField>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match value.ok_or(ValidationError::MissingField(field))? {
        TextField::Text(text) => Ok(text),
        TextField::Other(_) => Err(ValidationError::NotText(field)),
    }
}

fn parse_certificate_id(field: CertificateIdField) -> Result<u64, ValidationError> {
    match field {
        CertificateIdField::Number(id) => Ok(id),
        CertificateIdField::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(ValidationError::EmptyField("certificate_id"));
            }
            trimmed
                .parse::<u64>()
                .map_err(|_| ValidationError::InvalidCertificateId(text))
        }
        CertificateIdField::Other(value) => {
            Err(ValidationError::InvalidCertificateId(value.to_string()))
        }
    }
}

fn parse_date(field: TextField) -> Result<NaiveDate, ValidationError> {
    let text = match field {
        TextField::Text(text) => text,
        TextField::Other(value) => {
            return Err(ValidationError::InvalidExpirationDate(value.to_string()))
        }
    };
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyField("expiration_date"));
    }
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidExpirationDate(text))
}
