//! Canonical hostname type and RFC 1123/2782 validation.
//!
//! A [`Hostname`] is immutable after construction and always carries its
//! normalized (lowercase, trailing-dot-stripped) name. This is the single
//! canonical form used everywhere else in the crate: caches, known-hostname
//! sets and diffing all key on [`Hostname::name`].

use std::fmt::Display;

use thiserror::Error;

/// A single FQDN segment validation failure, or a structural one (too long,
/// empty, SRV-specific label-count rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ValidationError {
    #[error("hostname is empty")]
    Empty,
    #[error("hostname exceeds 253 bytes")]
    TooLong,
    #[error("label exceeds 63 bytes")]
    LabelTooLong,
    #[error("label is empty")]
    LabelEmpty,
    #[error("label contains invalid characters")]
    InvalidCharacters,
    #[error("label starts with an invalid character")]
    InvalidLabelStart,
    #[error("label ends with an invalid character")]
    InvalidLabelEnd,
    #[error("SRV hostname needs at least 3 labels")]
    SRVTooFewLabels,
    #[error("SRV hostname's service or protocol label is invalid")]
    SRVInvalidServiceOrProto,
}

/// Record type a [`Hostname`] may carry a hint for, or that a [`crate::record::Record`]
/// actually is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Srv,
    Ptr,
    Txt,
}

impl Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Srv => "SRV",
            RecordType::Ptr => "PTR",
            RecordType::Txt => "TXT",
        };
        write!(f, "{}", s)
    }
}

/// Priority/weight/port sub-fields of an SRV record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Srv {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
}

/// Overrides carried alongside a [`Hostname`], taking priority over a provider
/// instance's defaults when ensuring records (`spec.md` §4.F step 2).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RecordHints {
    pub record_type: Option<RecordType>,
    pub target: Option<String>,
    pub ttl: Option<u32>,
    /// Explicit provider-instance name, bypassing domain-matcher routing.
    pub provider: Option<String>,
    pub srv: Option<Srv>,
}

/// A canonical, validated FQDN plus the metadata needed to route and
/// construct records for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hostname {
    name: String,
    source: String,
    router: Option<String>,
    hints: RecordHints,
}

impl Hostname {
    /// Construct a new `Hostname`, normalizing and validating `raw` first.
    /// `record_type` is only used to select RFC 1123 vs RFC 2782 validation
    /// rules; the resulting hostname still carries whatever `hints` says.
    pub fn new(
        raw: &str,
        source: impl Into<String>,
        router: Option<String>,
        hints: RecordHints,
    ) -> Result<Self, ValidationError> {
        let name = normalize(raw);
        let record_type = hints.record_type.unwrap_or(RecordType::A);
        validate(&name, record_type)?;
        Ok(Hostname {
            name,
            source: source.into(),
            router,
            hints,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn router(&self) -> Option<&str> {
        self.router.as_deref()
    }

    pub fn hints(&self) -> &RecordHints {
        &self.hints
    }
}

impl Display for Hostname {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Lowercase + strip a single trailing dot. The single canonical form used
/// everywhere: map keys, set membership, provider-adapter lookups.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.strip_suffix('.').unwrap_or(raw);
    trimmed.to_ascii_lowercase()
}

/// Validate an already-normalized hostname against RFC 1123 (or RFC 2782 when
/// `record_type == Srv`).
pub fn validate(name: &str, record_type: RecordType) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Empty);
    }
    if name.len() > 253 {
        return Err(ValidationError::TooLong);
    }

    let labels: Vec<&str> = name.split('.').collect();
    if labels.iter().any(|l| l.is_empty()) {
        return Err(ValidationError::LabelEmpty);
    }

    if record_type == RecordType::Srv {
        if labels.len() < 3 {
            return Err(ValidationError::SRVTooFewLabels);
        }
        for service_label in &labels[..2] {
            if !is_valid_srv_service_label(service_label) {
                return Err(ValidationError::SRVInvalidServiceOrProto);
            }
        }
        for (i, label) in labels.iter().enumerate().skip(2) {
            validate_label(label, i == 0)?;
        }
    } else {
        for (i, label) in labels.iter().enumerate() {
            validate_label(label, i == 0)?;
        }
    }
    Ok(())
}

fn validate_label(label: &str, is_first: bool) -> Result<(), ValidationError> {
    if label.len() > 63 {
        return Err(ValidationError::LabelTooLong);
    }
    if label == "*" && is_first {
        return Ok(());
    }
    if !label
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-')
    {
        return Err(ValidationError::InvalidCharacters);
    }
    let first = label.as_bytes()[0];
    let last = label.as_bytes()[label.len() - 1];
    if !first.is_ascii_alphanumeric() {
        return Err(ValidationError::InvalidLabelStart);
    }
    if !last.is_ascii_alphanumeric() {
        return Err(ValidationError::InvalidLabelEnd);
    }
    Ok(())
}

/// `_[a-z0-9]([a-z0-9-]*[a-z0-9])?`, case-insensitive, leading underscore
/// required (SRV service/proto labels, e.g. `_http`, `_tcp`).
fn is_valid_srv_service_label(label: &str) -> bool {
    let Some(rest) = label.strip_prefix('_') else {
        return false;
    };
    if rest.is_empty() || rest.len() > 62 {
        return false;
    }
    let bytes = rest.as_bytes();
    if !bytes[0].is_ascii_alphanumeric() {
        return false;
    }
    if !bytes[bytes.len() - 1].is_ascii_alphanumeric() {
        return false;
    }
    bytes
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || *b == b'-')
}
