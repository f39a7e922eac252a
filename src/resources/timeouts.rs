//! Per-operation deadlines
//!
//! Spinning connectors up and down on the Streamkap side is slow, so create
//! and update get 30 minutes and delete 15 by default. A resource overrides
//! them through its `timeouts` attribute with strings like `"45s"`, `"20m"`
//! or `"1h30m"`.

use super::traits::Operation;
use crate::error::{Error, Result};
use crate::schema::Attribute;
use crate::value::{AttrType, AttrValue, ResourceData};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Name of the attribute carrying timeout overrides
pub const TIMEOUTS_ATTRIBUTE: &str = "timeouts";

/// Default create deadline
pub const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Default update deadline
pub const DEFAULT_UPDATE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Default delete deadline
pub const DEFAULT_DELETE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Deadlines for the mutating operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_CREATE_TIMEOUT,
            update: DEFAULT_UPDATE_TIMEOUT,
            delete: DEFAULT_DELETE_TIMEOUT,
        }
    }
}

impl Timeouts {
    /// Read overrides from a model's `timeouts` attribute
    pub fn from_data(data: &ResourceData) -> Result<Self> {
        let mut timeouts = Self::default();
        let Some(fields) = data.get(TIMEOUTS_ATTRIBUTE).as_object() else {
            return Ok(timeouts);
        };

        for (name, slot) in [
            ("create", &mut timeouts.create),
            ("update", &mut timeouts.update),
            ("delete", &mut timeouts.delete),
        ] {
            if let Some(AttrValue::String(raw)) = fields.get(name) {
                *slot = parse_duration(raw)
                    .map_err(|e| Error::attribute(format!("{TIMEOUTS_ATTRIBUTE}.{name}"), e))?;
            }
        }
        Ok(timeouts)
    }

    /// Deadline for an operation; reads and imports are unbounded
    pub fn for_operation(&self, operation: Operation) -> Option<Duration> {
        match operation {
            Operation::Create => Some(self.create),
            Operation::Update => Some(self.update),
            Operation::Delete => Some(self.delete),
            Operation::Read | Operation::Import => None,
        }
    }
}

/// Schema of the `timeouts` attribute
pub fn timeouts_attribute() -> Attribute {
    Attribute::object(
        TIMEOUTS_ATTRIBUTE,
        vec![
            Attribute::optional("create", AttrType::String),
            Attribute::optional("update", AttrType::String),
            Attribute::optional("delete", AttrType::String),
        ],
    )
    .set_optional()
    .describe("Per-operation deadlines such as \"30m\"")
}

/// Parse a duration like `"90s"`, `"20m"`, `"1h30m"` or `"500ms"`
pub fn parse_duration(input: &str) -> std::result::Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(format!("invalid duration '{input}'"));
        }
        let amount: u64 = rest[..digits]
            .parse()
            .map_err(|_| format!("invalid duration '{input}'"))?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let part = match &rest[..unit_len] {
            "ms" => Duration::from_millis(amount),
            "s" => Duration::from_secs(amount),
            "m" => Duration::from_secs(amount.saturating_mul(60)),
            "h" => Duration::from_secs(amount.saturating_mul(3600)),
            "" => return Err(format!("missing unit in duration '{input}'")),
            unit => return Err(format!("unknown unit '{unit}' in duration '{input}'")),
        };
        total = total.saturating_add(part);
        rest = &rest[unit_len..];
    }
    Ok(total)
}

/// Run `future` under a deadline
///
/// On expiry the future is dropped, which aborts any in-flight request, and
/// a `Cancelled` error is returned.
pub async fn with_timeout<F, T>(operation: Operation, limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(%operation, timeout_ms = limit.as_millis() as u64, "Operation timed out");
            Err(Error::Cancelled {
                operation: operation.to_string(),
                timeout_ms: limit.as_millis() as u64,
            })
        }
    }
}
