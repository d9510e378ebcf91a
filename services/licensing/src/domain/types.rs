use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Licenses ─────────────────────────────────────────────────────────────────

/// A device-bindable, time-limited license key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseKey {
    pub id: Uuid,
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub device_id: Option<String>,
}

impl LicenseKey {
    /// Active iff `expires_at` is strictly after `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    pub fn is_bound(&self) -> bool {
        self.device_id.is_some()
    }
}

/// Filter accepted by license listing and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseFilter {
    Active,
    Expired,
    #[serde(alias = "unused")]
    Unbound,
}

impl LicenseFilter {
    pub fn matches(self, license: &LicenseKey, now: DateTime<Utc>) -> bool {
        match self {
            Self::Active => license.is_active(now),
            Self::Expired => !license.is_active(now),
            Self::Unbound => !license.is_bound(),
        }
    }
}

/// Why a verification was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyFailure {
    NotFound,
    Expired,
    DeviceMismatch,
}

impl VerifyFailure {
    pub fn message(self) -> &'static str {
        match self {
            Self::NotFound => "Invalid license key",
            Self::Expired => "License has expired",
            Self::DeviceMismatch => "License is already in use on another device",
        }
    }
}

/// Outcome of a verification. Refusals are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Valid { expires_at: DateTime<Utc> },
    Invalid(VerifyFailure),
}

impl VerificationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn reason(&self) -> Option<VerifyFailure> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid(reason) => Some(*reason),
        }
    }
}

/// Aggregate license counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LicenseStats {
    pub total: u64,
    pub active: u64,
    pub bound: u64,
}

/// Default license lifetime in days.
pub const DEFAULT_LICENSE_DAYS: u32 = 365;

/// Key layout: `GROUPS` groups of `GROUP_LEN` characters joined by `-`.
pub const LICENSE_KEY_GROUPS: usize = 4;
pub const LICENSE_KEY_GROUP_LEN: usize = 4;

/// Attempts at generating a non-colliding key before giving up.
pub const MAX_KEY_ATTEMPTS: usize = 32;

/// Attempts at binding before a contested verification is refused.
pub const MAX_BIND_ATTEMPTS: usize = 3;

/// Column width of `license_keys.device_id`.
pub const MAX_DEVICE_ID_LEN: usize = 64;

/// `now + days`, or `None` when `days` is zero or the result overflows.
pub fn license_expiry(now: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
    if days == 0 {
        return None;
    }
    Duration::try_days(i64::from(days)).and_then(|d| now.checked_add_signed(d))
}

/// True when `key` has the `XXXX-XXXX-XXXX-XXXX` shape over `[A-Z0-9]`.
pub fn is_well_formed_key(key: &str) -> bool {
    let groups: Vec<&str> = key.split('-').collect();
    groups.len() == LICENSE_KEY_GROUPS
        && groups.iter().all(|g| {
            g.len() == LICENSE_KEY_GROUP_LEN
                && g.bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        })
}

// ── Signatures ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKind {
    Hash,
    Pattern,
}

impl SignatureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hash => "hash",
            Self::Pattern => "pattern",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hash" => Some(Self::Hash),
            "pattern" => Some(Self::Pattern),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// How the patterns of a pattern signature combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternLogic {
    #[default]
    All,
    Any,
}

/// Stored form of a pattern signature's matching data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternData {
    pub patterns: Vec<String>,
    pub logic: PatternLogic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureBody {
    Hash {
        hash_value: String,
    },
    Pattern {
        signature_id: String,
        data: PatternData,
    },
}

impl SignatureBody {
    pub fn kind(&self) -> SignatureKind {
        match self {
            Self::Hash { .. } => SignatureKind::Hash,
            Self::Pattern { .. } => SignatureKind::Pattern,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirusSignature {
    pub id: Uuid,
    pub name: String,
    pub body: SignatureBody,
    pub severity: Severity,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Result of matching a file hash against the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanVerdict {
    pub sha256: String,
    pub threat: Option<(String, Severity)>,
}

impl ScanVerdict {
    pub fn is_infected(&self) -> bool {
        self.threat.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignatureStats {
    pub total: u64,
    pub hash_based: u64,
    pub pattern_based: u64,
}

/// Prefix of generated pattern signature ids (`ZARI-0001`).
pub const PATTERN_ID_PREFIX: &str = "ZARI-";

/// Lowercase a SHA-256 hex digest and check its shape.
pub fn normalize_sha256(hash: &str) -> Option<String> {
    let hash = hash.trim().to_ascii_lowercase();
    (hash.len() == 64 && hash.bytes().all(|b| b.is_ascii_hexdigit())).then_some(hash)
}

/// Sequence number of a `ZARI-NNNN` id.
pub fn pattern_id_number(signature_id: &str) -> Option<u32> {
    signature_id.strip_prefix(PATTERN_ID_PREFIX)?.parse().ok()
}

pub fn format_pattern_id(number: u32) -> String {
    format!("{PATTERN_ID_PREFIX}{number:04}")
}

// ── Definition updates ───────────────────────────────────────────────────────

/// One generation of the definitions document for a signature kind.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionUpdate {
    pub id: Uuid,
    pub kind: SignatureKind,
    /// `YYYYMMDDHHMM` of the generation time (UTC).
    pub version: String,
    pub signature_count: u64,
    pub document: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

pub fn definitions_version(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M").to_string()
}

/// Definitions document served to clients.
///
/// Hash kind: `{name: hash_value}` (a later signature with the same name wins).
/// Pattern kind: `{"signatures": [{id, name, severity, patterns, logic}]}`.
pub fn definitions_document(
    kind: SignatureKind,
    signatures: &[VirusSignature],
) -> serde_json::Value {
    match kind {
        SignatureKind::Hash => {
            let entries = signatures
                .iter()
                .filter_map(|sig| match &sig.body {
                    SignatureBody::Hash { hash_value } => {
                        Some((sig.name.clone(), serde_json::Value::from(hash_value.as_str())))
                    }
                    SignatureBody::Pattern { .. } => None,
                })
                .collect::<serde_json::Map<_, _>>();
            serde_json::Value::Object(entries)
        }
        SignatureKind::Pattern => {
            let entries: Vec<serde_json::Value> = signatures
                .iter()
                .filter_map(|sig| match &sig.body {
                    SignatureBody::Pattern { signature_id, data } => Some(serde_json::json!({
                        "id": signature_id,
                        "name": sig.name,
                        "severity": sig.severity,
                        "patterns": data.patterns,
                        "logic": data.logic,
                    })),
                    SignatureBody::Hash { .. } => None,
                })
                .collect();
            serde_json::json!({ "signatures": entries })
        }
    }
}

// ── Admins ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}
