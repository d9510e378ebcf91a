use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::repository::{Clock, DefinitionRepository, SignatureRepository};
use crate::domain::types::{
    DefinitionUpdate, PatternData, PatternLogic, ScanVerdict, Severity, SignatureBody,
    SignatureKind, VirusSignature, definitions_document, definitions_version, format_pattern_id,
    normalize_sha256, pattern_id_number,
};
use crate::error::LicensingServiceError;

/// Attempts at claiming the next `ZARI-NNNN` id when inserts race.
const MAX_PATTERN_ID_ATTEMPTS: usize = 3;

// ── AddSignature ─────────────────────────────────────────────────────────────

pub enum AddSignatureInput {
    Hash {
        name: String,
        hash: String,
        severity: Option<Severity>,
        description: Option<String>,
    },
    Pattern {
        name: String,
        patterns: Vec<String>,
        logic: Option<PatternLogic>,
        severity: Option<Severity>,
        description: Option<String>,
    },
}

pub struct AddSignatureUseCase<R: SignatureRepository, D: DefinitionRepository, C: Clock> {
    pub repo: R,
    pub definitions: D,
    pub clock: C,
}

impl<R: SignatureRepository, D: DefinitionRepository, C: Clock> AddSignatureUseCase<R, D, C> {
    /// Store the signature, then regenerate the definitions of its kind.
    pub async fn execute(
        &self,
        input: AddSignatureInput,
    ) -> Result<VirusSignature, LicensingServiceError> {
        let signature = self.insert(input).await?;
        refresh_definitions(
            &self.repo,
            &self.definitions,
            self.clock.now(),
            signature.body.kind(),
        )
        .await;
        Ok(signature)
    }

    async fn insert(
        &self,
        input: AddSignatureInput,
    ) -> Result<VirusSignature, LicensingServiceError> {
        match input {
            AddSignatureInput::Hash {
                name,
                hash,
                severity,
                description,
            } => {
                let name = required_name(name)?;
                let hash_value = normalize_sha256(&hash).ok_or(LicensingServiceError::InvalidHash)?;
                if self.repo.find_by_hash(&hash_value).await?.is_some() {
                    return Err(LicensingServiceError::SignatureAlreadyExists);
                }

                let signature = VirusSignature {
                    id: Uuid::now_v7(),
                    description: description_or_default(description, "Hash", &name),
                    name,
                    body: SignatureBody::Hash { hash_value },
                    severity: severity.unwrap_or_default(),
                    created_at: self.clock.now(),
                };
                if !self.repo.insert(&signature).await? {
                    return Err(LicensingServiceError::SignatureAlreadyExists);
                }
                tracing::info!(signature_id = %signature.id, kind = "hash", "signature added");
                Ok(signature)
            }
            AddSignatureInput::Pattern {
                name,
                patterns,
                logic,
                severity,
                description,
            } => {
                let name = required_name(name)?;
                if patterns.is_empty() || patterns.iter().any(|p| p.trim().is_empty()) {
                    return Err(LicensingServiceError::InvalidPatterns);
                }
                let description = description_or_default(description, "Pattern", &name);
                let data = PatternData {
                    patterns,
                    logic: logic.unwrap_or_default(),
                };

                for _ in 0..MAX_PATTERN_ID_ATTEMPTS {
                    let signature = VirusSignature {
                        id: Uuid::now_v7(),
                        name: name.clone(),
                        body: SignatureBody::Pattern {
                            signature_id: self.next_pattern_id().await?,
                            data: data.clone(),
                        },
                        severity: severity.unwrap_or_default(),
                        description: description.clone(),
                        created_at: self.clock.now(),
                    };
                    if self.repo.insert(&signature).await? {
                        tracing::info!(signature_id = %signature.id, kind = "pattern", "signature added");
                        return Ok(signature);
                    }
                }
                Err(LicensingServiceError::SignatureAlreadyExists)
            }
        }
    }

    async fn next_pattern_id(&self) -> Result<String, LicensingServiceError> {
        let highest = self
            .repo
            .pattern_ids()
            .await?
            .iter()
            .filter_map(|id| pattern_id_number(id))
            .max()
            .unwrap_or(0);
        let next = highest
            .checked_add(1)
            .context("pattern signature ids exhausted")?;
        Ok(format_pattern_id(next))
    }
}

fn required_name(name: String) -> Result<String, LicensingServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LicensingServiceError::MissingData);
    }
    Ok(trimmed.to_owned())
}

fn description_or_default(description: Option<String>, kind: &str, name: &str) -> String {
    description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| format!("{kind}-based signature for {name}"))
}

// ── ListSignatures ───────────────────────────────────────────────────────────

pub struct ListSignaturesUseCase<R: SignatureRepository> {
    pub repo: R,
}

impl<R: SignatureRepository> ListSignaturesUseCase<R> {
    pub async fn execute(
        &self,
        kind: Option<SignatureKind>,
    ) -> Result<Vec<VirusSignature>, LicensingServiceError> {
        self.repo.list(kind).await
    }
}

// ── DeleteSignature ──────────────────────────────────────────────────────────

pub struct DeleteSignatureUseCase<R: SignatureRepository, D: DefinitionRepository, C: Clock> {
    pub repo: R,
    pub definitions: D,
    pub clock: C,
}

impl<R: SignatureRepository, D: DefinitionRepository, C: Clock> DeleteSignatureUseCase<R, D, C> {
    pub async fn execute(&self, id: Uuid) -> Result<(), LicensingServiceError> {
        let Some(signature) = self.repo.find_by_id(id).await? else {
            return Err(LicensingServiceError::SignatureNotFound);
        };
        if !self.repo.delete(id).await? {
            return Err(LicensingServiceError::SignatureNotFound);
        }
        tracing::info!(signature_id = %id, "signature deleted");
        refresh_definitions(
            &self.repo,
            &self.definitions,
            self.clock.now(),
            signature.body.kind(),
        )
        .await;
        Ok(())
    }
}

// ── Definitions ──────────────────────────────────────────────────────────────

/// Build and record a new definitions generation for `kind` from the current catalogue.
async fn generate_definitions<R, D>(
    repo: &R,
    definitions: &D,
    now: DateTime<Utc>,
    kind: SignatureKind,
) -> Result<DefinitionUpdate, LicensingServiceError>
where
    R: SignatureRepository,
    D: DefinitionRepository,
{
    let signatures = repo.list(Some(kind)).await?;
    let update = DefinitionUpdate {
        id: Uuid::now_v7(),
        kind,
        version: definitions_version(now),
        signature_count: signatures.len() as u64,
        document: definitions_document(kind, &signatures),
        created_at: now,
    };
    definitions.insert(&update).await?;
    tracing::info!(
        kind = kind.as_str(),
        version = %update.version,
        signature_count = update.signature_count,
        "definitions generated"
    );
    Ok(update)
}

/// The catalogue change is already committed; a failed generation is logged, not returned.
async fn refresh_definitions<R, D>(
    repo: &R,
    definitions: &D,
    now: DateTime<Utc>,
    kind: SignatureKind,
) where
    R: SignatureRepository,
    D: DefinitionRepository,
{
    if let Err(e) = generate_definitions(repo, definitions, now, kind).await {
        tracing::warn!(kind = kind.as_str(), error = ?e, "definitions generation failed");
    }
}

/// Latest generation per signature kind.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestDefinitions {
    pub hash: Option<DefinitionUpdate>,
    pub pattern: Option<DefinitionUpdate>,
}

pub struct GetLatestDefinitionsUseCase<D: DefinitionRepository> {
    pub definitions: D,
}

impl<D: DefinitionRepository> GetLatestDefinitionsUseCase<D> {
    pub async fn execute(&self) -> Result<LatestDefinitions, LicensingServiceError> {
        Ok(LatestDefinitions {
            hash: self.definitions.latest(Some(SignatureKind::Hash)).await?,
            pattern: self.definitions.latest(Some(SignatureKind::Pattern)).await?,
        })
    }
}

pub struct GetDefinitionsDocumentUseCase<D: DefinitionRepository> {
    pub definitions: D,
}

impl<D: DefinitionRepository> GetDefinitionsDocumentUseCase<D> {
    pub async fn execute(
        &self,
        kind: SignatureKind,
    ) -> Result<DefinitionUpdate, LicensingServiceError> {
        self.definitions
            .latest(Some(kind))
            .await?
            .ok_or(LicensingServiceError::DefinitionsNotFound)
    }
}

// ── CheckHash / ScanFile ─────────────────────────────────────────────────────

pub struct CheckHashUseCase<R: SignatureRepository> {
    pub repo: R,
}

impl<R: SignatureRepository> CheckHashUseCase<R> {
    pub async fn execute(&self, hash: &str) -> Result<ScanVerdict, LicensingServiceError> {
        let sha256 = normalize_sha256(hash).ok_or(LicensingServiceError::InvalidHash)?;
        match_digest(&self.repo, sha256).await
    }
}

pub struct ScanFileUseCase<R: SignatureRepository> {
    pub repo: R,
}

impl<R: SignatureRepository> ScanFileUseCase<R> {
    /// Hash the uploaded bytes and match the digest. Nothing is stored.
    pub async fn execute(&self, content: &[u8]) -> Result<ScanVerdict, LicensingServiceError> {
        let digest = hex::encode(Sha256::digest(content));
        let verdict = match_digest(&self.repo, digest).await?;
        if verdict.is_infected() {
            tracing::warn!(sha256 = %verdict.sha256, size = content.len(), "scanned file matched a signature");
        }
        Ok(verdict)
    }
}

/// `sha256` must already be normalized lowercase hex.
async fn match_digest<R: SignatureRepository>(
    repo: &R,
    sha256: String,
) -> Result<ScanVerdict, LicensingServiceError> {
    let threat = repo
        .find_by_hash(&sha256)
        .await?
        .map(|sig| (sig.name, sig.severity));
    Ok(ScanVerdict { sha256, threat })
}
