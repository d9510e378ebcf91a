use anyhow::anyhow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::repository::{Clock, KeyGenerator, LicenseRepository};
use crate::domain::types::{
    DEFAULT_LICENSE_DAYS, LicenseFilter, LicenseKey, MAX_BIND_ATTEMPTS, MAX_DEVICE_ID_LEN,
    MAX_KEY_ATTEMPTS, VerificationResult, VerifyFailure, license_expiry,
};
use crate::error::LicensingServiceError;

// ── CreateLicense ────────────────────────────────────────────────────────────

pub struct CreateLicenseInput {
    /// Defaults to [`DEFAULT_LICENSE_DAYS`].
    pub duration_days: Option<u32>,
}

pub struct CreateLicenseUseCase<R, C, G>
where
    R: LicenseRepository,
    C: Clock,
    G: KeyGenerator,
{
    pub repo: R,
    pub clock: C,
    pub keys: G,
}

impl<R, C, G> CreateLicenseUseCase<R, C, G>
where
    R: LicenseRepository,
    C: Clock,
    G: KeyGenerator,
{
    pub async fn execute(
        &self,
        input: CreateLicenseInput,
    ) -> Result<LicenseKey, LicensingServiceError> {
        let days = input.duration_days.unwrap_or(DEFAULT_LICENSE_DAYS);
        let now = self.clock.now();
        let expires_at = license_expiry(now, days).ok_or(LicensingServiceError::InvalidDuration)?;

        for _ in 0..MAX_KEY_ATTEMPTS {
            let key = self.keys.generate();
            if self.repo.find_by_key(&key).await?.is_some() {
                continue;
            }

            let license = LicenseKey {
                id: Uuid::now_v7(),
                key,
                created_at: now,
                expires_at,
                device_id: None,
            };
            // `false` means a concurrent insert took the key between lookup and insert.
            if self.repo.insert(&license).await? {
                tracing::info!(license_id = %license.id, days, "license created");
                return Ok(license);
            }
        }

        Err(anyhow!("no unique license key after {MAX_KEY_ATTEMPTS} attempts").into())
    }
}

// ── VerifyLicense ────────────────────────────────────────────────────────────

pub struct VerifyLicenseInput {
    pub key: String,
    /// Empty or whitespace-only values count as absent.
    pub device_id: Option<String>,
}

pub struct VerifyLicenseUseCase<R: LicenseRepository, C: Clock> {
    pub repo: R,
    pub clock: C,
}

impl<R: LicenseRepository, C: Clock> VerifyLicenseUseCase<R, C> {
    pub async fn execute(
        &self,
        input: VerifyLicenseInput,
    ) -> Result<VerificationResult, LicensingServiceError> {
        let key = input.key.trim();
        if key.is_empty() {
            return Err(LicensingServiceError::MissingLicenseKey);
        }
        let device_id = input
            .device_id
            .as_deref()
            .filter(|d| !d.trim().is_empty());
        if device_id.is_some_and(|d| d.chars().count() > MAX_DEVICE_ID_LEN) {
            return Err(LicensingServiceError::InvalidDeviceId);
        }

        let Some(mut license) = self.repo.find_by_key(key).await? else {
            return Ok(VerificationResult::Invalid(VerifyFailure::NotFound));
        };

        for _ in 0..MAX_BIND_ATTEMPTS {
            if !license.is_active(self.clock.now()) {
                return Ok(VerificationResult::Invalid(VerifyFailure::Expired));
            }

            match (license.device_id.as_deref(), device_id) {
                (None, None) => return Ok(valid(&license)),
                (None, Some(device)) => {
                    if self
                        .repo
                        .update_device_id(license.id, None, Some(device))
                        .await?
                    {
                        tracing::info!(license_id = %license.id, "license bound to device");
                        return Ok(valid(&license));
                    }
                    // Lost the binding race (or the row went away): judge the stored state.
                    match self.repo.find_by_id(license.id).await? {
                        Some(current) => license = current,
                        None => return Ok(VerificationResult::Invalid(VerifyFailure::NotFound)),
                    }
                }
                (Some(bound), Some(device)) if bound == device => return Ok(valid(&license)),
                (Some(_), _) => return Ok(device_mismatch(&license)),
            }
        }

        Ok(device_mismatch(&license))
    }
}

fn valid(license: &LicenseKey) -> VerificationResult {
    VerificationResult::Valid {
        expires_at: license.expires_at,
    }
}

fn device_mismatch(license: &LicenseKey) -> VerificationResult {
    tracing::warn!(license_id = %license.id, "license verification from another device");
    VerificationResult::Invalid(VerifyFailure::DeviceMismatch)
}

// ── RevokeLicense ────────────────────────────────────────────────────────────

pub struct RevokeLicenseUseCase<R: LicenseRepository> {
    pub repo: R,
}

impl<R: LicenseRepository> RevokeLicenseUseCase<R> {
    /// Clear the device binding. Revoking an unbound license is a no-op.
    pub async fn execute(&self, id: Uuid) -> Result<(), LicensingServiceError> {
        for _ in 0..MAX_BIND_ATTEMPTS {
            let license = self
                .repo
                .find_by_id(id)
                .await?
                .ok_or(LicensingServiceError::LicenseNotFound)?;

            let Some(bound) = license.device_id.as_deref() else {
                return Ok(());
            };
            if self.repo.update_device_id(id, Some(bound), None).await? {
                tracing::info!(license_id = %id, "license device binding revoked");
                return Ok(());
            }
        }

        Err(anyhow!("license {id} binding kept changing during revoke").into())
    }
}

// ── DeleteLicense ────────────────────────────────────────────────────────────

pub struct DeleteLicenseUseCase<R: LicenseRepository> {
    pub repo: R,
}

impl<R: LicenseRepository> DeleteLicenseUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(), LicensingServiceError> {
        if !self.repo.delete(id).await? {
            return Err(LicensingServiceError::LicenseNotFound);
        }
        tracing::info!(license_id = %id, "license deleted");
        Ok(())
    }
}

// ── ListLicenses ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ListLicensesOutput {
    /// Instant the filter was evaluated at; use it for derived flags.
    pub evaluated_at: DateTime<Utc>,
    pub licenses: Vec<LicenseKey>,
}

pub struct ListLicensesUseCase<R: LicenseRepository, C: Clock> {
    pub repo: R,
    pub clock: C,
}

impl<R: LicenseRepository, C: Clock> ListLicensesUseCase<R, C> {
    pub async fn execute(
        &self,
        filter: Option<LicenseFilter>,
    ) -> Result<ListLicensesOutput, LicensingServiceError> {
        let now = self.clock.now();
        let licenses = self.repo.list(filter, now).await?;
        Ok(ListLicensesOutput {
            evaluated_at: now,
            licenses,
        })
    }
}
