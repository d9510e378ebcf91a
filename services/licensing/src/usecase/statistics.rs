use crate::domain::repository::{
    Clock, DefinitionRepository, LicenseRepository, SignatureRepository,
};
use crate::domain::types::{DefinitionUpdate, LicenseFilter, LicenseStats, SignatureStats};
use crate::error::LicensingServiceError;

#[derive(Debug)]
pub struct Statistics {
    pub licenses: LicenseStats,
    pub signatures: SignatureStats,
    /// Most recent definitions generation of either kind.
    pub latest_definitions: Option<DefinitionUpdate>,
}

pub struct GetStatisticsUseCase<L, S, D, C>
where
    L: LicenseRepository,
    S: SignatureRepository,
    D: DefinitionRepository,
    C: Clock,
{
    pub licenses: L,
    pub signatures: S,
    pub definitions: D,
    pub clock: C,
}

impl<L, S, D, C> GetStatisticsUseCase<L, S, D, C>
where
    L: LicenseRepository,
    S: SignatureRepository,
    D: DefinitionRepository,
    C: Clock,
{
    pub async fn execute(&self) -> Result<Statistics, LicensingServiceError> {
        let now = self.clock.now();
        let total = self.licenses.count(None, now).await?;
        let active = self
            .licenses
            .count(Some(LicenseFilter::Active), now)
            .await?;
        let unbound = self
            .licenses
            .count(Some(LicenseFilter::Unbound), now)
            .await?;

        Ok(Statistics {
            licenses: LicenseStats {
                total,
                active,
                bound: total.saturating_sub(unbound),
            },
            signatures: self.signatures.stats().await?,
            latest_definitions: self.definitions.latest(None).await?,
        })
    }
}
