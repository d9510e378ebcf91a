use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, SqlErr, sea_query::Expr,
};
use uuid::Uuid;

use zari_licensing_schema::{admins, definition_updates, license_keys, virus_signatures};

use crate::domain::repository::{
    AdminRepository, DefinitionRepository, LicenseRepository, SignatureRepository,
};
use crate::domain::types::{
    Admin, DefinitionUpdate, LicenseFilter, LicenseKey, Severity, SignatureBody, SignatureKind,
    SignatureStats, VirusSignature,
};
use crate::error::LicensingServiceError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// ── License repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbLicenseRepository {
    pub db: DatabaseConnection,
}

fn filtered_licenses(
    filter: Option<LicenseFilter>,
    now: DateTime<Utc>,
) -> Select<license_keys::Entity> {
    let query = license_keys::Entity::find();
    match filter {
        None => query,
        Some(LicenseFilter::Active) => query.filter(license_keys::Column::ExpiresAt.gt(now)),
        Some(LicenseFilter::Expired) => query.filter(license_keys::Column::ExpiresAt.lte(now)),
        Some(LicenseFilter::Unbound) => query.filter(license_keys::Column::DeviceId.is_null()),
    }
}

impl LicenseRepository for DbLicenseRepository {
    async fn find_by_key(&self, key: &str) -> Result<Option<LicenseKey>, LicensingServiceError> {
        let model = license_keys::Entity::find()
            .filter(license_keys::Column::Key.eq(key))
            .one(&self.db)
            .await
            .context("find license by key")?;
        Ok(model.map(license_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LicenseKey>, LicensingServiceError> {
        let model = license_keys::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find license by id")?;
        Ok(model.map(license_from_model))
    }

    async fn insert(&self, license: &LicenseKey) -> Result<bool, LicensingServiceError> {
        let result = license_keys::ActiveModel {
            id: Set(license.id),
            key: Set(license.key.clone()),
            created_at: Set(license.created_at),
            expires_at: Set(license.expires_at),
            device_id: Set(license.device_id.clone()),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(anyhow::Error::new(err).context("insert license").into()),
        }
    }

    async fn update_device_id(
        &self,
        id: Uuid,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> Result<bool, LicensingServiceError> {
        // Single conditional UPDATE: the row changes only if it still holds `expected`.
        let query = license_keys::Entity::update_many()
            .col_expr(
                license_keys::Column::DeviceId,
                Expr::value(new.map(str::to_owned)),
            )
            .filter(license_keys::Column::Id.eq(id));
        let query = match expected {
            Some(current) => query.filter(license_keys::Column::DeviceId.eq(current)),
            None => query.filter(license_keys::Column::DeviceId.is_null()),
        };

        let result = query
            .exec(&self.db)
            .await
            .context("update license device id")?;
        Ok(result.rows_affected == 1)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, LicensingServiceError> {
        let result = license_keys::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete license")?;
        Ok(result.rows_affected > 0)
    }

    async fn list(
        &self,
        filter: Option<LicenseFilter>,
        now: DateTime<Utc>,
    ) -> Result<Vec<LicenseKey>, LicensingServiceError> {
        let models = filtered_licenses(filter, now)
            .order_by_asc(license_keys::Column::CreatedAt)
            .order_by_asc(license_keys::Column::Id)
            .all(&self.db)
            .await
            .context("list licenses")?;
        Ok(models.into_iter().map(license_from_model).collect())
    }

    async fn count(
        &self,
        filter: Option<LicenseFilter>,
        now: DateTime<Utc>,
    ) -> Result<u64, LicensingServiceError> {
        let count = filtered_licenses(filter, now)
            .count(&self.db)
            .await
            .context("count licenses")?;
        Ok(count)
    }
}

fn license_from_model(model: license_keys::Model) -> LicenseKey {
    LicenseKey {
        id: model.id,
        key: model.key,
        created_at: model.created_at,
        expires_at: model.expires_at,
        device_id: model.device_id,
    }
}

// ── Signature repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSignatureRepository {
    pub db: DatabaseConnection,
}

impl SignatureRepository for DbSignatureRepository {
    async fn find_by_hash(
        &self,
        hash_value: &str,
    ) -> Result<Option<VirusSignature>, LicensingServiceError> {
        let model = virus_signatures::Entity::find()
            .filter(virus_signatures::Column::SignatureType.eq(SignatureKind::Hash.as_str()))
            .filter(virus_signatures::Column::HashValue.eq(hash_value))
            .one(&self.db)
            .await
            .context("find signature by hash")?;
        Ok(model.map(signature_from_model).transpose()?)
    }

    async fn insert(&self, signature: &VirusSignature) -> Result<bool, LicensingServiceError> {
        let (hash_value, signature_id, pattern_data) = match &signature.body {
            SignatureBody::Hash { hash_value } => (Some(hash_value.clone()), None, None),
            SignatureBody::Pattern { signature_id, data } => (
                None,
                Some(signature_id.clone()),
                Some(serde_json::to_value(data).context("encode pattern data")?),
            ),
        };

        let result = virus_signatures::ActiveModel {
            id: Set(signature.id),
            name: Set(signature.name.clone()),
            signature_type: Set(signature.body.kind().as_str().to_owned()),
            hash_value: Set(hash_value),
            signature_id: Set(signature_id),
            pattern_data: Set(pattern_data),
            severity: Set(signature.severity.as_str().to_owned()),
            description: Set(signature.description.clone()),
            created_at: Set(signature.created_at),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(anyhow::Error::new(err).context("insert signature").into()),
        }
    }

    async fn pattern_ids(&self) -> Result<Vec<String>, LicensingServiceError> {
        let ids: Vec<Option<String>> = virus_signatures::Entity::find()
            .select_only()
            .column(virus_signatures::Column::SignatureId)
            .filter(virus_signatures::Column::SignatureType.eq(SignatureKind::Pattern.as_str()))
            .into_tuple()
            .all(&self.db)
            .await
            .context("list pattern signature ids")?;
        Ok(ids.into_iter().flatten().collect())
    }

    async fn list(
        &self,
        kind: Option<SignatureKind>,
    ) -> Result<Vec<VirusSignature>, LicensingServiceError> {
        let mut query = virus_signatures::Entity::find();
        if let Some(kind) = kind {
            query = query.filter(virus_signatures::Column::SignatureType.eq(kind.as_str()));
        }
        let models = query
            .order_by_asc(virus_signatures::Column::CreatedAt)
            .order_by_asc(virus_signatures::Column::Id)
            .all(&self.db)
            .await
            .context("list signatures")?;
        let signatures = models
            .into_iter()
            .map(signature_from_model)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(signatures)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VirusSignature>, LicensingServiceError> {
        let model = virus_signatures::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find signature by id")?;
        Ok(model.map(signature_from_model).transpose()?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, LicensingServiceError> {
        let result = virus_signatures::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete signature")?;
        Ok(result.rows_affected > 0)
    }

    async fn stats(&self) -> Result<SignatureStats, LicensingServiceError> {
        let db = &self.db;
        let count_kind = move |kind: SignatureKind| {
            virus_signatures::Entity::find()
                .filter(virus_signatures::Column::SignatureType.eq(kind.as_str()))
                .count(db)
        };
        let hash_based = count_kind(SignatureKind::Hash)
            .await
            .context("count hash signatures")?;
        let pattern_based = count_kind(SignatureKind::Pattern)
            .await
            .context("count pattern signatures")?;
        Ok(SignatureStats {
            total: hash_based + pattern_based,
            hash_based,
            pattern_based,
        })
    }
}

fn signature_from_model(model: virus_signatures::Model) -> anyhow::Result<VirusSignature> {
    let kind = SignatureKind::parse(&model.signature_type)
        .with_context(|| format!("unknown signature type {:?}", model.signature_type))?;
    let body = match kind {
        SignatureKind::Hash => SignatureBody::Hash {
            hash_value: model
                .hash_value
                .context("hash signature without hash value")?,
        },
        SignatureKind::Pattern => SignatureBody::Pattern {
            signature_id: model
                .signature_id
                .context("pattern signature without signature id")?,
            data: serde_json::from_value(
                model
                    .pattern_data
                    .context("pattern signature without pattern data")?,
            )
            .context("decode pattern data")?,
        },
    };

    Ok(VirusSignature {
        id: model.id,
        name: model.name,
        body,
        severity: Severity::parse(&model.severity).unwrap_or_default(),
        description: model.description,
        created_at: model.created_at,
    })
}

// ── Admin repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAdminRepository {
    pub db: DatabaseConnection,
}

impl AdminRepository for DbAdminRepository {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Admin>, LicensingServiceError> {
        let model = admins::Entity::find()
            .filter(admins::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find admin by username")?;
        Ok(model.map(admin_from_model))
    }

    async fn count(&self) -> Result<u64, LicensingServiceError> {
        let count = admins::Entity::find()
            .count(&self.db)
            .await
            .context("count admins")?;
        Ok(count)
    }

    async fn create(&self, admin: &Admin) -> Result<bool, LicensingServiceError> {
        let result = admins::ActiveModel {
            id: Set(admin.id),
            username: Set(admin.username.clone()),
            password_hash: Set(admin.password_hash.clone()),
            is_admin: Set(admin.is_admin),
            created_at: Set(admin.created_at),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(anyhow::Error::new(err).context("create admin").into()),
        }
    }

    async fn list(&self) -> Result<Vec<Admin>, LicensingServiceError> {
        let models = admins::Entity::find()
            .order_by_asc(admins::Column::CreatedAt)
            .order_by_asc(admins::Column::Id)
            .all(&self.db)
            .await
            .context("list admins")?;
        Ok(models.into_iter().map(admin_from_model).collect())
    }
}

fn admin_from_model(model: admins::Model) -> Admin {
    Admin {
        id: model.id,
        username: model.username,
        password_hash: model.password_hash,
        is_admin: model.is_admin,
        created_at: model.created_at,
    }
}

// ── Definition repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbDefinitionRepository {
    pub db: DatabaseConnection,
}

impl DefinitionRepository for DbDefinitionRepository {
    async fn insert(&self, update: &DefinitionUpdate) -> Result<(), LicensingServiceError> {
        definition_updates::ActiveModel {
            id: Set(update.id),
            version: Set(update.version.clone()),
            update_type: Set(update.kind.as_str().to_owned()),
            signature_count: Set(i64::try_from(update.signature_count).unwrap_or(i64::MAX)),
            document: Set(update.document.clone()),
            created_at: Set(update.created_at),
        }
        .insert(&self.db)
        .await
        .context("insert definition update")?;
        Ok(())
    }

    async fn latest(
        &self,
        kind: Option<SignatureKind>,
    ) -> Result<Option<DefinitionUpdate>, LicensingServiceError> {
        let mut query = definition_updates::Entity::find();
        if let Some(kind) = kind {
            query = query.filter(definition_updates::Column::UpdateType.eq(kind.as_str()));
        }
        let model = query
            .order_by_desc(definition_updates::Column::CreatedAt)
            .order_by_desc(definition_updates::Column::Id)
            .one(&self.db)
            .await
            .context("find latest definition update")?;
        Ok(model.map(definition_from_model).transpose()?)
    }
}

fn definition_from_model(model: definition_updates::Model) -> anyhow::Result<DefinitionUpdate> {
    let kind = SignatureKind::parse(&model.update_type)
        .with_context(|| format!("unknown definition update type {:?}", model.update_type))?;
    Ok(DefinitionUpdate {
        id: model.id,
        kind,
        version: model.version,
        signature_count: u64::try_from(model.signature_count).unwrap_or(0),
        document: model.document,
        created_at: model.created_at,
    })
}
