use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Generation, GenerationUpdate, NewGeneration, PresetLora, PresetLoraInput, Profile,
};

const GENERATION_COLUMNS: &str = "id, user_id, tool_type, tool_name, generation_name, status::text AS status, \
     input_data, output_file_url, thumbnail_url, metadata, tokens_used, created_at, completed_at, \
     error_message, deleted_at, COALESCE(is_favorite, false) AS is_favorite, \
     COALESCE(showcased, false) AS showcased";

const PROFILE_COLUMNS: &str = "id, email, COALESCE(tokens, 0) AS tokens, \
     COALESCE(purchased_tokens, 0) AS purchased_tokens, subscription_tier, \
     COALESCE(is_admin, false) AS is_admin, COALESCE(banned, false) AS banned, ban_reason, banned_at";

const LORA_COLUMNS: &str = "id, title, description, path, weight_name, \
     COALESCE(tool_types, '{}') AS tool_types, COALESCE(tier_access, '{}') AS tier_access, \
     COALESCE(default_scale, 1.0)::float8 AS default_scale, COALESCE(trigger_words, '{}') AS trigger_words, \
     category, COALESCE(sort_order, 0) AS sort_order, COALESCE(is_active, true) AS is_active, created_at";

/// Rows of `ai_generations`. Every call is scoped to the owning user.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    async fn insert(&self, new: NewGeneration) -> Result<Generation, DatabaseError>;

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<Generation>, DatabaseError>;

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: GenerationUpdate,
    ) -> Result<Generation, DatabaseError>;

    /// Every non-deleted row, newest first. Source for upload extraction.
    async fn list_history(&self, user_id: Uuid) -> Result<Vec<Generation>, DatabaseError>;

    /// Completed, non-deleted rows with an output, newest first, optionally limited to tool types
    async fn list_completed(
        &self,
        user_id: Uuid,
        tool_types: Option<Vec<String>>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Generation>, DatabaseError>;

    async fn set_favorite(
        &self,
        id: Uuid,
        user_id: Uuid,
        favorite: bool,
    ) -> Result<Generation, DatabaseError>;

    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> Result<(), DatabaseError>;

    // Admin access below is not scoped to an owner.

    /// Every row of one user, soft-deleted included, newest first
    async fn list_user_all(&self, user_id: Uuid) -> Result<Vec<Generation>, DatabaseError>;

    /// Newest rows across all users
    async fn list_recent(&self, limit: i64) -> Result<Vec<Generation>, DatabaseError>;

    /// Row count per user, soft-deleted included
    async fn count_by_user(&self) -> Result<HashMap<Uuid, i64>, DatabaseError>;

    async fn set_showcased(&self, id: Uuid, showcased: bool) -> Result<Generation, DatabaseError>;

    /// Hard delete
    async fn purge(&self, id: Uuid) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<Profile>, DatabaseError>;

    /// Every profile, newest account first
    async fn list_all(&self) -> Result<Vec<Profile>, DatabaseError>;

    /// Returns the balance left after the deduction
    async fn deduct_tokens(&self, user_id: Uuid, amount: i32) -> Result<i64, DatabaseError>;

    async fn ban(&self, user_id: Uuid, reason: &str, admin_id: Uuid) -> Result<Profile, DatabaseError>;

    async fn unban(&self, user_id: Uuid, admin_id: Uuid) -> Result<Profile, DatabaseError>;
}

#[async_trait]
pub trait LoraStore: Send + Sync {
    /// All presets ordered by sort_order, then title
    async fn list(&self) -> Result<Vec<PresetLora>, DatabaseError>;

    async fn list_active(&self) -> Result<Vec<PresetLora>, DatabaseError>;

    async fn create(&self, input: PresetLoraInput) -> Result<PresetLora, DatabaseError>;

    async fn update(&self, id: Uuid, input: PresetLoraInput) -> Result<PresetLora, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;

    async fn set_active(&self, id: Uuid, active: bool) -> Result<PresetLora, DatabaseError>;
}

fn not_found(err: sqlx::Error, what: &str) -> DatabaseError {
    match err {
        sqlx::Error::RowNotFound => DatabaseError::NotFound(format!("{} not found", what)),
        other => DatabaseError::Sqlx(other),
    }
}

pub struct PgGenerationStore {
    pool: PgPool,
}

impl PgGenerationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenerationStore for PgGenerationStore {
    async fn insert(&self, new: NewGeneration) -> Result<Generation, DatabaseError> {
        let sql = format!(
            "INSERT INTO ai_generations (user_id, tool_type, tool_name, generation_name, status, input_data, tokens_used) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            GENERATION_COLUMNS
        );
        let row = sqlx::query_as::<_, Generation>(&sql)
            .bind(new.user_id)
            .bind(&new.tool_type)
            .bind(&new.tool_name)
            .bind(&new.generation_name)
            .bind(new.status.as_str())
            .bind(&new.input_data)
            .bind(new.tokens_used)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<Generation>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM ai_generations WHERE id = $1 AND user_id = $2",
            GENERATION_COLUMNS
        );
        let row = sqlx::query_as::<_, Generation>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: GenerationUpdate,
    ) -> Result<Generation, DatabaseError> {
        let sql = format!(
            "UPDATE ai_generations SET \
                status = COALESCE($3, status), \
                metadata = COALESCE($4, metadata), \
                error_message = COALESCE($5, error_message), \
                completed_at = COALESCE($6, completed_at) \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            GENERATION_COLUMNS
        );
        sqlx::query_as::<_, Generation>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(update.status.map(|s| s.as_str()))
            .bind(update.metadata)
            .bind(update.error_message)
            .bind(update.completed_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found(e, "Generation"))
    }

    async fn list_history(&self, user_id: Uuid) -> Result<Vec<Generation>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM ai_generations WHERE user_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at DESC",
            GENERATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, Generation>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_completed(
        &self,
        user_id: Uuid,
        tool_types: Option<Vec<String>>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Generation>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM ai_generations \
             WHERE user_id = $1 AND status = 'completed' AND output_file_url IS NOT NULL \
               AND deleted_at IS NULL AND ($2::text[] IS NULL OR tool_type = ANY($2)) \
             ORDER BY created_at DESC OFFSET $3 LIMIT $4",
            GENERATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, Generation>(&sql)
            .bind(user_id)
            .bind(tool_types)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn set_favorite(
        &self,
        id: Uuid,
        user_id: Uuid,
        favorite: bool,
    ) -> Result<Generation, DatabaseError> {
        let sql = format!(
            "UPDATE ai_generations SET is_favorite = $3 \
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL RETURNING {}",
            GENERATION_COLUMNS
        );
        sqlx::query_as::<_, Generation>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(favorite)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found(e, "Generation"))
    }

    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE ai_generations SET deleted_at = $3 \
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Generation not found".to_string()));
        }
        Ok(())
    }

    async fn list_user_all(&self, user_id: Uuid) -> Result<Vec<Generation>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM ai_generations WHERE user_id = $1 ORDER BY created_at DESC",
            GENERATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, Generation>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Generation>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM ai_generations ORDER BY created_at DESC LIMIT $1",
            GENERATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, Generation>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_by_user(&self) -> Result<HashMap<Uuid, i64>, DatabaseError> {
        let rows: Vec<(Uuid, i64)> =
            sqlx::query_as("SELECT user_id, COUNT(*) FROM ai_generations GROUP BY user_id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    async fn set_showcased(&self, id: Uuid, showcased: bool) -> Result<Generation, DatabaseError> {
        let sql = format!(
            "UPDATE ai_generations SET showcased = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            GENERATION_COLUMNS
        );
        sqlx::query_as::<_, Generation>(&sql)
            .bind(id)
            .bind(showcased)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found(e, "Generation"))
    }

    async fn purge(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM ai_generations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Generation not found".to_string()));
        }
        Ok(())
    }
}

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, user_id: Uuid) -> Result<Profile, DatabaseError> {
        ProfileStore::get(self, user_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        let row = sqlx::query_as::<_, Profile>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<Profile>, DatabaseError> {
        let sql = format!("SELECT {} FROM profiles ORDER BY created_at DESC", PROFILE_COLUMNS);
        Ok(sqlx::query_as::<_, Profile>(&sql).fetch_all(&self.pool).await?)
    }

    async fn deduct_tokens(&self, user_id: Uuid, amount: i32) -> Result<i64, DatabaseError> {
        let result: Value = sqlx::query_scalar(
            "SELECT to_jsonb(deduct_user_tokens(target_user_id => $1, tokens_to_deduct => $2))",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(&self.pool)
        .await?;

        if let Some(err) = result.get("error").and_then(Value::as_str) {
            return Err(DatabaseError::QueryError(err.to_string()));
        }
        result
            .get("new_total_tokens")
            .and_then(Value::as_i64)
            .ok_or_else(|| DatabaseError::QueryError("deduct_user_tokens returned no balance".to_string()))
    }

    async fn ban(&self, user_id: Uuid, reason: &str, admin_id: Uuid) -> Result<Profile, DatabaseError> {
        sqlx::query(
            "SELECT admin_ban_user(target_user_id => $1, ban_reason_text => $2, admin_user_id => $3)",
        )
        .bind(user_id)
        .bind(reason)
        .bind(admin_id)
        .execute(&self.pool)
        .await?;
        self.fetch(user_id).await
    }

    async fn unban(&self, user_id: Uuid, admin_id: Uuid) -> Result<Profile, DatabaseError> {
        sqlx::query("SELECT admin_unban_user(target_user_id => $1, admin_user_id => $2)")
            .bind(user_id)
            .bind(admin_id)
            .execute(&self.pool)
            .await?;
        self.fetch(user_id).await
    }
}

pub struct PgLoraStore {
    pool: PgPool,
}

impl PgLoraStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoraStore for PgLoraStore {
    async fn list(&self) -> Result<Vec<PresetLora>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM preset_loras ORDER BY sort_order ASC, title ASC",
            LORA_COLUMNS
        );
        Ok(sqlx::query_as::<_, PresetLora>(&sql).fetch_all(&self.pool).await?)
    }

    async fn list_active(&self) -> Result<Vec<PresetLora>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM preset_loras WHERE is_active = true ORDER BY sort_order ASC, title ASC",
            LORA_COLUMNS
        );
        Ok(sqlx::query_as::<_, PresetLora>(&sql).fetch_all(&self.pool).await?)
    }

    async fn create(&self, input: PresetLoraInput) -> Result<PresetLora, DatabaseError> {
        let sql = format!(
            "INSERT INTO preset_loras (title, description, path, weight_name, tool_types, tier_access, \
                default_scale, trigger_words, category, sort_order, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
            LORA_COLUMNS
        );
        let row = sqlx::query_as::<_, PresetLora>(&sql)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.path)
            .bind(&input.weight_name)
            .bind(&input.tool_types)
            .bind(&input.tier_access)
            .bind(input.default_scale)
            .bind(&input.trigger_words)
            .bind(&input.category)
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, input: PresetLoraInput) -> Result<PresetLora, DatabaseError> {
        let sql = format!(
            "UPDATE preset_loras SET title = $2, description = $3, path = $4, weight_name = $5, \
                tool_types = $6, tier_access = $7, default_scale = $8, trigger_words = $9, \
                category = $10, sort_order = $11, is_active = $12, updated_at = now() \
             WHERE id = $1 RETURNING {}",
            LORA_COLUMNS
        );
        sqlx::query_as::<_, PresetLora>(&sql)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.path)
            .bind(&input.weight_name)
            .bind(&input.tool_types)
            .bind(&input.tier_access)
            .bind(input.default_scale)
            .bind(&input.trigger_words)
            .bind(&input.category)
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found(e, "LoRA"))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM preset_loras WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("LoRA not found".to_string()));
        }
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<PresetLora, DatabaseError> {
        let sql = format!(
            "UPDATE preset_loras SET is_active = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            LORA_COLUMNS
        );
        sqlx::query_as::<_, PresetLora>(&sql)
            .bind(id)
            .bind(active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found(e, "LoRA"))
    }
}
