//! Repository for the `achievements` catalog.

use sqlx::PgPool;

use hodlboard_core::types::DbId;

use crate::models::achievement::{
    Achievement, BulkUpdateAchievements, CreateAchievement, UpdateAchievement,
};

/// Column list for `achievements` queries.
const COLUMNS: &str = "id, key, name, description, category, tier, trigger_type, \
     trigger_config, reward_xp, reward_tokens, reward_reputation, badge_key, \
     title_key, is_active, is_secret, is_retroactive, created_at, updated_at";

/// Optional filters for the catalog listing.
#[derive(Debug, Default)]
pub struct AchievementFilter {
    pub category: Option<String>,
    pub tier: Option<i16>,
    pub trigger_type: Option<String>,
    pub is_active: Option<bool>,
    pub is_secret: Option<bool>,
    /// Case-insensitive substring match over key, name, and description.
    pub search: Option<String>,
}

/// Provides CRUD operations over achievement definitions.
pub struct AchievementRepo;

impl AchievementRepo {
    /// Insert a new definition, returning the stored row.
    pub async fn insert(
        pool: &PgPool,
        def: &CreateAchievement,
    ) -> Result<Achievement, sqlx::Error> {
        let query = format!(
            "INSERT INTO achievements \
                (key, name, description, category, tier, trigger_type, trigger_config, \
                 reward_xp, reward_tokens, reward_reputation, badge_key, title_key, \
                 is_active, is_secret, is_retroactive) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Achievement>(&query)
            .bind(&def.key)
            .bind(&def.name)
            .bind(&def.description)
            .bind(&def.category)
            .bind(def.tier)
            .bind(&def.trigger_type)
            .bind(&def.trigger_config)
            .bind(def.reward_xp)
            .bind(def.reward_tokens)
            .bind(def.reward_reputation)
            .bind(&def.badge_key)
            .bind(&def.title_key)
            .bind(def.is_active)
            .bind(def.is_secret)
            .bind(def.is_retroactive)
            .fetch_one(pool)
            .await
    }

    /// Partially update a definition. `key` is immutable and not updatable.
    ///
    /// Returns the updated row, or `None` if the ID does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        patch: &UpdateAchievement,
    ) -> Result<Option<Achievement>, sqlx::Error> {
        let query = format!(
            "UPDATE achievements SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                category = COALESCE($4, category), \
                tier = COALESCE($5, tier), \
                trigger_type = COALESCE($6, trigger_type), \
                trigger_config = COALESCE($7, trigger_config), \
                reward_xp = COALESCE($8, reward_xp), \
                reward_tokens = COALESCE($9, reward_tokens), \
                reward_reputation = COALESCE($10, reward_reputation), \
                badge_key = COALESCE($11, badge_key), \
                title_key = COALESCE($12, title_key), \
                is_active = COALESCE($13, is_active), \
                is_secret = COALESCE($14, is_secret), \
                is_retroactive = COALESCE($15, is_retroactive), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Achievement>(&query)
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.description)
            .bind(&patch.category)
            .bind(patch.tier)
            .bind(&patch.trigger_type)
            .bind(&patch.trigger_config)
            .bind(patch.reward_xp)
            .bind(patch.reward_tokens)
            .bind(patch.reward_reputation)
            .bind(&patch.badge_key)
            .bind(&patch.title_key)
            .bind(patch.is_active)
            .bind(patch.is_secret)
            .bind(patch.is_retroactive)
            .fetch_optional(pool)
            .await
    }

    /// Fetch one definition by ID.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<Achievement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM achievements WHERE id = $1");
        sqlx::query_as::<_, Achievement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch one definition by its stable key.
    pub async fn get_by_key(pool: &PgPool, key: &str) -> Result<Option<Achievement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM achievements WHERE key = $1");
        sqlx::query_as::<_, Achievement>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// List all active definitions (the trigger resolver's working set).
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Achievement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM achievements WHERE is_active ORDER BY category, tier, key"
        );
        sqlx::query_as::<_, Achievement>(&query).fetch_all(pool).await
    }

    /// List definitions with optional filters and pagination.
    pub async fn list(
        pool: &PgPool,
        filter: &AchievementFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Achievement>, sqlx::Error> {
        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if filter.category.is_some() {
            conditions.push(format!("category = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.tier.is_some() {
            conditions.push(format!("tier = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.trigger_type.is_some() {
            conditions.push(format!("trigger_type = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.is_active.is_some() {
            conditions.push(format!("is_active = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.is_secret.is_some() {
            conditions.push(format!("is_secret = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.search.is_some() {
            conditions.push(format!(
                "(key ILIKE ${bind_idx} OR name ILIKE ${bind_idx} OR description ILIKE ${bind_idx})"
            ));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM achievements \
             {where_clause} \
             ORDER BY category, tier, key \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Achievement>(&query);

        if let Some(category) = &filter.category {
            q = q.bind(category);
        }
        if let Some(tier) = filter.tier {
            q = q.bind(tier);
        }
        if let Some(trigger_type) = &filter.trigger_type {
            q = q.bind(trigger_type);
        }
        if let Some(is_active) = filter.is_active {
            q = q.bind(is_active);
        }
        if let Some(is_secret) = filter.is_secret {
            q = q.bind(is_secret);
        }
        if let Some(search) = &filter.search {
            q = q.bind(format!("%{search}%"));
        }

        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Apply a bulk patch to a list of definitions. Returns rows affected.
    pub async fn bulk_update(
        pool: &PgPool,
        patch: &BulkUpdateAchievements,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE achievements SET \
                is_active = COALESCE($2, is_active), \
                is_secret = COALESCE($3, is_secret), \
                category = COALESCE($4, category), \
                tier = COALESCE($5, tier), \
                updated_at = now() \
             WHERE id = ANY($1)",
        )
        .bind(&patch.ids)
        .bind(patch.is_active)
        .bind(patch.is_secret)
        .bind(&patch.category)
        .bind(patch.tier)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Soft-deactivate a definition, preserving completion history.
    ///
    /// Returns `true` if a row was deactivated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE achievements SET is_active = FALSE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
