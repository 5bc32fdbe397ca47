// Postgres catalog. Runtime-checked queries only.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use gameshelf_common::{GameRef, NewGame, TaxonomyKind};

use crate::traits::{CapabilityCheck, CatalogStore};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to Postgres")?;
        Ok(Self::new(pool))
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run catalog migrations")?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct GameRow {
    id: Uuid,
    title: String,
}

impl From<GameRow> for GameRef {
    fn from(row: GameRow) -> Self {
        GameRef {
            id: row.id,
            title: row.title,
        }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_game_by_title(&self, title: &str) -> Result<Option<GameRef>> {
        let row = sqlx::query_as::<_, GameRow>("SELECT id, title FROM games WHERE title = $1 LIMIT 1")
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(GameRef::from))
    }

    async fn create_game(&self, game: &NewGame) -> Result<GameRef> {
        let o = &game.options;
        let row = sqlx::query_as::<_, GameRow>(
            r#"
            INSERT INTO games
                (title, description, image_url, bgg_id, bgg_url,
                 min_players, max_players, suggested_age,
                 play_time, difficulty, game_type, publisher_id,
                 is_coming_soon, is_for_sale, sale_price, sale_condition,
                 location_room, location_shelf, location_misc,
                 sleeved, upgraded_components, crowdfunded, inserts)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)
            RETURNING id, title
            "#,
        )
        .bind(&game.title)
        .bind(&game.description)
        .bind(&game.image_url)
        .bind(&game.bgg_id)
        .bind(&game.bgg_url)
        .bind(i32::try_from(game.min_players).unwrap_or(i32::MAX))
        .bind(i32::try_from(game.max_players).unwrap_or(i32::MAX))
        .bind(&game.suggested_age)
        .bind(game.play_time.label())
        .bind(game.difficulty.label())
        .bind(game.game_type.label())
        .bind(game.publisher_id)
        .bind(o.is_coming_soon)
        .bind(o.is_for_sale)
        .bind(o.sale_price)
        .bind(&o.sale_condition)
        .bind(&o.location_room)
        .bind(&o.location_shelf)
        .bind(&o.location_misc)
        .bind(o.sleeved)
        .bind(o.upgraded_components)
        .bind(o.crowdfunded)
        .bind(o.inserts)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn upsert_taxonomy(&self, kind: TaxonomyKind, name: &str) -> Result<Uuid> {
        // No-op update so RETURNING yields the existing row on conflict.
        let sql = format!(
            "INSERT INTO {} (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id",
            kind.table()
        );
        let id = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn link_mechanics(&self, game_id: Uuid, mechanic_ids: &[Uuid]) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO game_mechanics (game_id, mechanic_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(game_id)
        .bind(mechanic_ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CapabilityCheck for PgCatalogStore {
    async fn is_admin(&self, caller: Uuid) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i32>(
            "SELECT 1 FROM user_roles WHERE user_id = $1 AND role = $2 LIMIT 1",
        )
        .bind(caller)
        .bind(ADMIN_ROLE)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }
}
