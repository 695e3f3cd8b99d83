use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::catalog::{Catalog, CareerRow, InstitutionRow, ProjectRow};
use crate::models::conversation::{ConversationSession, ConversationTurn, NewSession, NewTurn};
use crate::models::user::{ApplicationRow, StudentGraph, StudentProfileRow, User};
use crate::store::{ChatStore, StoreError};

const TURN_COLUMNS: &str = "id, conversation_id, user_message, bot_response, timestamp";
const SESSION_COLUMNS: &str = "id, conversation_id, user_id, start_time, end_time";

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgChatStore {
    pool: PgPool,
}

impl PgChatStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the connection pool and checks it with one round trip.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        info!("Connecting to PostgreSQL (max {max_connections} connections)...");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn find_user(&self, user_id: i32) -> Result<Option<User>, StoreError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT id, first_name, last_name FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_session(
        &self,
        session: NewSession,
        seed: NewTurn,
    ) -> Result<ConversationSession, StoreError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, ConversationSession>(&format!(
            r#"
            INSERT INTO conversation_sessions (id, conversation_id, user_id, start_time)
            VALUES ($1, $2, $3, $4)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&session.conversation_id)
        .bind(session.user_id)
        .bind(session.start_time)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO conversation_turns
                (id, conversation_id, user_message, bot_response, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&seed.conversation_id)
        .bind(&seed.user_message)
        .bind(&seed.bot_response)
        .bind(seed.timestamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Created conversation {} for user {}",
            created.conversation_id, created.user_id
        );
        Ok(created)
    }

    async fn find_owned_session(
        &self,
        conversation_id: &str,
        user_id: i32,
    ) -> Result<Option<ConversationSession>, StoreError> {
        Ok(sqlx::query_as::<_, ConversationSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM conversation_sessions \
             WHERE conversation_id = $1 AND user_id = $2"
        ))
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_turn(&self, turn: NewTurn) -> Result<ConversationTurn, StoreError> {
        Ok(sqlx::query_as::<_, ConversationTurn>(&format!(
            r#"
            INSERT INTO conversation_turns
                (id, conversation_id, user_message, bot_response, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TURN_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&turn.conversation_id)
        .bind(&turn.user_message)
        .bind(&turn.bot_response)
        .bind(turn.timestamp)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_turns(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        // seq breaks timestamp ties in insert order
        Ok(sqlx::query_as::<_, ConversationTurn>(&format!(
            "SELECT {TURN_COLUMNS} FROM conversation_turns \
             WHERE conversation_id = $1 ORDER BY timestamp ASC, seq ASC"
        ))
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn recent_turns(
        &self,
        conversation_id: &str,
        limit: i64,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        Ok(sqlx::query_as::<_, ConversationTurn>(&format!(
            "SELECT {TURN_COLUMNS} FROM conversation_turns \
             WHERE conversation_id = $1 ORDER BY timestamp DESC, seq DESC LIMIT $2"
        ))
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_session(&self, conversation_id: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let turns = sqlx::query("DELETE FROM conversation_turns WHERE conversation_id = $1")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM conversation_sessions WHERE conversation_id = $1")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        // Dropping `tx` without commit rolls both deletes back.
        tx.commit().await?;

        info!("Deleted conversation {conversation_id} ({turns} turns)");
        Ok(())
    }

    async fn student_graph(&self, user_id: i32) -> Result<Option<StudentGraph>, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let user = sqlx::query_as::<_, User>(
            "SELECT id, first_name, last_name FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user) = user else {
            tx.rollback().await?;
            return Ok(None);
        };

        let profile = sqlx::query_as::<_, StudentProfileRow>(
            r#"
            SELECT p.academic_year,
                   c.name AS career_name,
                   s.name AS school_name
            FROM user_profiles p
            LEFT JOIN careers c ON c.id = p.career_id
            LEFT JOIN schools s ON s.id = c.school_id
            WHERE p.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let skills: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT sk.description
            FROM user_skills us
            JOIN skills sk ON sk.id = us.skill_id
            WHERE us.user_id = $1
            ORDER BY sk.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        let applications = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT pr.name AS project_name,
                   i.name AS institution_name,
                   a.status
            FROM student_applications a
            JOIN institution_projects pr ON pr.id = a.project_id
            JOIN institutions i ON i.id = pr.institution_id
            WHERE a.user_id = $1
            ORDER BY a.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(StudentGraph {
            user,
            profile,
            skills,
            applications,
        }))
    }

    async fn catalog(&self) -> Result<Catalog, StoreError> {
        let projects = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT pr.id, pr.name, i.name AS institution_name
            FROM institution_projects pr
            JOIN institutions i ON i.id = pr.institution_id
            ORDER BY pr.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let institutions =
            sqlx::query_as::<_, InstitutionRow>("SELECT id, name FROM institutions ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        let careers = sqlx::query_as::<_, CareerRow>(
            r#"
            SELECT c.id, c.name, s.name AS school_name
            FROM careers c
            LEFT JOIN schools s ON s.id = c.school_id
            ORDER BY c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(Catalog {
            projects,
            institutions,
            careers,
        })
    }
}
