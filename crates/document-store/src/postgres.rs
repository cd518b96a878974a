use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

use crate::{
    Condition, Document, DocumentId, Filter, ID_FIELD, Result, StoreError, UpdateAck,
    UpdatePatch, store::DocumentStore,
};

/// PostgreSQL-backed document store implementation.
///
/// All collections share one `documents` table with a JSONB body. The
/// `seq` column preserves insertion order.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

/// A positional parameter produced while translating a filter.
enum Param {
    Id(Uuid),
    Ids(Vec<Uuid>),
    Path(Vec<String>),
    Json(Value),
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Translates a filter into a WHERE clause. `$1` is always the collection.
    fn where_clause(filter: &Filter) -> (String, Vec<Param>) {
        let mut sql = String::from("collection = $1");
        let mut params = Vec::new();

        for condition in filter.conditions() {
            match condition {
                Condition::IdEq(id) => {
                    params.push(Param::Id(id.as_uuid()));
                    sql.push_str(&format!(" AND id = ${}", params.len() + 1));
                }
                Condition::IdIn(ids) => {
                    params.push(Param::Ids(ids.iter().map(DocumentId::as_uuid).collect()));
                    sql.push_str(&format!(" AND id = ANY(${})", params.len() + 1));
                }
                Condition::FieldEq { path, value } => {
                    params.push(Param::Path(path.split('.').map(str::to_string).collect()));
                    let path_param = params.len() + 1;
                    params.push(Param::Json(value.clone()));
                    let value_param = params.len() + 1;
                    sql.push_str(&format!(
                        " AND body #> ${path_param}::text[] = ${value_param}::jsonb"
                    ));
                }
            }
        }

        (sql, params)
    }

    fn bind_params<'q>(
        mut query: Query<'q, Postgres, PgArguments>,
        collection: &'q str,
        params: Vec<Param>,
    ) -> Query<'q, Postgres, PgArguments> {
        query = query.bind(collection);
        for param in params {
            query = match param {
                Param::Id(id) => query.bind(id),
                Param::Ids(ids) => query.bind(ids),
                Param::Path(path) => query.bind(path),
                Param::Json(value) => query.bind(value),
            };
        }
        query
    }

    fn row_to_document(row: &PgRow) -> Result<Document> {
        let body: Value = row.try_get("body")?;
        Document::from_value(body)
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<DocumentId> {
        let id = match document.get(ID_FIELD) {
            Some(_) => document.require_id()?,
            None => {
                let id = DocumentId::new();
                document.set_id(id);
                id
            }
        };

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(collection)
        .bind(id.as_uuid())
        .bind(document.into_value())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_collection_id")
            {
                return StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    id,
                };
            }
            StoreError::Database(e)
        })?;

        tracing::debug!(collection, %id, "document inserted");
        Ok(id)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let (clause, params) = Self::where_clause(filter);
        let sql = format!("SELECT body FROM documents WHERE {clause} ORDER BY seq ASC LIMIT 1");

        let row = Self::bind_params(sqlx::query(&sql), collection, params)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_document).transpose()
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        let (clause, params) = Self::where_clause(filter);
        let sql = format!("SELECT body FROM documents WHERE {clause} ORDER BY seq ASC");

        let rows = Self::bind_params(sqlx::query(&sql), collection, params)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_document).collect()
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &UpdatePatch,
    ) -> Result<UpdateAck> {
        patch.validate()?;

        let (clause, params) = Self::where_clause(filter);
        let sql = format!(
            "SELECT seq, body FROM documents WHERE {clause} ORDER BY seq ASC LIMIT 1 FOR UPDATE"
        );

        let mut tx = self.pool.begin().await?;

        let Some(row) = Self::bind_params(sqlx::query(&sql), collection, params)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(UpdateAck::unmatched());
        };

        let seq: i64 = row.try_get("seq")?;
        let mut document = Self::row_to_document(&row)?;

        let modified = patch.apply_to(&mut document);
        if modified {
            sqlx::query("UPDATE documents SET body = $1 WHERE seq = $2")
                .bind(document.into_value())
                .bind(seq)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(UpdateAck {
            matched: 1,
            modified: u64::from(modified),
        })
    }
}
