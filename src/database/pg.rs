//! Postgres-backed `ArchiveStore`.
//!
//! Runtime queries only; dynamic listing filters go through
//! `QueryBuilder`. Documents are hydrated with their subjects by merging
//! the legacy `subject_id` column with the `document_subjects` join
//! table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::academic::{AssignmentRole, SubjectAssignment, SubjectRef};
use crate::database::models::{
    Comment, CommentWithReplies, Document, DocumentWithSubjects, NewCommentRow,
};
use crate::database::store::{ArchiveStore, StoreError};
use crate::documents::{DeletedFilter, DocumentFilter, DocumentUpdate, NewDocument};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Resolve a document's subjects: join-table rows plus the legacy
    /// single-subject column, deduplicated.
    async fn subjects_for(&self, doc: &Document) -> Result<Vec<SubjectRef>, StoreError> {
        let refs = sqlx::query_as::<_, SubjectRef>(
            r#"
            SELECT DISTINCT s.id, s.track_id, t.level_id
            FROM subjects s
            JOIN tracks t ON t.id = s.track_id
            WHERE s.id IN (SELECT subject_id FROM document_subjects WHERE document_id = $1)
               OR s.id = $2
            ORDER BY s.id
            "#,
        )
        .bind(doc.id)
        .bind(doc.subject_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(refs)
    }

    async fn hydrate(&self, doc: Document) -> Result<DocumentWithSubjects, StoreError> {
        let subjects = self.subjects_for(&doc).await?;
        Ok(DocumentWithSubjects { document: doc, subjects })
    }

    fn push_document_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &DocumentFilter) {
        match filter.deleted {
            DeletedFilter::Exclude => {
                qb.push(" AND is_deleted = FALSE");
            }
            DeletedFilter::Only => {
                qb.push(" AND is_deleted = TRUE");
            }
            DeletedFilter::Include => {}
        }
        if let Some(category) = filter.category {
            qb.push(" AND category = ");
            qb.push_bind(category);
        }
        if let Some(search) = &filter.search {
            qb.push(" AND title ILIKE ");
            qb.push_bind(format!("%{}%", search));
        }
        if let Some(subject_id) = filter.subject_id {
            qb.push(" AND (subject_id = ");
            qb.push_bind(subject_id);
            qb.push(" OR id IN (SELECT document_id FROM document_subjects WHERE subject_id = ");
            qb.push_bind(subject_id);
            qb.push("))");
        }
    }
}

#[async_trait]
impl ArchiveStore for PgStore {
    async fn find_document(&self, id: Uuid) -> Result<Option<DocumentWithSubjects>, StoreError> {
        let doc = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match doc {
            Some(doc) => Ok(Some(self.hydrate(doc).await?)),
            None => Ok(None),
        }
    }

    async fn list_documents(
        &self,
        filter: &DocumentFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<DocumentWithSubjects>, i64), StoreError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM documents WHERE TRUE");
        Self::push_document_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM documents WHERE TRUE");
        Self::push_document_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);
        let rows: Vec<Document> = qb.build_query_as().fetch_all(&self.pool).await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            documents.push(self.hydrate(row).await?);
        }
        Ok((documents, total))
    }

    async fn insert_document(
        &self,
        owner_id: Uuid,
        new: &NewDocument,
    ) -> Result<DocumentWithSubjects, StoreError> {
        let mut tx = self.pool.begin().await?;
        let doc = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (id, title, category, owner_id, file_path)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.title.trim())
        .bind(new.category)
        .bind(owner_id)
        .bind(&new.file_path)
        .fetch_one(&mut *tx)
        .await?;

        for subject_id in &new.subject_ids {
            sqlx::query("INSERT INTO document_subjects (document_id, subject_id) VALUES ($1, $2)")
                .bind(doc.id)
                .bind(subject_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.hydrate(doc).await
    }

    async fn update_document(&self, id: Uuid, patch: &DocumentUpdate) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            UPDATE documents
            SET title = COALESCE($2, title),
                file_path = COALESCE($3, file_path),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.title.as_deref().map(str::trim))
        .bind(&patch.file_path)
        .execute(&mut *tx)
        .await?;

        if let Some(subject_ids) = &patch.subject_ids {
            sqlx::query("DELETE FROM document_subjects WHERE document_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            // Replacing subjects retires the legacy column for this row.
            sqlx::query("UPDATE documents SET subject_id = NULL WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for subject_id in subject_ids {
                sqlx::query(
                    "INSERT INTO document_subjects (document_id, subject_id) VALUES ($1, $2)",
                )
                .bind(id)
                .bind(subject_id)
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;
        Ok(())
    }

    async fn soft_delete_document(
        &self,
        id: Uuid,
        deleted_by: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE documents
            SET is_deleted = TRUE, deleted_at = $2, deleted_by = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(deleted_at)
        .bind(deleted_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn restore_document(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET is_deleted = FALSE, deleted_at = NULL, deleted_by = NULL, updated_at = NOW()
            WHERE id = $1 AND is_deleted = TRUE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "UPDATE documents SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn find_subject_refs(&self, subject_ids: &[i32]) -> Result<Vec<SubjectRef>, StoreError> {
        let refs = sqlx::query_as::<_, SubjectRef>(
            r#"
            SELECT s.id, s.track_id, t.level_id
            FROM subjects s
            JOIN tracks t ON t.id = s.track_id
            WHERE s.id = ANY($1)
            ORDER BY s.id
            "#,
        )
        .bind(subject_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(refs)
    }

    async fn find_subject_assignments(
        &self,
        professor_id: Uuid,
        subject_ids: &[i32],
    ) -> Result<Vec<SubjectAssignment>, StoreError> {
        let assignments = sqlx::query_as::<_, SubjectAssignment>(
            r#"
            SELECT professor_id, subject_id, role
            FROM subject_assignments
            WHERE professor_id = $1 AND subject_id = ANY($2)
            "#,
        )
        .bind(professor_id)
        .bind(subject_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }

    async fn assign_professor(&self, assignment: SubjectAssignment) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO subject_assignments (professor_id, subject_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(assignment.professor_id)
        .bind(assignment.subject_id)
        .bind(assignment.role)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // The unique index on (subject_id, role) is the authority;
            // concurrent writers race to it, not to a read.
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
                Err(StoreError::Conflict(format!(
                    "subject {} already has a {} assignment",
                    assignment.subject_id, assignment.role
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn unassign_professor(
        &self,
        subject_id: i32,
        role: AssignmentRole,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("DELETE FROM subject_assignments WHERE subject_id = $1 AND role = $2")
                .bind(subject_id)
                .bind(role)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn find_comment_with_replies(
        &self,
        id: Uuid,
    ) -> Result<Option<CommentWithReplies>, StoreError> {
        let Some(comment) = self.find_comment(id).await? else {
            return Ok(None);
        };
        let replies = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE parent_id = $1 ORDER BY created_at ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(Some(CommentWithReplies { comment, replies }))
    }

    async fn list_top_level_comments(
        &self,
        document_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Comment>, i64), StoreError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM comments
            WHERE document_id = $1 AND parent_id IS NULL AND is_deleted = FALSE
            "#,
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await?;

        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM comments
            WHERE document_id = $1 AND parent_id IS NULL AND is_deleted = FALSE
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(document_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((comments, total))
    }

    async fn list_reply_descendants(&self, document_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM comments
            WHERE document_id = $1 AND parent_id IS NOT NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn insert_comment(&self, new: NewCommentRow) -> Result<Comment, StoreError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, document_id, author_id, author_role, parent_id, content)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.document_id)
        .bind(new.author_id)
        .bind(new.author_role)
        .bind(new.parent_id)
        .bind(&new.content)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn update_comment_content(
        &self,
        id: Uuid,
        content: &str,
    ) -> Result<Comment, StoreError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $2, is_edited = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn soft_delete_comment_and_replies(
        &self,
        id: Uuid,
        deleted_by: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        // One statement stamps the comment and its direct replies with
        // the same deletion marker; deeper descendants are untouched.
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET is_deleted = TRUE, deleted_at = $2, deleted_by = $3, updated_at = NOW()
            WHERE (id = $1 OR parent_id = $1) AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .bind(deleted_at)
        .bind(deleted_by)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
