use crate::error::Result;
use crate::models::note::{ApplicationNote, NoteKind};
use sqlx::PgConnection;
use uuid::Uuid;

/// Writes an application note on the caller's connection, inside the same
/// transaction as the status mutation it annotates.
pub async fn record(
    conn: &mut PgConnection,
    application_id: Uuid,
    author_id: Option<Uuid>,
    author_name: Option<&str>,
    kind: NoteKind,
    content: &str,
) -> Result<ApplicationNote> {
    let row = sqlx::query_as::<_, ApplicationNote>(
        r#"
        INSERT INTO application_notes (application_id, author_id, author_name, kind, content)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, application_id, author_id, author_name, kind, content, created_at
        "#,
    )
    .bind(application_id)
    .bind(author_id)
    .bind(author_name)
    .bind(kind.as_str())
    .bind(content)
    .fetch_one(conn)
    .await?;
    Ok(row)
}
