use crate::domain::{
    chat::entity::form_chat,
    company::entity::{company, company_file},
    form::entity::{embed, form, form_field, form_prompt},
    submission::entity::form_submission,
    user::entity::user,
};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Schema, Statement};
use tracing::info;

pub async fn establish_connection(
    database_url: &str,
    sync_schema: bool,
) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;
    info!("Successfully connected to the database.");

    if sync_schema {
        create_tables(&db).await?;
    } else {
        info!("Skipping database schema synchronization (DB_SCHEMA_UPDATE is not true).");
    }

    Ok(db)
}

async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    info!("Starting database schema synchronization...");

    // Order matters for foreign keys! (Parent first, then Child)

    // 1. 테넌트
    create_table_if_not_exists(db, &schema, user::Entity).await?;
    create_table_if_not_exists(db, &schema, company::Entity).await?;
    create_table_if_not_exists(db, &schema, company_file::Entity).await?;

    // 2. 폼
    create_table_if_not_exists(db, &schema, form::Entity).await?;
    create_table_if_not_exists(db, &schema, form_field::Entity).await?;
    create_table_if_not_exists(db, &schema, embed::Entity).await?;
    create_table_if_not_exists(db, &schema, form_prompt::Entity).await?;

    // 3. 방문자 데이터
    create_table_if_not_exists(db, &schema, form_submission::Entity).await?;
    create_table_if_not_exists(db, &schema, form_chat::Entity).await?;

    create_index_if_not_exists(db, "idx_form_owner", "form", &["owner_id"]).await?;
    create_index_if_not_exists(
        db,
        "idx_form_field_form_order",
        "form_field",
        &["form_id", "order_index"],
    )
    .await?;
    create_index_if_not_exists(
        db,
        "idx_form_submission_form_submitted",
        "form_submission",
        &["form_id", "submitted_at"],
    )
    .await?;
    // 세션 대화 기록 조회
    create_index_if_not_exists(
        db,
        "idx_form_chat_session",
        "form_chat",
        &["form_id", "session_id", "created_at"],
    )
    .await?;
    create_index_if_not_exists(
        db,
        "idx_company_file_company_deleted",
        "company_file",
        &["company_id", "deleted"],
    )
    .await?;

    info!("Database schema synchronization completed.");
    Ok(())
}

async fn create_index_if_not_exists(
    db: &DatabaseConnection,
    index_name: &str,
    table_name: &str,
    columns: &[&str],
) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let cols = columns.join(", ");
    let sql = format!("CREATE INDEX {} ON {} ({})", index_name, table_name, cols);
    let stmt = Statement::from_string(backend, sql);
    match db.execute(stmt).await {
        Ok(_) => Ok(()),
        Err(e) => {
            let err_str = e.to_string().to_lowercase();
            if err_str.contains("duplicate") || err_str.contains("exists") {
                Ok(())
            } else {
                tracing::error!("Failed to create index {}: {}", index_name, e);
                Err(e)
            }
        }
    }
}

async fn create_table_if_not_exists<E>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr>
where
    E: sea_orm::EntityTrait,
{
    let backend = db.get_database_backend();
    let create_stmt: Statement =
        backend.build(schema.create_table_from_entity(entity).if_not_exists());

    db.execute(create_stmt).await.map(|_| ()).map_err(|e| {
        tracing::error!("Failed to create table: {}", e);
        e
    })
}
