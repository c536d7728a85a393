use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::Json;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};
use tracing::{info, warn};

use super::{
    AnalyticsSnapshot, CompanyProfile, DataSource, FormRecord, FormSubmissionCount, FormSummary,
    FormUpdate, NewChatMessage, NewCompanyFile, NewField, NewForm, NewSubmission, NewUser,
    RecentSubmission, QUOTA_EXCEEDED_MESSAGE,
};
use crate::domain::chat::entity::form_chat::{self, ChatSender};
use crate::domain::company::entity::{company, company_file};
use crate::domain::form::entity::{embed, form, form_field, form_prompt};
use crate::domain::submission::entity::form_submission::{self, UserResponse, AI_RESPONSE_KEY};
use crate::domain::user::entity::user;
use crate::utils::error::AppError;

/// MySQL 데이터 소스
#[derive(Clone)]
pub struct SeaOrmDataSource {
    db: DatabaseConnection,
}

impl SeaOrmDataSource {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn map_embed_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::conflict("Embed code is already in use")
        }
        _ => err.into(),
    }
}

async fn load_record<C: ConnectionTrait>(conn: &C, form: form::Model) -> Result<FormRecord, DbErr> {
    let fields = form_field::Entity::find()
        .filter(form_field::Column::FormId.eq(form.form_id))
        .order_by_asc(form_field::Column::OrderIndex)
        .all(conn)
        .await?;

    let embeds = embed::Entity::find()
        .filter(embed::Column::FormId.eq(form.form_id))
        .order_by_asc(embed::Column::EmbedId)
        .all(conn)
        .await?;

    Ok(FormRecord {
        form,
        fields,
        embeds,
    })
}

async fn insert_fields<C: ConnectionTrait>(
    conn: &C,
    form_id: i64,
    fields: &[NewField],
) -> Result<(), DbErr> {
    if fields.is_empty() {
        return Ok(());
    }

    let models = fields
        .iter()
        .enumerate()
        .map(|(index, field)| form_field::ActiveModel {
            form_id: Set(form_id),
            label: Set(field.label.clone()),
            field_type: Set(field.field_type),
            required: Set(field.required),
            options: Set(field.serialized_options()),
            order_index: Set(index as i32),
            ..Default::default()
        });

    form_field::Entity::insert_many(models).exec(conn).await?;
    Ok(())
}

/// 폼별 제출 수 (제출이 없는 폼은 빠짐)
async fn submission_counts<C: ConnectionTrait>(
    conn: &C,
    form_ids: &[i64],
) -> Result<HashMap<i64, u64>, DbErr> {
    if form_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i64, i64)> = form_submission::Entity::find()
        .select_only()
        .column(form_submission::Column::FormId)
        .column_as(
            Expr::col(form_submission::Column::SubmissionId).count(),
            "submission_count",
        )
        .filter(form_submission::Column::FormId.is_in(form_ids.to_vec()))
        .group_by(form_submission::Column::FormId)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(form_id, count)| (form_id, count.max(0) as u64))
        .collect())
}

#[async_trait]
impl DataSource for SeaOrmDataSource {
    async fn find_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<user::Model>, AppError> {
        Ok(user::Entity::find()
            .filter(user::Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await?)
    }

    async fn upsert_user(&self, input: NewUser) -> Result<user::Model, AppError> {
        let now = Utc::now().naive_utc();
        let existing = user::Entity::find()
            .filter(user::Column::ExternalId.eq(input.external_id.as_str()))
            .one(&self.db)
            .await?;

        let model = match existing {
            Some(existing) => {
                let mut active: user::ActiveModel = existing.into();
                active.email = Set(input.email);
                active.first_name = Set(input.first_name);
                active.last_name = Set(input.last_name);
                active.image_url = Set(input.image_url);
                active.last_login = Set(Some(now));
                active.update(&self.db).await?
            }
            None => {
                user::ActiveModel {
                    external_id: Set(input.external_id),
                    email: Set(input.email),
                    first_name: Set(input.first_name),
                    last_name: Set(input.last_name),
                    image_url: Set(input.image_url),
                    last_login: Set(Some(now)),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?
            }
        };

        Ok(model)
    }

    async fn find_company_by_user(&self, user_id: i64) -> Result<Option<company::Model>, AppError> {
        Ok(company::Entity::find()
            .filter(company::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?)
    }

    async fn find_company(&self, company_id: i64) -> Result<Option<company::Model>, AppError> {
        Ok(company::Entity::find_by_id(company_id).one(&self.db).await?)
    }

    async fn create_company(
        &self,
        user_id: i64,
        profile: CompanyProfile,
        max_data_allowance: f64,
    ) -> Result<company::Model, AppError> {
        let now = Utc::now().naive_utc();
        let draft = profile.into_new_company(user_id, max_data_allowance, now);

        let mut active = company::ActiveModel::from(draft).reset_all();
        active.company_id = NotSet;

        Ok(active.insert(&self.db).await?)
    }

    async fn update_company(
        &self,
        company_id: i64,
        profile: CompanyProfile,
    ) -> Result<company::Model, AppError> {
        let mut model = company::Entity::find_by_id(company_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Company not found"))?;

        profile.apply(&mut model);
        model.updated_at = Utc::now().naive_utc();

        let active = company::ActiveModel::from(model).reset_all();
        Ok(active.update(&self.db).await?)
    }

    async fn create_form(&self, input: NewForm) -> Result<FormRecord, AppError> {
        let now = Utc::now().naive_utc();
        let txn = self.db.begin().await?;

        let created = form::ActiveModel {
            owner_id: Set(input.owner_id),
            company_id: Set(input.company_id),
            title: Set(input.title),
            description: Set(input.description),
            is_active: Set(true),
            styling: Set(input.styling),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        insert_fields(&txn, created.form_id, &input.fields).await?;

        embed::ActiveModel {
            form_id: Set(created.form_id),
            embed_code: Set(input.embed_code),
            url: Set(input.embed_url),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(map_embed_conflict)?;

        let record = load_record(&txn, created).await?;
        txn.commit().await?;

        Ok(record)
    }

    async fn list_forms(&self, owner_id: &str) -> Result<Vec<FormSummary>, AppError> {
        let forms = form::Entity::find()
            .filter(form::Column::OwnerId.eq(owner_id))
            .order_by_desc(form::Column::CreatedAt)
            .order_by_desc(form::Column::FormId)
            .all(&self.db)
            .await?;

        let form_ids: Vec<i64> = forms.iter().map(|f| f.form_id).collect();
        let counts = submission_counts(&self.db, &form_ids).await?;

        let mut first_embeds: HashMap<i64, String> = HashMap::new();
        if !form_ids.is_empty() {
            let embeds = embed::Entity::find()
                .filter(embed::Column::FormId.is_in(form_ids.clone()))
                .order_by_asc(embed::Column::EmbedId)
                .all(&self.db)
                .await?;
            for e in embeds {
                first_embeds.entry(e.form_id).or_insert(e.embed_code);
            }
        }

        Ok(forms
            .into_iter()
            .map(|form| FormSummary {
                embed_code: first_embeds.remove(&form.form_id),
                submission_count: counts.get(&form.form_id).copied().unwrap_or(0),
                form,
            })
            .collect())
    }

    async fn find_form(&self, form_id: i64) -> Result<Option<FormRecord>, AppError> {
        let Some(found) = form::Entity::find_by_id(form_id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(Some(load_record(&self.db, found).await?))
    }

    async fn find_active_form_by_embed_code(
        &self,
        embed_code: &str,
    ) -> Result<Option<FormRecord>, AppError> {
        let Some(found_embed) = embed::Entity::find()
            .filter(embed::Column::EmbedCode.eq(embed_code))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let found = form::Entity::find_by_id(found_embed.form_id)
            .filter(form::Column::IsActive.eq(true))
            .one(&self.db)
            .await?;

        match found {
            Some(found) => Ok(Some(load_record(&self.db, found).await?)),
            None => Ok(None),
        }
    }

    async fn update_form(&self, form_id: i64, input: FormUpdate) -> Result<FormRecord, AppError> {
        let txn = self.db.begin().await?;

        let existing = form::Entity::find_by_id(form_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Form not found"))?;

        // 필드는 부분 수정 없이 전부 교체
        form_field::Entity::delete_many()
            .filter(form_field::Column::FormId.eq(form_id))
            .exec(&txn)
            .await?;
        insert_fields(&txn, form_id, &input.fields).await?;

        let mut active: form::ActiveModel = existing.into();
        active.title = Set(input.title);
        active.description = Set(input.description);
        active.is_active = Set(input.is_active);
        active.styling = Set(input.styling);
        active.updated_at = Set(Utc::now().naive_utc());
        let updated = active.update(&txn).await?;

        let record = load_record(&txn, updated).await?;
        txn.commit().await?;

        Ok(record)
    }

    async fn delete_form(&self, form_id: i64) -> Result<(), AppError> {
        let txn = self.db.begin().await?;

        form_chat::Entity::delete_many()
            .filter(form_chat::Column::FormId.eq(form_id))
            .exec(&txn)
            .await?;
        form_submission::Entity::delete_many()
            .filter(form_submission::Column::FormId.eq(form_id))
            .exec(&txn)
            .await?;
        form_prompt::Entity::delete_many()
            .filter(form_prompt::Column::FormId.eq(form_id))
            .exec(&txn)
            .await?;
        embed::Entity::delete_many()
            .filter(embed::Column::FormId.eq(form_id))
            .exec(&txn)
            .await?;
        form_field::Entity::delete_many()
            .filter(form_field::Column::FormId.eq(form_id))
            .exec(&txn)
            .await?;

        let result = form::Entity::delete_by_id(form_id).exec(&txn).await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AppError::not_found("Form not found"));
        }

        txn.commit().await?;
        info!(form_id, "Form deleted with dependent records");

        Ok(())
    }

    async fn find_prompt(&self, form_id: i64) -> Result<Option<form_prompt::Model>, AppError> {
        Ok(form_prompt::Entity::find()
            .filter(form_prompt::Column::FormId.eq(form_id))
            .one(&self.db)
            .await?)
    }

    async fn upsert_prompt(
        &self,
        form_id: i64,
        prompt: Option<String>,
        context: Option<String>,
    ) -> Result<form_prompt::Model, AppError> {
        let now = Utc::now().naive_utc();
        let existing = form_prompt::Entity::find()
            .filter(form_prompt::Column::FormId.eq(form_id))
            .one(&self.db)
            .await?;

        let model = match existing {
            Some(existing) => {
                let mut active: form_prompt::ActiveModel = existing.into();
                if prompt.is_some() {
                    active.prompt = Set(prompt);
                }
                if context.is_some() {
                    active.context = Set(context);
                }
                active.updated_at = Set(now);
                active.update(&self.db).await?
            }
            None => {
                form_prompt::ActiveModel {
                    form_id: Set(form_id),
                    prompt: Set(prompt),
                    context: Set(context),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?
            }
        };

        Ok(model)
    }

    async fn create_submission(
        &self,
        input: NewSubmission,
    ) -> Result<form_submission::Model, AppError> {
        Ok(form_submission::ActiveModel {
            form_id: Set(input.form_id),
            data: Set(input.data),
            ip: Set(input.ip),
            user_agent: Set(input.user_agent),
            submitted_at: Set(Utc::now().naive_utc()),
            user_responded: Set(false),
            user_response: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await?)
    }

    async fn find_submission(
        &self,
        submission_id: i64,
    ) -> Result<Option<form_submission::Model>, AppError> {
        Ok(form_submission::Entity::find_by_id(submission_id)
            .one(&self.db)
            .await?)
    }

    async fn update_submission_data(
        &self,
        submission_id: i64,
        data: Json,
    ) -> Result<(), AppError> {
        let result = form_submission::Entity::update_many()
            .col_expr(form_submission::Column::Data, Expr::value(data))
            .filter(form_submission::Column::SubmissionId.eq(submission_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            warn!(submission_id, "Submission vanished before {} was stored", AI_RESPONSE_KEY);
        }

        Ok(())
    }

    async fn record_user_response(
        &self,
        submission_id: i64,
        response: UserResponse,
    ) -> Result<Option<form_submission::Model>, AppError> {
        let Some(existing) = form_submission::Entity::find_by_id(submission_id)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: form_submission::ActiveModel = existing.into();
        active.user_responded = Set(true);
        active.user_response = Set(Some(response));

        Ok(Some(active.update(&self.db).await?))
    }

    async fn list_submissions(
        &self,
        form_id: i64,
    ) -> Result<Vec<form_submission::Model>, AppError> {
        Ok(form_submission::Entity::find()
            .filter(form_submission::Column::FormId.eq(form_id))
            .order_by_desc(form_submission::Column::SubmittedAt)
            .order_by_desc(form_submission::Column::SubmissionId)
            .all(&self.db)
            .await?)
    }

    async fn append_chat_message(
        &self,
        input: NewChatMessage,
    ) -> Result<form_chat::Model, AppError> {
        Ok(form_chat::ActiveModel {
            form_id: Set(input.form_id),
            session_id: Set(input.session_id),
            sender: Set(input.sender),
            message: Set(input.message),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?)
    }

    async fn list_chat_messages(
        &self,
        form_id: i64,
        session_id: &str,
    ) -> Result<Vec<form_chat::Model>, AppError> {
        Ok(form_chat::Entity::find()
            .filter(form_chat::Column::FormId.eq(form_id))
            .filter(form_chat::Column::SessionId.eq(session_id))
            .order_by_asc(form_chat::Column::CreatedAt)
            .order_by_asc(form_chat::Column::ChatId)
            .all(&self.db)
            .await?)
    }

    async fn list_company_files(
        &self,
        company_id: i64,
    ) -> Result<Vec<company_file::Model>, AppError> {
        Ok(company_file::Entity::find()
            .filter(company_file::Column::CompanyId.eq(company_id))
            .filter(company_file::Column::Deleted.eq(false))
            .order_by_desc(company_file::Column::CreatedAt)
            .order_by_desc(company_file::Column::FileId)
            .all(&self.db)
            .await?)
    }

    async fn record_upload(
        &self,
        company_id: i64,
        input: NewCompanyFile,
    ) -> Result<company_file::Model, AppError> {
        let now = Utc::now().naive_utc();
        let txn = self.db.begin().await?;

        // 허용량 검사와 증가를 하나의 조건부 UPDATE로 처리해 동시 업로드에도 초과하지 않음
        let result = company::Entity::update_many()
            .col_expr(
                company::Column::DataUsage,
                Expr::col(company::Column::DataUsage).add(input.size),
            )
            .col_expr(company::Column::UpdatedAt, Expr::value(now))
            .filter(company::Column::CompanyId.eq(company_id))
            .filter(
                Expr::col(company::Column::DataUsage)
                    .lte(Expr::col(company::Column::MaxDataAllowance).sub(input.size)),
            )
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            let exists = company::Entity::find_by_id(company_id).one(&txn).await?.is_some();
            txn.rollback().await?;
            return Err(if exists {
                AppError::QuotaExceeded(QUOTA_EXCEEDED_MESSAGE.to_string())
            } else {
                AppError::not_found("Company not found")
            });
        }

        let file = company_file::ActiveModel {
            company_id: Set(company_id),
            name: Set(input.name),
            url: Set(input.url),
            size: Set(input.size),
            deleted: Set(false),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(file)
    }

    async fn soft_delete_file(
        &self,
        company_id: i64,
        file_id: i64,
    ) -> Result<company_file::Model, AppError> {
        let txn = self.db.begin().await?;

        let existing = company_file::Entity::find_by_id(file_id)
            .filter(company_file::Column::CompanyId.eq(company_id))
            .filter(company_file::Column::Deleted.eq(false))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        let size = existing.size;
        let mut active: company_file::ActiveModel = existing.into();
        active.deleted = Set(true);
        let deleted = active.update(&txn).await?;

        company::Entity::update_many()
            .col_expr(
                company::Column::DataUsage,
                Expr::col(company::Column::DataUsage).sub(size),
            )
            .col_expr(company::Column::UpdatedAt, Expr::value(Utc::now().naive_utc()))
            .filter(company::Column::CompanyId.eq(company_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(deleted)
    }

    async fn soft_delete_all_files(
        &self,
        company_id: i64,
    ) -> Result<Vec<company_file::Model>, AppError> {
        let txn = self.db.begin().await?;

        let files = company_file::Entity::find()
            .filter(company_file::Column::CompanyId.eq(company_id))
            .filter(company_file::Column::Deleted.eq(false))
            .all(&txn)
            .await?;

        company_file::Entity::update_many()
            .col_expr(company_file::Column::Deleted, Expr::value(true))
            .filter(company_file::Column::CompanyId.eq(company_id))
            .filter(company_file::Column::Deleted.eq(false))
            .exec(&txn)
            .await?;

        // 누적 오차가 있어도 전체 삭제 후에는 정확히 0
        company::Entity::update_many()
            .col_expr(company::Column::DataUsage, Expr::value(0.0_f64))
            .col_expr(company::Column::UpdatedAt, Expr::value(Utc::now().naive_utc()))
            .filter(company::Column::CompanyId.eq(company_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(files
            .into_iter()
            .map(|mut file| {
                file.deleted = true;
                file
            })
            .collect())
    }

    async fn analytics(
        &self,
        owner_id: &str,
        recent_limit: usize,
        top_limit: usize,
    ) -> Result<AnalyticsSnapshot, AppError> {
        let forms = form::Entity::find()
            .filter(form::Column::OwnerId.eq(owner_id))
            .order_by_desc(form::Column::CreatedAt)
            .all(&self.db)
            .await?;

        if forms.is_empty() {
            return Ok(AnalyticsSnapshot::default());
        }

        let form_ids: Vec<i64> = forms.iter().map(|f| f.form_id).collect();
        let titles: HashMap<i64, String> =
            forms.iter().map(|f| (f.form_id, f.title.clone())).collect();

        let total_submissions = form_submission::Entity::find()
            .filter(form_submission::Column::FormId.is_in(form_ids.clone()))
            .count(&self.db)
            .await?;

        let user_responses = form_submission::Entity::find()
            .filter(form_submission::Column::FormId.is_in(form_ids.clone()))
            .filter(form_submission::Column::UserResponded.eq(true))
            .count(&self.db)
            .await?;

        let ai_replies = form_submission::Entity::find()
            .filter(form_submission::Column::FormId.is_in(form_ids.clone()))
            .filter(Expr::cust(format!(
                "JSON_CONTAINS_PATH(`data`, 'one', '$.{}')",
                AI_RESPONSE_KEY
            )))
            .count(&self.db)
            .await?;

        let ai_chats = form_chat::Entity::find()
            .filter(form_chat::Column::FormId.is_in(form_ids.clone()))
            .filter(form_chat::Column::Sender.eq(ChatSender::Ai))
            .count(&self.db)
            .await?;

        let recent_submissions = form_submission::Entity::find()
            .filter(form_submission::Column::FormId.is_in(form_ids.clone()))
            .order_by_desc(form_submission::Column::SubmittedAt)
            .order_by_desc(form_submission::Column::SubmissionId)
            .limit(recent_limit as u64)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|s| RecentSubmission {
                form_title: titles.get(&s.form_id).cloned().unwrap_or_default(),
                submitted_at: s.submitted_at,
                has_ai_response: s.ai_response().is_some(),
            })
            .collect();

        let counts = submission_counts(&self.db, &form_ids).await?;
        let mut top_forms: Vec<FormSubmissionCount> = forms
            .iter()
            .map(|f| FormSubmissionCount {
                title: f.title.clone(),
                submissions: counts.get(&f.form_id).copied().unwrap_or(0),
            })
            .collect();
        // 안정 정렬이므로 동률은 최신 폼 우선
        top_forms.sort_by(|a, b| b.submissions.cmp(&a.submissions));
        top_forms.truncate(top_limit);

        Ok(AnalyticsSnapshot {
            total_forms: forms.len() as u64,
            total_submissions,
            ai_interactions: ai_replies + ai_chats,
            user_responses,
            recent_submissions,
            top_forms,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(self.db.ping().await?)
    }
}
