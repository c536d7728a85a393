use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::prelude::Json;
use serde_json::json;

use super::{
    exceeds_allowance, AnalyticsSnapshot, CompanyProfile, DataSource, FormRecord,
    FormSubmissionCount, FormSummary, FormUpdate, NewChatMessage, NewCompanyFile, NewField,
    NewForm, NewSubmission, NewUser, RecentSubmission, QUOTA_EXCEEDED_MESSAGE,
};
use crate::domain::chat::entity::form_chat::{self, ChatSender};
use crate::domain::company::entity::{company, company_file};
use crate::domain::form::entity::form_field::FieldType;
use crate::domain::form::entity::{embed, form, form_field, form_prompt};
use crate::domain::submission::entity::form_submission::{self, UserResponse};
use crate::domain::user::entity::user;
use crate::utils::error::AppError;

/// 데모 테넌트의 외부 사용자 ID
pub const DEMO_EXTERNAL_ID: &str = "demo_user";
/// 데모 폼의 임베드 코드
pub const DEMO_EMBED_CODE: &str = "demo-contact";

#[derive(Default)]
struct FixtureState {
    next_id: i64,
    last_timestamp: Option<NaiveDateTime>,
    users: Vec<user::Model>,
    companies: Vec<company::Model>,
    files: Vec<company_file::Model>,
    forms: Vec<form::Model>,
    fields: Vec<form_field::Model>,
    embeds: Vec<embed::Model>,
    prompts: Vec<form_prompt::Model>,
    submissions: Vec<form_submission::Model>,
    chats: Vec<form_chat::Model>,
}

impl FixtureState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// 같은 시각이 두 번 나오지 않도록 단조 증가하는 시각
    fn now(&mut self) -> NaiveDateTime {
        let now = Utc::now().naive_utc();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    fn record(&self, form: form::Model) -> FormRecord {
        let mut fields: Vec<form_field::Model> = self
            .fields
            .iter()
            .filter(|f| f.form_id == form.form_id)
            .cloned()
            .collect();
        fields.sort_by_key(|f| f.order_index);

        let embeds = self
            .embeds
            .iter()
            .filter(|e| e.form_id == form.form_id)
            .cloned()
            .collect();

        FormRecord {
            form,
            fields,
            embeds,
        }
    }

    fn insert_fields(&mut self, form_id: i64, fields: &[NewField]) {
        for (index, field) in fields.iter().enumerate() {
            let form_field_id = self.next_id();
            self.fields.push(form_field::Model {
                form_field_id,
                form_id,
                label: field.label.clone(),
                field_type: field.field_type,
                required: field.required,
                options: field.serialized_options(),
                order_index: index as i32,
            });
        }
    }

    fn company_mut(&mut self, company_id: i64) -> Result<&mut company::Model, AppError> {
        self.companies
            .iter_mut()
            .find(|c| c.company_id == company_id)
            .ok_or_else(|| AppError::not_found("Company not found"))
    }
}

/// 메모리 기반 데이터 소스
///
/// 데모 모드와 테스트에서 사용합니다. 모든 연산이 하나의 잠금 안에서 실행되므로
/// 여러 레코드를 건드리는 쓰기도 원자적입니다.
#[derive(Default)]
pub struct FixtureDataSource {
    state: Mutex<FixtureState>,
}

impl FixtureDataSource {
    /// 빈 데이터 소스
    pub fn new() -> Self {
        Self::default()
    }

    /// 데모 테넌트(사용자, 회사, 문의 폼, 프롬프트)가 채워진 데이터 소스
    pub fn seeded() -> Self {
        let source = Self::new();
        {
            let mut state = source.state.lock().unwrap_or_else(|e| e.into_inner());
            seed_demo_tenant(&mut state);
        }
        source
    }

    fn lock(&self) -> Result<MutexGuard<'_, FixtureState>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::internal_error("fixture store lock poisoned"))
    }

    /// 저장된 사용량을 직접 덮어씁니다. 사용량 보정 시나리오 재현용.
    pub fn overwrite_data_usage(&self, company_id: i64, data_usage: f64) -> Result<(), AppError> {
        let mut state = self.lock()?;
        state.company_mut(company_id)?.data_usage = data_usage;
        Ok(())
    }

    pub fn set_max_data_allowance(
        &self,
        company_id: i64,
        max_data_allowance: f64,
    ) -> Result<(), AppError> {
        let mut state = self.lock()?;
        state.company_mut(company_id)?.max_data_allowance = max_data_allowance;
        Ok(())
    }
}

fn seed_demo_tenant(state: &mut FixtureState) {
    let now = state.now();
    let user_id = state.next_id();
    state.users.push(user::Model {
        user_id,
        external_id: DEMO_EXTERNAL_ID.to_string(),
        email: "demo@formpilot.dev".to_string(),
        first_name: Some("Demo".to_string()),
        last_name: Some("Owner".to_string()),
        image_url: None,
        last_login: None,
        created_at: now,
    });

    let company_id = state.next_id();
    let mut company = CompanyProfile {
        name: Some("Acme Studio".to_string()),
        website: Some("https://acme.example".to_string()),
        business_type: Some("Design agency".to_string()),
        product_description: Some("Brand identity and website design for small businesses".to_string()),
        target_audience: Some("Founders of early-stage companies".to_string()),
        main_contact_goal: Some("Book a discovery call".to_string()),
        preferred_tone: Some("Friendly and concise".to_string()),
        keywords: Some("branding, web design, logo".to_string()),
        common_questions: Some("Pricing, timelines, revisions".to_string()),
        value_offers: Some("Free 30-minute consultation".to_string()),
        follow_up_style: Some("Email within one business day".to_string()),
    }
    .into_new_company(user_id, crate::config::DEFAULT_MAX_DATA_ALLOWANCE_MB, now);
    company.company_id = company_id;
    state.companies.push(company);

    let form_id = state.next_id();
    state.forms.push(form::Model {
        form_id,
        owner_id: DEMO_EXTERNAL_ID.to_string(),
        company_id: Some(company_id),
        title: "Contact Us".to_string(),
        description: Some("Tell us about your project".to_string()),
        is_active: true,
        styling: Some(json!({ "primaryColor": "#3b82f6" })),
        created_at: now,
        updated_at: now,
    });

    let demo_fields = [
        NewField {
            label: "Name".to_string(),
            field_type: FieldType::Text,
            required: true,
            options: None,
        },
        NewField {
            label: "Email".to_string(),
            field_type: FieldType::Email,
            required: true,
            options: None,
        },
        NewField {
            label: "Budget".to_string(),
            field_type: FieldType::Select,
            required: false,
            options: Some(vec![
                "< $1k".to_string(),
                "$1k-$10k".to_string(),
                "> $10k".to_string(),
            ]),
        },
        NewField {
            label: "Message".to_string(),
            field_type: FieldType::Textarea,
            required: true,
            options: None,
        },
    ];
    state.insert_fields(form_id, &demo_fields);

    let embed_id = state.next_id();
    state.embeds.push(embed::Model {
        embed_id,
        form_id,
        embed_code: DEMO_EMBED_CODE.to_string(),
        url: format!("/embed/{}", DEMO_EMBED_CODE),
        created_at: now,
    });

    let form_prompt_id = state.next_id();
    state.prompts.push(form_prompt::Model {
        form_prompt_id,
        form_id,
        prompt: Some("Thank the visitor by name and suggest booking a discovery call.".to_string()),
        context: Some("Discovery calls are free and last 30 minutes.".to_string()),
        updated_at: now,
    });
}

#[async_trait]
impl DataSource for FixtureDataSource {
    async fn find_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<user::Model>, AppError> {
        let state = self.lock()?;
        Ok(state
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned())
    }

    async fn upsert_user(&self, input: NewUser) -> Result<user::Model, AppError> {
        let mut state = self.lock()?;
        let now = state.now();

        if let Some(existing) = state
            .users
            .iter_mut()
            .find(|u| u.external_id == input.external_id)
        {
            existing.email = input.email;
            existing.first_name = input.first_name;
            existing.last_name = input.last_name;
            existing.image_url = input.image_url;
            existing.last_login = Some(now);
            return Ok(existing.clone());
        }

        let user_id = state.next_id();
        let created = user::Model {
            user_id,
            external_id: input.external_id,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            image_url: input.image_url,
            last_login: Some(now),
            created_at: now,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn find_company_by_user(&self, user_id: i64) -> Result<Option<company::Model>, AppError> {
        let state = self.lock()?;
        Ok(state
            .companies
            .iter()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn find_company(&self, company_id: i64) -> Result<Option<company::Model>, AppError> {
        let state = self.lock()?;
        Ok(state
            .companies
            .iter()
            .find(|c| c.company_id == company_id)
            .cloned())
    }

    async fn create_company(
        &self,
        user_id: i64,
        profile: CompanyProfile,
        max_data_allowance: f64,
    ) -> Result<company::Model, AppError> {
        let mut state = self.lock()?;
        if state.companies.iter().any(|c| c.user_id == user_id) {
            return Err(AppError::conflict("Company already exists"));
        }

        let now = state.now();
        let mut created = profile.into_new_company(user_id, max_data_allowance, now);
        created.company_id = state.next_id();
        state.companies.push(created.clone());
        Ok(created)
    }

    async fn update_company(
        &self,
        company_id: i64,
        profile: CompanyProfile,
    ) -> Result<company::Model, AppError> {
        let mut state = self.lock()?;
        let now = state.now();
        let company = state.company_mut(company_id)?;
        profile.apply(company);
        company.updated_at = now;
        Ok(company.clone())
    }

    async fn create_form(&self, input: NewForm) -> Result<FormRecord, AppError> {
        let mut state = self.lock()?;
        if state.embeds.iter().any(|e| e.embed_code == input.embed_code) {
            return Err(AppError::conflict("Embed code is already in use"));
        }

        let now = state.now();
        let form_id = state.next_id();
        let created = form::Model {
            form_id,
            owner_id: input.owner_id,
            company_id: input.company_id,
            title: input.title,
            description: input.description,
            is_active: true,
            styling: input.styling,
            created_at: now,
            updated_at: now,
        };
        state.forms.push(created.clone());
        state.insert_fields(form_id, &input.fields);

        let embed_id = state.next_id();
        state.embeds.push(embed::Model {
            embed_id,
            form_id,
            embed_code: input.embed_code,
            url: input.embed_url,
            created_at: now,
        });

        Ok(state.record(created))
    }

    async fn list_forms(&self, owner_id: &str) -> Result<Vec<FormSummary>, AppError> {
        let state = self.lock()?;
        let mut forms: Vec<&form::Model> =
            state.forms.iter().filter(|f| f.owner_id == owner_id).collect();
        forms.sort_by(|a, b| (b.created_at, b.form_id).cmp(&(a.created_at, a.form_id)));

        Ok(forms
            .into_iter()
            .map(|f| FormSummary {
                form: f.clone(),
                embed_code: state
                    .embeds
                    .iter()
                    .find(|e| e.form_id == f.form_id)
                    .map(|e| e.embed_code.clone()),
                submission_count: state
                    .submissions
                    .iter()
                    .filter(|s| s.form_id == f.form_id)
                    .count() as u64,
            })
            .collect())
    }

    async fn find_form(&self, form_id: i64) -> Result<Option<FormRecord>, AppError> {
        let state = self.lock()?;
        Ok(state
            .forms
            .iter()
            .find(|f| f.form_id == form_id)
            .cloned()
            .map(|f| state.record(f)))
    }

    async fn find_active_form_by_embed_code(
        &self,
        embed_code: &str,
    ) -> Result<Option<FormRecord>, AppError> {
        let state = self.lock()?;
        let Some(found_embed) = state.embeds.iter().find(|e| e.embed_code == embed_code) else {
            return Ok(None);
        };

        Ok(state
            .forms
            .iter()
            .find(|f| f.form_id == found_embed.form_id && f.is_active)
            .cloned()
            .map(|f| state.record(f)))
    }

    async fn update_form(&self, form_id: i64, input: FormUpdate) -> Result<FormRecord, AppError> {
        let mut state = self.lock()?;
        let now = state.now();

        let updated = {
            let existing = state
                .forms
                .iter_mut()
                .find(|f| f.form_id == form_id)
                .ok_or_else(|| AppError::not_found("Form not found"))?;
            existing.title = input.title;
            existing.description = input.description;
            existing.is_active = input.is_active;
            existing.styling = input.styling;
            existing.updated_at = now;
            existing.clone()
        };

        state.fields.retain(|f| f.form_id != form_id);
        state.insert_fields(form_id, &input.fields);

        Ok(state.record(updated))
    }

    async fn delete_form(&self, form_id: i64) -> Result<(), AppError> {
        let mut state = self.lock()?;
        if !state.forms.iter().any(|f| f.form_id == form_id) {
            return Err(AppError::not_found("Form not found"));
        }

        state.chats.retain(|c| c.form_id != form_id);
        state.submissions.retain(|s| s.form_id != form_id);
        state.prompts.retain(|p| p.form_id != form_id);
        state.embeds.retain(|e| e.form_id != form_id);
        state.fields.retain(|f| f.form_id != form_id);
        state.forms.retain(|f| f.form_id != form_id);

        Ok(())
    }

    async fn find_prompt(&self, form_id: i64) -> Result<Option<form_prompt::Model>, AppError> {
        let state = self.lock()?;
        Ok(state.prompts.iter().find(|p| p.form_id == form_id).cloned())
    }

    async fn upsert_prompt(
        &self,
        form_id: i64,
        prompt: Option<String>,
        context: Option<String>,
    ) -> Result<form_prompt::Model, AppError> {
        let mut state = self.lock()?;
        let now = state.now();

        if let Some(existing) = state.prompts.iter_mut().find(|p| p.form_id == form_id) {
            if prompt.is_some() {
                existing.prompt = prompt;
            }
            if context.is_some() {
                existing.context = context;
            }
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let form_prompt_id = state.next_id();
        let created = form_prompt::Model {
            form_prompt_id,
            form_id,
            prompt,
            context,
            updated_at: now,
        };
        state.prompts.push(created.clone());
        Ok(created)
    }

    async fn create_submission(
        &self,
        input: NewSubmission,
    ) -> Result<form_submission::Model, AppError> {
        let mut state = self.lock()?;
        let submitted_at = state.now();
        let submission_id = state.next_id();

        let created = form_submission::Model {
            submission_id,
            form_id: input.form_id,
            data: input.data,
            ip: input.ip,
            user_agent: input.user_agent,
            submitted_at,
            user_responded: false,
            user_response: None,
        };
        state.submissions.push(created.clone());
        Ok(created)
    }

    async fn find_submission(
        &self,
        submission_id: i64,
    ) -> Result<Option<form_submission::Model>, AppError> {
        let state = self.lock()?;
        Ok(state
            .submissions
            .iter()
            .find(|s| s.submission_id == submission_id)
            .cloned())
    }

    async fn update_submission_data(
        &self,
        submission_id: i64,
        data: Json,
    ) -> Result<(), AppError> {
        let mut state = self.lock()?;
        if let Some(existing) = state
            .submissions
            .iter_mut()
            .find(|s| s.submission_id == submission_id)
        {
            existing.data = data;
        }
        Ok(())
    }

    async fn record_user_response(
        &self,
        submission_id: i64,
        response: UserResponse,
    ) -> Result<Option<form_submission::Model>, AppError> {
        let mut state = self.lock()?;
        Ok(state
            .submissions
            .iter_mut()
            .find(|s| s.submission_id == submission_id)
            .map(|existing| {
                existing.user_responded = true;
                existing.user_response = Some(response);
                existing.clone()
            }))
    }

    async fn list_submissions(
        &self,
        form_id: i64,
    ) -> Result<Vec<form_submission::Model>, AppError> {
        let state = self.lock()?;
        let mut submissions: Vec<form_submission::Model> = state
            .submissions
            .iter()
            .filter(|s| s.form_id == form_id)
            .cloned()
            .collect();
        submissions.sort_by(|a, b| {
            (b.submitted_at, b.submission_id).cmp(&(a.submitted_at, a.submission_id))
        });
        Ok(submissions)
    }

    async fn append_chat_message(
        &self,
        input: NewChatMessage,
    ) -> Result<form_chat::Model, AppError> {
        let mut state = self.lock()?;
        let created_at = state.now();
        let chat_id = state.next_id();

        let created = form_chat::Model {
            chat_id,
            form_id: input.form_id,
            session_id: input.session_id,
            sender: input.sender,
            message: input.message,
            created_at,
        };
        state.chats.push(created.clone());
        Ok(created)
    }

    async fn list_chat_messages(
        &self,
        form_id: i64,
        session_id: &str,
    ) -> Result<Vec<form_chat::Model>, AppError> {
        let state = self.lock()?;
        let mut messages: Vec<form_chat::Model> = state
            .chats
            .iter()
            .filter(|c| c.form_id == form_id && c.session_id == session_id)
            .cloned()
            .collect();
        messages.sort_by_key(|c| (c.created_at, c.chat_id));
        Ok(messages)
    }

    async fn list_company_files(
        &self,
        company_id: i64,
    ) -> Result<Vec<company_file::Model>, AppError> {
        let state = self.lock()?;
        let mut files: Vec<company_file::Model> = state
            .files
            .iter()
            .filter(|f| f.company_id == company_id && !f.deleted)
            .cloned()
            .collect();
        files.sort_by(|a, b| (b.created_at, b.file_id).cmp(&(a.created_at, a.file_id)));
        Ok(files)
    }

    async fn record_upload(
        &self,
        company_id: i64,
        input: NewCompanyFile,
    ) -> Result<company_file::Model, AppError> {
        let mut state = self.lock()?;
        let now = state.now();

        let company = state.company_mut(company_id)?;
        if exceeds_allowance(company.data_usage, input.size, company.max_data_allowance) {
            return Err(AppError::QuotaExceeded(QUOTA_EXCEEDED_MESSAGE.to_string()));
        }
        company.data_usage += input.size;
        company.updated_at = now;

        let file_id = state.next_id();
        let created = company_file::Model {
            file_id,
            company_id,
            name: input.name,
            url: input.url,
            size: input.size,
            deleted: false,
            created_at: now,
        };
        state.files.push(created.clone());
        Ok(created)
    }

    async fn soft_delete_file(
        &self,
        company_id: i64,
        file_id: i64,
    ) -> Result<company_file::Model, AppError> {
        let mut state = self.lock()?;
        let now = state.now();

        let deleted = {
            let file = state
                .files
                .iter_mut()
                .find(|f| f.file_id == file_id && f.company_id == company_id && !f.deleted)
                .ok_or_else(|| AppError::not_found("File not found"))?;
            file.deleted = true;
            file.clone()
        };

        let company = state.company_mut(company_id)?;
        company.data_usage -= deleted.size;
        company.updated_at = now;

        Ok(deleted)
    }

    async fn soft_delete_all_files(
        &self,
        company_id: i64,
    ) -> Result<Vec<company_file::Model>, AppError> {
        let mut state = self.lock()?;
        let now = state.now();

        let company = state.company_mut(company_id)?;
        company.data_usage = 0.0;
        company.updated_at = now;

        let mut deleted = Vec::new();
        for file in state
            .files
            .iter_mut()
            .filter(|f| f.company_id == company_id && !f.deleted)
        {
            file.deleted = true;
            deleted.push(file.clone());
        }
        Ok(deleted)
    }

    async fn analytics(
        &self,
        owner_id: &str,
        recent_limit: usize,
        top_limit: usize,
    ) -> Result<AnalyticsSnapshot, AppError> {
        let state = self.lock()?;
        let mut forms: Vec<&form::Model> =
            state.forms.iter().filter(|f| f.owner_id == owner_id).collect();
        forms.sort_by(|a, b| (b.created_at, b.form_id).cmp(&(a.created_at, a.form_id)));

        let titles: HashMap<i64, &str> = forms.iter().map(|f| (f.form_id, f.title.as_str())).collect();

        let mut submissions: Vec<&form_submission::Model> = state
            .submissions
            .iter()
            .filter(|s| titles.contains_key(&s.form_id))
            .collect();
        submissions.sort_by(|a, b| {
            (b.submitted_at, b.submission_id).cmp(&(a.submitted_at, a.submission_id))
        });

        let ai_replies = submissions.iter().filter(|s| s.ai_response().is_some()).count();
        let ai_chats = state
            .chats
            .iter()
            .filter(|c| c.sender == ChatSender::Ai && titles.contains_key(&c.form_id))
            .count();
        let ai_interactions = (ai_replies + ai_chats) as u64;

        let mut top_forms: Vec<FormSubmissionCount> = forms
            .iter()
            .map(|f| FormSubmissionCount {
                title: f.title.clone(),
                submissions: submissions.iter().filter(|s| s.form_id == f.form_id).count() as u64,
            })
            .collect();
        top_forms.sort_by(|a, b| b.submissions.cmp(&a.submissions));
        top_forms.truncate(top_limit);

        Ok(AnalyticsSnapshot {
            total_forms: forms.len() as u64,
            total_submissions: submissions.len() as u64,
            ai_interactions,
            user_responses: submissions.iter().filter(|s| s.user_responded).count() as u64,
            recent_submissions: submissions
                .iter()
                .take(recent_limit)
                .map(|s| RecentSubmission {
                    form_title: titles.get(&s.form_id).map(|t| t.to_string()).unwrap_or_default(),
                    submitted_at: s.submitted_at,
                    has_ai_response: s.ai_response().is_some(),
                })
                .collect(),
            top_forms,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_form(owner: &str, code: &str) -> NewForm {
        NewForm {
            owner_id: owner.to_string(),
            company_id: None,
            title: "Contact".to_string(),
            description: None,
            styling: None,
            fields: vec![
                NewField {
                    label: "Name".to_string(),
                    field_type: FieldType::Text,
                    required: true,
                    options: None,
                },
                NewField {
                    label: "Email".to_string(),
                    field_type: FieldType::Email,
                    required: true,
                    options: None,
                },
            ],
            embed_code: code.to_string(),
            embed_url: format!("/embed/{}", code),
        }
    }

    async fn company_with_usage(source: &FixtureDataSource, usage: f64, max: f64) -> i64 {
        let user = source
            .upsert_user(NewUser {
                external_id: "user_1".into(),
                email: "owner@acme.io".into(),
                first_name: None,
                last_name: None,
                image_url: None,
            })
            .await
            .unwrap();
        let company = source
            .create_company(
                user.user_id,
                CompanyProfile {
                    name: Some("Acme".into()),
                    ..Default::default()
                },
                max,
            )
            .await
            .unwrap();
        source.overwrite_data_usage(company.company_id, usage).unwrap();
        company.company_id
    }

    fn upload(size: f64) -> NewCompanyFile {
        NewCompanyFile {
            name: "brochure.pdf".into(),
            url: "http://localhost/uploads/brochure.pdf".into(),
            size,
        }
    }

    #[tokio::test]
    async fn should_resolve_only_active_forms_by_embed_code() {
        // Arrange
        let source = FixtureDataSource::new();
        let record = source.create_form(new_form("user_1", "abc123")).await.unwrap();

        // Act & Assert
        let found = source.find_active_form_by_embed_code("abc123").await.unwrap();
        assert_eq!(found.unwrap().form.form_id, record.form.form_id);

        source
            .update_form(
                record.form.form_id,
                FormUpdate {
                    title: "Contact".into(),
                    description: None,
                    is_active: false,
                    styling: None,
                    fields: vec![],
                },
            )
            .await
            .unwrap();
        assert!(source.find_active_form_by_embed_code("abc123").await.unwrap().is_none());
        assert!(source.find_active_form_by_embed_code("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_reject_duplicate_embed_code() {
        let source = FixtureDataSource::new();
        source.create_form(new_form("user_1", "dup")).await.unwrap();

        let result = source.create_form(new_form("user_2", "dup")).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn should_replace_fields_with_contiguous_order() {
        // Arrange
        let source = FixtureDataSource::new();
        let record = source.create_form(new_form("user_1", "order")).await.unwrap();

        // Act
        let updated = source
            .update_form(
                record.form.form_id,
                FormUpdate {
                    title: "Renamed".into(),
                    description: Some("desc".into()),
                    is_active: true,
                    styling: None,
                    fields: vec![NewField {
                        label: "Phone".into(),
                        field_type: FieldType::Text,
                        required: false,
                        options: None,
                    }],
                },
            )
            .await
            .unwrap();

        // Assert
        assert_eq!(updated.form.title, "Renamed");
        assert_eq!(updated.fields.len(), 1);
        assert_eq!(updated.fields[0].label, "Phone");
        assert_eq!(updated.fields[0].order_index, 0);
    }

    #[tokio::test]
    async fn should_order_chat_messages_by_creation() {
        let source = FixtureDataSource::new();
        for (sender, text) in [(ChatSender::User, "hi"), (ChatSender::Ai, "hello"), (ChatSender::User, "bye")] {
            source
                .append_chat_message(NewChatMessage {
                    form_id: 1,
                    session_id: "s1".into(),
                    sender,
                    message: text.into(),
                })
                .await
                .unwrap();
        }

        let messages = source.list_chat_messages(1, "s1").await.unwrap();

        let texts: Vec<&str> = messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["hi", "hello", "bye"]);
        assert!(messages.windows(2).all(|w| w[0].created_at < w[1].created_at));
        assert!(source.list_chat_messages(1, "other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_reject_upload_over_allowance_without_side_effects() {
        // Arrange
        let source = FixtureDataSource::new();
        let company_id = company_with_usage(&source, 8.0, 10.0).await;

        // Act
        let rejected = source.record_upload(company_id, upload(3.0)).await;
        let accepted = source.record_upload(company_id, upload(1.5)).await;

        // Assert
        assert!(matches!(rejected, Err(AppError::QuotaExceeded(_))));
        assert!(accepted.is_ok());
        let company = source.find_company(company_id).await.unwrap().unwrap();
        assert_eq!(company.data_usage, 9.5);
        assert_eq!(source.list_company_files(company_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_restore_usage_on_single_delete() {
        let source = FixtureDataSource::new();
        let company_id = company_with_usage(&source, 0.0, 10.0).await;
        let file = source.record_upload(company_id, upload(2.5)).await.unwrap();

        let deleted = source.soft_delete_file(company_id, file.file_id).await.unwrap();

        assert!(deleted.deleted);
        let company = source.find_company(company_id).await.unwrap().unwrap();
        assert_eq!(company.data_usage, 0.0);
        assert!(matches!(
            source.soft_delete_file(company_id, file.file_id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_reset_drifted_usage_on_bulk_delete() {
        // Arrange
        let source = FixtureDataSource::new();
        let company_id = company_with_usage(&source, 0.0, 10.0).await;
        source.record_upload(company_id, upload(1.0)).await.unwrap();
        source.record_upload(company_id, upload(2.0)).await.unwrap();
        source.overwrite_data_usage(company_id, 7.3).unwrap();

        // Act
        let deleted = source.soft_delete_all_files(company_id).await.unwrap();

        // Assert
        assert_eq!(deleted.len(), 2);
        let company = source.find_company(company_id).await.unwrap().unwrap();
        assert_eq!(company.data_usage, 0.0);
        assert!(source.list_company_files(company_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_cascade_form_delete() {
        let source = FixtureDataSource::new();
        let record = source.create_form(new_form("user_1", "gone")).await.unwrap();
        let form_id = record.form.form_id;
        source
            .create_submission(NewSubmission {
                form_id,
                data: json!({ "1": "Jane" }),
                ip: "127.0.0.1".into(),
                user_agent: "Unknown".into(),
            })
            .await
            .unwrap();

        source.delete_form(form_id).await.unwrap();

        assert!(source.find_form(form_id).await.unwrap().is_none());
        assert!(source.list_submissions(form_id).await.unwrap().is_empty());
        assert!(source.find_active_form_by_embed_code("gone").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn seeded_source_should_expose_demo_form() {
        let source = FixtureDataSource::seeded();

        let record = source
            .find_active_form_by_embed_code(DEMO_EMBED_CODE)
            .await
            .unwrap()
            .expect("demo form");

        assert_eq!(record.fields.len(), 4);
        assert!(source.find_prompt(record.form.form_id).await.unwrap().is_some());
    }
}
