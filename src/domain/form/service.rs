use tracing::info;

use crate::domain::embed::script::{
    embed_path, form_snippet, form_url, generate_embed_code, iframe_snippet, inline_embed_script,
    is_script_safe_id,
};
use crate::state::AppState;
use crate::store::{FormRecord, FormUpdate, NewField, NewForm};
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;

use super::dto::{
    CreateFormRequest, DeleteFormResponse, EmbedInfoResponse, FormDetailResponse, FormListItem,
    UpdateFormRequest,
};

pub struct FormService;

impl FormService {
    /// 폼 생성
    ///
    /// 필드 순서는 요청 배열 순서를 따르며, 임베드 코드가 없으면 생성합니다.
    pub async fn create_form(
        state: &AppState,
        auth: &AuthUser,
        req: CreateFormRequest,
    ) -> Result<FormDetailResponse, AppError> {
        // 1. 제목, 임베드 코드 검증
        let title = Self::require_title(&req.title)?;
        let embed_code = match req
            .embed_code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
        {
            Some(code) if is_script_safe_id(&code) => code,
            Some(_) => {
                return Err(AppError::validation_error(
                    "Embed code may only contain letters, digits, '-' and '_' (max 64).",
                ))
            }
            None => generate_embed_code(),
        };

        // 2. 생성 시점의 소유자 회사
        let company_id = match &auth.user {
            Some(user) => state
                .store
                .find_company_by_user(user.user_id)
                .await?
                .map(|company| company.company_id),
            None => None,
        };

        // 3. 폼 + 필드 + 임베드 생성 (단일 트랜잭션)
        let record = state
            .store
            .create_form(NewForm {
                owner_id: auth.external_id.clone(),
                company_id,
                title,
                description: Self::normalize(req.description),
                styling: req.styling.map(|styling| styling.to_stored()),
                fields: req.fields.into_iter().map(NewField::from).collect(),
                embed_url: embed_path(&embed_code),
                embed_code,
            })
            .await?;

        info!(
            form_id = record.form.form_id,
            owner_id = %auth.external_id,
            fields = record.fields.len(),
            "Form created"
        );

        Ok(FormDetailResponse::from(&record))
    }

    /// 내 폼 목록 (최신순)
    pub async fn list_forms(
        state: &AppState,
        auth: &AuthUser,
    ) -> Result<Vec<FormListItem>, AppError> {
        let forms = state.store.list_forms(&auth.external_id).await?;
        Ok(forms.into_iter().map(FormListItem::from).collect())
    }

    pub async fn get_form(
        state: &AppState,
        auth: &AuthUser,
        form_id: i64,
    ) -> Result<FormDetailResponse, AppError> {
        let record = Self::find_owned(state, auth, form_id).await?;
        Ok(FormDetailResponse::from(&record))
    }

    /// 폼 수정
    ///
    /// 필드는 병합하지 않고 요청 목록으로 전부 교체합니다.
    pub async fn update_form(
        state: &AppState,
        auth: &AuthUser,
        form_id: i64,
        req: UpdateFormRequest,
    ) -> Result<FormDetailResponse, AppError> {
        let title = Self::require_title(&req.title)?;
        Self::find_owned(state, auth, form_id).await?;

        let record = state
            .store
            .update_form(
                form_id,
                FormUpdate {
                    title,
                    description: Self::normalize(req.description),
                    is_active: req.is_published,
                    styling: req.styling.map(|styling| styling.to_stored()),
                    fields: req.fields.into_iter().map(NewField::from).collect(),
                },
            )
            .await?;

        info!(
            form_id,
            fields = record.fields.len(),
            is_active = record.form.is_active,
            "Form updated"
        );

        Ok(FormDetailResponse::from(&record))
    }

    /// 폼 삭제 (필드, 임베드, 프롬프트, 제출, 채팅 포함)
    pub async fn delete_form(
        state: &AppState,
        auth: &AuthUser,
        form_id: i64,
    ) -> Result<DeleteFormResponse, AppError> {
        Self::find_owned(state, auth, form_id).await?;
        state.store.delete_form(form_id).await?;

        Ok(DeleteFormResponse { id: form_id })
    }

    /// 대시보드 임베드 페이지용 코드 묶음
    pub async fn embed_info(
        state: &AppState,
        auth: &AuthUser,
        form_id: i64,
    ) -> Result<EmbedInfoResponse, AppError> {
        let record = Self::find_owned(state, auth, form_id).await?;
        let embed = record
            .primary_embed()
            .ok_or_else(|| AppError::not_found("No embed code found for this form"))?;

        let base_url = state.config.app_base_url.as_str();
        let id = form_id.to_string();

        Ok(EmbedInfoResponse {
            form_id,
            title: record.form.title.clone(),
            embed_code: embed.embed_code.clone(),
            embed_url: format!("{}{}", base_url, embed_path(&embed.embed_code)),
            form_url: form_url(&id, base_url),
            embed_script: inline_embed_script(&embed.embed_code, base_url),
            iframe_snippet: iframe_snippet(&embed.embed_code, base_url),
            loader_snippet: form_snippet(&id, base_url),
        })
    }

    /// 호출자 소유의 폼 조회. 남의 폼은 존재하지 않는 것으로 취급합니다.
    pub async fn find_owned(
        state: &AppState,
        auth: &AuthUser,
        form_id: i64,
    ) -> Result<FormRecord, AppError> {
        state
            .store
            .find_form(form_id)
            .await?
            .filter(|record| record.form.owner_id == auth.external_id)
            .ok_or_else(|| AppError::not_found("Form not found"))
    }

    fn require_title(title: &str) -> Result<String, AppError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation_error("Title is required"));
        }
        Ok(trimmed.to_string())
    }

    fn normalize(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
