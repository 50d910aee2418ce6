//! Admin dashboard endpoints: questions, user accounts and system prompts.

use mealplan_survey_types::{
    ApiError, PendingUser, QuestionDefinition, QuestionDraft, QuestionId, QuestionOrder,
    SystemPrompt, SystemPromptDraft, SystemPromptId, UserAccount, UserId,
};
use reqwest::Method;
use serde_json::Value;

use crate::HttpApi;
use crate::client::{draft_rejected, parse_list, parse_questions};

/// Admin view of the backend. Requires a token with admin rights.
#[derive(Clone, Copy)]
pub struct AdminApi<'a> {
    api: &'a HttpApi,
}

impl HttpApi {
    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi { api: self }
    }
}

impl AdminApi<'_> {
    /// Every question, inactive ones included.
    pub async fn list_questions(&self) -> Result<Vec<QuestionDefinition>, ApiError> {
        let body: Value = self.api.get_json("/admin/questions").await?;
        parse_questions(body)
    }

    pub async fn create_question(&self, draft: QuestionDraft) -> Result<QuestionDefinition, ApiError> {
        let draft = draft.validate().map_err(draft_rejected)?;
        self.api
            .read_json(self.api.request(Method::POST, "/admin/questions").json(&draft))
            .await
    }

    pub async fn update_question(
        &self,
        id: QuestionId,
        draft: QuestionDraft,
    ) -> Result<QuestionDefinition, ApiError> {
        let draft = draft.validate().map_err(draft_rejected)?;
        self.api
            .read_json(
                self.api
                    .request(Method::PUT, &format!("/admin/questions/{id}"))
                    .json(&draft),
            )
            .await
    }

    pub async fn delete_question(&self, id: QuestionId) -> Result<(), ApiError> {
        self.call(Method::DELETE, &format!("/admin/questions/{id}"))
            .await?;
        log::info!("Deleted question {id}");
        Ok(())
    }

    /// Persist a new order, as produced by `reorder_after_move`.
    pub async fn reorder_questions(&self, orders: &[QuestionOrder]) -> Result<(), ApiError> {
        self.api
            .send(
                self.api
                    .request(Method::POST, "/admin/questions/reorder")
                    .json(orders),
            )
            .await?;
        Ok(())
    }

    /// Accounts that registered and still wait for a decision.
    pub async fn pending_users(&self) -> Result<Vec<PendingUser>, ApiError> {
        let body: Value = self.api.get_json("/admin/users/pending").await?;
        parse_list(body, "pending users")
    }

    pub async fn approve_user(&self, id: UserId) -> Result<(), ApiError> {
        self.call(Method::POST, &format!("/admin/users/{id}/approve"))
            .await?;
        log::info!("Approved user {id}");
        Ok(())
    }

    /// Reject a registration. The backend deactivates the account.
    pub async fn reject_user(&self, id: UserId) -> Result<(), ApiError> {
        self.call(Method::POST, &format!("/admin/users/{id}/reject"))
            .await?;
        log::info!("Rejected user {id}");
        Ok(())
    }

    pub async fn list_users(&self) -> Result<Vec<UserAccount>, ApiError> {
        let body: Value = self.api.get_json("/users/all").await?;
        parse_list(body, "users")
    }

    /// Flip whether the account may log in. Returns the updated account.
    pub async fn toggle_user_active(&self, id: UserId) -> Result<UserAccount, ApiError> {
        self.api
            .read_json(
                self.api
                    .request(Method::PUT, &format!("/users/toggle-active/{id}")),
            )
            .await
    }

    /// Grant or revoke admin rights. Administrators cannot change their own.
    pub async fn toggle_user_admin(&self, id: UserId) -> Result<UserAccount, ApiError> {
        self.api
            .read_json(
                self.api
                    .request(Method::PUT, &format!("/users/toggle-admin/{id}")),
            )
            .await
    }

    pub async fn list_system_prompts(&self) -> Result<Vec<SystemPrompt>, ApiError> {
        let body: Value = self.api.get_json("/admin/system-prompts").await?;
        parse_list(body, "system prompts")
    }

    pub async fn system_prompt(&self, id: SystemPromptId) -> Result<SystemPrompt, ApiError> {
        self.api
            .get_json(&format!("/admin/system-prompts/{id}"))
            .await
    }

    pub async fn create_system_prompt(
        &self,
        draft: SystemPromptDraft,
    ) -> Result<SystemPrompt, ApiError> {
        let draft = draft.validate().map_err(draft_rejected)?;
        let prompt: SystemPrompt = self
            .api
            .read_json(
                self.api
                    .request(Method::POST, "/admin/system-prompts")
                    .json(&draft),
            )
            .await?;
        log::info!("Created system prompt {} ({})", prompt.id, prompt.name);
        Ok(prompt)
    }

    pub async fn update_system_prompt(
        &self,
        id: SystemPromptId,
        draft: SystemPromptDraft,
    ) -> Result<SystemPrompt, ApiError> {
        let draft = draft.validate().map_err(draft_rejected)?;
        self.api
            .read_json(
                self.api
                    .request(Method::PUT, &format!("/admin/system-prompts/{id}"))
                    .json(&draft),
            )
            .await
    }

    pub async fn delete_system_prompt(&self, id: SystemPromptId) -> Result<(), ApiError> {
        self.call(Method::DELETE, &format!("/admin/system-prompts/{id}"))
            .await?;
        log::info!("Deleted system prompt {id}");
        Ok(())
    }

    pub async fn toggle_system_prompt_active(
        &self,
        id: SystemPromptId,
    ) -> Result<SystemPrompt, ApiError> {
        self.api
            .read_json(
                self.api
                    .request(Method::POST, &format!("/admin/system-prompts/{id}/toggle-active")),
            )
            .await
    }

    /// Bodyless request whose answer is only a confirmation message.
    async fn call(&self, method: Method, path: &str) -> Result<(), ApiError> {
        self.api.send(self.api.request(method, path)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mealplan_survey_types::{DraftError, QuestionType};

    use super::*;

    #[test]
    fn invalid_draft_is_rejected_before_sending() {
        let err = QuestionDraft::new("Diet?", "goals", QuestionType::Radio, "goals.diet")
            .validate()
            .map_err(draft_rejected)
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.message(), "radio questions must have options");

        let err = draft_rejected(DraftError::MissingFields(vec!["name"]));
        assert_eq!(err.message(), "Please fill in all required fields: name");
    }

    #[test]
    fn drafts_serialize_in_backend_shape() {
        let draft = QuestionDraft::new("Age", "personal_info", QuestionType::Number, "p.age")
            .with_order(3)
            .validate()
            .unwrap();
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["question_type"], "number");
        assert_eq!(value["field_key"], "p.age");
        assert_eq!(value["validation"]["required"], true);
        assert_eq!(value["order"], 3);
    }
}
