use async_graphql::{Context, Object, Result, ResultExt, ID};

use crate::{
    app_state::AppState,
    auth::{extract_claims_from_context, require_admin},
    models::{
        domain::{AttendanceRecord, Submission, UserRole},
        dto::{
            request::{EvaluateSubmissionRequest, MarkAttendanceRequest, SubmitQuizRequest},
            response::UserDto,
        },
    },
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn approve_user(&self, ctx: &Context<'_>, id: ID) -> Result<UserDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        require_admin(&claims).extend()?;

        Ok(state.user_service.approve(&id).await.extend()?.into())
    }

    async fn reject_user(&self, ctx: &Context<'_>, id: ID) -> Result<UserDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        require_admin(&claims).extend()?;

        Ok(state.user_service.reject(&id).await.extend()?.into())
    }

    async fn update_user_role(
        &self,
        ctx: &Context<'_>,
        id: ID,
        role: UserRole,
    ) -> Result<UserDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        require_admin(&claims).extend()?;

        Ok(state.user_service.update_role(&id, role).await.extend()?.into())
    }

    async fn submit_quiz(
        &self,
        ctx: &Context<'_>,
        quiz_id: ID,
        input: SubmitQuizRequest,
    ) -> Result<Submission> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        state.submission_service.submit(&claims, &quiz_id, input).await.extend()
    }

    async fn evaluate_submission(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: EvaluateSubmissionRequest,
    ) -> Result<Submission> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        state.submission_service.evaluate(&claims, &id, input).await.extend()
    }

    async fn mark_attendance(
        &self,
        ctx: &Context<'_>,
        input: MarkAttendanceRequest,
    ) -> Result<AttendanceRecord> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        state.attendance_service.mark(&claims, input).await.extend()
    }
}

#[cfg(test)]
mod tests {
    use async_graphql::Request;

    use crate::{
        app_state::AppState,
        config::Config,
        graphql::create_schema,
        models::domain::{UserRole, UserStatus},
        test_utils::{fixtures, MockRepos},
    };

    #[tokio::test]
    async fn admin_approves_pending_user() {
        let mut mocks = MockRepos::new();
        mocks.users.expect_find_by_id().returning(|_| {
            let mut user = fixtures::approved_user("stu-9", UserRole::Student);
            user.status = UserStatus::Pending;
            Ok(Some(user))
        });
        mocks.users.expect_update().returning(Ok);
        let state = AppState::from_repositories(Config::test_config(), mocks.build(), None);
        let schema = create_schema(state);

        let request = Request::new(r#"mutation { approveUser(id: "stu-9") { id status } }"#)
            .data(fixtures::claims_for("adm-1", UserRole::Admin));
        let response = schema.execute(request).await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        assert_eq!(data["approveUser"]["status"], "APPROVED");
    }

    #[tokio::test]
    async fn teachers_cannot_approve_users() {
        let state = AppState::from_repositories(Config::test_config(), MockRepos::new().build(), None);
        let schema = create_schema(state);

        let request = Request::new(r#"mutation { approveUser(id: "stu-9") { id } }"#)
            .data(fixtures::claims_for("tch-1", UserRole::Teacher));
        let response = schema.execute(request).await;

        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.contains("Forbidden"));
        let error = serde_json::to_value(&response.errors[0]).unwrap();
        assert_eq!(error["extensions"]["code"], "FORBIDDEN");
    }
}
