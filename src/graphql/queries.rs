use async_graphql::{Context, ErrorExtensions, Object, Result, ResultExt, ID};

use crate::{
    app_state::AppState,
    auth::{extract_claims_from_context, require_admin, require_approved, require_role, require_staff},
    errors::AppError,
    models::{
        domain::{AttendanceRecord, Class, Course, Quiz, Submission, UserRole, UserStatus},
        dto::{
            quiz_dto::QuizForTaking,
            request::UserListQuery,
            response::{AttendanceSummary, ClassDetail, PaginatedUsers, StudentAttendance, UserDto},
        },
    },
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn me(&self, ctx: &Context<'_>) -> Result<UserDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        Ok(state.user_service.get_user(&claims.sub).await.extend()?.into())
    }

    async fn users(
        &self,
        ctx: &Context<'_>,
        role: Option<UserRole>,
        status: Option<UserStatus>,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> Result<PaginatedUsers> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        require_admin(&claims).extend()?;

        let query = UserListQuery {
            role,
            status,
            offset,
            limit,
        };
        state.user_service.list_users(&query).await.extend()
    }

    async fn pending_users(&self, ctx: &Context<'_>) -> Result<Vec<UserDto>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        require_admin(&claims).extend()?;

        state.user_service.list_pending().await.extend()
    }

    /// Classes the caller can see: all of them for admins, otherwise their own.
    async fn classes(&self, ctx: &Context<'_>) -> Result<Vec<Class>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        require_approved(&claims).extend()?;

        match claims.role {
            UserRole::Admin => state.class_service.list_classes().await,
            UserRole::Teacher => state.class_service.classes_for_teacher(&claims.sub).await,
            UserRole::Student => state.class_service.classes_for_student(&claims.sub).await,
        }
        .extend()
    }

    async fn class(&self, ctx: &Context<'_>, id: ID) -> Result<ClassDetail> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        state.class_service.class_detail_for(&claims, &id).await.extend()
    }

    async fn courses(&self, ctx: &Context<'_>) -> Result<Vec<Course>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        require_approved(&claims).extend()?;

        match claims.role {
            UserRole::Admin => state.course_service.list_courses().await,
            UserRole::Teacher => state.course_service.courses_for_teacher(&claims.sub).await,
            UserRole::Student => state.course_service.courses_for_student(&claims.sub).await,
        }
        .extend()
    }

    /// Full quizzes, answers included. Staff only.
    async fn quizzes(&self, ctx: &Context<'_>) -> Result<Vec<Quiz>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        state.quiz_service.list_quizzes(&claims).await.extend()
    }

    async fn student_quizzes(&self, ctx: &Context<'_>) -> Result<Vec<QuizForTaking>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        require_role(&claims, UserRole::Student).extend()?;

        state.quiz_service.quizzes_for_student(&claims.sub).await.extend()
    }

    async fn quiz_for_taking(&self, ctx: &Context<'_>, id: ID) -> Result<QuizForTaking> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        require_role(&claims, UserRole::Student).extend()?;

        state.quiz_service.quiz_for_taking(&claims.sub, &id).await.extend()
    }

    async fn submissions(&self, ctx: &Context<'_>, quiz_id: ID) -> Result<Vec<Submission>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        state
            .submission_service
            .submissions_for_quiz(&claims, &quiz_id)
            .await
            .extend()
    }

    async fn my_submissions(&self, ctx: &Context<'_>) -> Result<Vec<Submission>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        require_role(&claims, UserRole::Student).extend()?;

        state
            .submission_service
            .submissions_for_student(&claims.sub)
            .await
            .extend()
    }

    async fn attendance(&self, ctx: &Context<'_>, class_id: ID) -> Result<Vec<AttendanceRecord>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        require_staff(&claims).extend()?;

        state.attendance_service.records_for_class(&class_id).await.extend()
    }

    async fn my_attendance(&self, ctx: &Context<'_>) -> Result<Vec<StudentAttendance>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        require_role(&claims, UserRole::Student).extend()?;

        state.attendance_service.records_for_student(&claims.sub).await.extend()
    }

    /// Students get their own summary; staff may pass any student id.
    async fn attendance_summary(
        &self,
        ctx: &Context<'_>,
        student_id: Option<ID>,
        class_id: Option<ID>,
    ) -> Result<AttendanceSummary> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        require_approved(&claims).extend()?;

        let student_id = match (claims.role, student_id) {
            (UserRole::Student, _) => claims.sub.clone(),
            (_, Some(id)) => id.0,
            (_, None) => {
                return Err(AppError::BadRequest("studentId is required".into()).extend());
            }
        };

        state
            .attendance_service
            .summary(&student_id, class_id.map(|id| id.0))
            .await
            .extend()
    }
}
