use actix_web::{get, http::header, web, HttpResponse};
use futures::stream;

use crate::{
    app_state::AppState,
    auth::{require_approved, CurrentUser},
    db::CollectionName,
    errors::{AppError, AppResult},
    models::domain::UserRole,
    services::CollectionSnapshot,
};

/// Students only see the class and course catalogues; the user list is for admins.
pub fn can_stream(role: UserRole, collection: CollectionName) -> bool {
    match (role, collection) {
        (UserRole::Admin, _) => true,
        (_, CollectionName::Users) => false,
        (UserRole::Teacher, _) => true,
        (UserRole::Student, c) => matches!(c, CollectionName::Classes | CollectionName::Courses),
    }
}

fn sse_event(snapshot: &CollectionSnapshot) -> AppResult<web::Bytes> {
    let payload = serde_json::to_string(snapshot)?;
    Ok(web::Bytes::from(format!(
        "event: snapshot\nid: {}\ndata: {}\n\n",
        snapshot.version, payload
    )))
}

/// Server-sent events carrying the whole collection after every change.
#[get("/api/stream/{collection}")]
pub async fn stream_collection(
    state: web::Data<AppState>,
    collection: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_approved(&user.0)?;
    let collection: CollectionName = collection.parse()?;

    if !can_stream(user.0.role, collection) {
        return Err(AppError::Forbidden(format!(
            "{} users cannot subscribe to {}",
            user.0.role, collection
        )));
    }

    // Subscribe first so the initial publish counts as a change.
    let receiver = state.realtime.subscribe(collection)?;
    state.realtime.publish_current(collection).await?;
    log::info!("User '{}' subscribed to {}", user.0.sub, collection);

    let events = stream::unfold(receiver, |mut receiver| async move {
        receiver.changed().await.ok()?;
        let snapshot = receiver.borrow_and_update().clone();
        Some((sse_event(&snapshot), receiver))
    });

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(events))
}
