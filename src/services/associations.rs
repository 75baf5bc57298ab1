use std::collections::HashMap;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{entity_ref::ref_ids, User, UserRole},
    repositories::{ClassRepository, UserRepository},
};

/// Orders `items` by `ids`, dropping ids with no matching item.
pub fn resolve_in_order<T, F>(ids: &[String], items: Vec<T>, id_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut by_id: HashMap<String, T> = items
        .into_iter()
        .map(|item| (id_of(&item).to_string(), item))
        .collect();

    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// Ids with duplicates removed, first occurrence kept.
pub fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(id.clone());
        }
    }
    unique
}

/// Fails with `what` naming the first id that was not found.
pub fn ensure_all_found(ids: &[String], found: &[&str], what: &str) -> AppResult<()> {
    match ids.iter().find(|id| !found.contains(&id.as_str())) {
        Some(missing) => Err(AppError::ValidationError(format!(
            "{} with id '{}' does not exist",
            what, missing
        ))),
        None => Ok(()),
    }
}

/// Loads users by id, requiring every one to exist and to hold `role`.
pub async fn users_with_role(
    users: &dyn UserRepository,
    ids: &[String],
    role: UserRole,
) -> AppResult<Vec<User>> {
    let ids = dedup_ids(ids);
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let found = users.find_by_ids(&ids).await?;
    let found_ids: Vec<&str> = found.iter().map(|u| u.id.as_str()).collect();
    ensure_all_found(&ids, &found_ids, "User")?;

    if let Some(user) = found.iter().find(|u| u.role != role) {
        return Err(AppError::ValidationError(format!(
            "User '{}' is a {}, expected a {}",
            user.id, user.role, role
        )));
    }

    Ok(resolve_in_order(&ids, found, |u| u.id.as_str()))
}

/// Classes a student belongs to and the courses taught in them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentAudience {
    pub class_ids: Vec<String>,
    pub course_ids: Vec<String>,
}

pub async fn student_audience(
    classes: &dyn ClassRepository,
    student_id: &str,
) -> AppResult<StudentAudience> {
    let classes = classes.find_by_student(student_id).await?;

    let class_ids = classes.iter().map(|c| c.id.clone()).collect();
    let course_ids = dedup_ids(
        &classes
            .iter()
            .flat_map(|c| ref_ids(&c.courses))
            .collect::<Vec<_>>(),
    );

    Ok(StudentAudience {
        class_ids,
        course_ids,
    })
}
