use async_graphql::{ComplexObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::{
    entity_ref::{contains_ref, ref_ids, EntityRef},
    ids::generate_id,
};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
#[graphql(complex)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[graphql(skip)]
    #[serde(default)]
    pub courses: Vec<EntityRef>,
    #[graphql(skip)]
    #[serde(default)]
    pub students: Vec<EntityRef>,
    #[serde(default)]
    pub teacher_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[ComplexObject]
impl Class {
    async fn course_ids(&self) -> Vec<String> {
        ref_ids(&self.courses)
    }

    async fn student_ids(&self) -> Vec<String> {
        ref_ids(&self.students)
    }
}

impl Class {
    pub fn new(name: &str, description: Option<String>) -> Self {
        Class {
            id: generate_id(),
            name: name.to_string(),
            description,
            courses: Vec::new(),
            students: Vec::new(),
            teacher_ids: Vec::new(),
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }

    pub fn has_student(&self, student_id: &str) -> bool {
        contains_ref(&self.students, student_id)
    }

    pub fn has_course(&self, course_id: &str) -> bool {
        contains_ref(&self.courses, course_id)
    }

    pub fn touch(&mut self) {
        self.modified_at = Some(Utc::now());
    }
}
