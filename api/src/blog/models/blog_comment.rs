use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Queryable, Selectable, Debug, Serialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct BlogComment {
    pub id: i32,
    pub content: String,
    pub author: String,
    pub email: String,
    pub post_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i32>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::comments)]
pub struct NewBlogComment {
    pub content: String,
    pub author: String,
    pub email: String,
    pub post_id: i32,
    pub parent_id: Option<i32>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::comments)]
pub struct UpdateBlogComment {
    pub content: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
    pub approved: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /comments`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommentSubmission {
    pub content: String,
    pub author: String,
    pub email: String,
    pub post_id: i32,
    pub parent_id: Option<i32>,
}

/// Body of `PATCH /comments/{id}`. The post and parent of a comment can never
/// be changed, so they are not accepted here.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommentPatch {
    pub content: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
    pub approved: Option<bool>,
}

impl CommentPatch {
    pub fn approval(approved: bool) -> Self {
        CommentPatch {
            approved: Some(approved),
            ..Default::default()
        }
    }
}
