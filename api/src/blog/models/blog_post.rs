use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Queryable, Selectable, QueryableByName, Debug, Serialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub slug: String,
    pub published: bool,
    pub tags: Vec<String>,
    pub comments_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::posts)]
pub struct NewBlogPost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub slug: String,
    pub published: bool,
    pub tags: Vec<String>,
    pub comments_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::posts)]
pub struct UpdateBlogPost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub slug: Option<String>,
    pub published: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /posts`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PostSubmission {
    pub title: String,
    pub content: String,
    pub author: String,
    pub published: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// Body of `PATCH /posts/{id}`. Absent fields are left untouched.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub published: Option<bool>,
    pub tags: Option<Vec<String>>,
}
