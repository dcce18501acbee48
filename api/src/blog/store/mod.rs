//! Persistence for posts and comments.
//!
//! Both resources sit behind object-safe traits so the HTTP layer does not
//! care whether rows live in process memory or in PostgreSQL. The comment
//! store never talks to the post tables directly, it goes through the narrow
//! [`PostAccess`] capability it was built with.

use async_trait::async_trait;

use super::{
    BlogError, PARENT_NOT_FOUND, PARENT_ON_OTHER_POST, POST_NOT_FOUND,
    models::{
        blog_comment::{BlogComment, CommentPatch, CommentSubmission},
        blog_post::{BlogPost, PostPatch, PostSubmission},
    },
    tree::CommentTree,
};
use crate::pagination::{Page, Paginated};

pub mod memory;
pub mod postgres;

/// What the comment store needs from the post store.
#[async_trait]
pub trait PostAccess: Send + Sync {
    async fn find_one(&self, id: i32) -> Result<BlogPost, BlogError>;

    /// Never fails, a missing post is ignored.
    async fn increment_comments_count(&self, post_id: i32);

    /// Never fails, a missing post is ignored and the counter stays >= 0.
    async fn decrement_comments_count(&self, post_id: i32);
}

#[async_trait]
pub trait PostStore: PostAccess {
    async fn create(&self, post: PostSubmission) -> Result<BlogPost, BlogError>;

    async fn find_all(
        &self,
        page: Page,
        published: Option<bool>,
    ) -> Result<Paginated<BlogPost>, BlogError>;

    async fn find_by_slug(&self, slug: &str) -> Result<BlogPost, BlogError>;

    async fn update(&self, id: i32, patch: PostPatch) -> Result<BlogPost, BlogError>;

    async fn remove(&self, id: i32) -> Result<(), BlogError>;

    async fn find_by_author(&self, author: &str) -> Result<Vec<BlogPost>, BlogError>;

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<BlogPost>, BlogError>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create(&self, comment: CommentSubmission) -> Result<BlogComment, BlogError>;

    async fn find_all(
        &self,
        page: Page,
        approved: Option<bool>,
    ) -> Result<Paginated<BlogComment>, BlogError>;

    /// The comments of a post nested into reply trees.
    async fn find_by_post(&self, post_id: i32) -> Result<Vec<CommentTree>, BlogError>;

    async fn find_by_author(&self, author: &str) -> Result<Vec<BlogComment>, BlogError>;

    async fn find_one(&self, id: i32) -> Result<BlogComment, BlogError>;

    async fn update(&self, id: i32, patch: CommentPatch) -> Result<BlogComment, BlogError>;

    async fn approve(&self, id: i32) -> Result<BlogComment, BlogError> {
        self.update(id, CommentPatch::approval(true)).await
    }

    async fn reject(&self, id: i32) -> Result<BlogComment, BlogError> {
        self.update(id, CommentPatch::approval(false)).await
    }

    /// Removes the comment and all of its replies, returning how many comments
    /// were deleted. The post's comment counter is decremented once.
    async fn remove(&self, id: i32) -> Result<usize, BlogError>;
}

// a comment can only be attached to a post that exists
async fn ensure_post_exists(posts: &dyn PostAccess, post_id: i32) -> Result<(), BlogError> {
    match posts.find_one(post_id).await {
        Ok(_) => Ok(()),
        Err(BlogError::NotFound(_)) => Err(BlogError::bad_request(POST_NOT_FOUND)),
        Err(e) => Err(e),
    }
}

// `parent_post_id` is the post of the parent comment, if the parent was found
fn check_parent(parent_post_id: Option<i32>, post_id: i32) -> Result<(), BlogError> {
    match parent_post_id {
        None => Err(BlogError::bad_request(PARENT_NOT_FOUND)),
        Some(id) if id != post_id => Err(BlogError::bad_request(PARENT_ON_OTHER_POST)),
        Some(_) => Ok(()),
    }
}
