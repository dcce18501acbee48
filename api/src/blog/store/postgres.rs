use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::{
    pg::Pg,
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
    sql_types::Text,
};
use diesel_async::{AsyncPgConnection, RunQueryDsl, pooled_connection::deadpool::Pool};

use super::{CommentStore, PostAccess, PostStore, check_parent, ensure_post_exists};
use crate::{
    blog::{
        BlogError,
        models::{
            blog_comment::{
                BlogComment, CommentPatch, CommentSubmission, NewBlogComment, UpdateBlogComment,
            },
            blog_post::{BlogPost, NewBlogPost, PostPatch, PostSubmission, UpdateBlogPost},
        },
        tree::{CommentTree, collect_subtree, flat_comments_to_tree},
    },
    pagination::{Page, Paginated},
    schema::{comments, posts},
    utils::{contains_pattern, slugify},
};

pub type DbPool = Pool<AsyncPgConnection>;

// the unique index on posts.slug catches inserts racing past the explicit check
fn slug_conflict(e: DieselError) -> BlogError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            BlogError::DuplicateSlug
        }
        e => e.into(),
    }
}

fn posts_filtered(published: Option<bool>) -> posts::BoxedQuery<'static, Pg> {
    let mut query = posts::table.into_boxed();
    if let Some(published) = published {
        query = query.filter(posts::published.eq(published));
    }
    query
}

fn comments_filtered(approved: Option<bool>) -> comments::BoxedQuery<'static, Pg> {
    let mut query = comments::table.into_boxed();
    if let Some(approved) = approved {
        query = query.filter(comments::approved.eq(approved));
    }
    query
}

pub struct PgPostStore {
    pool: DbPool,
}

impl PgPostStore {
    pub fn new(pool: DbPool) -> Self {
        PgPostStore { pool }
    }

    async fn slug_taken(
        conn: &mut AsyncPgConnection,
        slug: &str,
        except: Option<i32>,
    ) -> Result<bool, BlogError> {
        let mut query = posts::table
            .filter(posts::slug.eq(slug))
            .select(posts::id)
            .into_boxed();
        if let Some(id) = except {
            query = query.filter(posts::id.ne(id));
        }

        Ok(query.first::<i32>(conn).await.optional()?.is_some())
    }

    // a missing post updates no row, the counter never drops below zero
    async fn shift_comments_count(&self, post_id: i32, delta: i32) -> Result<usize, BlogError> {
        let mut conn = self.pool.get().await?;

        Ok(diesel::update(
            posts::table
                .find(post_id)
                .filter(posts::comments_count.ge(-delta)),
        )
        .set(posts::comments_count.eq(posts::comments_count + delta))
        .execute(&mut conn)
        .await?)
    }
}

#[async_trait]
impl PostAccess for PgPostStore {
    async fn find_one(&self, id: i32) -> Result<BlogPost, BlogError> {
        let mut conn = self.pool.get().await?;

        posts::table
            .find(id)
            .select(BlogPost::as_select())
            .first(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| BlogError::post_not_found(id))
    }

    async fn increment_comments_count(&self, post_id: i32) {
        if let Err(error) = self.shift_comments_count(post_id, 1).await {
            tracing::error!(%error, post_id, "Could not increment the comments count");
        }
    }

    async fn decrement_comments_count(&self, post_id: i32) {
        if let Err(error) = self.shift_comments_count(post_id, -1).await {
            tracing::error!(%error, post_id, "Could not decrement the comments count");
        }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn create(&self, post: PostSubmission) -> Result<BlogPost, BlogError> {
        let slug = slugify(&post.title);
        let mut conn = self.pool.get().await?;

        if Self::slug_taken(&mut conn, &slug, None).await? {
            return Err(BlogError::DuplicateSlug);
        }

        let now = Utc::now();
        let post = diesel::insert_into(posts::table)
            .values(NewBlogPost {
                title: post.title,
                content: post.content,
                author: post.author,
                slug,
                published: post.published.unwrap_or(false),
                tags: post.tags.unwrap_or_default(),
                comments_count: 0,
                created_at: now,
                updated_at: now,
            })
            .returning(BlogPost::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(slug_conflict)?;

        tracing::debug!(id = post.id, slug = %post.slug, "Created post");
        Ok(post)
    }

    async fn find_all(
        &self,
        page: Page,
        published: Option<bool>,
    ) -> Result<Paginated<BlogPost>, BlogError> {
        let mut conn = self.pool.get().await?;

        let total: i64 = posts_filtered(published)
            .count()
            .get_result(&mut conn)
            .await?;

        let items = posts_filtered(published)
            .order(posts::id.asc())
            .limit(page.limit as i64)
            .offset(page.offset() as i64)
            .select(BlogPost::as_select())
            .load(&mut conn)
            .await?;

        Ok(Paginated {
            items,
            total: total as usize,
            page,
        })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<BlogPost, BlogError> {
        let mut conn = self.pool.get().await?;

        posts::table
            .filter(posts::slug.eq(slug))
            .select(BlogPost::as_select())
            .first(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| BlogError::NotFound(format!("Post with slug \"{slug}\" not found")))
    }

    async fn update(&self, id: i32, patch: PostPatch) -> Result<BlogPost, BlogError> {
        let mut conn = self.pool.get().await?;

        let title = posts::table
            .find(id)
            .select(posts::title)
            .first::<String>(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| BlogError::post_not_found(id))?;

        let slug = match &patch.title {
            Some(new_title) if *new_title != title => {
                let slug = slugify(new_title);
                if Self::slug_taken(&mut conn, &slug, Some(id)).await? {
                    return Err(BlogError::DuplicateSlug);
                }
                Some(slug)
            }
            _ => None,
        };

        diesel::update(posts::table.find(id))
            .set(UpdateBlogPost {
                title: patch.title,
                content: patch.content,
                author: patch.author,
                slug,
                published: patch.published,
                tags: patch.tags,
                updated_at: Utc::now(),
            })
            .returning(BlogPost::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(slug_conflict)?
            .ok_or_else(|| BlogError::post_not_found(id))
    }

    async fn remove(&self, id: i32) -> Result<(), BlogError> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(posts::table.find(id))
            .execute(&mut conn)
            .await?;

        if deleted == 0 {
            return Err(BlogError::post_not_found(id));
        }

        Ok(())
    }

    async fn find_by_author(&self, author: &str) -> Result<Vec<BlogPost>, BlogError> {
        let mut conn = self.pool.get().await?;

        Ok(posts::table
            .filter(posts::author.ilike(contains_pattern(author)))
            .order(posts::id.asc())
            .select(BlogPost::as_select())
            .load(&mut conn)
            .await?)
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<BlogPost>, BlogError> {
        let mut conn = self.pool.get().await?;

        Ok(diesel::sql_query(
            "
            SELECT * FROM posts
            WHERE EXISTS (
                SELECT 1 FROM unnest(posts.tags) AS tag WHERE tag ILIKE $1
            )
            ORDER BY id;
            ",
        )
        .bind::<Text, _>(contains_pattern(tag))
        .load::<BlogPost>(&mut conn)
        .await?)
    }
}

pub struct PgCommentStore {
    pool: DbPool,
    posts: Arc<dyn PostAccess>,
}

impl PgCommentStore {
    pub fn new(pool: DbPool, posts: Arc<dyn PostAccess>) -> Self {
        PgCommentStore { pool, posts }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn create(&self, comment: CommentSubmission) -> Result<BlogComment, BlogError> {
        ensure_post_exists(self.posts.as_ref(), comment.post_id).await?;

        let mut conn = self.pool.get().await?;

        // check if the parent comment actually belongs to the post
        if let Some(parent_id) = comment.parent_id {
            let parent_post_id = comments::table
                .find(parent_id)
                .select(comments::post_id)
                .first::<i32>(&mut conn)
                .await
                .optional()?;
            check_parent(parent_post_id, comment.post_id)?;
        }

        let now = Utc::now();
        let comment = diesel::insert_into(comments::table)
            .values(NewBlogComment {
                content: comment.content,
                author: comment.author,
                email: comment.email,
                post_id: comment.post_id,
                parent_id: comment.parent_id,
                approved: true,
                created_at: now,
                updated_at: now,
            })
            .returning(BlogComment::as_returning())
            .get_result(&mut conn)
            .await?;

        drop(conn);
        self.posts.increment_comments_count(comment.post_id).await;
        tracing::debug!(id = comment.id, post_id = comment.post_id, "Created comment");

        Ok(comment)
    }

    async fn find_all(
        &self,
        page: Page,
        approved: Option<bool>,
    ) -> Result<Paginated<BlogComment>, BlogError> {
        let mut conn = self.pool.get().await?;

        let total: i64 = comments_filtered(approved)
            .count()
            .get_result(&mut conn)
            .await?;

        let items = comments_filtered(approved)
            .order(comments::id.asc())
            .limit(page.limit as i64)
            .offset(page.offset() as i64)
            .select(BlogComment::as_select())
            .load(&mut conn)
            .await?;

        Ok(Paginated {
            items,
            total: total as usize,
            page,
        })
    }

    async fn find_by_post(&self, post_id: i32) -> Result<Vec<CommentTree>, BlogError> {
        ensure_post_exists(self.posts.as_ref(), post_id).await?;

        let mut conn = self.pool.get().await?;
        let rows = comments::table
            .filter(comments::post_id.eq(post_id))
            .order(comments::id.asc())
            .select(BlogComment::as_select())
            .load(&mut conn)
            .await?;

        Ok(flat_comments_to_tree(rows))
    }

    async fn find_by_author(&self, author: &str) -> Result<Vec<BlogComment>, BlogError> {
        let mut conn = self.pool.get().await?;

        Ok(comments::table
            .filter(comments::author.ilike(contains_pattern(author)))
            .order(comments::id.asc())
            .select(BlogComment::as_select())
            .load(&mut conn)
            .await?)
    }

    async fn find_one(&self, id: i32) -> Result<BlogComment, BlogError> {
        let mut conn = self.pool.get().await?;

        comments::table
            .find(id)
            .select(BlogComment::as_select())
            .first(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| BlogError::comment_not_found(id))
    }

    async fn update(&self, id: i32, patch: CommentPatch) -> Result<BlogComment, BlogError> {
        let mut conn = self.pool.get().await?;

        diesel::update(comments::table.find(id))
            .set(UpdateBlogComment {
                content: patch.content,
                author: patch.author,
                email: patch.email,
                approved: patch.approved,
                updated_at: Utc::now(),
            })
            .returning(BlogComment::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| BlogError::comment_not_found(id))
    }

    async fn remove(&self, id: i32) -> Result<usize, BlogError> {
        let mut conn = self.pool.get().await?;

        let post_id = comments::table
            .find(id)
            .select(comments::post_id)
            .first::<i32>(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| BlogError::comment_not_found(id))?;

        // replies always live on the same post, so its comments are enough to
        // walk the whole thread
        let links = comments::table
            .filter(comments::post_id.eq(post_id))
            .select((comments::id, comments::parent_id))
            .load::<(i32, Option<i32>)>(&mut conn)
            .await?;

        let doomed = collect_subtree(id, links);
        let removed = diesel::delete(comments::table.filter(comments::id.eq_any(doomed)))
            .execute(&mut conn)
            .await?;

        drop(conn);
        self.posts.decrement_comments_count(post_id).await;
        tracing::debug!(id, post_id, removed, "Removed comment and its replies");

        Ok(removed)
    }
}
