use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{CommentStore, PostAccess, PostStore, check_parent, ensure_post_exists};
use crate::{
    blog::{
        BlogError,
        models::{
            blog_comment::{BlogComment, CommentPatch, CommentSubmission},
            blog_post::{BlogPost, PostPatch, PostSubmission},
        },
        tree::{CommentTree, collect_subtree, flat_comments_to_tree},
    },
    pagination::{Page, Paginated, paginate},
    utils::{contains_ignore_case, slugify},
};

struct Table<T> {
    rows: Vec<T>,
    last_id: i32,
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table {
            rows: vec![],
            last_id: 0,
        }
    }
}

type CommentTable = Arc<RwLock<Table<BlogComment>>>;

/// Posts kept in process memory, ordered by creation.
///
/// The store also holds the comment table so that removing a post removes its
/// comments, like the foreign key does in PostgreSQL. A comment store shares
/// it through [`MemoryCommentStore::attached`].
#[derive(Default)]
pub struct MemoryPostStore {
    table: RwLock<Table<BlogPost>>,
    comments: CommentTable,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostAccess for MemoryPostStore {
    async fn find_one(&self, id: i32) -> Result<BlogPost, BlogError> {
        let table = self.table.read().await;
        table
            .rows
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| BlogError::post_not_found(id))
    }

    async fn increment_comments_count(&self, post_id: i32) {
        let mut table = self.table.write().await;
        if let Some(post) = table.rows.iter_mut().find(|p| p.id == post_id) {
            post.comments_count += 1;
        }
    }

    async fn decrement_comments_count(&self, post_id: i32) {
        let mut table = self.table.write().await;
        if let Some(post) = table.rows.iter_mut().find(|p| p.id == post_id) {
            post.comments_count = (post.comments_count - 1).max(0);
        }
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn create(&self, post: PostSubmission) -> Result<BlogPost, BlogError> {
        let slug = slugify(&post.title);

        let mut table = self.table.write().await;
        if table.rows.iter().any(|p| p.slug == slug) {
            return Err(BlogError::DuplicateSlug);
        }

        let now = Utc::now();
        let post = BlogPost {
            id: table.next_id(),
            title: post.title,
            content: post.content,
            author: post.author,
            slug,
            published: post.published.unwrap_or(false),
            tags: post.tags.unwrap_or_default(),
            comments_count: 0,
            created_at: now,
            updated_at: now,
        };

        table.rows.push(post.clone());
        tracing::debug!(id = post.id, slug = %post.slug, "Created post");

        Ok(post)
    }

    async fn find_all(
        &self,
        page: Page,
        published: Option<bool>,
    ) -> Result<Paginated<BlogPost>, BlogError> {
        let table = self.table.read().await;
        let filtered: Vec<BlogPost> = table
            .rows
            .iter()
            .filter(|p| published.is_none_or(|published| p.published == published))
            .cloned()
            .collect();

        Ok(paginate(&filtered, page))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<BlogPost, BlogError> {
        let table = self.table.read().await;
        table
            .rows
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| BlogError::NotFound(format!("Post with slug \"{slug}\" not found")))
    }

    async fn update(&self, id: i32, patch: PostPatch) -> Result<BlogPost, BlogError> {
        let mut table = self.table.write().await;
        let index = table
            .rows
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| BlogError::post_not_found(id))?;

        let slug = match &patch.title {
            Some(title) if *title != table.rows[index].title => {
                let slug = slugify(title);
                if table.rows.iter().any(|p| p.slug == slug && p.id != id) {
                    return Err(BlogError::DuplicateSlug);
                }
                Some(slug)
            }
            _ => None,
        };

        let post = &mut table.rows[index];
        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(slug) = slug {
            post.slug = slug;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(author) = patch.author {
            post.author = author;
        }
        if let Some(published) = patch.published {
            post.published = published;
        }
        if let Some(tags) = patch.tags {
            post.tags = tags;
        }
        post.updated_at = Utc::now();

        Ok(post.clone())
    }

    async fn remove(&self, id: i32) -> Result<(), BlogError> {
        let mut table = self.table.write().await;
        let index = table
            .rows
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| BlogError::post_not_found(id))?;
        table.rows.remove(index);
        drop(table);

        // never hold both tables at once, comment operations lock them the
        // other way round
        let mut comments = self.comments.write().await;
        let before = comments.rows.len();
        comments.rows.retain(|c| c.post_id != id);
        tracing::debug!(id, removed = before - comments.rows.len(), "Removed post and its comments");

        Ok(())
    }

    async fn find_by_author(&self, author: &str) -> Result<Vec<BlogPost>, BlogError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|p| contains_ignore_case(&p.author, author))
            .cloned()
            .collect())
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<BlogPost>, BlogError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|p| p.tags.iter().any(|t| contains_ignore_case(t, tag)))
            .cloned()
            .collect())
    }
}

/// Comments kept in process memory. Post existence and comment counters go
/// through the post capability the store was built with.
pub struct MemoryCommentStore {
    posts: Arc<dyn PostAccess>,
    table: CommentTable,
}

impl MemoryCommentStore {
    /// A store with its own comment table. Removing a post behind `posts`
    /// leaves these comments alone.
    pub fn new(posts: Arc<dyn PostAccess>) -> Self {
        MemoryCommentStore {
            posts,
            table: CommentTable::default(),
        }
    }

    /// A store sharing the comment table of `posts`, so that removing a post
    /// also removes its comments.
    pub fn attached(posts: Arc<MemoryPostStore>) -> Self {
        let table = posts.comments.clone();
        MemoryCommentStore { posts, table }
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn create(&self, comment: CommentSubmission) -> Result<BlogComment, BlogError> {
        ensure_post_exists(self.posts.as_ref(), comment.post_id).await?;

        let comment = {
            let mut table = self.table.write().await;

            if let Some(parent_id) = comment.parent_id {
                let parent_post_id = table
                    .rows
                    .iter()
                    .find(|c| c.id == parent_id)
                    .map(|c| c.post_id);
                check_parent(parent_post_id, comment.post_id)?;
            }

            let now = Utc::now();
            let comment = BlogComment {
                id: table.next_id(),
                content: comment.content,
                author: comment.author,
                email: comment.email,
                post_id: comment.post_id,
                parent_id: comment.parent_id,
                approved: true,
                created_at: now,
                updated_at: now,
            };

            table.rows.push(comment.clone());
            comment
        };

        self.posts.increment_comments_count(comment.post_id).await;
        tracing::debug!(id = comment.id, post_id = comment.post_id, "Created comment");

        Ok(comment)
    }

    async fn find_all(
        &self,
        page: Page,
        approved: Option<bool>,
    ) -> Result<Paginated<BlogComment>, BlogError> {
        let table = self.table.read().await;
        let filtered: Vec<BlogComment> = table
            .rows
            .iter()
            .filter(|c| approved.is_none_or(|approved| c.approved == approved))
            .cloned()
            .collect();

        Ok(paginate(&filtered, page))
    }

    async fn find_by_post(&self, post_id: i32) -> Result<Vec<CommentTree>, BlogError> {
        ensure_post_exists(self.posts.as_ref(), post_id).await?;

        let table = self.table.read().await;
        let comments = table
            .rows
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();

        Ok(flat_comments_to_tree(comments))
    }

    async fn find_by_author(&self, author: &str) -> Result<Vec<BlogComment>, BlogError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|c| contains_ignore_case(&c.author, author))
            .cloned()
            .collect())
    }

    async fn find_one(&self, id: i32) -> Result<BlogComment, BlogError> {
        let table = self.table.read().await;
        table
            .rows
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| BlogError::comment_not_found(id))
    }

    async fn update(&self, id: i32, patch: CommentPatch) -> Result<BlogComment, BlogError> {
        let mut table = self.table.write().await;
        let comment = table
            .rows
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| BlogError::comment_not_found(id))?;

        if let Some(content) = patch.content {
            comment.content = content;
        }
        if let Some(author) = patch.author {
            comment.author = author;
        }
        if let Some(email) = patch.email {
            comment.email = email;
        }
        if let Some(approved) = patch.approved {
            comment.approved = approved;
        }
        comment.updated_at = Utc::now();

        Ok(comment.clone())
    }

    async fn remove(&self, id: i32) -> Result<usize, BlogError> {
        let (post_id, removed) = {
            let mut table = self.table.write().await;
            let post_id = table
                .rows
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.post_id)
                .ok_or_else(|| BlogError::comment_not_found(id))?;

            let doomed: HashSet<i32> =
                collect_subtree(id, table.rows.iter().map(|c| (c.id, c.parent_id)))
                    .into_iter()
                    .collect();

            let before = table.rows.len();
            table.rows.retain(|c| !doomed.contains(&c.id));
            (post_id, before - table.rows.len())
        };

        self.posts.decrement_comments_count(post_id).await;
        tracing::debug!(id, post_id, removed, "Removed comment and its replies");

        Ok(removed)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use super::*;

    fn submission(title: &str) -> PostSubmission {
        PostSubmission {
            title: title.into(),
            content: "Some content long enough".into(),
            author: "Jane Doe".into(),
            published: None,
            tags: None,
        }
    }

    fn reply(post_id: i32, parent_id: Option<i32>) -> CommentSubmission {
        CommentSubmission {
            content: "Nice post!".into(),
            author: "Reader".into(),
            email: "reader@example.com".into(),
            post_id,
            parent_id,
        }
    }

    fn stores() -> (Arc<MemoryPostStore>, MemoryCommentStore) {
        let posts = Arc::new(MemoryPostStore::new());
        let comments = MemoryCommentStore::attached(posts.clone());
        (posts, comments)
    }

    #[tokio::test]
    async fn test_create_post_assigns_slug_and_defaults() {
        let posts = MemoryPostStore::new();
        let post = posts.create(submission("Hello World!")).await.unwrap();

        assert_eq!(post.id, 1);
        assert_eq!(post.slug, "hello-world");
        assert!(!post.published);
        assert!(post.tags.is_empty());
        assert_eq!(post.comments_count, 0);
        assert_eq!(post.created_at, post.updated_at);

        let second = posts.create(submission("Another one")).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_create_post_with_colliding_slug_fails() {
        let posts = MemoryPostStore::new();
        posts.create(submission("Hello World!")).await.unwrap();

        let err = posts.create(submission("Hello, World")).await.unwrap_err();
        assert!(matches!(err, BlogError::DuplicateSlug));

        let all = posts.find_all(Page::default(), None).await.unwrap();
        assert_eq!(all.total, 1);
    }

    #[tokio::test]
    async fn test_create_post_without_slug_characters_gets_empty_slug() {
        let posts = MemoryPostStore::new();
        let post = posts.create(submission("???")).await.unwrap();
        assert_eq!(post.slug, "");

        let err = posts.create(submission("!!!")).await.unwrap_err();
        assert!(matches!(err, BlogError::DuplicateSlug));
    }

    #[tokio::test]
    async fn test_create_post_keeps_edge_hyphens_in_slug() {
        let posts = MemoryPostStore::new();
        let post = posts.create(submission("Rust -")).await.unwrap();
        assert_eq!(post.slug, "rust-");

        // "rust" and "rust-" are different slugs
        let post = posts.create(submission("Rust")).await.unwrap();
        assert_eq!(post.slug, "rust");
    }

    #[tokio::test]
    async fn test_find_all_filters_and_paginates() {
        let posts = MemoryPostStore::new();
        for i in 0..7 {
            let mut post = submission(&format!("Post number {i}"));
            post.published = Some(i % 2 == 0);
            posts.create(post).await.unwrap();
        }

        let published = posts
            .find_all(Page { page: 1, limit: 3 }, Some(true))
            .await
            .unwrap();
        assert_eq!(published.total, 4);
        assert_eq!(published.total_pages(), 2);
        assert_eq!(published.items.len(), 3);
        assert!(published.items.iter().all(|p| p.published));

        let drafts = posts
            .find_all(Page { page: 2, limit: 3 }, Some(false))
            .await
            .unwrap();
        assert_eq!(drafts.total, 3);
        assert!(drafts.items.is_empty());

        let everything = posts
            .find_all(Page { page: 3, limit: 3 }, None)
            .await
            .unwrap();
        assert_eq!(everything.total, 7);
        assert_eq!(everything.items.len(), 1);
        assert_eq!(everything.items[0].id, 7);
    }

    #[tokio::test]
    async fn test_find_one_and_by_slug() {
        let posts = MemoryPostStore::new();
        let post = posts.create(submission("Hello World!")).await.unwrap();

        assert_eq!(posts.find_one(post.id).await.unwrap(), post);
        assert_eq!(posts.find_by_slug("hello-world").await.unwrap(), post);
        assert!(matches!(
            posts.find_one(42).await,
            Err(BlogError::NotFound(_))
        ));
        assert!(matches!(
            posts.find_by_slug("nope").await,
            Err(BlogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_post_recomputes_slug_on_title_change() {
        let posts = MemoryPostStore::new();
        let post = posts.create(submission("First title")).await.unwrap();

        let updated = posts
            .update(
                post.id,
                PostPatch {
                    title: Some("Second title".into()),
                    published: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, post.id);
        assert_eq!(updated.slug, "second-title");
        assert!(updated.published);
        assert_eq!(updated.content, post.content);
        assert_eq!(updated.created_at, post.created_at);
        assert!(updated.updated_at >= post.updated_at);
    }

    #[tokio::test]
    async fn test_update_post_keeps_own_slug_and_rejects_others() {
        let posts = MemoryPostStore::new();
        let first = posts.create(submission("First title")).await.unwrap();
        posts.create(submission("Second title")).await.unwrap();

        // same slug as itself is fine
        let same = posts
            .update(
                first.id,
                PostPatch {
                    title: Some("FIRST title!".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(same.slug, "first-title");
        assert_eq!(same.title, "FIRST title!");

        let err = posts
            .update(
                first.id,
                PostPatch {
                    title: Some("Second Title".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::DuplicateSlug));
        assert_eq!(posts.find_one(first.id).await.unwrap().title, "FIRST title!");
    }

    #[tokio::test]
    async fn test_update_and_remove_missing_post() {
        let posts = MemoryPostStore::new();
        assert!(matches!(
            posts.update(1, PostPatch::default()).await,
            Err(BlogError::NotFound(_))
        ));
        assert!(matches!(posts.remove(1).await, Err(BlogError::NotFound(_))));

        let post = posts.create(submission("Doomed")).await.unwrap();
        posts.remove(post.id).await.unwrap();
        assert!(matches!(
            posts.find_one(post.id).await,
            Err(BlogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_post_removes_its_comments() {
        let (posts, comments) = stores();
        let doomed = posts.create(submission("Doomed")).await.unwrap();
        let kept = posts.create(submission("Kept")).await.unwrap();

        let root = comments.create(reply(doomed.id, None)).await.unwrap();
        let child = comments.create(reply(doomed.id, Some(root.id))).await.unwrap();
        let other = comments.create(reply(kept.id, None)).await.unwrap();

        posts.remove(doomed.id).await.unwrap();

        for id in [root.id, child.id] {
            assert!(matches!(
                comments.find_one(id).await,
                Err(BlogError::NotFound(_))
            ));
        }
        let all = comments.find_all(Page::default(), None).await.unwrap();
        assert_eq!(all.total, 1);
        assert_eq!(all.items[0].id, other.id);
        assert_eq!(comments.find_by_author("reader").await.unwrap().len(), 1);
        assert!(matches!(
            comments.approve(child.id).await,
            Err(BlogError::NotFound(_))
        ));

        // ids are never reused after the cascade
        let next = comments.create(reply(kept.id, None)).await.unwrap();
        assert_eq!(next.id, other.id + 1);
    }

    #[tokio::test]
    async fn test_find_posts_by_author_and_tag() {
        let posts = MemoryPostStore::new();
        let mut rust = submission("Rust ownership");
        rust.tags = Some(vec!["Rust".into(), "Systems".into()]);
        posts.create(rust).await.unwrap();

        let mut go = submission("Go channels");
        go.author = "John Smith".into();
        go.tags = Some(vec!["golang".into()]);
        posts.create(go).await.unwrap();

        assert_eq!(posts.find_by_author("JANE").await.unwrap().len(), 1);
        assert_eq!(posts.find_by_author("o").await.unwrap().len(), 2);
        assert_eq!(posts.find_by_tag("rus").await.unwrap()[0].slug, "rust-ownership");
        assert_eq!(posts.find_by_tag("LANG").await.unwrap()[0].slug, "go-channels");
        assert!(posts.find_by_tag("python").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comment_counter_never_fails_or_goes_negative() {
        let posts = MemoryPostStore::new();
        posts.increment_comments_count(99).await;
        posts.decrement_comments_count(99).await;

        let post = posts.create(submission("Counted")).await.unwrap();
        posts.decrement_comments_count(post.id).await;
        assert_eq!(posts.find_one(post.id).await.unwrap().comments_count, 0);

        posts.increment_comments_count(post.id).await;
        posts.increment_comments_count(post.id).await;
        assert_eq!(posts.find_one(post.id).await.unwrap().comments_count, 2);
    }

    #[tokio::test]
    async fn test_create_comment_requires_post() {
        let (_, comments) = stores();
        let err = comments.create(reply(1, None)).await.unwrap_err();
        match err {
            BlogError::BadRequest(message) => assert_eq!(message, "Post not found"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_comment_checks_parent() {
        let (posts, comments) = stores();
        let first = posts.create(submission("First post")).await.unwrap();
        let second = posts.create(submission("Second post")).await.unwrap();

        let on_first = comments.create(reply(first.id, None)).await.unwrap();

        let missing = comments
            .create(reply(first.id, Some(99)))
            .await
            .unwrap_err();
        assert!(
            matches!(missing, BlogError::BadRequest(ref m) if m == "Parent comment not found")
        );

        let elsewhere = comments
            .create(reply(second.id, Some(on_first.id)))
            .await
            .unwrap_err();
        assert!(matches!(
            elsewhere,
            BlogError::BadRequest(ref m) if m == "Parent comment must belong to the same post"
        ));

        // failed creations leave the counters alone
        assert_eq!(posts.find_one(first.id).await.unwrap().comments_count, 1);
        assert_eq!(posts.find_one(second.id).await.unwrap().comments_count, 0);
    }

    #[tokio::test]
    async fn test_scenario_from_post_to_cascading_removal() {
        let (posts, comments) = stores();

        let post = posts.create(submission("Hello World!")).await.unwrap();
        assert_eq!(post.slug, "hello-world");
        assert!(matches!(
            posts.create(submission("Hello, World")).await,
            Err(BlogError::DuplicateSlug)
        ));

        let first = comments.create(reply(post.id, None)).await.unwrap();
        assert!(first.approved);
        assert_eq!(posts.find_one(post.id).await.unwrap().comments_count, 1);

        let second = comments
            .create(reply(post.id, Some(first.id)))
            .await
            .unwrap();
        let tree = comments.find_by_post(post.id).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].comment.id, first.id);
        assert_eq!(tree[0].replies[0].comment.id, second.id);

        assert_eq!(comments.remove(first.id).await.unwrap(), 2);
        assert!(matches!(
            comments.find_one(second.id).await,
            Err(BlogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_cascades_to_all_descendants_only() {
        let (posts, comments) = stores();
        let post = posts.create(submission("Threaded")).await.unwrap();

        let root = comments.create(reply(post.id, None)).await.unwrap();
        let a = comments.create(reply(post.id, Some(root.id))).await.unwrap();
        let b = comments.create(reply(post.id, Some(root.id))).await.unwrap();
        let a1 = comments.create(reply(post.id, Some(a.id))).await.unwrap();
        let a1x = comments.create(reply(post.id, Some(a1.id))).await.unwrap();
        let other = comments.create(reply(post.id, None)).await.unwrap();

        let removed = comments.remove(a.id).await.unwrap();
        assert_eq!(removed, 3);

        for id in [a.id, a1.id, a1x.id] {
            assert!(matches!(
                comments.find_one(id).await,
                Err(BlogError::NotFound(_))
            ));
        }
        for id in [root.id, b.id, other.id] {
            assert!(comments.find_one(id).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_cascading_remove_decrements_counter_once() {
        let (posts, comments) = stores();
        let post = posts.create(submission("Counter")).await.unwrap();

        let root = comments.create(reply(post.id, None)).await.unwrap();
        comments.create(reply(post.id, Some(root.id))).await.unwrap();
        comments.create(reply(post.id, Some(root.id))).await.unwrap();
        assert_eq!(posts.find_one(post.id).await.unwrap().comments_count, 3);

        assert_eq!(comments.remove(root.id).await.unwrap(), 3);
        assert_eq!(posts.find_one(post.id).await.unwrap().comments_count, 2);
    }

    #[tokio::test]
    async fn test_remove_missing_comment() {
        let (_, comments) = stores();
        assert!(matches!(
            comments.remove(5).await,
            Err(BlogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_post_requires_post_and_builds_forest() {
        let (posts, comments) = stores();
        assert!(matches!(
            comments.find_by_post(1).await,
            Err(BlogError::BadRequest(_))
        ));

        let post = posts.create(submission("Forest")).await.unwrap();
        let other = posts.create(submission("Elsewhere")).await.unwrap();
        assert!(comments.find_by_post(post.id).await.unwrap().is_empty());

        let r1 = comments.create(reply(post.id, None)).await.unwrap();
        let r2 = comments.create(reply(post.id, None)).await.unwrap();
        comments.create(reply(other.id, None)).await.unwrap();
        let c1 = comments.create(reply(post.id, Some(r2.id))).await.unwrap();

        let forest = comments.find_by_post(post.id).await.unwrap();
        let roots: Vec<i32> = forest.iter().map(|n| n.comment.id).collect();
        assert_eq!(roots, vec![r1.id, r2.id]);
        assert!(forest[0].replies.is_empty());
        assert_eq!(forest[1].replies[0].comment.id, c1.id);
    }

    #[tokio::test]
    async fn test_update_comment_keeps_identity_fields() {
        let (posts, comments) = stores();
        let post = posts.create(submission("Editable")).await.unwrap();
        let root = comments.create(reply(post.id, None)).await.unwrap();
        let child = comments.create(reply(post.id, Some(root.id))).await.unwrap();

        let updated = comments
            .update(
                child.id,
                CommentPatch {
                    content: Some("Edited reply".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.content, "Edited reply");
        assert_eq!(updated.id, child.id);
        assert_eq!(updated.post_id, child.post_id);
        assert_eq!(updated.parent_id, Some(root.id));
        assert_eq!(updated.created_at, child.created_at);
        assert_eq!(updated.author, child.author);

        assert!(matches!(
            comments.update(99, CommentPatch::default()).await,
            Err(BlogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_approve_and_reject_are_idempotent_toggles() {
        let (posts, comments) = stores();
        let post = posts.create(submission("Moderated")).await.unwrap();
        let comment = comments.create(reply(post.id, None)).await.unwrap();

        assert!(comments.approve(comment.id).await.unwrap().approved);
        assert!(comments.approve(comment.id).await.unwrap().approved);
        assert!(!comments.reject(comment.id).await.unwrap().approved);
        assert!(!comments.reject(comment.id).await.unwrap().approved);
        assert!(comments.approve(comment.id).await.unwrap().approved);

        assert!(matches!(
            comments.approve(99).await,
            Err(BlogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_all_comments_by_approval_and_author() {
        let (posts, comments) = stores();
        let post = posts.create(submission("Listing")).await.unwrap();

        for i in 0..5 {
            let mut comment = reply(post.id, None);
            comment.author = format!("Reader {i}");
            let created = comments.create(comment).await.unwrap();
            if i % 2 == 1 {
                comments.reject(created.id).await.unwrap();
            }
        }

        let approved = comments
            .find_all(Page::default(), Some(true))
            .await
            .unwrap();
        assert_eq!(approved.total, 3);

        let rejected = comments
            .find_all(Page { page: 1, limit: 1 }, Some(false))
            .await
            .unwrap();
        assert_eq!(rejected.total, 2);
        assert_eq!(rejected.total_pages(), 2);
        assert_eq!(rejected.items.len(), 1);

        assert_eq!(comments.find_by_author("reader 3").await.unwrap().len(), 1);
        assert_eq!(comments.find_by_author("READER").await.unwrap().len(), 5);
    }

    // stands in for the post store to observe the side effects
    #[derive(Default)]
    struct FakePosts {
        existing: Vec<i32>,
        increments: Mutex<Vec<i32>>,
        decrements: Mutex<Vec<i32>>,
    }

    #[async_trait]
    impl PostAccess for FakePosts {
        async fn find_one(&self, id: i32) -> Result<BlogPost, BlogError> {
            if !self.existing.contains(&id) {
                return Err(BlogError::post_not_found(id));
            }
            let now = Utc::now();
            Ok(BlogPost {
                id,
                title: "Fake".into(),
                content: "Fake content".into(),
                author: "Fake".into(),
                slug: format!("fake-{id}"),
                published: true,
                tags: vec![],
                comments_count: 0,
                created_at: now,
                updated_at: now,
            })
        }

        async fn increment_comments_count(&self, post_id: i32) {
            self.increments.lock().unwrap().push(post_id);
        }

        async fn decrement_comments_count(&self, post_id: i32) {
            self.decrements.lock().unwrap().push(post_id);
        }
    }

    #[tokio::test]
    async fn test_comment_store_only_uses_the_post_capability() {
        let posts = Arc::new(FakePosts {
            existing: vec![7],
            ..Default::default()
        });
        let comments = MemoryCommentStore::new(posts.clone());

        assert!(comments.create(reply(8, None)).await.is_err());
        let root = comments.create(reply(7, None)).await.unwrap();
        comments.create(reply(7, Some(root.id))).await.unwrap();
        comments.remove(root.id).await.unwrap();

        assert_eq!(*posts.increments.lock().unwrap(), vec![7, 7]);
        assert_eq!(*posts.decrements.lock().unwrap(), vec![7]);
    }
}
