use axum::{
    Router,
    routing::{get, patch},
};

use crate::App;

use super::{
    comment::{
        create::create_comment,
        delete::delete_comment,
        get::{get_comment, get_comments, get_comments_by_author, get_post_comments},
        patch::{approve_comment, patch_comment, reject_comment},
    },
    post::{
        create::create_post,
        delete::delete_post,
        get::{get_post, get_post_by_slug, get_posts, get_posts_by_author, get_posts_by_tag},
        patch::patch_post,
    },
};

pub fn route() -> Router<App> {
    Router::<App>::new()
        .nest("/posts", posts())
        .nest("/comments", comments())
}

fn posts() -> Router<App> {
    Router::<App>::new()
        .route("/", get(get_posts).post(create_post))
        .route("/slug/{slug}", get(get_post_by_slug))
        .route("/author/{author}", get(get_posts_by_author))
        .route("/tag/{tag}", get(get_posts_by_tag))
        .route(
            "/{id}",
            get(get_post).patch(patch_post).delete(delete_post),
        )
}

fn comments() -> Router<App> {
    Router::<App>::new()
        .route("/", get(get_comments).post(create_comment))
        .route("/post/{post_id}", get(get_post_comments))
        .route("/author/{author}", get(get_comments_by_author))
        .route(
            "/{id}",
            get(get_comment).patch(patch_comment).delete(delete_comment),
        )
        .route("/{id}/approve", patch(approve_comment))
        .route("/{id}/reject", patch(reject_comment))
}
