use std::sync::Arc;

use axum::{Router, routing::get};
use diesel_async::{
    AsyncPgConnection,
    pooled_connection::{AsyncDieselConnectionManager, deadpool::Pool},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use blog::store::{
    CommentStore, PostAccess, PostStore,
    memory::{MemoryCommentStore, MemoryPostStore},
    postgres::{DbPool, PgCommentStore, PgPostStore},
};
use config::DatabaseConfig;
use response::ApiResponse;

pub mod blog;
pub mod config;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod response;
pub mod schema;
pub mod utils;

#[derive(Clone)]
pub struct App {
    pub posts: Arc<dyn PostStore>,
    pub comments: Arc<dyn CommentStore>,
}

impl App {
    pub fn in_memory() -> Self {
        let posts = Arc::new(MemoryPostStore::new());

        App {
            comments: Arc::new(MemoryCommentStore::attached(posts.clone())),
            posts,
        }
    }

    pub fn postgres(pool: DbPool) -> Self {
        let posts = Arc::new(PgPostStore::new(pool.clone()));
        let access: Arc<dyn PostAccess> = posts.clone();

        App {
            posts,
            comments: Arc::new(PgCommentStore::new(pool, access)),
        }
    }
}

/// Build the connection pool. Connections are established lazily, so this
/// only fails on an invalid pool configuration.
pub fn connect(database: &DatabaseConfig) -> eyre::Result<DbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&database.url);
    let pool = Pool::builder(manager)
        .max_size(database.max_connections)
        .build()?;

    Ok(pool)
}

pub fn router(app: App) -> Router {
    Router::new()
        .route("/", get(health))
        .merge(blog::routes::route())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

async fn health() -> ApiResponse<()> {
    ApiResponse::<()>::message("Blog API is running")
}
