pub mod blog_comment;
pub mod blog_post;
