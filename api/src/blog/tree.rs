use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::models::blog_comment::BlogComment;

// The model that will be returned to the client
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommentTree {
    #[serde(flatten)]
    pub comment: BlogComment,
    pub replies: Vec<CommentTree>,
}

// a single comment outside of a thread is sent with no replies
impl From<BlogComment> for CommentTree {
    fn from(comment: BlogComment) -> Self {
        CommentTree {
            comment,
            replies: vec![],
        }
    }
}

struct Frame {
    comment: BlogComment,
    pending: std::vec::IntoIter<BlogComment>,
    replies: Vec<CommentTree>,
}

impl Frame {
    fn new(comment: BlogComment, children: &mut HashMap<Option<i32>, Vec<BlogComment>>) -> Self {
        let pending = children
            .remove(&Some(comment.id))
            .unwrap_or_default()
            .into_iter();

        Frame {
            comment,
            pending,
            replies: vec![],
        }
    }
}

/// Nest the flat comments of one post. Roots are the comments without a
/// parent, and every node's replies are exactly its direct children, ordered
/// by id. Comments whose parent is not part of `comments` are left out.
pub fn flat_comments_to_tree(mut comments: Vec<BlogComment>) -> Vec<CommentTree> {
    comments.sort_unstable_by_key(|c| c.id);

    let mut children = HashMap::<Option<i32>, Vec<BlogComment>>::with_capacity(comments.len());
    for comment in comments {
        children.entry(comment.parent_id).or_default().push(comment);
    }

    let roots = children.remove(&None).unwrap_or_default();
    let mut forest = Vec::with_capacity(roots.len());

    // Depth first with an explicit stack, a node is finished once all of its
    // children have been moved into its replies
    for root in roots {
        let mut stack = vec![Frame::new(root, &mut children)];

        while let Some(top) = stack.last_mut() {
            if let Some(child) = top.pending.next() {
                let frame = Frame::new(child, &mut children);
                stack.push(frame);
                continue;
            }

            let Some(done) = stack.pop() else { break };
            let node = CommentTree {
                comment: done.comment,
                replies: done.replies,
            };

            match stack.last_mut() {
                Some(parent) => parent.replies.push(node),
                None => forest.push(node),
            }
        }
    }

    forest
}

/// Ids of `root` and of every comment whose parent chain leads to it.
pub fn collect_subtree<I>(root: i32, links: I) -> Vec<i32>
where
    I: IntoIterator<Item = (i32, Option<i32>)>,
{
    let mut children = HashMap::<i32, Vec<i32>>::new();
    for (id, parent_id) in links {
        if let Some(parent_id) = parent_id {
            children.entry(parent_id).or_default().push(id);
        }
    }

    let mut seen = HashSet::from([root]);
    let mut subtree = vec![root];
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        for child in children.remove(&id).unwrap_or_default() {
            if seen.insert(child) {
                subtree.push(child);
                stack.push(child);
            }
        }
    }

    subtree
}
