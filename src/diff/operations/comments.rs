//! Generic comment operations

use super::SqlRenderer;
use crate::render::{RenderedSql, render_comment_sql};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentOperation<T> {
    Set { target: T, comment: String },
    Drop { target: T },
}

/// Trait for objects that can have comments
pub trait CommentTarget {
    const OBJECT_TYPE: &'static str;
    fn identifier(&self) -> String;
}

impl<T: CommentTarget> SqlRenderer for CommentOperation<T> {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            CommentOperation::Set { target, comment } => {
                vec![render_comment_sql(
                    T::OBJECT_TYPE,
                    &target.identifier(),
                    Some(comment),
                )]
            }
            CommentOperation::Drop { target } => {
                vec![render_comment_sql(
                    T::OBJECT_TYPE,
                    &target.identifier(),
                    None,
                )]
            }
        }
    }
}
