mod comment;

pub use comment::CommentView;
