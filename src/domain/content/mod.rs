pub mod error;
pub mod filter;
pub mod model;
pub mod text;

pub use error::ContentError;
pub use filter::{screen_speech, FilterRejection};
pub use model::{ContentPayload, Post, SortType};
pub use text::{clean_text, compose_speech};
