pub use self::tag::{
    normalize_category, normalize_position, project_actions, Category, Position, Tag,
};
pub use self::token::Token;

pub mod tag;
mod token;

pub trait Tokenized {
    fn id(&self) -> usize;
    fn form(&self) -> &str;
    fn postag(&self) -> &str;
}
