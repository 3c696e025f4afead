pub use self::data::*;
pub use self::meta::Meta;

mod data;
mod link;
mod meta;
