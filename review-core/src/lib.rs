pub mod rating;
pub mod upload;

pub type UserId = i64;
pub type GameId = i64;
pub type EntryId = i64;

pub use rating::{StarRating, average_rating};
