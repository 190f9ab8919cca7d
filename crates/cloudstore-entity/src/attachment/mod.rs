//! Records attached to data entries (tags, shares, favorites).

pub mod model;

pub use model::{DataFavorite, DataShare, DataTag};
