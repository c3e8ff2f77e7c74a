pub mod feed_dtos;
// shorter path for handlers and services: `crate::dtos::feed`
pub use feed_dtos as feed;
