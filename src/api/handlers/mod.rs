//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod ping;
pub mod redirect;
pub mod shorten;
pub mod stats;
pub mod user_urls;

pub use ping::ping_handler;
pub use redirect::redirect_handler;
pub use shorten::{shorten_batch_handler, shorten_json_handler, shorten_text_handler};
pub use stats::internal_stats_handler;
pub use user_urls::{delete_user_urls_handler, list_user_urls_handler};
