pub mod paginator;

pub use paginator::{collect_page, fetch_page};
