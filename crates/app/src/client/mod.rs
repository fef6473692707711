pub mod feed;

pub use feed::{ClientError, FeedClient, LoadOutcome};
