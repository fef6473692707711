pub mod pool;
pub mod posts_repo;

pub use pool::{connect_lazy, run_migrations, DbPool, DbPoolError, PoolSettings};
pub use posts_repo::{count_posts, insert_posts, scan_posts, PostsRepoError};
