pub mod query_limit;
