pub mod db;
pub mod feed;
