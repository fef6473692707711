pub mod chips;
pub mod filter;
pub mod keyword;
pub mod pagination;
pub mod post;
pub mod predicates;
pub mod session;
