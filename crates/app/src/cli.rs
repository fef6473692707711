use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use housing_core::domain::filter::FilterParams;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the posts API (default).
    Serve,
    /// Load posts from a JSON array file into the database.
    Import { path: PathBuf },
    /// Page through a running server's feed and print what matches.
    Browse(BrowseArgs),
}

#[derive(Debug, Args)]
pub struct BrowseArgs {
    /// Server to query; defaults to HOUSING_API_BASE_URL.
    #[arg(long)]
    pub base_url: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub pages: usize,
    /// all, searching_for or offering.
    #[arg(long)]
    pub search_type: Option<String>,
    #[arg(long)]
    pub low_price: Option<String>,
    #[arg(long)]
    pub high_price: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub move_in: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub move_out: Option<String>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub keyword: Option<String>,
}

impl BrowseArgs {
    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            search_type: self.search_type.clone(),
            low_price: self.low_price.clone(),
            high_price: self.high_price.clone(),
            move_in_date: self.move_in.clone(),
            move_out_date: self.move_out.clone(),
            gender: self.gender.clone(),
            keyword: self.keyword.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_implied() {
        let cli = Cli::try_parse_from(["housing-finder"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn browse_flags_map_to_filter_params() {
        let cli = Cli::try_parse_from([
            "housing-finder",
            "browse",
            "--pages",
            "3",
            "--search-type",
            "offering",
            "--move-in",
            "2024-06-01",
            "--keyword",
            "furnished",
        ])
        .unwrap();
        let Some(Command::Browse(args)) = cli.command else {
            panic!("expected browse");
        };
        assert_eq!(args.pages, 3);
        let params = args.filter_params();
        assert_eq!(params.search_type.as_deref(), Some("offering"));
        assert_eq!(params.move_in_date.as_deref(), Some("2024-06-01"));
        assert_eq!(params.keyword.as_deref(), Some("furnished"));
        assert!(params.low_price.is_none());
    }

    #[test]
    fn import_requires_a_path() {
        assert!(Cli::try_parse_from(["housing-finder", "import"]).is_err());
        let cli = Cli::try_parse_from(["housing-finder", "import", "posts.json"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Import { path }) if path == PathBuf::from("posts.json")));
    }
}
