use clap::Parser;
use std::path::PathBuf;
use tracksearch::SearchOptions;

#[derive(Parser, Debug)]
#[command(about = "Search a JSON track corpus")]
pub struct Cli {
    /// JSON object mapping track ids to tag maps.
    #[arg(long)]
    pub corpus: PathBuf,
    /// Field bare keywords are looked up in. Repeat to add more; replaces the defaults.
    #[arg(long = "keyword-field")]
    pub keyword_fields: Vec<String>,
    #[arg(long)]
    pub limit: Option<usize>,
    /// Log filter, e.g. `info` or `tracksearch=debug`.
    #[arg(long, default_value = "warn")]
    pub log: String,
    /// Run a single query and exit instead of opening the prompt.
    pub query: Option<String>,
}

impl Cli {
    pub fn search_options(&self) -> SearchOptions {
        let mut options = SearchOptions::default();
        if !self.keyword_fields.is_empty() {
            options = options.with_keyword_fields(&self.keyword_fields);
        }
        if let Some(limit) = self.limit {
            options = options.with_limit(limit);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_fields_replace_defaults() {
        let cli = Cli::try_parse_from([
            "tsq",
            "--corpus",
            "lib.json",
            "--keyword-field",
            "Genre",
            "--keyword-field",
            "comment",
            "--limit",
            "5",
            "karma",
        ])
        .unwrap();
        let options = cli.search_options();
        assert_eq!(options.keyword_fields, ["genre", "comment"]);
        assert_eq!(options.limit, Some(5));
        assert_eq!(cli.query.as_deref(), Some("karma"));
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["tsq", "--corpus", "lib.json"]).unwrap();
        assert_eq!(cli.search_options(), SearchOptions::default());
        assert_eq!(cli.log, "warn");
        assert!(cli.query.is_none());
    }
}
