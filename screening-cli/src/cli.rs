use clap::{Parser, Subcommand};
use screening_core::TypeFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "screening", version, about = "Sanction screening and impact analysis")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(long, global = true, help = "Emit logs as JSON lines on stderr")]
    pub log_json: bool,
    #[arg(long, global = true, help = "Catalog JSON file (defaults to the bundled catalog)")]
    pub catalog: Option<PathBuf>,
    #[arg(long, global = true, help = "Scoring service base URL (overrides ANALYSIS_BASE_URL)")]
    pub base_url: Option<String>,
    #[arg(long, global = true, help = "Request timeout in seconds (overrides ANALYSIS_TIMEOUT_SECS)")]
    pub timeout: Option<u64>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Filter the catalog by name/country substring and entity type
    Search {
        #[arg(default_value = "")]
        query: String,
        #[arg(long = "type", default_value_t = TypeFilter::All)]
        type_filter: TypeFilter,
    },
    /// Show the policy feature payload for an entity
    Features { name: String },
    /// Score an entity, or an ad-hoc record given as JSON
    Analyze {
        #[arg(required_unless_present = "record", conflicts_with = "record")]
        name: Option<String>,
        #[arg(long, help = "Policy record JSON, e.g. '{\"type\":\"Bank\",\"status\":\"Active\"}'")]
        record: Option<String>,
    },
    /// Before/after indicator deltas recorded for an entity
    Impact { name: String },
    /// Headline stats for one sanction type, or all of them
    Scenario { sanction_type: Option<String> },
    /// Before/after comparison stats for one issuing country, or all
    Country { name: Option<String> },
    /// Country risk table
    Risk,
    /// Narrative explanation of one metric value for an entity
    Explain {
        name: String,
        #[arg(long)]
        metric: String,
        #[arg(long, allow_hyphen_values = true)]
        value: f64,
    },
    /// Macro risk score for a country code
    MacroRisk { country_code: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use screening_core::EntityType;

    #[test]
    fn test_search_defaults() {
        let cli = Cli::try_parse_from(["screening", "search"]).unwrap();
        match cli.command {
            Commands::Search { query, type_filter } => {
                assert_eq!(query, "");
                assert_eq!(type_filter, TypeFilter::All);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(!cli.json);
    }

    #[test]
    fn test_search_with_type_and_globals() {
        let cli = Cli::try_parse_from([
            "screening", "search", "russia", "--type", "bank", "--json", "--timeout", "5",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.timeout, Some(5));
        match cli.command {
            Commands::Search { query, type_filter } => {
                assert_eq!(query, "russia");
                assert_eq!(type_filter, TypeFilter::Only(EntityType::Bank));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(Cli::try_parse_from(["screening", "search", "--type", "submarine"]).is_err());
    }

    #[test]
    fn test_analyze_requires_name_or_record() {
        assert!(Cli::try_parse_from(["screening", "analyze"]).is_err());
        assert!(Cli::try_parse_from(["screening", "analyze", "Sberbank"]).is_ok());
        assert!(Cli::try_parse_from(["screening", "analyze", "--record", "{}"]).is_ok());
        assert!(
            Cli::try_parse_from(["screening", "analyze", "Sberbank", "--record", "{}"]).is_err()
        );
    }

    #[test]
    fn test_explain_accepts_negative_value() {
        let cli = Cli::try_parse_from([
            "screening", "explain", "Sberbank", "--metric", "gdp", "--value", "-1.5",
        ])
        .unwrap();
        match cli.command {
            Commands::Explain { metric, value, .. } => {
                assert_eq!(metric, "gdp");
                assert_eq!(value, -1.5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_macro_risk_subcommand_name() {
        let cli = Cli::try_parse_from(["screening", "macro-risk", "IRN"]).unwrap();
        assert!(matches!(cli.command, Commands::MacroRisk { ref country_code } if country_code == "IRN"));
    }
}
