use crate::error::CliError;
use clap::{Args, Subcommand};
use connectors::api::params::{SearchParams, parse_date};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Search the job-offer API and normalize the results
    Search {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        output: OutputArgs,

        #[arg(long, help = "Extra .env file holding the API credentials")]
        env_file: Option<PathBuf>,
    },
    /// Normalize a saved raw search response
    Normalize {
        #[arg(long, help = "Raw search response (JSON)")]
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// List the facet counts of a saved raw search response
    Facets {
        #[arg(long, help = "Raw search response (JSON)")]
        input: PathBuf,

        #[arg(long, help = "Only this facet (typeContrat, experience, qualification, natureContrat)")]
        name: Option<String>,

        #[arg(long, help = "If specified, writes the facet table as CSV to this file")]
        output: Option<PathBuf>,
    },
    /// Print the effective configuration as JSON
    Config {
        #[arg(long, help = "If specified, writes the configuration to this file instead of stdout")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    #[arg(long, help = "Free-text keywords")]
    pub keywords: Option<String>,

    #[arg(long, help = "Department code, e.g. 33")]
    pub departement: Option<String>,

    #[arg(long, help = "Contract type code, e.g. CDI")]
    pub contract: Option<String>,

    #[arg(long, help = "Oldest creation date (YYYY-MM-DD)")]
    pub min_date: Option<String>,

    #[arg(long, help = "Newest creation date (YYYY-MM-DD)")]
    pub max_date: Option<String>,

    #[arg(long, help = "Professional qualities filter")]
    pub qualities: Option<String>,

    #[arg(long, help = "Result window, e.g. 0-149")]
    pub range: Option<String>,
}

impl QueryArgs {
    pub fn into_params(self) -> Result<SearchParams, CliError> {
        let params = SearchParams {
            keywords: self.keywords,
            departement: self.departement,
            contract_type: self.contract,
            min_creation_date: self.min_date.as_deref().map(parse_date).transpose()?,
            max_creation_date: self.max_date.as_deref().map(parse_date).transpose()?,
            professional_qualities: self.qualities,
            range: self.range,
        };
        params.validate()?;
        Ok(params)
    }
}

#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    #[arg(long, help = "If specified, exports the final table as CSV to this file")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "If specified, writes the missing-data report as JSON to this file")]
    pub report: Option<PathBuf>,

    #[arg(long, help = "Prune columns missing in more than this percentage of rows")]
    pub threshold: Option<f64>,
}
