use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use survey_bridge::config::AppConfig;
use survey_bridge::enrichment::{classify, EnrichmentService, FormFields};
use survey_bridge::error::AppError;
use survey_bridge::geocode::MapitClient;
use survey_bridge::reference::fetch::fetch_resources;
use survey_bridge::reference::ReferenceTables;
use survey_bridge::telemetry;

#[derive(Args, Debug)]
pub(crate) struct PostcodeArgs {
    /// Postcode to enrich, e.g. "SW1A 1AA"
    pub(crate) postcode: String,
}

#[derive(Args, Debug)]
pub(crate) struct CategoryArgs {
    /// Report category text; matched exactly
    #[arg(default_value = "")]
    pub(crate) category: String,
}

#[derive(Args, Debug)]
pub(crate) struct FetchArgs {
    /// Directory to download into (defaults to RESOURCES_DIR)
    #[arg(long)]
    pub(crate) dir: Option<PathBuf>,
}

pub(crate) async fn run_postcode(args: PostcodeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let tables = Arc::new(ReferenceTables::new(&config.resources.dir));
    let service = EnrichmentService::new(tables, MapitClient::new(&config.mapit)?);

    let result = service.postcode(args.postcode.trim()).await?;
    println!("{}", result.to_form());
    Ok(())
}

pub(crate) fn run_category(args: CategoryArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let tables = ReferenceTables::new(&config.resources.dir);

    let labels = classify(&tables, &args.category)?;
    println!("{}", labels.to_form());
    Ok(())
}

pub(crate) async fn run_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let dir = args.dir.unwrap_or(config.resources.dir);
    let client = reqwest::Client::new();
    for path in fetch_resources(&client, &dir).await? {
        println!("fetched {}", path.display());
    }
    Ok(())
}
