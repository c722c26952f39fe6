use pantry_import::{ImportError, ImportPipeline, ImporterConfig, MemoryStore, OpenAiProvider};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let url = args.get(1).ok_or("Usage: pantry-import <recipe-url>")?;

    let config = ImporterConfig::load()?;
    let provider = Arc::new(OpenAiProvider::from_config(&config)?);
    let store = Arc::new(MemoryStore::new());

    let pipeline = ImportPipeline::new(store, provider, config)?;
    match pipeline.import_url(1, url).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(e @ ImportError::BadRequest(_)) => Err(format!("invalid input: {e}").into()),
        Err(e) => Err(format!("import failed ({}): {e}", e.status_code()).into()),
    }
}
