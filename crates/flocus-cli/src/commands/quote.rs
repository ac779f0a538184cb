use flocus_core::{Config, QuoteClient};

use super::print_json;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let client = QuoteClient::new(&config.quote);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let quote = runtime.block_on(client.fetch_or_fallback());
    print_json(&quote)
}
