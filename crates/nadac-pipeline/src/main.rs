//! NADAC price pipeline binary.

use nadac_loader::run;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = nadac_pipeline::from_env();
    tracing::info!(
        "Building price records from {} into {}",
        config.data_dir.display(),
        config.output_dir.display()
    );
    if !config.resolver.reciprocal_fallback {
        tracing::info!("Reciprocal pairing fallback disabled");
    }

    let summary = match run(&config) {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Pipeline failed: {}", e);
            return Err(e.into());
        }
    };
    summary.log();

    Ok(())
}
