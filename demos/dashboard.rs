use std::time::Duration;

use cryptorank_rs::{Dashboard, RankClient, core::RankClientBuilder, format::display_value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing-subscriber")]
    cryptorank_rs::init_tracing()?;

    let client: RankClient = RankClientBuilder::from_env()?
        .timeout(Duration::from_secs(10))
        .build()?;

    // 1. Backend health and catalog, concurrently.
    let (health, catalog) = futures::future::join(client.health(), client.metric_catalog()).await;
    match health {
        Ok(h) => println!("Backend: {} (store connected: {:?})", h.status, h.store_connected),
        Err(e) => println!("Backend health unavailable: {e}"),
    }
    if let Ok(catalog) = catalog {
        println!("Collecting {} metrics", catalog.len());
    }
    println!();

    // 2. Mount the dashboard; the auto-refresh loop runs until `dash` is dropped.
    let dash = Dashboard::new(client);
    let snapshot = match dash.mount().await {
        Ok(read) => read.value,
        Err(e) => {
            println!("Failed to load data: {e}");
            println!("Requesting a collection run and retrying in 30 seconds...");
            dash.trigger_manual_fetch().await?;
            tokio::time::sleep(Duration::from_secs(31)).await;
            dash.retry().await?
        }
    };

    println!("--- Snapshot at {} ---", snapshot.timestamp);
    println!(
        "{} ok / {} failed in {} ms",
        snapshot.stats.success_count, snapshot.stats.failure_count, snapshot.stats.total_duration_ms
    );
    for (criterion, metric) in snapshot.metrics_by_priority() {
        println!();
        println!("{} [{:?}] {}", metric.name, metric.priority, metric.description);
        if !metric.success {
            println!("  error: {}", metric.error_message.as_deref().unwrap_or("unknown"));
            continue;
        }
        for row in metric.preview(3) {
            println!(
                "  {:<20} {:<6} {}",
                row.display_name,
                row.symbol,
                display_value(&row.formatted_value, criterion)
            );
        }
    }
    Ok(())
}
