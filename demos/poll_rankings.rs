use cryptorank_rs::{Criterion, PollController, RankingRequest, core::RankClientBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing-subscriber")]
    cryptorank_rs::init_tracing()?;

    // 1. Client from CRYPTORANK_API_URL (or localhost:8080).
    let client = RankClientBuilder::from_env()?
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    // 2. Criterion and count from the command line: `poll_rankings galaxy_score 5`.
    let mut args = std::env::args().skip(1);
    let criterion: Criterion = args.next().as_deref().unwrap_or("market_cap").into();
    let count: u32 = args.next().map_or(Ok(10), |s| s.parse())?;
    let request = RankingRequest::new(criterion, count)?;

    // 3. Print every status change while the job resolves.
    let controller = PollController::new(client);
    let mut states = controller.subscribe();
    let watcher = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let line = states.borrow_and_update().status_message();
            if !line.is_empty() {
                println!("[status] {line}");
            }
        }
    });

    let outcome = controller.run(request.clone()).await?;
    watcher.abort();

    println!();
    println!(
        "--- Top {} by {} {} ---",
        request.result_count(),
        request.criterion().label(),
        if outcome.is_fallback() { "(demo data)" } else { "" }
    );
    for (rank, row) in outcome.records().unwrap_or_default().iter().enumerate() {
        println!(
            "{:>3}. {:<20} {:<6} {}",
            rank + 1,
            row.display_name,
            row.symbol,
            cryptorank_rs::format::display_value(&row.formatted_value, &row.criterion)
        );
    }
    Ok(())
}
