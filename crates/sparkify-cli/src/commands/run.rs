use anyhow::{Context, Result};
use sparkify_etl::{Config, Pipeline};

pub async fn run_pipeline(config: &Config) -> Result<()> {
    log::info!(
        "Starting run: {} -> {}",
        config.input_root,
        config.output_root
    );

    println!("  ⏳ Connecting to {} and {}", config.input_root, config.output_root);
    let pipeline = Pipeline::from_config(config)
        .await
        .context("Failed to set up storage")?;

    let summary = pipeline.run().await.context("Pipeline run failed")?;

    println!(
        "  ✓ Read {} catalog records and {} events ({} song plays)",
        summary.catalog_records, summary.event_records, summary.song_plays
    );
    for report in &summary.tables {
        println!("  ✓ [{}] {} rows in {} files", report.table, report.rows, report.files);
    }

    println!("\n✓ Run complete");
    Ok(())
}
