use sales_forecast::features::FeatureBuilder;
use sales_forecast::pipeline::ReportPipeline;
use sales_forecast::utils::synthetic_records;
use sales_forecast::ReportConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Three synthetic stores, a little under three years of weeks each
    let records = synthetic_records(&[1, 2, 3], 143, 42)?;
    println!("Generated {} weekly records", records.len());

    let table = FeatureBuilder::new().build(&records)?;
    println!(
        "Built features for {} stores, {} complete rows",
        table.stores().len(),
        table.complete_rows().len()
    );

    let pipeline = ReportPipeline::new(ReportConfig::default());
    let report = pipeline.run(&table)?;

    println!("\n{}", report);
    if let Some(best) = report.comparison.best() {
        println!("Lowest RMSE: {} ({:.2})", best.model, best.rmse);
    }

    Ok(())
}
