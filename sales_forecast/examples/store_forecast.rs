use sales_forecast::models::arima::AutoArima;
use sales_forecast::models::{ForecastModel, TrainedForecastModel};
use sales_forecast::utils::synthetic_sales;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Two years of history, forecast the following year
    let series = synthetic_sales(104, 7);
    let model = AutoArima::default().train(&series)?;

    println!("Selected {}", model.order());
    println!(
        "{:?} = {:.2}, sigma^2 = {:.2}",
        model.criterion(),
        model.criterion_value(),
        model.sigma2()
    );

    let forecast = model.forecast(52)?;
    println!(
        "\n{:>4}  {:>14}  {:>14}  {:>14}",
        "Week", "Forecast", "Lower", "Upper"
    );
    for (i, (value, (lower, upper))) in forecast
        .values()
        .iter()
        .zip(forecast.intervals())
        .enumerate()
    {
        println!("{:>4}  {:>14.2}  {:>14.2}  {:>14.2}", i + 1, value, lower, upper);
    }

    Ok(())
}
