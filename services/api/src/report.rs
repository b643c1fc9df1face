use crate::infra::{parse_packaging, parse_transport, InMemoryOrderLedger};
use clap::Args;
use eco_intellect::config::AppConfig;
use eco_intellect::error::AppError;
use eco_intellect::footprint::{
    ComparisonMatrix, FootprintService, OrderAnalysis, OrderSubmission, PackagingType,
    TransportMode,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Delivery distance in kilometres
    #[arg(long)]
    pub(crate) distance_km: f64,
    /// Transport mode (car, bike, electric_vehicle, motorcycle, walk)
    #[arg(long, value_parser = parse_transport)]
    pub(crate) transport: TransportMode,
    /// Packaging type (plastic, paper, biodegradable, reusable)
    #[arg(long, value_parser = parse_packaging)]
    pub(crate) packaging: PackagingType,
    /// Order value in local currency
    #[arg(long)]
    pub(crate) order_value: f64,
    /// How many times per week the order repeats
    #[arg(long, default_value_t = 1)]
    pub(crate) frequency: u8,
    /// Quoted delivery time in minutes
    #[arg(long)]
    pub(crate) estimated_time_minutes: Option<u32>,
    /// Attribute the order to this user instead of the demo account
    #[arg(long)]
    pub(crate) user: Option<String>,
    /// Print the raw JSON payload instead of the summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    /// Delivery distance in kilometres
    #[arg(long)]
    pub(crate) distance_km: f64,
    /// Print the raw JSON payload instead of the table
    #[arg(long)]
    pub(crate) json: bool,
}

fn build_service() -> Result<FootprintService<InMemoryOrderLedger>, AppError> {
    let config = AppConfig::load()?;
    Ok(FootprintService::from_config(
        Arc::new(InMemoryOrderLedger::default()),
        &config.providers,
    ))
}

pub(crate) async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let service = build_service()?;
    let analysis = service
        .analyze(OrderSubmission {
            distance_km: args.distance_km,
            transport_mode: args.transport,
            packaging_type: args.packaging,
            estimated_time_minutes: args.estimated_time_minutes,
            order_value: args.order_value,
            frequency_per_week: args.frequency,
            user_id: args.user,
        })
        .await?;

    if args.json {
        print_json(&analysis);
    } else {
        print_analysis(&analysis, args.transport, args.packaging);
    }
    Ok(())
}

pub(crate) async fn run_compare(args: CompareArgs) -> Result<(), AppError> {
    let service = build_service()?;
    let matrix = service.compare(args.distance_km).await?;

    if args.json {
        print_json(&matrix);
    } else {
        print_matrix(&matrix);
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(payload: &T) {
    match serde_json::to_string_pretty(payload) {
        Ok(json) => println!("{}", json),
        Err(err) => println!("Payload unavailable: {}", err),
    }
}

fn print_analysis(analysis: &OrderAnalysis, transport: TransportMode, packaging: PackagingType) {
    println!("Order footprint");
    println!(
        "  {} + {} for {}",
        transport.label(),
        packaging.label(),
        analysis.user_id.0
    );
    println!(
        "  Emissions: {:.2} g CO2 (eco score {}, {})",
        analysis.carbon_emission_grams,
        analysis.eco_score,
        analysis.rating.label()
    );
    println!("  {}", analysis.environmental_context);

    if analysis.better_alternatives.is_empty() {
        println!("\nBetter alternatives: none");
    } else {
        println!("\nBetter alternatives");
        for alternative in &analysis.better_alternatives {
            println!(
                "  - {:<28} {:>8.2} g  saves {:>8.2} g  {:+} min  score {}",
                alternative.label,
                alternative.carbon_emission_grams,
                alternative.carbon_saved_grams,
                alternative.time_difference_minutes,
                alternative.eco_score
            );
        }
    }

    let projection = &analysis.yearly_projection;
    println!("\nYearly projection");
    println!(
        "  {} orders, {:.2} kg CO2, {} trees to offset",
        projection.total_orders_per_year,
        projection.total_carbon_kg,
        projection.trees_needed_to_offset
    );
    println!(
        "  Equivalent to {:.2} km by car, {:.2} spent",
        projection.equivalent_car_km, projection.money_spent
    );
    if let Some(scenarios) = &projection.scale_scenarios {
        for scenario in scenarios {
            println!(
                "  At {}: {:.2} t CO2, {} trees",
                scenario.label, scenario.total_co2_saved_tonnes, scenario.equivalent_trees
            );
        }
    }

    println!(
        "\nData sources: transport {}, packaging {}, trees {}",
        analysis.data_sources.transport_factor.as_str(),
        analysis.data_sources.packaging_factor.as_str(),
        analysis.data_sources.trees_needed.as_str()
    );
}

fn print_matrix(matrix: &ComparisonMatrix) {
    println!(
        "{} delivery options for {:.2} km",
        matrix.total_options, matrix.distance_km
    );
    for option in &matrix.options {
        println!(
            "  {:<18} {:<15} {:>8.2} g  {:>4} min  score {:>3}  {}",
            option.transport_mode.label(),
            option.packaging_type.label(),
            option.carbon_emission_grams,
            option.estimated_time_minutes,
            option.eco_score,
            option.rating.label()
        );
    }
}
