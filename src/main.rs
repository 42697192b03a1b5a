use std::env;
use std::process;

use env_logger::Env;
use log::{error, info};

use tablrs::functions::{avg, col, count_all, dense_rank, desc, lit, sum, to_date};
use tablrs::{
    config, io, ColumnType, EngineConfig, JoinSpec, Result, Schema, SortKey, Table, Value,
    WindowSpec,
};

// Orders with dates still as text, converted by `to_date` like any raw source
fn sample_orders() -> Result<Table> {
    let schema = Schema::from_pairs(&[
        ("order_id", ColumnType::Int64),
        ("order_date", ColumnType::String),
        ("category", ColumnType::String),
        ("amount", ColumnType::Int64),
        ("city", ColumnType::String),
    ])?;
    let data = [
        (1, "2024-01-01", "Electronics", 2000, "Bangalore"),
        (2, "2024-01-02", "Clothing", 1500, "Mumbai"),
        (3, "2024-01-03", "Electronics", 3000, "Bangalore"),
        (4, "2024-01-04", "Furniture", 4000, "Delhi"),
        (5, "2024-01-05", "Clothing", 1200, "Mumbai"),
        (6, "2024-01-06", "Electronics", 2500, "Delhi"),
    ];
    let rows = data
        .iter()
        .map(|(id, date, category, amount, city)| {
            vec![
                Value::from(*id),
                Value::from(*date),
                Value::from(*category),
                Value::from(*amount),
                Value::from(*city),
            ]
        })
        .collect();

    let raw = Table::from_rows(schema, rows)?;
    raw.with_column("order_date", &to_date("order_date", "%Y-%m-%d"))
}

fn load_orders(path: &str) -> Result<Table> {
    let schema = Schema::from_pairs(&[
        ("order_id", ColumnType::Int64),
        ("order_date", ColumnType::Date),
        ("category", ColumnType::String),
        ("amount", ColumnType::Int64),
        ("city", ColumnType::String),
    ])?;
    io::read_csv(path, &schema, true)
}

fn run() -> Result<()> {
    if let Ok(path) = env::var("TABLRS_CONFIG") {
        config::set_global(EngineConfig::from_file(&path)?)?;
        info!("loaded configuration from {}", path);
    }

    let orders = match env::args().nth(1) {
        Some(path) => {
            info!("reading orders from {}", path);
            load_orders(&path)?
        }
        None => sample_orders()?,
    };

    let aggregated = orders.group_by(&["category"]).agg(vec![
        sum("amount").alias("total_sales"),
        avg("amount").alias("avg_sales"),
        count_all().alias("order_count"),
    ])?;

    let running = WindowSpec::new()
        .partition_by(&["category"])
        .order_by(vec![SortKey::asc("order_date")])
        .rows_to_current_row();
    let ranking = WindowSpec::new()
        .partition_by(&["category"])
        .order_by(vec![desc("amount")]);
    let enriched = orders
        .with_window_column("running_total", sum("amount"), &running)?
        .with_window_column("rank_in_category", dense_rank(), &ranking)?;

    let high_value = enriched.filter(&col("amount").gt(lit(2000)))?;

    let pairs = JoinSpec::new()
        .on("city", "city")
        .aliases("a", "b")
        .exclude(col("a.order_id").eq(col("b.order_id")));
    let same_city = enriched.self_join(&pairs)?.select_as(&[
        ("a.order_id", "order1"),
        ("b.order_id", "order2"),
        ("a.city", "city"),
    ])?;

    println!("Aggregated Data:");
    print!("{}", aggregated);
    println!("With Running Total and Rank:");
    print!("{}", enriched);
    println!("High Value Orders:");
    print!("{}", high_value);
    println!("Self Join Result:");
    print!("{}", same_city);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        error!("{}", e);
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
