//! FlexiMart - document store for the sample e-commerce catalog.
//!
//! This is the main entry point for the FlexiMart command-line interface.

use std::path::PathBuf;
use std::process::ExitCode;

use fleximart::db::{Database, DatabaseConfig};
use fleximart::executor::ResultSet;
use fleximart::model::NewReview;

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    // Parse simple command line args.
    let mut path = PathBuf::from(".fleximart");
    let mut uri: Option<String> = None;
    let mut command: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--database" => {
                i += 1;
                if i < args.len() {
                    path = PathBuf::from(&args[i]);
                }
            }
            "-u" | "--uri" => {
                i += 1;
                if i < args.len() {
                    uri = Some(args[i].clone());
                }
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("FlexiMart v0.1.0");
                return ExitCode::SUCCESS;
            }
            arg => {
                if arg.starts_with('-') && command.is_empty() {
                    eprintln!("Unknown option: {}", arg);
                    return ExitCode::FAILURE;
                }
                command.push(arg.to_string());
            }
        }
        i += 1;
    }

    if command.is_empty() {
        print_help();
        return ExitCode::FAILURE;
    }

    // Open database.
    let open_result = match uri {
        Some(uri) => Database::connect(&uri),
        None => Database::open_with_config(DatabaseConfig::new(&path)),
    };
    let db = match open_result {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error opening database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run_command(&db, &command) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .compact()
        .init();
}

fn run_command(db: &Database, command: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    match command[0].as_str() {
        "import" => {
            let file = command.get(1).ok_or("usage: import FILE")?;
            let count = db.import_products_from_json(file)?;
            println!("Imported {} product(s)", count);
        }
        "list" => print_result_set(&db.products()?),
        "expensive" => {
            let threshold = parse_or(command.get(1), 1000.0)?;
            print_result_set(&db.products_above_price(threshold)?);
        }
        "low-stock" => {
            let threshold = parse_int_or(command.get(1), 20)?;
            print_result_set(&db.low_stock_products(threshold)?);
        }
        "category" => {
            let name = command.get(1).ok_or("usage: category NAME [MAX_PRICE]")?;
            let max_price = parse_or(command.get(2), 50000.0)?;
            print_result_set(&db.category_under_price(name, max_price)?);
        }
        "count" => println!("{}", db.product_count()?),
        "category-avg" => print_result_set(&db.average_price_by_category()?),
        "top-rated" => {
            let min_rating = parse_or(command.get(1), 4.0)?;
            print_result_set(&db.top_rated_products(min_rating)?);
        }
        "add-review" => {
            if command.len() < 6 {
                return Err("usage: add-review PRODUCT_ID USER_ID USERNAME RATING COMMENT".into());
            }
            let review = NewReview {
                user_id: command[2].clone(),
                username: command[3].clone(),
                rating: command[4].parse()?,
                comment: command[5].clone(),
            };
            let updated = db.append_review(&command[1], review)?;
            println!("{} product(s) updated", updated);
        }
        "summary" => print_result_set(&db.category_summary()?),
        other => return Err(format!("unknown command: {}", other).into()),
    }
    Ok(())
}

fn parse_or(arg: Option<&String>, default: f64) -> Result<f64, Box<dyn std::error::Error>> {
    match arg {
        Some(s) => Ok(s.parse()?),
        None => Ok(default),
    }
}

fn parse_int_or(arg: Option<&String>, default: i64) -> Result<i64, Box<dyn std::error::Error>> {
    match arg {
        Some(s) => Ok(s.parse()?),
        None => Ok(default),
    }
}

fn print_help() {
    println!("FlexiMart - document store for the sample e-commerce catalog");
    println!();
    println!("Usage: fleximart [OPTIONS] COMMAND [ARGS]");
    println!();
    println!("Options:");
    println!("  -d, --database PATH     Path to store directory (default: .fleximart)");
    println!("  -u, --uri URI           Connection URI (fleximart://<path>)");
    println!("  -h, --help              Show this help message");
    println!("  --version               Show version");
    println!();
    println!("Commands:");
    println!("  import FILE             Bulk-load products from a JSON array file");
    println!("  list                    List all products");
    println!("  expensive [THRESHOLD]   Products priced above THRESHOLD (default 1000)");
    println!("  low-stock [THRESHOLD]   Products with stock below THRESHOLD (default 20)");
    println!("  category NAME [MAX]     Products in a category under MAX, as name/price/stock");
    println!("  count                   Total product count");
    println!("  category-avg            Average price per category");
    println!("  top-rated [MIN]         Products with average rating >= MIN (default 4.0)");
    println!("  add-review ID USER_ID USERNAME RATING COMMENT");
    println!("                          Append a review to a product");
    println!("  summary                 Category summary sorted by average price");
}

fn print_result_set(rs: &ResultSet) {
    if rs.is_empty() {
        println!("(0 rows)");
        return;
    }

    // Simple tab-separated output for the CLI.
    let columns: Vec<&String> = if rs.columns.is_empty() {
        rs.rows[0].keys().collect()
    } else {
        rs.columns.iter().collect()
    };
    println!(
        "{}",
        columns
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join("\t")
    );

    for row in &rs.rows {
        let values: Vec<String> = columns
            .iter()
            .map(|col| row.get(*col).map(format_value).unwrap_or_default())
            .collect();
        println!("{}", values.join("\t"));
    }
    println!("({} rows)", rs.len());
}

fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_rejects_fractions() {
        let arg = "19.7".to_string();
        assert!(parse_int_or(Some(&arg), 20).is_err());
    }

    #[test]
    fn test_parse_int_defaults_when_absent() {
        assert_eq!(parse_int_or(None, 20).unwrap(), 20);
    }

    #[test]
    fn test_parse_or_accepts_fractions() {
        let arg = "19.7".to_string();
        assert_eq!(parse_or(Some(&arg), 1000.0).unwrap(), 19.7);
    }
}
