use anyhow::{anyhow, Context, Result};
use clap::Parser;
use mysql_query_helper::logging::{init_logging, LogConfig};
use mysql_query_helper::{HelperConfig, Params, QueryHelper, Value};
use std::path::PathBuf;

/// Run one SELECT/INSERT/UPDATE/DELETE statement against MySQL and print the result as JSON
#[derive(Parser, Debug)]
#[command(name = "mysql-query-helper")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQL statement; parameters are referenced as @name
    #[arg(required_unless_present = "print_sample_config")]
    sql: Option<String>,

    /// Connection string (mysql:// URL or key=value; list)
    #[arg(long = "dsn", env = "MYSQL_HELPER_DSN")]
    dsn: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Named parameter as name=value (repeatable)
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,

    /// Parameters as a JSON object
    #[arg(long = "params-json", value_name = "JSON")]
    params_json: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level")]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long = "json-logs")]
    json_logs: bool,

    /// Print a sample configuration file and exit
    #[arg(long = "print-sample-config")]
    print_sample_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_sample_config {
        print!("{}", HelperConfig::sample_toml()?);
        return Ok(());
    }

    let config = match cli.config {
        Some(ref path) => HelperConfig::load_from(Some(path.as_path())),
        None => HelperConfig::load(),
    }
    .context("failed to load configuration")?;

    let level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "warn".to_string());
    let _guard = init_logging(&LogConfig::default().with_level(level).with_json(cli.json_logs))?;

    let params = collect_params(&cli)?;
    let sql = cli
        .sql
        .as_deref()
        .ok_or_else(|| anyhow!("an SQL statement is required"))?;

    let mut helper = match cli.dsn {
        Some(ref dsn) => QueryHelper::connect(dsn).await?,
        None => QueryHelper::open(&config.connection_settings()?).await?,
    };

    let outcome = helper.query(sql, Some(&params)).await;
    helper.close_connection().await;

    println!("{}", serde_json::to_string_pretty(&outcome?)?);
    Ok(())
}

fn collect_params(cli: &Cli) -> Result<Params> {
    let mut params = match cli.params_json {
        Some(ref json) => {
            let data: serde_json::Value =
                serde_json::from_str(json).context("--params-json is not valid JSON")?;
            Params::from_serialize(&data)?
        }
        None => Params::new(),
    };

    for raw in &cli.params {
        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| anyhow!("parameter '{}' must be NAME=VALUE", raw))?;
        params.insert(name.trim(), parse_param_value(value));
    }

    Ok(params)
}

/// Command-line values are typed by shape: null, booleans, integers and
/// floats are recognised, anything else is a string.
fn parse_param_value(raw: &str) -> Value {
    match raw {
        "null" | "NULL" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(i) = raw.parse::<i64>() {
                Value::Int(i)
            } else if let Ok(f) = raw.parse::<f64>() {
                Value::Float(f)
            } else {
                Value::String(raw.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param_value() {
        assert_eq!(parse_param_value("null"), Value::Null);
        assert_eq!(parse_param_value("true"), Value::Bool(true));
        assert_eq!(parse_param_value("42"), Value::Int(42));
        assert_eq!(parse_param_value("-1.5"), Value::Float(-1.5));
        assert_eq!(parse_param_value("abc"), Value::String("abc".to_string()));
        assert_eq!(parse_param_value(""), Value::String(String::new()));
    }

    #[test]
    fn test_collect_params_merges_json_and_flags() {
        let cli = Cli::parse_from([
            "mysql-query-helper",
            "SELECT * FROM t WHERE id = @id AND name = @name",
            "--params-json",
            r#"{"id": 1, "name": "json"}"#,
            "-p",
            "name=flag",
        ]);

        let params = collect_params(&cli).unwrap();
        assert_eq!(params.get("id"), Some(&Value::Int(1)));
        assert_eq!(params.get("name"), Some(&Value::String("flag".to_string())));
    }

    #[test]
    fn test_collect_params_rejects_malformed_flag() {
        let cli = Cli::parse_from(["mysql-query-helper", "SELECT 1", "-p", "novalue"]);
        assert!(collect_params(&cli).is_err());
    }

    #[test]
    fn test_sql_required_unless_printing_sample() {
        assert!(Cli::try_parse_from(["mysql-query-helper"]).is_err());
        assert!(Cli::try_parse_from(["mysql-query-helper", "--print-sample-config"]).is_ok());
    }
}
