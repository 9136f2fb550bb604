//! Example consumer: prints rows of one Salesforce object as JSON lines.
//!
//! Credentials come from SALESFORCE_* variables (a `.env` file is honored).
//! Run from repo root: `cargo run -p example-consumer -- Account name=Acme`
//! List the configured tables instead: `cargo run -p example-consumer -- --tables`

use salesforce_tables::{
    build_catalog, load_from_env, Connector, HttpAuthClient, Operator, Qual, QualMap, QualValue, RestTransport,
};
use std::ops::ControlFlow;
use std::sync::Arc;

/// `column=value` arguments become text equality qualifiers.
fn parse_quals(args: &[String]) -> Result<QualMap, String> {
    args.iter()
        .map(|arg| {
            let (column, value) = arg
                .split_once('=')
                .ok_or_else(|| format!("expected column=value, got {:?}", arg))?;
            Ok(Qual::new(column, Operator::Eq, QualValue::String(value.to_string())))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("salesforce_tables=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(object_type) = args.first() else {
        eprintln!("usage: example-consumer <ObjectType> [column=value ...] | --tables");
        std::process::exit(2);
    };

    let config = load_from_env()?;
    let connector = Arc::new(
        Connector::builder(config, Arc::new(RestTransport::new()), Arc::new(HttpAuthClient::new())).build(),
    );

    if object_type == "--tables" {
        for table in build_catalog(connector).await? {
            println!("{}\t{} columns", table.name, table.columns.len());
        }
        return Ok(());
    }

    let quals = parse_quals(&args[1..])?;
    let mut count = 0usize;
    connector
        .list_objects(object_type, &quals, |row| {
            println!("{}", serde_json::Value::Object(row));
            count += 1;
            ControlFlow::Continue(())
        })
        .await?;
    tracing::info!(object_type = %object_type, rows = count, "done");
    Ok(())
}
