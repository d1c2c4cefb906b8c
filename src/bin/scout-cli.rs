use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "scout-cli")]
#[command(about = "Smoke-test client for a running Patent Scout BFF", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Access token, sent as `Authorization: Bearer <token>`.
    #[arg(short, long, env = "SCOUT_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the BFF is up
    Health,
    /// Hybrid keyword / semantic search
    Search {
        #[arg(long)]
        keywords: Option<String>,
        #[arg(long)]
        semantic: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Fetch one patent by publication id
    Patent { pub_id: String },
    /// Filing volume over time
    Trend {
        #[arg(long, default_value = "month")]
        group_by: String,
        #[arg(long)]
        q: Option<String>,
    },
    /// List pricing plans
    Plans,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }

    let request = match cli.command {
        Commands::Health => client.get(format!("{}/healthz", base)),
        Commands::Search {
            keywords,
            semantic,
            limit,
        } => client.post(format!("{}/api/search", base)).json(&json!({
            "keywords": keywords,
            "semantic_query": semantic,
            "limit": limit,
        })),
        Commands::Patent { pub_id } => client.get(format!("{}/api/patent/{}", base, pub_id)),
        Commands::Trend { group_by, q } => {
            let mut query = vec![("group_by", group_by)];
            if let Some(q) = q {
                query.push(("q", q));
            }
            client.get(format!("{}/api/trend/volume", base)).query(&query)
        }
        Commands::Plans => client.get(format!("{}/api/payment/pricing-plans", base)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    if !status.is_success() {
        return Err(format!("BFF returned status {}", status).into());
    }
    Ok(())
}
