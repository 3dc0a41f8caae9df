use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "annotate-cli")]
#[command(about = "Command line client for the annotation service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Session id returned by `login`
    #[arg(short, long)]
    session: Option<String>,

    /// Session cookie name configured on the server
    #[arg(long, default_value = "sid")]
    cookie: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a session and print its id
    Login { user: String },
    /// Show the current session
    Whoami,
    /// Close the current session
    Logout,
    /// List attributes and their allowed values
    Attributes,
    /// Show the next items to annotate
    Workload,
    /// Show overall statistics (no session needed)
    Stats,
    /// Submit one annotation
    Annotate {
        item: String,
        attribute: String,
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let api = format!("{}/api", cli.url.trim_end_matches('/'));

    let mut headers = HeaderMap::new();
    if let Some(session) = &cli.session {
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{}={}", cli.cookie, session))?,
        );
    }

    let res = match cli.command {
        Commands::Login { user } => {
            client.post(format!("{api}/session"))
                .json(&json!({ "user": user }))
                .send()
                .await?
        }
        Commands::Whoami => {
            client.get(format!("{api}/session"))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Logout => {
            client.delete(format!("{api}/session"))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Attributes => {
            client.get(format!("{api}/annotations/attributes"))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Workload => {
            client.get(format!("{api}/annotations/workload"))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Stats => {
            client.get(format!("{api}/annotations/overall-stats"))
                .send()
                .await?
        }
        Commands::Annotate { item, attribute, value } => {
            client.post(format!("{api}/annotations"))
                .headers(headers)
                .json(&json!({
                    "annotations": [{ "item_id": item, "attribute": attribute, "value": value }]
                }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }
    if status == reqwest::StatusCode::NO_CONTENT {
        println!("ok");
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
