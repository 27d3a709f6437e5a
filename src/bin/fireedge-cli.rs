use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "fireedge-cli")]
#[command(about = "Command line client for the FireEdge API gateway", long_about = None)]
struct Cli {
    #[arg(short, long, env = "FIREEDGE_URL", default_value = "http://localhost:2616")]
    url: String,

    /// Bearer token returned by `login`.
    #[arg(short, long, env = "FIREEDGE_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate and print the bearer token
    Login {
        #[arg(short, long)]
        user: String,
        #[arg(short, long, env = "FIREEDGE_PASSWORD")]
        password: String,
        /// Second factor code
        #[arg(long)]
        otp: Option<String>,
        /// Request the extended ("remember me") lifetime
        #[arg(long)]
        extended: bool,
        #[arg(long)]
        zone: Option<u32>,
    },
    /// Call an API route, e.g. `call PUT host/5/status --data '{"status":1}'`
    Call {
        method: String,
        path: String,
        /// JSON body
        #[arg(short, long)]
        data: Option<String>,
        #[arg(long)]
        zone: Option<u32>,
    },
    /// Gateway health
    Health,
    /// Configured zones
    Zones,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Login { user, password, otp, extended, zone } => {
            let mut request = client
                .post(format!("{base}/api/auth"))
                .json(&json!({"user": user, "pass": password, "token": otp, "extended": extended}));
            if let Some(zone) = zone {
                request = request.query(&[("zone", zone)]);
            }
            let body = send(request).await?;
            match body.pointer("/data/token").and_then(Value::as_str) {
                Some(token) => println!("{token}"),
                None => println!("{}", serde_json::to_string_pretty(&body)?),
            }
        }
        Commands::Call { method, path, data, zone } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let token = cli.token.ok_or("a bearer token is required (--token or FIREEDGE_TOKEN)")?;

            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);

            let mut request = client
                .request(method, format!("{base}/api/{}", path.trim_start_matches('/')))
                .headers(headers);
            if let Some(zone) = zone {
                request = request.query(&[("zone", zone)]);
            }
            if let Some(data) = data {
                let body: Value = serde_json::from_str(&data)?;
                request = request.json(&body);
            }
            print_body(send(request).await?)?;
        }
        Commands::Health => print_body(send(client.get(format!("{base}/api/health"))).await?)?,
        Commands::Zones => print_body(send(client.get(format!("{base}/api/zones"))).await?)?,
    }

    Ok(())
}

async fn send(request: reqwest::RequestBuilder) -> Result<Value, Box<dyn std::error::Error>> {
    let res = request.send().await?;
    let status = res.status();
    let body: Value = res.json().await.unwrap_or(Value::Null);
    if !status.is_success() {
        let message = body.get("message").and_then(Value::as_str).unwrap_or("");
        return Err(format!("gateway returned {status}: {message}").into());
    }
    Ok(body)
}

fn print_body(body: Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
