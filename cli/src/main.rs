use clap::{Args, Parser, Subcommand};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Protected list endpoints exercised by `probe`.
const PROBE_PATHS: [&str; 4] = ["/api/auth/me", "/api/athletes", "/api/opponents", "/api/analyses"];

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing session token; pass --token, set JIUMETRICS_TOKEN, or use --anonymous")]
    MissingToken,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("server returned HTTP {status}: {message}")]
    Server { status: u16, message: String },
    #[error("missing expected field `{0}`")]
    MissingField(&'static str),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("anonymous requests were accepted by: {0}")]
    Unprotected(String),
}

#[derive(Parser, Debug)]
#[command(name = "jiumetrics-cli", about = "JiuMetrics API diagnostic CLI")]
struct Cli {
    #[arg(long, env = "JIUMETRICS_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Session token sent as `Authorization: Bearer <token>`.
    #[arg(long, env = "JIUMETRICS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Send requests without credentials, even if a token is configured.
    #[arg(long, default_value_t = false)]
    anonymous: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    token: Option<String>,
    anonymous: bool,
}

impl CliContext {
    /// Token to attach, `None` for an explicit anonymous run.
    fn credentials(&self) -> Result<Option<&str>, CliError> {
        if self.anonymous {
            return Ok(None);
        }
        self.token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(Some)
            .ok_or(CliError::MissingToken)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check `/healthz`.
    Ping,
    Auth(AuthCommand),
    Athlete(RosterCommand),
    Opponent(RosterCommand),
    Analysis(AnalysisCommand),
    /// Call each protected endpoint with and without the token and report
    /// whether anonymous access was rejected.
    Probe,
}

#[derive(Args, Debug)]
struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
enum AuthSubcommand {
    RequestCode { email: String },
    VerifyCode { email: String, code: String },
    Me,
    Logout,
}

#[derive(Args, Debug)]
struct RosterCommand {
    #[command(subcommand)]
    command: RosterSubcommand,
}

#[derive(Subcommand, Debug)]
enum RosterSubcommand {
    List,
    Read {
        id: Uuid,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        belt: Option<String>,
        #[arg(long)]
        weight_class: Option<String>,
        #[arg(long)]
        gym: Option<String>,
        #[arg(long)]
        style: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct AnalysisCommand {
    #[command(subcommand)]
    command: AnalysisSubcommand,
}

#[derive(Subcommand, Debug)]
enum AnalysisSubcommand {
    List {
        #[arg(long)]
        athlete_id: Option<Uuid>,
        #[arg(long)]
        opponent_id: Option<Uuid>,
    },
    Read {
        id: Uuid,
    },
    Delete {
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext { base_url: cli.base_url, token: cli.token, anonymous: cli.anonymous };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Auth(auth) => run_auth(&ctx, auth).await,
        Command::Athlete(roster) => run_roster(&ctx, "/api/athletes", roster).await,
        Command::Opponent(roster) => run_roster(&ctx, "/api/opponents", roster).await,
        Command::Analysis(analysis) => run_analysis(&ctx, analysis).await,
        Command::Probe => run_probe(&ctx).await,
    }
}

async fn run_ping(cli: &CliContext) -> Result<(), CliError> {
    let (status, _) = send(cli, reqwest::Method::GET, "/healthz", None, None).await?;
    if !status.is_success() {
        return Err(CliError::Server { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

async fn run_auth(cli: &CliContext, auth: AuthCommand) -> Result<(), CliError> {
    match auth.command {
        AuthSubcommand::RequestCode { email } => {
            let json = public_request(
                cli,
                reqwest::Method::POST,
                "/api/auth/email/request-code",
                Some(serde_json::json!({ "email": email })),
            )
            .await?;
            print_json(&json)
        }
        AuthSubcommand::VerifyCode { email, code } => {
            let json = public_request(
                cli,
                reqwest::Method::POST,
                "/api/auth/email/verify-code",
                Some(serde_json::json!({ "email": email, "code": code })),
            )
            .await?;
            let token = json
                .get("token")
                .and_then(Value::as_str)
                .ok_or(CliError::MissingField("token"))?;
            eprintln!("export JIUMETRICS_TOKEN={token}");
            print_json(&json)
        }
        AuthSubcommand::Me => {
            let json = api_request(cli, reqwest::Method::GET, "/api/auth/me", None).await?;
            print_json(&json)
        }
        AuthSubcommand::Logout => {
            api_request(cli, reqwest::Method::POST, "/api/auth/logout", None).await?;
            println!("logged out");
            Ok(())
        }
    }
}

async fn run_roster(cli: &CliContext, collection: &str, roster: RosterCommand) -> Result<(), CliError> {
    match roster.command {
        RosterSubcommand::List => {
            let json = api_request(cli, reqwest::Method::GET, collection, None).await?;
            print_json(&json)
        }
        RosterSubcommand::Read { id } => {
            let path = format!("{collection}/{id}");
            let json = api_request(cli, reqwest::Method::GET, &path, None).await?;
            print_json(&json)
        }
        RosterSubcommand::Create { name, belt, weight_class, gym, style, notes } => {
            let mut body = Map::new();
            body.insert("name".to_owned(), Value::String(name));
            for (key, value) in [
                ("belt", belt),
                ("weight_class", weight_class),
                ("gym", gym),
                ("style", style),
                ("notes", notes),
            ] {
                if let Some(value) = value {
                    body.insert(key.to_owned(), Value::String(value));
                }
            }
            let json = api_request(cli, reqwest::Method::POST, collection, Some(Value::Object(body))).await?;
            print_json(&json)
        }
        RosterSubcommand::Delete { id } => {
            let path = format!("{collection}/{id}");
            api_request(cli, reqwest::Method::DELETE, &path, None).await?;
            println!("deleted {id}");
            Ok(())
        }
    }
}

async fn run_analysis(cli: &CliContext, analysis: AnalysisCommand) -> Result<(), CliError> {
    match analysis.command {
        AnalysisSubcommand::List { athlete_id, opponent_id } => {
            let path = analyses_list_path(athlete_id, opponent_id);
            let json = api_request(cli, reqwest::Method::GET, &path, None).await?;
            print_json(&json)
        }
        AnalysisSubcommand::Read { id } => {
            let path = format!("/api/analyses/{id}");
            let json = api_request(cli, reqwest::Method::GET, &path, None).await?;
            print_json(&json)
        }
        AnalysisSubcommand::Delete { id } => {
            let path = format!("/api/analyses/{id}");
            api_request(cli, reqwest::Method::DELETE, &path, None).await?;
            println!("deleted {id}");
            Ok(())
        }
    }
}

fn analyses_list_path(athlete_id: Option<Uuid>, opponent_id: Option<Uuid>) -> String {
    let filters: Vec<String> = [("athlete_id", athlete_id), ("opponent_id", opponent_id)]
        .into_iter()
        .filter_map(|(key, id)| id.map(|id| format!("{key}={id}")))
        .collect();
    if filters.is_empty() {
        "/api/analyses".to_owned()
    } else {
        format!("/api/analyses?{}", filters.join("&"))
    }
}

// =============================================================================
// PROBE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeVerdict {
    /// Anonymous call rejected with 401.
    Protected,
    /// Anonymous call succeeded.
    Exposed,
    /// Anything else (server error, unexpected status).
    Inconclusive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProbeResult {
    path: &'static str,
    anonymous: u16,
    authorized: Option<u16>,
}

impl ProbeResult {
    fn verdict(&self) -> ProbeVerdict {
        match self.anonymous {
            401 => ProbeVerdict::Protected,
            200..=299 => ProbeVerdict::Exposed,
            _ => ProbeVerdict::Inconclusive,
        }
    }

    fn render(&self) -> String {
        let authorized = self.authorized.map_or_else(|| "skipped".to_owned(), |s| s.to_string());
        format!(
            "{:<16} anonymous={} bearer={} -> {:?}",
            self.path,
            self.anonymous,
            authorized,
            self.verdict()
        )
    }
}

async fn run_probe(cli: &CliContext) -> Result<(), CliError> {
    let token = if cli.anonymous { None } else { cli.token.as_deref().filter(|t| !t.trim().is_empty()) };
    if token.is_none() {
        eprintln!("no token configured; probing anonymous access only");
    }

    let mut results = Vec::with_capacity(PROBE_PATHS.len());
    for path in PROBE_PATHS {
        let (anonymous, _) = send(cli, reqwest::Method::GET, path, None, None).await?;
        let authorized = match token {
            Some(token) => Some(send(cli, reqwest::Method::GET, path, None, Some(token)).await?.0.as_u16()),
            None => None,
        };
        let result = ProbeResult { path, anonymous: anonymous.as_u16(), authorized };
        println!("{}", result.render());
        results.push(result);
    }

    let exposed = exposed_paths(&results);
    if exposed.is_empty() { Ok(()) } else { Err(CliError::Unprotected(exposed.join(", "))) }
}

fn exposed_paths(results: &[ProbeResult]) -> Vec<&'static str> {
    results
        .iter()
        .filter(|r| r.verdict() == ProbeVerdict::Exposed)
        .map(|r| r.path)
        .collect()
}

// =============================================================================
// HTTP
// =============================================================================

fn bearer_value(token: &str) -> Result<HeaderValue, CliError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    Ok(value)
}

async fn send(
    cli: &CliContext,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Result<(StatusCode, Value), CliError> {
    let client = reqwest::Client::new();
    let mut request = client.request(method, cli.url(path));
    if let Some(token) = token {
        request = request.header(AUTHORIZATION, bearer_value(token)?);
    }
    if let Some(json) = body {
        request = request.json(&json);
    }

    let response = request.send().await?;
    let status = response.status();
    let value = response.json::<Value>().await.unwrap_or(Value::Null);
    Ok((status, value))
}

fn check_status(status: StatusCode, value: Value) -> Result<Value, CliError> {
    if status.is_success() {
        return Ok(value);
    }
    let message = value
        .get("error")
        .and_then(Value::as_str)
        .map_or_else(|| value.to_string(), ToOwned::to_owned);
    Err(CliError::Server { status: status.as_u16(), message })
}

/// Request that carries the bearer token unless `--anonymous` was given.
async fn api_request(
    cli: &CliContext,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
) -> Result<Value, CliError> {
    let token = cli.credentials()?;
    let (status, value) = send(cli, method, path, body, token).await?;
    check_status(status, value)
}

/// Request to an endpoint that needs no session (login-code exchange).
async fn public_request(
    cli: &CliContext,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
) -> Result<Value, CliError> {
    let (status, value) = send(cli, method, path, body, None).await?;
    check_status(status, value)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
