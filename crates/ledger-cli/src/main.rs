use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Number, Value};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the proof-of-work ledger node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:5000)
    #[arg(long, global = true, env = "LEDGER_NODE", default_value = "http://127.0.0.1:5000")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a transaction
    Submit {
        /// Sender
        #[arg(long)]
        sender: String,
        /// Recipient
        #[arg(long)]
        recipient: String,
        /// Amount, any JSON number (e.g. 10 or 2.5)
        #[arg(long, value_parser = parse_amount)]
        amount: Number,
    },
    /// Mine the pending transactions into a block
    Mine,
    /// Print the full chain
    Chain,
    /// Print height and hash of the last block
    Head,
    /// Register peer nodes
    Register {
        /// Peer addresses, e.g. http://127.0.0.1:5001
        #[arg(required = true)]
        nodes: Vec<String>,
    },
    /// List registered peers
    Nodes,
    /// Run longest-chain consensus against the registered peers
    Resolve,
}

#[derive(Serialize)]
struct Tx {
    sender: String,
    recipient: String,
    amount: Number,
}

#[derive(Serialize)]
struct Register {
    nodes: Vec<String>,
}

fn parse_amount(raw: &str) -> Result<Number, String> {
    serde_json::from_str::<Number>(raw.trim()).map_err(|e| format!("not a number: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = cli.node.trim_end_matches('/');
    let client = reqwest::Client::new();

    let req = match cli.cmd {
        Command::Submit {
            sender,
            recipient,
            amount,
        } => client.post(format!("{node}/transactions/new")).json(&Tx {
            sender,
            recipient,
            amount,
        }),
        Command::Mine => client.get(format!("{node}/mine")),
        Command::Chain => client.get(format!("{node}/chain")),
        Command::Head => client.get(format!("{node}/chain/head")),
        Command::Register { nodes } => client
            .post(format!("{node}/nodes/register"))
            .json(&Register { nodes }),
        Command::Nodes => client.get(format!("{node}/nodes")),
        Command::Resolve => client.get(format!("{node}/nodes/resolve")),
    };
    debug!(?req, "sending request");

    let res = req.send().await?;
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    match serde_json::from_str::<Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    if !status.is_success() {
        anyhow::bail!("node answered {status}");
    }
    Ok(())
}
