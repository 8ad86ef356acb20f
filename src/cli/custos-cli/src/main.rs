//! Custos CLI - certificate requests and retrieval.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use custos_cert::error::file_option;
use custos_cert::{
    CertRequest, CertRequestWorkflow, CertResult, CertRetrieval, FindRequest, FindResult,
    InvocationContext, ShowRequest,
};
use custos_errors::{ErrorRegistry, PrivateError, PublicError};
use custos_keys::LocalKeyMaterial;
use custos_rpc::{ClientConfig, RpcClient};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "custos")]
#[command(about = "Custos CLI - Request and retrieve certificates")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    server: ServerArgs,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ServerArgs {
    /// Custos server address
    #[arg(long, default_value = custos_rpc::DEFAULT_SERVER, env = "CUSTOS_SERVER")]
    server: String,

    /// Authentication token
    #[arg(long, env = "CUSTOS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, default_value = "30", env = "CUSTOS_TIMEOUT")]
    timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a certificate request, building the CSR locally if needed
    CertRequest {
        /// PEM CSR file (omit with --database or --private-key)
        csr_file: Option<PathBuf>,
        /// Principal the certificate is for
        #[arg(long)]
        principal: String,
        /// Issuance profile
        #[arg(long)]
        profile_id: Option<String>,
        /// Profile used to build the CSR template
        #[arg(long)]
        csr_profile_id: Option<String>,
        /// Key database directory to generate the key in
        #[arg(long)]
        database: Option<PathBuf>,
        /// PEM private key file
        #[arg(long)]
        private_key: Option<PathBuf>,
        /// File holding the database or key password
        #[arg(long)]
        password_file: Option<PathBuf>,
        /// Write the issued certificate to this file
        #[arg(long)]
        certificate_out: Option<PathBuf>,
        /// Include the certificate chain
        #[arg(long)]
        chain: bool,
        /// Create the principal if it does not exist
        #[arg(long)]
        add: bool,
    },
    /// Show a certificate
    CertShow {
        /// Serial number
        serial: String,
        /// Write the certificate to this file
        #[arg(long)]
        certificate_out: Option<PathBuf>,
        /// Deprecated, use --certificate-out
        #[arg(long)]
        out: Option<PathBuf>,
        /// Include the certificate chain
        #[arg(long)]
        chain: bool,
    },
    /// Search certificates
    CertFind {
        /// Base64 DER certificate
        #[arg(long)]
        certificate: Option<String>,
        /// PEM or DER certificate file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Subject common name
        #[arg(long)]
        subject: Option<String>,
        /// Maximum number of results
        #[arg(long)]
        sizelimit: Option<u32>,
    },
    /// List public error codes
    Errors,
}

// ============================================================================
// Setup
// ============================================================================

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .context("Failed to initialize logging")
}

fn build_client(args: &ServerArgs) -> Result<RpcClient> {
    let config = ClientConfig::new(&args.server)
        .with_token(args.token.clone())
        .with_timeout(Duration::from_secs(args.timeout));
    RpcClient::new(config).context("Failed to create HTTP client")
}

// ============================================================================
// Output
// ============================================================================

fn field_label(key: &str) -> String {
    let mut label = key.replace('_', " ");
    if let Some(first) = label.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    label
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(format_value).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

fn format_cert_result(result: &CertResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Certificate: {}", result.certificate);
    if let Some(chain) = &result.certificate_chain {
        for (i, cert) in chain.iter().enumerate() {
            let _ = writeln!(out, "  Certificate chain {}: {}", i + 1, cert);
        }
    }
    for (key, value) in &result.extra {
        let _ = writeln!(out, "  {}: {}", field_label(key), format_value(value));
    }
    out
}

fn format_find_result(found: &FindResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} certificate(s) matched", found.count);
    for result in &found.result {
        out.push_str(&format_cert_result(result));
        out.push('\n');
    }
    let _ = writeln!(out, "Number of entries returned {}", found.result.len());
    if found.truncated {
        let _ = writeln!(out, "Search result was truncated, narrow it with --sizelimit or --subject");
    }
    out
}

fn error_listing() -> String {
    let registry = ErrorRegistry::global();
    let mut out = String::new();
    for entry in registry.iter() {
        let _ = writeln!(out, "{}\t{}", entry.code, entry.name);
    }
    let _ = writeln!(out, "({} public errors)", registry.len());
    out
}

// ============================================================================
// Command Handlers
// ============================================================================

fn read_csr(path: &Path) -> Result<String, PublicError> {
    std::fs::read_to_string(path).map_err(|e| file_option("csr", PrivateError::file(path, &e)))
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::CertRequest {
            csr_file,
            principal,
            profile_id,
            csr_profile_id,
            database,
            private_key,
            password_file,
            certificate_out,
            chain,
            add,
        } => {
            let csr = csr_file.as_deref().map(read_csr).transpose()?;
            let client = build_client(&cli.server)?;
            let request = CertRequest {
                csr,
                principal: Some(principal),
                profile_id,
                csr_profile_id,
                database,
                private_key,
                password_file,
                certificate_out,
                chain,
                add,
                ..Default::default()
            };
            let result = CertRequestWorkflow::new(&client, &LocalKeyMaterial)
                .execute(request)
                .await?;
            print!("{}", format_cert_result(&result));
        },
        Commands::CertShow {
            serial,
            certificate_out,
            out,
            chain,
        } => {
            let client = build_client(&cli.server)?;
            let result = CertRetrieval::new(&client, InvocationContext::Cli)
                .show(ShowRequest {
                    serial,
                    certificate_out,
                    out,
                    chain,
                    ..Default::default()
                })
                .await?;
            print!("{}", format_cert_result(&result));
        },
        Commands::CertFind {
            certificate,
            file,
            subject,
            sizelimit,
        } => {
            let client = build_client(&cli.server)?;
            let found = CertRetrieval::new(&client, InvocationContext::Cli)
                .find(FindRequest {
                    certificate,
                    file,
                    subject,
                    sizelimit,
                    ..Default::default()
                })
                .await?;
            print!("{}", format_find_result(&found));
        },
        Commands::Errors => print!("{}", error_listing()),
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("custos: ERROR: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => exit_status(&err),
    }
}

fn exit_status(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<PublicError>() {
        Some(public) => {
            tracing::debug!(code = public.code(), name = %public.name(), "command failed");
            eprintln!("custos: ERROR: {}", public.message());
            ExitCode::from(public.exit_class().code())
        },
        None => {
            eprintln!("custos: ERROR: {:#}", err);
            ExitCode::FAILURE
        },
    }
}
