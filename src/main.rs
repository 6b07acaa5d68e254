use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docsign::{
    normalize_text, KeyPair, KeyPairProvider, SignError, SignatureEngine, SigningConfig,
    SigningSession, VerifyOutcome,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "docsign", version, about = "Sign text documents and detect tampering")]
struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    json: bool,

    /// TOML file selecting digest, algorithm and DSA key size.
    #[arg(long, global = true, conflicts_with = "legacy")]
    config: Option<PathBuf>,

    /// Use SHA-1 digests and DSA-1024/160 keys.
    #[arg(long, global = true)]
    legacy: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a key pair.
    Keygen {
        /// Private key file to write.
        #[arg(long)]
        out: PathBuf,
        /// Also write the public key to this file.
        #[arg(long)]
        public: Option<PathBuf>,
    },

    /// Print the digest of a text file.
    Digest { input: PathBuf },

    /// Sign a text file.
    Sign {
        #[arg(long)]
        key: PathBuf,
        input: PathBuf,
        /// Write the hex signature to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check a candidate text file against a stored signature.
    Verify {
        #[arg(long)]
        key: PathBuf,
        /// The text that was originally signed.
        #[arg(long)]
        original: Option<PathBuf>,
        /// File holding the hex signature to check.
        #[arg(long)]
        signature: PathBuf,
        candidate: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct DigestOut {
    algorithm: String,
    digest_hex: String,
}

#[derive(Debug, Serialize)]
struct VerifyOut {
    outcome: VerifyOutcome,
    message: &'static str,
    candidate_digest_hex: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            // Ordering mistakes are user guidance rather than failures.
            if let Some(SignError::Precondition(msg)) = err.downcast_ref::<SignError>() {
                eprintln!("{msg}");
                return ExitCode::from(2);
            }
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    let engine = SignatureEngine::new(config);

    match cli.command {
        Command::Keygen { out, public } => {
            let keypair = KeyPairProvider::new(config).generate_key_pair()?;
            keypair
                .save_to_file(&out)
                .with_context(|| format!("writing {}", out.display()))?;
            if let Some(public) = public {
                keypair
                    .public_key()
                    .save_to_file(&public)
                    .with_context(|| format!("writing {}", public.display()))?;
            }
            tracing::info!(algorithm = %keypair.algorithm(), path = %out.display(), "key pair written");
        }

        Command::Digest { input } => {
            let text = read_text(&input)?;
            let digest = engine.compute_digest(normalize_text(&text));
            let out = DigestOut {
                algorithm: digest.algorithm().to_string(),
                digest_hex: digest.to_hex(),
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", out.digest_hex);
            }
        }

        Command::Sign { key, input, out } => {
            let mut session = SigningSession::new(load_key(&key)?, engine);
            let text = read_text(&input)?;
            let signed = session.sign(normalize_text(&text))?;

            if let Some(out) = out {
                fs::write(&out, &signed.signature_hex)
                    .with_context(|| format!("writing {}", out.display()))?;
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&signed)?);
            } else {
                println!("digest:    {}", signed.digest_hex);
                println!("signature: {}", signed.signature_hex);
            }
        }

        Command::Verify {
            key,
            original,
            signature,
            candidate,
        } => {
            let mut session = SigningSession::new(load_key(&key)?, engine);
            if let Some(original) = original {
                let text = read_text(&original)?;
                session.sign(normalize_text(&text))?;
            }

            let signature_text = read_text(&signature)?;
            let candidate_text = read_text(&candidate)?;
            let report = session.verify_report(normalize_text(&candidate_text), &signature_text)?;

            let out = VerifyOut {
                outcome: report.outcome,
                message: report.outcome.message(),
                candidate_digest_hex: report.candidate_digest_hex,
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("digest: {}", out.candidate_digest_hex);
                println!("{}", out.message);
            }
            if !report.outcome.is_valid() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config(cli: &Cli) -> Result<SigningConfig> {
    if cli.legacy {
        return Ok(SigningConfig::legacy());
    }
    match &cli.config {
        Some(path) => SigningConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(SigningConfig::default()),
    }
}

fn load_key(path: &Path) -> Result<KeyPair> {
    KeyPair::load_from_file(path).with_context(|| format!("loading key {}", path.display()))
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
