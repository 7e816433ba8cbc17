//! `call-args` — encode contract method arguments from the command line.
//!
//! ## Usage
//!
//! ```bash
//! # plaintext arguments
//! call-args encode --field 42 --field hello
//!
//! # second field encrypted as euint8 under a dev network key
//! call-args encode --network-seed dev --field 42 --field 7:8
//!
//! # split a one-line argument string into fields
//! call-args split '42, "a,b", [1, 2]'
//!
//! # move a ciphertext to a token key, then read it back
//! call-args reencrypt --network-seed dev --to 0x<token pk> --width 8 0x<ct>
//! call-args decrypt --network-seed dev --width 8 0x<ct>
//! ```
//!
//! A field is `VALUE[:WIDTH]`; the suffix after the last `:` is taken as a
//! width only when it is a known tag (`none`, `bool`, `1`, `8`, `16`, `32`).

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use confidential_call_args::{
    ArgumentEncoder, EncoderConfig, EncryptionFailurePolicy, EncryptionProvider, EncryptionWidth,
    FieldInput, parse_argument_list, split_basic_input,
};
use confidential_call_primitives::{PublicKeyBytes, from_hex_string, to_hex_string};
use tracing::info;
use tracing_subscriber::EnvFilter;
use zkhe_session::{Keypair, LocalNetworkKey, Session};


#[derive(Parser)]
#[command(author, version, about = "Confidential contract-call argument encoder")]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble form fields into a JSON argument list
    Encode(EncodeOpts),
    /// Split a single-line argument string into field values
    Split {
        input: String,
    },
    /// Derive a dev network keypair from a seed
    Keygen {
        #[arg(long)]
        seed: String,
    },
    /// Decrypt a ciphertext with the network secret key
    Decrypt {
        #[command(flatten)]
        key: NetworkSecret,
        /// Width the value was encrypted at
        #[arg(long, value_parser = parse_width)]
        width: EncryptionWidth,
        ciphertext: String,
    },
    /// Re-encrypt a network ciphertext to a token public key
    Reencrypt {
        #[command(flatten)]
        key: NetworkSecret,
        /// Token public key (32 bytes hex)
        #[arg(long)]
        to: String,
        #[arg(long, value_parser = parse_width)]
        width: EncryptionWidth,
        ciphertext: String,
    },
}

#[derive(Args)]
struct EncodeOpts {
    /// Field value in declaration order, optionally suffixed with its width
    #[arg(
        long = "field",
        value_name = "VALUE[:WIDTH]",
        allow_hyphen_values = true,
        value_parser = parse_field
    )]
    fields: Vec<FieldInput>,

    /// Network public key (32 bytes hex)
    #[arg(long, conflicts_with = "network_seed")]
    network_key: Option<String>,

    /// Derive the network key from a dev seed
    #[arg(long)]
    network_seed: Option<String>,

    #[arg(long, default_value_t = 0)]
    chain_id: u64,

    /// JSON encoder config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Fail instead of sending plaintext when a field cannot be encrypted
    #[arg(long)]
    reject_on_encrypt_failure: bool,
}

#[derive(Args)]
struct NetworkSecret {
    /// Network secret key (32 bytes hex)
    #[arg(long, conflicts_with = "network_seed", required_unless_present = "network_seed")]
    network_secret: Option<String>,

    #[arg(long)]
    network_seed: Option<String>,
}

fn parse_width(tag: &str) -> Result<EncryptionWidth, String> {
    tag.parse().map_err(|e| format!("{e}"))
}

fn parse_field(arg: &str) -> Result<FieldInput, String> {
    if let Some((value, tag)) = arg.rsplit_once(':') {
        if !tag.is_empty() {
            if let Ok(width) = tag.parse::<EncryptionWidth>() {
                return Ok(FieldInput::encrypted(value, width));
            }
        }
    }
    Ok(FieldInput::plain(arg))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode(opts) => encode(opts)?,
        Commands::Split { input } => split(&input)?,
        Commands::Keygen { seed } => keygen(&seed),
        Commands::Decrypt {
            key,
            width,
            ciphertext,
        } => decrypt(key, width, &ciphertext)?,
        Commands::Reencrypt {
            key,
            to,
            width,
            ciphertext,
        } => reencrypt(key, &to, width, &ciphertext)?,
    }

    Ok(())
}

fn open_session(opts: &EncodeOpts) -> Result<Option<Session>> {
    let key = match (&opts.network_key, &opts.network_seed) {
        (Some(hex), _) => from_hex_string(hex).context("network key is not hex")?,
        (None, Some(seed)) => Keypair::from_seed(seed.as_bytes()).public_bytes().to_vec(),
        (None, None) => return Ok(None),
    };
    let session = Session::new(opts.chain_id, &key)?;
    info!(chain_id = opts.chain_id, "opened local confidential session");
    Ok(Some(session))
}

fn encode(opts: EncodeOpts) -> Result<()> {
    let mut config = match &opts.config {
        Some(path) => EncoderConfig::from_json_file(path)?,
        None => EncoderConfig::default(),
    };
    if opts.reject_on_encrypt_failure {
        config.failure_policy = EncryptionFailurePolicy::Reject;
    }

    let session = open_session(&opts)?;
    let encoder = ArgumentEncoder::with_config(
        session.as_ref().map(|s| s as &dyn EncryptionProvider),
        &config,
    );

    let body = encoder.assemble(&opts.fields)?;
    if body.is_empty() {
        bail!("cannot encode empty arguments");
    }
    let args = parse_argument_list(&body)?;
    println!("{}", serde_json::Value::Array(args));
    Ok(())
}

fn split(input: &str) -> Result<()> {
    let parts = split_basic_input(input)?;
    println!("{}", serde_json::to_string_pretty(&parts)?);
    Ok(())
}

fn keygen(seed: &str) {
    let network = LocalNetworkKey::from_seed(seed.as_bytes());
    println!("public: {}", to_hex_string(&network.public_bytes()));
    println!("secret: {}", to_hex_string(&network.keypair().secret_bytes()));
}

fn network_key(key: NetworkSecret) -> Result<LocalNetworkKey> {
    match (key.network_secret, key.network_seed) {
        (Some(hex), _) => {
            let bytes: [u8; 32] = from_hex_string(&hex)
                .context("network secret is not hex")?
                .try_into()
                .map_err(|_| anyhow!("network secret must be 32 bytes"))?;
            Ok(LocalNetworkKey::from_secret_bytes(bytes)?)
        }
        (None, Some(seed)) => Ok(LocalNetworkKey::from_seed(seed.as_bytes())),
        (None, None) => bail!("either --network-secret or --network-seed is required"),
    }
}

fn decrypt(key: NetworkSecret, width: EncryptionWidth, ciphertext: &str) -> Result<()> {
    let network = network_key(key)?;
    let ct = from_hex_string(ciphertext).context("ciphertext is not hex")?;
    println!("{}", network.decrypt(width, &ct)?);
    Ok(())
}

fn reencrypt(key: NetworkSecret, to: &str, width: EncryptionWidth, ciphertext: &str) -> Result<()> {
    let network = network_key(key)?;
    let target: PublicKeyBytes = from_hex_string(to)
        .context("token public key is not hex")?
        .try_into()
        .map_err(|_| anyhow!("token public key must be 32 bytes"))?;
    let ct = from_hex_string(ciphertext).context("ciphertext is not hex")?;
    println!("{}", to_hex_string(&network.reencrypt_to(&target, width, &ct)?));
    Ok(())
}
