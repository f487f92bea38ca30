//! rsa-block: block-wise RSA encryption of files or stdin.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rsa_block::util::{format_file_size, read_file, read_input, write_output};
use rsa_block::{Cipher, CipherMode, HashAlgorithm, Key, KeyFormat, Padding};

#[derive(Parser)]
#[command(name = "rsa-block")]
#[command(about = "Block-wise RSA encryption with PKCS#1 v1.5 or OAEP padding")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encrypt input with an RSA public key
    Encrypt {
        /// Public key PEM file
        #[arg(long)]
        key: String,

        /// Structure inside the PEM envelope
        #[arg(long, value_enum, default_value_t = FormatArg::Pkix)]
        format: FormatArg,

        #[command(flatten)]
        opts: PipelineArgs,
    },
    /// Decrypt input with an RSA private key (PKCS#8 or PKCS#1 PEM)
    Decrypt {
        /// Private key PEM file
        #[arg(long)]
        key: PathBuf,

        #[command(flatten)]
        opts: PipelineArgs,
    },
}

#[derive(Args)]
struct PipelineArgs {
    /// Padding mode
    #[arg(long, value_enum, default_value_t = ModeArg::Oaep)]
    mode: ModeArg,

    /// OAEP hash function
    #[arg(long, value_enum, default_value_t = HashArg::Sha1)]
    hash: HashArg,

    /// Plaintext bytes per block (defaults to the largest the key allows)
    #[arg(long)]
    chunk_size: Option<NonZeroUsize>,

    /// Input file (stdin when omitted)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Hex-encode ciphertext on output, hex-decode it on input
    #[arg(long)]
    hex: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Pkix,
    Pkcs1,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Pkcs1v15,
    Oaep,
}

#[derive(Clone, Copy, ValueEnum)]
enum HashArg {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl From<FormatArg> for KeyFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pkix => KeyFormat::Pkix,
            FormatArg::Pkcs1 => KeyFormat::Pkcs1,
        }
    }
}

impl From<HashArg> for HashAlgorithm {
    fn from(arg: HashArg) -> Self {
        match arg {
            HashArg::Sha1 => HashAlgorithm::Sha1,
            HashArg::Sha256 => HashAlgorithm::Sha256,
            HashArg::Sha384 => HashAlgorithm::Sha384,
            HashArg::Sha512 => HashAlgorithm::Sha512,
        }
    }
}

impl PipelineArgs {
    fn cipher(&self, key: Key) -> Cipher {
        let mode = match self.mode {
            ModeArg::Pkcs1v15 => CipherMode::pkcs1v15(),
            ModeArg::Oaep => CipherMode::oaep(self.hash.into()),
        };
        let mut padding = Padding::for_mode(&mode);
        if let Some(size) = self.chunk_size {
            padding = padding.with_chunk_size(size);
        }
        Cipher::new(key, padding, mode)
    }
}

fn main() {
    init_tracing();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_tracing() {
    // Logs go to stderr so stdout carries only pipeline output
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Encrypt { key, format, opts } => {
            let parser = KeyFormat::from(format).parser();
            let key = Key::load_from_file(&key, parser).context("failed to load public key")?;
            let cipher = opts.cipher(key);

            let plain_text = read_input(opts.input.as_deref()).context("failed to read input")?;
            info!(
                "Encrypting {} with a {}-bit key",
                format_file_size(plain_text.len() as u64),
                cipher.key().bit_len()
            );

            let cipher_text = cipher.encrypt(&plain_text).context("encryption failed")?;
            let output = if opts.hex {
                let mut encoded = hex::encode(&cipher_text).into_bytes();
                encoded.push(b'\n');
                encoded
            } else {
                cipher_text
            };
            write_output(opts.output.as_deref(), &output).context("failed to write output")?;
        }
        Command::Decrypt { key, opts } => {
            let private_key = load_private_key(&key)?;
            let cipher = opts.cipher(Key::new(private_key.to_public_key()));

            let input = read_input(opts.input.as_deref()).context("failed to read input")?;
            let cipher_text = if opts.hex {
                let text = String::from_utf8(input).context("hex input is not UTF-8")?;
                hex::decode(text.trim()).context("invalid hex input")?
            } else {
                input
            };
            info!(
                "Decrypting {} with a {}-bit key",
                format_file_size(cipher_text.len() as u64),
                cipher.key().bit_len()
            );

            let plain_text = cipher
                .decrypt(&cipher_text, &private_key)
                .context("decryption failed")?;
            write_output(opts.output.as_deref(), &plain_text).context("failed to write output")?;
        }
    }

    Ok(())
}

fn load_private_key(path: &Path) -> Result<RsaPrivateKey> {
    let pem = read_file(path).context("failed to read private key")?;
    let pem = String::from_utf8(pem).context("private key is not PEM text")?;

    RsaPrivateKey::from_pkcs8_pem(&pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(&pem))
        .map_err(|_| anyhow!("failed to parse private key"))
}
