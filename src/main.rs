use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use saltcrypt::{CipherAlgorithm, Crypto, CryptoConfig, OutputFile, Prf, TextEncoding, legacy};
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;
mod auth;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Aes128,
    Aes192,
    Aes256,
    TripleDes,
}

impl From<AlgorithmArg> for CipherAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Aes128 => CipherAlgorithm::Aes128,
            AlgorithmArg::Aes192 => CipherAlgorithm::Aes192,
            AlgorithmArg::Aes256 => CipherAlgorithm::Aes256,
            AlgorithmArg::TripleDes => CipherAlgorithm::TripleDes,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PrfArg {
    Sha1,
    Sha256,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    Utf8,
    Utf16le,
}

#[derive(Debug, clap::Args)]
struct CryptoArgs {
    /// Block cipher (default: aes256)
    #[arg(long, global = true, value_enum, env = "SALTCRYPT_ALGORITHM")]
    algorithm: Option<AlgorithmArg>,

    /// PBKDF2 iterations (default: 1000)
    #[arg(long, global = true, env = "SALTCRYPT_ITERATIONS")]
    iterations: Option<u32>,

    /// Random salt length in bytes for self-salted envelopes (default: 8)
    #[arg(long, global = true, env = "SALTCRYPT_SALT_SIZE")]
    salt_size: Option<usize>,

    /// Random plaintext prefix length with --salt (default: 4)
    #[arg(long, global = true, env = "SALTCRYPT_MIX_SIZE")]
    mix_size: Option<usize>,

    /// PBKDF2 HMAC digest (default: sha1)
    #[arg(long, global = true, value_enum, env = "SALTCRYPT_PRF")]
    prf: Option<PrfArg>,

    /// Text encoding of passwords, salts and text input (default: utf8)
    #[arg(long, global = true, value_enum, env = "SALTCRYPT_ENCODING")]
    encoding: Option<EncodingArg>,
}

impl CryptoArgs {
    fn to_config(&self) -> Result<CryptoConfig> {
        let default = CryptoConfig::default();

        let config = CryptoConfig::new(
            self.algorithm.map(Into::into).unwrap_or(default.algorithm()),
            self.iterations.unwrap_or(default.iterations()),
            self.salt_size.unwrap_or(default.salt_size()),
            self.mix_size.unwrap_or(default.mix_size()),
            match self.prf {
                Some(PrfArg::Sha1) => Prf::HmacSha1,
                Some(PrfArg::Sha256) => Prf::HmacSha256,
                None => default.prf(),
            },
            match self.encoding {
                Some(EncodingArg::Utf8) => TextEncoding::Utf8,
                Some(EncodingArg::Utf16le) => TextEncoding::Utf16Le,
                None => default.encoding(),
            },
        )?;
        Ok(config)
    }
}

#[derive(Debug, clap::Args)]
struct IoArgs {
    /// Text to process; read from stdin when neither TEXT nor --in is given
    text: Option<String>,

    /// Salt shared out-of-band; switches to externally-salted mode
    #[arg(long)]
    salt: Option<String>,

    /// Process the raw bytes of this file instead of text
    #[arg(long = "in", value_name = "PATH", conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Write raw bytes to this file (atomic replace)
    #[arg(long = "out", value_name = "PATH", requires = "input")]
    output: Option<PathBuf>,
}

impl IoArgs {
    fn stdin_carries_input(&self) -> bool {
        self.text.is_none() && self.input.is_none()
    }

    fn read_text(&self) -> Result<Zeroizing<String>> {
        if let Some(text) = &self.text {
            return Ok(Zeroizing::new(text.clone()));
        }
        if io::stdin().is_terminal() {
            bail!("no input: pass TEXT, --in PATH or pipe text on stdin");
        }
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        auth::trim_newline(&mut buf);
        Ok(buf)
    }

    fn write_bytes(&self, data: &[u8]) -> Result<()> {
        match &self.output {
            Some(path) => OutputFile::new(path.clone())
                .write(data)
                .with_context(|| format!("failed to write {}", path.display())),
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(data)?;
                stdout.flush()?;
                Ok(())
            }
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "saltcrypt")]
#[command(
    version,
    about = "Password-based, salted symmetric encryption of text and files."
)]
struct Cli {
    #[command(flatten)]
    crypto: CryptoArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts text (Base64 output) or a file (raw envelope output)
    Encrypt {
        #[command(flatten)]
        io: IoArgs,
    },

    /// Decrypts Base64 text or a raw envelope file
    Decrypt {
        #[command(flatten)]
        io: IoArgs,
    },

    /// Encrypts with the legacy MD5-keyed 3DES-ECB scheme (insecure)
    #[command(arg_required_else_help = true)]
    LegacyEncrypt { text: String },

    /// Decrypts text from the legacy MD5-keyed 3DES-ECB scheme
    #[command(arg_required_else_help = true)]
    LegacyDecrypt { text: String },
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("SALTCRYPT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn encrypt(crypto: &Crypto, io_args: &IoArgs) -> Result<()> {
    let encoding = crypto.config().encoding();

    if let Some(path) = &io_args.input {
        let plaintext = Zeroizing::new(
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?,
        );
        let password = auth::read_password(true)?;
        let password = Zeroizing::new(encoding.encode(&password));

        let encrypted = match &io_args.salt {
            Some(salt) => {
                crypto.encrypt_bytes_with_salt(&plaintext, &password, &encoding.encode(salt))?
            }
            None => crypto.encrypt_bytes(&plaintext, &password)?,
        };
        return io_args.write_bytes(&encrypted);
    }

    let text = io_args.read_text()?;
    let password = auth::read_password(!io_args.stdin_carries_input())?;

    let encrypted = match &io_args.salt {
        Some(salt) => crypto.encrypt_string_with_salt(&text, &password, salt)?,
        None => crypto.encrypt_string(&text, &password)?,
    };
    println!("{encrypted}");
    Ok(())
}

fn decrypt(crypto: &Crypto, io_args: &IoArgs) -> Result<()> {
    let encoding = crypto.config().encoding();

    if let Some(path) = &io_args.input {
        let data =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let password = auth::read_password(true)?;
        let password = Zeroizing::new(encoding.encode(&password));

        let plaintext = match &io_args.salt {
            Some(salt) => crypto.decrypt_bytes_with_salt(&data, &password, &encoding.encode(salt)),
            None => crypto.decrypt_bytes(&data, &password),
        }
        .context("decryption failed")?;
        return io_args.write_bytes(&plaintext);
    }

    let text = io_args.read_text()?;
    let password = auth::read_password(!io_args.stdin_carries_input())?;

    let plaintext = match &io_args.salt {
        Some(salt) => crypto.decrypt_string_with_salt(text.trim(), &password, salt),
        None => crypto.decrypt_string(text.trim(), &password),
    }
    .context("decryption failed")?;
    println!("{}", *plaintext);
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let args = Cli::parse();

    match args.command {
        Commands::Encrypt { io: io_args } => {
            let crypto = Crypto::with_config(args.crypto.to_config()?)?;
            encrypt(&crypto, &io_args)?;
        }
        Commands::Decrypt { io: io_args } => {
            let crypto = Crypto::with_config(args.crypto.to_config()?)?;
            decrypt(&crypto, &io_args)?;
        }
        Commands::LegacyEncrypt { text } => {
            let key = auth::read_password(true)?;
            println!("{}", legacy::encrypt(&text, &key)?);
        }
        Commands::LegacyDecrypt { text } => {
            let key = auth::read_password(true)?;
            let plaintext = legacy::decrypt(text.trim(), &key).context("decryption failed")?;
            println!("{plaintext}");
        }
    }

    Ok(())
}
