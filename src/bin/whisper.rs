//! Whisper CLI binary.
//!
//! Symmetric encryption, identifier obfuscation and one-time passwords.
//!
//! # Commands
//!
//! - `keygen` - Generate a random key
//! - `encrypt` / `decrypt` - Run any cipher suite scheme over base64 data
//! - `obfuscate` / `restore` - Identifier codec with a key from the key file
//! - `otp` - HOTP/TOTP generation and validation
//! - `derive` - HMAC-SHA256 key derivation
//! - `shell` - Interactive command shell

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use whisper::{
    config::Config,
    crypto::{kdf, CipherSuite, KeyAlgorithm, KeyId, KeyMaterial, NonceLength, SchemeKind},
    encoding,
    obfuscate::{IdCodec, Obfuscator},
    shell::{KeyFile, ShellContext},
    VERSION,
};

#[derive(Parser)]
#[command(name = "whisper")]
#[command(version = VERSION)]
#[command(
    about = "Whisper - encryption, identifier obfuscation and one-time passwords",
    long_about = None
)]
struct Cli {
    /// Config file (default: <config dir>/whisper/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random key
    Keygen {
        /// Key family (aes, chacha20, hmac)
        #[arg(short, long, default_value = "aes")]
        algorithm: KeyAlgorithm,

        /// Key size in bits
        #[arg(short, long, default_value = "128")]
        bits: usize,

        /// Output encoding
        #[arg(short, long, value_enum, default_value = "base64")]
        format: KeyFormat,
    },

    /// Encrypt data; prints base64
    Encrypt {
        /// Plaintext (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Scheme (aes-gcm, aes-gcm-legacy, chacha20-poly1305, aes-ecb, aes-ecb-hmac)
        #[arg(short, long, default_value = "aes-gcm")]
        scheme: SchemeKind,

        /// Base64 key
        #[arg(short, long)]
        key: String,
    },

    /// Decrypt base64 data
    Decrypt {
        /// Base64 ciphertext (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Scheme used to encrypt
        #[arg(short, long, default_value = "aes-gcm")]
        scheme: SchemeKind,

        /// Base64 key
        #[arg(short, long)]
        key: String,
    },

    /// Obfuscate an integer id
    Obfuscate {
        /// Identifier
        #[arg(allow_hyphen_values = true)]
        id: i64,

        /// Key selection
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Restore an obfuscated id
    Restore {
        /// Obfuscated text
        text: String,

        /// Key selection
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Generate or validate one-time passwords
    Otp {
        /// Base64 shared secret
        #[arg(short, long)]
        key: String,

        /// Treat the key as literal UTF-8 text
        #[arg(long)]
        raw: bool,

        /// HOTP counter (TOTP when omitted)
        #[arg(long)]
        counter: Option<u64>,

        /// Validate this code instead of printing one (TOTP only)
        #[arg(long)]
        validate: Option<String>,

        /// Code length
        #[arg(short, long)]
        digits: Option<u32>,

        /// HMAC hash (sha1, sha256, sha512)
        #[arg(short, long)]
        algorithm: Option<String>,

        /// TOTP step in seconds
        #[arg(long)]
        step: Option<u64>,

        /// Also print previous and next codes
        #[arg(long)]
        window: bool,
    },

    /// Derive key bytes with HMAC-SHA256
    Derive {
        /// Base64 derivation key
        #[arg(short, long)]
        key: String,

        /// Derivation input (label)
        input: String,

        /// Output size in bits
        #[arg(short, long, default_value = "256")]
        bits: usize,

        /// Print base64 instead of hex
        #[arg(long)]
        base64: bool,
    },

    /// Start the interactive shell
    Shell {
        /// Key file to load at startup
        #[arg(short, long)]
        keys: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KeyFormat {
    Base64,
    Base62,
}

#[derive(clap::Args)]
struct KeyArgs {
    /// Base64 AES-128 key
    #[arg(short, long, conflicts_with = "key_name")]
    key: Option<String>,

    /// Key name in the key file (default: configured active key)
    #[arg(short = 'n', long)]
    key_name: Option<String>,

    /// Key file (default: configured key file)
    #[arg(long)]
    keys: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Keygen {
            algorithm,
            bits,
            format,
        } => cmd_keygen(algorithm, bits, format),

        Commands::Encrypt {
            input,
            file,
            scheme,
            key,
        } => cmd_encrypt(&config, input, file, scheme, &key),

        Commands::Decrypt {
            input,
            file,
            scheme,
            key,
        } => cmd_decrypt(&config, input, file, scheme, &key),

        Commands::Obfuscate { id, key } => cmd_obfuscate(&config, id, &key),

        Commands::Restore { text, key } => cmd_restore(&config, &text, &key),

        Commands::Otp {
            key,
            raw,
            counter,
            validate,
            digits,
            algorithm,
            step,
            window,
        } => cmd_otp(
            &config, &key, raw, counter, validate, digits, algorithm, step, window,
        ),

        Commands::Derive {
            key,
            input,
            bits,
            base64,
        } => cmd_derive(&key, &input, bits, base64),

        Commands::Shell { keys } => cmd_shell(&config, keys),
    }
}

fn cmd_keygen(algorithm: KeyAlgorithm, bits: usize, format: KeyFormat) -> anyhow::Result<()> {
    let key = KeyMaterial::generate(algorithm, bits)?;
    match format {
        KeyFormat::Base64 => println!("{}", key.to_base64()),
        KeyFormat::Base62 => println!("{}", key.to_base62()),
    }
    eprintln!("fingerprint: {}", key.fingerprint());
    Ok(())
}

fn build_suite(config: &Config, scheme: SchemeKind, key: &str) -> anyhow::Result<CipherSuite> {
    let scheme = match (scheme, config.cipher.nonce_length()) {
        (SchemeKind::Aes128Gcm, NonceLength::Legacy) => SchemeKind::Aes128GcmLegacy,
        (other, _) => other,
    };
    tracing::debug!(%scheme, "building cipher suite");
    Ok(CipherSuite::from_base64(scheme, key)?)
}

fn cmd_encrypt(
    config: &Config,
    input: Option<String>,
    file: Option<PathBuf>,
    scheme: SchemeKind,
    key: &str,
) -> anyhow::Result<()> {
    let plaintext = read_input(input, file)?;
    let suite = build_suite(config, scheme, key)?;
    let ciphertext = suite.encrypt(&plaintext)?;
    println!("{}", encoding::base64_encode(&ciphertext));
    Ok(())
}

fn cmd_decrypt(
    config: &Config,
    input: Option<String>,
    file: Option<PathBuf>,
    scheme: SchemeKind,
    key: &str,
) -> anyhow::Result<()> {
    let text = String::from_utf8(read_input(input, file)?).context("ciphertext is not text")?;
    let ciphertext = encoding::base64_decode(text.trim())?;
    let suite = build_suite(config, scheme, key)?;
    let plaintext = suite.decrypt(&ciphertext)?;
    match String::from_utf8(plaintext) {
        Ok(text) => println!("{text}"),
        Err(e) => println!("{}", encoding::base64_encode(e.as_bytes())),
    }
    Ok(())
}

fn resolve_key(config: &Config, args: &KeyArgs) -> anyhow::Result<KeyMaterial> {
    if let Some(text) = &args.key {
        return Ok(KeyMaterial::from_base64(KeyAlgorithm::Aes, text)?);
    }

    let path = args
        .keys
        .clone()
        .or_else(|| config.keys.file.clone())
        .ok_or_else(|| anyhow!("No key given: use --key, --keys or set keys.file"))?;
    let name = args
        .key_name
        .clone()
        .or_else(|| config.keys.active.clone())
        .ok_or_else(|| anyhow!("No active key, select key first"))?;

    let keys = KeyFile::from_path(&path)?.decode_keys()?;
    let id = KeyId::new(name);
    keys.into_iter()
        .find(|(key_id, _)| *key_id == id)
        .map(|(_, key)| key)
        .ok_or_else(|| anyhow!("Key <{id}> not exist"))
}

fn obfuscator(config: &Config, args: &KeyArgs) -> anyhow::Result<Obfuscator> {
    let key = resolve_key(config, args)?;
    Ok(Obfuscator::with_keying(key, config.cipher.mac_keying())?)
}

fn cmd_obfuscate(config: &Config, id: i64, args: &KeyArgs) -> anyhow::Result<()> {
    println!("{}", obfuscator(config, args)?.obfuscate(id)?);
    Ok(())
}

fn cmd_restore(config: &Config, text: &str, args: &KeyArgs) -> anyhow::Result<()> {
    println!("{}", obfuscator(config, args)?.restore(text)?);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_otp(
    config: &Config,
    key: &str,
    raw: bool,
    counter: Option<u64>,
    validate: Option<String>,
    digits: Option<u32>,
    algorithm: Option<String>,
    step: Option<u64>,
    window: bool,
) -> anyhow::Result<()> {
    let secret = if raw {
        key.as_bytes().to_vec()
    } else {
        encoding::base64_decode(key)?
    };

    let mut otp = config.otp.clone();
    if let Some(digits) = digits {
        otp.digits = digits;
    }
    if let Some(algorithm) = algorithm {
        otp.algorithm = algorithm.parse().map_err(|e: String| anyhow!(e))?;
    }
    if let Some(step) = step {
        otp.step_secs = step;
    }

    if let Some(counter) = counter {
        if validate.is_some() {
            bail!("--validate is only supported for TOTP");
        }
        println!("{}", otp.hotp(&secret)?.generate(counter));
        return Ok(());
    }

    let totp = otp.totp(&secret)?;
    if let Some(candidate) = validate {
        if totp.validate(&candidate) {
            println!("valid");
            return Ok(());
        }
        println!("invalid");
        std::process::exit(1);
    }

    if window {
        println!("prev: {}", totp.prev());
        println!("now:  {}", totp.now());
        println!("next: {}", totp.next());
    } else {
        println!("{}", totp.now());
    }
    Ok(())
}

fn cmd_derive(key: &str, input: &str, bits: usize, base64: bool) -> anyhow::Result<()> {
    let key = encoding::base64_decode(key)?;
    let okm = kdf::derive(&key, input.as_bytes(), bits)?;
    if base64 {
        println!("{}", encoding::base64_encode(&okm));
    } else {
        println!("{}", encoding::hex_encode(&okm));
    }
    Ok(())
}

fn cmd_shell(config: &Config, keys: Option<PathBuf>) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let mut shell = ShellContext::new(cwd).with_keying(config.cipher.mac_keying());

    if let Some(path) = keys.or_else(|| config.keys.file.clone()) {
        let count = shell.load_keys(&path)?;
        eprintln!("Load {count} keys from {}", path.display());
    }
    if let Some(name) = &config.keys.active {
        match shell.select_key(name) {
            Ok(()) => eprintln!("active key: {name}"),
            Err(e) => tracing::warn!("Configured key not selected: {e}"),
        }
    }

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let input = stdin.lock();
    shell.run(input, &mut io::stdout(), &mut io::stderr(), interactive)?;
    Ok(())
}

// Helper functions

fn read_input(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<Vec<u8>> {
    if let Some(path) = file {
        Ok(std::fs::read(path)?)
    } else if let Some(s) = input {
        if s == "-" {
            read_stdin()
        } else {
            Ok(s.into_bytes())
        }
    } else {
        read_stdin()
    }
}

fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    io::stdin().lock().read_to_end(&mut buffer)?;
    Ok(buffer)
}


#[cfg(test)]
mod tests {
    use super::*;

    const AES_KEY: &str = "AAECAwQFBgcICQoLDA0ODw==";

    #[test]
    fn test_build_suite_follows_nonce_length() {
        let mut config = Config::default();
        let suite = build_suite(&config, SchemeKind::Aes128Gcm, AES_KEY).unwrap();
        assert_eq!(suite.kind(), SchemeKind::Aes128Gcm);

        config.cipher.legacy_nonce = true;
        let suite = build_suite(&config, SchemeKind::Aes128Gcm, AES_KEY).unwrap();
        assert_eq!(suite.kind(), SchemeKind::Aes128GcmLegacy);

        let suite = build_suite(&config, SchemeKind::Aes128Ecb, AES_KEY).unwrap();
        assert_eq!(suite.kind(), SchemeKind::Aes128Ecb);
    }
}
