//! Command-line interface.
//!
//! Commands:
//! - sealctl seal [TEXT]
//! - sealctl open [CIPHERTEXT]
//!
//! Both read stdin when the argument is omitted.

use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codec::{crypto, FieldKey};
use tracing::info;

/// Seal and open individual field values with a caller-supplied key.
#[derive(Parser, Debug)]
#[command(name = "sealctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encrypt a value into storage ciphertext
    Seal {
        /// Plaintext to seal; read verbatim from stdin when omitted
        text: Option<String>,
    },

    /// Decrypt storage ciphertext back into the original bytes
    Open {
        /// Ciphertext to open; read from stdin when omitted
        ciphertext: Option<String>,
    },
}

/// Run `command`, writing its result to `out`.
pub fn run(command: Command, key: &FieldKey, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Seal { text } => {
            let plaintext = match text {
                Some(t) => t.into_bytes(),
                None => read_stdin()?,
            };
            let sealed = crypto::seal(key.as_bytes(), &plaintext).context("seal failed")?;
            info!(bytes = plaintext.len(), "sealed value");
            writeln!(out, "{sealed}")?;
        }
        Command::Open { ciphertext } => {
            let text = match ciphertext {
                Some(t) => t,
                None => String::from_utf8(read_stdin()?).context("ciphertext is not UTF-8")?,
            };
            let plaintext = crypto::open(key.as_bytes(), text.trim()).context("open failed")?;
            info!(bytes = plaintext.len(), "opened value");
            out.write_all(&plaintext)?;
        }
    }
    Ok(())
}

fn read_stdin() -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    io::stdin().read_to_end(&mut buf).context("failed to read stdin")?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> FieldKey {
        FieldKey::from_bytes(vec![9u8; 24]).unwrap()
    }

    #[test]
    fn parses_seal_with_argument() {
        let cli = Cli::try_parse_from(["sealctl", "seal", "hello"]).unwrap();
        assert!(matches!(cli.command, Command::Seal { text: Some(ref t) } if t == "hello"));
    }

    #[test]
    fn parses_open_without_argument() {
        let cli = Cli::try_parse_from(["sealctl", "open"]).unwrap();
        assert!(matches!(cli.command, Command::Open { ciphertext: None }));
    }

    #[test]
    fn seal_then_open() {
        let key = key();
        let mut sealed: Vec<u8> = Vec::new();
        run(Command::Seal { text: Some("123-45-6789".into()) }, &key, &mut sealed).unwrap();
        let sealed = String::from_utf8(sealed).unwrap();
        assert!(sealed.ends_with('\n'));

        let mut opened: Vec<u8> = Vec::new();
        run(Command::Open { ciphertext: Some(sealed) }, &key, &mut opened).unwrap();
        assert_eq!(opened, b"123-45-6789");
    }

    #[test]
    fn open_with_other_key_fails() {
        let mut sealed: Vec<u8> = Vec::new();
        run(
            Command::Seal { text: Some("a secret long enough to matter".into()) },
            &key(),
            &mut sealed,
        )
        .unwrap();
        let other = FieldKey::from_bytes(vec![1u8; 24]).unwrap();
        let result = run(
            Command::Open { ciphertext: Some(String::from_utf8(sealed).unwrap()) },
            &other,
            &mut Vec::<u8>::new(),
        );
        assert!(result.is_err());
    }
}
