//! Print an Argon2 hash for seeding a user row by hand.
//!
//! Usage: `hash-password <PASSWORD>`, or pipe the password on stdin.

use std::io::BufRead;

use anyhow::Context;
use quill_core::ports::PasswordService;
use quill_infra::Argon2PasswordService;

fn main() -> anyhow::Result<()> {
    let password = match std::env::args().nth(1) {
        Some(password) => password,
        None => std::io::stdin()
            .lock()
            .lines()
            .next()
            .context("Usage: hash-password <PASSWORD>")?
            .context("failed to read password from stdin")?,
    };

    anyhow::ensure!(!password.is_empty(), "password must not be empty");

    let hash = Argon2PasswordService::new().hash(&password)?;

    println!("{}", hash);
    eprintln!("# Store this value in users.password_hash");
    Ok(())
}
