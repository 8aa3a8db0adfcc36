//! CLI Hash Password Command

use std::io::BufRead;

use anyhow::{bail, Context, Result};
use statusgate_gateway::hash_password;

/// Prints an Argon2id PHC string suitable for `ADMIN_PASSWORD_HASH`.
pub fn run(password: Option<&str>) -> Result<()> {
    let password = match password {
        Some(p) => p.to_string(),
        None => {
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("Failed to read password from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if password.is_empty() {
        bail!("Password must not be empty");
    }

    println!("{}", hash_password(&password)?);
    Ok(())
}
