use anyhow::{Result, anyhow};
use keyring::{Entry, Error as KeyringError};
use log::{debug, warn};
use std::io::{BufRead, IsTerminal, Write};

const SERVICE: &str = "imap2abook";

/// Keyring account name for a mailbox login
pub fn account(user: &str, server: &str) -> String {
    format!("{user}@{server}")
}

/// Save an IMAP password into the OS keyring
pub fn save_password(account: &str, password: &str) -> Result<()> {
    Ok(Entry::new(SERVICE, account)?.set_password(password)?)
}

/// Load an IMAP password from the keyring, if one was stored
pub fn load_password(account: &str) -> Result<Option<String>> {
    match Entry::new(SERVICE, account)?.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(KeyringError::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Read one line from `input` after printing a prompt on `prompt_out`.
pub fn prompt_password<R: BufRead, W: Write>(
    prompt: &str,
    mut input: R,
    mut prompt_out: W,
) -> Result<String> {
    write!(prompt_out, "{prompt}")?;
    prompt_out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(anyhow!("no password given"));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// `--password`, then keyring, then a prompt. Input is hidden when stdin is
/// a terminal; piped input is read as one line.
pub fn resolve_password(explicit: Option<String>, account: &str) -> Result<String> {
    if let Some(p) = explicit {
        return Ok(p);
    }

    match load_password(account) {
        Ok(Some(p)) => {
            debug!("Using keyring password for {account}");
            return Ok(p);
        }
        Ok(None) => {}
        Err(e) => warn!("couldn't read keyring: {e}"),
    }

    let prompt = format!("Password for {account}: ");
    let stdin = std::io::stdin();
    read_password(
        &prompt,
        stdin.is_terminal(),
        |p| rpassword::prompt_password(p),
        stdin.lock(),
        std::io::stderr(),
    )
}

/// On a terminal, `hidden` reads without echo; otherwise one line is read
/// from `input`.
pub fn read_password<R, W, H>(
    prompt: &str,
    terminal: bool,
    hidden: H,
    input: R,
    prompt_out: W,
) -> Result<String>
where
    R: BufRead,
    W: Write,
    H: FnOnce(&str) -> std::io::Result<String>,
{
    if terminal {
        return Ok(hidden(prompt)?);
    }
    prompt_password(prompt, input, prompt_out)
}
