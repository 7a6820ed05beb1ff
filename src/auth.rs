use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

pub const PASSWORD_ENV: &str = "SALTCRYPT_PASSWORD";

/// Reads the password from, in order:
/// the environment, one line of piped stdin, an interactive prompt.
///
/// `stdin_free` is false when stdin already carries the data to process.
pub fn read_password(stdin_free: bool) -> Result<Zeroizing<String>> {
    //  SALTCRYPT_PASSWORD="supersecret" saltcrypt encrypt "text"
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(Zeroizing::new(pw));
    }

    let stdin = io::stdin();

    //  echo "supersecret" | saltcrypt encrypt "text"
    if stdin_free && !stdin.is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        stdin.lock().read_line(&mut buf)?;
        trim_newline(&mut buf);
        return Ok(buf);
    }

    if stdin.is_terminal() {
        let pw = rpassword::prompt_password("Password: ")?;
        return Ok(Zeroizing::new(pw));
    }

    bail!("No password provided (set {PASSWORD_ENV} or use a terminal)")
}

pub fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
