//! Interactive password prompt.

use std::io::{self, BufRead, Write};

/// Returns `password`, asking for it on `prompt` when an account login
/// needs one and none was given.
///
/// Login is needed when `user_id` is set and no access token is.
pub fn password_if_missing(
    access_token: Option<&str>,
    user_id: Option<&str>,
    password: Option<String>,
    input: &mut dyn BufRead,
    prompt: &mut dyn Write,
) -> io::Result<Option<String>> {
    let given = |v: Option<&str>| v.is_some_and(|s| !s.trim().is_empty());
    if given(password.as_deref()) || given(access_token) || !given(user_id) {
        return Ok(password);
    }

    write!(prompt, "Password for {}: ", user_id.unwrap_or_default())?;
    prompt.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let line = line.trim_end_matches(['\r', '\n']);
    Ok((!line.is_empty()).then(|| line.to_string()))
}
