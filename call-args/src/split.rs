//! Basic input splitter: single-line argument string -> per-field values.

use crate::ArgsError;

/// Split `input` on top-level commas.
///
/// Commas inside double-quoted strings or `[...]`/`{...}` are kept. Quoted
/// tokens keep their JSON string form (quotes and escapes) so they stay
/// strings once assembled; bracketed tokens come back verbatim, bare tokens
/// trimmed.
pub fn split_basic_input(input: &str) -> Result<Vec<String>, ArgsError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut tokens = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in input.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ArgsError::Malformed(format!("unexpected `{ch}` at {i}")))?;
            }
            ',' if depth == 0 => {
                tokens.push(take_token(&input[start..i])?);
                start = i + 1;
            }
            _ => {}
        }
    }

    if in_string {
        return Err(ArgsError::Malformed("unterminated string".into()));
    }
    if depth != 0 {
        return Err(ArgsError::Malformed("unbalanced brackets".into()));
    }
    tokens.push(take_token(&input[start..])?);
    Ok(tokens)
}

fn take_token(token: &str) -> Result<String, ArgsError> {
    let token = token.trim();
    if token.starts_with('"') {
        serde_json::from_str::<String>(token)
            .map_err(|e| ArgsError::Malformed(format!("bad string {token}: {e}")))?;
    }
    Ok(token.to_owned())
}
