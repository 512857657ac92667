// Copyright 2024-2026 llama-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI module for llama-bridge commands.
//!
//! ## Usage
//!
//! ```bash
//! llama-bridge infer <model> <prompt> [max_tokens]
//! llama-bridge preflight <model>
//! llama-bridge checksum <model> [expected_sha256]
//! llama-bridge config show [--json] | defaults | validate
//! ```

pub mod config_cmd;
pub mod model_cmd;

/// Exit code for malformed command lines.
pub const EXIT_USAGE: i32 = 2;

/// Parse an optional integer argument, e.g. `max_tokens`.
pub fn parse_int_arg(arg: Option<&String>, default: i32) -> Result<i32, String> {
    match arg {
        None => Ok(default),
        Some(s) => s
            .parse::<i32>()
            .map_err(|_| format!("expected an integer, got '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_arg_default() {
        assert_eq!(parse_int_arg(None, 0), Ok(0));
    }

    #[test]
    fn test_parse_int_arg_value() {
        let arg = "64".to_string();
        assert_eq!(parse_int_arg(Some(&arg), 0), Ok(64));
    }

    #[test]
    fn test_parse_int_arg_rejects_text() {
        let arg = "many".to_string();
        assert!(parse_int_arg(Some(&arg), 0).is_err());
    }
}
