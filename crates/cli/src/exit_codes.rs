//! CLI Exit Code Registry
//!
//! Single source of truth for `wildlens` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain     | Description                              |
//! |---------|------------|------------------------------------------|
//! | 0       | Universal  | Success                                  |
//! | 1       | Universal  | General error (file I/O, unspecified)    |
//! | 2       | Universal  | Usage error (bad args, empty input)      |
//! | 10-19   | model      | Credentials and model service outcomes   |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Map it in `CliError`

use wildlens_genai::GenAiError;
use wildlens_normalizer::NormalizeError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - file I/O or anything without a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, empty name/prompt, undecodable image.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Model (10-19)
// =============================================================================

/// No API key in the keychain or environment.
pub const EXIT_MISSING_KEY: u8 = 10;

/// Model service unreachable, returned non-2xx, or blocked the prompt.
pub const EXIT_TRANSPORT: u8 = 11;

/// Model answered, but not in the requested JSON shape.
pub const EXIT_UPSTREAM_FORMAT: u8 = 12;

/// Image model answered without an image.
pub const EXIT_NO_IMAGE: u8 = 13;

/// Quiz came back empty ("could not load").
pub const EXIT_EMPTY_QUIZ: u8 = 14;

/// Keychain read/write failed.
pub const EXIT_KEYCHAIN: u8 = 15;

/// Exit code for a transport-level model error.
pub fn genai_exit_code(err: &GenAiError) -> u8 {
    match err {
        GenAiError::MissingKey => EXIT_MISSING_KEY,
        _ => EXIT_TRANSPORT,
    }
}

/// Exit code for a normalizer error.
pub fn normalize_exit_code(err: &NormalizeError) -> u8 {
    match err {
        NormalizeError::InvalidArgument(_) => EXIT_USAGE,
        NormalizeError::UpstreamFormat { .. } => EXIT_UPSTREAM_FORMAT,
        NormalizeError::NoImageProduced => EXIT_NO_IMAGE,
        NormalizeError::Transport(e) => genai_exit_code(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_MISSING_KEY,
            EXIT_TRANSPORT,
            EXIT_UPSTREAM_FORMAT,
            EXIT_NO_IMAGE,
            EXIT_EMPTY_QUIZ,
            EXIT_KEYCHAIN,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn test_normalize_mapping() {
        assert_eq!(normalize_exit_code(&NormalizeError::InvalidArgument("x".into())), EXIT_USAGE);
        assert_eq!(
            normalize_exit_code(&NormalizeError::UpstreamFormat { message: "m".into(), raw: "r".into() }),
            EXIT_UPSTREAM_FORMAT
        );
        assert_eq!(normalize_exit_code(&NormalizeError::NoImageProduced), EXIT_NO_IMAGE);
        assert_eq!(
            normalize_exit_code(&NormalizeError::Transport(GenAiError::Http { status: 500, message: "x".into() })),
            EXIT_TRANSPORT
        );
        assert_eq!(normalize_exit_code(&NormalizeError::Transport(GenAiError::MissingKey)), EXIT_MISSING_KEY);
    }
}
