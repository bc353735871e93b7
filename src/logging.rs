//! Logging setup for the `spanner_gen` binary.
//!
//! Events go to stderr through a `tracing-subscriber` fmt layer so stdout only
//! carries command output.

use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "warn";
const VERBOSE_DIRECTIVE: &str = "spanner_gen=debug";

/// Filter directive for the given flags; `--verbose` wins over `RUST_LOG`.
fn filter_directive(verbose: bool, env: Option<&str>) -> String {
    if verbose {
        return VERBOSE_DIRECTIVE.to_string();
    }
    match env {
        Some(directive) if !directive.trim().is_empty() => directive.to_string(),
        _ => DEFAULT_LEVEL.to_string(),
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbose: bool) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(verbose, env.as_deref());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(false, None, "warn")]
    #[case(false, Some(""), "warn")]
    #[case(false, Some("spanner_gen=trace"), "spanner_gen=trace")]
    #[case(true, Some("error"), "spanner_gen=debug")]
    #[case(true, None, "spanner_gen=debug")]
    fn test_filter_directive(#[case] verbose: bool, #[case] env: Option<&str>, #[case] expected: &str) {
        assert_eq!(filter_directive(verbose, env), expected);
    }

    #[rstest]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
