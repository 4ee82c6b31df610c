//! Logging setup for the Goishi binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive for the given targets.
///
/// Every target gets `default_log_level`; `tower_http` is included so that
/// HTTP request traces follow the same level.
pub fn default_directive(targets: &[&str], default_log_level: &str) -> String {
    targets
        .iter()
        .map(|target| target.replace('-', "_"))
        .chain(std::iter::once("tower_http".to_string()))
        .map(|target| format!("{}={}", target, default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The level applies to each of `targets` (crate or binary names; dashes are
/// converted to underscores). It can be overridden with `RUST_LOG`.
///
/// # Examples
///
/// ```no_run
/// use goishi_shared::logger::setup_logger;
///
/// setup_logger(&["goishi-server", "server"], "debug");
/// ```
pub fn setup_logger(targets: &[&str], default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(targets, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_normalizes_target_names() {
        // テスト項目: ターゲット名のハイフンがアンダースコアに変換される
        // given (前提条件):
        let targets = ["goishi-server", "server"];

        // when (操作):
        let directive = default_directive(&targets, "debug");

        // then (期待する結果):
        assert_eq!(
            directive,
            "goishi_server=debug,server=debug,tower_http=debug"
        );
    }
}
