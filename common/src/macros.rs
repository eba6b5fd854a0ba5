/// Logs a completion line. Rendered with a distinct symbol by the CLI formatter.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "tagscan::success", $($arg)*)
    };
}
