/// Intercept messages using the `log` crate and print them to STDERR. Defaults to the `info`
/// level; override with `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn setup() {
    use env_logger::{Builder, Env};
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init();
}
