/// Initializes the tracing subscriber for the binary.
///
/// Verbosity comes from `RUST_LOG`:
/// - `RUST_LOG=info` - state transitions, orders, payments
/// - `RUST_LOG=debug` - request payloads and board polls
/// - `RUST_LOG=order_desk=debug,reqwest=info` - per-crate levels
///
/// Output is compact, with spans inline (e.g. `payment:confirm_payment`).
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
