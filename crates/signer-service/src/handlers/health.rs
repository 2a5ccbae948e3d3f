/// Liveness probe.
///
/// GET /health
///
/// Does not check storage or key state.
pub async fn health_check() -> &'static str {
    "OK"
}
