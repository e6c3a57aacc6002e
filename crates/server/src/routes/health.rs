/// Liveness check. Doesn't touch the store
pub async fn health() -> &'static str {
    "Server is running\n"
}
