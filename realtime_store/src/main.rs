#[tokio::main]
async fn main() -> std::io::Result<()> {
    realtime_store::run_with_config().await
}
