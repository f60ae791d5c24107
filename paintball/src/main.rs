fn main() -> std::io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(paintball::run_with_config());
    // The stdin reader may still be parked on a blocking read.
    runtime.shutdown_background();
    result
}
