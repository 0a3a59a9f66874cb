use albumload_runtime::{init_tracing, AlbumLoadRuntime};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    AlbumLoadRuntime::with_args(std::env::args())?.run().await?;
    Ok(())
}
