#[tokio::main]
async fn main() -> anyhow::Result<()> {
    studydeck_backend::run().await
}
