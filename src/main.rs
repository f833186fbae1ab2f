#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = ol3_viewer::run().await {
        eprintln!("ol3-viewer fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
