#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match eduhub::run().await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("eduhub fatal: {e:#}");
            std::process::exit(1);
        }
    }
}
