use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    rag_cli::main_entry().await
}
