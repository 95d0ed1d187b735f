use anyhow::Result;
use studio_editor::session::server::serve;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    serve().await
}
