use miette::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let summary = cvat_backup::cli::run().await?;
    println!("{}", summary.archive.display());
    Ok(())
}
