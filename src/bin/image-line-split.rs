//! Image line split CLI tool
//!
//! Splits images into two transparent cutouts along a line given by two points.

#[cfg(feature = "cli")]
use image_line_split::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
