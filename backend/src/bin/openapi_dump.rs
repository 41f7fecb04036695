//! Print the workshop OpenAPI document as JSON.

use color_eyre::eyre::Result;
use utoipa::OpenApi;
use workshop::ApiDoc;

#[expect(clippy::print_stdout, reason = "the document is the program's output")]
fn main() -> Result<()> {
    color_eyre::install()?;
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}
