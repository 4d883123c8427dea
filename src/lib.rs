// Library interface for pipe-autocomplete
// Generates `.phpstorm.autocomplete.php`: an IDE hint file declaring every
// global PHP function as a method (and, for low arity, a readable property)
// of `Serafim\Pipe\Pipe`.

pub mod builder;
pub mod catalog;
pub mod cli;
pub mod emitter;
pub mod error;
pub mod resolver;
pub mod sink;
pub mod trace;
pub mod variants;

pub use builder::{DeclarationBuilder, DeclarationTag, TagKind};
pub use catalog::{CallableDescriptor, CatalogSource, ParameterDescriptor, StaticCatalog};
pub use error::{GenerateError, Result};
pub use resolver::{AsIs, Resolver};
pub use sink::{FileSink, Sink};

use std::path::{Path, PathBuf};
use trace::trace;

/// File name of the generated stub inside the output directory.
pub const AUTOCOMPLETE_FILE: &str = ".phpstorm.autocomplete.php";

/// Default output directory when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "resources";

pub fn autocomplete_path(output_dir: &Path) -> PathBuf {
    output_dir.join(AUTOCOMPLETE_FILE)
}

/// Build the declaration list and render it, without writing anything.
pub fn render(catalog: &dyn CatalogSource, resolver: &dyn Resolver) -> Result<String> {
    trace("autocomplete: building declarations");
    let tags = DeclarationBuilder::new(catalog, resolver).build()?;
    trace(&format!("autocomplete: emitting {} tags", tags.len()));
    Ok(emitter::emit(&tags))
}

/// Full pipeline: enumerate, build, emit, then hand the text to `sink` in a
/// single write. Returns the path written.
pub fn generate(
    output_dir: &Path,
    catalog: &dyn CatalogSource,
    resolver: &dyn Resolver,
    sink: &mut dyn Sink,
) -> Result<PathBuf> {
    let content = render(catalog, resolver)?;
    let path = autocomplete_path(output_dir);
    trace(&format!("autocomplete: writing {} bytes to {}", content.len(), path.display()));
    sink.write(&path, &content)?;
    Ok(path)
}
