use vergen_gitcl::{Emitter, Gitcl};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Branch, SHA and dirty flag feed `version::version_string`.
    let git = Gitcl::builder().branch(true).sha(true).dirty(true).build();
    Emitter::default().add_instructions(&git)?.emit()?;
    Ok(())
}
