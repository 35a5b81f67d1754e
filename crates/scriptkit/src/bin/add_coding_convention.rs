//! Registers the shared coding-convention repository as a submodule of the current project.

use scriptkit::app::submodule::{SubmoduleOutcome, SubmoduleRegistrar};
use scriptkit::domain::model::SubmoduleRequest;

const URL: &str = "https://github.com/cholushkin/coding-convention.git";
const PATH: &str = "CodingConvention";

fn main() -> anyhow::Result<()> {
    scriptkit::init(1);

    let root = scriptkit::project_root(None)?;
    let registrar = SubmoduleRegistrar::discover(&root)?;
    match registrar.add(&SubmoduleRequest::new(URL, PATH))? {
        SubmoduleOutcome::Added => println!("added {URL} at {PATH}"),
        SubmoduleOutcome::AlreadyRegistered => println!("{PATH} already tracks {URL}"),
    }
    Ok(())
}
