//! Project setup and lookup helpers.

use stubtree::base::FileId;
use stubtree::model::{FieldId, Project, ProjectConfig};

/// A project holding a single file `Test.java`.
pub fn project_with(source: &str) -> (Project, FileId) {
    project_with_config(source, ProjectConfig::default())
}

pub fn project_with_config(source: &str, config: ProjectConfig) -> (Project, FileId) {
    let project = Project::new(config);
    let file = project.write().add_file("Test.java", source);
    (project, file)
}

/// Id of the live field `name` in `file`. Panics if there is none.
pub fn field_id(project: &Project, file: FileId, name: &str) -> FieldId {
    let analysis = project.read();
    analysis
        .find_field(file, name)
        .unwrap_or_else(|| panic!("no field named `{name}`"))
        .id()
}

/// Current text of `file`, uncommitted edits included.
pub fn file_text(project: &Project, file: FileId) -> String {
    project.read().file(file).unwrap().text().to_string()
}
