//! Project host: owns every file and hands out read and write guards.
//!
//! ```ignore
//! let project = Project::new(ProjectConfig::default());
//! let file = project.write().add_file("A.java", "class A { static final int X = 2 + 3; }");
//!
//! let analysis = project.read();
//! let x = analysis.find_field(file, "X").unwrap();
//! assert_eq!(x.compute_constant_value(), Some(ConstValue::Int(5)));
//! ```
//!
//! Any number of [`Analysis`] guards may be alive at once; a [`WriteAccess`]
//! is exclusive. All mutation (text changes, tree edits, stub commits, cache
//! reclamation) is only reachable through `WriteAccess`, so readers never
//! observe a half-applied edit.

use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::base::{FileId, Name};
use crate::hir::ConstantCache;
use crate::stubs::{CodecError, StubExternalizer, StubTree, StubTreeExternalizer};

use super::EditError;
use super::config::ProjectConfig;
use super::editor::FileEditor;
use super::field::Field;
use super::file::{FieldId, SourceFile, index_text};

/// Where the stubs of a freshly loaded file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubOrigin {
    Persisted,
    Rebuilt,
}

/// All project state.
#[derive(Debug)]
pub struct ProjectData {
    config: ProjectConfig,
    pub(crate) files: Vec<SourceFile>,
    paths: IndexMap<String, FileId>,
    pub(crate) constants: ConstantCache<FieldId>,
    pub(crate) modification_count: u64,
}

impl ProjectData {
    fn new(config: ProjectConfig) -> Self {
        Self {
            config,
            files: Vec::new(),
            paths: IndexMap::new(),
            constants: ConstantCache::new(),
            modification_count: 0,
        }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Number of structural edits and text changes applied so far.
    pub fn modification_count(&self) -> u64 {
        self.modification_count
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    fn file_mut(&mut self, id: FileId) -> Result<&mut SourceFile, EditError> {
        self.files.get_mut(id.index()).ok_or(EditError::UnknownFile(id))
    }

    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.paths.get(path).copied()
    }

    /// Files in load order.
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> + '_ {
        self.files.iter()
    }

    /// The live field `id`, if any.
    pub fn field(&self, id: FieldId) -> Option<Field<'_>> {
        Field::new(self, self.file(id.file)?, id)
    }

    /// Live fields of `file` in declaration order of their slots.
    pub fn fields(&self, file: FileId) -> impl Iterator<Item = Field<'_>> + '_ {
        self.file(file).into_iter().flat_map(move |source| {
            source
                .live_field_ids()
                .filter_map(move |id| Field::new(self, source, id))
        })
    }

    /// First live field of `file` named `name`.
    pub fn find_field(&self, file: FileId, name: &str) -> Option<Field<'_>> {
        self.fields(file).find(|field| field.name() == name)
    }

    /// Field `name` directly inside `class` (or at file level when `class`
    /// is `None`) of `file`.
    pub fn find_field_in_class(
        &self,
        file: FileId,
        class: Option<&Name>,
        name: &str,
    ) -> Option<Field<'_>> {
        self.fields(file)
            .find(|field| field.name() == name && field.containing_class().as_ref() == class)
    }

    /// Field `name` declared directly in the class nested as `scope`
    /// (innermost class first; empty for top-level fields).
    pub fn find_field_in_scope(
        &self,
        file: FileId,
        scope: &[Name],
        name: &str,
    ) -> Option<Field<'_>> {
        self.fields(file)
            .find(|field| field.name() == name && field.enclosing_classes() == scope)
    }

    /// Field `name` of a class named `class` anywhere in the project.
    pub fn find_class_field(&self, class: &str, name: &str) -> Option<Field<'_>> {
        self.files.iter().find_map(|source| {
            self.fields(source.id()).find(|field| {
                field.name() == name && field.containing_class().is_some_and(|c| c == class)
            })
        })
    }

    /// Encode the file's current stub tree. `None` for an unknown file or a
    /// file with uncommitted edits.
    pub fn persist_stubs(&self, file: FileId) -> Result<Option<Vec<u8>>, CodecError> {
        let Some(stubs) = self.file(file).and_then(|f| f.stubs()) else {
            return Ok(None);
        };
        StubTreeExternalizer.encode(stubs).map(Some)
    }

    fn insert_file(&mut self, path: String, text: Arc<str>, stubs: StubTree) -> FileId {
        let id = FileId::new(self.files.len() as u32);
        self.paths.insert(path.clone(), id);
        self.files.push(SourceFile::new(id, path, text, stubs));
        id
    }

    fn invalidate(&mut self) {
        self.constants.clear();
        self.modification_count += 1;
    }
}

/// A project: files, their stubs and trees, and the derived-value caches.
#[derive(Debug)]
pub struct Project {
    data: RwLock<ProjectData>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new(ProjectConfig::default())
    }
}

impl Project {
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            data: RwLock::new(ProjectData::new(config)),
        }
    }

    /// Shared read access. Queries may still build trees and fill caches;
    /// those are internally synchronized.
    pub fn read(&self) -> Analysis<'_> {
        Analysis {
            data: self.data.read(),
        }
    }

    /// Exclusive write access, released on drop.
    pub fn write(&self) -> WriteAccess<'_> {
        WriteAccess {
            data: self.data.write(),
        }
    }
}

/// Read guard over the project.
pub struct Analysis<'a> {
    data: RwLockReadGuard<'a, ProjectData>,
}

impl Deref for Analysis<'_> {
    type Target = ProjectData;

    fn deref(&self) -> &ProjectData {
        &self.data
    }
}

/// Exclusive write guard over the project.
pub struct WriteAccess<'a> {
    data: RwLockWriteGuard<'a, ProjectData>,
}

impl Deref for WriteAccess<'_> {
    type Target = ProjectData;

    fn deref(&self) -> &ProjectData {
        &self.data
    }
}

impl WriteAccess<'_> {
    /// Add a file, or replace the text of the file already at `path`.
    pub fn add_file(&mut self, path: &str, text: &str) -> FileId {
        if let Some(id) = self.data.file_id(path) {
            let max = self.data.config.max_initializer_len;
            if let Ok(file) = self.data.file_mut(id) {
                file.replace_text(Arc::from(text), max);
            }
            self.data.invalidate();
            return id;
        }
        let stubs = index_text(text, 0, self.data.config.max_initializer_len);
        self.data.insert_file(path.to_string(), Arc::from(text), stubs)
    }

    /// Add many files at once, indexing them on the rayon pool when the
    /// configuration allows it.
    pub fn add_files<I>(&mut self, files: I) -> Vec<FileId>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let (fresh, existing): (Vec<_>, Vec<_>) = files
            .into_iter()
            .partition(|(path, _)| self.data.file_id(path).is_none());

        let max = self.data.config.max_initializer_len;
        let index = |(path, text): (String, String)| {
            let stubs = index_text(&text, 0, max);
            (path, text, stubs)
        };
        let indexed: Vec<(String, String, StubTree)> = if self.data.config.parallel_indexing {
            fresh.into_par_iter().map(index).collect()
        } else {
            fresh.into_iter().map(index).collect()
        };
        debug!(files = indexed.len(), "indexed files");

        let mut ids: Vec<FileId> = indexed
            .into_iter()
            .map(|(path, text, stubs)| self.data.insert_file(path, Arc::from(text), stubs))
            .collect();
        ids.extend(
            existing
                .into_iter()
                .map(|(path, text)| self.add_file(&path, &text)),
        );
        ids
    }

    /// Add a file whose stubs were persisted earlier. The record is used
    /// only if it decodes and was built from text version `timestamp`;
    /// otherwise the stubs are rebuilt from `text`.
    pub fn add_file_with_stubs(
        &mut self,
        path: &str,
        text: &str,
        record: &[u8],
        timestamp: u64,
    ) -> (FileId, StubOrigin) {
        let (stubs, origin) = match StubTreeExternalizer.decode(record) {
            Ok(stubs) if stubs.source_timestamp == timestamp => (stubs, StubOrigin::Persisted),
            Ok(stubs) => {
                debug!(
                    path,
                    record = stubs.source_timestamp,
                    source = timestamp,
                    "stale stub record, rebuilding"
                );
                let max = self.data.config.max_initializer_len;
                (index_text(text, timestamp, max), StubOrigin::Rebuilt)
            }
            Err(err) => {
                warn!(path, error = %err, "discarding unreadable stub record");
                let max = self.data.config.max_initializer_len;
                (index_text(text, timestamp, max), StubOrigin::Rebuilt)
            }
        };
        if let Some(id) = self.data.file_id(path) {
            // A reload replaces the file wholesale.
            if let Ok(file) = self.data.file_mut(id) {
                file.replace_with_stubs(Arc::from(text), stubs);
            }
            self.data.invalidate();
            return (id, origin);
        }
        let id = self.data.insert_file(path.to_string(), Arc::from(text), stubs);
        (id, origin)
    }

    /// Replace a file's whole text. Every field of the old text dies.
    pub fn set_file_text(&mut self, file: FileId, text: &str) -> Result<(), EditError> {
        let max = self.data.config.max_initializer_len;
        let source = self.data.file_mut(file)?;
        source.check_writable(None)?;
        source.replace_text(Arc::from(text), max);
        self.data.invalidate();
        Ok(())
    }

    pub fn set_writable(&mut self, file: FileId, writable: bool) -> Result<(), EditError> {
        self.data.file_mut(file)?.set_writable(writable);
        Ok(())
    }

    pub fn editor(&mut self, file: FileId) -> Result<FileEditor<'_>, EditError> {
        FileEditor::new(&mut self.data, file)
    }

    /// Split the grouped declaration containing `field`. See
    /// [`FileEditor::normalize_declaration`].
    pub fn normalize_declaration(&mut self, field: FieldId) -> Result<bool, EditError> {
        self.editor(field.file)?.normalize_declaration(field)
    }

    pub fn set_field_name(&mut self, field: FieldId, name: &str) -> Result<(), EditError> {
        self.editor(field.file)?.set_field_name(field, name)
    }

    pub fn set_initializer(&mut self, field: FieldId, text: Option<&str>) -> Result<(), EditError> {
        self.editor(field.file)?.set_initializer(field, text)
    }

    /// Summarize the file's edited tree into fresh stubs.
    pub fn commit_stubs(&mut self, file: FileId) -> Result<(), EditError> {
        let max = self.data.config.max_initializer_len;
        self.data.file_mut(file)?.commit_stubs(max);
        Ok(())
    }

    /// Drop every soft cache: field caches, the constant cache and the trees
    /// of unedited files.
    pub fn reclaim_soft_caches(&mut self) {
        for file in &mut self.data.files {
            file.reclaim();
        }
        self.data.constants.clear();
        debug!("soft caches reclaimed");
    }
}
