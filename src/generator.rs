//! The generation pass: scan, index, filter, resolve, emit.

use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::analysis::ClassIndex;
use crate::config::{Config, NamespaceGrouping};
use crate::emit::{StubClass, StubWriter};
use crate::error::{Error, Result};
use crate::facade::FacadeFilter;
use crate::registry::{Autowiring, ServiceRegistry, PROJECT_DIR_PARAMETER};
use crate::scan::SourceScanner;

/// One facade written to the helper file.
#[derive(Debug, Clone, Serialize)]
pub struct FacadeSummary {
    pub class: String,
    pub accessor: String,
    pub service: String,
    pub methods: usize,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub output: PathBuf,
    pub files_scanned: usize,
    pub candidates: usize,
    pub facades: Vec<FacadeSummary>,
}

pub struct Generator<R: ServiceRegistry> {
    config: Config,
    registry: R,
}

impl<R: ServiceRegistry> Generator<R> {
    pub fn new(config: Config, registry: R) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Project root as the registry reports it, falling back to the config.
    pub fn project_dir(&self) -> PathBuf {
        self.registry
            .parameter(PROJECT_DIR_PARAMETER)
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.project_dir())
    }

    pub fn source_dir(&self) -> PathBuf {
        self.project_dir().join(&self.config.source_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        self.project_dir().join(&self.config.output)
    }

    /// Generate the helper file.
    ///
    /// A facade whose service cannot be resolved aborts the run before
    /// anything is written.
    pub fn run(&self) -> Result<GenerationReport> {
        let root = self.project_dir();
        let scanner = SourceScanner::new(self.source_dir()).exclude(&self.config.excluded_paths)?;
        let files = scanner.files()?;
        tracing::debug!(root = %scanner.root().display(), files = files.len(), "scanned sources");

        let index = self.build_index(&files, &root)?;

        let autowiring = Autowiring::new(&self.registry, &index);
        let registry: &dyn ServiceRegistry = if self.config.autowire {
            &autowiring
        } else {
            &self.registry
        };

        let filter = FacadeFilter::new(&index, &self.config.facade_markers);
        let mut candidates = 0;
        let mut stubs = Vec::new();
        let mut facades = Vec::new();

        for path in &files {
            let Some(candidate) = scanner.candidate(path) else {
                continue;
            };
            candidates += 1;

            let Some(facade) = filter.describe(&candidate)? else {
                continue;
            };

            let service = registry.get(&facade.accessor)?;
            let service_class = index
                .get(&service.class)
                .map(|class| class.fqn())
                .ok_or_else(|| Error::ServiceClassUnknown {
                    id: service.id.clone(),
                    class: service.class.clone(),
                })?;

            for missing in index.unindexed_supertypes(&service_class) {
                tracing::warn!(
                    service = %service_class,
                    missing = %missing,
                    "inherited methods omitted; add the directory declaring it to index_paths"
                );
            }

            let stub = StubClass::build(&facade, &service_class, &index);
            tracing::info!(
                facade = %facade.fqn,
                service = %service_class,
                methods = stub.methods.len(),
                "facade"
            );

            facades.push(FacadeSummary {
                class: facade.fqn,
                accessor: facade.accessor,
                service: service_class,
                methods: stub.methods.len(),
            });
            stubs.push(stub);
        }

        if self.config.namespace_grouping == NamespaceGrouping::Grouped {
            stubs.sort_by(|a, b| a.namespace.cmp(&b.namespace));
        }

        let output = self.output_path();
        self.write(&output, &stubs)?;

        Ok(GenerationReport {
            output,
            files_scanned: files.len(),
            candidates,
            facades,
        })
    }

    /// Index the scanned sources plus any type-only directories.
    fn build_index(&self, files: &[PathBuf], root: &Path) -> Result<ClassIndex> {
        let mut index = ClassIndex::build(files, root);

        for dir in &self.config.index_paths {
            let dir = root.join(dir);
            for path in SourceScanner::new(&dir).files()? {
                if let Err(e) = index.analyze_file(&path, root) {
                    tracing::debug!(path = %path.display(), error = %e, "skipping unparsable file");
                }
            }
        }

        Ok(index)
    }

    fn write(&self, output: &Path, stubs: &[StubClass]) -> Result<()> {
        let persist_error = |source: io::Error| Error::Persist {
            path: output.to_path_buf(),
            source,
        };

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(persist_error)?;

        if !self.config.atomic_write {
            let file = File::create(output).map_err(persist_error)?;
            write_stubs(BufWriter::new(file), stubs).map_err(persist_error)?;
            return Ok(());
        }

        let temp = NamedTempFile::new_in(&dir).map_err(persist_error)?;
        let temp = write_stubs(BufWriter::new(temp), stubs)
            .and_then(|buffered| buffered.into_inner().map_err(|e| e.into_error()))
            .map_err(persist_error)?;

        // Temp files are private; give the result the mode a plain write
        // would have.
        let (permissions, created) = output_permissions(output).map_err(persist_error)?;
        let persisted = temp
            .as_file()
            .set_permissions(permissions)
            .map_err(persist_error)
            .and_then(|()| temp.persist(output).map_err(|e| persist_error(e.error)));
        if persisted.is_err() && created {
            let _ = fs::remove_file(output);
        }
        persisted.map(drop)
    }
}

/// Permissions for the replaced output: those of the existing file, or the
/// umask default of a freshly created one. The flag reports whether the
/// output was created here.
fn output_permissions(output: &Path) -> io::Result<(fs::Permissions, bool)> {
    match fs::metadata(output) {
        Ok(meta) => Ok((meta.permissions(), false)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let file = File::options().write(true).create_new(true).open(output)?;
            Ok((file.metadata()?.permissions(), true))
        }
        Err(e) => Err(e),
    }
}

fn write_stubs<W: Write>(out: W, stubs: &[StubClass]) -> io::Result<W> {
    let mut writer = StubWriter::new(out)?;
    for stub in stubs {
        writer.write_class(stub)?;
    }
    writer.finish()
}
