//! Export every notebook of a device session to PDF.

use std::collections::HashSet;
use std::fs;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{info, warn};

use super::DeviceSession;
use crate::archive::NotebookArchive;
use crate::error::Result;
use crate::model::{DeviceInfo, NotebookEntry};
use crate::render::NotebookRenderer;

/// Options for exporting notebooks.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory receiving PDFs (and archives, when kept)
    pub output_dir: PathBuf,

    /// Keep a copy of each fetched archive next to its PDF
    pub keep_archives: bool,

    /// Skip notebooks that fail to render instead of aborting the run
    pub skip_failed: bool,
}

impl ExportOptions {
    /// Create export options writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Keep or drop fetched archives.
    pub fn with_keep_archives(mut self, keep: bool) -> Self {
        self.keep_archives = keep;
        self
    }

    /// Continue past notebooks that fail to render.
    pub fn with_skip_failed(mut self, skip: bool) -> Self {
        self.skip_failed = skip;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            keep_archives: false,
            skip_failed: false,
        }
    }
}

/// One exported notebook.
#[derive(Debug, Clone)]
pub struct ExportedNotebook {
    /// Changelist record of the notebook
    pub entry: NotebookEntry,
    /// Written PDF
    pub pdf_path: PathBuf,
    /// Kept archive copy, if requested
    pub archive_path: Option<PathBuf>,
    /// Number of pages rendered
    pub pages: usize,
}

/// Fetch and render every notebook of `session`.
///
/// The device info is read once to anchor caption times. Output files are
/// named after the notebook title; a title already used in this run gets the
/// notebook guid appended. Each archive is
/// staged in a temporary file that is removed when the notebook is done,
/// whether rendering succeeded or not. `on_notebook` is called with each
/// notebook before it is fetched.
pub fn export_notebooks<S, F>(
    session: &mut S,
    renderer: &NotebookRenderer<'_>,
    options: &ExportOptions,
    mut on_notebook: F,
) -> Result<Vec<ExportedNotebook>>
where
    S: DeviceSession + ?Sized,
    F: FnMut(&NotebookEntry, &Path),
{
    let info: DeviceInfo = session.device_info()?;
    let origin = info.time_origin(Utc::now());
    if origin.is_none() {
        warn!("device info has no clock; captions will omit time ranges");
    }

    let notebooks = session.notebooks()?;
    info!("{} notebooks on device", notebooks.len());
    fs::create_dir_all(&options.output_dir)?;

    let mut exported = Vec::with_capacity(notebooks.len());
    let mut used_stems = HashSet::new();
    for entry in notebooks {
        let mut stem = entry.file_stem();
        if !used_stems.insert(stem.to_lowercase()) {
            stem = entry.qualified_file_stem();
            warn!("notebook title {:?} is not unique; writing {}.pdf", entry.title, stem);
            used_stems.insert(stem.to_lowercase());
        }
        let pdf_path = options.output_dir.join(format!("{}.pdf", stem));
        on_notebook(&entry, pdf_path.as_path());

        let mut staged = tempfile::Builder::new()
            .prefix("pen2pdf-notebook-")
            .suffix(".zip")
            .tempfile()?;
        session.fetch_notebook(&entry.guid, staged.as_file_mut())?;
        staged.as_file_mut().flush()?;

        let archive_path = if options.keep_archives {
            let path = options.output_dir.join(format!("{}.zip", stem));
            fs::copy(staged.path(), &path)?;
            Some(path)
        } else {
            None
        };

        staged.as_file_mut().seek(SeekFrom::Start(0))?;
        let rendered = NotebookArchive::from_reader(staged.as_file_mut()).and_then(|mut archive| {
            renderer.render(&mut archive, origin.as_ref(), Some(&entry.title))
        });

        let mut rendered = match rendered {
            Ok(rendered) => rendered,
            Err(e) if options.skip_failed => {
                warn!("skipping notebook {}: {}", entry.title, e);
                continue;
            }
            Err(e) => return Err(e),
        };
        rendered.save(&pdf_path)?;
        info!("wrote {} ({} pages)", pdf_path.display(), rendered.page_count());

        exported.push(ExportedNotebook {
            pages: rendered.page_count(),
            entry,
            pdf_path,
            archive_path,
        });
    }
    Ok(exported)
}
