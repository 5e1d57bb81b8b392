//! File sink
//!
//! Appends each ranking block to `<results-dir>/<term>.out`, using
//! "Front Page" for the empty term.

use crate::output::console::format_ranking;
use crate::output::traits::{Sink, SinkError, SinkKind, SinkResult};
use crate::ranking::{display_term, Pull, Ranking};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes one `.out` file per search term
pub struct FileSink {
    label: String,
    dir: PathBuf,
}

impl FileSink {
    /// Prepares the results directory, creating it if absent
    pub fn open(label: &str, dir: &Path) -> SinkResult<Self> {
        fs::create_dir_all(dir).map_err(|source| SinkError::Unreachable {
            path: dir.display().to_string(),
            source,
        })?;

        Ok(Self {
            label: label.to_string(),
            dir: dir.to_path_buf(),
        })
    }

    /// File the given term's rankings are appended to
    pub fn path_for(&self, term: &str) -> PathBuf {
        let stem: String = display_term(term)
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.dir.join(format!("{}.out", stem))
    }
}

impl Sink for FileSink {
    fn kind(&self) -> SinkKind {
        SinkKind::File
    }

    fn stage_ranking(&mut self, pull: &Pull, ranking: &Ranking) -> SinkResult<()> {
        let path = self.path_for(ranking.term());
        let write_err = |source| SinkError::Write {
            path: path.display().to_string(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(write_err)?;
        file.write_all(format_ranking(&self.label, pull, ranking).as_bytes())
            .map_err(write_err)?;

        tracing::debug!("Appended {} entries to {}", ranking.len(), path.display());
        Ok(())
    }
}
