//! Console sink and the plain-text ranking block shared with the file sink

use crate::output::traits::{Sink, SinkError, SinkKind, SinkResult};
use crate::ranking::{Pull, Ranking};
use std::io::{self, Write};

/// Formats one ranking as a plain-text block
///
/// ```text
/// 2017-01-02T03:04:05Z
/// Discord.me rankings by term - games:
/// Pages 1-1
/// #   1: Alpha
/// #   2: Beta
/// ```
pub fn format_ranking(label: &str, pull: &Pull, ranking: &Ranking) -> String {
    let mut text = String::new();

    text.push_str(&format!("{}\n", pull.timestamp()));
    text.push_str(&format!(
        "{} rankings by term - {}: \n",
        label,
        ranking.term()
    ));
    text.push_str(&format!("{}\n", ranking.pages()));

    for entry in ranking.entries() {
        text.push_str(&format!("#{:>4}: {}\n", entry.position, entry.name));
    }

    text
}

/// Prints every ranking to a writer, standard output by default
pub struct ConsoleSink<W: Write = io::Stdout> {
    label: String,
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout(label: &str) -> Self {
        Self::new(label, io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(label: &str, out: W) -> Self {
        Self {
            label: label.to_string(),
            out,
        }
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_err(source: io::Error) -> SinkError {
        SinkError::Write {
            path: "<console>".to_string(),
            source,
        }
    }
}

impl<W: Write> Sink for ConsoleSink<W> {
    fn kind(&self) -> SinkKind {
        SinkKind::Console
    }

    fn stage_ranking(&mut self, pull: &Pull, ranking: &Ranking) -> SinkResult<()> {
        let block = format_ranking(&self.label, pull, ranking);
        self.out
            .write_all(block.as_bytes())
            .map_err(Self::write_err)?;
        self.out.flush().map_err(Self::write_err)
    }

    fn commit(&mut self, _pull: &Pull) -> SinkResult<()> {
        self.out.flush().map_err(Self::write_err)
    }
}
