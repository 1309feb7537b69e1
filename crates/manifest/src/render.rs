use crate::error::{Error, ErrorKind, Result};
use crate::record::ManifestRecord;
use exn::ResultExt;
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;
use upon::{Engine, Template};

/// Binds manifest records into a compiled [upon] template.
///
/// The template is compiled once, when the renderer is built, so that syntax
/// errors surface at startup. Values are inserted verbatim: record text is
/// already sanitized for JSON, and the template supplies the quotes.
pub struct Renderer {
    engine: Engine<'static>,
    template: Template<'static>,
}

impl FromStr for Renderer {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let engine = Engine::new();
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }
}

impl Renderer {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).or_raise(|| ErrorKind::TemplateNotFound(path.to_path_buf()))?;
        let renderer = source.parse()?;
        tracing::debug!(target: "iiifman::manifest", template = %path.display(), "manifest template compiled");
        Ok(renderer)
    }

    #[instrument(skip_all, fields(pid = record.pid(), pages = record.master_files().len()))]
    pub fn render(&self, record: &ManifestRecord) -> Result<String> {
        self.template
            .render(&self.engine, record)
            .to_string()
            .or_raise(|| ErrorKind::Render(record.pid().to_string()))
    }
}
