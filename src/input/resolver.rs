use crate::input::local::LocalSource;
use crate::input::remote::RemoteSource;
use crate::input::{InputError, ParseOutcome, SourceError, parse_records};
use crate::model::dataset::{Dataset, Provenance};
use crate::pipeline::stage2_derive::derive;

/// Outcome of one resolution. `warning` carries a recovered remote failure;
/// `error` is set only when no source could be read and `dataset` is empty.
#[derive(Debug)]
pub struct Resolution {
    pub dataset: Dataset,
    pub skipped_rows: usize,
    pub warning: Option<SourceError>,
    pub error: Option<SourceError>,
}

impl Resolution {
    pub fn is_usable(&self) -> bool {
        self.error.is_none() && !self.dataset.is_empty()
    }
}

pub struct Resolver {
    remote: Option<Box<dyn RemoteSource>>,
    local: LocalSource,
}

impl Resolver {
    pub fn new(remote: Option<Box<dyn RemoteSource>>, local: LocalSource) -> Self {
        Self { remote, local }
    }

    pub fn local_only(local: LocalSource) -> Self {
        Self::new(None, local)
    }

    pub fn resolve(&self) -> Resolution {
        let warning = match self.try_remote() {
            Ok(parsed) => return finish(parsed, Provenance::Remote, None),
            Err(SourceError::NotConfigured) => {
                tracing::info!("remote source not configured, using local file");
                Some(SourceError::NotConfigured)
            }
            Err(err) => {
                tracing::warn!("remote source unavailable, using local file: {err}");
                Some(err)
            }
        };

        match self.try_local() {
            Ok(parsed) => finish(parsed, Provenance::Local, warning),
            Err(err) => {
                tracing::error!("no data source available: {err}");
                Resolution {
                    dataset: Dataset::empty(),
                    skipped_rows: 0,
                    warning,
                    error: Some(err),
                }
            }
        }
    }

    fn try_remote(&self) -> Result<ParseOutcome, SourceError> {
        let remote = self.remote.as_ref().ok_or(SourceError::NotConfigured)?;
        tracing::info!(source = %remote.describe(), "fetching remote dataset");
        let bytes = remote.fetch()?;
        let parsed = parse_records(&bytes).map_err(SourceError::Malformed)?;
        // A well-formed header over unusable rows is still a bad payload.
        if parsed.records.is_empty() {
            return Err(SourceError::Malformed(InputError::NoRows {
                skipped: parsed.skipped_rows,
            }));
        }
        Ok(parsed)
    }

    fn try_local(&self) -> Result<ParseOutcome, SourceError> {
        let path = self.local.path().to_path_buf();
        tracing::info!(path = %path.display(), "reading local dataset");
        self.local
            .read()
            .and_then(|bytes| parse_records(&bytes))
            .map_err(|source| SourceError::Local { path, source })
    }
}

fn finish(parsed: ParseOutcome, provenance: Provenance, warning: Option<SourceError>) -> Resolution {
    let records = derive(parsed.records);
    let dataset = Dataset::new(records, provenance);
    tracing::info!(
        rows = dataset.len(),
        skipped = parsed.skipped_rows,
        provenance = provenance.label(),
        "dataset resolved"
    );
    Resolution {
        dataset,
        skipped_rows: parsed.skipped_rows,
        warning,
        error: None,
    }
}
