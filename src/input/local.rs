use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::input::InputError;

pub const DEFAULT_LOCAL_PATH: &str = "resumo_powerbi.csv";

#[derive(Debug, Clone)]
pub struct LocalSource {
    path: PathBuf,
}

impl LocalSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Vec<u8>, InputError> {
        read_maybe_gz(&self.path)
    }
}

pub fn read_maybe_gz(path: &Path) -> Result<Vec<u8>, InputError> {
    let file = File::open(path)?;
    let mut out = Vec::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        GzDecoder::new(BufReader::new(file)).read_to_end(&mut out)?;
    } else {
        BufReader::new(file).read_to_end(&mut out)?;
    }
    Ok(out)
}
