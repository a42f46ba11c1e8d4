use crate::Track;
use anyhow::{Context, Result};
use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
    time::Instant,
};
use tracing::info;

/// Track id to tags, as stored in a JSON corpus file.
pub type Corpus = BTreeMap<String, Track>;

pub fn read_corpus(reader: impl Read) -> Result<Corpus> {
    serde_json::from_reader(BufReader::new(reader)).context("Failed to decode corpus")
}

pub fn load_corpus(path: &Path) -> Result<Corpus> {
    let corpus_decode_time = Instant::now();
    let input = File::open(path).with_context(|| format!("Failed to open corpus file {path:?}"))?;
    let corpus = read_corpus(input)?;
    info!(
        "Corpus decode time: {:?}, {} tracks",
        corpus_decode_time.elapsed(),
        corpus.len()
    );
    Ok(corpus)
}

/// Writes through a temporary file so readers never see a partial corpus.
pub fn write_corpus(path: &Path, corpus: &Corpus) -> Result<()> {
    let corpus_encode_time = Instant::now();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create corpus directory")?;
    }
    let tmp_path = path.with_extension("tmp");
    {
        let output = File::create(&tmp_path).context("Failed to create corpus file")?;
        let mut output = BufWriter::new(output);
        serde_json::to_writer_pretty(&mut output, corpus).context("Failed to encode corpus")?;
        output.flush().context("Failed to flush corpus file")?;
    }
    fs::rename(&tmp_path, path).context("Failed to rename corpus file")?;
    info!("Corpus encode time: {:?}", corpus_encode_time.elapsed());
    Ok(())
}
