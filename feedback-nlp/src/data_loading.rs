use {
    std::path::Path,
    anyhow::{Context, Result},
    indicatif::ProgressBar,
    serde::de::DeserializeOwned,
    tracing::info,
    feedback_core::models::{Comment, LabeledComment},
};

/// Training rows, csv with `id,text,recommend` columns. `recommend` may be empty.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<LabeledComment>> {
    load_csv(path.as_ref())
}

/// Comments to analyze, csv with `id,text` columns.
pub fn load_comments(path: impl AsRef<Path>) -> Result<Vec<Comment>> {
    load_csv(path.as_ref())
}

fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    info!("loading file: {}", path.display());

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = reader.headers()
        .with_context(|| format!("failed to read header of {}", path.display()))?
        .clone();
    let records = reader.records()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to read records of {}", path.display()))?;

    let pb = ProgressBar::new(records.len() as u64);
    let mut rows = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let row = record.deserialize(Some(&headers))
            .with_context(|| format!("invalid record {} in {}", index + 1, path.display()))?;
        rows.push(row);
        pb.inc(1);
    }

    pb.finish();
    info!("loaded {} records from {}", rows.len(), path.display());

    Ok(rows)
}
