use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde_json::Value;
use tracing::warn;

use crate::assemble::Documents;
use crate::output::{slugify, write_documents};
use crate::pipeline::Pipeline;

const CHUNK_SIZE: usize = 500;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchCounts {
    pub ok: usize,
    pub failed: usize,
    pub files: usize,
}

/// Render every record in parallel and write each one's documents into
/// `out/<slug>/`. Bad records are logged and counted, not fatal; write
/// failures are.
pub fn run_batch(pipeline: &Pipeline, records: &[Value], out: &Path) -> Result<BatchCounts> {
    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = BatchCounts::default();
    let mut used_slugs = HashSet::new();

    for (chunk_idx, chunk) in records.chunks(CHUNK_SIZE).enumerate() {
        let offset = chunk_idx * CHUNK_SIZE;
        let results: Vec<_> = chunk
            .par_iter()
            .enumerate()
            .map(|(i, raw)| (offset + i, render_one(pipeline, raw)))
            .collect();

        for (index, result) in results {
            match result {
                Ok((name, docs)) => {
                    let slug = unique_slug(name.as_deref().unwrap_or(""), index, &mut used_slugs);
                    counts.files += write_documents(&out.join(slug), &docs)?.len();
                    counts.ok += 1;
                }
                Err(e) => {
                    warn!(record = index, "Skipping record: {:#}", e);
                    counts.failed += 1;
                }
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn render_one(pipeline: &Pipeline, raw: &Value) -> Result<(Option<String>, Documents)> {
    let Value::Object(map) = raw else {
        bail!("record is not a JSON object");
    };
    let (record, docs) = pipeline.run_record(map)?;
    Ok((record.product_name, docs))
}

/// Slug of the product name, or `record-<index>` for unnamed records. A slug
/// already taken in this batch gets `-<index>` appended, then `-<n>` counting
/// up from 2 until it is free.
fn unique_slug(name: &str, index: usize, used: &mut HashSet<String>) -> String {
    let base = slugify(name);
    let first = if base.is_empty() {
        format!("record-{}", index)
    } else {
        base
    };
    let mut slug = first.clone();
    if used.contains(&slug) {
        slug = format!("{}-{}", first, index);
    }
    let mut n = 2;
    while used.contains(&slug) {
        slug = format!("{}-{}-{}", first, index, n);
        n += 1;
    }
    used.insert(slug.clone());
    slug
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::Assembler;
    use crate::templates::Templates;

    #[test]
    fn batch_fixture() {
        let text = std::fs::read_to_string("tests/fixtures/batch.json").unwrap();
        let records: Vec<Value> = serde_json::from_str(&text).unwrap();
        let pipeline = Pipeline::new(Assembler::new(Templates::builtin().unwrap()).unwrap());

        let dir = std::env::temp_dir().join(format!("pagegen-batch-{}", std::process::id()));
        let counts = run_batch(&pipeline, &records, &dir).unwrap();
        assert_eq!(counts, BatchCounts { ok: 3, failed: 1, files: 9 });
        assert!(dir.join("nightshift-retinol-cream/comparison_page.json").exists());
        assert!(dir.join("barrier-balm/faq.json").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn slugs_stay_unique() {
        let mut used = HashSet::new();
        assert_eq!(unique_slug("Glow Serum", 0, &mut used), "glow-serum");
        assert_eq!(unique_slug("Glow Serum", 4, &mut used), "glow-serum-4");
        assert_eq!(unique_slug("", 7, &mut used), "record-7");
    }

    #[test]
    fn suffixed_slugs_do_not_collide() {
        let mut used = HashSet::new();
        assert_eq!(unique_slug("Glow Serum 2", 0, &mut used), "glow-serum-2");
        assert_eq!(unique_slug("Glow Serum", 1, &mut used), "glow-serum");
        assert_eq!(unique_slug("Glow Serum", 2, &mut used), "glow-serum-2-2");
        assert_eq!(unique_slug("record 3", 4, &mut used), "record-3");
        assert_eq!(unique_slug("", 3, &mut used), "record-3-3");
        assert_eq!(used.len(), 5);
    }

    #[test]
    fn colliding_names_keep_every_record() {
        let records: Vec<Value> = vec![
            serde_json::json!({"Product Name": "Glow Serum 2", "Price": "100"}),
            serde_json::json!({"Product Name": "Glow Serum", "Price": "200"}),
            serde_json::json!({"Product Name": "Glow Serum", "Price": "300"}),
        ];
        let pipeline = Pipeline::new(Assembler::new(Templates::builtin().unwrap()).unwrap());

        let dir = std::env::temp_dir().join(format!("pagegen-collide-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let counts = run_batch(&pipeline, &records, &dir).unwrap();
        assert_eq!(counts, BatchCounts { ok: 3, failed: 0, files: 9 });

        let dirs = std::fs::read_dir(&dir).unwrap().count();
        assert_eq!(dirs, 3);
        let read_price = |slug: &str| {
            let text = std::fs::read_to_string(dir.join(slug).join("product_page.json")).unwrap();
            let page: Value = serde_json::from_str(&text).unwrap();
            page["price"].clone()
        };
        assert_eq!(read_price("glow-serum-2"), "100.0");
        assert_eq!(read_price("glow-serum"), "200.0");
        assert_eq!(read_price("glow-serum-2-2"), "300.0");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
