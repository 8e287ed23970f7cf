use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::assemble::Documents;
use crate::templates::DocumentKind;

/// Write the three documents as pretty JSON into `dir`, creating it if needed.
/// Returns the written paths in document order.
pub fn write_documents(dir: &Path, docs: &Documents) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut written = Vec::with_capacity(DocumentKind::ALL.len());
    for kind in DocumentKind::ALL {
        let path = dir.join(kind.output_file());
        let body = serde_json::to_string_pretty(docs.get(kind))?;
        std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        info!(document = kind.name(), "Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

/// Directory-safe slug: "GlowBoost Vitamin C Serum" → "glowboost-vitamin-c-serum".
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::Assembler;
    use crate::pipeline::{sample_input, Pipeline};
    use crate::templates::Templates;

    #[test]
    fn slugs() {
        assert_eq!(slugify("GlowBoost Vitamin C Serum"), "glowboost-vitamin-c-serum");
        assert_eq!(slugify("  10% -- Niacinamide!! "), "10-niacinamide");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn writes_three_files() {
        let pipeline = Pipeline::new(Assembler::new(Templates::builtin().unwrap()).unwrap());
        let docs = pipeline.run(&sample_input()).unwrap();

        let dir = std::env::temp_dir().join(format!("pagegen-output-{}", std::process::id()));
        let written = write_documents(&dir, &docs).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["faq.json", "product_page.json", "comparison_page.json"]);

        let comparison: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&written[2]).unwrap()).unwrap();
        assert!(comparison.get("product_b").is_some());
        let faq = std::fs::read_to_string(&written[0]).unwrap();
        assert!(faq.contains("GlowBoost"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
