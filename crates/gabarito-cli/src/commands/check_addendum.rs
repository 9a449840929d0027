//! The `gabarito check-addendum` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use gabarito_core::model::Gab;

pub fn execute(gab_path: PathBuf, addenda: Vec<PathBuf>) -> Result<()> {
    let mut gab = Gab::from_file(&gab_path)
        .with_context(|| format!("decoding {}", gab_path.display()))?;

    for addendum in &addenda {
        gab.apply_addendum_file(addendum)
            .with_context(|| format!("applying {}", addendum.display()))?;
        println!("OK: {}", addendum.display());
    }

    println!("\nKeys after all addenda:");
    for (i, key) in gab.keys.iter().enumerate() {
        let letters = key.to_letters(gab.header.dont_know_included);
        let rendered = if letters.is_empty() {
            "- (voided)".to_string()
        } else {
            letters
        };
        println!("  {:>3}: {rendered}", i + 1);
    }

    Ok(())
}
