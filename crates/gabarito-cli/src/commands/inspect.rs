//! The `gabarito inspect` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use gabarito_core::model::Gab;

pub fn execute(gab_path: PathBuf, addenda: Vec<PathBuf>, show_tests: bool) -> Result<()> {
    let mut gab = Gab::from_file(&gab_path)
        .with_context(|| format!("decoding {}", gab_path.display()))?;
    for addendum in &addenda {
        gab.apply_addendum_file(addendum)
            .with_context(|| format!("applying {}", addendum.display()))?;
    }

    println!("Document: {}", gab_path.display());
    println!(
        "  {} test(s): {} named, {} unnamed",
        gab.header.num_tests,
        gab.named_tests.len(),
        gab.unnamed_tests.len()
    );
    println!(
        "  {} question(s), {} answer slot(s){}",
        gab.header.num_items,
        gab.header.max_num_answers,
        if gab.header.dont_know_included {
            " (with a don't-know option)"
        } else {
            ""
        }
    );

    println!("\nKeys (original answer order):");
    for (i, key) in gab.keys.iter().enumerate() {
        let letters = key.to_letters(gab.header.dont_know_included);
        let rendered = if letters.is_empty() {
            "- (voided)".to_string()
        } else {
            letters
        };
        println!("  {:>3}: {rendered}", i + 1);
    }

    if show_tests {
        use comfy_table::{Cell, Table};

        let mut table = Table::new();
        table.set_header(vec!["Student", "Fields", "Question order"]);
        for test in gab.tests() {
            let (name, fields) = match &test.student {
                Some(s) => (s.name.as_str(), s.fields.join(", ")),
                None => ("(unnamed)", String::new()),
            };
            table.add_row(vec![
                Cell::new(name),
                Cell::new(fields),
                Cell::new(test.perm.to_string()),
            ]);
        }
        println!("\n{table}");
    }

    Ok(())
}
