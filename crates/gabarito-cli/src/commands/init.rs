//! The `gabarito init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("gabarito.toml").exists() {
        println!("gabarito.toml already exists, skipping.");
    } else {
        std::fs::write("gabarito.toml", SAMPLE_CONFIG)?;
        println!("Created gabarito.toml");
    }

    std::fs::create_dir_all("sample-data")?;
    let roster_path = std::path::Path::new("sample-data/roster.json");
    if roster_path.exists() {
        println!("sample-data/roster.json already exists, skipping.");
    } else {
        std::fs::write(roster_path, SAMPLE_ROSTER)?;
        println!("Created sample-data/roster.json");
    }
    let responses_path = std::path::Path::new("sample-data/responses.json");
    if responses_path.exists() {
        println!("sample-data/responses.json already exists, skipping.");
    } else {
        std::fs::write(responses_path, SAMPLE_RESPONSES)?;
        println!("Created sample-data/responses.json");
    }

    println!("\nNext steps:");
    println!("  1. Adjust gabarito.toml to your grading policy");
    println!("  2. Run: gabarito inspect --gab exam.gab");
    println!("  3. Run: gabarito grade --gab exam.gab --roster sample-data/roster.json --responses sample-data/responses.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gabarito configuration

# How many wrong answers cancel one right answer. 0 disables the penalty.
penalty_divisor = 4

# Where grade sheets are written.
output_dir = "./gabarito-results"

# Selection statuses to call out on the log while grading.
announce = ["last-positive-accepted"]
"#;

const SAMPLE_ROSTER: &str = r#"{
  "entries": [
    { "name": "Ana Lima", "email": "ana@example.edu", "fields": ["T1"] },
    { "name": "Bruno Reis", "email": "bruno@example.edu", "fields": ["T1"] }
  ]
}
"#;

const SAMPLE_RESPONSES: &str = r#"[
  { "email": "ana@example.edu", "answers": ["(a) first option", "(c) third option"] },
  { "email": "bruno@example.edu", "answers": ["(b) second option", "Não sei."] }
]
"#;
