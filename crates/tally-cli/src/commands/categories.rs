//! Category vocabulary command implementations

use anyhow::{Context, Result};
use tally_core::db::Database;

pub fn cmd_categories_list(db: &Database) -> Result<()> {
    let vocab = db.load_vocabulary()?;

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────");
    for name in vocab.ordered() {
        println!("   {}", name);
    }

    Ok(())
}

pub fn cmd_categories_add(db: &Database, name: &str) -> Result<()> {
    let mut vocab = db.load_vocabulary()?;
    let added = db
        .add_category(&mut vocab, name)
        .with_context(|| format!("Failed to add category '{}'", name))?;

    if added {
        println!("✅ Added category '{}'", name.trim());
    } else {
        println!("Category '{}' already exists.", name.trim());
    }

    Ok(())
}
