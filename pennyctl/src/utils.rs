#[macro_use]
pub mod table_display;

use anyhow::Result;

use penny::prelude::*;

pub fn confirm() -> Result<bool> {
    println!("Do you really want to do that?");

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    Ok(input.trim() == "yes")
}

/// Surface what the ledger recorded while a write was rolled back
pub fn report<G: Gateway, T>(ledger: &mut Ledger<G>, result: penny::Result<T>) -> Result<T> {
    for notification in ledger.take_notifications() {
        eprintln!("{notification}");
    }

    match result {
        Err(error) if error.is_unauthorized() => {
            anyhow::bail!("Not signed in, use `pennyctl session login <USER>` first")
        }
        result => Ok(result?),
    }
}

/// Kind given on the command line, or the kind of the category
///
/// An unknown category falls back to the default kind and is left for the
/// store to reject.
pub fn kind_or_category<G: Gateway>(
    ledger: &mut Ledger<G>,
    kind: Option<&str>,
    category_id: &str,
) -> Result<String> {
    if let Some(kind) = kind {
        return Ok(kind.to_owned());
    }

    let found = ledger.categories().map(|categories| {
        categories
            .iter()
            .find(|c| c.id.to_string() == category_id.trim())
            .map(|c| c.kind)
    });

    Ok(report(ledger, found)?.unwrap_or_default().to_string())
}
