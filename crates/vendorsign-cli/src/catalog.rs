//! Catalog commands; these read the catalog file and never touch the database.

use vendorsign_core::{AgreementType, Catalog};

/// Print the partnership levels for `agreement_type` as a table.
pub(crate) fn run_levels(catalog: &Catalog, agreement_type: AgreementType) {
    let kind = catalog.kind(agreement_type);
    println!("{} (default commission {})", kind.title, kind.default_commission);
    println!();
    println!(
        "{:<12}{:<18}{:<12}{:<22}DESCRIPTION",
        "ID", "NAME", "COMMISSION", "USER FEE"
    );
    for level in &kind.levels {
        println!(
            "{:<12}{:<18}{:<12}{:<22}{}",
            level.id,
            level.name,
            level.commission,
            level.user_fee.as_deref().unwrap_or("\u{2014}"),
            level.description
        );
    }
}

/// Print the agreement text for `level` with the vendor fields left as hints.
pub(crate) fn run_preview(catalog: &Catalog, agreement_type: AgreementType, level: &str) {
    let terms = catalog.resolve_terms(agreement_type, level);
    if !catalog.levels(agreement_type).iter().any(|l| l.id == level) {
        eprintln!(
            "warning: unknown level '{level}' for {agreement_type}; using default commission {}",
            terms.commission
        );
    }
    println!("{}", catalog.agreement_text(agreement_type, level));
}
