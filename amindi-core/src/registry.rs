//! Static registry of Georgian locations known to the app.

use crate::model::Location;

/// How many locations are used when a curated list cannot be resolved.
pub const FALLBACK_SELECTION_LEN: usize = 8;

/// Default curated list: the major cities shown on the weather panel.
pub const MAJOR_CITY_IDS: &[&str] = &[
    "tbilisi",
    "batumi",
    "kutaisi",
    "rustavi",
    "zugdidi",
    "gori",
    "telavi",
    "mestia",
];

const fn loc(id: &'static str, display_name: &'static str, query_name: &'static str) -> Location {
    Location { id, display_name, query_name }
}

// The first entry is the primary location.
const LOCATIONS: &[Location] = &[
    loc("tbilisi", "თბილისი", "Tbilisi"),
    loc("batumi", "ბათუმი", "Batumi"),
    loc("kutaisi", "ქუთაისი", "Kutaisi"),
    loc("rustavi", "რუსთავი", "Rustavi"),
    loc("gori", "გორი", "Gori"),
    loc("zugdidi", "ზუგდიდი", "Zugdidi"),
    loc("poti", "ფოთი", "Poti"),
    loc("telavi", "თელავი", "Telavi"),
    loc("mestia", "მესტია", "Mestia"),
    loc("borjomi", "ბორჯომი", "Borjomi"),
    loc("akhaltsikhe", "ახალციხე", "Akhaltsikhe"),
    loc("ozurgeti", "ოზურგეთი", "Ozurgeti"),
    loc("kobuleti", "ქობულეთი", "Kobuleti"),
    loc("sighnaghi", "სიღნაღი", "Sighnaghi"),
    loc("gudauri", "გუდაური", "Gudauri"),
    loc("bakuriani", "ბაკურიანი", "Bakuriani"),
];

/// Every registered location, in registry order.
pub fn all() -> &'static [Location] {
    LOCATIONS
}

pub fn find(id: &str) -> Option<Location> {
    let id = id.trim().to_lowercase();
    LOCATIONS.iter().find(|l| l.id == id).copied()
}

/// The capital; used for the synthetic fallback reading.
pub fn primary() -> Location {
    LOCATIONS[0]
}

/// Resolve a curated id list against the registry.
///
/// Unknown ids are skipped. If nothing resolves, the first
/// [`FALLBACK_SELECTION_LEN`] registry entries are returned instead, so the
/// result is never empty.
pub fn select<S: AsRef<str>>(ids: &[S]) -> Vec<Location> {
    let selected: Vec<Location> = ids.iter().filter_map(|id| find(id.as_ref())).collect();

    if selected.is_empty() {
        tracing::warn!(
            requested = ids.len(),
            "no curated location could be resolved, using first {FALLBACK_SELECTION_LEN} registry entries"
        );
        return LOCATIONS.iter().take(FALLBACK_SELECTION_LEN).copied().collect();
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = all().iter().map(|l| l.id).collect();
        assert_eq!(ids.len(), all().len());
    }

    #[test]
    fn major_cities_all_resolve() {
        let selected = select(MAJOR_CITY_IDS);
        assert_eq!(selected.len(), MAJOR_CITY_IDS.len());

        let ids: Vec<_> = selected.iter().map(|l| l.id).collect();
        assert_eq!(ids, MAJOR_CITY_IDS);
    }

    #[test]
    fn find_ignores_case_and_whitespace() {
        let batumi = find("  Batumi ").expect("batumi is registered");
        assert_eq!(batumi.query_name, "Batumi");
        assert!(find("atlantis").is_none());
    }

    #[test]
    fn select_skips_unknown_ids() {
        let selected = select(&["kutaisi", "atlantis", "tbilisi"]);
        let ids: Vec<_> = selected.iter().map(|l| l.id).collect();
        assert_eq!(ids, ["kutaisi", "tbilisi"]);
    }

    #[test]
    fn select_falls_back_to_first_entries_when_nothing_resolves() {
        let selected = select(&["atlantis", "el-dorado"]);
        assert_eq!(selected.len(), FALLBACK_SELECTION_LEN);
        assert_eq!(selected.as_slice(), &all()[..FALLBACK_SELECTION_LEN]);

        let empty: [&str; 0] = [];
        assert_eq!(select(&empty).len(), FALLBACK_SELECTION_LEN);
    }

    #[test]
    fn primary_is_tbilisi() {
        assert_eq!(primary().id, "tbilisi");
    }
}
