//! Categorical color identity for location groups.
//!
//! Each visible group set gets a fresh, deterministic mapping from location
//! code to one palette color, assigned in first-seen key order. The default
//! (no selection) view assigns over continent aggregate codes; the filtered
//! view assigns over selected country codes. The two domains are disjoint and
//! a mode switch replaces the registry wholesale — colors are *not* stable
//! for an individual location across a mode switch. That is a documented
//! non-invariant, not a bug.

use egui::Color32;
use once_cell::sync::Lazy;
use std::sync::Mutex;

// Global palette used for group color allocation. Hosts may replace it to
// restyle both views consistently; registries built afterwards pick it up.
static GLOBAL_PALETTE: Lazy<Mutex<Vec<Color32>>> =
    Lazy::new(|| Mutex::new(DEFAULT_PALETTE.to_vec()));

/// Fixed ten-color categorical palette (Tableau-style).
pub const DEFAULT_PALETTE: [Color32; 10] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(214, 39, 40),
    Color32::from_rgb(148, 103, 189),
    Color32::from_rgb(140, 86, 75),
    Color32::from_rgb(227, 119, 194),
    Color32::from_rgb(127, 127, 127),
    Color32::from_rgb(188, 189, 34),
    Color32::from_rgb(23, 190, 207),
];

/// Get a copy of the current global palette.
pub fn global_palette() -> Vec<Color32> {
    GLOBAL_PALETTE.lock().unwrap().clone()
}

/// Replace the global palette. Empty input restores the default.
pub fn set_global_palette(palette: Vec<Color32>) {
    let mut guard = GLOBAL_PALETTE.lock().unwrap();
    *guard = if palette.is_empty() {
        DEFAULT_PALETTE.to_vec()
    } else {
        palette
    };
}

/// Which group universe a registry was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorDomain {
    /// Default mode: continent aggregate codes.
    Continents,
    /// Filtered mode: selected country codes.
    Countries,
}

/// Deterministic total mapping from group key to color for one render pass.
#[derive(Debug, Clone)]
pub struct ColorRegistry {
    domain: ColorDomain,
    assigned: Vec<(String, Color32)>,
}

impl ColorRegistry {
    /// An empty registry; lookups against it miss, rendering draws nothing.
    pub fn empty(domain: ColorDomain) -> Self {
        Self {
            domain,
            assigned: Vec::new(),
        }
    }

    /// Assign a color to every key, round-robin over the palette in
    /// first-seen key order. Duplicate keys keep their first assignment.
    pub fn assign<I, S>(domain: ColorDomain, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let palette = global_palette();
        let mut assigned: Vec<(String, Color32)> = Vec::new();
        for key in keys {
            let key = key.into();
            if assigned.iter().any(|(k, _)| k == &key) {
                continue;
            }
            let color = palette[assigned.len() % palette.len()];
            assigned.push((key, color));
        }
        Self { domain, assigned }
    }

    pub fn domain(&self) -> ColorDomain {
        self.domain
    }

    /// Look up the color for a code. Misses return `None`; they are expected
    /// for codes outside the registry's domain.
    pub fn color_for(&self, code: &str) -> Option<Color32> {
        self.assigned
            .iter()
            .find(|(k, _)| k == code)
            .map(|(_, c)| *c)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.assigned.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_follows_first_seen_order() {
        let reg = ColorRegistry::assign(ColorDomain::Countries, ["US", "CA", "FR"]);
        assert_eq!(reg.color_for("US"), Some(DEFAULT_PALETTE[0]));
        assert_eq!(reg.color_for("CA"), Some(DEFAULT_PALETTE[1]));
        assert_eq!(reg.color_for("FR"), Some(DEFAULT_PALETTE[2]));
    }

    #[test]
    fn duplicate_keys_keep_first_assignment() {
        let reg = ColorRegistry::assign(ColorDomain::Countries, ["US", "CA", "US"]);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.color_for("US"), Some(DEFAULT_PALETTE[0]));
    }

    #[test]
    fn palette_wraps_round_robin() {
        let keys: Vec<String> = (0..12).map(|i| format!("C{i}")).collect();
        let reg = ColorRegistry::assign(ColorDomain::Countries, keys);
        assert_eq!(reg.color_for("C10"), Some(DEFAULT_PALETTE[0]));
        assert_eq!(reg.color_for("C11"), Some(DEFAULT_PALETTE[1]));
    }

    #[test]
    fn empty_registry_misses_everything() {
        let reg = ColorRegistry::empty(ColorDomain::Continents);
        assert!(reg.is_empty());
        assert_eq!(reg.color_for("OWID_EUR"), None);
    }
}
