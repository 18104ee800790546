//! Expiry month/year handling for basket entries.
//!
//! Month and year are opaque two-digit strings picked from fixed choice
//! lists, so no calendar validation happens here. Supplying an empty value
//! is how an operator un-sets a field.

use serde::{Deserialize, Serialize};

use crate::models::BasketEntry;

/// First selectable expiry year (two digits, i.e. 2026).
pub const FIRST_EXPIRY_YEAR: u32 = 26;

/// Number of selectable expiry years.
pub const EXPIRY_YEAR_SPAN: u32 = 25;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A selectable value with its display label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpiryChoice {
    pub value: String,
    pub label: String,
}

/// Set the expiry month of an entry. Empty input clears it.
pub fn set_month(entry: &mut BasketEntry, month: &str) {
    entry.expiry_month = normalize(month);
}

/// Set the expiry year of an entry. Empty input clears it.
pub fn set_year(entry: &mut BasketEntry, year: &str) {
    entry.expiry_year = normalize(year);
}

/// Build the `MM/YY` token from its parts.
pub fn expiry_token(month: Option<&str>, year: Option<&str>) -> Option<String> {
    match (month, year) {
        (Some(m), Some(y)) if !m.is_empty() && !y.is_empty() => Some(format!("{}/{}", m, y)),
        _ => None,
    }
}

/// Split a stored `MM/YY` token back into month and year.
pub fn split_token(token: &str) -> Option<(&str, &str)> {
    let (month, year) = token.split_once('/')?;
    if month.is_empty() || year.is_empty() {
        return None;
    }
    Some((month, year))
}

/// Render a `MM/YY` token for a label as `MM/20YY`.
///
/// Anything that is not a month/year pair is returned unchanged.
pub fn display_expiry(token: &str) -> String {
    match split_token(token) {
        Some((month, year)) => format!("{}/20{}", month, year),
        None => token.to_string(),
    }
}

/// Months `01`..`12` labelled with their English names.
pub fn month_choices() -> Vec<ExpiryChoice> {
    MONTH_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let value = format!("{:02}", i + 1);
            ExpiryChoice {
                label: format!("{} - {}", value, name),
                value,
            }
        })
        .collect()
}

/// Two-digit years starting at [`FIRST_EXPIRY_YEAR`], labelled as full years.
pub fn year_choices() -> Vec<ExpiryChoice> {
    (FIRST_EXPIRY_YEAR..FIRST_EXPIRY_YEAR + EXPIRY_YEAR_SPAN)
        .map(|y| ExpiryChoice {
            value: y.to_string(),
            label: format!("20{}", y),
        })
        .collect()
}

fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry() -> BasketEntry {
        BasketEntry::new("Amoxicillin".into(), "Three times daily".into())
    }

    #[test]
    fn test_month_and_year_form_token() {
        let mut e = entry();
        set_month(&mut e, "01");
        assert_eq!(e.expiry_date(), None);
        set_year(&mut e, "26");
        assert_eq!(e.expiry_date(), Some("01/26".to_string()));
    }

    #[test]
    fn test_empty_value_clears_token() {
        let mut e = entry();
        set_month(&mut e, "03");
        set_year(&mut e, "27");
        set_year(&mut e, "");
        assert_eq!(e.expiry_date(), None);
        assert_eq!(e.expiry_month(), Some("03"));

        set_year(&mut e, "27");
        set_month(&mut e, "");
        assert_eq!(e.expiry_date(), None);
    }

    #[test]
    fn test_token_recomputes_on_change() {
        let mut e = entry();
        set_month(&mut e, "03");
        set_year(&mut e, "27");
        set_month(&mut e, "11");
        assert_eq!(e.expiry_date(), Some("11/27".to_string()));
    }

    #[test]
    fn test_display_expiry() {
        assert_eq!(display_expiry("01/26"), "01/2026");
        assert_eq!(display_expiry(""), "");
        assert_eq!(display_expiry("soon"), "soon");
    }

    #[test]
    fn test_choices() {
        let months = month_choices();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].value, "01");
        assert_eq!(months[0].label, "01 - January");
        assert_eq!(months[11].value, "12");

        let years = year_choices();
        assert_eq!(years.len(), 25);
        assert_eq!(years[0].value, "26");
        assert_eq!(years[0].label, "2026");
        assert_eq!(years[24].value, "50");
    }

    proptest! {
        #[test]
        fn prop_token_present_iff_both_set(month in "[0-9]{0,2}", year in "[0-9]{0,2}") {
            let mut e = entry();
            set_month(&mut e, &month);
            set_year(&mut e, &year);

            let both = !month.is_empty() && !year.is_empty();
            prop_assert_eq!(e.expiry_date().is_some(), both);
            if both {
                prop_assert_eq!(e.expiry_date(), Some(format!("{}/{}", month, year)));
            }
        }
    }
}
