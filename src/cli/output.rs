//! Output formatting for CLI

use crate::{grappling::StateSpace, learning::ValueTable};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print the non-zero entries of a value table with decoded states.
///
/// Entries whose indices fall outside `space` are printed without decoding.
pub fn print_nonzero_values(table: &ValueTable, space: &StateSpace) {
    let mut printed = 0;
    for (from, to, value) in table.nonzero() {
        let describe = |raw: usize| {
            space
                .check_index(raw)
                .and_then(|index| space.decode(index))
                .map(|values| format!("{values:?}"))
                .unwrap_or_else(|_| "?".to_string())
        };
        println!(
            "  {from:>5} -> {to:>5}  {value:>10.6}   {} -> {}",
            describe(from),
            describe(to)
        );
        printed += 1;
    }
    if printed == 0 {
        println!("  (all entries are zero)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(7), "7");
        assert_eq!(format_number(1728), "1,728");
        assert_eq!(format_number(2_985_984), "2,985,984");
    }
}
