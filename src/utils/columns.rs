use std::collections::HashSet;

/// Trims surrounding whitespace and turns every remaining space into an underscore.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().replace(' ', "_")
}

pub fn is_normalized(name: &str) -> bool {
    normalize_column_name(name) == name
}

/// Drops repeated names, keeping the first occurrence of each.
pub fn uniq_names(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// Splits a comma-separated column list, ignoring blanks.
pub fn split_column_list(s: &str) -> Vec<String> {
    let names: Vec<String> = s
        .split(',')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();
    uniq_names(&names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_interior_spaces() {
        assert_eq!(normalize_column_name("Customer ID"), "Customer_ID");
        assert_eq!(normalize_column_name("Date Of Birth"), "Date_Of_Birth");
    }

    #[test]
    fn test_normalize_surrounding_whitespace() {
        assert_eq!(normalize_column_name(" Name"), "Name");
        assert_eq!(normalize_column_name("\tName \n"), "Name");
        assert_eq!(normalize_column_name("  Join Date  "), "Join_Date");
    }

    #[test]
    fn test_normalize_keeps_clean_names() {
        assert_eq!(normalize_column_name("CustomerID"), "CustomerID");
        assert!(is_normalized("CustomerID"));
        assert!(!is_normalized("Customer ID"));
        assert!(!is_normalized(" CustomerID"));
    }

    #[test]
    fn test_normalize_consecutive_spaces() {
        assert_eq!(normalize_column_name("a  b"), "a__b");
    }

    #[test]
    fn test_uniq_names_preserves_first_occurrence() {
        let names = vec![
            "LoyaltyID".to_string(),
            "DateTime".to_string(),
            "LoyaltyID".to_string(),
        ];
        assert_eq!(uniq_names(&names), vec!["LoyaltyID", "DateTime"]);
    }

    #[test]
    fn test_split_column_list() {
        assert_eq!(
            split_column_list("LoyaltyID, DateTime"),
            vec!["LoyaltyID", "DateTime"]
        );
        assert_eq!(split_column_list("a,,b,a"), vec!["a", "b"]);
        assert!(split_column_list(" , ").is_empty());
    }
}
