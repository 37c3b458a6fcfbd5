//! Name collation used for name sorting and folder trees

use std::cmp::Ordering;

/// Compare two names for display ordering.
///
/// Case-insensitive natural order ("image2" < "image10"), with the raw
/// strings as a final tiebreak so the order is total.
pub fn collate_names(a: &str, b: &str) -> Ordering {
    natural_cmp(a, b).then_with(|| a.cmp(b))
}

/// Case-insensitive natural comparison
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_sort_key(a).cmp(&natural_sort_key(b))
}

/// Generate a natural sort key (handles numbers correctly)
/// "image2.jpg" < "image10.jpg"
fn natural_sort_key(s: &str) -> Vec<NaturalSortPart> {
    let mut parts = Vec::new();
    let mut current_num = String::new();
    let mut current_str = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            if !current_str.is_empty() {
                parts.push(NaturalSortPart::Str(fold(&current_str)));
                current_str.clear();
            }
            current_num.push(c);
        } else {
            if !current_num.is_empty() {
                parts.push(number_part(&current_num));
                current_num.clear();
            }
            current_str.push(c);
        }
    }

    if !current_num.is_empty() {
        parts.push(number_part(&current_num));
    }
    if !current_str.is_empty() {
        parts.push(NaturalSortPart::Str(fold(&current_str)));
    }

    parts
}

fn number_part(digits: &str) -> NaturalSortPart {
    // Runs too long for u64 fall back to string comparison
    match digits.parse::<u64>() {
        Ok(n) => NaturalSortPart::Num(n),
        Err(_) => NaturalSortPart::Str(digits.to_string()),
    }
}

/// Case folding with common Latin accents stripped, so "Élan" sorts next to "elan"
fn fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NaturalSortPart {
    Num(u64),
    Str(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_sort() {
        let mut names = vec!["image10.jpg", "image2.jpg", "image1.jpg", "image20.jpg"];
        names.sort_by(|a, b| collate_names(a, b));
        assert_eq!(names, vec!["image1.jpg", "image2.jpg", "image10.jpg", "image20.jpg"]);
    }

    #[test]
    fn test_case_and_accents() {
        assert_eq!(natural_cmp("Banana", "apple"), Ordering::Greater);
        assert_eq!(natural_cmp("Élan", "elan"), Ordering::Equal);
        // still a total order
        assert_ne!(collate_names("Élan", "elan"), Ordering::Equal);
    }

    #[test]
    fn test_huge_numbers() {
        let big = "file99999999999999999999999.txt";
        assert_eq!(collate_names(big, big), Ordering::Equal);
    }
}
