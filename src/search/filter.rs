//! Filter predicate builder / 过滤条件构建
//!
//! One `Filter` is built per query and evaluated either in memory
//! (`matches`) or in the store (`to_sql`). Both evaluations cover the same
//! fields with the same rules:
//!
//! - text: case-insensitive substring over first name, last name, city,
//!   degree, every specialty and the decimal years of experience; `%`, `_` and
//!   `\` are literal. Case folding is Unicode lowercasing (`fold_case`); the
//!   store matches against `*_lower` columns filled with the same folding.
//! - categories: the record has at least one of the requested specialties
//!   (exact tag equality)
//!
//! Text and categories are combined with AND; an absent part matches all.

use crate::models::{Advocate, Criteria};
use crate::utils::{contains_pattern, fold_case};

/// Immutable match predicate / 不可变的匹配条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Trimmed, case-folded search text; `None` means no text filter
    needle: Option<String>,
    categories: Vec<String>,
}

/// Store-side predicate: WHERE fragment plus positional binds / SQL条件片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlPredicate {
    pub clause: String,
    pub binds: Vec<String>,
}

/// Case-folded text columns searched in the store, in bind order
const TEXT_COLUMNS: &[&str] = &["first_name_lower", "last_name_lower", "city_lower", "degree_lower"];

impl Filter {
    pub fn new(search_text: &str, categories: &[String]) -> Self {
        let trimmed = search_text.trim();
        let needle = (!trimmed.is_empty()).then(|| fold_case(trimmed));

        let mut unique: Vec<String> = Vec::with_capacity(categories.len());
        for category in categories {
            if !unique.contains(category) {
                unique.push(category.clone());
            }
        }

        Self { needle, categories: unique }
    }

    pub fn from_criteria(criteria: &Criteria) -> Self {
        Self::new(&criteria.search_text, &criteria.categories)
    }

    /// Neither text nor categories restrict the result / 无过滤
    pub fn is_match_all(&self) -> bool {
        self.needle.is_none() && self.categories.is_empty()
    }

    pub fn needle(&self) -> Option<&str> {
        self.needle.as_deref()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Evaluate against one record in memory / 内存中判断是否匹配
    pub fn matches(&self, advocate: &Advocate) -> bool {
        self.matches_text(advocate) && self.matches_categories(advocate)
    }

    fn matches_text(&self, advocate: &Advocate) -> bool {
        let Some(needle) = self.needle.as_deref() else {
            return true;
        };
        let contains = |field: &str| fold_case(field).contains(needle);

        contains(&advocate.first_name)
            || contains(&advocate.last_name)
            || contains(&advocate.city)
            || contains(&advocate.degree)
            || advocate.specialties.iter().any(|s| contains(s))
            || advocate.years_of_experience.to_string().contains(needle)
    }

    fn matches_categories(&self, advocate: &Advocate) -> bool {
        self.categories.is_empty()
            || advocate.specialties.iter().any(|s| self.categories.contains(s))
    }

    /// Render as a WHERE fragment over the `advocates` table / 生成SQL条件
    pub fn to_sql(&self) -> SqlPredicate {
        let mut clauses: Vec<String> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        if let Some(needle) = self.needle.as_deref() {
            let pattern = contains_pattern(needle);
            let mut alternatives: Vec<String> = TEXT_COLUMNS
                .iter()
                .map(|column| format!(r"{} LIKE ? ESCAPE '\'", column))
                .collect();
            alternatives.push(r"CAST(years_of_experience AS TEXT) LIKE ? ESCAPE '\'".to_string());
            alternatives.push(
                r"EXISTS (SELECT 1 FROM json_each(advocates.specialties_lower) WHERE json_each.value LIKE ? ESCAPE '\')"
                    .to_string(),
            );
            for _ in 0..alternatives.len() {
                binds.push(pattern.clone());
            }
            clauses.push(format!("({})", alternatives.join(" OR ")));
        }

        if !self.categories.is_empty() {
            let placeholders = vec!["?"; self.categories.len()].join(", ");
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM json_each(advocates.specialties) WHERE json_each.value IN ({}))",
                placeholders
            ));
            binds.extend(self.categories.iter().cloned());
        }

        let clause = if clauses.is_empty() {
            "1 = 1".to_string()
        } else {
            clauses.join(" AND ")
        };
        SqlPredicate { clause, binds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advocate(first: &str, city: &str, specialties: &[&str], years: i64) -> Advocate {
        Advocate {
            id: 1,
            first_name: first.to_string(),
            last_name: "Doe".to_string(),
            city: city.to_string(),
            degree: "MD".to_string(),
            specialties: specialties.iter().map(|s| s.to_string()).collect(),
            years_of_experience: years,
            phone_number: 5551234567,
        }
    }

    fn cats(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = Filter::new("   ", &[]);
        assert!(filter.is_match_all());
        assert!(filter.matches(&advocate("John", "Austin", &[], 0)));
        assert_eq!(filter.to_sql(), SqlPredicate { clause: "1 = 1".to_string(), binds: vec![] });
    }

    #[test]
    fn test_text_is_case_insensitive_substring() {
        let a = advocate("John", "New York", &["Bipolar"], 12);
        assert!(Filter::new("JOH", &[]).matches(&a));
        assert!(Filter::new("york", &[]).matches(&a));
        assert!(Filter::new("md", &[]).matches(&a));
        assert!(Filter::new("doe", &[]).matches(&a));
        assert!(!Filter::new("Chicago", &[]).matches(&a));
    }

    #[test]
    fn test_text_matches_specialties_and_years() {
        let a = advocate("John", "Austin", &["Trauma & PTSD"], 12);
        assert!(Filter::new("ptsd", &[]).matches(&a));
        assert!(Filter::new("12", &[]).matches(&a));
        assert!(Filter::new("2", &[]).matches(&a));
        assert!(!Filter::new("13", &[]).matches(&a));
    }

    #[test]
    fn test_wildcards_are_literal() {
        let a = advocate("John", "Austin", &[], 1);
        assert!(!Filter::new("%", &[]).matches(&a));
        assert!(!Filter::new("J_hn", &[]).matches(&a));
        assert!(Filter::new("J%", &[]).to_sql().binds.iter().all(|b| b == r"%j\%%"));
    }

    #[test]
    fn test_categories_use_or_semantics() {
        let filter = Filter::new("", &cats(&["Cardiology", "Oncology"]));
        assert!(filter.matches(&advocate("A", "B", &["Cardiology"], 1)));
        assert!(!filter.matches(&advocate("A", "B", &["Neurology"], 1)));
        assert!(!filter.matches(&advocate("A", "B", &[], 1)));
    }

    #[test]
    fn test_categories_are_exact_tags() {
        let filter = Filter::new("", &cats(&["bipolar"]));
        assert!(!filter.matches(&advocate("A", "B", &["Bipolar"], 1)));
    }

    #[test]
    fn test_text_and_categories_combine_with_and() {
        let filter = Filter::new("john", &cats(&["LGBTQ"]));
        assert!(filter.matches(&advocate("John", "B", &["LGBTQ"], 1)));
        assert!(!filter.matches(&advocate("John", "B", &["Bipolar"], 1)));
        assert!(!filter.matches(&advocate("Jane", "B", &["LGBTQ"], 1)));
    }

    #[test]
    fn test_text_folds_non_ascii_case() {
        let a = advocate("Émile", "Ünna", &["Thérapie"], 3);
        assert!(Filter::new("émile", &[]).matches(&a));
        assert!(Filter::new("ÉMILE", &[]).matches(&a));
        assert!(Filter::new("ü", &[]).matches(&a));
        assert!(Filter::new("THÉRAPIE", &[]).matches(&a));
        assert_eq!(Filter::new("ÉMILE", &[]).needle(), Some("émile"));
    }

    #[test]
    fn test_duplicate_categories_are_dropped() {
        let filter = Filter::new("", &cats(&["A", "B", "A"]));
        assert_eq!(filter.categories(), &["A".to_string(), "B".to_string()]);
        assert_eq!(filter.to_sql().binds.len(), 2);
    }

    #[test]
    fn test_sql_binds_follow_placeholders() {
        let sql = Filter::new("x", &cats(&["A", "B"])).to_sql();
        assert_eq!(sql.clause.matches('?').count(), sql.binds.len());
        assert_eq!(sql.binds.len(), 6 + 2);
        assert!(sql.clause.contains(" AND "));
    }
}
