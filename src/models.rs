use serde::{Deserialize, Serialize};

use crate::utils::format_phone_number;

/// Directory entry (one advocate) / 目录条目（顾问）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advocate {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub degree: String,
    pub specialties: Vec<String>,
    pub years_of_experience: i64,
    pub phone_number: i64,
}

impl Advocate {
    /// Attach a backend-assigned id to a seed record / 为种子记录分配ID
    pub fn from_new(id: i64, new: NewAdvocate) -> Self {
        Self {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            city: new.city,
            degree: new.degree,
            specialties: new.specialties,
            years_of_experience: new.years_of_experience,
            phone_number: new.phone_number,
        }
    }

    /// Phone number as `(XXX) XXX-XXXX` / 格式化电话号码
    pub fn formatted_phone(&self) -> String {
        format_phone_number(self.phone_number)
    }
}

/// Advocate before insertion (no id yet) / 插入前的顾问记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdvocate {
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub degree: String,
    pub specialties: Vec<String>,
    pub years_of_experience: i64,
    pub phone_number: i64,
}

/// Pagination metadata returned alongside a page / 分页元数据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl Default for PaginationInfo {
    fn default() -> Self {
        Self {
            total: 0,
            page: 1,
            limit: crate::pagination::DEFAULT_LIMIT,
            total_pages: 0,
        }
    }
}

/// One page of matching advocates / 一页查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    pub records: Vec<Advocate>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl ResultPage {
    pub fn pagination(&self) -> PaginationInfo {
        PaginationInfo {
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }

    /// Rebuild a page from the wire shape / 从接口响应重建结果页
    pub fn from_parts(records: Vec<Advocate>, pagination: PaginationInfo) -> Self {
        Self {
            records,
            total: pagination.total,
            page: pagination.page,
            limit: pagination.limit,
            total_pages: pagination.total_pages,
        }
    }
}

/// Search criteria for one query / 单次查询条件
///
/// Categories are deduplicated on construction (first occurrence wins) and the
/// search text is trimmed. Page and limit are expected to be normalized already.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Criteria {
    pub search_text: String,
    pub categories: Vec<String>,
    pub page: u64,
    pub limit: u64,
}

impl Criteria {
    pub fn new(search_text: &str, categories: Vec<String>, page: u64, limit: u64) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(categories.len());
        for category in categories {
            if !unique.contains(&category) {
                unique.push(category);
            }
        }
        Self {
            search_text: search_text.trim().to_string(),
            categories: unique,
            page,
            limit,
        }
    }

    /// No text and no category filter / 无任何过滤条件
    pub fn is_unfiltered(&self) -> bool {
        self.search_text.is_empty() && self.categories.is_empty()
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_normalizes_input() {
        let criteria = Criteria::new(
            "  Smith ",
            vec!["Bipolar".to_string(), "LGBTQ".to_string(), "Bipolar".to_string()],
            2,
            10,
        );
        assert_eq!(criteria.search_text, "Smith");
        assert_eq!(criteria.categories, vec!["Bipolar", "LGBTQ"]);
        assert_eq!(criteria.offset(), 10);
        assert!(!criteria.is_unfiltered());
        assert!(Criteria::new("   ", vec![], 1, 10).is_unfiltered());
    }

    #[test]
    fn test_advocate_serializes_camel_case() {
        let advocate = Advocate {
            id: 1,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            city: "New York".to_string(),
            degree: "MD".to_string(),
            specialties: vec!["Bipolar".to_string()],
            years_of_experience: 10,
            phone_number: 5551234567,
        };
        let json = serde_json::to_value(&advocate).unwrap();
        assert_eq!(json["firstName"], "John");
        assert_eq!(json["yearsOfExperience"], 10);
        assert_eq!(json["phoneNumber"], 5551234567i64);
        assert_eq!(advocate.formatted_phone(), "(555) 123-4567");
    }
}
