//! List parameters, sort allow-list and the rating contract

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GalleryError, Result};

/// Sortable columns. Only these ever reach the ORDER BY clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    CreatedAt,
    Rating,
}

impl SortKey {
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::Rating => "rating",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filter, sort and pagination for the image list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub query: Option<String>,
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            query: None,
            page: 1,
            limit: 20,
            sort_by: SortKey::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl ListParams {
    /// Reject zero page numbers and page sizes; an empty query means no filter
    pub fn validated(mut self) -> Result<Self> {
        if self.page < 1 {
            return Err(GalleryError::InvalidRequest(
                "page must be greater than or equal to 1".to_string(),
            ));
        }
        if self.limit < 1 {
            return Err(GalleryError::InvalidRequest(
                "limit must be greater than or equal to 1".to_string(),
            ));
        }
        self.query = self.query.filter(|q| !q.is_empty());
        Ok(self)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Lowercased LIKE pattern with wildcards in the user text escaped
    pub fn like_pattern(&self) -> Option<String> {
        self.query.as_ref().map(|q| {
            let mut pattern = String::with_capacity(q.len() + 2);
            pattern.push('%');
            for c in q.to_lowercase().chars() {
                if matches!(c, '%' | '_' | '\\') {
                    pattern.push('\\');
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }
}

/// A user rating: integer from 0 to 5 inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 5;

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = GalleryError;

    fn try_from(value: i64) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Rating(value as u8))
        } else {
            Err(GalleryError::InvalidRating(value))
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(5)]
    fn test_rating_in_range(#[case] value: i64) {
        assert_eq!(i64::from(Rating::try_from(value).unwrap().value()), value);
    }

    #[rstest]
    #[case(-1)]
    #[case(6)]
    #[case(i64::MAX)]
    fn test_rating_out_of_range(#[case] value: i64) {
        assert!(matches!(
            Rating::try_from(value),
            Err(GalleryError::InvalidRating(v)) if v == value
        ));
    }

    #[test]
    fn test_offset() {
        let params = ListParams {
            page: 3,
            limit: 25,
            ..Default::default()
        };
        assert_eq!(params.offset(), 50);
        assert_eq!(ListParams::default().offset(), 0);
    }

    #[rstest]
    #[case(0, 20)]
    #[case(1, 0)]
    fn test_rejects_zero_page_or_limit(#[case] page: u32, #[case] limit: u32) {
        let params = ListParams {
            page,
            limit,
            ..Default::default()
        };
        assert!(matches!(
            params.validated(),
            Err(GalleryError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_empty_query_is_no_filter() {
        let params = ListParams {
            query: Some(String::new()),
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(params.like_pattern(), None);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let params = ListParams {
            query: Some("100%_Cyber\\".to_string()),
            ..Default::default()
        };
        assert_eq!(params.like_pattern().unwrap(), "%100\\%\\_cyber\\\\%");
    }

    #[test]
    fn test_sort_keys_deserialize() {
        let key: SortKey = serde_json::from_str("\"created_at\"").unwrap();
        assert_eq!(key, SortKey::CreatedAt);
        let order: SortOrder = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(order, SortOrder::Asc);
        assert!(serde_json::from_str::<SortKey>("\"filename; DROP TABLE images\"").is_err());
    }
}
