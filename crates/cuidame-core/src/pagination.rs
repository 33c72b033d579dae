//! Pagination for list endpoints.
//!
//! Supports offset-based (`limite` + `desplazamiento`) and page-based (`limite` + `pagina`)
//! pagination. When `pagina` is present it takes precedence over `desplazamiento`.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

/// Query strings may carry empty values (`?limite=`), which mean "not set".
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Items per page (1-100, default 20)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limite: Option<i64>,
    /// Items to skip (ignored when `pagina` is set)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub desplazamiento: Option<i64>,
    /// Page number, 1-indexed
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub pagina: Option<i64>,
}

impl PaginationParams {
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limite.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        if let Some(page) = self.pagina {
            (page.max(1) - 1).saturating_mul(self.limit())
        } else {
            self.desplazamiento.unwrap_or(0).max(0)
        }
    }

    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.pagina.map(|p| p.max(1))
    }

    /// Builds the response metadata once the total row count is known.
    pub fn meta(&self, total: i64) -> PaginationMeta {
        let limit = self.limit();
        let offset = self.offset();
        PaginationMeta {
            total,
            limite: limit,
            desplazamiento: offset,
            pagina: self.page(),
            hay_mas: offset.saturating_add(limit) < total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    pub total: i64,
    pub limite: i64,
    pub desplazamiento: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagina: Option<i64>,
    pub hay_mas: bool,
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub elementos: Vec<T>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(
        limite: Option<i64>,
        desplazamiento: Option<i64>,
        pagina: Option<i64>,
    ) -> PaginationParams {
        PaginationParams {
            limite,
            desplazamiento,
            pagina,
        }
    }

    #[test]
    fn test_defaults() {
        let p = PaginationParams::default();
        assert_eq!(p.limit(), DEFAULT_LIMIT);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.page(), None);
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(params(Some(0), None, None).limit(), 1);
        assert_eq!(params(Some(500), None, None).limit(), MAX_LIMIT);
        assert_eq!(params(Some(-3), None, None).limit(), 1);
    }

    #[test]
    fn test_page_takes_precedence_over_offset() {
        let p = params(Some(10), Some(5), Some(3));
        assert_eq!(p.offset(), 20);
        assert_eq!(p.page(), Some(3));
    }

    #[test]
    fn test_negative_offset_and_page_are_clamped() {
        assert_eq!(params(None, Some(-10), None).offset(), 0);
        assert_eq!(params(Some(10), None, Some(-2)).offset(), 0);
    }

    #[test]
    fn test_meta_has_more() {
        let p = params(Some(10), Some(0), None);
        assert!(p.meta(25).hay_mas);
        let p = params(Some(10), Some(20), None);
        assert!(!p.meta(25).hay_mas);
    }

    #[test]
    fn test_huge_values_saturate() {
        let p = params(Some(100), None, Some(i64::MAX));
        assert_eq!(p.offset(), i64::MAX);
        assert!(!p.meta(5).hay_mas);

        let p = params(Some(100), Some(i64::MAX), None);
        assert_eq!(p.offset(), i64::MAX);
        let meta = p.meta(5);
        assert_eq!(meta.desplazamiento, i64::MAX);
        assert!(!meta.hay_mas);
    }

    #[test]
    fn test_empty_query_values_are_none() {
        let p: PaginationParams =
            serde_json::from_str(r#"{"limite":"","desplazamiento":"5"}"#).unwrap();
        assert_eq!(p.limite, None);
        assert_eq!(p.desplazamiento, Some(5));
    }
}
