use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::IntoParams;

pub const MAX_LIMIT: i64 = 500;
pub const MAX_PAGE: i64 = i64::MAX / MAX_LIMIT;

// Parámetros de listado. Llegan como texto para tolerar valores no numéricos.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub q: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: i64,
    pub offset: i64,
}

impl ListQuery {
    /// Término de búsqueda recortado; vacío cuenta como ausente.
    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Ventana de paginación: solo existe cuando `limit` es un entero positivo,
    /// y se acota a `MAX_LIMIT`.
    pub fn window(&self) -> Option<Window> {
        let limit = self.limit.as_deref()?.trim().parse::<i64>().ok()?;
        if limit <= 0 {
            return None;
        }
        let offset = self
            .offset
            .as_deref()
            .and_then(|o| o.trim().parse::<i64>().ok())
            .unwrap_or(0)
            .max(0);

        Some(Window {
            limit: limit.min(MAX_LIMIT),
            offset,
        })
    }
}

/// Patrón para `ILIKE`.
pub fn like_pattern(term: &str) -> String {
    format!("%{}%", term)
}

// Las dos formas de respuesta de un listado.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    All(Vec<Value>),
    Page { rows: Vec<Value>, total: i64 },
}

// Paginación por página de los logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl PageInfo {
    pub fn new(page: Option<i64>, limit: Option<i64>, total: i64) -> Self {
        // El tope de página mantiene `offset` dentro de i64.
        let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
        let limit = limit.unwrap_or(50).clamp(1, MAX_LIMIT);
        let pages = (total + limit - 1) / limit;
        Self { page, limit, total, pages }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(limit: Option<&str>, offset: Option<&str>) -> ListQuery {
        ListQuery {
            q: None,
            limit: limit.map(String::from),
            offset: offset.map(String::from),
        }
    }

    #[test]
    fn no_window_without_positive_limit() {
        assert_eq!(query(None, None).window(), None);
        assert_eq!(query(Some("0"), None).window(), None);
        assert_eq!(query(Some("-3"), Some("10")).window(), None);
        assert_eq!(query(Some("abc"), None).window(), None);
    }

    #[test]
    fn limit_is_capped_and_offset_floored() {
        assert_eq!(
            query(Some("9000"), Some("-4")).window(),
            Some(Window { limit: MAX_LIMIT, offset: 0 })
        );
        assert_eq!(
            query(Some("25"), Some("50")).window(),
            Some(Window { limit: 25, offset: 50 })
        );
    }

    #[test]
    fn blank_search_is_ignored() {
        let q = ListQuery { q: Some("   ".into()), ..Default::default() };
        assert_eq!(q.search(), None);
        let q = ListQuery { q: Some(" acid ".into()), ..Default::default() };
        assert_eq!(q.search(), Some("acid"));
    }

    #[test]
    fn listing_shapes_serialize_as_array_or_object() {
        let all = Listing::All(vec![json!({ "id": 1 })]);
        assert_eq!(serde_json::to_value(&all).unwrap(), json!([{ "id": 1 }]));

        let page = Listing::Page { rows: vec![json!({ "id": 1 })], total: 7 };
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            json!({ "rows": [{ "id": 1 }], "total": 7 })
        );
    }

    #[test]
    fn page_info_computes_pages() {
        let info = PageInfo::new(Some(2), Some(50), 101);
        assert_eq!(info.pages, 3);
        assert_eq!(info.offset(), 50);

        let defaults = PageInfo::new(None, None, 0);
        assert_eq!((defaults.page, defaults.limit, defaults.pages), (1, 50, 0));
    }

    #[test]
    fn huge_page_does_not_overflow_offset() {
        let info = PageInfo::new(Some(i64::MAX), Some(MAX_LIMIT), 0);
        assert_eq!(info.page, MAX_PAGE);
        assert!(info.offset() >= 0);
        assert_eq!(info.offset(), (MAX_PAGE - 1) * MAX_LIMIT);

        let info = PageInfo::new(Some(i64::MIN), Some(i64::MAX), 10);
        assert_eq!((info.page, info.limit, info.offset()), (1, MAX_LIMIT, 0));
    }
}
