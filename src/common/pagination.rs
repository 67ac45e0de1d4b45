// src/common/pagination.rs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// Query string padrão: ?page=1&limit=20
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    const DEFAULT_LIMIT: i64 = 20;
    const MAX_LIMIT: i64 = 100;

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

// Envelope de resposta paginada: { data: [...], pagination: {...} }
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, params: &PageParams) -> Self {
        let limit = params.limit();
        // Divisão arredondando para cima; 0 itens = 0 páginas
        let pages = (total + limit - 1) / limit;
        Self {
            data,
            pagination: PageInfo {
                total,
                page: params.page(),
                limit,
                pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, limit: Option<i64>) -> PageParams {
        PageParams { page, limit }
    }

    #[test]
    fn defaults_sao_pagina_1_limite_20() {
        let p = params(None, None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 20);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn limite_e_truncado_no_maximo() {
        let p = params(Some(2), Some(500));
        assert_eq!(p.limit(), 100);
        assert_eq!(p.offset(), 100);
    }

    #[test]
    fn pagina_zero_vira_um() {
        let p = params(Some(0), Some(10));
        assert_eq!(p.page(), 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn total_de_paginas_arredonda_para_cima() {
        let p = params(Some(1), Some(10));
        let res = Paginated::new(vec![1, 2, 3], 21, &p);
        assert_eq!(res.pagination.pages, 3);

        let res = Paginated::new(Vec::<i32>::new(), 0, &p);
        assert_eq!(res.pagination.pages, 0);

        let res = Paginated::new(vec![1], 20, &p);
        assert_eq!(res.pagination.pages, 2);
    }
}
