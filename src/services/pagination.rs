//! Offset pagination with an optional case-insensitive substring filter.
//!
//! Every listing endpoint goes through [`paginate`], so the limit clamp, the
//! search threshold and the page arithmetic are identical everywhere.

use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbBackend, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect,
    sea_query::{BinOper, Expr, Func, LikeExpr},
};
use serde::Serialize;
use utoipa::ToSchema;

pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 100;

/// Searches shorter than this (after trimming) match every record.
pub const MIN_SEARCH_LEN: usize = 3;

const LIKE_ESCAPE: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageInfo {
    /// Records matching the filter across the whole collection
    pub total: u64,
    pub num_pages: u64,
    /// 1-based
    pub current_page: u64,
    pub per_page: u64,
}

impl PageInfo {
    pub fn new(total: u64, skip: u64, limit: u64) -> Self {
        Self {
            total,
            num_pages: total.div_ceil(limit),
            current_page: skip / limit + 1,
            per_page: limit,
        }
    }
}

pub fn clamp_limit(limit: i64) -> u64 {
    limit.clamp(MIN_LIMIT, MAX_LIMIT) as u64
}

/// Offset for a 1-based page. Pages below 1 are read as the first page.
pub fn skip_for(page: i64, limit: u64) -> u64 {
    (page.max(1) as u64 - 1).saturating_mul(limit)
}

/// Folded form of a searchable value, stored next to it on insert.
///
/// SQLite's `LOWER()` only folds ASCII, so searches run against this
/// column instead of folding the original at query time.
pub fn search_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Escapes LIKE wildcards so the search text is matched literally.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

pub fn search_condition<C: ColumnTrait>(backend: DbBackend, column: C, search: &str) -> Condition {
    let term = search.trim();
    if term.chars().count() < MIN_SEARCH_LEN {
        return Condition::all();
    }

    let pattern = format!("%{}%", escape_like(term));
    match backend {
        DbBackend::Postgres => Condition::all().add(
            Expr::col(column).binary(BinOper::Custom("ILIKE"), Expr::val(pattern)),
        ),
        _ => Condition::all().add(
            Expr::expr(Func::lower(Expr::col(column)))
                .like(LikeExpr::new(pattern.to_lowercase()).escape(LIKE_ESCAPE)),
        ),
    }
}

/// Returns one page of `E` filtered on `column`, plus the page metadata.
///
/// `column` should hold [`search_key`] values for matching to ignore
/// non-ASCII case on every backend.
pub async fn paginate<E, C, D>(
    db: &D,
    column: C,
    search: &str,
    limit: i64,
    page: i64,
) -> Result<(PageInfo, Vec<E::Model>), DbErr>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
    C: ColumnTrait,
    D: ConnectionTrait,
{
    let limit = clamp_limit(limit);
    let skip = skip_for(page, limit);
    let condition = search_condition(db.get_database_backend(), column, search);

    let results = E::find()
        .filter(condition.clone())
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?;
    let total = E::find().filter(condition).count(db).await?;

    Ok((PageInfo::new(total, skip, limit), results))
}
