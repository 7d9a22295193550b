//! Shared plumbing for the listing search endpoints: lenient query-string
//! coercion and pagination math used by both the job and service catalogs.

/// Coerce a raw `page` parameter. Non-numeric, zero or negative values fall
/// back to page 1 instead of being rejected; this leniency is intentional.
pub fn coerce_page(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .map(|p| p.min(u32::MAX as i64) as u32)
        .unwrap_or(1)
}

/// Coerce a raw price/budget bound. Unparseable input is treated as absent,
/// never rejected.
pub fn coerce_price(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite())
}

/// Escape the LIKE metacharacters in a free-text query so it matches as a
/// literal substring. `\` is Postgres's default LIKE escape character.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Split a comma-separated skill list, dropping blanks.
pub fn split_skills(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Pagination metadata: `(total_pages, has_more)`.
///
/// `total_pages` is `ceil(total / page_size)` (0 when nothing matches) and
/// `has_more` compares against the requested page, which is echoed back
/// unclamped — asking for a page past the end yields an empty result, not
/// an error.
pub fn page_meta(total: i64, page: u32, page_size: u32) -> (u32, bool) {
    let total_pages = (total.max(0) as u64).div_ceil(page_size as u64) as u32;
    (total_pages, page < total_pages)
}

/// Row offset for a 1-based page.
pub fn page_offset(page: u32, page_size: u32) -> i64 {
    (page as i64 - 1) * page_size as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_coercion_is_lenient() {
        assert_eq!(coerce_page(None), 1);
        assert_eq!(coerce_page(Some("0")), 1);
        assert_eq!(coerce_page(Some("-3")), 1);
        assert_eq!(coerce_page(Some("abc")), 1);
        assert_eq!(coerce_page(Some("")), 1);
        assert_eq!(coerce_page(Some("7")), 7);
        assert_eq!(coerce_page(Some(" 2 ")), 2);
    }

    #[test]
    fn price_coercion_treats_garbage_as_absent() {
        assert_eq!(coerce_price(None), None);
        assert_eq!(coerce_price(Some("cheap")), None);
        assert_eq!(coerce_price(Some("NaN")), None);
        assert_eq!(coerce_price(Some("12")), Some(12.0));
        assert_eq!(coerce_price(Some("5.5")), Some(5.5));
    }

    #[test]
    fn like_metacharacters_are_escaped_to_literals() {
        assert_eq!(escape_like("logo"), "logo");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn skills_split_drops_blanks() {
        assert_eq!(split_skills(None), Vec::<String>::new());
        assert_eq!(split_skills(Some("")), Vec::<String>::new());
        assert_eq!(
            split_skills(Some("Illustrator, Figma,,  Rust ")),
            vec!["Illustrator", "Figma", "Rust"]
        );
    }

    #[test]
    fn page_meta_handles_empty_and_partial_pages() {
        assert_eq!(page_meta(0, 1, 10), (0, false));
        assert_eq!(page_meta(10, 1, 10), (1, false));
        assert_eq!(page_meta(11, 1, 10), (2, true));
        assert_eq!(page_meta(25, 2, 10), (3, true));
        assert_eq!(page_meta(25, 3, 10), (3, false));
    }

    #[test]
    fn out_of_range_page_never_reports_more() {
        let (total_pages, has_more) = page_meta(25, 99, 10);
        assert_eq!(total_pages, 3);
        assert!(!has_more);
    }

    #[test]
    fn offsets_are_one_based() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(2, 10), 10);
        assert_eq!(page_offset(3, 12), 24);
    }

    #[test]
    fn extreme_pages_widen_before_multiplying() {
        assert_eq!(
            page_offset(u32::MAX, 100),
            (u32::MAX as i64 - 1) * 100
        );
    }
}
