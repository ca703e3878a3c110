mod category_repository;
mod quiz_repository;
mod tag_repository;
mod topic_repository;
mod video_asset_repository;

pub use category_repository::CategoryRepository;
pub use quiz_repository::QuizRepository;
pub use tag_repository::TagRepository;
pub use topic_repository::{
    TopicFilter, TopicRepository, CATEGORY_PAGE_SIZE, COURSE_PAGE_SIZE, RECENT_LIMIT,
    SEARCH_PAGE_SIZE,
};
pub use video_asset_repository::VideoAssetRepository;

/// `%needle%` for a `LIKE ... ESCAPE '\'` clause, with the wildcards in
/// `needle` matched literally.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(contains_pattern("timeout"), "%timeout%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b\\c"), "%a\\_b\\\\c%");
    }
}
