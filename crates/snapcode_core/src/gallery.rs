/// Filters stored filenames by a case-insensitive substring and sorts them
/// newest-first (descending by name).
///
/// An empty term keeps everything.
pub fn filter_listing<I>(names: I, term: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let term = term.to_lowercase();
    let mut files: Vec<String> = names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&term))
        .collect();
    files.sort_unstable_by(|a, b| b.cmp(a));
    files
}
