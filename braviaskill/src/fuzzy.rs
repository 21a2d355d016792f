//! Resolves a spoken application name against the cached application list.

use braviacontrol::AppEntry;
use strsim::sorensen_dice;

/// Minimum similarity for a title to be considered at all.
pub const MATCH_THRESHOLD: f64 = 0.5;

/// Similarity in `[0, 1]`, case-insensitive.
pub fn similarity(spoken: &str, title: &str) -> f64 {
    sorensen_dice(&spoken.trim().to_lowercase(), &title.trim().to_lowercase())
}

/// Picks the application `spoken` most likely refers to.
///
/// Titles scoring below [`MATCH_THRESHOLD`] are discarded. Among the rest,
/// a title containing the spoken text (or contained in it) wins; otherwise
/// the best score wins, ties going to the earlier entry.
///
/// The fallback is the best-scoring title, not the first one in list order.
pub fn match_application<'a>(spoken: &str, applications: &'a [AppEntry]) -> Option<&'a AppEntry> {
    let wanted = spoken.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    let mut candidates: Vec<(f64, &AppEntry)> = applications
        .iter()
        .map(|app| (similarity(&wanted, &app.title), app))
        .filter(|(score, _)| *score >= MATCH_THRESHOLD)
        .collect();
    // sort_by is stable
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

    candidates
        .iter()
        .find(|(_, app)| {
            let title = app.title.to_lowercase();
            title.contains(&wanted) || wanted.contains(&title)
        })
        .or_else(|| candidates.first())
        .map(|(_, app)| *app)
}
