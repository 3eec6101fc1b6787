//! Type-name helpers for human-friendly error messages.
//!
//! Rust's `std::any::type_name` yields fully qualified paths like
//! `alloc::sync::Arc<dyn my_app::traits::Logger>`. These helpers shorten
//! them for display and score near-misses for "did you mean?" output.

/// Shortens a fully qualified type name for display.
///
/// Each path segment is reduced to its final component while generic
/// brackets, tuples and slices stay intact.
///
/// ```
/// use silsila_support::names::shorten_type_name;
///
/// assert_eq!(
///     shorten_type_name("my_app::services::user::UserService"),
///     "UserService"
/// );
/// assert_eq!(
///     shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>"),
///     "Arc<dyn Logger>"
/// );
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut segment_start = 0;

    for (i, ch) in full_name.char_indices() {
        match ch {
            // `::` arrives as two separate colons; each one simply moves
            // the segment start forward, discarding the path prefix.
            ':' => segment_start = i + 1,
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' => {
                result.push_str(&full_name[segment_start..i]);
                result.push(ch);
                segment_start = i + 1;
            }
            _ => {}
        }
    }

    result.push_str(&full_name[segment_start..]);
    result
}

/// Picks up to `max_suggestions` names from `available` that look like
/// plausible intended targets for `requested`.
///
/// Scoring: full-name containment beats short-name containment beats a
/// shared prefix of at least three characters. Ties keep input order.
pub fn suggest_similar(
    requested: &str,
    available: &[&str],
    max_suggestions: usize,
) -> Vec<String> {
    let requested_lower = requested.to_lowercase();
    let requested_short = shorten_type_name(requested).to_lowercase();

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter_map(|&name| {
            if name == requested {
                return None;
            }
            let name_lower = name.to_lowercase();
            let name_short = shorten_type_name(name).to_lowercase();

            if name_lower.contains(&requested_lower) || requested_lower.contains(&name_lower) {
                return Some((name, 100));
            }

            if name_short.contains(&requested_short) || requested_short.contains(&name_short) {
                return Some((name, 80));
            }

            let common_prefix = name_short
                .chars()
                .zip(requested_short.chars())
                .take_while(|(a, b)| a == b)
                .count();

            (common_prefix >= 3).then_some((name, common_prefix * 10))
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}
