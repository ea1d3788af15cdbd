//! Tag selection from operator input.

/// Sort tags the way they are offered to the operator.
pub fn sorted_tags(mut tags: Vec<String>) -> Vec<String> {
    tags.sort();
    tags.dedup();
    tags
}

/// Resolve operator input against the known tags.
///
/// `tags` must already be sorted (see [`sorted_tags`]); numeric input is a
/// 1-based index into it. Resolution order: blank input, index, exact name,
/// prefix, then the input itself as a new tag. When several tags share the
/// typed prefix the first one in list order is taken.
pub fn choose_tag(input: &str, tags: &[String], default: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return default.to_string();
    }

    if let Ok(index) = input.parse::<usize>() {
        if (1..=tags.len()).contains(&index) {
            return tags[index - 1].clone();
        }
    }

    if let Some(exact) = tags.iter().find(|tag| tag.as_str() == input) {
        return exact.clone();
    }

    let mut candidates = tags.iter().filter(|tag| tag.starts_with(input));
    match candidates.next() {
        Some(first) => {
            if candidates.next().is_some() {
                tracing::debug!(input, chosen = %first, "Ambiguous tag prefix");
            }
            first.clone()
        }
        None => input.to_string(),
    }
}
