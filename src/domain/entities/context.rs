use crate::domain::SearchResult;

/// Joins retrieved chunk texts, in rank order, one per line.
///
/// Stops at the first chunk that would push the total (separators included)
/// past `max_chars`; that chunk and everything ranked below it are left out
/// rather than truncated.
pub fn assemble_context(results: &[SearchResult], max_chars: usize) -> String {
    assemble_context_with_count(results, max_chars).0
}

/// Same as [`assemble_context`], also returning how many leading results made
/// it into the context.
pub fn assemble_context_with_count(results: &[SearchResult], max_chars: usize) -> (String, usize) {
    let mut context = String::new();
    let mut used = 0;
    let mut kept = 0;

    for result in results {
        let text = result.chunk.text.as_str();
        let separator = usize::from(kept > 0);
        let needed = separator + text.chars().count();

        if used + needed > max_chars {
            break;
        }

        if separator == 1 {
            context.push('\n');
        }
        context.push_str(text);
        used += needed;
        kept += 1;
    }

    (context, kept)
}
