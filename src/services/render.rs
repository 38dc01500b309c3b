//! Bounded text rendering for board bodies.
//!
//! Fragments are appended in fetch order until the next one would bring
//! the body to [`BODY_LIMIT`] characters or more; the rest are omitted with
//! no marker. An empty object list renders the board's empty-state text.
//! Both cases are reported in [`BodyOutcome`] so callers can log them.

/// Hard size limit of a payload body, in characters.
pub const BODY_LIMIT: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyOutcome {
    /// No objects; the body is the empty-state text.
    Empty,
    Complete,
    /// `omitted` trailing objects did not fit.
    Truncated { omitted: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    pub text: String,
    pub outcome: BodyOutcome,
}

/// Render `objects` with `template`, stopping before [`BODY_LIMIT`].
pub fn render_body<T>(objects: &[T], mut template: impl FnMut(&T) -> String, empty_text: &str) -> RenderedBody {
    if objects.is_empty() {
        return RenderedBody { text: empty_text.to_string(), outcome: BodyOutcome::Empty };
    }

    let mut text = String::new();
    let mut length = 0;
    for (index, object) in objects.iter().enumerate() {
        let fragment = template(object);
        let fragment_length = fragment.chars().count();
        if length + fragment_length >= BODY_LIMIT {
            return RenderedBody { text, outcome: BodyOutcome::Truncated { omitted: objects.len() - index } };
        }
        text.push_str(&fragment);
        length += fragment_length;
    }

    RenderedBody { text, outcome: BodyOutcome::Complete }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
