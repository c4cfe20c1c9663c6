//! Ordered image lists as edited in the admin form.
//!
//! The list lives in the form as a comma-separated string; these helpers
//! normalize it, merge fresh uploads into it and reorder it. Nothing here
//! touches the object store, so removing an entry leaves the stored object
//! in place.

use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryAction {
    Up,
    Down,
    Remove,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Gallery(Vec<String>);

impl Gallery {
    /// Splits on commas, trims each entry and drops empty ones.
    pub fn parse(text: &str) -> Self {
        Self::from_urls(text.split(','))
    }

    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Gallery(
            urls.into_iter()
                .map(|url| url.as_ref().trim().to_string())
                .filter(|url| !url.is_empty())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Form representation, e.g. `"a.jpg, b.jpg"`.
    pub fn to_field(&self) -> String {
        self.0.join(", ")
    }

    pub fn extend(&mut self, urls: impl IntoIterator<Item = String>) {
        self.0.extend(urls);
    }

    /// Applies an edit at `index`. Returns false when the edit does not
    /// apply (index out of range, or a move past either end).
    pub fn apply(&mut self, action: GalleryAction, index: usize) -> bool {
        match action {
            GalleryAction::Up => index > 0 && self.swap(index, index - 1),
            GalleryAction::Down => index
                .checked_add(1)
                .is_some_and(|next| self.swap(index, next)),
            GalleryAction::Remove => {
                if index < self.0.len() {
                    self.0.remove(index);
                    true
                } else {
                    false
                }
            }
        }
    }

    fn swap(&mut self, a: usize, b: usize) -> bool {
        if a >= self.0.len() || b >= self.0.len() {
            return false;
        }
        self.0.swap(a, b);
        true
    }
}

/// First image of a listing, or the placeholder when it has none.
pub fn cover_image(images: &[String]) -> &str {
    images.first().map(String::as_str).unwrap_or(PLACEHOLDER_IMAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(gallery: &Gallery) -> Vec<&str> {
        gallery.0.iter().map(String::as_str).collect()
    }

    #[test]
    fn parse_drops_blank_entries_and_trims() {
        let gallery = Gallery::parse("a.jpg, b.jpg,  , c.jpg");
        assert_eq!(urls(&gallery), ["a.jpg", "b.jpg", "c.jpg"]);
        assert!(Gallery::parse(" , ,").is_empty());
        assert_eq!(gallery.to_field(), "a.jpg, b.jpg, c.jpg");
    }

    #[test]
    fn moves_swap_neighbours() {
        let mut gallery = Gallery::parse("a, b, c");
        assert!(gallery.apply(GalleryAction::Up, 2));
        assert_eq!(urls(&gallery), ["a", "c", "b"]);
        assert!(gallery.apply(GalleryAction::Down, 0));
        assert_eq!(urls(&gallery), ["c", "a", "b"]);
    }

    #[test]
    fn moves_past_the_ends_are_ignored() {
        let mut gallery = Gallery::parse("a, b");
        assert!(!gallery.apply(GalleryAction::Up, 0));
        assert!(!gallery.apply(GalleryAction::Down, 1));
        assert!(!gallery.apply(GalleryAction::Down, usize::MAX));
        assert!(!gallery.apply(GalleryAction::Up, usize::MAX));
        assert!(!gallery.apply(GalleryAction::Remove, 5));
        assert_eq!(urls(&gallery), ["a", "b"]);
    }

    #[test]
    fn remove_keeps_order() {
        let mut gallery = Gallery::parse("a, b, c");
        assert!(gallery.apply(GalleryAction::Remove, 1));
        assert_eq!(urls(&gallery), ["a", "c"]);
    }

    #[test]
    fn cover_falls_back_to_placeholder() {
        assert_eq!(cover_image(&[]), PLACEHOLDER_IMAGE);
        assert_eq!(cover_image(&["x.jpg".to_string()]), "x.jpg");
    }
}
