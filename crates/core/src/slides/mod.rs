use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A single picture card as authored in the section settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideItem {
    pub image_src: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl SlideItem {
    pub fn new(image_src: impl Into<String>) -> Self {
        Self {
            image_src: image_src.into(),
            caption: None,
            link: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// Ordered, immutable collection of slides. Cloning shares the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideSet {
    items: Arc<[SlideItem]>,
}

impl SlideSet {
    pub fn new(items: Vec<SlideItem>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Convenience constructor for `count` placeholder cards.
    pub fn placeholders(count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|index| SlideItem::new(format!("slide-{index}.jpg")))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SlideItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlideItem> {
        self.items.iter()
    }
}

impl Default for SlideSet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<SlideItem>> for SlideSet {
    fn from(items: Vec<SlideItem>) -> Self {
        Self::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_storage() {
        let slides = SlideSet::new(vec![
            SlideItem::new("a.jpg").with_caption("First"),
            SlideItem::new("b.jpg"),
        ]);
        let copy = slides.clone();

        assert_eq!(copy, slides);
        assert!(std::ptr::eq(copy.get(0).unwrap(), slides.get(0).unwrap()));
        assert_eq!(
            slides.iter().map(|item| item.image_src.as_str()).collect::<Vec<_>>(),
            vec!["a.jpg", "b.jpg"]
        );
    }

    #[test]
    fn captions_and_links_are_optional_in_json() {
        let item: SlideItem = serde_json::from_str(r#"{"image_src": "c.jpg"}"#).unwrap();
        assert_eq!(item, SlideItem::new("c.jpg"));
    }
}
