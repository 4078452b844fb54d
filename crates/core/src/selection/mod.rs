use crate::{
    config::ColorConfig,
    pipeline::RenderRequest,
    source::{FileLibrary, SourceId},
};

/// Maximum number of sources selected at once.
pub const MAX_SELECTED: usize = 2;

/// Up to two selected sources, in the order they were picked.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<SourceId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects or deselects `id`. Selecting a third source drops the oldest.
    pub fn toggle(&mut self, id: SourceId) -> &[SourceId] {
        if let Some(position) = self.ids.iter().position(|selected| *selected == id) {
            self.ids.remove(position);
        } else {
            if self.ids.len() >= MAX_SELECTED {
                self.ids.remove(0);
            }
            self.ids.push(id);
        }
        &self.ids
    }

    pub fn ids(&self) -> &[SourceId] {
        &self.ids
    }

    pub fn contains(&self, id: SourceId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// One single-waveform request per selected source, stroked with the
    /// colour of its selection slot.
    pub fn waveform_requests(
        &self,
        library: &FileLibrary,
        colors: &ColorConfig,
    ) -> Vec<RenderRequest> {
        self.ids
            .iter()
            .enumerate()
            .filter_map(|(slot, id)| {
                library.get(*id).map(|source| RenderRequest::Waveform {
                    source: source.clone(),
                    color: Some(colors.slot_color(slot)),
                })
            })
            .collect()
    }

    /// Difference request for the two selected sources, `None` unless both
    /// are selected and known to the library.
    pub fn difference_request(&self, library: &FileLibrary) -> Option<RenderRequest> {
        match self.ids.as_slice() {
            [first, second] => Some(RenderRequest::Difference {
                first: library.get(*first)?.clone(),
                second: library.get(*second)?.clone(),
            }),
            _ => None,
        }
    }
}
