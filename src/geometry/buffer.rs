//! Drawable slices of a geometry.

use std::ops::Range;
use std::sync::Arc;

use super::{Geometry, GeometryGroup};

/// What a render list entry draws: a whole geometry, or one of its groups.
///
/// The two variants go through different renderer entry points. Groups share
/// their geometry's vertex data, so GPU copies are keyed by [`Geometry::id`].
#[derive(Debug, Clone)]
pub enum GeometryBuffer {
    /// The whole geometry as one combined buffer.
    Direct(Arc<Geometry>),
    /// One material group of a grouped geometry.
    Group {
        /// Owning geometry.
        geometry: Arc<Geometry>,
        /// Index into `geometry.groups`.
        group: usize,
    },
}

impl GeometryBuffer {
    /// Buffers for a geometry: one per group, or a single direct buffer.
    pub fn for_geometry(geometry: &Arc<Geometry>) -> Vec<Self> {
        if geometry.groups.is_empty() {
            vec![Self::Direct(Arc::clone(geometry))]
        } else {
            (0..geometry.groups.len())
                .map(|group| Self::Group {
                    geometry: Arc::clone(geometry),
                    group,
                })
                .collect()
        }
    }

    /// The underlying geometry.
    #[inline]
    pub fn geometry(&self) -> &Arc<Geometry> {
        match self {
            Self::Direct(geometry) | Self::Group { geometry, .. } => geometry,
        }
    }

    /// Whether this is a single combined buffer.
    #[inline]
    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Direct(_))
    }

    /// Group description, for grouped buffers.
    pub fn group(&self) -> Option<&GeometryGroup> {
        match self {
            Self::Direct(_) => None,
            Self::Group { geometry, group } => geometry.groups.get(*group),
        }
    }

    /// Face material index of a grouped buffer.
    pub fn material_index(&self) -> Option<usize> {
        self.group().and_then(|g| g.material_index)
    }

    /// Index (or vertex, when non-indexed) range to draw.
    pub fn draw_range(&self) -> Range<u32> {
        match self.group() {
            Some(g) => g.start..g.start + g.count,
            None => 0..self.geometry().draw_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_when_ungrouped() {
        let geometry = Arc::new(Geometry::cube(1.0));
        let buffers = GeometryBuffer::for_geometry(&geometry);
        assert_eq!(buffers.len(), 1);
        assert!(buffers[0].is_direct());
        assert_eq!(buffers[0].draw_range(), 0..36);
        assert!(buffers[0].group().is_none());
    }

    #[test]
    fn test_one_buffer_per_group() {
        let geometry = Arc::new(Geometry::cube(1.0).with_groups(
            vec![
                GeometryGroup { start: 0, count: 18, material_index: Some(0) },
                GeometryGroup { start: 18, count: 18, material_index: None },
            ],
            Vec::new(),
        ));
        let buffers = GeometryBuffer::for_geometry(&geometry);
        assert_eq!(buffers.len(), 2);
        assert_eq!(buffers[1].draw_range(), 18..36);
        assert_eq!(buffers[0].material_index(), Some(0));
        assert_eq!(buffers[1].material_index(), None);
        assert!(Arc::ptr_eq(buffers[0].geometry(), buffers[1].geometry()));
        assert_eq!(buffers[0].geometry().id(), buffers[1].geometry().id());
    }
}
