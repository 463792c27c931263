//! Sequence segmentation for feature highlighting.
//!
//! Partitions a sequence of length `L` into the minimal list of contiguous
//! segments such that every position in a segment is covered by exactly the
//! same set of features, and builds the reverse feature -> segments index
//! the presentation layer wires hover/click highlighting from.

use crate::feature_table::Feature;

/// A maximal run of positions sharing one overlapping-feature set.
///
/// `from`/`to` are 0-based inclusive offsets into the sequence letters;
/// `features` holds the indices into the record's feature list, in feature
/// order (ascending).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub from: usize,
    pub to: usize,
    pub features: Vec<usize>,
}

impl Segment {
    /// Number of sequence positions in this segment (never zero).
    pub fn length(&self) -> usize {
        self.to - self.from + 1
    }
}

/// Segment list plus the feature -> segment-indices reverse index.
///
/// `feature_segments` has one entry per input feature; features without a
/// numeric location keep an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    pub segments: Vec<Segment>,
    pub feature_segments: Vec<Vec<usize>>,
}

/// Compute the segmentation of a sequence of `length` letters against the
/// numeric feature locations.
///
/// Single left-to-right sweep: build the per-offset cover sets, then merge
/// consecutive offsets with identical sets. Feature spans are 1-based
/// inclusive and are clamped to the sequence; spans that are inverted,
/// zero-based or entirely out of range contribute nothing.
pub fn segment_sequence(length: usize, features: &[Feature]) -> Segmentation {
    let mut cover: Vec<Vec<usize>> = vec![Vec::new(); length];

    for (index, feature) in features.iter().enumerate() {
        let Some((from, to)) = feature.location.span() else {
            continue;
        };
        if from == 0 {
            continue;
        }
        let start = (from as usize - 1).min(length);
        let end = (to as usize).min(length);
        for slot in cover.iter_mut().take(end).skip(start) {
            slot.push(index);
        }
    }

    let mut segments = Vec::new();
    let mut i = 0;
    while i < length {
        let mut j = i + 1;
        while j < length && cover[j] == cover[i] {
            j += 1;
        }
        segments.push(Segment {
            from: i,
            to: j - 1,
            features: std::mem::take(&mut cover[i]),
        });
        i = j;
    }

    let mut feature_segments = vec![Vec::new(); features.len()];
    for (segment_index, segment) in segments.iter().enumerate() {
        for &feature_index in &segment.features {
            feature_segments[feature_index].push(segment_index);
        }
    }

    Segmentation {
        segments,
        feature_segments,
    }
}
