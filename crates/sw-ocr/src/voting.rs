//! Temporal voting (spec.md §4.5 step 6): merges OCR regions detected
//! independently across multiple frames into one consensus reading per
//! on-screen text region, using IoU to decide which per-frame
//! detections refer to the same region and confidence-weighted
//! character voting to settle disagreements between frames' readings of
//! that region.

use std::collections::HashMap;

use sw_core::{BoundingBox, OcrRegion};

const IOU_CLUSTER_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct VotedRegion {
    pub text: String,
    pub confidence: f64,
    pub bbox: BoundingBox,
    pub frame_support: usize,
}

fn average_bbox(boxes: &[BoundingBox]) -> BoundingBox {
    let n = boxes.len() as f64;
    let mut x1 = 0.0;
    let mut y1 = 0.0;
    let mut x2 = 0.0;
    let mut y2 = 0.0;
    for b in boxes {
        x1 += b.x1;
        y1 += b.y1;
        x2 += b.x2;
        y2 += b.y2;
    }
    BoundingBox { x1: x1 / n, y1: y1 / n, x2: x2 / n, y2: y2 / n }
}

/// Groups regions across frames into clusters that refer to the same
/// on-screen text, greedily: each region joins the first existing
/// cluster whose running-average bbox it overlaps at IoU >= threshold,
/// else starts a new cluster.
fn cluster(frame_regions: &[Vec<OcrRegion>]) -> Vec<Vec<OcrRegion>> {
    let mut clusters: Vec<Vec<OcrRegion>> = Vec::new();
    for regions in frame_regions {
        for region in regions {
            let mut matched = None;
            for (i, cluster) in clusters.iter().enumerate() {
                let boxes: Vec<BoundingBox> = cluster.iter().map(|r| r.bbox).collect();
                let avg = average_bbox(&boxes);
                if avg.iou(&region.bbox) >= IOU_CLUSTER_THRESHOLD {
                    matched = Some(i);
                    break;
                }
            }
            match matched {
                Some(i) => clusters[i].push(region.clone()),
                None => clusters.push(vec![region.clone()]),
            }
        }
    }
    clusters
}

/// Confidence-weighted per-character vote across the regions in a
/// cluster. Regions are grouped by text length first (the length with
/// the highest total confidence wins), then each character position is
/// decided by summing confidence per candidate character and picking
/// the highest; ties break lexicographically so the result is
/// deterministic.
fn vote_text(cluster: &[OcrRegion]) -> (String, f64) {
    let mut by_length: HashMap<usize, Vec<&OcrRegion>> = HashMap::new();
    for region in cluster {
        by_length.entry(region.text.chars().count()).or_default().push(region);
    }
    let winning_length = by_length
        .iter()
        .map(|(len, regions)| (*len, regions.iter().map(|r| r.confidence).sum::<f64>()))
        .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(len, _)| len)
        .unwrap_or(0);
    let voters = by_length.remove(&winning_length).unwrap_or_default();
    if voters.is_empty() {
        return (String::new(), 0.0);
    }
    let char_columns: Vec<Vec<char>> = voters.iter().map(|r| r.text.chars().collect()).collect();
    let mut text = String::with_capacity(winning_length);
    for position in 0..winning_length {
        let mut votes: HashMap<char, f64> = HashMap::new();
        for (voter_idx, voter) in voters.iter().enumerate() {
            let ch = char_columns[voter_idx][position];
            *votes.entry(ch).or_insert(0.0) += voter.confidence;
        }
        let winner = votes
            .into_iter()
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0).reverse()))
            .map(|(ch, _)| ch)
            .unwrap_or(' ');
        text.push(winner);
    }
    let avg_confidence = voters.iter().map(|r| r.confidence).sum::<f64>() / voters.len() as f64;
    (text, avg_confidence)
}

/// Runs clustering then per-cluster voting over every frame's detected
/// regions, returning one consensus region per cluster.
pub fn vote(frame_regions: &[Vec<OcrRegion>]) -> Vec<VotedRegion> {
    cluster(frame_regions)
        .into_iter()
        .map(|cluster| {
            let boxes: Vec<BoundingBox> = cluster.iter().map(|r| r.bbox).collect();
            let bbox = average_bbox(&boxes);
            let frame_support = cluster.len();
            let (text, confidence) = vote_text(&cluster);
            VotedRegion { text, confidence, bbox, frame_support }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(text: &str, confidence: f64, bbox: BoundingBox) -> OcrRegion {
        OcrRegion { text: text.to_string(), confidence, bbox }
    }

    const BOX_A: BoundingBox = BoundingBox { x1: 0.0, y1: 0.0, x2: 10.0, y2: 10.0 };
    const BOX_B: BoundingBox = BoundingBox { x1: 100.0, y1: 100.0, x2: 110.0, y2: 110.0 };

    #[test]
    fn disjoint_regions_form_separate_clusters() {
        let frames = vec![vec![region("hi", 0.9, BOX_A)], vec![region("bye", 0.9, BOX_B)]];
        let voted = vote(&frames);
        assert_eq!(voted.len(), 2);
    }

    #[test]
    fn overlapping_regions_merge_and_vote_majority_reading() {
        let frames = vec![
            vec![region("HELL0", 0.6, BOX_A)],
            vec![region("HELLO", 0.9, BOX_A)],
            vec![region("HELLO", 0.9, BOX_A)],
        ];
        let voted = vote(&frames);
        assert_eq!(voted.len(), 1);
        assert_eq!(voted[0].text, "HELLO");
        assert_eq!(voted[0].frame_support, 3);
    }

    #[test]
    fn character_vote_is_deterministic_on_tie() {
        let frames = vec![vec![region("A", 0.5, BOX_A)], vec![region("B", 0.5, BOX_A)]];
        let voted = vote(&frames);
        assert_eq!(voted[0].text, "A");
    }
}
