// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A union-find structure for finding and merging connected components
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
            rank: vec![1; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Path compression
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }

        root
    }

    fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x != root_y {
            match self.rank[root_x].cmp(&self.rank[root_y]) {
                Ordering::Greater => self.parent[root_y] = root_x,
                Ordering::Less => self.parent[root_x] = root_y,
                Ordering::Equal => {
                    self.parent[root_y] = root_x;
                    self.rank[root_x] += 1;
                }
            }
        }
    }
}

/// Two-pass 8-connected component labeling on mask buffers
///
/// Every non-zero pixel is treated as foreground. Components receive compact
/// labels `1..=K` in raster order of their first pixel.
///
/// # Arguments
///
/// * `width` - Width of mask
/// * `height` - Height of mask
/// * `buffer` - A row-major mask buffer
///
/// # Examples
///
/// ```
/// use ovum_core::cv::connected_components;
///
/// let buffer_one: Vec<u32> = vec![10, 10, 0, 10, 0, 20, 0, 20, 20];
/// let labels_one = connected_components(3, 3, &buffer_one);
/// assert_eq!(labels_one, [1, 1, 0, 1, 0, 1, 0, 1, 1]);
///
/// let buffer_two: Vec<u32> = vec![10, 10, 10, 0, 0, 0, 20, 20, 20];
/// let labels_two = connected_components(3, 3, &buffer_two);
/// assert_eq!(labels_two, [1, 1, 1, 0, 0, 0, 2, 2, 2]);
/// ```
pub fn connected_components(width: u32, height: u32, buffer: &[u32]) -> Vec<u32> {
    let width = width as usize;
    let height = height as usize;
    let size = width * height;

    let mut labels = vec![0u32; size];
    let mut next_label = 1u32;

    // Index 0 is reserved for background
    let mut uf = UnionFind::new(size + 1);

    // Assign preliminary labels (1st pass)
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            if buffer[idx] == 0 {
                continue;
            }

            let mut neighbors = Vec::with_capacity(4);

            if x > 0 && buffer[idx - 1] > 0 {
                neighbors.push(labels[idx - 1]);
            }

            if y > 0 && buffer[idx - width] > 0 {
                neighbors.push(labels[idx - width]);
            }

            if x > 0 && y > 0 && buffer[idx - width - 1] > 0 {
                neighbors.push(labels[idx - width - 1]);
            }

            if x + 1 < width && y > 0 && buffer[idx - width + 1] > 0 {
                neighbors.push(labels[idx - width + 1]);
            }

            match neighbors.iter().min() {
                None => {
                    labels[idx] = next_label;
                    next_label += 1;
                }
                Some(&min_label) => {
                    labels[idx] = min_label;
                    for &label in &neighbors {
                        uf.union(min_label as usize, label as usize);
                    }
                }
            }
        }
    }

    // Resolve and compact labels (2nd pass)
    let mut compact: BTreeMap<usize, u32> = BTreeMap::new();
    for label in labels.iter_mut() {
        if *label != 0 {
            let root = uf.find(*label as usize);
            let n = compact.len() as u32 + 1;
            *label = *compact.entry(root).or_insert(n);
        }
    }

    labels
}

#[cfg(test)]
mod test {

    use super::*;

    fn four_regions() -> (u32, u32, [u32; 9]) {
        let mut buffer = [0u32; 9];

        buffer[0] = 1u32;
        buffer[2] = 2u32;
        buffer[6] = 3u32;
        buffer[8] = 3u32;

        (3, 3, buffer)
    }

    fn touching_regions() -> (u32, u32, [u32; 9]) {
        let mut buffer = [0u32; 9];

        buffer[0] = 1u32;
        buffer[2] = 2u32;
        buffer[4] = 4u32;
        buffer[6] = 3u32;
        buffer[7] = 3u32;
        buffer[8] = 3u32;

        (3, 3, buffer)
    }

    #[test]
    fn test_four_regions_compact() {
        let (w, h, buffer) = four_regions();
        let labels = connected_components(w, h, &buffer);
        assert_eq!(labels, vec![1, 0, 2, 0, 0, 0, 3, 0, 4]);
    }

    #[test]
    fn test_diagonal_regions_merge() {
        let (w, h, buffer) = touching_regions();

        let mut labels = connected_components(w, h, &buffer);
        labels.sort();
        labels.dedup();

        assert_eq!(labels, vec![0, 1]);
    }

    #[test]
    fn test_u_shape_merges_late() {
        // Two arms only meet on the last row
        #[rustfmt::skip]
        let buffer = vec![
            1, 0, 1,
            1, 0, 1,
            1, 1, 1,
        ];

        let labels = connected_components(3, 3, &buffer);
        assert!(labels.iter().all(|&l| l <= 1));
        assert_eq!(labels.iter().filter(|&&l| l == 1).count(), 7);
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(connected_components(2, 2, &[0, 0, 0, 0]), vec![0, 0, 0, 0]);
    }
}
