//! Outer boundary tracing for mask objects (Moore neighbour tracing)

use crate::core::labeling::{label_components, Connectivity};
use crate::types::{BinaryMask, LabelImage};

/// Clockwise neighbour ring in (row, col) offsets, starting east
const RING: [(isize, isize); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Outer contour of an 8-connected object, vertices in (row, col) pixel units
pub type Contour = Vec<(usize, usize)>;

/// Trace the external boundary of every 8-connected object.
///
/// Contours come out in label order, clockwise, with collinear vertices
/// removed and without repeating the first vertex. A single-pixel object
/// yields a one-vertex contour.
pub fn trace_external_contours(mask: &BinaryMask) -> Vec<Contour> {
    let (labels, count) = label_components(mask, Connectivity::Eight);

    let mut starts = vec![None; count as usize + 1];
    for ((i, j), &label) in labels.indexed_iter() {
        if label != 0 && starts[label as usize].is_none() {
            starts[label as usize] = Some((i, j));
        }
    }

    let contours: Vec<Contour> = starts
        .iter()
        .enumerate()
        .filter_map(|(label, start)| start.map(|s| (label as u32, s)))
        .map(|(label, start)| simplify(&trace(&labels, label, start)))
        .collect();

    log::debug!("Traced {} external contours", contours.len());
    contours
}

fn neighbour(labels: &LabelImage, p: (usize, usize), dir: usize) -> Option<(usize, usize)> {
    let (rows, cols) = labels.dim();
    let r = p.0 as isize + RING[dir].0;
    let c = p.1 as isize + RING[dir].1;
    if r < 0 || c < 0 || r >= rows as isize || c >= cols as isize {
        return None;
    }
    Some((r as usize, c as usize))
}

fn ring_index(offset: (isize, isize)) -> usize {
    RING.iter().position(|&o| o == offset).unwrap_or(4)
}

/// `start` must be the object's first pixel in raster order, so its west
/// neighbour is guaranteed to be outside the object.
fn trace(labels: &LabelImage, label: u32, start: (usize, usize)) -> Contour {
    let inside = |p: Option<(usize, usize)>| p.map_or(false, |q| labels[[q.0, q.1]] == label);

    let mut contour = vec![start];
    let mut current = start;
    // Direction (from current) of the last outside pixel examined
    let mut backtrack = 4usize;
    let mut first_step: Option<(usize, usize)> = None;

    // Each boundary pixel can be entered from at most four sides
    let max_steps = 4 * labels.len() + 4;
    for _ in 0..max_steps {
        let mut found = None;
        for k in 1..=8 {
            let dir = (backtrack + k) % 8;
            let candidate = neighbour(labels, current, dir);
            if inside(candidate) {
                found = candidate.map(|p| (p, dir));
                break;
            }
        }

        let Some((next, dir)) = found else {
            // Isolated pixel
            return contour;
        };

        if current == start {
            match first_step {
                None => first_step = Some(next),
                Some(step) if step == next => break,
                Some(_) => {}
            }
        }

        // The pixel examined just before `next` was outside; express it
        // relative to `next` to seed the following search.
        let prev_dir = (dir + 7) % 8;
        let outside_r = current.0 as isize + RING[prev_dir].0;
        let outside_c = current.1 as isize + RING[prev_dir].1;
        backtrack = ring_index((outside_r - next.0 as isize, outside_c - next.1 as isize));

        current = next;
        if current != start {
            contour.push(current);
        }
    }

    contour
}

/// Drop vertices lying on a straight run between their neighbours
fn simplify(contour: &Contour) -> Contour {
    let n = contour.len();
    if n < 3 {
        return contour.clone();
    }

    let direction = |a: (usize, usize), b: (usize, usize)| {
        (b.0 as isize - a.0 as isize, b.1 as isize - a.1 as isize)
    };

    let simplified: Contour = (0..n)
        .filter(|&i| {
            let prev = contour[(i + n - 1) % n];
            let curr = contour[i];
            let next = contour[(i + 1) % n];
            direction(prev, curr) != direction(curr, next)
        })
        .map(|i| contour[i])
        .collect();

    if simplified.is_empty() {
        contour.clone()
    } else {
        simplified
    }
}
