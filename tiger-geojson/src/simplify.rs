//! Douglas-Peucker à tolérance en distance, avec préservation de topologie
//!
//! Chaque anneau est simplifié récursivement: un tronçon dont tous les sommets
//! sont à moins de la tolérance de la corde est remplacé par cette corde, sauf
//! si la corde croise un autre segment de la géométrie (même anneau, autres
//! anneaux, cordes déjà acceptées). Dans ce cas le tronçon est découpé au
//! sommet le plus éloigné, comme quand la tolérance est dépassée.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, EuclideanDistance, Line, LineString, Point, Polygon};
use rstar::{RTree, RTreeObject, AABB};

/// Un anneau fermé garde au moins 4 coordonnées
const MIN_RING_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    line: Line,
    ring: usize,
    start: usize,
}

impl RTreeObject for Segment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        envelope(&self.line)
    }
}

fn envelope(line: &Line) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [line.start.x, line.start.y],
        [line.end.x, line.end.y],
    )
}

/// Simplifie un polygone (anneau extérieur et trous)
pub fn simplify_polygon(polygon: &Polygon, tolerance: f64) -> Polygon {
    let mut simplified = simplify_polygons(std::slice::from_ref(polygon), tolerance);
    simplified.pop().unwrap_or_else(|| polygon.clone())
}

/// Simplifie un ensemble de polygones sans qu'aucun anneau n'en croise un autre
pub fn simplify_polygons(polygons: &[Polygon], tolerance: f64) -> Vec<Polygon> {
    let rings: Vec<&LineString> = polygons
        .iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
        .collect();

    let mut simplifier = Simplifier::new(&rings, tolerance);
    let mut ring = 0;

    polygons
        .iter()
        .map(|polygon| {
            let exterior = simplifier.simplify_ring(ring, polygon.exterior());
            ring += 1;
            let interiors = polygon
                .interiors()
                .iter()
                .map(|interior| {
                    let simplified = simplifier.simplify_ring(ring, interior);
                    ring += 1;
                    simplified
                })
                .collect();
            Polygon::new(exterior, interiors)
        })
        .collect()
}

struct Simplifier {
    tolerance: f64,
    /// Segments d'origine encore présents
    input: RTree<Segment>,
    /// Cordes acceptées
    output: RTree<Segment>,
}

impl Simplifier {
    fn new(rings: &[&LineString], tolerance: f64) -> Self {
        let segments = rings
            .iter()
            .enumerate()
            .flat_map(|(ring, ls)| {
                ls.lines()
                    .enumerate()
                    .map(move |(start, line)| Segment { line, ring, start })
            })
            .collect();

        Self {
            tolerance,
            input: RTree::bulk_load(segments),
            output: RTree::new(),
        }
    }

    fn simplify_ring(&mut self, ring: usize, ls: &LineString) -> LineString {
        let coords = &ls.0;
        if coords.len() <= MIN_RING_LEN || !ls.is_closed() {
            return ls.clone();
        }

        let last = coords.len() - 1;
        let mut kept = vec![true; coords.len()];
        let mut kept_count = coords.len();

        // Premier découpage au sommet le plus éloigné du point de fermeture
        let (far, _) = farthest(coords, 0, last);
        let mut stack = vec![(far, last), (0, far)];

        while let Some((i, j)) = stack.pop() {
            if j <= i + 1 {
                continue;
            }

            let chord = Line::new(coords[i], coords[j]);
            let (split, distance) = farthest(coords, i, j);
            let removed = j - i - 1;

            if distance <= self.tolerance
                && kept_count - removed >= MIN_RING_LEN
                && !self.crosses_any(ring, i, j, &chord)
            {
                kept[i + 1..j].iter_mut().for_each(|k| *k = false);
                kept_count -= removed;
                self.collapse(ring, i, j, coords, chord);
            } else {
                stack.push((split, j));
                stack.push((i, split));
            }
        }

        coords
            .iter()
            .zip(&kept)
            .filter_map(|(c, keep)| keep.then_some(*c))
            .collect()
    }

    /// La corde `i..j` coupe-t-elle un segment hors du tronçon remplacé ?
    fn crosses_any(&self, ring: usize, i: usize, j: usize, chord: &Line) -> bool {
        let area = envelope(chord);
        let replaced = |s: &Segment| s.ring == ring && s.start >= i && s.start < j;

        self.input
            .locate_in_envelope_intersecting(&area)
            .filter(|s| !replaced(s))
            .chain(self.output.locate_in_envelope_intersecting(&area))
            .any(|s| crosses(chord, &s.line))
    }

    fn collapse(&mut self, ring: usize, i: usize, j: usize, coords: &[Coord], chord: Line) {
        for start in i..j {
            self.input.remove(&Segment {
                line: Line::new(coords[start], coords[start + 1]),
                ring,
                start,
            });
        }
        self.output.insert(Segment {
            line: chord,
            ring,
            start: i,
        });
    }
}

/// Sommet de `i+1..j` le plus éloigné de la corde `i..j`, et sa distance
fn farthest(coords: &[Coord], i: usize, j: usize) -> (usize, f64) {
    let chord = Line::new(coords[i], coords[j]);
    let mut best = (i + 1, f64::NEG_INFINITY);
    for (k, c) in coords.iter().enumerate().take(j).skip(i + 1) {
        let distance = Point::from(*c).euclidean_distance(&chord);
        if distance > best.1 {
            best = (k, distance);
        }
    }
    best
}

/// Intersection autre qu'une extrémité commune aux deux segments
fn crosses(a: &Line, b: &Line) -> bool {
    let shared = |c: Coord| (c == a.start || c == a.end) && (c == b.start || c == b.end);

    match line_intersection(*a, *b) {
        None => false,
        Some(LineIntersection::SinglePoint {
            intersection,
            is_proper,
        }) => is_proper || !shared(intersection),
        Some(LineIntersection::Collinear { intersection }) => {
            intersection.start != intersection.end || !shared(intersection.start)
        }
    }
}
