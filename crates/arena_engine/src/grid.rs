//! Board geometry on integer cells.

use glam::IVec2;

use crate::components::MapConfig;

/// The four orthogonal unit steps.
pub const ORTHOGONAL: [IVec2; 4] = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

/// Converts stored coordinates to a grid vector.
///
/// Coordinates are bounded by the map limits, far below `i32::MAX`.
#[must_use]
pub fn cell(x: u32, y: u32) -> IVec2 {
    IVec2::new(x as i32, y as i32)
}

/// Converts a grid vector back to stored coordinates if it lies on `map`.
#[must_use]
pub fn on_map(map: &MapConfig, at: IVec2) -> Option<(u32, u32)> {
    let x = u32::try_from(at.x).ok()?;
    let y = u32::try_from(at.y).ok()?;
    map.contains(x, y).then_some((x, y))
}

#[must_use]
pub fn manhattan(a: IVec2, b: IVec2) -> u32 {
    let d = (a - b).abs();
    (d.x + d.y) as u32
}

#[must_use]
pub fn chebyshev(a: IVec2, b: IVec2) -> u32 {
    (a - b).abs().max_element() as u32
}

/// Returns the unit step from `from` to `to` if they are orthogonal neighbours.
#[must_use]
pub fn direction(from: IVec2, to: IVec2) -> Option<IVec2> {
    let step = to - from;
    ORTHOGONAL.contains(&step).then_some(step)
}

/// The `length` cells starting next to `origin` and walking along `step`,
/// clipped to the board. No ray is longer than the board's longer side.
#[must_use]
pub fn ray(map: &MapConfig, origin: IVec2, step: IVec2, length: u32) -> Vec<(u32, u32)> {
    let reach = length.min(map.width.max(map.height));
    let reach = i32::try_from(reach).unwrap_or(i32::MAX);
    (1..=reach)
        .filter_map(|i| on_map(map, origin + step * i))
        .collect()
}

/// `center` plus the given offsets, clipped to the board.
#[must_use]
pub fn area(map: &MapConfig, center: IVec2, offsets: &[IVec2]) -> Vec<(u32, u32)> {
    offsets
        .iter()
        .filter_map(|offset| on_map(map, center + *offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> MapConfig {
        MapConfig {
            width: 5,
            height: 5,
            max_placed_cards: 4,
        }
    }

    #[test]
    fn test_distances() {
        assert_eq!(manhattan(cell(0, 0), cell(2, 3)), 5);
        assert_eq!(chebyshev(cell(0, 0), cell(2, 3)), 3);
        assert_eq!(manhattan(cell(4, 4), cell(4, 4)), 0);
    }

    #[test]
    fn test_direction_requires_orthogonal_neighbour() {
        assert_eq!(direction(cell(2, 2), cell(2, 3)), Some(IVec2::Y));
        assert_eq!(direction(cell(2, 2), cell(3, 3)), None);
        assert_eq!(direction(cell(2, 2), cell(2, 4)), None);
        assert_eq!(direction(cell(2, 2), cell(2, 2)), None);
    }

    #[test]
    fn test_ray_is_clipped() {
        assert_eq!(ray(&map(), cell(2, 2), IVec2::X, 3), vec![(3, 2), (4, 2)]);
        assert_eq!(
            ray(&map(), cell(0, 0), IVec2::Y, 3),
            vec![(0, 1), (0, 2), (0, 3)]
        );
        assert!(ray(&map(), cell(0, 0), IVec2::NEG_X, 3).is_empty());
    }

    #[test]
    fn test_ray_length_is_bounded_by_board() {
        assert_eq!(
            ray(&map(), cell(0, 2), IVec2::X, u32::MAX),
            vec![(1, 2), (2, 2), (3, 2), (4, 2)]
        );
        assert_eq!(ray(&map(), cell(2, 0), IVec2::Y, 1 << 31).len(), 4);
    }

    #[test]
    fn test_area_around_corner() {
        let cells = area(&map(), cell(0, 0), &ORTHOGONAL);
        assert_eq!(cells, vec![(1, 0), (0, 1)]);
    }

    #[test]
    fn test_chebyshev_ring() {
        let ring: Vec<_> = (0..5)
            .flat_map(|x| (0..5).map(move |y| cell(x, y)))
            .filter(|at| chebyshev(cell(2, 2), *at) == 1)
            .collect();
        assert_eq!(ring.len(), 8);
        assert!(ring.contains(&cell(1, 1)));
        assert!(!ring.contains(&cell(2, 2)));
    }
}
