//! Gesture geometry: where scrolls and swipes start and end.

use std::time::Duration;

use crate::driver::{Direction, Gesture, Point, Rect, Size};

/// Long-press before a drag starts moving
pub const DRAG_HOLD: Duration = Duration::from_millis(800);

/// Time a drag spends moving
pub const DRAG_MOVE: Duration = Duration::from_millis(500);

/// Window-centred scroll.
///
/// With `x, y` the window centre: up `(x, .5y) -> (x, 1.5y)`, down
/// `(x, y) -> (x, .5y)`, left `(.6x, y) -> (.3x, y)`, right
/// `(.3x, y) -> (.6x, y)`.
#[must_use]
pub fn window_scroll(window: Size, direction: Direction, duration: Duration) -> Gesture {
    let x = window.width / 2.0;
    let y = window.height / 2.0;
    let (start, end) = match direction {
        Direction::Up => (Point::new(x, y * 0.5), Point::new(x, y * 1.5)),
        Direction::Down => (Point::new(x, y), Point::new(x, y * 0.5)),
        Direction::Left => (Point::new(x * 0.6, y), Point::new(x * 0.3, y)),
        Direction::Right => (Point::new(x * 0.3, y), Point::new(x * 0.6, y)),
    };
    Gesture::swipe(start, end, duration)
}

/// Swipe inside an element's own bounds.
#[must_use]
pub fn element_swipe(rect: Rect, direction: Direction, duration: Duration) -> Gesture {
    let centre_x = rect.start_x + rect.width / 2.0;
    let middle_y = rect.start_y + rect.height / 2.0;
    let (start, end) = match direction {
        Direction::Up => (
            Point::new(centre_x, rect.start_y + rect.height * 0.2),
            Point::new(centre_x, rect.end_y - rect.height * 0.2),
        ),
        Direction::Down => (
            Point::new(centre_x, rect.end_y - rect.height * 0.2),
            Point::new(centre_x, rect.start_y + rect.height * 0.3),
        ),
        Direction::Left => (
            Point::new(rect.start_x + rect.width * 0.9, middle_y),
            Point::new(rect.start_x + rect.width * 0.1, middle_y),
        ),
        Direction::Right => (
            Point::new(rect.start_x + rect.width * 0.1, middle_y),
            Point::new(rect.start_x + rect.width * 0.9, middle_y),
        ),
    };
    Gesture::swipe(start, end, duration)
}

/// Long-press the centre of `source` and drop on the centre of `target`
#[must_use]
pub fn drag_and_drop(source: Rect, target: Rect) -> Gesture {
    Gesture::drag(centre(source), centre(target), DRAG_HOLD, DRAG_MOVE)
}

fn centre(rect: Rect) -> Point {
    Point::new(
        rect.start_x + rect.width / 2.0,
        rect.start_y + rect.height / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::BoundingBox;
    use proptest::prelude::*;

    fn second() -> Duration {
        Duration::from_secs(1)
    }

    mod window_tests {
        use super::*;

        #[test]
        fn test_window_scroll_down_moves_up_the_screen() {
            let g = window_scroll(Size::new(400.0, 800.0), Direction::Down, second());
            assert_eq!(g.start, Point::new(200.0, 400.0));
            assert_eq!(g.end, Point::new(200.0, 200.0));
            assert_eq!(g.duration, second());
        }

        #[test]
        fn test_window_scroll_up() {
            let g = window_scroll(Size::new(400.0, 800.0), Direction::Up, second());
            assert_eq!(g.start, Point::new(200.0, 200.0));
            assert_eq!(g.end, Point::new(200.0, 600.0));
        }

        #[test]
        fn test_window_scroll_horizontal() {
            let left = window_scroll(Size::new(400.0, 800.0), Direction::Left, second());
            assert_eq!(left.start, Point::new(120.0, 400.0));
            assert_eq!(left.end, Point::new(60.0, 400.0));
            let right = window_scroll(Size::new(400.0, 800.0), Direction::Right, second());
            assert_eq!(right.start, Point::new(60.0, 400.0));
            assert_eq!(right.end, Point::new(120.0, 400.0));
        }
    }

    mod element_tests {
        use super::*;

        fn rect() -> Rect {
            Rect::from(BoundingBox::new(100.0, 200.0, 200.0, 100.0))
        }

        #[test]
        fn test_element_swipe_up() {
            let g = element_swipe(rect(), Direction::Up, second());
            assert_eq!(g.start, Point::new(200.0, 220.0));
            assert_eq!(g.end, Point::new(200.0, 280.0));
        }

        #[test]
        fn test_element_swipe_down() {
            let g = element_swipe(rect(), Direction::Down, second());
            assert_eq!(g.start, Point::new(200.0, 280.0));
            assert_eq!(g.end, Point::new(200.0, 230.0));
        }

        #[test]
        fn test_element_swipe_left_right() {
            let left = element_swipe(rect(), Direction::Left, second());
            assert_eq!(left.start, Point::new(280.0, 250.0));
            assert_eq!(left.end, Point::new(120.0, 250.0));
            let right = element_swipe(rect(), Direction::Right, second());
            assert_eq!(right.start, Point::new(120.0, 250.0));
            assert_eq!(right.end, Point::new(280.0, 250.0));
        }

        #[test]
        fn test_drag_and_drop_centres() {
            let target = Rect::from(BoundingBox::new(0.0, 0.0, 50.0, 50.0));
            let g = drag_and_drop(rect(), target);
            assert_eq!(g.start, Point::new(200.0, 250.0));
            assert_eq!(g.end, Point::new(25.0, 25.0));
            assert_eq!(g.hold, DRAG_HOLD);
        }
    }

    mod property_tests {
        use super::*;

        proptest! {
            #[test]
            fn prop_element_swipe_stays_inside_bounds(
                x in 0.0f64..1000.0,
                y in 0.0f64..2000.0,
                w in 1.0f64..500.0,
                h in 1.0f64..500.0,
                dir in 0usize..4,
            ) {
                let direction = [Direction::Up, Direction::Down, Direction::Left, Direction::Right][dir];
                let bounds = BoundingBox::new(x, y, w, h);
                let g = element_swipe(Rect::from(bounds), direction, Duration::from_millis(1));
                prop_assert!(bounds.contains(&g.start));
                prop_assert!(bounds.contains(&g.end));
            }

            #[test]
            fn prop_window_scroll_stays_on_screen(
                w in 1.0f64..3000.0,
                h in 1.0f64..3000.0,
                dir in 0usize..4,
            ) {
                let direction = [Direction::Up, Direction::Down, Direction::Left, Direction::Right][dir];
                let screen = BoundingBox::new(0.0, 0.0, w, h);
                let g = window_scroll(Size::new(w, h), direction, Duration::from_millis(1));
                prop_assert!(screen.contains(&g.start));
                prop_assert!(screen.contains(&g.end));
            }
        }
    }
}
