use std::fmt;

/// Inclusive rectangle in bitmap coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub min_x: i16,
    pub min_y: i16,
    pub max_x: i16,
    pub max_y: i16,
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {} : {}, {})", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl Rectangle {
    pub const fn new(min_x: i16, min_y: i16, max_x: i16, max_y: i16) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    pub const fn from_xywh(x: i16, y: i16, width: i16, height: i16) -> Self {
        Self::new(x, y, x + width - 1, y + height - 1)
    }

    pub fn width(&self) -> i16 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> i16 {
        self.max_y - self.min_y + 1
    }

    /// Test if this rectangle lies entirely within the bounds of `other`
    pub fn within(&self, other: &Rectangle) -> bool {
        let inside = self.min_x >= other.min_x
            && self.max_x <= other.max_x
            && self.min_y >= other.min_y
            && self.max_y <= other.max_y;

        trace!("{} {} entirely within {}", self, if inside { "IS" } else { "is NOT" }, other);

        inside
    }

    pub fn intersects(&self, other: &Rectangle) -> bool {
        !(self.min_x > other.max_x
            || self.max_x < other.min_x
            || self.min_y > other.max_y
            || self.max_y < other.min_y)
    }

    pub fn contains_point(&self, x: i16, y: i16) -> bool {
        !(x > self.max_x || x < self.min_x || y > self.max_y || y < self.min_y)
    }

    /// Position `hero` within `frame`.
    /// Horizontally the hero is centered. Vertically it is centered, or its top sits on the
    /// 25% line of the frame when `at_25_percent_v` is set and the hero still fits below it.
    /// Returns the frame coords the hero should use.
    pub fn center_within(frame: &Rectangle, hero: &Rectangle, at_25_percent_v: bool) -> Rectangle {
        let hero_height = hero.max_y - hero.min_y;
        let hero_width = hero.max_x - hero.min_x;
        let frame_height = frame.max_y - frame.min_y;

        let mut result = *frame;

        result.min_x = (frame.max_x - frame.min_x - hero_width) / 2 + frame.min_x;
        result.max_x = result.min_x + hero_width;

        let proposed_top = frame_height / 4;

        if at_25_percent_v && proposed_top + hero_height <= frame.max_y {
            result.min_y = proposed_top;
        }
        else {
            result.min_y = (frame_height - hero_height) / 2 + frame.min_y;
        }

        result.max_y = result.min_y + hero_height;

        result
    }

    /// Calculate the area covered by `r2` but not by `r1`, as 0 to 4 rectangles.
    ///
    /// Typical use is a damage calculation: `r1` is a window after it moved or resized,
    /// `r2` is where it was before.
    pub fn difference(r1: &Rectangle, r2: &Rectangle) -> Vec<Rectangle> {
        if r2.within(r1) {
            return Vec::new();
        }

        if !r1.intersects(r2) {
            return vec![*r1];
        }

        let mut diffs = Vec::with_capacity(4);

        // top
        if r2.min_y < r1.min_y {
            diffs.push(Rectangle::new(r1.min_x, r2.min_y, r1.max_x, r1.min_y - 1));
        }

        // bottom
        if r2.max_y > r1.max_y {
            diffs.push(Rectangle::new(r1.min_x, r1.max_y + 1, r1.max_x, r2.max_y));
        }

        // left
        if r2.min_x < r1.min_x {
            diffs.push(Rectangle::new(r2.min_x, r2.min_y, r1.min_x - 1, r2.max_y));
        }

        // right
        if r2.max_x > r1.max_x {
            diffs.push(Rectangle::new(r1.max_x + 1, r2.min_y, r2.max_x, r2.max_y));
        }

        for (i, r) in diffs.iter().enumerate() {
            debug!("diff rect# {} {}", i, r);
        }

        diffs
    }

    pub fn intersection(r1: &Rectangle, r2: &Rectangle) -> Option<Rectangle> {
        if !r1.intersects(r2) {
            return None;
        }

        Some(Rectangle::new(
            r1.min_x.max(r2.min_x),
            r1.min_y.max(r2.min_y),
            r1.max_x.min(r2.max_x),
            r1.max_y.min(r2.max_y),
        ))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn size_is_inclusive() {
        let r = Rectangle::from_xywh(10, 20, 5, 3);
        assert_eq!(r, Rectangle::new(10, 20, 14, 22));
        assert_eq!(r.width(), 5);
        assert_eq!(r.height(), 3);
    }

    #[test]
    fn within_and_intersect() {
        crate::test_common::setup();

        let outer = Rectangle::new(0, 0, 100, 100);
        let inner = Rectangle::new(10, 10, 20, 20);
        let apart = Rectangle::new(200, 200, 210, 210);

        assert!(inner.within(&outer));
        assert!(!outer.within(&inner));
        assert!(inner.intersects(&outer));
        assert!(!apart.intersects(&outer));

        // touching edges count as intersecting
        assert!(Rectangle::new(100, 100, 120, 120).intersects(&outer));
    }

    #[test]
    fn point_in_rect_edges() {
        let r = Rectangle::new(5, 5, 10, 10);
        assert!(r.contains_point(5, 5));
        assert!(r.contains_point(10, 10));
        assert!(!r.contains_point(4, 7));
        assert!(!r.contains_point(7, 11));
    }

    #[test]
    fn center_within_frame() {
        let frame = Rectangle::new(0, 0, 100, 200);
        let hero = Rectangle::new(0, 0, 20, 40);

        let centered = Rectangle::center_within(&frame, &hero, false);
        assert_eq!(centered, Rectangle::new(40, 80, 60, 120));

        let upper = Rectangle::center_within(&frame, &hero, true);
        assert_eq!(upper, Rectangle::new(40, 50, 60, 90));

        // not enough room below the 25% line: falls back to centering
        let tall = Rectangle::new(0, 0, 20, 180);
        let fallback = Rectangle::center_within(&frame, &tall, true);
        assert_eq!(fallback.min_y, 10);
        assert_eq!(fallback.max_y, 190);
    }

    #[test]
    fn difference_cases() {
        crate::test_common::setup();

        let big = Rectangle::new(0, 0, 100, 100);
        let small = Rectangle::new(10, 10, 20, 20);

        assert!(Rectangle::difference(&big, &small).is_empty());

        let far = Rectangle::new(300, 300, 310, 310);
        assert_eq!(Rectangle::difference(&far, &big), vec![far]);

        // window moved right and down by 10
        let before = Rectangle::new(0, 0, 50, 50);
        let after = Rectangle::new(10, 10, 60, 60);
        let diffs = Rectangle::difference(&after, &before);

        assert_eq!(diffs, vec![
            Rectangle::new(10, 0, 60, 9),
            Rectangle::new(0, 0, 9, 50),
        ]);
    }

    #[test]
    fn intersection_rect() {
        let a = Rectangle::new(0, 0, 50, 50);
        let b = Rectangle::new(25, 40, 80, 90);

        assert_eq!(Rectangle::intersection(&a, &b), Some(Rectangle::new(25, 40, 50, 50)));
        assert_eq!(Rectangle::intersection(&a, &Rectangle::new(51, 0, 60, 10)), None);
    }
}
