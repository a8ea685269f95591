use std::{cell::RefCell, rc::Rc};

// Bitmaps hand out references to VRAM without owning it.

pub type SharedMutRef<T> = Rc<RefCell<T>>;

pub fn new_shared_mut_ref<T>(value: T) -> SharedMutRef<T> {
    Rc::new(RefCell::new(value))
}

/// Clamp a wide intermediate back into the 16-bit coordinate space.
pub fn clamp_to_i16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn shared_refs_alias() {
        crate::test_common::setup();

        let a = new_shared_mut_ref(vec![1u8, 2, 3]);
        let b = a.clone();
        b.borrow_mut()[0] = 9;

        assert_eq!(a.borrow()[0], 9);
        assert_eq!(Rc::strong_count(&a), 2);
    }

    #[test]
    fn clamp_saturates() {
        assert_eq!(clamp_to_i16(40_000), i16::MAX);
        assert_eq!(clamp_to_i16(-40_000), i16::MIN);
        assert_eq!(clamp_to_i16(-12), -12);
    }
}
