/// Snapshot of all 256 virtual keys for this frame and the previous one.
pub struct KeyboardState {
    current: [bool; 256],
    previous: [bool; 256],
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self {
            current: [false; 256],
            previous: [false; 256],
        }
    }
}

impl KeyboardState {
    /// Rolls the current snapshot into the previous one and stores `raw`,
    /// where a set high bit means the key is down.
    pub fn update(&mut self, raw: &[u8; 256]) {
        self.previous = self.current;
        for (key, state) in self.current.iter_mut().zip(raw) {
            *key = state & 0x80 != 0;
        }
    }

    pub fn is_pressed(&self, key: u8) -> bool {
        self.current[key as usize]
    }

    /// Pressed this frame but not the frame before.
    pub fn is_triggered(&self, key: u8) -> bool {
        self.current[key as usize] && !self.previous[key as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_A: u8 = b'A';

    fn raw_with(keys: &[u8]) -> [u8; 256] {
        let mut raw = [0u8; 256];
        for &key in keys {
            raw[key as usize] = 0x80;
        }
        raw
    }

    #[test]
    fn trigger_fires_only_on_the_first_frame() {
        let mut keyboard = KeyboardState::default();
        keyboard.update(&raw_with(&[KEY_A]));
        assert!(keyboard.is_pressed(KEY_A));
        assert!(keyboard.is_triggered(KEY_A));

        keyboard.update(&raw_with(&[KEY_A]));
        assert!(keyboard.is_pressed(KEY_A));
        assert!(!keyboard.is_triggered(KEY_A));

        keyboard.update(&raw_with(&[]));
        assert!(!keyboard.is_pressed(KEY_A));
        assert!(!keyboard.is_triggered(KEY_A));
    }

    #[test]
    fn toggle_bit_is_not_a_press() {
        let mut keyboard = KeyboardState::default();
        let mut raw = [0u8; 256];
        raw[0x14] = 0x01;
        keyboard.update(&raw);
        assert!(!keyboard.is_pressed(0x14));
    }
}
