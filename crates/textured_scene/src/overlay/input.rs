use egui::Event;
use egui::Key;
use egui::Modifiers;
use egui::MouseWheelUnit;
use egui::PointerButton;
use egui::Pos2;
use egui::RawInput;
use egui::Rect;
use egui::Vec2;

/// Accumulates window input between two overlay frames.
#[derive(Default)]
pub struct OverlayInput {
    events: Vec<Event>,
    modifiers: Modifiers,
    pointer: Pos2,
    pending_high_surrogate: Option<u16>,
}

impl OverlayInput {
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = Pos2::new(x, y);
        self.events.push(Event::PointerMoved(self.pointer));
    }

    pub fn pointer_button(&mut self, button: PointerButton, pressed: bool) {
        self.events.push(Event::PointerButton {
            pos: self.pointer,
            button,
            pressed,
            modifiers: self.modifiers,
        });
    }

    pub fn pointer_left(&mut self) {
        self.events.push(Event::PointerGone);
    }

    /// `notches` is the wheel delta divided by `WHEEL_DELTA`; positive scrolls up.
    pub fn wheel(&mut self, notches: f32, horizontal: bool) {
        let delta = match horizontal {
            true => Vec2::new(-notches, 0.0),
            false => Vec2::new(0.0, notches),
        };
        self.events.push(Event::MouseWheel {
            unit: MouseWheelUnit::Line,
            delta,
            modifiers: self.modifiers,
        });
    }

    /// Feeds one UTF-16 code unit from a character message. Surrogate pairs
    /// arrive as two messages and are joined here.
    pub fn utf16_unit(&mut self, unit: u16) {
        let units = match (self.pending_high_surrogate.take(), unit) {
            (None, 0xD800..=0xDBFF) => {
                self.pending_high_surrogate = Some(unit);
                return;
            }
            (Some(high), 0xDC00..=0xDFFF) => vec![high, unit],
            (_, unit) => vec![unit],
        };
        let text: String = char::decode_utf16(units)
            .filter_map(Result::ok)
            .filter(|c| !c.is_control())
            .collect();
        if !text.is_empty() {
            self.events.push(Event::Text(text));
        }
    }

    /// Key transition for a Win32 virtual-key code.
    pub fn virtual_key(&mut self, vk: u16, pressed: bool, repeat: bool) {
        match vk {
            VK_SHIFT => self.modifiers.shift = pressed,
            VK_CONTROL => {
                self.modifiers.ctrl = pressed;
                self.modifiers.command = pressed;
            }
            VK_MENU => self.modifiers.alt = pressed,
            _ => {}
        }

        let Some(key) = key_from_virtual_key(vk) else {
            return;
        };
        if pressed && self.modifiers.command {
            match key {
                Key::C => self.events.push(Event::Copy),
                Key::X => self.events.push(Event::Cut),
                _ => {}
            }
        }
        self.events.push(Event::Key {
            key,
            physical_key: Some(key),
            pressed,
            repeat,
            modifiers: self.modifiers,
        });
    }

    /// Drains everything collected since the last call.
    pub fn take_raw_input(&mut self, screen_width: u32, screen_height: u32, time: f64) -> RawInput {
        RawInput {
            screen_rect: Some(Rect::from_min_size(
                Pos2::ZERO,
                Vec2::new(screen_width as f32, screen_height as f32),
            )),
            time: Some(time),
            modifiers: self.modifiers,
            events: std::mem::take(&mut self.events),
            focused: true,
            ..Default::default()
        }
    }
}

const VK_BACK: u16 = 0x08;
const VK_TAB: u16 = 0x09;
const VK_RETURN: u16 = 0x0D;
const VK_SHIFT: u16 = 0x10;
const VK_CONTROL: u16 = 0x11;
const VK_MENU: u16 = 0x12;
const VK_ESCAPE: u16 = 0x1B;
const VK_SPACE: u16 = 0x20;
const VK_PRIOR: u16 = 0x21;
const VK_NEXT: u16 = 0x22;
const VK_END: u16 = 0x23;
const VK_HOME: u16 = 0x24;
const VK_LEFT: u16 = 0x25;
const VK_UP: u16 = 0x26;
const VK_RIGHT: u16 = 0x27;
const VK_DOWN: u16 = 0x28;
const VK_INSERT: u16 = 0x2D;
const VK_DELETE: u16 = 0x2E;
const VK_NUMPAD0: u16 = 0x60;
const VK_SUBTRACT: u16 = 0x6D;
const VK_DECIMAL: u16 = 0x6E;
const VK_F1: u16 = 0x70;
const VK_OEM_MINUS: u16 = 0xBD;
const VK_OEM_PERIOD: u16 = 0xBE;
const VK_OEM_COMMA: u16 = 0xBC;

const DIGITS: [Key; 10] = [
    Key::Num0,
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
    Key::Num7,
    Key::Num8,
    Key::Num9,
];

const LETTERS: [Key; 26] = [
    Key::A,
    Key::B,
    Key::C,
    Key::D,
    Key::E,
    Key::F,
    Key::G,
    Key::H,
    Key::I,
    Key::J,
    Key::K,
    Key::L,
    Key::M,
    Key::N,
    Key::O,
    Key::P,
    Key::Q,
    Key::R,
    Key::S,
    Key::T,
    Key::U,
    Key::V,
    Key::W,
    Key::X,
    Key::Y,
    Key::Z,
];

const FUNCTION_KEYS: [Key; 12] = [
    Key::F1,
    Key::F2,
    Key::F3,
    Key::F4,
    Key::F5,
    Key::F6,
    Key::F7,
    Key::F8,
    Key::F9,
    Key::F10,
    Key::F11,
    Key::F12,
];

pub fn key_from_virtual_key(vk: u16) -> Option<Key> {
    let key = match vk {
        VK_BACK => Key::Backspace,
        VK_TAB => Key::Tab,
        VK_RETURN => Key::Enter,
        VK_ESCAPE => Key::Escape,
        VK_SPACE => Key::Space,
        VK_PRIOR => Key::PageUp,
        VK_NEXT => Key::PageDown,
        VK_END => Key::End,
        VK_HOME => Key::Home,
        VK_LEFT => Key::ArrowLeft,
        VK_UP => Key::ArrowUp,
        VK_RIGHT => Key::ArrowRight,
        VK_DOWN => Key::ArrowDown,
        VK_INSERT => Key::Insert,
        VK_DELETE => Key::Delete,
        VK_SUBTRACT | VK_OEM_MINUS => Key::Minus,
        VK_DECIMAL | VK_OEM_PERIOD => Key::Period,
        VK_OEM_COMMA => Key::Comma,
        0x30..=0x39 => DIGITS[(vk - 0x30) as usize],
        VK_NUMPAD0..=0x69 => DIGITS[(vk - VK_NUMPAD0) as usize],
        0x41..=0x5A => LETTERS[(vk - 0x41) as usize],
        VK_F1..=0x7B => FUNCTION_KEYS[(vk - VK_F1) as usize],
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn virtual_keys_map_to_ui_keys() {
        assert_eq!(key_from_virtual_key(b'A' as u16), Some(Key::A));
        assert_eq!(key_from_virtual_key(b'Z' as u16), Some(Key::Z));
        assert_eq!(key_from_virtual_key(b'7' as u16), Some(Key::Num7));
        assert_eq!(key_from_virtual_key(0x67), Some(Key::Num7));
        assert_eq!(key_from_virtual_key(0x7B), Some(Key::F12));
        assert_eq!(key_from_virtual_key(0x25), Some(Key::ArrowLeft));
        assert_eq!(key_from_virtual_key(VK_SHIFT), None);
    }

    #[test]
    fn clicks_use_the_last_pointer_position() {
        let mut input = OverlayInput::default();
        input.pointer_moved(10.0, 20.0);
        input.pointer_button(PointerButton::Primary, true);
        let raw = input.take_raw_input(1280, 720, 0.5);

        assert_eq!(raw.events.len(), 2);
        match &raw.events[1] {
            Event::PointerButton { pos, pressed, .. } => {
                assert_eq!(*pos, Pos2::new(10.0, 20.0));
                assert!(pressed);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(raw.screen_rect.map(|r| r.size()), Some(Vec2::new(1280.0, 720.0)));
        assert!(input.take_raw_input(1280, 720, 0.6).events.is_empty());
    }

    #[test]
    fn surrogate_pairs_become_one_character() {
        let mut input = OverlayInput::default();
        input.utf16_unit(0xD83D);
        input.utf16_unit(0xDE00);
        input.utf16_unit(b'x' as u16);
        input.utf16_unit(0x08);
        let raw = input.take_raw_input(1, 1, 0.0);
        assert_eq!(
            raw.events,
            vec![Event::Text("\u{1F600}".into()), Event::Text("x".into())]
        );
    }

    #[test]
    fn modifiers_follow_key_state() {
        let mut input = OverlayInput::default();
        input.virtual_key(VK_CONTROL, true, false);
        assert!(input.modifiers().ctrl);
        input.virtual_key(b'C' as u16, true, false);
        input.virtual_key(VK_CONTROL, false, false);
        assert!(!input.modifiers().ctrl);

        let raw = input.take_raw_input(1, 1, 0.0);
        assert!(raw.events.contains(&Event::Copy));
        assert!(raw.events.iter().any(|event| matches!(
            event,
            Event::Key { key: Key::C, pressed: true, modifiers, .. } if modifiers.ctrl
        )));
    }
}
